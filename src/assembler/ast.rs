//! This AST describes a cleaned Hack assembly file.
//!
//! Execution begins with the first instruction in the file.
//! Comments start with `//` and run to the end of the line.
//! Instructions are delimited by newlines; whitespace inside a line
//! is insignificant and stripped before parsing.
//!
//! Supported statements:
//!
//! ```text
//! @21          // A <= 21
//! @LOOP        // A <= address bound to the label or variable LOOP
//! D=M+1        // dest=comp
//! D;JGT        // comp;jump
//! AM=M-1;JNE   // dest=comp;jump
//! (LOOP)       // bind LOOP to the index of the next instruction
//! ```
//!
//! Every instruction is 16 bits wide. Address instructions carry a
//! leading `0` and a 15 bit address, compute instructions carry the
//! prefix `111` followed by the comp, dest and jump fields.

use std::fmt;

use super::symbols::{SymbolTable, MAX_ADDRESS};
use crate::error::{Error, Field, Result};

/// A single cleaned source line after parsing.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Statement {
    /// `(NAME)`. Occupies no instruction slot.
    Label(String),
    Instruction(Instruction),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Instruction {
    Address(Operand),
    Compute { dest: Dest, comp: Comp, jump: Jump },
}

/// The operand of an address instruction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Operand {
    /// Purely numeric operand. Bypasses the symbol table.
    Literal(u64),
    Symbol(String),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instruction::Address(Operand::Literal(value)) => write!(f, "@{}", value),
            Instruction::Address(Operand::Symbol(name)) => write!(f, "@{}", name),
            Instruction::Compute { dest, comp, jump } => {
                if *dest != Dest::Null {
                    write!(f, "{}=", dest.mnemonic())?;
                }
                write!(f, "{}", comp.mnemonic())?;
                if *jump != Jump::Null {
                    write!(f, ";{}", jump.mnemonic())?;
                }
                Ok(())
            }
        }
    }
}

impl Instruction {
    /// Assembles the instruction into its 16 bit machine word.
    ///
    /// Symbolic operands are resolved through `symbols`, which allocates a
    /// fresh variable address for names it has not seen before. `line` is
    /// only used to report errors.
    pub fn assemble(&self, symbols: &mut SymbolTable, line: usize) -> Result<u16> {
        match self {
            Instruction::Address(Operand::Literal(value)) => {
                if *value > u64::from(MAX_ADDRESS) {
                    return Err(Error::AddressOverflow { value: *value, line });
                }
                Ok(*value as u16)
            }
            Instruction::Address(Operand::Symbol(name)) => symbols.resolve(name, line),
            Instruction::Compute { dest, comp, jump } => {
                Ok((0b111 << 13) | (comp.bits() << 6) | (dest.bits() << 3) | jump.bits())
            }
        }
    }
}

/// ALU operations. The leading bit of the 7 bit code selects
/// between the A register (0) and memory at A (1) as the second operand.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Comp {
    Zero,
    One,
    NegOne,
    D,
    A,
    NotD,
    NotA,
    NegD,
    NegA,
    DPlusOne,
    APlusOne,
    DMinusOne,
    AMinusOne,
    DPlusA,
    DMinusA,
    AMinusD,
    DAndA,
    DOrA,
    M,
    NotM,
    NegM,
    MPlusOne,
    MMinusOne,
    DPlusM,
    DMinusM,
    MMinusD,
    DAndM,
    DOrM,
}

impl Comp {
    pub fn parse(token: &str) -> Result<Self> {
        use Comp::*;
        let comp = match token {
            "0"   => Zero,
            "1"   => One,
            "-1"  => NegOne,
            "D"   => D,
            "A"   => A,
            "!D"  => NotD,
            "!A"  => NotA,
            "-D"  => NegD,
            "-A"  => NegA,
            "D+1" => DPlusOne,
            "A+1" => APlusOne,
            "D-1" => DMinusOne,
            "A-1" => AMinusOne,
            "D+A" => DPlusA,
            "D-A" => DMinusA,
            "A-D" => AMinusD,
            "D&A" => DAndA,
            "D|A" => DOrA,
            "M"   => M,
            "!M"  => NotM,
            "-M"  => NegM,
            "M+1" => MPlusOne,
            "M-1" => MMinusOne,
            "D+M" => DPlusM,
            "D-M" => DMinusM,
            "M-D" => MMinusD,
            "D&M" => DAndM,
            "D|M" => DOrM,
            _ => return Err(invalid(Field::Comp, token)),
        };
        Ok(comp)
    }

    pub fn bits(&self) -> u16 {
        use Comp::*;
        match self {
            Zero      => 0b0101010,
            One       => 0b0111111,
            NegOne    => 0b0111010,
            D         => 0b0001100,
            A         => 0b0110000,
            NotD      => 0b0001101,
            NotA      => 0b0110001,
            NegD      => 0b0001111,
            NegA      => 0b0110011,
            DPlusOne  => 0b0011111,
            APlusOne  => 0b0110111,
            DMinusOne => 0b0001110,
            AMinusOne => 0b0110010,
            DPlusA    => 0b0000010,
            DMinusA   => 0b0010011,
            AMinusD   => 0b0000111,
            DAndA     => 0b0000000,
            DOrA      => 0b0010101,
            M         => 0b1110000,
            NotM      => 0b1110001,
            NegM      => 0b1110011,
            MPlusOne  => 0b1110111,
            MMinusOne => 0b1110010,
            DPlusM    => 0b1000010,
            DMinusM   => 0b1010011,
            MMinusD   => 0b1000111,
            DAndM     => 0b1000000,
            DOrM      => 0b1010101,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        use Comp::*;
        match self {
            Zero      => "0",
            One       => "1",
            NegOne    => "-1",
            D         => "D",
            A         => "A",
            NotD      => "!D",
            NotA      => "!A",
            NegD      => "-D",
            NegA      => "-A",
            DPlusOne  => "D+1",
            APlusOne  => "A+1",
            DMinusOne => "D-1",
            AMinusOne => "A-1",
            DPlusA    => "D+A",
            DMinusA   => "D-A",
            AMinusD   => "A-D",
            DAndA     => "D&A",
            DOrA      => "D|A",
            M         => "M",
            NotM      => "!M",
            NegM      => "-M",
            MPlusOne  => "M+1",
            MMinusOne => "M-1",
            DPlusM    => "D+M",
            DMinusM   => "D-M",
            MMinusD   => "M-D",
            DAndM     => "D&M",
            DOrM      => "D|M",
        }
    }
}

/// Destination registers. The three bits are A, D and M from high to low.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Dest {
    Null,
    M,
    D,
    MD,
    A,
    AM,
    AD,
    AMD,
}

impl Dest {
    /// Parses a destination. The empty string is the null destination.
    pub fn parse(token: &str) -> Result<Self> {
        use Dest::*;
        let dest = match token {
            ""    => Null,
            "M"   => M,
            "D"   => D,
            "MD"  => MD,
            "A"   => A,
            "AM"  => AM,
            "AD"  => AD,
            "AMD" => AMD,
            _ => return Err(invalid(Field::Dest, token)),
        };
        Ok(dest)
    }

    pub fn bits(&self) -> u16 {
        use Dest::*;
        match self {
            Null => 0b000,
            M    => 0b001,
            D    => 0b010,
            MD   => 0b011,
            A    => 0b100,
            AM   => 0b101,
            AD   => 0b110,
            AMD  => 0b111,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        use Dest::*;
        match self {
            Null => "",
            M    => "M",
            D    => "D",
            MD   => "MD",
            A    => "A",
            AM   => "AM",
            AD   => "AD",
            AMD  => "AMD",
        }
    }
}

/// Jump conditions, tested against the ALU output.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Jump {
    Null,
    JGT,
    JEQ,
    JGE,
    JLT,
    JNE,
    JLE,
    JMP,
}

impl Jump {
    /// Parses a jump condition. The empty string never jumps.
    pub fn parse(token: &str) -> Result<Self> {
        use Jump::*;
        let jump = match token {
            ""    => Null,
            "JGT" => JGT,
            "JEQ" => JEQ,
            "JGE" => JGE,
            "JLT" => JLT,
            "JNE" => JNE,
            "JLE" => JLE,
            "JMP" => JMP,
            _ => return Err(invalid(Field::Jump, token)),
        };
        Ok(jump)
    }

    pub fn bits(&self) -> u16 {
        use Jump::*;
        match self {
            Null => 0b000,
            JGT  => 0b001,
            JEQ  => 0b010,
            JGE  => 0b011,
            JLT  => 0b100,
            JNE  => 0b101,
            JLE  => 0b110,
            JMP  => 0b111,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        use Jump::*;
        match self {
            Null => "",
            JGT  => "JGT",
            JEQ  => "JEQ",
            JGE  => "JGE",
            JLT  => "JLT",
            JNE  => "JNE",
            JLE  => "JLE",
            JMP  => "JMP",
        }
    }
}

// Line numbers are filled in by the parser, which knows where the token came from.
fn invalid(field: Field, token: &str) -> Error {
    Error::InvalidMnemonic { field, token: token.to_owned(), line: 0 }
}
