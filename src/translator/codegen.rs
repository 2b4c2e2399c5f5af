//! Generates Hack assembly for stack-machine commands.
//!
//! The stack grows upwards from the address held in `SP`, which
//! always points at the next free slot. Values travel through the
//! `D` register: a push writes `D` to the top of the stack, a pop
//! leaves the old top in `D`. `R13` and `R14` are scratch cells.
use super::ast::{ArithmeticOp, Command, CommandKind, Segment};
use super::Config;
use crate::assembler::symbols::MAX_ADDRESS;
use crate::error::{Error, Result};

/// Comparisons jump to absolute instruction numbers computed from the
/// emission counter. Counted from the first instruction of the sequence
/// `write_comparison` emits, instruction 13 is `D=-1` and instruction 14
/// is the first of the closing push.
pub const COMPARISON_TRUE_OFFSET: usize = 13;
pub const COMPARISON_FALSE_OFFSET: usize = 14;

const PUSH_D: &str = "@SP\nA=M\nM=D\n@SP\nM=M+1\n";

/// Stack pointer value installed by the bootstrap code.
const STACK_BASE: u16 = 256;

/// Holds the state of a single translation run.
pub struct CodeGenerator {
    config: Config,
    /// Instructions emitted so far. Labels and comments are not instructions.
    emitted: usize,
    /// Return labels handed out so far.
    returns: usize,
    /// The function whose body is being generated, used to scope labels.
    function: Option<String>,
}

impl CodeGenerator {
    pub fn new(config: Config) -> Self {
        CodeGenerator { config, emitted: 0, returns: 0, function: None }
    }

    /// Number of instructions emitted so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Sets `SP` and calls `Sys.init`.
    pub fn bootstrap(&mut self) -> String {
        let mut asm = format!("@{}\nD=A\n@SP\nM=D\n", STACK_BASE);
        asm.push_str(&self.write_call("Sys.init", 0, "Bootstrap"));
        self.advance(&asm);
        asm
    }

    /// Generates the assembly for `command` and advances the emission
    /// counter by the number of instructions produced.
    pub fn generate(&mut self, command: &Command) -> Result<String> {
        let code = match command.kind {
            CommandKind::Push => self.write_push(command)?,
            CommandKind::Pop => self.write_pop(command)?,
            CommandKind::Arithmetic(op) => self.write_arithmetic(op),
            CommandKind::Label => format!("({})\n", self.scoped(name(command)?)),
            CommandKind::Goto => format!("@{}\n0;JMP\n", self.scoped(name(command)?)),
            CommandKind::IfGoto => format!("{}@{}\nD;JNE\n", pop(true), self.scoped(name(command)?)),
            CommandKind::Function => self.write_function(command)?,
            CommandKind::Call => {
                let args = count(command)?;
                self.write_call(name(command)?, args, &command.file)
            }
            CommandKind::Return => write_return(),
        };
        self.advance(&code);

        if self.config.annotate {
            Ok(format!("// {}\n{}", command.text, code))
        } else {
            Ok(code)
        }
    }

    fn advance(&mut self, code: &str) {
        self.emitted += count_instructions(code);
    }

    fn scoped(&self, label: &str) -> String {
        match &self.function {
            Some(function) => format!("{}${}", function, label),
            None => label.to_owned(),
        }
    }

    fn write_push(&self, command: &Command) -> Result<String> {
        let (segment, index) = segment(command)?;
        let load = match segment {
            Segment::Constant => {
                if index > MAX_ADDRESS {
                    return Err(Error::AddressOverflow { value: u64::from(index), line: command.line });
                }
                format!("@{}\nD=A\n", index)
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                let base = segment.base_pointer().unwrap_or_default();
                format!("@{}\nD=M\n@{}\nA=D+A\nD=M\n", base, index)
            }
            Segment::Temp | Segment::Pointer | Segment::Static => {
                format!("@{}\nD=M\n", fixed_address(command, segment, index)?)
            }
        };
        Ok(load + PUSH_D)
    }

    fn write_pop(&self, command: &Command) -> Result<String> {
        let (segment, index) = segment(command)?;
        match segment {
            Segment::Constant => Err(Error::UnsupportedSegment {
                segment: segment.to_string(),
                file: command.file.clone(),
                line: command.line,
            }),
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                let base = segment.base_pointer().unwrap_or_default();
                Ok(format!(
                    "@{}\nD=M\n@{}\nD=D+A\n@R13\nM=D\n{}@R13\nA=M\nM=D\n",
                    base,
                    index,
                    pop(true)
                ))
            }
            Segment::Temp | Segment::Pointer | Segment::Static => {
                Ok(format!("{}@{}\nM=D\n", pop(true), fixed_address(command, segment, index)?))
            }
        }
    }

    fn write_arithmetic(&self, op: ArithmeticOp) -> String {
        use ArithmeticOp::*;
        match op {
            // The second pop only decrements SP; A=M then reaches the
            // first operand.
            Add => format!("{}{}A=M\nD=D+M\n{}", pop(true), pop(false), PUSH_D),
            Sub => format!("{}{}A=M\nD=M-D\n{}", pop(true), pop(false), PUSH_D),
            And => format!("{}{}A=M\nD=D&M\n{}", pop(true), pop(false), PUSH_D),
            Or  => format!("{}{}A=M\nD=D|M\n{}", pop(true), pop(false), PUSH_D),
            Neg => format!("{}D=-D\n{}", pop(true), PUSH_D),
            Not => format!("{}D=!D\n{}", pop(true), PUSH_D),
            Eq  => self.write_comparison("JEQ"),
            Gt  => self.write_comparison("JGT"),
            Lt  => self.write_comparison("JLT"),
        }
    }

    /// Emits a comparison. The jump targets are absolute, so the
    /// instruction count of this sequence must match the offsets.
    fn write_comparison(&self, jump: &str) -> String {
        let start = self.emitted;
        format!(
            "{}{}A=M\nD=M-D\n@{}\nD;{}\nD=0\n@{}\n0;JMP\nD=-1\n{}",
            pop(true),
            pop(false),
            start + COMPARISON_TRUE_OFFSET,
            jump,
            start + COMPARISON_FALSE_OFFSET,
            PUSH_D
        )
    }

    fn write_function(&mut self, command: &Command) -> Result<String> {
        let function = name(command)?;
        let locals = count(command)?;
        let mut asm = format!("({})\n", function);
        for _ in 0..locals {
            asm.push_str("@SP\nA=M\nM=0\n@SP\nM=M+1\n");
        }
        self.function = Some(function.to_owned());
        Ok(asm)
    }

    /// Saves the caller's frame, repositions `ARG` and `LCL` and jumps to
    /// `function`. Execution resumes at the return label declared last.
    fn write_call(&mut self, function: &str, args: u16, file: &str) -> String {
        let caller = self.function.as_deref().unwrap_or(file);
        let ret = format!("{}$ret.{}", caller, self.returns);
        self.returns += 1;

        let mut asm = format!("@{}\nD=A\n{}", ret, PUSH_D);
        for pointer in ["LCL", "ARG", "THIS", "THAT"].iter() {
            asm.push_str(&format!("@{}\nD=M\n{}", pointer, PUSH_D));
        }
        asm.push_str(&format!(
            "@SP\nD=M\n@{}\nD=D-A\n@ARG\nM=D\n@SP\nD=M\n@LCL\nM=D\n@{}\n0;JMP\n({})\n",
            u32::from(args) + 5,
            function,
            ret
        ));
        asm
    }
}

/// Restores the caller's frame and jumps to the saved return address.
fn write_return() -> String {
    let mut asm = String::from(
        "@LCL\nD=M\n@R13\nM=D\n@5\nA=D-A\nD=M\n@R14\nM=D\n",
    );
    asm.push_str(&pop(true));
    asm.push_str("@ARG\nA=M\nM=D\n@ARG\nD=M+1\n@SP\nM=D\n");
    for pointer in ["THAT", "THIS", "ARG", "LCL"].iter() {
        asm.push_str(&format!("@R13\nAM=M-1\nD=M\n@{}\nM=D\n", pointer));
    }
    asm.push_str("@R14\nA=M\n0;JMP\n");
    asm
}

/// Decrements `SP`. With `store` the popped value is read into `D`;
/// without it only `SP` changes, and the caller loads the slot with `A=M`.
fn pop(store: bool) -> &'static str {
    if store {
        "@SP\nM=M-1\nA=M\nD=M\n"
    } else {
        "@SP\nM=M-1\n"
    }
}

/// Counts the lines of `code` that occupy an instruction slot.
pub fn count_instructions(code: &str) -> usize {
    code.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('(') && !line.starts_with("//"))
        .count()
}

fn name(command: &Command) -> Result<&str> {
    command.arg1.as_deref().ok_or_else(|| missing(command))
}

fn count(command: &Command) -> Result<u16> {
    command.arg2.ok_or_else(|| missing(command))
}

fn segment(command: &Command) -> Result<(Segment, u16)> {
    let name = name(command)?;
    let segment = Segment::parse(name).ok_or_else(|| Error::UnsupportedSegment {
        segment: name.to_owned(),
        file: command.file.clone(),
        line: command.line,
    })?;
    Ok((segment, count(command)?))
}

/// Resolves a `temp`, `pointer` or `static` slot to its assembly operand.
fn fixed_address(command: &Command, segment: Segment, index: u16) -> Result<String> {
    match segment.fixed_range() {
        Some((base, len)) if index < len => Ok((base + index).to_string()),
        Some(_) => Err(out_of_range(command, segment, index)),
        None => Ok(format!("{}.{}", command.file, index)),
    }
}

fn missing(command: &Command) -> Error {
    Error::MissingArgument { text: command.text.clone(), file: command.file.clone(), line: command.line }
}

fn out_of_range(command: &Command, segment: Segment, index: u16) -> Error {
    Error::IndexOutOfRange {
        segment: segment.to_string(),
        index,
        file: command.file.clone(),
        line: command.line,
    }
}
