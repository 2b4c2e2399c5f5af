//! The Assembler module is in charge of taking Hack
//! assembly text and producing one 16 bit binary word
//! per instruction.
//!
//! It does this in two strictly ordered passes over the
//! cleaned source. The first pass binds every label to the
//! index of the instruction that follows it; the second
//! resolves the remaining symbols and encodes each instruction.
//! Labels may be referenced before they are declared, so the
//! second pass never starts before the first has finished.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod symbols;

use self::ast::{Instruction, Statement};
use self::parser::{Line, Parser};
use self::symbols::SymbolTable;
use crate::error::Result;

/// One encoded instruction of the output program.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Encoded {
    /// Position in the output, which is also the ROM address.
    pub index: usize,
    /// 1-based line in the source text.
    pub line: usize,
    /// The cleaned source text of the instruction.
    pub source: String,
    pub word: u16,
}

impl Encoded {
    pub fn binary(&self) -> String {
        to_binary(self.word)
    }
}

/// Holds the state of a single assembly run.
///
/// The symbol table lives and dies with the assembler, so every
/// program starts from the predefined symbols alone.
pub struct Assembler {
    symbols: SymbolTable,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    pub fn new() -> Self {
        Assembler { symbols: SymbolTable::new() }
    }

    /// Assemble `source`, consuming the assembler.
    pub fn run(mut self, source: &str) -> Result<Vec<Encoded>> {
        let lines = Parser::new(lexer::clean(source)).run()?;
        self.scan_labels(&lines)?;
        self.encode(lines)
    }

    /// First pass: bind each label to the index of the next instruction.
    fn scan_labels(&mut self, lines: &[Line]) -> Result<()> {
        let mut index = 0;
        let mut labels = 0;
        for line in lines {
            match &line.statement {
                Statement::Label(name) => {
                    self.symbols.bind_label(name, index, line.number)?;
                    labels += 1;
                }
                Statement::Instruction(_) => index += 1,
            }
        }
        debug!("label scan bound {} label(s) over {} instruction(s)", labels, index);
        Ok(())
    }

    /// Second pass: drop the labels and encode everything else in order.
    fn encode(&mut self, lines: Vec<Line>) -> Result<Vec<Encoded>> {
        let instructions: Vec<(usize, String, Instruction)> = lines
            .into_iter()
            .filter_map(|Line { number, source, statement }| match statement {
                Statement::Instruction(ins) => Some((number, source, ins)),
                Statement::Label(_) => None,
            })
            .collect();

        let mut out = Vec::with_capacity(instructions.len());
        for (index, (number, source, ins)) in instructions.into_iter().enumerate() {
            let word = ins.assemble(&mut self.symbols, number)?;
            out.push(Encoded { index, line: number, source, word });
        }
        debug!("encoded {} instruction(s)", out.len());
        Ok(out)
    }
}

/// Assembles `source` with a fresh symbol table and returns the
/// binary text: one 16 character line per instruction, no trailing newline.
pub fn assemble(source: &str) -> Result<String> {
    Ok(render(&Assembler::new().run(source)?))
}

/// Returns the cleaned source: whitespace and comments removed, empty lines dropped.
pub fn preprocess(source: &str) -> String {
    lexer::clean(source)
        .into_iter()
        .map(|line| line.text)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render(encoded: &[Encoded]) -> String {
    encoded.iter().map(Encoded::binary).collect::<Vec<_>>().join("\n")
}

pub fn to_binary(word: u16) -> String {
    format!("{:016b}", word)
}
