//! The Parser module takes the cleaned lines from the lexer
//! and converts each of them into a Statement.
use std::collections::VecDeque;

use once_cell::sync::Lazy;
use regex::Regex;

use super::ast::*;
use super::lexer::CleanLine;
use crate::error::{Error, Field, Result};

/// Symbols are letters, digits, `_`, `.`, `$` and `:`, not starting with a digit.
static SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_.$:][A-Za-z0-9_.$:]*$").unwrap());

/// A parsed line along with where it came from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Line {
    pub number: usize,
    pub source: String,
    pub statement: Statement,
}

pub struct Parser {
    lines: VecDeque<CleanLine>,
    parsed: Vec<Line>,
}

impl Parser {
    pub fn new(lines: Vec<CleanLine>) -> Self {
        let capacity = lines.len();
        Parser { lines: VecDeque::from(lines), parsed: Vec::with_capacity(capacity) }
    }

    /// Run the parser, consuming itself and returning the parsed lines.
    /// Stops at the first malformed line.
    pub fn run(mut self) -> Result<Vec<Line>> {
        while let Some(line) = self.consume() {
            let statement = statement(&line.text).map_err(|e| at_line(e, line.number))?;
            self.parsed.push(Line { number: line.number, source: line.text, statement });
        }
        Ok(self.parsed)
    }

    /// Pops a line off the input and returns it.
    /// Returns None if no lines are left.
    #[inline]
    fn consume(&mut self) -> Option<CleanLine> {
        self.lines.pop_front()
    }
}

fn statement(text: &str) -> Result<Statement> {
    if let Some(rest) = text.strip_prefix('(') {
        return match rest.strip_suffix(')') {
            Some(name) => Ok(Statement::Label(symbol(name)?)),
            None => Err(Error::InvalidSymbol { token: text.to_owned(), line: 0 }),
        };
    }

    if let Some(operand) = text.strip_prefix('@') {
        return Ok(Statement::Instruction(Instruction::Address(address(operand)?)));
    }

    Ok(Statement::Instruction(compute(text)?))
}

fn address(operand: &str) -> Result<Operand> {
    if !operand.is_empty() && operand.bytes().all(|b| b.is_ascii_digit()) {
        // Too many digits for a u64 is still just an oversized address.
        let value = operand.parse::<u64>().unwrap_or(u64::MAX);
        return Ok(Operand::Literal(value));
    }
    Ok(Operand::Symbol(symbol(operand)?))
}

fn symbol(name: &str) -> Result<String> {
    if SYMBOL.is_match(name) {
        Ok(name.to_owned())
    } else {
        Err(Error::InvalidSymbol { token: name.to_owned(), line: 0 })
    }
}

/// Splits `dest=comp;jump`. An `=` or `;` that is present must
/// have a non-empty mnemonic on its side.
fn compute(text: &str) -> Result<Instruction> {
    let (dest, rest) = match text.find('=') {
        Some(idx) => (Some(&text[..idx]), &text[idx + 1..]),
        None => (None, text),
    };
    let (comp, jump) = match rest.find(';') {
        Some(idx) => (&rest[..idx], Some(&rest[idx + 1..])),
        None => (rest, None),
    };

    let dest = match dest {
        Some("") => return Err(Error::InvalidMnemonic { field: Field::Dest, token: String::new(), line: 0 }),
        Some(token) => Dest::parse(token)?,
        None => Dest::Null,
    };
    let comp = Comp::parse(comp)?;
    let jump = match jump {
        Some("") => return Err(Error::InvalidMnemonic { field: Field::Jump, token: String::new(), line: 0 }),
        Some(token) => Jump::parse(token)?,
        None => Jump::Null,
    };

    Ok(Instruction::Compute { dest, comp, jump })
}

/// Fills in the source line of an error raised while parsing.
fn at_line(error: Error, number: usize) -> Error {
    match error {
        Error::InvalidMnemonic { field, token, .. } => Error::InvalidMnemonic { field, token, line: number },
        Error::InvalidSymbol { token, .. } => Error::InvalidSymbol { token, line: number },
        other => other,
    }
}
