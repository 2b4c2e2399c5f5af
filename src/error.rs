//! Errors shared by the assembler and the translator.
//!
//! Every error is fatal for the run it occurs in: nothing is retried and no
//! partial output is produced. Each variant carries the offending token and
//! the line it came from so the CLI can point at the fault.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// The field of a compute instruction a mnemonic was looked up in.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Field {
    Comp,
    Dest,
    Jump,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Field::Comp => write!(f, "comp"),
            Field::Dest => write!(f, "dest"),
            Field::Jump => write!(f, "jump"),
        }
    }
}

#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    #[error("line {line}: label `{label}` cannot be bound more than once")]
    DuplicateLabel { label: String, line: usize },

    #[error("line {line}: address {value} exceeds the maximum of 32767")]
    AddressOverflow { value: u64, line: usize },

    #[error("line {line}: `{token}` is not a valid {field} mnemonic")]
    InvalidMnemonic { field: Field, token: String, line: usize },

    #[error("line {line}: `{token}` is not a valid symbol")]
    InvalidSymbol { token: String, line: usize },

    #[error("{file}:{line}: unsupported memory segment `{segment}`")]
    UnsupportedSegment { segment: String, file: String, line: usize },

    #[error("{file}:{line}: unknown command `{text}`")]
    ParseError { text: String, file: String, line: usize },

    #[error("{file}:{line}: `{token}` is not a non-negative integer")]
    InvalidArgument { token: String, file: String, line: usize },

    #[error("{file}:{line}: `{text}` is missing an argument")]
    MissingArgument { text: String, file: String, line: usize },

    #[error("{file}:{line}: index {index} is out of range for segment `{segment}`")]
    IndexOutOfRange { segment: String, index: u16, file: String, line: usize },
}
