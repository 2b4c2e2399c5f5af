//! Splits stack-machine source files into commands.
use super::ast::{Command, CommandKind};
use crate::error::{Error, Result};

/// A source file, named by its file name without the extension.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: &str, text: &str) -> Self {
        SourceFile { name: name.to_owned(), text: text.to_owned() }
    }
}

/// Parses every file in the order given, keeping the order of
/// commands within each file.
pub fn parse(files: &[SourceFile]) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for file in files {
        let before = commands.len();
        for (index, raw) in file.text.lines().enumerate() {
            if let Some(command) = parse_line(&file.name, index + 1, raw)? {
                commands.push(command);
            }
        }
        debug!("parsed {} command(s) from `{}`", commands.len() - before, file.name);
    }
    Ok(commands)
}

/// Parses one line. Blank and comment-only lines yield `None`.
fn parse_line(file: &str, line: usize, raw: &str) -> Result<Option<Command>> {
    let text = match raw.find("//") {
        Some(start) => &raw[..start],
        None => raw,
    };
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let mut tokens = text.split_whitespace();
    let keyword = tokens.next().unwrap_or_default();
    let kind = CommandKind::from_keyword(keyword).ok_or_else(|| Error::ParseError {
        text: text.to_owned(),
        file: file.to_owned(),
        line,
    })?;

    let arg1 = tokens.next().map(str::to_owned);
    let arg2 = match (&arg1, tokens.next()) {
        (Some(_), Some(token)) => Some(token.parse::<u16>().map_err(|_| Error::InvalidArgument {
            token: token.to_owned(),
            file: file.to_owned(),
            line,
        })?),
        _ => None,
    };

    Ok(Some(Command { kind, arg1, arg2, file: file.to_owned(), line, text: text.to_owned() }))
}
