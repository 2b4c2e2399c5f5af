//! This lexer cleans Hack assembly source.
//!
//! Cleaning is a pure text transform: every whitespace character is
//! removed, then anything from `//` to the end of the line, and lines
//! left empty are dropped. It never looks at symbols.

/// A non-empty source line with whitespace and comments removed.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CleanLine {
    /// 1-based line number in the original source.
    pub number: usize,
    pub text: String,
}

impl CleanLine {
    pub fn new(number: usize, text: &str) -> Self {
        CleanLine { number, text: text.to_owned() }
    }
}

pub fn clean(source: &str) -> Vec<CleanLine> {
    let lines: Vec<CleanLine> = source
        .lines()
        .enumerate()
        .filter_map(|(index, line)| clean_line(line).map(|text| CleanLine::new(index + 1, &text)))
        .collect();

    debug!("cleaned {} source lines down to {}", source.lines().count(), lines.len());
    lines
}

fn clean_line(line: &str) -> Option<String> {
    let mut text: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(start) = text.find("//") {
        text.truncate(start);
    }

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
