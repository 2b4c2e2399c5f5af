//! The Translator module turns stack-machine source files into
//! Hack assembly text for the assembler.
//!
//! Files are parsed in the order they are supplied and their
//! commands are generated in that same order, so the output is a
//! deterministic function of the input.

pub mod ast;
pub mod codegen;
pub mod parser;

use self::codegen::CodeGenerator;
use self::parser::SourceFile;
use crate::error::Result;

/// Options for a translation run.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Config {
    /// Emit startup code that sets `SP` to 256 and calls `Sys.init`.
    pub bootstrap: bool,
    /// Precede the code for each command with the command as a comment.
    pub annotate: bool,
}

/// Translates `files` with fresh counters and returns the assembly text.
pub fn translate(files: &[SourceFile], config: Config) -> Result<String> {
    let commands = parser::parse(files)?;

    let mut generator = CodeGenerator::new(config);
    let mut out = String::new();
    if config.bootstrap {
        out.push_str(&generator.bootstrap());
    }
    for command in &commands {
        out.push_str(&generator.generate(command)?);
    }

    info!(
        "translated {} command(s) from {} file(s) into {} instruction(s)",
        commands.len(),
        files.len(),
        generator.emitted()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_translate() {
        let files = vec![SourceFile::new("Main", "push constant 2\npush constant 3\nadd\n")];
        let asm = translate(&files, Config::default()).unwrap();
        assert!(asm.starts_with("@2\nD=A\n"));
        assert_eq!(codegen::count_instructions(&asm), 7 + 7 + 13);
    }

    #[test]
    fn test_translate_is_repeatable() {
        let files = vec![SourceFile::new("Main", "push constant 1\npush constant 1\neq\n")];
        // Counters start from zero on every run.
        assert_eq!(translate(&files, Config::default()), translate(&files, Config::default()));
    }

    #[test]
    fn test_translate_bootstrap() {
        let files = vec![SourceFile::new("Sys", "function Sys.init 0\nlabel END\ngoto END\n")];
        let config = Config { bootstrap: true, annotate: false };
        let asm = translate(&files, config).unwrap();
        assert!(asm.starts_with("@256\n"));
        assert!(asm.contains("(Sys.init)\n(Sys.init$END)\n@Sys.init$END\n0;JMP\n"));
    }

    #[test]
    fn test_translate_error() {
        let files = vec![SourceFile::new("Main", "push constant 1\npush nowhere 1\n")];
        assert_eq!(
            translate(&files, Config::default()),
            Err(Error::UnsupportedSegment { segment: "nowhere".to_owned(), file: "Main".to_owned(), line: 2 })
        );
    }
}
