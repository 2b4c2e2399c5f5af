//! Commands of the stack-machine language.
//!
//! ```text
//! push constant 7     // push a segment value
//! pop local 0         // pop into a segment
//! add                 // arithmetic and logic: add sub neg eq gt lt and or not
//! label LOOP          // program flow: label goto if-goto
//! if-goto LOOP
//! function Main.f 2   // functions: function call return
//! call Main.f 1
//! return
//! ```
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CommandKind {
    Push,
    Pop,
    Label,
    Goto,
    IfGoto,
    Function,
    Call,
    Return,
    Arithmetic(ArithmeticOp),
}

impl CommandKind {
    /// Maps the first token of a line to its command kind.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        use ArithmeticOp::*;
        use CommandKind::*;
        let kind = match keyword {
            "push"     => Push,
            "pop"      => Pop,
            "label"    => Label,
            "goto"     => Goto,
            "if-goto"  => IfGoto,
            "function" => Function,
            "call"     => Call,
            "return"   => Return,
            "add"      => Arithmetic(Add),
            "sub"      => Arithmetic(Sub),
            "neg"      => Arithmetic(Neg),
            "eq"       => Arithmetic(Eq),
            "gt"       => Arithmetic(Gt),
            "lt"       => Arithmetic(Lt),
            "and"      => Arithmetic(And),
            "or"       => Arithmetic(Or),
            "not"      => Arithmetic(Not),
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
}

impl Segment {
    pub fn parse(name: &str) -> Option<Self> {
        use Segment::*;
        let segment = match name {
            "constant" => Constant,
            "local"    => Local,
            "argument" => Argument,
            "this"     => This,
            "that"     => That,
            "temp"     => Temp,
            "pointer"  => Pointer,
            "static"   => Static,
            _ => return None,
        };
        Some(segment)
    }

    /// The cell holding the base address of a pointer-based segment.
    pub fn base_pointer(&self) -> Option<&'static str> {
        match self {
            Segment::Local    => Some("LCL"),
            Segment::Argument => Some("ARG"),
            Segment::This     => Some("THIS"),
            Segment::That     => Some("THAT"),
            _ => None,
        }
    }

    /// The fixed base address and length of the register-mapped segments.
    pub fn fixed_range(&self) -> Option<(u16, u16)> {
        match self {
            Segment::Temp    => Some((5, 8)),
            Segment::Pointer => Some((3, 2)),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Segment::Constant => "constant",
            Segment::Local    => "local",
            Segment::Argument => "argument",
            Segment::This     => "this",
            Segment::That     => "that",
            Segment::Temp     => "temp",
            Segment::Pointer  => "pointer",
            Segment::Static   => "static",
        };
        write!(f, "{}", name)
    }
}

/// A single parsed command and where it came from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Command {
    pub kind: CommandKind,
    pub arg1: Option<String>,
    pub arg2: Option<u16>,
    /// Name of the source file without its extension. Qualifies `static` symbols.
    pub file: String,
    /// 1-based line in the source file.
    pub line: usize,
    /// The command text with comments and surrounding whitespace removed.
    pub text: String,
}
