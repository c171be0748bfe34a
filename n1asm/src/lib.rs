pub mod config;
pub mod error;
pub mod isa;
pub mod lex;
pub mod load;
pub mod module;
pub mod parse;
pub mod token;

pub use self::config::Config;
pub use self::error::{Error, ErrorKind};
pub use self::load::Loader;
pub use self::module::Module;
pub use self::token::{Token, TokenType};

/// `include` with the tokens naming the target: a single STRING, or
/// NAME tokens joined by SLASH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    pub path: Vec<Token>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Export {
    pub name: Token,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constant {
    pub name: Token,
    pub value: Token,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable {
    pub name: Token,
    pub size: Token,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub name: Token,
    pub value: Token,
}

/// `@macro` definition. Parameters are ARGUMENT tokens (`%r0`, `%i1`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub name: Token,
    pub arguments: Vec<Token>,
    pub instructions: Vec<Instruction>,
    pub labels: Vec<Label>,
}

/// `pointer` indexes the owning instruction list; it is not a byte address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    pub name: Token,
    pub pointer: usize,
    pub function: bool,
}

/// An instruction as written. Operands are checked later, not by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub name: Token,
    pub arguments: Vec<Token>,
}
