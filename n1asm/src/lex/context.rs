use crate::token::TokenType;

/// Lexer state for the line being tokenized. Reset at the start of every
/// physical line, so nothing leaks from one line into the next.
#[derive(Debug, Default)]
pub struct Context {
    pub mode: Mode,
    /// Set while inside a run of blanks that already produced a SPACE.
    pub space: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    String {
        buf: String,
    },
    Value {
        kind: TokenType,
        start: u32,
        buf: String,
    },
    Name {
        start: u32,
        buf: String,
    },
    Argument {
        buf: String,
    },
}

impl Context {
    pub fn reset(&mut self) {
        self.mode = Mode::Normal;
        self.space = false;
    }

    /// Leaves the current mode, handing back whatever it had accumulated.
    pub fn take(&mut self) -> Mode {
        std::mem::take(&mut self.mode)
    }
}

pub fn is_digit_of(kind: TokenType, ch: char) -> bool {
    match kind {
        TokenType::Binary => matches!(ch, '0' | '1'),
        TokenType::Octal => matches!(ch, '0'..='7'),
        TokenType::Hexadecimal => ch.is_ascii_hexdigit(),
        _ => ch.is_ascii_digit(),
    }
}

pub fn is_name_start(ch: char) -> bool {
    matches!(ch, 'a'..='z' | 'A'..='Z' | '_' | '.')
}

pub fn is_name_continue(ch: char) -> bool {
    matches!(ch, 'a'..='z' | 'A'..='Z' | '_' | '.' | '0'..='9')
}

pub fn is_register(name: &str) -> bool {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => matches!(
            ch.to_ascii_lowercase(),
            'a' | 'b' | 'c' | 'd' | 'h' | 'l' | 'z' | 'f'
        ),
        _ => false,
    }
}
