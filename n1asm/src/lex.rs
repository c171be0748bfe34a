use std::path::Path;
use std::sync::Arc;

use string_interner::{DefaultBackend, StringInterner};

use self::context::{is_digit_of, is_name_continue, is_name_start, is_register, Context, Mode};
use crate::error::{Error, ErrorKind, Result};
use crate::token::{self, Token, TokenType};

#[cfg(test)]
mod test;

mod context;

const LEGAL: &str = "letters, digits, '_', '.', blanks, quotes and one of : , / \\ @ $ * % ;";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LexOutput {
    /// Every token of the file, in source order.
    pub tokens: Vec<Token>,
    /// One group per physical line, NEWLINE consumed.
    pub lines: Vec<Vec<Token>>,
    /// Statements: comments removed, blanks trimmed, empty lines dropped.
    pub abstract_lines: Vec<Vec<Token>>,
}

impl LexOutput {
    pub fn lex_all(
        path: &Path,
        src: &Arc<str>,
        si: &mut StringInterner<DefaultBackend>,
    ) -> Result<Self> {
        let mut lexer = Lexer::new(path, src, si);
        lexer.all_lines()?;
        let tokens = lexer.tokens;
        let lines = if tokens.is_empty() {
            Vec::new()
        } else {
            token::split(&tokens, TokenType::Newline)
        };
        let abstract_lines = lines
            .iter()
            .map(|line| abstract_line(line))
            .filter(|line| !line.is_empty())
            .collect();
        Ok(Self {
            tokens,
            lines,
            abstract_lines,
        })
    }
}

/// Strips comments and the blanks around a line's statement.
pub fn abstract_line(line: &[Token]) -> Vec<Token> {
    let mut line = token::without(line, TokenType::Comment);
    while line.last().is_some_and(|t| t.is(TokenType::Space) || t.is(TokenType::Newline)) {
        line.pop();
    }
    let lead = line.iter().take_while(|t| t.is(TokenType::Space)).count();
    line.drain(..lead);
    line
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Next,
    /// The mode closed its token without using the char; normal mode gets it.
    Redispatch,
    EndLine,
}

pub struct Lexer<'a> {
    path: &'a Path,
    src: &'a Arc<str>,
    si: &'a mut StringInterner<DefaultBackend>,
    context: Context,
    pub tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(
        path: &'a Path,
        src: &'a Arc<str>,
        si: &'a mut StringInterner<DefaultBackend>,
    ) -> Self {
        Self {
            path,
            src,
            si,
            context: Context::default(),
            tokens: Vec::new(),
        }
    }

    pub fn all_lines(&mut self) -> Result<()> {
        let src = Arc::clone(self.src);
        for (line, text) in src.lines().enumerate() {
            self.line(line as u32, text)?;
        }
        Ok(())
    }

    /// Tokenizes one physical line. The line is followed by a synthetic `\n`
    /// so every line ends in NEWLINE.
    pub fn line(&mut self, line: u32, text: &str) -> Result<()> {
        self.context.reset();
        let chars = text
            .char_indices()
            .chain(std::iter::once((text.len(), '\n')));
        for (column, ch) in chars {
            if self.feed(line, text, column as u32, ch)? == Step::EndLine {
                break;
            }
        }
        Ok(())
    }

    fn feed(&mut self, line: u32, text: &str, column: u32, ch: char) -> Result<Step> {
        let step = self.dispatch(line, text, column, ch)?;
        if step != Step::Redispatch {
            return Ok(step);
        }
        debug_assert_eq!(self.context.mode, Mode::Normal);
        self.normal(line, text, column, ch)
    }

    fn dispatch(&mut self, line: u32, text: &str, column: u32, ch: char) -> Result<Step> {
        match self.context.mode {
            Mode::Normal => self.normal(line, text, column, ch),
            Mode::String { .. } => self.string(line, column, ch),
            Mode::Value { .. } => self.value(line, column, ch),
            Mode::Name { .. } => self.name(line, column, ch),
            Mode::Argument { .. } => self.argument(line, column, ch),
        }
    }

    fn normal(&mut self, line: u32, text: &str, column: u32, ch: char) -> Result<Step> {
        if !matches!(ch, ' ' | '\t') {
            self.context.space = false;
        }
        let single = match ch {
            '\n' => Some(TokenType::Newline),
            ':' => Some(TokenType::Colon),
            ',' => Some(TokenType::Comma),
            '/' | '\\' => Some(TokenType::Slash),
            '@' => Some(TokenType::At),
            '$' => Some(TokenType::Dollar),
            '*' => Some(TokenType::Asterisk),
            _ => None,
        };
        if let Some(kind) = single {
            self.push(Token::new(kind, line, column));
            return Ok(Step::Next);
        }
        match ch {
            ' ' | '\t' => {
                if !self.context.space {
                    self.push(Token::new(TokenType::Space, line, column));
                    self.context.space = true;
                }
            }
            ';' => {
                let rest = &text[column as usize + 1..];
                let value = self.si.get_or_intern(rest);
                self.push(Token::with_value(TokenType::Comment, line, column, value));
                self.push(Token::new(TokenType::Newline, line, text.len() as u32));
                return Ok(Step::EndLine);
            }
            '\'' | '"' => {
                self.context.mode = Mode::String { buf: String::new() }
            }
            '%' => {
                self.context.mode = Mode::Argument { buf: String::new() };
            }
            '0'..='9' => {
                self.context.mode = Mode::Value {
                    kind: TokenType::Decimal,
                    start: column,
                    buf: ch.to_string(),
                }
            }
            _ if is_name_start(ch) => {
                self.context.mode = Mode::Name {
                    start: column,
                    buf: ch.to_string(),
                }
            }
            _ => {
                return Err(self.syntax(
                    line,
                    column,
                    format!("invalid character {ch:?}; expected {LEGAL}"),
                ))
            }
        }
        Ok(Step::Next)
    }

    fn string(&mut self, line: u32, column: u32, ch: char) -> Result<Step> {
        let Mode::String { buf } = &mut self.context.mode else {
            return Ok(Step::Redispatch);
        };
        if ch == '\n' {
            let open = column - buf.len() as u32 - 1;
            return Err(self.syntax(line, open, "string not closed before end of line"));
        }
        if !matches!(ch, '\'' | '"') {
            buf.push(ch);
            return Ok(Step::Next);
        }
        let start = column - buf.len() as u32;
        let value = self.si.get_or_intern(buf.as_str());
        self.context.mode = Mode::Normal;
        self.push(Token::with_value(TokenType::String, line, start, value));
        Ok(Step::Next)
    }

    fn value(&mut self, line: u32, column: u32, ch: char) -> Result<Step> {
        let Mode::Value { kind, buf, .. } = &mut self.context.mode else {
            return Ok(Step::Redispatch);
        };
        if ch == '_' {
            return Ok(Step::Next);
        }
        if *kind == TokenType::Decimal && matches!(ch, 'x' | 'X' | 'o' | 'O' | 'b' | 'B') {
            if buf.as_str() != "0" {
                return Err(self.syntax(
                    line,
                    column,
                    format!("radix prefix {ch:?} is only allowed directly after a leading 0"),
                ));
            }
            *kind = match ch.to_ascii_lowercase() {
                'x' => TokenType::Hexadecimal,
                'o' => TokenType::Octal,
                _ => TokenType::Binary,
            };
            buf.clear();
            return Ok(Step::Next);
        }
        if is_digit_of(*kind, ch) {
            buf.push(ch);
            return Ok(Step::Next);
        }
        let kind = *kind;
        if ch.is_ascii_alphanumeric() {
            return Err(self.syntax(
                line,
                column,
                format!("invalid digit {ch:?} in {} literal", kind.name().to_lowercase()),
            ));
        }
        let Mode::Value { kind, start, buf } = self.context.take() else {
            unreachable!("mode checked above");
        };
        if buf.is_empty() {
            return Err(self.syntax(line, start, "numeric literal has no digits"));
        }
        let value = self.si.get_or_intern(buf);
        self.push(Token::with_value(kind, line, start, value));
        Ok(Step::Redispatch)
    }

    fn name(&mut self, line: u32, _column: u32, ch: char) -> Result<Step> {
        let Mode::Name { buf, .. } = &mut self.context.mode else {
            return Ok(Step::Redispatch);
        };
        if is_name_continue(ch) {
            buf.push(ch);
            return Ok(Step::Next);
        }
        let Mode::Name { start, buf } = self.context.take() else {
            unreachable!("mode checked above");
        };
        let kind = match TokenType::keyword(&buf) {
            Some(keyword) => keyword,
            None if is_register(&buf) => TokenType::Register,
            None => TokenType::Name,
        };
        let value = self.si.get_or_intern(buf);
        self.push(Token::with_value(kind, line, start, value));
        Ok(Step::Redispatch)
    }

    fn argument(&mut self, line: u32, column: u32, ch: char) -> Result<Step> {
        let Mode::Argument { buf } = &mut self.context.mode else {
            return Ok(Step::Redispatch);
        };
        match buf.len() {
            0 if matches!(ch, 'r' | 'i' | 'a') => buf.push(ch),
            0 => {
                return Err(self.syntax(
                    line,
                    column,
                    format!("argument class must be one of 'r', 'i' or 'a', found {ch:?}"),
                ))
            }
            1 if ch.is_ascii_digit() => buf.push(ch),
            1 => {
                return Err(self.syntax(
                    line,
                    column,
                    format!("argument index must be a digit, found {ch:?}"),
                ))
            }
            _ => {
                let Mode::Argument { buf } = self.context.take() else {
                    unreachable!("mode checked above");
                };
                let value = self.si.get_or_intern(buf);
                self.push(Token::with_value(TokenType::Argument, line, column - 3, value));
                return Ok(Step::Redispatch);
            }
        }
        Ok(Step::Next)
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn syntax(&self, line: u32, column: u32, message: impl Into<String>) -> Error {
        Error::new(self.path, self.src, line, ErrorKind::Syntax, message).at(column)
    }
}
