use std::fmt::{self, Display, Formatter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::token::Token;

#[cfg(test)]
mod test;

const WIDTH: usize = 80;
const CONTEXT: usize = 6;
const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    String,
    Include,
    Value,
    Reference,
    Instruction,
    Recursion,
}

impl ErrorKind {
    pub fn title(self) -> &'static str {
        match self {
            ErrorKind::Syntax => "Syntax Error",
            ErrorKind::String => "String Error",
            ErrorKind::Include => "Include Error",
            ErrorKind::Value => "Value Error",
            ErrorKind::Reference => "Reference Error",
            ErrorKind::Instruction => "Instruction Error",
            ErrorKind::Recursion => "Recursion Error",
        }
    }
}

/// A fatal assembler error, bound to a module and a 0-based source line.
#[derive(Debug, Clone)]
pub struct Error {
    pub path: PathBuf,
    pub source: Arc<str>,
    pub line: u32,
    pub column: Option<u32>,
    pub kind: ErrorKind,
    pub message: String,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn new(
        path: &Path,
        source: &Arc<str>,
        line: u32,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.to_path_buf(),
            source: Arc::clone(source),
            line,
            column: None,
            kind,
            message: message.into(),
        }
    }

    /// An error with no source text to point into, such as an unreadable root file.
    pub fn bare(path: &Path, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(path, &Arc::from(""), 0, kind, message)
    }

    pub fn at(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }

    pub fn at_token(self, token: &Token) -> Self {
        let mut err = self.at(token.column);
        err.line = token.line;
        err
    }

    pub fn report(&self) -> String {
        let rule = "-".repeat(WIDTH);
        let lines: Vec<&str> = self.source.lines().collect();
        let line = self.line as usize;

        let mut out = String::new();
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{:^WIDTH$}", "FATAL ERROR");
        let _ = writeln!(out, "{rule}\n");
        let header = match self.column {
            Some(column) => format!(
                "File \"{}\" | Line {} | Column {}",
                self.path.display(),
                line + 1,
                column + 1
            ),
            None => format!("File \"{}\" | Line {}", self.path.display(), line + 1),
        };
        let _ = writeln!(out, "{header:^WIDTH$}\n");

        if line > CONTEXT {
            out.push_str("         ...\n\n");
        }
        let first = line.saturating_sub(CONTEXT);
        for i in first..=line + CONTEXT {
            let Some(code) = lines.get(i) else {
                break;
            };
            let marker = if i == line { ">>>" } else { "   " };
            let _ = writeln!(out, "{marker} {:<5}{}", i + 1, render_tabs(code, TAB_WIDTH));
        }
        if line + CONTEXT + 1 < lines.len() {
            out.push_str("\n         ...\n");
        }

        let _ = write!(out, "\n{rule}\n\n");
        let _ = write!(out, "{}:\n\n{}\n\n", self.kind.title(), self.message);
        out.push_str(&rule);
        out
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line + 1)?;
        if let Some(column) = self.column {
            write!(f, ":{}", column + 1)?;
        }
        write!(f, ": {}: {}", self.kind.title(), self.message)
    }
}

impl std::error::Error for Error {}

/// Expands tabs to the next multiple of `width`.
pub fn render_tabs(src: &str, width: usize) -> String {
    let mut out = String::with_capacity(src.len());
    let mut index = 0;
    for ch in src.chars() {
        match ch {
            '\t' => {
                let pad = width - index % width;
                out.extend(std::iter::repeat(' ').take(pad));
                index += pad;
            }
            '\n' => {
                out.push(ch);
                index = 0;
            }
            _ => {
                out.push(ch);
                index += 1;
            }
        }
    }
    out
}
