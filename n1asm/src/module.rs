use std::path::{Path, PathBuf};
use std::sync::Arc;

use string_interner::{DefaultBackend, StringInterner};

use crate::error::Result;
use crate::lex::LexOutput;
use crate::parse::{Parsed, Parser};
use crate::token::{self, Token};
use crate::{Constant, Export, Include, Instruction, Label, Macro, Resource, Variable};

#[cfg(test)]
mod test;

/// One source file, from raw text to its parsed declarations.
#[derive(Debug)]
pub struct Module {
    pub path: PathBuf,
    pub source: Arc<str>,
    pub si: StringInterner<DefaultBackend>,
    pub tokens: Vec<Token>,
    pub lines: Vec<Vec<Token>>,
    pub abstract_lines: Vec<Vec<Token>>,

    pub includes: Vec<Include>,
    pub exports: Vec<Export>,
    pub constants: Vec<Constant>,
    pub variables: Vec<Variable>,
    pub resources: Vec<Resource>,
    pub macros: Vec<Macro>,
    pub labels: Vec<Label>,
    pub instructions: Vec<Instruction>,

    /// Resolved includes, in source order.
    pub include_paths: Vec<PathBuf>,
}

impl Module {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            si: StringInterner::default(),
            tokens: Vec::new(),
            lines: Vec::new(),
            abstract_lines: Vec::new(),
            includes: Vec::new(),
            exports: Vec::new(),
            constants: Vec::new(),
            variables: Vec::new(),
            resources: Vec::new(),
            macros: Vec::new(),
            labels: Vec::new(),
            instructions: Vec::new(),
            include_paths: Vec::new(),
        }
    }

    /// Tokenizes then parses.
    pub fn build(path: impl Into<PathBuf>, source: impl Into<Arc<str>>) -> Result<Self> {
        let mut module = Self::new(path, source);
        module.tokenize()?;
        module.parse()?;
        Ok(module)
    }

    pub fn tokenize(&mut self) -> Result<()> {
        let LexOutput {
            tokens,
            lines,
            abstract_lines,
        } = LexOutput::lex_all(&self.path, &self.source, &mut self.si)?;
        tracing::trace!(
            path = %self.path.display(),
            tokens = tokens.len(),
            lines = abstract_lines.len(),
            "tokenized"
        );
        self.tokens = tokens;
        self.lines = lines;
        self.abstract_lines = abstract_lines;
        Ok(())
    }

    pub fn parse(&mut self) -> Result<()> {
        let Parsed {
            includes,
            exports,
            constants,
            variables,
            resources,
            macros,
            labels,
            instructions,
        } = Parser::new(&self.path, &self.source, &self.si).parse(&self.abstract_lines)?;
        self.includes = includes;
        self.exports = exports;
        self.constants = constants;
        self.variables = variables;
        self.resources = resources;
        self.macros = macros;
        self.labels = labels;
        self.instructions = instructions;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Interned text of a token; empty for tokens without a value.
    pub fn text(&self, token: &Token) -> &str {
        token.value.and_then(|v| self.si.resolve(v)).unwrap_or("")
    }

    pub fn number(&self, token: &Token) -> Option<u32> {
        token::number(token.kind, self.text(token))
    }

    /// Raw text of a 0-based source line.
    pub fn source_line(&self, line: u32) -> Option<&str> {
        self.source.lines().nth(line as usize)
    }

    /// Tokens of a physical line, comments and blanks included.
    pub fn line_tokens(&self, line: u32) -> &[Token] {
        self.lines.get(line as usize).map_or(&[], Vec::as_slice)
    }
}
