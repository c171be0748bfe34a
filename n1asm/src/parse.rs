use std::path::Path;
use std::sync::Arc;

use string_interner::{DefaultBackend, StringInterner};

use crate::error::{Error, ErrorKind, Result};
use crate::token::{self, Token, TokenType};
use crate::{Constant, Export, Include, Instruction, Label, Macro, Resource, Variable};


/// Keywords with the number of arguments their statement takes. Zero means
/// the statement is free-form.
const KEYWORDS: [(TokenType, usize); 6] = [
    (TokenType::Code, 0),
    (TokenType::Include, 0),
    (TokenType::Export, 1),
    (TokenType::Constant, 2),
    (TokenType::Variable, 2),
    (TokenType::Resource, 2),
];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub includes: Vec<Include>,
    pub exports: Vec<Export>,
    pub constants: Vec<Constant>,
    pub variables: Vec<Variable>,
    pub resources: Vec<Resource>,
    pub macros: Vec<Macro>,
    pub labels: Vec<Label>,
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Definition(MacroState),
    /// Holds the `@` of a `@func` still waiting for its label.
    Code { decorator: Option<Token> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MacroState {
    Idle,
    /// `@macro` seen, header expected on the next line.
    Header(Token),
    Body,
}

pub struct Parser<'a> {
    path: &'a Path,
    src: &'a Arc<str>,
    si: &'a StringInterner<DefaultBackend>,
    section: Section,
    out: Parsed,
}

impl<'a> Parser<'a> {
    pub fn new(path: &'a Path, src: &'a Arc<str>, si: &'a StringInterner<DefaultBackend>) -> Self {
        Self {
            path,
            src,
            si,
            section: Section::Definition(MacroState::Idle),
            out: Parsed::default(),
        }
    }

    pub fn parse(mut self, lines: &[Vec<Token>]) -> Result<Parsed> {
        for line in lines.iter().filter(|l| !l.is_empty()) {
            self.line(line)?;
        }
        self.finish()?;
        Ok(self.out)
    }

    fn line(&mut self, line: &[Token]) -> Result<()> {
        match self.section {
            Section::Definition(MacroState::Idle) => self.definition(line),
            Section::Definition(_) => self.macro_line(line),
            Section::Code { .. } => self.code(line),
        }
    }

    fn finish(&mut self) -> Result<()> {
        match self.section {
            Section::Definition(MacroState::Header(at)) => {
                Err(self.syntax(&at, "'@macro' is not followed by a macro header"))
            }
            Section::Code {
                decorator: Some(at),
            } => Err(self.floating(&at)),
            _ => Ok(()),
        }
    }

    fn definition(&mut self, line: &[Token]) -> Result<()> {
        self.check_keywords(line)?;
        let first = line[0];
        match first.kind {
            TokenType::Code => {
                self.section = Section::Code { decorator: None };
            }
            TokenType::Include => {
                if line.len() < 3 || !line[1].is(TokenType::Space) {
                    return Err(self.syntax(&first, "'include' expects a space and a module path"));
                }
                self.out.includes.push(Include {
                    path: line[2..].to_vec(),
                });
            }
            TokenType::Export => self.out.exports.push(Export { name: line[2] }),
            TokenType::Constant => self.out.constants.push(Constant {
                name: line[2],
                value: line[5],
            }),
            TokenType::Variable => self.out.variables.push(Variable {
                name: line[2],
                size: line[5],
            }),
            TokenType::Resource => self.out.resources.push(Resource {
                name: line[2],
                value: line[5],
            }),
            TokenType::At => self.definition_decorator(line)?,
            _ => {
                return Err(self.syntax(
                    &first,
                    format!(
                        "invalid token {} at start of line in definition section",
                        first.kind
                    ),
                ))
            }
        }
        Ok(())
    }

    /// Every keyword found in the line has to lead it, and fixed-arity
    /// keywords have to match their layout exactly.
    fn check_keywords(&self, line: &[Token]) -> Result<()> {
        for (kind, args) in KEYWORDS {
            let word = keyword_text(kind);
            if let Some(misplaced) = line.iter().skip(1).find(|t| t.is(kind)) {
                return Err(self.syntax(
                    misplaced,
                    format!("'{word}' must be the first token of the line"),
                ));
            }
            if args == 0 || !line[0].is(kind) {
                continue;
            }
            let arity = 3 * args;
            if line.len() != arity {
                return Err(self.syntax(
                    &line[0],
                    format!(
                        "'{word}' expects {args} argument(s) ({arity} tokens), found {} tokens",
                        line.len()
                    ),
                ));
            }
            if !line[1].is(TokenType::Space) {
                return Err(self.syntax(
                    &line[1],
                    format!("'{word}' must be followed by exactly one space"),
                ));
            }
            if args == 2 && !(line[3].is(TokenType::Comma) && line[4].is(TokenType::Space)) {
                return Err(self.syntax(
                    &line[3],
                    format!("arguments of '{word}' must be separated by a comma and one space"),
                ));
            }
            if !line[2].is(TokenType::Name) {
                return Err(self.syntax(
                    &line[2],
                    format!("first argument of '{word}' must be a name, found {}", line[2].kind),
                ));
            }
        }
        Ok(())
    }

    fn definition_decorator(&mut self, line: &[Token]) -> Result<()> {
        let at = line[0];
        let name = self.decorator_name(line)?;
        match name.as_str() {
            "func" => Err(self.syntax(
                &at,
                "'@func' decorates labels in the code section only",
            )),
            "macro" if line.len() == 2 => {
                self.section = Section::Definition(MacroState::Header(at));
                Ok(())
            }
            "macro" => {
                if !line[2].is(TokenType::Space) {
                    return Err(self.syntax(&line[2], "expected a space after '@macro'"));
                }
                self.macro_header(&line[3..], &at)?;
                self.section = Section::Definition(MacroState::Body);
                Ok(())
            }
            _ => Err(self.syntax(&line[1], format!("unknown decorator '@{name}'"))),
        }
    }

    fn decorator_name(&self, line: &[Token]) -> Result<String> {
        match line.get(1) {
            Some(name) if name.is(TokenType::Name) => Ok(self.text(name).to_ascii_lowercase()),
            Some(other) => Err(self.syntax(
                other,
                format!("'@' must be followed by a decorator name, found {}", other.kind),
            )),
            None => Err(self.syntax(&line[0], "'@' must be followed by a decorator name")),
        }
    }

    fn macro_line(&mut self, line: &[Token]) -> Result<()> {
        match self.section {
            Section::Definition(MacroState::Header(at)) => {
                self.macro_header(line, &at)?;
                self.section = Section::Definition(MacroState::Body);
                Ok(())
            }
            _ if !line[0].is(TokenType::Name) => {
                self.section = Section::Definition(MacroState::Idle);
                self.definition(line)
            }
            _ => self.macro_body(line),
        }
    }

    /// `name:`, `name args:` or `name: args`.
    fn macro_header(&mut self, line: &[Token], at: &Token) -> Result<()> {
        let Some(&name) = line.first() else {
            return Err(self.syntax(at, "missing macro header"));
        };
        if !name.is(TokenType::Name) {
            return Err(self.syntax(
                &name,
                format!("macro header must start with a name, found {}", name.kind),
            ));
        }
        let args = match line {
            [_, colon] if colon.is(TokenType::Colon) => &line[..0],
            [_, colon, space, args @ ..] if colon.is(TokenType::Colon) => {
                if !space.is(TokenType::Space) {
                    return Err(self.syntax(space, "expected a space after the macro name"));
                }
                args
            }
            [_, space, args @ .., colon] if colon.is(TokenType::Colon) => {
                if !space.is(TokenType::Space) {
                    return Err(self.syntax(space, "expected a space after the macro name"));
                }
                args
            }
            _ => {
                return Err(self.syntax(
                    &name,
                    "macro header must be 'name:' or 'name %args:'",
                ))
            }
        };
        let anchor = line[1];
        let arguments = if args.is_empty() && line.len() == 2 {
            Vec::new()
        } else {
            self.arguments(args, &anchor)?
        };
        if let Some(bad) = arguments.iter().find(|t| !t.is(TokenType::Argument)) {
            return Err(self.syntax(
                bad,
                format!("macro parameters must be arguments like '%r0', found {}", bad.kind),
            ));
        }
        self.out.macros.push(Macro {
            name,
            arguments,
            instructions: Vec::new(),
            labels: Vec::new(),
        });
        Ok(())
    }

    fn macro_body(&mut self, line: &[Token]) -> Result<()> {
        self.check_keywords(line)?;
        let first = line[0];
        let is_label = matches!(line, [_, colon] if colon.is(TokenType::Colon));
        let instruction = if is_label {
            None
        } else {
            Some(self.instruction(line)?)
        };
        let Some(current) = self.out.macros.last_mut() else {
            return Err(self.syntax(&first, "macro body without a macro header"));
        };
        match instruction {
            Some(instruction) => current.instructions.push(instruction),
            None => current.labels.push(Label {
                name: first,
                pointer: current.instructions.len(),
                function: false,
            }),
        }
        Ok(())
    }

    fn code(&mut self, line: &[Token]) -> Result<()> {
        let Section::Code { decorator } = self.section else {
            return Ok(());
        };
        let first = line[0];
        match first.kind {
            TokenType::At => {
                let name = self.decorator_name(line)?;
                if line.len() != 2 {
                    return Err(self.syntax(&line[2], "a decorator stands alone on its line"));
                }
                match name.as_str() {
                    "macro" => Err(self.syntax(
                        &first,
                        "macros must be defined in the definition section",
                    )),
                    "func" => {
                        if let Some(previous) = decorator {
                            return Err(self.floating(&previous));
                        }
                        self.section = Section::Code {
                            decorator: Some(first),
                        };
                        Ok(())
                    }
                    _ => Err(self.syntax(&line[1], format!("unknown decorator '@{name}'"))),
                }
            }
            TokenType::Name if matches!(line, [_, colon] if colon.is(TokenType::Colon)) => {
                self.out.labels.push(Label {
                    name: first,
                    pointer: self.out.instructions.len(),
                    function: decorator.is_some(),
                });
                self.section = Section::Code { decorator: None };
                Ok(())
            }
            TokenType::Name => {
                if let Some(previous) = decorator {
                    return Err(self.floating(&previous));
                }
                let instruction = self.instruction(line)?;
                self.out.instructions.push(instruction);
                Ok(())
            }
            _ => Err(self.syntax(
                &first,
                format!(
                    "invalid token {} at start of line in code section; expected an instruction, label or decorator",
                    first.kind
                ),
            )),
        }
    }

    fn instruction(&self, line: &[Token]) -> Result<Instruction> {
        let name = line[0];
        if line.len() == 1 {
            return Ok(Instruction {
                name,
                arguments: Vec::new(),
            });
        }
        if !line[1].is(TokenType::Space) {
            return Err(self.syntax(
                &line[1],
                format!("expected a space after the instruction name, found {}", line[1].kind),
            ));
        }
        let arguments = self.arguments(&line[2..], &line[1])?;
        Ok(Instruction { name, arguments })
    }

    /// Comma separated arguments. Every group has to reduce to a single token
    /// once blanks are gone.
    fn arguments(&self, tokens: &[Token], anchor: &Token) -> Result<Vec<Token>> {
        let commas: Vec<Token> = tokens
            .iter()
            .filter(|t| t.is(TokenType::Comma))
            .copied()
            .collect();
        let mut arguments = Vec::new();
        for (i, group) in token::split(tokens, TokenType::Comma).iter().enumerate() {
            let group = token::without(group, TokenType::Space);
            match group.as_slice() {
                [single] => arguments.push(*single),
                [] => {
                    let at = commas.get(i).unwrap_or(anchor);
                    return Err(self.syntax(at, "empty argument"));
                }
                [_, extra, ..] => {
                    return Err(self.syntax(
                        extra,
                        "an argument must be a single token; separate arguments with commas",
                    ))
                }
            }
        }
        Ok(arguments)
    }

    fn text(&self, token: &Token) -> &str {
        token.value.and_then(|v| self.si.resolve(v)).unwrap_or("")
    }

    fn syntax(&self, token: &Token, message: impl Into<String>) -> Error {
        Error::new(self.path, self.src, token.line, ErrorKind::Syntax, message).at_token(token)
    }

    fn floating(&self, at: &Token) -> Error {
        self.syntax(at, "floating decorator: '@func' must be directly followed by a label")
    }
}

fn keyword_text(kind: TokenType) -> &'static str {
    match kind {
        TokenType::Code => "code",
        TokenType::Include => "include",
        TokenType::Export => "export",
        TokenType::Constant => "const",
        TokenType::Variable => "var",
        TokenType::Resource => "res",
        _ => kind.name(),
    }
}
