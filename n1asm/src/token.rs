use string_interner::DefaultSymbol;

#[cfg(test)]
mod test;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Space,
    Newline,
    Comment,
    Colon,
    Comma,
    Slash,
    At,
    Dollar,
    Asterisk,

    String,
    Decimal,
    Hexadecimal,
    Octal,
    Binary,
    Argument,

    Name,
    Register,

    Include,
    Export,
    Code,
    Constant,
    Variable,
    Resource,
}

impl TokenType {
    pub fn name(self) -> &'static str {
        use TokenType::*;
        match self {
            Space => "SPACE",
            Newline => "NEWLINE",
            Comment => "COMMENT",
            Colon => "COLON",
            Comma => "COMMA",
            Slash => "SLASH",
            At => "AT",
            Dollar => "DOLLAR",
            Asterisk => "ASTERISK",
            String => "STRING",
            Decimal => "DECIMAL",
            Hexadecimal => "HEXADECIMAL",
            Octal => "OCTAL",
            Binary => "BINARY",
            Argument => "ARGUMENT",
            Name => "NAME",
            Register => "REGISTER",
            Include => "INCLUDE",
            Export => "EXPORT",
            Code => "CODE",
            Constant => "CONSTANT",
            Variable => "VARIABLE",
            Resource => "RESOURCE",
        }
    }

    pub fn is_keyword(self) -> bool {
        use TokenType::*;
        matches!(
            self,
            Include | Export | Code | Constant | Variable | Resource
        )
    }

    pub fn is_number(self) -> bool {
        self.radix().is_some()
    }

    pub fn radix(self) -> Option<u32> {
        match self {
            TokenType::Decimal => Some(10),
            TokenType::Hexadecimal => Some(16),
            TokenType::Octal => Some(8),
            TokenType::Binary => Some(2),
            _ => None,
        }
    }

    /// Keyword for an identifier, compared case-insensitively.
    pub fn keyword(ident: &str) -> Option<Self> {
        Some(match ident.to_ascii_lowercase().as_str() {
            "include" => TokenType::Include,
            "export" => TokenType::Export,
            "code" => TokenType::Code,
            "const" => TokenType::Constant,
            "var" => TokenType::Variable,
            "res" => TokenType::Resource,
            _ => return None,
        })
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexed token. Tokens are positional: `line` is 0-based and `column` is the
/// byte offset inside that line. Text is kept in the owning module's interner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenType,
    pub line: u32,
    pub column: u32,
    pub value: Option<DefaultSymbol>,
}

impl Token {
    pub fn new(kind: TokenType, line: u32, column: u32) -> Self {
        Self {
            kind,
            line,
            column,
            value: None,
        }
    }
    pub fn with_value(kind: TokenType, line: u32, column: u32, value: DefaultSymbol) -> Self {
        Self {
            kind,
            line,
            column,
            value: Some(value),
        }
    }
    pub fn is(&self, kind: TokenType) -> bool {
        self.kind == kind
    }
}

/// Value of a numeric literal's digits in the radix of `kind`.
pub fn number(kind: TokenType, digits: &str) -> Option<u32> {
    u32::from_str_radix(digits, kind.radix()?).ok()
}

pub fn types(tokens: &[Token]) -> Vec<TokenType> {
    tokens.iter().map(|t| t.kind).collect()
}

pub fn contains(tokens: &[Token], kind: TokenType) -> bool {
    tokens.iter().any(|t| t.kind == kind)
}

/// Copy of `tokens` with every token of `kind` removed.
pub fn without(tokens: &[Token], kind: TokenType) -> Vec<Token> {
    tokens.iter().filter(|t| t.kind != kind).copied().collect()
}

/// Splits at every `separator`, dropping the separators. A trailing empty
/// group is dropped; without any separator the whole input is the only group.
pub fn split(tokens: &[Token], separator: TokenType) -> Vec<Vec<Token>> {
    let mut groups = vec![Vec::new()];
    for token in tokens {
        if token.kind == separator {
            groups.push(Vec::new());
        } else if let Some(last) = groups.last_mut() {
            last.push(*token);
        }
    }
    if groups.len() > 1 && groups.last().is_some_and(Vec::is_empty) {
        groups.pop();
    }
    groups
}
