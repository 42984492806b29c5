use std::fmt;

/// The closed set of token kinds this language recognizes. Control-flow and
/// declaration keywords (`class`, `fun`, `if`, `for`, `while`, `return`,
/// `super`, `this`) are recognized here even though no expression or
/// statement construct in this crate acts on them -- the scanner still
/// needs to classify them as reserved words rather than identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Star,
    Slash,
    Equal,
    EqualEqual,
    Bang,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    String,
    Number,
    Identifier,
    And,
    Or,
    Class,
    Else,
    False,
    True,
    Nil,
    For,
    Fun,
    If,
    Print,
    Return,
    Super,
    This,
    Var,
    While,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::LeftParen => "LEFT_PAREN",
            TokenKind::RightParen => "RIGHT_PAREN",
            TokenKind::LeftBrace => "LEFT_BRACE",
            TokenKind::RightBrace => "RIGHT_BRACE",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::Minus => "MINUS",
            TokenKind::Plus => "PLUS",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Star => "STAR",
            TokenKind::Slash => "SLASH",
            TokenKind::Equal => "EQUAL",
            TokenKind::EqualEqual => "EQUAL_EQUAL",
            TokenKind::Bang => "BANG",
            TokenKind::BangEqual => "BANG_EQUAL",
            TokenKind::Less => "LESS",
            TokenKind::LessEqual => "LESS_EQUAL",
            TokenKind::Greater => "GREATER",
            TokenKind::GreaterEqual => "GREATER_EQUAL",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Class => "CLASS",
            TokenKind::Else => "ELSE",
            TokenKind::False => "FALSE",
            TokenKind::True => "TRUE",
            TokenKind::Nil => "NIL",
            TokenKind::For => "FOR",
            TokenKind::Fun => "FUN",
            TokenKind::If => "IF",
            TokenKind::Print => "PRINT",
            TokenKind::Return => "RETURN",
            TokenKind::Super => "SUPER",
            TokenKind::This => "THIS",
            TokenKind::Var => "VAR",
            TokenKind::While => "WHILE",
            TokenKind::Eof => "EOF",
        };
        f.write_str(s)
    }
}

/// Looks up a reserved word by its exact text. Returns `None` for anything
/// that should be scanned as a plain identifier.
pub fn keyword_from_ident(text: &str) -> Option<TokenKind> {
    Some(match text {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "class" => TokenKind::Class,
        "else" => TokenKind::Else,
        "false" => TokenKind::False,
        "true" => TokenKind::True,
        "nil" => TokenKind::Nil,
        "for" => TokenKind::For,
        "fun" => TokenKind::Fun,
        "if" => TokenKind::If,
        "print" => TokenKind::Print,
        "return" => TokenKind::Return,
        "super" => TokenKind::Super,
        "this" => TokenKind::This,
        "var" => TokenKind::Var,
        "while" => TokenKind::While,
        _ => return None,
    })
}

/// A single scanned token. `literal` is the canonical display form used by
/// `tokenize` output: the unquoted string value for `STRING`, the
/// always-fractional numeric form for `NUMBER`, and `"null"` for everything
/// else.
///
/// Equality is defined over `lexeme` alone -- two tokens with different
/// kinds or literal values but identical source text compare equal. This
/// mirrors the grounding source, where a `Token`'s `__eq__` looks only at
/// `lexeme`, and the chained-unary-nesting rule in the parser (`OP OP x`)
/// relies on exactly that behavior to detect "same operator" regardless of
/// which concrete token type produced it.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub literal: String,
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, literal: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            literal: literal.into(),
            line,
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.lexeme == other.lexeme
    }
}
impl Eq for Token {}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.lexeme, self.literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_kind_and_literal() {
        let a = Token::new(TokenKind::Minus, "-", "null", 1);
        let b = Token::new(TokenKind::Bang, "-", "different", 99);
        assert_eq!(a, b);
    }

    #[test]
    fn display_matches_tokenize_format() {
        let t = Token::new(TokenKind::Number, "4", "4.0", 1);
        assert_eq!(t.to_string(), "NUMBER 4 4.0");
    }

    #[test]
    fn keyword_lookup() {
        assert_eq!(keyword_from_ident("print"), Some(TokenKind::Print));
        assert_eq!(keyword_from_ident("printx"), None);
    }
}
