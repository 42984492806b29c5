use loxc_util::{Handler, Phase};

use crate::cursor::Cursor;
use crate::token::{keyword_from_ident, Token, TokenKind};

/// Scans a source string into a lazy sequence of [`Token`]s.
///
/// Errors do not abort scanning: an invalid character or an unterminated
/// string is reported to the shared [`Handler`] and scanning resumes at the
/// next character, so a single pass always surfaces every lexical error in
/// the file. The stream always ends with exactly one `EOF` token.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    handler: &'a Handler,
    eof_emitted: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, handler: &'a Handler) -> Self {
        tracing::debug!(bytes = source.len(), "starting scan");
        Self {
            cursor: Cursor::new(source),
            handler,
            eof_emitted: false,
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            if self.cursor.at_end() {
                return;
            }
            let c = self.cursor.peek();
            if c.is_whitespace() {
                self.cursor.advance();
            } else if c == '/' && self.cursor.peek_at(1) == '/' {
                self.cursor.advance_until('\n');
            } else {
                return;
            }
        }
    }

    fn lex_identifier(&mut self, line: u32) -> Token {
        let start = self.cursor.position();
        while !self.cursor.at_end() {
            let c = self.cursor.peek();
            if c.is_ascii_alphanumeric() || c == '_' {
                self.cursor.advance();
            } else {
                break;
            }
        }
        let text = self.cursor.slice_from(start);
        match keyword_from_ident(text) {
            Some(kind) => Token::new(kind, text, "null", line),
            None => Token::new(TokenKind::Identifier, text, "null", line),
        }
    }

    fn lex_number(&mut self, line: u32) -> Token {
        let start = self.cursor.position();
        while self.cursor.peek().is_ascii_digit() {
            self.cursor.advance();
        }
        if self.cursor.peek() == '.' && self.cursor.peek_at(1).is_ascii_digit() {
            self.cursor.advance();
            while self.cursor.peek().is_ascii_digit() {
                self.cursor.advance();
            }
        }
        let lexeme = self.cursor.slice_from(start);
        let value: f64 = lexeme.parse().unwrap_or(0.0);
        Token::new(TokenKind::Number, lexeme, format_number_literal(value), line)
    }

    fn lex_string(&mut self, line: u32) -> Option<Token> {
        self.cursor.advance(); // opening quote
        let raw = self.cursor.advance_until('"');
        if raw.ends_with('"') {
            let content = &raw[..raw.len() - 1];
            let lexeme = format!("\"{content}\"");
            Some(Token::new(TokenKind::String, lexeme, content, line))
        } else {
            self.handler.report(Phase::Lexical, line, "Unterminated string.");
            None
        }
    }

    /// Scans and returns the next token, or `None` once the single `EOF`
    /// marker has already been produced.
    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            self.skip_whitespace_and_comments();

            if self.cursor.at_end() {
                if self.eof_emitted {
                    return None;
                }
                self.eof_emitted = true;
                return Some(Token::new(TokenKind::Eof, "", "null", self.cursor.line()));
            }

            let line = self.cursor.line();
            let c = self.cursor.peek();

            macro_rules! single {
                ($kind:expr, $lex:expr) => {{
                    self.cursor.advance();
                    return Some(Token::new($kind, $lex, "null", line));
                }};
            }
            macro_rules! one_or_two {
                ($second:expr, $two_kind:expr, $two_lex:expr, $one_kind:expr, $one_lex:expr) => {{
                    self.cursor.advance();
                    if self.cursor.match_char($second) {
                        return Some(Token::new($two_kind, $two_lex, "null", line));
                    }
                    return Some(Token::new($one_kind, $one_lex, "null", line));
                }};
            }

            match c {
                '(' => single!(TokenKind::LeftParen, "("),
                ')' => single!(TokenKind::RightParen, ")"),
                '{' => single!(TokenKind::LeftBrace, "{"),
                '}' => single!(TokenKind::RightBrace, "}"),
                ',' => single!(TokenKind::Comma, ","),
                '.' => single!(TokenKind::Dot, "."),
                '-' => single!(TokenKind::Minus, "-"),
                '+' => single!(TokenKind::Plus, "+"),
                ';' => single!(TokenKind::Semicolon, ";"),
                '*' => single!(TokenKind::Star, "*"),
                '/' => single!(TokenKind::Slash, "/"),
                '=' => one_or_two!('=', TokenKind::EqualEqual, "==", TokenKind::Equal, "="),
                '!' => one_or_two!('=', TokenKind::BangEqual, "!=", TokenKind::Bang, "!"),
                '<' => one_or_two!('=', TokenKind::LessEqual, "<=", TokenKind::Less, "<"),
                '>' => one_or_two!('=', TokenKind::GreaterEqual, ">=", TokenKind::Greater, ">"),
                '"' => {
                    if let Some(tok) = self.lex_string(line) {
                        return Some(tok);
                    }
                    continue;
                }
                c if c.is_ascii_digit() => return Some(self.lex_number(line)),
                c if c.is_ascii_alphabetic() || c == '_' => return Some(self.lex_identifier(line)),
                other => {
                    self.cursor.advance();
                    self.handler
                        .report(Phase::Lexical, line, format!("Unexpected character: {other}"));
                    continue;
                }
            }
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

/// Formats a number the way the canonical literal display does: always
/// fractional, with trailing zeros collapsed but at least one digit kept
/// (`4` -> `4.0`, `4.50` -> `4.5`).
fn format_number_literal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
