//! Lexical scanner: turns source text into a stream of [`Token`]s.

mod cursor;
mod lexer;
mod token;

pub use cursor::{Cursor, CursorSnapshot};
pub use lexer::Lexer;
pub use token::{keyword_from_ident, Token, TokenKind};
