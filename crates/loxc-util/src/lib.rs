//! Shared infrastructure for the `loxc` crates: string interning and the
//! diagnostic `Handler` used by the lexer, parser, and evaluator alike.

mod diagnostic;
mod symbol;

pub use diagnostic::{Diagnostic, Handler, Level, Phase};
pub use symbol::Symbol;
