use thiserror::Error;

/// The runtime error family. Message text is transcribed verbatim from the
/// grounding source's `errors.py` hierarchy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Operands must be numbers.")]
    OperandMustBeNumber,
    #[error("Operands must be two numbers or two strings.")]
    OperandsMismatch,
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),
    /// Covers the grounding source's bare `RuntimeError`: popping the root
    /// scope, and a `var` declaration whose right-hand side is neither a
    /// bare identifier nor an assignment targeting one.
    #[error("General RuntimeError")]
    General,
}

/// A [`RuntimeError`] paired with the source line it occurred on, unlike
/// the grounding source, which always reports runtime errors on line 1
/// regardless of where the failing expression actually lives. This crate
/// threads the real line through instead.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeErrorAt {
    pub error: RuntimeError,
    pub line: u32,
}

impl RuntimeErrorAt {
    pub fn new(error: RuntimeError, line: u32) -> Self {
        Self { error, line }
    }
}
