//! Error handling for the `loxc` driver.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the driver itself, as opposed to the lexical/parse/
/// runtime diagnostics the interpreter phases report through `Handler`.
#[derive(Error, Debug)]
pub enum DrvError {
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
}

pub type Result<T> = std::result::Result<T, DrvError>;
