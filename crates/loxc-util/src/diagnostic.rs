use std::cell::RefCell;
use std::fmt;

/// Which pipeline stage raised a diagnostic. Drives the CLI's exit-code
/// choice: lexical and parse errors both select exit code 65, runtime
/// errors select 70.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lexical,
    Parse,
    Runtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "Error"),
        }
    }
}

/// A single reported problem, already formatted the way the CLI prints it.
/// Lexical/parse diagnostics render as `[line N] Error: MESSAGE`; runtime
/// diagnostics are pre-formatted by their `RuntimeError` and stored with
/// `rendered` carrying the full two-line form.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub phase: Phase,
    pub line: u32,
    pub rendered: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// Accumulates diagnostics across a run without aborting the process.
/// Shared by the scanner (which keeps emitting tokens after an error) and,
/// through the CLI driver, by the parser and evaluator.
#[derive(Debug, Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    /// `message` is the text that follows the `[line N] ` prefix for
    /// lexical/parse diagnostics: lexical callers pass the bare reason
    /// (`"Unexpected character: X"`, prefixed here with `"Error: "`); parse
    /// callers compose the full `"Error at ...: ..."` text themselves,
    /// since which form applies (`at 'LEXEME'` vs `at end`) is a parser
    /// concern. Runtime callers pass the bare message; the `[line N] `
    /// marker is appended on its own line afterwards.
    pub fn report(&self, phase: Phase, line: u32, message: impl Into<String>) {
        let message = message.into();
        let rendered = match phase {
            Phase::Lexical => format!("[line {line}] Error: {message}"),
            Phase::Parse => format!("[line {line}] {message}"),
            Phase::Runtime => format!("{message}\n[line {line}] "),
        };
        self.diagnostics.borrow_mut().push(Diagnostic {
            phase,
            line,
            rendered,
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.borrow().is_empty()
    }

    pub fn has_phase(&self, phase: Phase) -> bool {
        self.diagnostics.borrow().iter().any(|d| d.phase == phase)
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexical_report_formats_with_line_prefix() {
        let handler = Handler::new();
        handler.report(Phase::Lexical, 3, "Unexpected character: $");
        let diags = handler.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].rendered, "[line 3] Error: Unexpected character: $");
    }

    #[test]
    fn has_phase_distinguishes_families() {
        let handler = Handler::new();
        handler.report(Phase::Parse, 1, "Error at 'x': Expect expression.");
        assert!(handler.has_phase(Phase::Parse));
        assert!(!handler.has_phase(Phase::Runtime));
    }

    #[test]
    fn runtime_report_puts_line_marker_on_second_line() {
        let handler = Handler::new();
        handler.report(Phase::Runtime, 2, "Undefined variable 'a'.");
        let diags = handler.diagnostics();
        assert_eq!(diags[0].rendered, "Undefined variable 'a'.\n[line 2] ");
    }
}
