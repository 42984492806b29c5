//! loxc-drv - Interpreter Driver
//!
//! Orchestrates the four pipeline subcommands (`tokenize`, `parse`,
//! `evaluate`, `run`) over a single source file: read it, drive the
//! scanner/parser/evaluator phases in the order the subcommand requires,
//! and translate the shared diagnostic `Handler`'s state into an exit
//! code (0 success, 65 scan/parse error, 70 runtime error).

mod error;

use std::path::PathBuf;

use loxc_eval::Interpreter;
use loxc_lex::Lexer;
use loxc_par::{ParseEvent, Parser};
use loxc_util::{Handler, Phase};

pub use error::{DrvError, Result};

/// Which pipeline phase to run and stop at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Tokenize,
    Parse,
    Evaluate,
    Run,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub path: PathBuf,
    pub command: Command,
    pub verbose: bool,
    pub no_color: bool,
}

/// One invocation of the driver over a single source file.
pub struct Session {
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the configured subcommand and returns the process exit code.
    pub fn run(&self) -> Result<i32> {
        let source = std::fs::read_to_string(&self.config.path)
            .map_err(|e| DrvError::Read(self.config.path.clone(), e))?;

        let handler = Handler::new();
        let code = match self.config.command {
            Command::Tokenize => self.run_tokenize(&source, &handler),
            Command::Parse => self.run_parse(&source, &handler),
            Command::Evaluate => self.run_evaluate(&source, &handler),
            Command::Run => self.run_run(&source, &handler),
        };

        for diagnostic in handler.diagnostics() {
            eprintln!("{diagnostic}");
        }

        Ok(code)
    }

    fn run_tokenize(&self, source: &str, handler: &Handler) -> i32 {
        tracing::debug!(file = %self.config.path.display(), "tokenizing");
        for token in Lexer::new(source, handler) {
            println!("{token}");
        }
        if handler.has_errors() {
            65
        } else {
            0
        }
    }

    fn run_parse(&self, source: &str, handler: &Handler) -> i32 {
        tracing::debug!(file = %self.config.path.display(), "parsing");
        let tokens: Vec<_> = Lexer::new(source, handler).collect();
        if handler.has_errors() {
            return 65;
        }
        let events = Parser::new(tokens, handler).parse();
        if handler.has_errors() {
            return 65;
        }
        for event in events {
            if let ParseEvent::Statement(expr) = event {
                println!("{}", loxc_par::render(&expr));
            }
        }
        0
    }

    fn run_evaluate(&self, source: &str, handler: &Handler) -> i32 {
        tracing::debug!(file = %self.config.path.display(), "evaluating");
        let tokens: Vec<_> = Lexer::new(source, handler).collect();
        if handler.has_errors() {
            return 65;
        }
        let events = Parser::new(tokens, handler).parse();
        if handler.has_errors() {
            return 65;
        }

        let mut interpreter = Interpreter::new(handler);
        match interpreter.run(events) {
            Ok(values) => {
                for value in values {
                    println!("{value}");
                }
                0
            }
            Err(err) => {
                handler.report(Phase::Runtime, err.line, err.error.to_string());
                70
            }
        }
    }

    fn run_run(&self, source: &str, handler: &Handler) -> i32 {
        tracing::debug!(file = %self.config.path.display(), "running");
        let tokens: Vec<_> = Lexer::new(source, handler).collect();
        if handler.has_errors() {
            return 65;
        }
        let events = Parser::new(tokens, handler).parse();
        if handler.has_errors() {
            return 65;
        }

        let mut interpreter = Interpreter::new(handler);
        match interpreter.run(events) {
            Ok(_) => 0,
            Err(err) => {
                handler.report(Phase::Runtime, err.line, err.error.to_string());
                70
            }
        }
    }
}
