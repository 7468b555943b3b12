use std::fmt;

use crate::lexer::{Token, TokenType};

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    LexError,
    ParseError,
    RuntimeError,
}

/// A diagnostic from any phase of the pipeline.
///
/// The message is stored pre-formatted in the shape the driver contract
/// expects, so `report` only has to write it to stderr.
#[derive(Debug, Clone)]
pub struct SetkerError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SetkerError {
    pub fn new(kind: ErrorKind, message: String) -> Self {
        Self { kind, message }
    }

    /// Lexical error: `[line L] Error: <message>`
    pub fn lex_error(line: usize, message: String) -> Self {
        Self::new(ErrorKind::LexError, format!("[line {}] Error: {}", line, message))
    }

    /// Syntax error anchored at a token: `Error at '<lexeme>': <message>`,
    /// or `Error at end: <message>` when the cursor sits on EOF.
    pub fn parse_error_at(token: &Token, message: &str) -> Self {
        let text = if token.token_type == TokenType::Eof {
            format!("Error at end: {}", message)
        } else {
            format!("Error at '{}': {}", token.lexeme, message)
        };
        Self::new(ErrorKind::ParseError, text)
    }

    pub fn runtime_error(message: String) -> Self {
        Self::new(ErrorKind::RuntimeError, message)
    }

    /// Appends the synthetic `[line N]` suffix while a runtime error unwinds
    /// through a program or block node. N is the 1-based index of the child
    /// statement that was executing, not a source line.
    pub fn with_statement_line(mut self, index: usize) -> Self {
        self.message = format!("{}\n[line {}]", self.message, index);
        self
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind {
            ErrorKind::LexError | ErrorKind::ParseError => 65,
            ErrorKind::RuntimeError => 70,
        }
    }

    pub fn report(&self) {
        eprintln!("{}", self.message);
    }
}

impl fmt::Display for SetkerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SetkerError {}
