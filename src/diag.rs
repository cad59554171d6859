//! Diagnostics shared by every pipeline stage.
//!
//! Each stage accumulates its own list of [`Diagnostic`]s and returns it;
//! no stage ever panics or throws across a stage boundary. The rendered
//! form is always `"Error on line <N>: <message>"`, which is what the
//! front end displays, while [`ErrorKind`] gives callers something they
//! can match on.

use std::fmt;

/// Closed set of everything that can go wrong, across all four stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // Lexer
    InvalidIdentifier,
    UnknownCharacter,
    UnterminatedString,
    KeywordLookalike,
    // Parser
    MissingDelimiter,
    MismatchedBlock,
    DuplicateDeclaration,
    UndeclaredVariable,
    ArgumentCount,
    MalformedStatement,
    // Semantic analyzer
    OperandType,
    ArgumentType,
    // Executor
    UnsupportedCast,
    MissingSymbol,
    UndefinedFunction,
    DivisionByZero,
    IterationLimit,
    RecursionLimit,
}

/// A single diagnostic: structured kind plus the human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }

    /// Warnings are reported but do not fail their stage.
    pub fn is_warning(&self) -> bool {
        matches!(self.kind, ErrorKind::KeywordLookalike)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error on line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for Diagnostic {}

/// True if nothing in the list should fail the stage that produced it.
pub fn all_warnings(diags: &[Diagnostic]) -> bool {
    diags.iter().all(Diagnostic::is_warning)
}
