use std::fmt::{Display, Formatter};

use crate::source::Source;

/// Error raised during parser construction, indicating a misuse of the grammar
/// builder (a cyclic rule body that is just another rule reference, an
/// unresolved cross-reference, a malformed regular expression, ...).
#[derive(Debug, Clone)]
pub struct GrammarError {
    message: String,
}

/// Error reserved for user rewriting-action code (the ASG rewriter never
/// raises this itself; it exists for [`crate::SemanticAction`] implementations
/// to signal a semantic problem found while building the ASG).
#[derive(Debug, Clone)]
pub struct SemanticError {
    message: String,
}

/// Recoverable parse-time failure: "expected input not found". Used
/// internally as the furthest-failure tracker and, once parsing is finally
/// abandoned, surfaced to the caller as the reason `parse` failed.
#[derive(Debug, Clone)]
pub struct NoMatch {
    pub(crate) expected: String,
    pub(crate) position: usize,
    pub(crate) propagating_up: bool,
}

impl GrammarError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
impl Display for GrammarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GrammarError: {}", self.message)
    }
}

impl SemanticError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
impl Display for SemanticError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SemanticError: {}", self.message)
    }
}

impl NoMatch {
    pub(crate) fn new(expected: impl Into<String>, position: usize) -> Self {
        Self {
            expected: expected.into(),
            position,
            propagating_up: true,
        }
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }
    pub fn position(&self) -> usize {
        self.position
    }

    /// Render as `"Expected <expected> at <line>:<col>"` (spec.md §6's
    /// "failure surface"), looking the position up through `source`'s
    /// lazily-built newline index.
    pub fn format(&self, source: &Source) -> String {
        format!("Expected {} at {}", self.expected, source.position_to_line_column(self.position))
    }
}

impl Display for NoMatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Expected {} at position {}", self.expected, self.position)
    }
}
