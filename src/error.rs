use std::fmt::Display;

use thiserror::Error;

/// A command-line or config token that names no known variant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} '{given}' (expected one of: {expected})")]
pub struct ParseNameError {
    kind: &'static str,
    given: String,
    expected: String,
}

impl ParseNameError {
    pub fn new<T: Display>(kind: &'static str, given: &str, expected: &[T]) -> Self {
        let expected = expected
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        ParseNameError {
            kind,
            given: given.to_string(),
            expected,
        }
    }
}
