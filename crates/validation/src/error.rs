use core_types::ErrorKind;
use std::fmt;
use thiserror::Error;

/// A single rule violation on one input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Every violation found in a payload. Never empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join_messages(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self { errors: vec![FieldError::new(field, message)] }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }

    /// Merges the failures of per-field checks, in field order. Callers only
    /// reach this when at least one check failed, and a failed check always
    /// carries at least one error.
    pub(crate) fn merge(failures: impl IntoIterator<Item = Option<Vec<FieldError>>>) -> Self {
        Self { errors: failures.into_iter().flatten().flatten().collect() }
    }
}
