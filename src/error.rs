//! Import pipeline error types

use thiserror::Error;

/// The uploaded file could not be turned into a table.
///
/// Fatal to the current upload attempt; no partial table is kept.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("file is not valid UTF-8 text (invalid byte at offset {offset})")]
    InvalidEncoding { offset: usize },

    #[error("unbalanced quoting: quoted field opened on line {line} is never closed")]
    UnbalancedQuotes { line: usize },

    #[error("file contains no header line")]
    MissingHeader,

    #[error("malformed CSV: {0}")]
    Malformed(String),
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        ParseError::Malformed(err.to_string())
    }
}

/// Required fields that still have no mapped header.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("required fields are not mapped: {}", .missing.join(", "))]
pub struct MappingIncomplete {
    /// Labels of the unmapped required fields, in schema order
    pub missing: Vec<String>,
}

/// A row was rejected locally before reaching the lead service.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Missing required {}", .labels.join(", "))]
pub struct RowValidationError {
    pub labels: Vec<String>,
}

/// Message used when the lead service fails without saying why.
pub const GENERIC_FAILURE_REASON: &str = "Failed";

/// The lead service refused or failed to create a record.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{}", .reason.as_deref().unwrap_or(GENERIC_FAILURE_REASON))]
pub struct RecordCreationError {
    pub reason: Option<String>,
}

impl RecordCreationError {
    pub fn new(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            reason: if reason.trim().is_empty() { None } else { Some(reason) },
        }
    }

    pub fn unexplained() -> Self {
        Self { reason: None }
    }
}

/// Why a single row did not produce a lead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error(transparent)]
    Validation(#[from] RowValidationError),

    #[error(transparent)]
    Creation(#[from] RecordCreationError),
}

/// Errors raised by the wizard when an operation does not fit the current step.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    MappingIncomplete(#[from] MappingIncomplete),

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("column '{0}' is not present in the uploaded file")]
    UnknownHeader(String),

    #[error("operation '{operation}' is not allowed on the {step} step")]
    WrongStep { operation: &'static str, step: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_validation_message_lists_labels() {
        let err = RowValidationError {
            labels: vec!["First Name".to_string(), "Last Name".to_string()],
        };
        assert_eq!(err.to_string(), "Missing required First Name, Last Name");
    }

    #[test]
    fn test_record_creation_falls_back_to_generic_reason() {
        assert_eq!(RecordCreationError::unexplained().to_string(), "Failed");
        assert_eq!(RecordCreationError::new("   ").to_string(), "Failed");
        assert_eq!(
            RecordCreationError::new("Email already exists").to_string(),
            "Email already exists"
        );
    }

    #[test]
    fn test_mapping_incomplete_message() {
        let err = MappingIncomplete {
            missing: vec!["Last Name".to_string()],
        };
        assert_eq!(err.to_string(), "required fields are not mapped: Last Name");
    }
}
