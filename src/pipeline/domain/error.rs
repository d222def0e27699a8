//! Error types for pipeline domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing or mutating domain case values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineDomainError {
    /// The case name is empty after trimming.
    #[error("case name must not be empty")]
    EmptyCaseName,

    /// The attached document name is empty after trimming.
    #[error("document name must not be empty")]
    EmptyDocumentName,

    /// The color tag is not one of the fixed display colors.
    #[error("unknown color tag: {0}")]
    InvalidColorTag(String),

    /// The contracted amount is negative or not a pt-BR decimal.
    #[error("invalid contracted amount '{0}'")]
    InvalidAmount(String),
}

/// Error returned while parsing a stage from column names or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown pipeline stage: {0}")]
pub struct ParseStageError(pub String);
