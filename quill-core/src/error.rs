//! Error types for Quill

use thiserror::Error;

/// The main error type for Quill operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required table, field list, condition or clause argument was empty
    #[error("Empty {what} in {verb} method")]
    EmptyInput { verb: &'static str, what: &'static str },

    /// An argument had a shape the verb cannot turn into SQL
    #[error("Incorrect type in {verb} method: {message}")]
    InvalidType { verb: &'static str, message: String },

    /// Join type outside the supported set
    #[error("Join type '{join_type}' is not allowed in join method")]
    InvalidJoinType { join_type: String },

    /// Verb called in a phase where it cannot extend the statement
    #[error("Method {verb} cannot be called while the statement is {phase}")]
    InvalidSequence { verb: &'static str, phase: String },

    /// Finalized SQL and its parameter vector disagree
    #[error("Statement has {placeholders} placeholders but {params} parameters")]
    PlaceholderMismatch { placeholders: usize, params: usize },

    /// Database connection or execution error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Execution failure reported by a non-sqlx adapter
    #[error("Execution error: {message}")]
    Execution { message: String },
}

/// Convenience Result type for Quill operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new empty input error
    pub fn empty_input(verb: &'static str, what: &'static str) -> Self {
        Self::EmptyInput { verb, what }
    }

    /// Create a new invalid type error
    pub fn invalid_type(verb: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidType {
            verb,
            message: message.into(),
        }
    }

    /// Create a new invalid join type error
    pub fn invalid_join_type(join_type: impl Into<String>) -> Self {
        Self::InvalidJoinType {
            join_type: join_type.into(),
        }
    }

    /// Create a new invalid sequence error
    pub fn invalid_sequence(verb: &'static str, phase: impl Into<String>) -> Self {
        Self::InvalidSequence {
            verb,
            phase: phase.into(),
        }
    }

    /// Create a new execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    /// Whether this error came from the execution adapter rather than
    /// from building the statement
    pub fn is_execution(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Serialization(_) | Self::Execution { .. }
        )
    }
}
