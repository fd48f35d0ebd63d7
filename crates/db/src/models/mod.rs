//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` struct matching the database row and,
//! where the row carries enum columns stored as TEXT, a `TryFrom` conversion
//! into the matching `lingo_core` entity.

pub mod approval;
pub mod daily_lives;
pub mod practice;
pub mod progress;
pub mod user;

/// A stored value that does not decode into its domain type.
#[derive(Debug, thiserror::Error)]
#[error("Invalid value in column {column}: {message}")]
pub struct DecodeError {
    pub column: &'static str,
    pub message: String,
}

impl DecodeError {
    pub(crate) fn new(column: &'static str, message: String) -> Self {
        Self { column, message }
    }
}
