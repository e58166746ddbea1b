//! Store-level errors

use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned by `Store` operations
#[derive(Error, Debug)]
pub enum ShelfError {
    /// Required form fields were empty
    #[error("Missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// No book has this id or id prefix
    #[error("No book found matching: {0}")]
    NotFound(String),

    /// An id prefix matched more than one book
    #[error("Ambiguous id '{prefix}' matches {} books. Please provide more characters.", .matches.len())]
    AmbiguousId {
        prefix: String,
        matches: Vec<String>,
    },

    /// The collection could not be written
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ShelfError {
    /// What the user can do about this error, if anything
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            ShelfError::Storage(e) => e.recovery_suggestion(),
            _ => None,
        }
    }
}
