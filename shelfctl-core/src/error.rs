//! Structured error types for shelfctl-core.
//!
//! Uses `thiserror` so the binary can match on failures (the menu loop
//! prints them, subcommands attach context via `anyhow`).

use thiserror::Error;

/// Longest response body kept in an [`ShelfError::Api`] error
pub const MAX_ERROR_BODY: usize = 500;

/// Main error type for shelfctl-core operations
#[derive(Error, Debug)]
pub enum ShelfError {
    /// Configuration missing or malformed
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// Request never produced a response (DNS, TLS, connect, timeout)
    #[error("Request to {path} failed: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// Backend answered with a non-success status
    #[error("Backend rejected {path} ({status}): {body}")]
    Api {
        path: String,
        status: u16,
        body: String,
    },

    /// Response body was not valid JSON
    #[error("JSON error at {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    /// Delete refused because borrow records without a return date exist
    #[error("Cannot delete {}", .entity.outstanding_reason())]
    OutstandingBorrows { entity: Entity, id: i64 },

    /// Input rejected before any request was made
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },
}

/// Record kinds that carry a delete precondition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Member,
    Book,
}

impl Entity {
    fn outstanding_reason(&self) -> &'static str {
        match self {
            Entity::Member => "member: outstanding borrowed books exist.",
            Entity::Book => "book: currently borrowed.",
        }
    }
}

/// Result type alias for shelfctl-core operations
pub type Result<T> = std::result::Result<T, ShelfError>;

impl ShelfError {
    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create a JSON error with context
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Create an API error, truncating the body so large HTML error pages
    /// and echoed credentials stay out of terminal output
    pub fn api(path: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let body = if body.chars().count() > MAX_ERROR_BODY {
            let cut: String = body.chars().take(MAX_ERROR_BODY).collect();
            format!("{}...", cut)
        } else {
            body
        };
        Self::Api {
            path: path.into(),
            status,
            body,
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outstanding_borrows_display() {
        let err = ShelfError::OutstandingBorrows {
            entity: Entity::Member,
            id: 7,
        };
        assert_eq!(
            err.to_string(),
            "Cannot delete member: outstanding borrowed books exist."
        );

        let err = ShelfError::OutstandingBorrows {
            entity: Entity::Book,
            id: 3,
        };
        assert_eq!(err.to_string(), "Cannot delete book: currently borrowed.");
    }

    #[test]
    fn test_api_error_truncates_body() {
        let err = ShelfError::api("books", 500, "x".repeat(2000));
        match err {
            ShelfError::Api { body, status, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body.len(), MAX_ERROR_BODY + 3);
                assert!(body.ends_with("..."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_input_display() {
        let err = ShelfError::invalid_input("stock", "must not be negative");
        assert_eq!(err.to_string(), "Invalid input for stock: must not be negative");
    }
}
