//! Error type for the pagination engine.

use thiserror::Error;

/// Boxed error raised by a collection accessor.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while building an ordering or paginating a collection.
///
/// Only [`PaginationError::MalformedCursor`] and
/// [`PaginationError::InvalidPageSize`] are caused by client input. The other
/// variants are server-side faults.
#[derive(Debug, Error)]
pub enum PaginationError {
    /// The cursor could not be decoded, or does not fit the ordering.
    #[error("Malformed cursor: {0}")]
    MalformedCursor(String),

    /// The ordering cannot produce a total order over the records.
    #[error("Invalid order spec: {0}")]
    InvalidOrderSpec(String),

    /// A page must hold at least one item.
    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),

    /// The collection accessor failed.
    #[error("Source error: {0}")]
    Source(#[source] BoxError),
}

impl PaginationError {
    /// Whether the error was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MalformedCursor(_) | Self::InvalidPageSize(_))
    }
}

/// Result type for pagination operations.
pub type PaginationResult<T> = Result<T, PaginationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_keeps_message() {
        let io = std::io::Error::other("connection reset");
        let err = PaginationError::Source(Box::new(io));

        assert!(err.to_string().contains("connection reset"));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_cursor_errors_are_client_errors() {
        assert!(PaginationError::MalformedCursor("bad".into()).is_client_error());
        assert!(!PaginationError::InvalidOrderSpec("empty".into()).is_client_error());
    }
}
