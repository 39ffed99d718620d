//! Error types for inline-query

use thiserror::Error;

/// Main error type for inline-query
#[derive(Debug, Error)]
pub enum InlineQueryError {
    /// A negated published/publishable filter was requested
    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// The query is known to match nothing and should not reach storage
    #[error("Query can never match any comment")]
    EmptyQuery,

    /// An attachment was read before the pipeline loaded it
    #[error("Attachment not loaded: {0}")]
    AttachmentNotLoaded(&'static str),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Invalid diff format
    #[error("Invalid diff format: {0}")]
    InvalidDiff(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A backing store failed
    #[error("Store '{store}' failed: {message}")]
    Store { store: String, message: String },

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<InlineQueryError>,
    },
}

impl InlineQueryError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        InlineQueryError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this is the "return an empty page" signal
    pub fn is_empty_query(&self) -> bool {
        match self {
            InlineQueryError::EmptyQuery => true,
            InlineQueryError::WithContext { source, .. } => source.is_empty_query(),
            _ => false,
        }
    }
}

/// Result type alias for inline-query
pub type Result<T> = std::result::Result<T, InlineQueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InlineQueryError::UnsupportedFilter("not published".to_string());
        assert_eq!(err.to_string(), "Unsupported filter: not published");
    }

    #[test]
    fn test_error_with_context() {
        let err = InlineQueryError::InvalidDiff("bad hunk".to_string());
        let err = err.with_context("Failed to load changeset 12");
        assert!(err.to_string().contains("Failed to load changeset 12"));
    }

    #[test]
    fn test_empty_query_through_context() {
        let err = InlineQueryError::EmptyQuery.with_context("building predicate");
        assert!(err.is_empty_query());
        assert!(!InlineQueryError::Config("x".to_string()).is_empty_query());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: InlineQueryError = io_err.into();
        assert!(matches!(err, InlineQueryError::Io(_)));
    }
}
