use std::error::Error as StdError;

/// Crate-wide result type for messenger operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors raised while talking to the platform and auxiliary APIs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input payload or parameter is invalid.
    #[error("invalid messenger input: {message}")]
    InvalidInput { message: String },

    /// An outbound HTTP call failed before a response was received.
    #[error("{context}: {source}")]
    Http {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// An outbound HTTP call answered with a non-success status.
    #[error("{context} returned {status}: {body}")]
    Status {
        context: String,
        status: u16,
        body: String,
    },

    /// Wrapped source error from an external dependency.
    #[error("messenger operation failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// JSON (de)serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn invalid_input(message: impl std::fmt::Display) -> Self {
        Self::InvalidInput {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn http(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            context: context.into(),
            source,
        }
    }

    #[must_use]
    pub fn status(context: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            context: context.into(),
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
