//! Error types for the Aura API client.
//!
//! # Design
//! Every call ends in one of three outcomes besides success. `Unauthorized`
//! gets a dedicated variant because a 401 means the session is gone no
//! matter what the body says. Transport and request-construction failures
//! are `Network`; anything the server sent that we could not use is
//! `Server`, carrying the raw body so the caller can show or log it.

use tracing::warn;

/// Errors returned by endpoint parsing and by the executor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request could not be built or the transport failed.
    #[error("network error: {0}")]
    Network(String),

    /// The server returned 401.
    #[error("authorization required")]
    Unauthorized,

    /// The server answered with something that does not decode into the
    /// expected type. Holds the raw response text or an auth message.
    #[error("{0}")]
    Server(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Explicit fail-soft policy for screen loads.
///
/// Call sites that render an empty state on failure use `or_fallback`;
/// call sites that must surface the error keep the `Result`.
pub trait OrFallback<T> {
    fn or_fallback(self, context: &str) -> T;
}

impl<T: Default> OrFallback<T> for Result<T, ApiError> {
    fn or_fallback(self, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, context, "request failed; using empty value");
                T::default()
            }
        }
    }
}
