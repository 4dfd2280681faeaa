//! Error types for provider dispatch.

use thiserror::Error;

/// Errors raised by the provider registry and dispatch layer.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No resource is registered under the requested type token
    #[error("unknown resource type: {0}")]
    UnknownResource(String),

    /// Two resources share a type token
    #[error("resource type registered twice: {0}")]
    DuplicateResource(String),

    /// `build` was called without any resources
    #[error("provider has no resources")]
    NoResources,

    /// A typed payload could not be decoded
    #[error("invalid {what} for {operation}: {source}")]
    Decode {
        /// Lifecycle operation being dispatched
        operation: &'static str,
        /// Which payload failed ("inputs", "state")
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A typed payload could not be encoded
    #[error("failed to encode {operation} result: {source}")]
    Encode {
        /// Lifecycle operation being dispatched
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
