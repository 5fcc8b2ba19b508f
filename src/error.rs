//! Error taxonomy for composing and dispatching requests

use thiserror::Error;

/// Errors raised while turning form state into a `RequestDescriptor`.
///
/// `MalformedBody` never aborts a compose call; it is reported as a
/// diagnostic next to the descriptor. The other two are fatal for that call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComposeError {
    #[error("Invalid URL '{input}': {reason}")]
    MalformedUrl { input: String, reason: String },

    #[error("Invalid JSON: {0}")]
    MalformedBody(String),

    #[error("{0}")]
    Validation(String),
}

/// Errors from a single round-trip to the relay. Never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("CSRF token not found. Set csrf_token in the config or PROBE_CSRF_TOKEN.")]
    MissingCsrfToken,

    #[error("Relay unreachable: {0}")]
    Network(String),

    /// The relay itself failed; the target API's status travels inside the payload instead.
    #[error("Server returned {status} {reason}")]
    Relay { status: u16, reason: String },

    #[error("Relay sent an unreadable payload: {0}")]
    MalformedResponse(String),
}

/// Errors loading the on-disk configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value for {key}: {value}")]
    InvalidOverride { key: &'static str, value: String },
}
