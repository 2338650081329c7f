//! Error types for the Capstan API client.
//!
//! `NotFound` gets a dedicated variant because callers routinely distinguish
//! "the resource does not exist" from "the server returned something
//! unexpected." Every other non-2xx response lands in `UnexpectedStatus`,
//! which carries the raw status code and response body for debugging.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for client construction and request dispatch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The client configuration is unusable (missing token, invalid address).
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// The request never produced an HTTP response (connection refused,
    /// timeout, TLS failure).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server returned 404 for the requested resource.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("unexpected status code {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The request payload could not be encoded as an API document.
    #[error("failed to encode request payload: {0}")]
    Encode(String),

    /// The response body could not be decoded into the expected type.
    #[error("failed to decode response payload: {0}")]
    Decode(String),
}
