//! Error type shared by the builder, the codecs and the transports.
//!
//! # Design
//! Every failure is returned as a value. Request construction, body encoding,
//! transport and decoding each get their own variant so callers can tell a
//! bad URL from a refused connection without parsing messages. Non-2xx
//! responses are not errors while executing; `HttpError` only appears when a
//! caller asks `Response::into_result` to treat them as one.

use thiserror::Error;

/// Errors produced while building, sending or decoding a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The body could not be encoded by the configured encoder.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The response body could not be decoded into the requested type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The method is empty or contains characters outside the HTTP token set.
    #[error("invalid method {0:?}")]
    InvalidMethod(String),

    /// `host + path` does not parse as an absolute URL.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request context was cancelled before the request was sent.
    #[error("context cancelled")]
    Cancelled,

    /// The request context deadline passed before the request was sent.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// The transport failed to deliver the request or read the response.
    #[error("transport failed: {0}")]
    TransportError(String),

    /// The server returned a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
