//! Error types for the admin API client.
//!
//! # Design
//! Configuration and signing failures happen before any network I/O. A non-2xx
//! status lands in `TimServer` with the raw status code and body. An error
//! code embedded in a 2xx envelope is only surfaced as `Service` when the
//! caller opts in through `Envelope::into_result`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// App id, admin account or base URL is missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The usersig could not be produced.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The server answered with a non-2xx status.
    #[error("Response Status: {status}")]
    TimServer { status: u16, body: String },

    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("transport failed: {0}")]
    Transport(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The envelope carried a nonzero `ErrorCode`.
    #[error("service error {code}: {info}")]
    Service { code: i64, info: String },
}
