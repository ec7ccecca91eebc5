//! Error types for session operations.

use crate::traits::SessionKey;
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session-specific errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Redis-specific error
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] kvsession_redis::RedisError),

    /// Any other cache backend failure
    #[error("Cache error: {0}")]
    Cache(String),

    /// Cookie could not be encoded or failed verification
    #[error("Cookie error: {0}")]
    Cookie(#[from] kvsession_securecookie::SecureCookieError),

    /// Payload could not be serialized or deserialized
    #[error(transparent)]
    Serializer(#[from] SerializerError),

    /// Serialized payload is over the configured limit; nothing was written
    #[error("Session data too big: {size} bytes (max {max})")]
    SessionTooBig { size: usize, max: usize },

    /// Set-Cookie header could not be built
    #[error("Invalid header value: {0}")]
    Header(#[from] http::header::InvalidHeaderValue),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SessionError {
    /// Cookie tampering/expiry or a corrupt stored payload.
    ///
    /// The session returned alongside these errors is usable as a new one.
    pub fn is_decode_error(&self) -> bool {
        match self {
            Self::Cookie(e) => e.is_decode(),
            Self::Serializer(e) => e.is_decode(),
            _ => false,
        }
    }

    /// The cache could not be reached or rejected the command.
    pub fn is_transport_error(&self) -> bool {
        match self {
            #[cfg(feature = "redis")]
            Self::Redis(_) => true,
            Self::Cache(_) => true,
            _ => false,
        }
    }
}

/// Serializer failures, tagged with the serializer and direction that failed.
#[derive(Debug, Error)]
pub enum SerializerError {
    /// The text serializer only accepts string keys
    #[error("{location}: non-string key value {key}, cannot serialize session to JSON")]
    NonStringKey {
        location: &'static str,
        key: SessionKey,
    },

    /// Encoding failed
    #[error("{location}: Error {message}")]
    Encode {
        location: &'static str,
        message: String,
    },

    /// Decoding failed
    #[error("{location}: Error {message}")]
    Decode {
        location: &'static str,
        message: String,
    },
}

impl SerializerError {
    /// Where the error originated, e.g. `"JsonSerializer::deserialize"`.
    pub fn location(&self) -> &'static str {
        match self {
            Self::NonStringKey { location, .. }
            | Self::Encode { location, .. }
            | Self::Decode { location, .. } => location,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
