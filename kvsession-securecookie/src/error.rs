use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecureCookieError {
    #[error("Hash key is not set")]
    HashKeyNotSet,

    #[error("Invalid block key: expected 32 bytes, got {0}")]
    InvalidBlockKey(usize),

    #[error("Cookie value too long: {length} bytes (max {max})")]
    ValueTooLong { length: usize, max: usize },

    #[error("Cookie decoding failed: {0}")]
    Decoding(String),

    #[error("Invalid cookie format")]
    InvalidFormat,

    #[error("Invalid cookie signature")]
    MacInvalid,

    #[error("Cookie expired")]
    Expired,

    #[error("Invalid cookie timestamp")]
    InvalidTimestamp,

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("No codecs configured")]
    NoCodecs,

    #[error("All codecs failed: {}", join_errors(.0))]
    Multi(Vec<SecureCookieError>),
}

impl SecureCookieError {
    /// Whether the value was rejected as tampered, expired or malformed, as
    /// opposed to a configuration problem.
    pub fn is_decode(&self) -> bool {
        match self {
            Self::Decoding(_)
            | Self::InvalidFormat
            | Self::MacInvalid
            | Self::Expired
            | Self::InvalidTimestamp
            | Self::Decryption(_)
            | Self::ValueTooLong { .. } => true,
            Self::Multi(errors) => errors.iter().all(Self::is_decode),
            _ => false,
        }
    }
}

fn join_errors(errors: &[SecureCookieError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<base64::DecodeError> for SecureCookieError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Decoding(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SecureCookieError>;
