//! # kvsession Secure Cookies
//!
//! Tamper-evident, optionally encrypted cookie values.
//!
//! ## Features
//!
//! - ✅ **Signed Values** - HMAC-SHA256 over cookie name, timestamp and payload
//! - ✅ **Encryption** - AES-256-GCM when a 32-byte block key is supplied
//! - ✅ **Expiry** - Values older than `max_age` are rejected
//! - ✅ **Key Rotation** - Ordered codec lists: encode with the first, decode with any
//!
//! ## Quick Start
//!
//! ```rust
//! use kvsession_securecookie::{SecureCookie, decode_multi, encode_multi};
//!
//! let codec = SecureCookie::new(b"a-long-random-hash-key", None).unwrap();
//! let codecs = vec![codec];
//!
//! let encoded = encode_multi("session", "SESSIONID", &codecs).unwrap();
//! let decoded = decode_multi("session", &encoded, &codecs).unwrap();
//! assert_eq!(decoded, "SESSIONID");
//! ```
//!
//! ## Rotating Secrets
//!
//! ```rust
//! use kvsession_securecookie::{KeyPair, codecs_from_pairs, decode_multi, encode_multi};
//!
//! let old = codecs_from_pairs(&[KeyPair::new("old-secret")]).unwrap();
//! let issued = encode_multi("session", "ID", &old).unwrap();
//!
//! // New secret first, old one kept for decoding
//! let rotated = codecs_from_pairs(&[KeyPair::new("new-secret"), KeyPair::new("old-secret")]).unwrap();
//! assert_eq!(decode_multi("session", &issued, &rotated).unwrap(), "ID");
//! ```

pub mod codec;
pub mod error;

pub use codec::{DEFAULT_MAX_AGE, DEFAULT_MAX_LENGTH, KeyPair, SecureCookie};
pub use error::{Result, SecureCookieError};

/// Build one codec per key pair, preserving order.
pub fn codecs_from_pairs(pairs: &[KeyPair]) -> Result<Vec<SecureCookie>> {
    pairs.iter().map(SecureCookie::from_pair).collect()
}

/// Encode with the first codec of the list.
pub fn encode_multi(name: &str, value: &str, codecs: &[SecureCookie]) -> Result<String> {
    codecs
        .first()
        .ok_or(SecureCookieError::NoCodecs)?
        .encode(name, value)
}

/// Decode with each codec in order, returning the first success.
///
/// With a single codec its error is returned unchanged; with several, every
/// failure is collected into [`SecureCookieError::Multi`].
pub fn decode_multi(name: &str, value: &str, codecs: &[SecureCookie]) -> Result<String> {
    let mut errors = Vec::with_capacity(codecs.len());

    for codec in codecs {
        match codec.decode(name, value) {
            Ok(decoded) => return Ok(decoded),
            Err(e) => errors.push(e),
        }
    }

    match errors.len() {
        0 => Err(SecureCookieError::NoCodecs),
        1 => Err(errors.remove(0)),
        _ => Err(SecureCookieError::Multi(errors)),
    }
}
