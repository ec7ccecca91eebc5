use crate::error::{Result, SecureCookieError};
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 12;

/// Default validity window for a decoded value: 30 days.
pub const DEFAULT_MAX_AGE: i64 = 86400 * 30;

/// Browsers cap a cookie at roughly 4 KiB.
pub const DEFAULT_MAX_LENGTH: usize = 4096;

/// Timestamps further in the future than this are rejected.
const MAX_CLOCK_SKEW: i64 = 300;

/// Secret material for one codec.
///
/// The hash key signs values (HMAC-SHA256). The optional block key must be
/// 32 bytes and turns on AES-256-GCM encryption.
#[derive(Clone)]
pub struct KeyPair {
    pub hash_key: Vec<u8>,
    pub block_key: Option<Vec<u8>>,
}

impl KeyPair {
    /// Signing-only key pair.
    pub fn new(hash_key: impl Into<Vec<u8>>) -> Self {
        Self {
            hash_key: hash_key.into(),
            block_key: None,
        }
    }

    /// Add an encryption key.
    pub fn with_block_key(mut self, block_key: impl Into<Vec<u8>>) -> Self {
        self.block_key = Some(block_key.into());
        self
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("hash_key", &"<redacted>")
            .field("block_key", &self.block_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Encodes and decodes authenticated (and optionally encrypted) cookie values.
///
/// The cookie name is bound into the MAC and, when encrypting, into the
/// AEAD associated data, so a value issued for one cookie does not verify
/// under another name.
#[derive(Clone)]
pub struct SecureCookie {
    hash_key: Vec<u8>,
    cipher: Option<Aes256Gcm>,
    max_age: i64,
    max_length: usize,
}

impl SecureCookie {
    /// Create a codec from a hash key and an optional 32-byte block key.
    pub fn new(hash_key: &[u8], block_key: Option<&[u8]>) -> Result<Self> {
        if hash_key.is_empty() {
            return Err(SecureCookieError::HashKeyNotSet);
        }

        let cipher = block_key
            .map(|key| {
                Aes256Gcm::new_from_slice(key)
                    .map_err(|_| SecureCookieError::InvalidBlockKey(key.len()))
            })
            .transpose()?;

        Ok(Self {
            hash_key: hash_key.to_vec(),
            cipher,
            max_age: DEFAULT_MAX_AGE,
            max_length: DEFAULT_MAX_LENGTH,
        })
    }

    /// Create a codec from a [`KeyPair`].
    pub fn from_pair(pair: &KeyPair) -> Result<Self> {
        Self::new(&pair.hash_key, pair.block_key.as_deref())
    }

    /// Set the maximum age in seconds of values accepted by `decode`. `0` disables the check.
    pub fn with_max_age(mut self, max_age: i64) -> Self {
        self.max_age = max_age;
        self
    }

    /// Set the maximum encoded length. `0` disables the check.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Whether values are encrypted in addition to being signed.
    pub fn encrypts(&self) -> bool {
        self.cipher.is_some()
    }

    pub fn max_age(&self) -> i64 {
        self.max_age
    }

    /// Encode `value` for the cookie called `name`.
    pub fn encode(&self, name: &str, value: &str) -> Result<String> {
        self.encode_at(name, value, Utc::now().timestamp())
    }

    /// Decode and verify a cookie value issued for `name`.
    pub fn decode(&self, name: &str, value: &str) -> Result<String> {
        self.decode_at(name, value, Utc::now().timestamp())
    }

    pub(crate) fn encode_at(&self, name: &str, value: &str, now: i64) -> Result<String> {
        let payload = match &self.cipher {
            Some(cipher) => {
                let nonce_bytes: [u8; NONCE_LEN] = rand::random();
                let ciphertext = cipher
                    .encrypt(
                        Nonce::from_slice(&nonce_bytes),
                        Payload {
                            msg: value.as_bytes(),
                            aad: name.as_bytes(),
                        },
                    )
                    .map_err(|e| SecureCookieError::Encryption(e.to_string()))?;

                let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
                combined.extend_from_slice(&nonce_bytes);
                combined.extend_from_slice(&ciphertext);
                combined
            }
            None => value.as_bytes().to_vec(),
        };

        let body = format!("{}|{}", now, URL_SAFE_NO_PAD.encode(payload));
        let signature = URL_SAFE_NO_PAD.encode(self.sign(name, &body)?);
        let encoded = URL_SAFE_NO_PAD.encode(format!("{}|{}", body, signature));

        self.check_length(encoded.len())?;
        Ok(encoded)
    }

    pub(crate) fn decode_at(&self, name: &str, value: &str, now: i64) -> Result<String> {
        self.check_length(value.len())?;

        let decoded = URL_SAFE_NO_PAD.decode(value)?;
        let decoded =
            String::from_utf8(decoded).map_err(|e| SecureCookieError::Decoding(e.to_string()))?;

        let mut parts = decoded.splitn(3, '|');
        let (Some(timestamp), Some(payload), Some(signature)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(SecureCookieError::InvalidFormat);
        };

        // MAC first: nothing below runs on unauthenticated input
        let signature = URL_SAFE_NO_PAD.decode(signature)?;
        let body = &decoded[..timestamp.len() + 1 + payload.len()];
        self.verify(name, body, &signature)?;

        let issued_at: i64 = timestamp
            .parse()
            .map_err(|_| SecureCookieError::InvalidTimestamp)?;
        if issued_at > now + MAX_CLOCK_SKEW {
            return Err(SecureCookieError::InvalidTimestamp);
        }
        if self.max_age > 0 && issued_at < now - self.max_age {
            return Err(SecureCookieError::Expired);
        }

        let payload = URL_SAFE_NO_PAD.decode(payload)?;
        let plaintext = match &self.cipher {
            Some(cipher) => {
                if payload.len() < NONCE_LEN {
                    return Err(SecureCookieError::Decryption("payload too short".to_string()));
                }
                let (nonce, ciphertext) = payload.split_at(NONCE_LEN);
                cipher
                    .decrypt(
                        Nonce::from_slice(nonce),
                        Payload {
                            msg: ciphertext,
                            aad: name.as_bytes(),
                        },
                    )
                    .map_err(|e| SecureCookieError::Decryption(e.to_string()))?
            }
            None => payload,
        };

        String::from_utf8(plaintext).map_err(|e| SecureCookieError::Decoding(e.to_string()))
    }

    fn check_length(&self, length: usize) -> Result<()> {
        if self.max_length != 0 && length > self.max_length {
            return Err(SecureCookieError::ValueTooLong {
                length,
                max: self.max_length,
            });
        }
        Ok(())
    }

    fn mac(&self, name: &str, body: &str) -> Result<HmacSha256> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.hash_key)
            .map_err(|_| SecureCookieError::HashKeyNotSet)?;
        mac.update(name.as_bytes());
        mac.update(b"|");
        mac.update(body.as_bytes());
        Ok(mac)
    }

    fn sign(&self, name: &str, body: &str) -> Result<Vec<u8>> {
        Ok(self.mac(name, body)?.finalize().into_bytes().to_vec())
    }

    fn verify(&self, name: &str, body: &str, signature: &[u8]) -> Result<()> {
        self.mac(name, body)?
            .verify_slice(signature)
            .map_err(|_| SecureCookieError::MacInvalid)
    }
}

impl fmt::Debug for SecureCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureCookie")
            .field("encrypts", &self.encrypts())
            .field("max_age", &self.max_age)
            .field("max_length", &self.max_length)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH_KEY: &[u8] = b"test_secret_key_32_bytes_long!!!";
    const BLOCK_KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_signed_encode_decode() {
        let codec = SecureCookie::new(HASH_KEY, None).unwrap();
        let encoded = codec.encode("session", "ABCDEF").unwrap();
        assert_eq!(codec.decode("session", &encoded).unwrap(), "ABCDEF");
    }

    #[test]
    fn test_encrypted_encode_decode() {
        let codec = SecureCookie::new(HASH_KEY, Some(BLOCK_KEY)).unwrap();
        assert!(codec.encrypts());

        let encoded = codec.encode("session", "secret-id").unwrap();
        let raw = String::from_utf8(URL_SAFE_NO_PAD.decode(&encoded).unwrap()).unwrap();
        assert!(!raw.contains(&URL_SAFE_NO_PAD.encode("secret-id")));

        assert_eq!(codec.decode("session", &encoded).unwrap(), "secret-id");
    }

    #[test]
    fn test_wrong_key_rejected() {
        let codec = SecureCookie::new(HASH_KEY, None).unwrap();
        let encoded = codec.encode("session", "id").unwrap();

        let other = SecureCookie::new(b"wrong_secret_key_32_bytes_long!!", None).unwrap();
        assert!(matches!(
            other.decode("session", &encoded),
            Err(SecureCookieError::MacInvalid)
        ));
    }

    #[test]
    fn test_name_is_bound() {
        let codec = SecureCookie::new(HASH_KEY, None).unwrap();
        let encoded = codec.encode("session", "id").unwrap();
        assert!(matches!(
            codec.decode("other", &encoded),
            Err(SecureCookieError::MacInvalid)
        ));
    }

    #[test]
    fn test_tampered_value_rejected() {
        let codec = SecureCookie::new(HASH_KEY, None).unwrap();
        let encoded = codec.encode("session", "id").unwrap();

        let raw = String::from_utf8(URL_SAFE_NO_PAD.decode(&encoded).unwrap()).unwrap();
        let forged = raw.replacen(&URL_SAFE_NO_PAD.encode("id"), &URL_SAFE_NO_PAD.encode("admin"), 1);
        let forged = URL_SAFE_NO_PAD.encode(forged);

        assert!(matches!(
            codec.decode("session", &forged),
            Err(SecureCookieError::MacInvalid)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        let codec = SecureCookie::new(HASH_KEY, None).unwrap();
        assert!(codec.decode("session", "not base64!!").is_err());
        assert!(matches!(
            codec.decode("session", &URL_SAFE_NO_PAD.encode("no-separators")),
            Err(SecureCookieError::InvalidFormat)
        ));
    }

    #[test]
    fn test_expired_value_rejected() {
        let codec = SecureCookie::new(HASH_KEY, None).unwrap().with_max_age(60);
        let now = Utc::now().timestamp();
        let encoded = codec.encode_at("session", "id", now - 120).unwrap();
        assert!(matches!(
            codec.decode_at("session", &encoded, now),
            Err(SecureCookieError::Expired)
        ));

        let unbounded = codec.clone().with_max_age(0);
        assert_eq!(unbounded.decode_at("session", &encoded, now).unwrap(), "id");
    }

    #[test]
    fn test_future_timestamp_rejected() {
        let codec = SecureCookie::new(HASH_KEY, None).unwrap();
        let now = Utc::now().timestamp();
        let encoded = codec.encode_at("session", "id", now + 3600).unwrap();
        assert!(matches!(
            codec.decode_at("session", &encoded, now),
            Err(SecureCookieError::InvalidTimestamp)
        ));
    }

    #[test]
    fn test_max_length_enforced() {
        let codec = SecureCookie::new(HASH_KEY, None).unwrap().with_max_length(64);
        let long_value = "x".repeat(200);
        assert!(matches!(
            codec.encode("session", &long_value),
            Err(SecureCookieError::ValueTooLong { .. })
        ));
    }

    #[test]
    fn test_invalid_keys() {
        assert!(matches!(
            SecureCookie::new(b"", None),
            Err(SecureCookieError::HashKeyNotSet)
        ));
        assert!(matches!(
            SecureCookie::new(HASH_KEY, Some(b"short")),
            Err(SecureCookieError::InvalidBlockKey(5))
        ));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let pair = KeyPair::new("super-secret").with_block_key(BLOCK_KEY.to_vec());
        let debug = format!("{:?}", pair);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("redacted"));
    }
}
