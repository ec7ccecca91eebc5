//! Session data and the cache capability the store is built on.

use crate::config::CookieOptions;
use crate::error::{SerializerError, SessionResult};
use async_trait::async_trait;
use data_encoding::BASE32_NOPAD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A key in the session value mapping.
///
/// The binary serializer accepts every variant; the JSON serializer only
/// accepts [`SessionKey::Str`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionKey {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl SessionKey {
    /// The key as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{:?}", s),
            Self::Int(i) => write!(f, "{}", i),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for SessionKey {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for SessionKey {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for SessionKey {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for SessionKey {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<bool> for SessionKey {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// The session value mapping.
pub type Values = HashMap<SessionKey, serde_json::Value>;

/// One named session, owned by the request that fetched it.
#[derive(Debug, Clone)]
pub struct Session {
    name: String,
    /// Opaque identifier; empty until the session is first saved
    pub id: String,
    /// Session data
    pub values: Values,
    /// Cookie attributes, copied from the store defaults
    pub options: CookieOptions,
    /// `true` unless the session was loaded from the cache
    pub is_new: bool,
}

impl Session {
    /// Create an empty, new session for the cookie `name`.
    pub fn new(name: impl Into<String>, options: CookieOptions) -> Self {
        Self {
            name: name.into(),
            id: String::new(),
            values: Values::new(),
            options,
            is_new: true,
        }
    }

    /// The cookie name this session is bound to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a value from the session data.
    pub fn get<T: DeserializeOwned>(&self, key: impl Into<SessionKey>) -> Option<T> {
        self.values
            .get(&key.into())
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a value in the session data.
    pub fn set<T: Serialize>(&mut self, key: impl Into<SessionKey>, value: T) -> SessionResult<()> {
        let json_value = serde_json::to_value(value).map_err(|e| SerializerError::Encode {
            location: "Session::set",
            message: e.to_string(),
        })?;
        self.values.insert(key.into(), json_value);
        Ok(())
    }

    /// Remove a value from the session data.
    pub fn remove(&mut self, key: impl Into<SessionKey>) -> Option<serde_json::Value> {
        self.values.remove(&key.into())
    }

    /// Check if a key exists in the session data.
    pub fn contains(&self, key: impl Into<SessionKey>) -> bool {
        self.values.contains_key(&key.into())
    }

    /// Clear all session data.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mark the session for deletion on the next save.
    pub fn expire(&mut self) {
        self.options.max_age = -1;
    }
}

/// Key/value/TTL cache the session store persists into.
///
/// Implementations must be safe to share between concurrent requests. Each
/// method maps to exactly one command (`GET`, `SETEX`, `DEL`); errors are
/// returned as-is, never retried.
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// `GET key`. `Ok(None)` when the key is absent.
    async fn get(&self, key: &str) -> SessionResult<Option<Vec<u8>>>;

    /// `SETEX key ttl_secs value`.
    async fn set_ex(&self, key: &str, value: &[u8], ttl_secs: u64) -> SessionResult<()>;

    /// `DEL key`. Deleting a missing key is not an error.
    async fn del(&self, key: &str) -> SessionResult<()>;
}

/// Generate a new session ID: 32 random bytes, base-32 without padding.
///
/// 256 bits of entropy; uniqueness is not checked against the cache.
pub fn generate_session_id() -> String {
    let bytes: [u8; 32] = rand::random();
    BASE32_NOPAD.encode(&bytes)
}
