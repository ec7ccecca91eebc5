//! Session configuration.

use kvsession_securecookie::KeyPair;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// How long a session persists for: one day.
pub const DEFAULT_MAX_AGE: i64 = 86400;
/// 32 KiB of session storage per user.
pub const DEFAULT_MAX_LENGTH: usize = 1024 * 32;
/// Cache keys start with `session_`.
pub const DEFAULT_KEY_PREFIX: &str = "session_";
/// Cookies are site wide.
pub const DEFAULT_COOKIE_PATH: &str = "/";
/// Used when no secret is configured. Only suitable for development.
pub const DEFAULT_SECRET: &str = "kvsession-insecure-default-secret";

/// Cookie SameSite attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Cookie attributes, copied into every session at creation.
///
/// `max_age` also drives persistence: positive values store the session
/// for that many seconds, zero or negative values delete it on save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieOptions {
    /// Cookie path
    pub path: String,
    /// Cookie domain
    pub domain: Option<String>,
    /// Max-Age in seconds
    pub max_age: i64,
    /// Cookie secure flag (HTTPS only)
    pub secure: bool,
    /// Cookie HttpOnly flag
    pub http_only: bool,
    /// Cookie SameSite policy
    pub same_site: Option<SameSite>,
}

/// An older secret kept around so cookies it signed still decode.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SessionSecret {
    pub secret: String,
    #[serde(default)]
    pub encryption_key: Option<String>,
}

impl SessionSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            encryption_key: None,
        }
    }

    pub fn with_encryption_key(mut self, key: impl Into<String>) -> Self {
        self.encryption_key = Some(key.into());
        self
    }

    fn key_pair(&self) -> KeyPair {
        let pair = KeyPair::new(self.secret.as_bytes());
        match &self.encryption_key {
            Some(key) => pair.with_block_key(key.as_bytes()),
            None => pair,
        }
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSecret")
            .field("secret", &"<redacted>")
            .field("encryption_key", &self.encryption_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Store-level configuration.
///
/// Zero values mean "use the default"; [`SessionOptions::apply_defaults`]
/// fills them in once, when the store is constructed.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Default cookie attributes for new sessions
    pub cookie: CookieOptions,
    /// Max bytes of serialized session data
    pub max_length: usize,
    /// Prefix for cache keys
    pub key_prefix: String,
    /// Secret used to sign session cookies
    pub secret: String,
    /// Optional 32-byte key; when set, cookies are encrypted too
    pub encryption_key: Option<String>,
    /// Older secrets, tried in order when decoding
    pub previous_secrets: Vec<SessionSecret>,
}

impl SessionOptions {
    /// Create options with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from environment variables.
    pub fn from_env() -> Self {
        let mut options = Self::new();

        if let Ok(secret) = std::env::var("SESSION_SECRET") {
            options.secret = secret;
        }

        if let Ok(key) = std::env::var("SESSION_ENCRYPTION_KEY") {
            options.encryption_key = Some(key);
        }

        if let Ok(prefix) = std::env::var("SESSION_KEY_PREFIX") {
            options.key_prefix = prefix;
        }

        if let Ok(max_age) = std::env::var("SESSION_MAX_AGE")
            && let Ok(secs) = max_age.parse() {
                options.cookie.max_age = secs;
            }

        if let Ok(max_length) = std::env::var("SESSION_MAX_LENGTH")
            && let Ok(len) = max_length.parse() {
                options.max_length = len;
            }

        if let Ok(path) = std::env::var("SESSION_COOKIE_PATH") {
            options.cookie.path = path;
        }

        if let Ok(domain) = std::env::var("SESSION_COOKIE_DOMAIN") {
            options.cookie.domain = Some(domain);
        }

        if let Ok(secure) = std::env::var("SESSION_COOKIE_SECURE") {
            options.cookie.secure = parse_flag(&secure);
        }

        if let Ok(http_only) = std::env::var("SESSION_COOKIE_HTTP_ONLY") {
            options.cookie.http_only = parse_flag(&http_only);
        }

        options
    }

    /// Fill every unset field with its default.
    pub fn apply_defaults(&mut self) {
        if self.max_length == 0 {
            self.max_length = DEFAULT_MAX_LENGTH;
        }
        if self.key_prefix.is_empty() {
            self.key_prefix = DEFAULT_KEY_PREFIX.to_string();
        }
        if self.cookie.path.is_empty() {
            self.cookie.path = DEFAULT_COOKIE_PATH.to_string();
        }
        if self.cookie.max_age == 0 {
            self.cookie.max_age = DEFAULT_MAX_AGE;
        }
        if self.secret.is_empty() {
            warn!("No session secret configured, falling back to the built-in default");
            self.secret = DEFAULT_SECRET.to_string();
        }
    }

    /// Key pairs for the codec list: the current secret first, then older ones.
    pub fn key_pairs(&self) -> Vec<KeyPair> {
        let current = SessionSecret {
            secret: self.secret.clone(),
            encryption_key: self.encryption_key.clone(),
        };

        std::iter::once(&current)
            .chain(self.previous_secrets.iter())
            .map(SessionSecret::key_pair)
            .collect()
    }

    /// Set the signing secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    /// Set the 32-byte encryption key.
    pub fn with_encryption_key(mut self, key: impl Into<String>) -> Self {
        self.encryption_key = Some(key.into());
        self
    }

    /// Keep accepting cookies signed with an older secret.
    pub fn with_previous_secret(mut self, secret: SessionSecret) -> Self {
        self.previous_secrets.push(secret);
        self
    }

    /// Set the cache key prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Set the max serialized session size in bytes.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set the cookie Max-Age (and cache TTL) in seconds.
    pub fn with_max_age(mut self, max_age: i64) -> Self {
        self.cookie.max_age = max_age;
        self
    }

    /// Set cookie path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.cookie.path = path.into();
        self
    }

    /// Set cookie domain
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie.domain = Some(domain.into());
        self
    }

    /// Set cookie secure flag
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.cookie.secure = secure;
        self
    }

    /// Set cookie HttpOnly flag
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.cookie.http_only = http_only;
        self
    }

    /// Set cookie SameSite policy
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.cookie.same_site = Some(same_site);
        self
    }
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("cookie", &self.cookie)
            .field("max_length", &self.max_length)
            .field("key_prefix", &self.key_prefix)
            .field("secret", &"<redacted>")
            .field("encryption_key", &self.encryption_key.as_ref().map(|_| "<redacted>"))
            .field("previous_secrets", &self.previous_secrets.len())
            .finish()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_defaults() {
        let mut options = SessionOptions::new();
        options.apply_defaults();

        assert_eq!(options.cookie.max_age, 86400);
        assert_eq!(options.cookie.path, "/");
        assert_eq!(options.key_prefix, "session_");
        assert_eq!(options.max_length, 32768);
        assert_eq!(options.secret, DEFAULT_SECRET);
    }

    #[test]
    fn test_apply_defaults_keeps_explicit_values() {
        let mut options = SessionOptions::new()
            .with_max_age(-1)
            .with_path("/app")
            .with_key_prefix("myapp:")
            .with_max_length(512)
            .with_secret("s3cret");
        options.apply_defaults();

        assert_eq!(options.cookie.max_age, -1);
        assert_eq!(options.cookie.path, "/app");
        assert_eq!(options.key_prefix, "myapp:");
        assert_eq!(options.max_length, 512);
        assert_eq!(options.secret, "s3cret");
    }

    #[test]
    fn test_key_pairs_order() {
        let options = SessionOptions::new()
            .with_secret("current")
            .with_previous_secret(SessionSecret::new("older"))
            .with_previous_secret(SessionSecret::new("oldest"));

        let pairs = options.key_pairs();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].hash_key, b"current");
        assert_eq!(pairs[2].hash_key, b"oldest");
        assert!(pairs[0].block_key.is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let options = SessionOptions::new()
            .with_secret("do-not-print")
            .with_encryption_key("do-not-print-either");
        let debug = format!("{:?}", options);
        assert!(!debug.contains("do-not-print"));
    }

    #[test]
    fn test_deserialize_partial() {
        let options: SessionOptions = serde_json::from_str(
            r#"{"secret": "abc", "cookie": {"secure": true, "same_site": "Lax"}}"#,
        )
        .unwrap();
        assert_eq!(options.secret, "abc");
        assert!(options.cookie.secure);
        assert_eq!(options.cookie.same_site, Some(SameSite::Lax));
        assert_eq!(options.cookie.max_age, 0);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("nope"));
    }
}
