//! In-memory session cache
//!
//! Uses DashMap for thread-safe concurrent access. Suitable for tests and
//! single-instance development setups. Counts every command it receives and
//! can be switched into a failing mode, so it doubles as a spy in tests.
//!
//! Expired entries are evicted on `GET` of their key and swept on every
//! `SETEX`, so sessions that are never read again do not pile up.

use crate::error::{SessionError, SessionResult};
use crate::traits::SessionCache;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory key/value/TTL cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
    gets: AtomicUsize,
    set_exs: AtomicUsize,
    dels: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent command fail (`true`) or succeed again (`false`).
    ///
    /// Failed commands are still counted.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `GET` commands received
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of `SETEX` commands received
    pub fn set_exs(&self) -> usize {
        self.set_exs.load(Ordering::SeqCst)
    }

    /// Number of `DEL` commands received
    pub fn dels(&self) -> usize {
        self.dels.load(Ordering::SeqCst)
    }

    pub fn reset_counts(&self) {
        self.gets.store(0, Ordering::SeqCst);
        self.set_exs.store(0, Ordering::SeqCst);
        self.dels.store(0, Ordering::SeqCst);
    }

    /// Raw stored bytes for `key`, ignoring expiry.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Time left before `key` expires.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.expires_at - now)
    }

    /// Number of stored keys, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop expired entries.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
    }

    fn check_available(&self) -> SessionResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SessionError::Cache("memory cache unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionCache for MemoryCache {
    async fn get(&self, key: &str) -> SessionResult<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        trace!(key = %key, "Memory cache GET");

        let now = Instant::now();
        let value = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => None,
            None => return Ok(None),
        };

        if value.is_none() {
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &[u8], ttl_secs: u64) -> SessionResult<()> {
        self.set_exs.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        trace!(key = %key, ttl_secs = ttl_secs, len = value.len(), "Memory cache SETEX");

        let now = Instant::now();
        let expires_at = match ttl_secs {
            0 => None,
            secs => now.checked_add(Duration::from_secs(secs)),
        }
        .ok_or_else(|| SessionError::Cache("invalid expire time in 'setex' command".to_string()))?;

        self.purge_expired();
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> SessionResult<()> {
        self.dels.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        trace!(key = %key, "Memory cache DEL");

        self.entries.remove(key);
        Ok(())
    }
}
