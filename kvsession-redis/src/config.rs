//! Redis configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::{RedisError, Result};

/// Redis configuration.
///
/// One value describes both deployment shapes: a single server reached
/// through `url`, or a cluster seeded from `cluster_nodes`. Credentials and
/// timeouts apply to every node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis URL (redis://host:port or rediss://host:port for TLS).
    pub url: String,
    /// Cluster seed addresses (host:port or full URLs). Non-empty enables cluster mode.
    #[serde(default)]
    pub cluster_nodes: Vec<String>,
    /// Connection pool size (standalone mode).
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// Dial timeout.
    #[serde(with = "secs_serde", default = "default_connection_timeout")]
    pub connection_timeout: Duration,
    /// How often the keepalive task pings the server. `None` disables it.
    #[serde(with = "opt_secs_serde", default)]
    pub ping_interval: Option<Duration>,
    /// Database number (0-15, standalone only).
    pub database: Option<u8>,
    /// Username for Redis 6+ ACL.
    pub username: Option<String>,
    /// Password.
    pub password: Option<String>,
}

fn default_pool_size() -> u32 {
    10
}

fn default_connection_timeout() -> Duration {
    Duration::from_secs(5)
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            cluster_nodes: Vec::new(),
            pool_size: default_pool_size(),
            connection_timeout: default_connection_timeout(),
            ping_interval: None,
            database: None,
            username: None,
            password: None,
        }
    }
}

impl RedisConfig {
    /// Create a new configuration for a single server.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Create a builder.
    pub fn builder() -> RedisConfigBuilder {
        RedisConfigBuilder::new()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> RedisConfigBuilder {
        let mut builder = RedisConfigBuilder::new();

        if let Ok(url) = std::env::var("REDIS_URL") {
            builder = builder.url(url);
        }

        if let Ok(pool_size) = std::env::var("REDIS_POOL_SIZE")
            && let Ok(size) = pool_size.parse() {
                builder = builder.pool_size(size);
            }

        if let Ok(db) = std::env::var("REDIS_DATABASE")
            && let Ok(db_num) = db.parse() {
                builder = builder.database(db_num);
            }

        if let Ok(username) = std::env::var("REDIS_USERNAME") {
            builder = builder.username(username);
        }

        if let Ok(password) = std::env::var("REDIS_PASSWORD") {
            builder = builder.password(password);
        }

        if let Ok(timeout) = std::env::var("REDIS_CONNECTION_TIMEOUT")
            && let Ok(secs) = timeout.parse() {
                builder = builder.connection_timeout(Duration::from_secs(secs));
            }

        if let Ok(interval) = std::env::var("REDIS_PING_INTERVAL")
            && let Ok(secs) = interval.parse() {
                builder = builder.ping_interval(Duration::from_secs(secs));
            }

        if let Ok(nodes) = std::env::var("REDIS_CLUSTER_NODES") {
            let nodes: Vec<String> = nodes
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            builder = builder.cluster_nodes(nodes);
        }

        builder
    }

    /// Whether this configuration targets a Redis Cluster.
    pub fn is_cluster(&self) -> bool {
        !self.cluster_nodes.is_empty()
    }

    /// Connection URL for the standalone server.
    pub fn connection_url(&self) -> Result<String> {
        self.node_url(&self.url)
    }

    /// Connection URLs for every cluster seed.
    pub fn cluster_urls(&self) -> Result<Vec<String>> {
        self.cluster_nodes
            .iter()
            .map(|node| self.node_url(node))
            .collect()
    }

    /// Build the dial URL for one node.
    ///
    /// Bare `host:port` addresses get the `redis://` scheme. Credentials are
    /// appended only when a password is configured; the database is only
    /// applied outside cluster mode.
    pub fn node_url(&self, addr: &str) -> Result<String> {
        let raw = if addr.contains("://") {
            addr.to_string()
        } else {
            format!("redis://{}", addr)
        };

        let mut url =
            Url::parse(&raw).map_err(|e| RedisError::Config(format!("{}: {}", addr, e)))?;

        if !matches!(url.scheme(), "redis" | "rediss") {
            return Err(RedisError::Config(format!(
                "unsupported scheme '{}' in {}",
                url.scheme(),
                addr
            )));
        }

        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            let username = self.username.as_deref().unwrap_or("");
            url.set_username(username)
                .map_err(|_| RedisError::Config(format!("cannot set username on {}", addr)))?;
            url.set_password(Some(password))
                .map_err(|_| RedisError::Config(format!("cannot set password on {}", addr)))?;
        }

        if let Some(db) = self.database
            && !self.is_cluster()
            && matches!(url.path(), "" | "/")
        {
            url.set_path(&format!("/{}", db));
        }

        Ok(url.to_string())
    }
}

/// Builder for Redis configuration.
#[derive(Default)]
pub struct RedisConfigBuilder {
    config: RedisConfig,
}

impl RedisConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: RedisConfig::default(),
        }
    }

    /// Set the Redis URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Set the pool size.
    pub fn pool_size(mut self, size: u32) -> Self {
        self.config.pool_size = size;
        self
    }

    /// Set the dial timeout.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.config.connection_timeout = timeout;
        self
    }

    /// Set the keepalive ping interval.
    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.config.ping_interval = Some(interval);
        self
    }

    /// Set the database number.
    pub fn database(mut self, db: u8) -> Self {
        self.config.database = Some(db);
        self
    }

    /// Set the username (Redis 6+ ACL).
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self
    }

    /// Set the password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = Some(password.into());
        self
    }

    /// Set cluster seed nodes.
    pub fn cluster_nodes(mut self, nodes: Vec<String>) -> Self {
        self.config.cluster_nodes = nodes;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> RedisConfig {
        self.config
    }
}

mod secs_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

mod opt_secs_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.map(|d| d.as_secs()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
