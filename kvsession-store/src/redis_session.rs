//! Redis as the session cache.

use crate::config::SessionOptions;
use crate::error::SessionResult;
use crate::store::SessionStore;
use crate::traits::SessionCache;
use async_trait::async_trait;
use kvsession_redis::{RedisConfig, RedisService};

#[async_trait]
impl SessionCache for RedisService {
    async fn get(&self, key: &str) -> SessionResult<Option<Vec<u8>>> {
        Ok(RedisService::get(self, key).await?)
    }

    async fn set_ex(&self, key: &str, value: &[u8], ttl_secs: u64) -> SessionResult<()> {
        Ok(RedisService::set_ex(self, key, value, ttl_secs).await?)
    }

    async fn del(&self, key: &str) -> SessionResult<()> {
        RedisService::del(self, key).await?;
        Ok(())
    }
}

impl SessionStore<RedisService> {
    /// Connect to Redis and build a store on top of it.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use kvsession_redis::RedisConfig;
    /// use kvsession_store::{SessionOptions, SessionStore};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let store = SessionStore::connect(
    ///     RedisConfig::new("redis://localhost:6379"),
    ///     SessionOptions::new().with_secret("change-me"),
    /// )
    /// .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(config: RedisConfig, options: SessionOptions) -> SessionResult<Self> {
        let redis = RedisService::new(config).await?;
        Self::new(redis, options)
    }
}
