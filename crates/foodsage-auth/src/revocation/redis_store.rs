//! Redis-backed revocation store.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Pool, Runtime};
use redis::AsyncCommands;

use super::{REVOKED_MARKER, RevocationError, RevocationStore, revocation_key};
use crate::config::MAX_TOKEN_LIFETIME;

const PING_KEY: &str = "foodsage:ping";

/// Builds a Redis connection pool.
///
/// The pool connects lazily; an unreachable server surfaces on the first
/// lookup, where the session guard's failure policy applies.
///
/// # Errors
///
/// Returns `RevocationError::Unavailable` if the URL or pool settings are invalid.
pub fn create_redis_pool(
    url: &str,
    pool_size: usize,
    timeout: Duration,
) -> Result<Pool, RevocationError> {
    let mut redis_config = deadpool_redis::Config::from_url(url);
    if let Some(ref mut pool_config) = redis_config.pool {
        pool_config.max_size = pool_size;
        pool_config.timeouts.wait = Some(timeout);
        pool_config.timeouts.create = Some(timeout);
        pool_config.timeouts.recycle = Some(timeout);
    } else {
        let mut pool_config = deadpool_redis::PoolConfig::new(pool_size);
        pool_config.timeouts.wait = Some(timeout);
        pool_config.timeouts.create = Some(timeout);
        pool_config.timeouts.recycle = Some(timeout);
        redis_config.pool = Some(pool_config);
    }

    redis_config
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| RevocationError::unavailable(e.to_string()))
}

/// Revocation store shared by every instance through Redis.
///
/// Entries are written with `SET key revoked EX ttl` so Redis expires them
/// on its own; lookups are a single `EXISTS`.
#[derive(Clone)]
pub struct RedisRevocationStore {
    pool: Pool,
    timeout: Duration,
}

impl RedisRevocationStore {
    /// Wraps `pool`; every call is bounded by `timeout`.
    #[must_use]
    pub fn new(pool: Pool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Checks that the server answers.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be obtained in time.
    pub async fn ping(&self) -> Result<(), RevocationError> {
        self.bounded("ping", async {
            let mut conn = self.connection().await?;
            conn.exists::<_, bool>(PING_KEY)
                .await
                .map(|_| ())
                .map_err(|e| RevocationError::backend(e.to_string()))
        })
        .await
    }

    /// Closes the pool; later calls fail with `Unavailable`.
    pub fn close(&self) {
        self.pool.close();
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, RevocationError> {
        self.pool
            .get()
            .await
            .map_err(|e| RevocationError::unavailable(e.to_string()))
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, RevocationError>
    where
        F: Future<Output = Result<T, RevocationError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(RevocationError::Timeout { operation }),
        }
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), RevocationError> {
        let key = revocation_key(token);
        let ttl_secs = ttl.min(MAX_TOKEN_LIFETIME).as_secs().max(1);

        self.bounded("revoke", async {
            let mut conn = self.connection().await?;
            conn.set_ex::<_, _, ()>(&key, REVOKED_MARKER, ttl_secs)
                .await
                .map_err(|e| RevocationError::backend(e.to_string()))
        })
        .await?;

        tracing::debug!(ttl_secs, "token revoked (redis)");
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError> {
        let key = revocation_key(token);

        self.bounded("is_revoked", async {
            let mut conn = self.connection().await?;
            conn.exists::<_, bool>(&key)
                .await
                .map_err(|e| RevocationError::backend(e.to_string()))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_server_is_an_error_not_a_verdict() {
        // Nothing listens on port 1; the lookup must fail instead of
        // reporting "not revoked".
        let pool = create_redis_pool("redis://127.0.0.1:1", 2, Duration::from_millis(200)).unwrap();
        let store = RedisRevocationStore::new(pool, Duration::from_millis(500));

        let result = store.is_revoked("some.token.value").await;
        assert!(result.is_err());

        let result = store.revoke("some.token.value", Duration::from_secs(5)).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(create_redis_pool("not a url", 2, Duration::from_millis(100)).is_err());
    }
}
