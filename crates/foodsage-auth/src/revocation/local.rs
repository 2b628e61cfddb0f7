//! Process-local revocation store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::task::JoinHandle;

use super::{RevocationError, RevocationStore, revocation_key};
use crate::config::MAX_TOKEN_LIFETIME;

/// Revocation store backed by a [`DashMap`].
///
/// Expired entries are ignored on lookup and dropped lazily; call
/// [`purge_expired`](Self::purge_expired) or
/// [`spawn_sweeper`](Self::spawn_sweeper) to reclaim memory.
#[derive(Debug, Clone, Default)]
pub struct LocalRevocationStore {
    entries: Arc<DashMap<String, Instant>>,
}

impl LocalRevocationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes expired entries and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    /// Number of entries currently held, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Spawns a task that purges expired entries every `interval`.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let purged = store.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "purged expired revocation entries");
                }
            }
        })
    }
}

#[async_trait]
impl RevocationStore for LocalRevocationStore {
    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), RevocationError> {
        // No token outlives MAX_TOKEN_LIFETIME, so neither does its entry.
        let expires_at = Instant::now() + ttl.min(MAX_TOKEN_LIFETIME);
        self.entries.insert(revocation_key(token), expires_at);
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError> {
        let key = revocation_key(token);
        let Some(expires_at) = self.entries.get(&key).map(|e| *e.value()) else {
            return Ok(false);
        };

        if expires_at > Instant::now() {
            return Ok(true);
        }

        self.entries.remove_if(&key, |_, at| *at <= Instant::now());
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_revoke_and_lookup() {
        let store = LocalRevocationStore::new();
        assert!(!store.is_revoked("t1").await.unwrap());

        store.revoke("t1", Duration::from_secs(60)).await.unwrap();
        assert!(store.is_revoked("t1").await.unwrap());
        assert!(!store.is_revoked("t2").await.unwrap());
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let store = LocalRevocationStore::new();
        store.revoke("t1", Duration::from_millis(20)).await.unwrap();
        assert!(store.is_revoked("t1").await.unwrap());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(!store.is_revoked("t1").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = LocalRevocationStore::new();
        store.revoke("short", Duration::from_millis(10)).await.unwrap();
        store.revoke("long", Duration::from_secs(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.is_revoked("long").await.unwrap());
    }

    #[tokio::test]
    async fn test_huge_ttl_is_capped() {
        let store = LocalRevocationStore::new();
        store.revoke("t1", Duration::MAX).await.unwrap();
        assert!(store.is_revoked("t1").await.unwrap());
        assert_eq!(store.purge_expired(), 0);
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let store = LocalRevocationStore::new();
        store.revoke("t1", Duration::from_secs(60)).await.unwrap();
        store.revoke("t1", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.len(), 1);
    }
}
