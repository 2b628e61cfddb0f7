//! Deadlines and bounded retry for store calls.
//!
//! Every call into a backend gets a deadline. Reads that fail transiently
//! (timeout, connection error) are retried with exponential backoff. Writes
//! get the deadline but a single attempt: a write that timed out may still
//! have been applied, and the caller's conditional-write loop is the one
//! place that can tell.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::StorageResult;
use crate::error::StorageError;
use crate::traits::{InventoryStorage, UserStorage};
use crate::types::{InventoryRecord, User};

/// Retry and deadline settings for store calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts for retryable calls, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay: Duration,
    /// Upper bound for the delay between attempts.
    pub max_delay: Duration,
    /// Deadline applied to each individual attempt.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Runs `op` once under the policy's deadline.
///
/// # Errors
///
/// Returns `StorageError::Timeout` if the deadline passes, otherwise the
/// operation's own result.
pub async fn with_timeout<T, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    op: Fut,
) -> StorageResult<T>
where
    Fut: Future<Output = StorageResult<T>>,
{
    match tokio::time::timeout(policy.timeout, op).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::timeout(operation)),
    }
}

/// Runs `op` under the policy's deadline, retrying transient failures.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or the first
/// non-transient error immediately.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut op: F,
) -> StorageResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StorageResult<T>>,
{
    let mut delay = policy.base_delay;
    let mut attempt = 1;

    loop {
        match with_timeout(policy, operation, op()).await {
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                tracing::warn!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient storage failure, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(policy.max_delay);
                attempt += 1;
            }
            result => return result,
        }
    }
}

// =============================================================================
// Resilient Storage
// =============================================================================

/// Decorator that applies a [`RetryPolicy`] to every call of an inner store.
pub struct ResilientStorage<S: ?Sized> {
    inner: Arc<S>,
    policy: RetryPolicy,
}

impl<S: ?Sized> ResilientStorage<S> {
    /// Wraps `inner` with the given policy.
    #[must_use]
    pub fn new(inner: Arc<S>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<S> UserStorage for ResilientStorage<S>
where
    S: UserStorage + ?Sized,
{
    async fn find_by_id(&self, user_id: &str) -> StorageResult<Option<User>> {
        with_retry(&self.policy, "user.find_by_id", || {
            self.inner.find_by_id(user_id)
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        with_retry(&self.policy, "user.find_by_email", || {
            self.inner.find_by_email(email)
        })
        .await
    }

    async fn create(&self, user: &User) -> StorageResult<()> {
        with_timeout(&self.policy, "user.create", self.inner.create(user)).await
    }
}

#[async_trait]
impl<S> InventoryStorage for ResilientStorage<S>
where
    S: InventoryStorage + ?Sized,
{
    async fn get(&self, user_id: &str) -> StorageResult<Option<InventoryRecord>> {
        with_retry(&self.policy, "inventory.get", || self.inner.get(user_id)).await
    }

    async fn put(
        &self,
        user_id: &str,
        items: &BTreeSet<String>,
        expected: Option<u64>,
    ) -> StorageResult<InventoryRecord> {
        with_timeout(
            &self.policy,
            "inventory.put",
            self.inner.put(user_id, items, expected),
        )
        .await
    }

    async fn delete(&self, user_id: &str, expected: u64) -> StorageResult<()> {
        with_timeout(
            &self.policy,
            "inventory.delete",
            self.inner.delete(user_id, expected),
        )
        .await
    }
}
