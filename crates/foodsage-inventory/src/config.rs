//! Inventory engine settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry settings for conditional inventory writes.
///
/// # Example (TOML)
///
/// ```toml
/// [inventory]
/// max_attempts = 8
/// backoff_base_ms = 5
/// backoff_max_ms = 100
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Read-modify-write attempts before giving up on a contended inventory.
    pub max_attempts: u32,
    /// Base delay between attempts; grows linearly and is jittered.
    pub backoff_base_ms: u64,
    /// Upper bound for the delay between attempts.
    pub backoff_max_ms: u64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            backoff_base_ms: 5,
            backoff_max_ms: 100,
        }
    }
}

impl InventoryConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a message if `max_attempts` is zero or the backoff bounds are inverted.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("inventory.max_attempts must be > 0".into());
        }
        if self.backoff_base_ms > self.backoff_max_ms {
            return Err("inventory.backoff_base_ms must not exceed backoff_max_ms".into());
        }
        Ok(())
    }

    #[must_use]
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    #[must_use]
    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }
}
