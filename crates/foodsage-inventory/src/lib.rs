//! # foodsage-inventory
//!
//! Per-user inventories kept consistent under concurrent read-modify-write.
//!
//! [`InventoryEngine`] never overwrites a record blindly: every write is
//! conditional on the version it read, and a lost race is retried from a
//! fresh read.

pub mod config;
pub mod engine;
pub mod error;

pub use config::InventoryConfig;
pub use engine::{InventoryEngine, normalize_item};
pub use error::InventoryError;
