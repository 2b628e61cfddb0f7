//! # foodsage-storage
//!
//! Credential store abstraction for the FoodSage service.
//!
//! This crate defines:
//! - [`UserStorage`] - user records keyed by ID with a secondary email lookup
//! - [`InventoryStorage`] - per-user item sets with version-stamped conditional writes
//! - [`MemoryStorage`] - an in-process backend used for tests and single-node runs
//! - [`ResilientStorage`] - a decorator adding deadlines and bounded retry
//! - [`ErrorKind`] - the error classification shared by every FoodSage crate
//!
//! The PostgreSQL backend lives in `foodsage-postgres`.

mod error;
mod kind;
pub mod memory;
pub mod retry;
mod traits;
mod types;

pub use error::StorageError;
pub use kind::ErrorKind;
pub use memory::MemoryStorage;
pub use retry::{ResilientStorage, RetryPolicy, with_retry, with_timeout};
pub use traits::{InventoryStorage, UserStorage};
pub use types::{InventoryRecord, User, UserProfile};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Shared handle to a user store.
pub type DynUserStorage = std::sync::Arc<dyn UserStorage>;

/// Shared handle to an inventory store.
pub type DynInventoryStorage = std::sync::Arc<dyn InventoryStorage>;
