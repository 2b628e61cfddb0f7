//! HTTP server for the FoodSage session and inventory service.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod state;

pub use config::{AppConfig, StorageBackend};
pub use error::{ApiError, ApiResult};
pub use server::{FoodsageServer, ServerBuilder, build_app, build_router};
pub use state::AppState;
