//! Shared application state and the lifecycle of external clients.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::extract::FromRef;
use foodsage_auth::revocation::create_redis_pool;
use foodsage_auth::{
    AccountService, LocalRevocationStore, RedisRevocationStore, RevocationStore, SessionGuard,
    TokenService,
};
use foodsage_inventory::InventoryEngine;
use foodsage_postgres::PostgresStorage;
use foodsage_storage::{
    DynInventoryStorage, DynUserStorage, MemoryStorage, ResilientStorage,
};
use tokio::task::JoinHandle;

use crate::config::{AppConfig, StorageBackend};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Handles to the services behind the HTTP surface.
///
/// Cloning is cheap; every clone shares the same stores.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub guard: SessionGuard,
    pub inventory: InventoryEngine,
    clients: Arc<Clients>,
}

/// External clients owned by the state, released by [`AppState::shutdown`].
#[derive(Default)]
struct Clients {
    postgres: Option<PostgresStorage>,
    redis: Option<RedisRevocationStore>,
    sweeper: Option<JoinHandle<()>>,
}

impl AppState {
    /// Connects the configured stores and wires the services together.
    ///
    /// A Redis server that is down at startup is not fatal: lookups follow
    /// the revocation failure policy until it comes back.
    pub async fn build(cfg: &AppConfig) -> anyhow::Result<Self> {
        let mut clients = Clients::default();
        let policy = cfg.storage.retry_policy();

        let (users, inventory): (DynUserStorage, DynInventoryStorage) = match cfg.storage.backend {
            StorageBackend::Memory => {
                let store = Arc::new(ResilientStorage::new(Arc::new(MemoryStorage::new()), policy));
                tracing::info!("using in-memory storage");
                (store.clone(), store)
            }
            StorageBackend::Postgres => {
                let pg_cfg = &cfg.storage.postgres;
                let url = pg_cfg
                    .url
                    .as_deref()
                    .context("storage.postgres.url is not set")?;
                let pg = PostgresStorage::connect(
                    url,
                    pg_cfg.pool_size,
                    Duration::from_millis(pg_cfg.connect_timeout_ms),
                )
                .await
                .context("failed to connect to PostgreSQL")?;
                pg.ensure_schema()
                    .await
                    .context("failed to create database schema")?;

                let store = Arc::new(ResilientStorage::new(Arc::new(pg.clone()), policy));
                clients.postgres = Some(pg);
                (store.clone(), store)
            }
        };

        let revocations: Arc<dyn RevocationStore> = if cfg.redis.enabled {
            let pool = create_redis_pool(&cfg.redis.url, cfg.redis.pool_size, cfg.redis.timeout())
                .context("invalid Redis configuration")?;
            let store = RedisRevocationStore::new(pool, cfg.redis.timeout());
            match store.ping().await {
                Ok(()) => tracing::info!("Redis revocation store connected"),
                Err(e) => tracing::warn!(
                    error = %e,
                    policy = ?cfg.auth.revocation_failure_policy,
                    "Redis not reachable at startup"
                ),
            }
            clients.redis = Some(store.clone());
            Arc::new(store)
        } else {
            let store = LocalRevocationStore::new();
            clients.sweeper = Some(store.spawn_sweeper(SWEEP_INTERVAL));
            tracing::info!("using in-process revocation store");
            Arc::new(store)
        };

        let tokens = Arc::new(TokenService::from_config(&cfg.auth));
        let guard = SessionGuard::new(
            tokens.clone(),
            revocations.clone(),
            cfg.auth.revocation_failure_policy,
        );

        Ok(Self {
            accounts: AccountService::new(users, tokens, revocations),
            guard,
            inventory: InventoryEngine::new(inventory, cfg.inventory),
            clients: Arc::new(clients),
        })
    }

    /// Releases external clients. Requests still in flight fail with
    /// `StoreUnavailable`.
    pub async fn shutdown(&self) {
        if let Some(sweeper) = &self.clients.sweeper {
            sweeper.abort();
        }
        if let Some(redis) = &self.clients.redis {
            redis.close();
        }
        if let Some(pg) = &self.clients.postgres {
            pg.close().await;
        }
        tracing::info!("external clients closed");
    }
}

impl FromRef<AppState> for SessionGuard {
    fn from_ref(state: &AppState) -> Self {
        state.guard.clone()
    }
}

impl FromRef<AppState> for AccountService {
    fn from_ref(state: &AppState) -> Self {
        state.accounts.clone()
    }
}

impl FromRef<AppState> for InventoryEngine {
    fn from_ref(state: &AppState) -> Self {
        state.inventory.clone()
    }
}
