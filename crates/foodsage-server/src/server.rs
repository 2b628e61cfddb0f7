use std::net::SocketAddr;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::AppConfig, handlers, middleware as app_middleware, state::AppState};

pub struct FoodsageServer {
    addr: SocketAddr,
    app: Router,
    state: AppState,
}

pub fn build_router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        // Accounts
        .route("/users/register", post(handlers::register))
        .route("/users/login", post(handlers::login))
        .route("/users/profile", get(handlers::profile))
        .route("/users/logout", get(handlers::logout))
        // Inventory
        .route(
            "/inventory/{user_id}",
            get(handlers::get_inventory)
                .post(handlers::add_item)
                .delete(handlers::remove_item),
        )
        .with_state(state)
        // The last layer runs first: request id is set before the trace span opens
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri().path(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(middleware::from_fn(app_middleware::request_id))
}

/// Builds the state from `cfg` and returns the router over it.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<(Router, AppState)> {
    let state = AppState::build(cfg).await?;
    Ok((build_router(state.clone(), cfg.server.body_limit_bytes), state))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub async fn build(self) -> anyhow::Result<FoodsageServer> {
        let (app, state) = build_app(&self.config).await?;

        Ok(FoodsageServer {
            addr: self.addr,
            app,
            state,
        })
    }
}

impl FoodsageServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        let served = axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        self.state.shutdown().await;
        served?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    async fn app() -> Router {
        let mut cfg = AppConfig::default();
        cfg.auth.jwt_secret = "0123456789abcdef0123456789abcdef".to_string();
        build_app(&cfg).await.unwrap().0
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = app()
            .await
            .oneshot(
                Request::get("/healthz")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-request-id"], "req-42");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = app()
            .await
            .oneshot(Request::get("/recipes").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_inventory_without_token_is_401() {
        let response = app()
            .await
            .oneshot(Request::get("/inventory/u1").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Access denied");
    }
}
