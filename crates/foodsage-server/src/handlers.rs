use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
};
use foodsage_auth::{AccountService, AuthError, BearerAuth, LoginRequest, LoginResponse, RegisterRequest};
use foodsage_inventory::InventoryEngine;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ApiResult;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

/// Body of inventory add/remove requests.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ItemRequest {
    pub item: String,
}

fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

/// A body that is missing or not JSON is treated as empty, so the field
/// validators report what is missing.
fn body_or_default<T: Default>(body: Result<Json<T>, JsonRejection>) -> T {
    match body {
        Ok(Json(value)) => value,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable request body");
            T::default()
        }
    }
}

pub async fn root() -> &'static str {
    "Hello, World!"
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

// ---- Users ----

pub async fn register(
    State(accounts): State<AccountService>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    accounts.register(body_or_default(body)).await?;
    Ok((StatusCode::CREATED, message("User created successfully")))
}

pub async fn login(
    State(accounts): State<AccountService>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let issued = accounts.login(body_or_default(body)).await?;
    let header =
        HeaderValue::from_str(&issued.token).map_err(|e| AuthError::internal(e.to_string()))?;

    Ok((
        [(AUTHORIZATION, header)],
        Json(LoginResponse {
            token: issued.token,
        }),
    ))
}

pub async fn profile(
    State(accounts): State<AccountService>,
    BearerAuth(auth): BearerAuth,
) -> ApiResult<impl IntoResponse> {
    let user = accounts.profile(&auth).await?;
    Ok(Json(json!({ "user": user })))
}

pub async fn logout(
    State(accounts): State<AccountService>,
    BearerAuth(auth): BearerAuth,
) -> ApiResult<impl IntoResponse> {
    accounts.logout(&auth).await?;
    Ok((
        [(AUTHORIZATION, HeaderValue::from_static(""))],
        message("User logged out"),
    ))
}

// ---- Inventory ----

pub async fn get_inventory(
    State(engine): State<InventoryEngine>,
    BearerAuth(auth): BearerAuth,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    auth.ensure_owner(&user_id)?;
    let items = engine.get_inventory(&user_id).await?;
    Ok(Json(items))
}

pub async fn add_item(
    State(engine): State<InventoryEngine>,
    BearerAuth(auth): BearerAuth,
    Path(user_id): Path<String>,
    body: Result<Json<ItemRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    auth.ensure_owner(&user_id)?;
    let request: ItemRequest = body_or_default(body);
    engine.add_item(&user_id, &request.item).await?;
    Ok(message("Item added successfully"))
}

pub async fn remove_item(
    State(engine): State<InventoryEngine>,
    BearerAuth(auth): BearerAuth,
    Path(user_id): Path<String>,
    body: Result<Json<ItemRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    auth.ensure_owner(&user_id)?;
    let request: ItemRequest = body_or_default(body);
    engine.remove_item(&user_id, &request.item).await?;
    Ok(message("Item deleted successfully"))
}
