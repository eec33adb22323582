//! Order listing route handler.

use axum::{Json, extract::State};
use serde_json::json;

use crate::db::orders::OrderRepository;
use crate::error::AppError;
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

/// List the calling identity's orders, newest first.
///
/// Scoped strictly to the verified credential's email; there is no way to
/// request another identity's orders.
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let orders = OrderRepository::new(state.pool());
    let orders = orders.list_by_email(&claims.email).await?;

    Ok(Json(json!({ "orders": orders })))
}
