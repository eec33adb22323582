//! Authentication route handlers.
//!
//! Successful login/registration sets the session credential as an HTTP-only
//! cookie; logout clears it server-side and drops the cached cart.

use axum::{
    Json,
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, set_sentry_user};
use crate::middleware::auth::{CurrentUser, OptionalUser, clear_session_cookie, session_cookie};
use crate::models::user::{PublicUser, User};
use crate::services::auth::AuthService;
use crate::state::AppState;

// =============================================================================
// Request Schemas
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Issue a session credential for `user` and wrap it in a cookie-setting
/// JSON response.
fn session_response(state: &AppState, user: User) -> Result<Response, AppError> {
    let token = state.tokens().issue(user.id, &user.email, user.role)?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    let cookie = session_cookie(&token, state.config().cookie_secure);
    let user = PublicUser::from(user);

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({ "success": true, "user": user })),
    )
        .into_response())
}

/// Handle registration.
///
/// Creates a customer account and logs it in immediately.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .register(&req.email, &req.password, req.name.as_deref())
        .await?;

    tracing::info!(email = %user.email, "account registered");
    session_response(&state, user)
}

/// Handle login.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&req.email, &req.password).await?;

    session_response(&state, user)
}

/// Handle logout.
///
/// Clears the session cookie server-side and fires the cart-cache
/// invalidation signal for the identity, if one was present.
pub async fn logout(
    State(state): State<AppState>,
    OptionalUser(claims): OptionalUser,
) -> Response {
    if let Some(claims) = claims {
        state.carts().invalidate(&claims.email).await;
    }
    crate::error::clear_sentry_user();

    let cookie = clear_session_cookie(state.config().cookie_secure);
    (
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({ "success": true })),
    )
        .into_response()
}

/// Return the current account for a verified credential.
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let users = crate::db::users::UserRepository::new(state.pool());
    let user = users
        .get_by_email(&claims.email)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    Ok(Json(json!({ "user": PublicUser::from(user) })))
}
