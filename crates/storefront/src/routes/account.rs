//! Profile update route handler.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::json;

use petalcart_core::{Address, Phone};

use crate::db::users::UserRepository;
use crate::error::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::cart::CartItem;
use crate::models::user::{ProfileUpdate, PublicUser};
use crate::state::AppState;

/// Partial profile update body.
///
/// Unknown fields are rejected; the target account is always the verified
/// credential's own record - client-supplied identifiers are never accepted.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<Phone>,
    pub address: Option<Address>,
    pub image: Option<String>,
    pub cart: Option<Vec<CartItem>>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            name: req.name,
            phone: req.phone,
            address: req.address,
            image: req.image,
            cart: req.cart,
        }
    }
}

/// Apply a partial update to the calling identity's own profile.
///
/// When the body carries a `cart` snapshot (the client-driven mirror sync),
/// the cached cart is refreshed too so subsequent cart reads see it.
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mirrored_cart = req.cart.clone();

    let users = UserRepository::new(state.pool());
    let user = users
        .update_profile(&claims.email, req.into())
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    if let Some(items) = mirrored_cart {
        state.carts().replace(&claims.email, items).await;
    }

    Ok(Json(json!({ "success": true, "user": PublicUser::from(user) })))
}
