//! Request middleware.
//!
//! The auth middleware validates the bearer token, resolves the user it
//! names, and injects an [`AuthUser`] extension for handlers. A token whose
//! user no longer exists is a 401, not a 404: the session is dead.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use corral_core::User;

use crate::auth::{bearer_token, validate_token};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::StoreError;

/// Authenticated user, injected into request extensions after the bearer
/// token has been validated.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("No token provided"))?;

    let token = bearer_token(auth_header)?;
    let claims = validate_token(&state.auth, token)?;
    let user_id = claims.user_id()?;

    let user = state.store.user_get(user_id).await.map_err(|err| match err {
        StoreError::UserNotFound => ApiError::unauthorized("User not found"),
        other => other.into(),
    })?;

    request.extensions_mut().insert(AuthUser(user));
    Ok(next.run(request).await)
}
