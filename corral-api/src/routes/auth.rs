//! Auth REST routes: register, login, token verification.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};

use crate::auth::{hash_password, issue_token};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::types::{AuthResponse, LoginRequest, RegisterRequest, VerifyResponse};

/// POST /register - Create an account and return a signed token.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.name.trim().is_empty() {
        return Err(ApiError::missing_field("name"));
    }
    if req.email.trim().is_empty() {
        return Err(ApiError::missing_field("email"));
    }
    if req.password.is_empty() {
        return Err(ApiError::missing_field("password"));
    }

    let user = state
        .store
        .user_create(req.name.trim(), req.email.trim(), &hash_password(&req.password))
        .await?;
    let token = issue_token(&state.auth, user.id)?;

    tracing::info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            token,
            user,
        }),
    ))
}

/// POST /login - Exchange credentials for a signed token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .store
        .user_authenticate(req.email.trim(), &hash_password(&req.password))
        .await?;
    let token = issue_token(&state.auth, user.id)?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user,
    }))
}

/// GET /verify-token - Return the user the bearer token names.
///
/// The heavy lifting happens in the auth middleware; reaching this handler
/// means the token was valid and the user still exists.
pub async fn verify_token(Extension(AuthUser(user)): Extension<AuthUser>) -> Json<VerifyResponse> {
    Json(VerifyResponse { user })
}
