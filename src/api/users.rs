use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_required_text;
use super::{ApiError, ApiResponse, AppState, TokenDto, UserDto};
use crate::services::ProfileChanges;

// ============================================================================
// Request types
// ============================================================================

/// All fields optional so that a missing field is a 400 with a message
/// rather than a body-deserialization rejection.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct TokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /user
/// Register a new account; the response never echoes the password.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    let email = validate_required_text("email", payload.email)?;
    let name = validate_required_text("name", payload.name)?;
    let password = payload
        .password
        .ok_or_else(|| ApiError::validation("password is required"))?;

    let user = state
        .auth_service()
        .register(&email, &name, &password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserDto::from(user))),
    ))
}

/// POST /user/token
/// Exchange credentials for the account's token. Wrong credentials are a
/// 400 with no token issued.
pub async fn create_token(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<ApiResponse<TokenDto>>, ApiError> {
    let email = validate_required_text("email", payload.email)?;
    let password = payload
        .password
        .ok_or_else(|| ApiError::validation("password is required"))?;

    let token = state.auth_service().login(&email, &password).await?;

    Ok(Json(ApiResponse::success(TokenDto { token })))
}

/// GET /user/me
pub async fn me(
    Extension(user): Extension<CurrentUser>,
) -> Json<ApiResponse<UserDto>> {
    Json(ApiResponse::success(UserDto {
        email: user.email,
        name: user.name,
    }))
}

/// PATCH /user/me
/// Update name, email, and/or password; absent fields stay as they are.
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let changes = ProfileChanges {
        email: payload.email,
        name: payload.name,
        password: payload.password,
    };

    let updated = state.auth_service().update_profile(user.id, changes).await?;

    Ok(Json(ApiResponse::success(UserDto::from(updated))))
}
