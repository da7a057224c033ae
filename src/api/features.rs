use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::{parse_bool_flag, validate_required_text};
use super::{ApiError, ApiResponse, AppState, FeatureDto};

#[derive(Deserialize)]
pub struct FeatureListQuery {
    /// 1 restricts the list to features attached to at least one destination.
    pub is_feature_destination: Option<String>,
}

#[derive(Deserialize)]
pub struct FeatureUpdateRequest {
    pub name: Option<String>,
}

/// GET /features
pub async fn list_features(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<FeatureListQuery>,
) -> Result<Json<ApiResponse<Vec<FeatureDto>>>, ApiError> {
    let attached_only = match params.is_feature_destination.as_deref() {
        Some(raw) => parse_bool_flag("is_feature_destination", raw)?,
        None => false,
    };

    let features = state.store().list_features(user.id, attached_only).await?;

    Ok(Json(ApiResponse::success(
        features.into_iter().map(FeatureDto::from).collect(),
    )))
}

/// GET /features/{id}
pub async fn get_feature(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<FeatureDto>>, ApiError> {
    let feature = state
        .store()
        .get_feature(user.id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Feature", id))?;

    Ok(Json(ApiResponse::success(FeatureDto::from(feature))))
}

/// PATCH /features/{id}
pub async fn update_feature(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<FeatureUpdateRequest>,
) -> Result<Json<ApiResponse<FeatureDto>>, ApiError> {
    let name = validate_required_text("name", payload.name)?;

    if state.store().feature_name_taken(user.id, &name, id).await? {
        return Err(ApiError::validation(
            "You already have a feature with this name",
        ));
    }

    let feature = state
        .store()
        .rename_feature(user.id, id, &name)
        .await?
        .ok_or_else(|| ApiError::not_found("Feature", id))?;

    Ok(Json(ApiResponse::success(FeatureDto::from(feature))))
}

/// DELETE /features/{id}
pub async fn delete_feature(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if state.store().remove_feature(user.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Feature", id))
    }
}
