use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::{parse_bool_flag, validate_required_text};
use super::{ApiError, ApiResponse, AppState, TagDto};

#[derive(Deserialize)]
pub struct TagListQuery {
    /// 1 restricts the list to tags attached to at least one destination.
    pub is_tag_destination: Option<String>,
}

#[derive(Deserialize)]
pub struct TagUpdateRequest {
    pub name: Option<String>,
}

/// GET /tags
/// The user's tags, name descending; each tag appears once regardless of
/// how many destinations it is attached to.
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<TagListQuery>,
) -> Result<Json<ApiResponse<Vec<TagDto>>>, ApiError> {
    let attached_only = match params.is_tag_destination.as_deref() {
        Some(raw) => parse_bool_flag("is_tag_destination", raw)?,
        None => false,
    };

    let tags = state.store().list_tags(user.id, attached_only).await?;

    Ok(Json(ApiResponse::success(
        tags.into_iter().map(TagDto::from).collect(),
    )))
}

/// GET /tags/{id}
pub async fn get_tag(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TagDto>>, ApiError> {
    let tag = state
        .store()
        .get_tag(user.id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tag", id))?;

    Ok(Json(ApiResponse::success(TagDto::from(tag))))
}

/// PATCH /tags/{id}
/// Rename; the new name must not collide with another of the user's tags.
pub async fn update_tag(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<TagUpdateRequest>,
) -> Result<Json<ApiResponse<TagDto>>, ApiError> {
    let name = validate_required_text("name", payload.name)?;

    if state.store().tag_name_taken(user.id, &name, id).await? {
        return Err(ApiError::validation("You already have a tag with this name"));
    }

    let tag = state
        .store()
        .rename_tag(user.id, id, &name)
        .await?
        .ok_or_else(|| ApiError::not_found("Tag", id))?;

    Ok(Json(ApiResponse::success(TagDto::from(tag))))
}

/// DELETE /tags/{id}
pub async fn delete_tag(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if state.store().remove_tag(user.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Tag", id))
    }
}
