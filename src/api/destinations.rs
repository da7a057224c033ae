use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::{label_names, parse_id_list, validate_rating};
use super::{ApiError, ApiResponse, AppState, DestinationDetailDto, DestinationListDto};
use crate::api::types::LabelInput;
use crate::db::{DestinationChanges, DestinationFilter, NewDestination};
use crate::entities::destinations;

// ============================================================================
// Request types
// ============================================================================

#[derive(Deserialize)]
pub struct ListQuery {
    /// Comma-separated tag IDs; any-of semantics.
    pub tags: Option<String>,
    /// Comma-separated feature IDs; any-of semantics.
    pub features: Option<String>,
}

/// Shared body shape for create/PUT/PATCH. Which fields are mandatory
/// depends on the operation, so everything is optional here and the
/// handlers enforce presence.
#[derive(Deserialize)]
pub struct DestinationPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub rating: Option<f64>,
    pub tags: Option<Vec<LabelInput>>,
    pub features: Option<Vec<LabelInput>>,
}

const REQUIRED_FIELDS: [&str; 4] = ["name", "country", "city", "rating"];

fn require_all_scalars(payload: &DestinationPayload) -> Result<(), ApiError> {
    let present = [
        payload.name.is_some(),
        payload.country.is_some(),
        payload.city.is_some(),
        payload.rating.is_some(),
    ];

    for (field, is_present) in REQUIRED_FIELDS.iter().zip(present) {
        if !is_present {
            return Err(ApiError::validation(format!("{field} is required")));
        }
    }

    Ok(())
}

/// A provided-but-blank text field is a client error; an absent one is the
/// caller's business.
fn reject_blank(field: &str, value: Option<String>) -> Result<Option<String>, ApiError> {
    match value {
        Some(v) if v.trim().is_empty() => {
            Err(ApiError::validation(format!("{field} may not be blank")))
        }
        other => Ok(other),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /destinations
/// Shallow representation, newest first, optionally narrowed by tag and/or
/// feature IDs.
pub async fn list_destinations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<DestinationListDto>>>, ApiError> {
    let filter = DestinationFilter {
        tag_ids: params
            .tags
            .as_deref()
            .map(|raw| parse_id_list("tags", raw))
            .transpose()?,
        feature_ids: params
            .features
            .as_deref()
            .map(|raw| parse_id_list("features", raw))
            .transpose()?,
    };

    let models = state.store().list_destinations(user.id, &filter).await?;

    let ids: Vec<i32> = models.iter().map(|d| d.id).collect();
    let mut tags_map = state.store().destination_tags_for_many(&ids).await?;
    let mut features_map = state.store().destination_features_for_many(&ids).await?;

    let results: Vec<DestinationListDto> = models
        .into_iter()
        .map(|model| {
            let tags = tags_map.remove(&model.id).unwrap_or_default();
            let features = features_map.remove(&model.id).unwrap_or_default();
            DestinationListDto::from_parts(model, tags, features)
        })
        .collect();

    Ok(Json(ApiResponse::success(results)))
}

/// POST /destinations
pub async fn create_destination(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<DestinationPayload>,
) -> Result<(StatusCode, Json<ApiResponse<DestinationDetailDto>>), ApiError> {
    require_all_scalars(&payload)?;

    let name = reject_blank("name", payload.name)?.unwrap_or_default();
    let country = reject_blank("country", payload.country)?.unwrap_or_default();
    let city = reject_blank("city", payload.city)?.unwrap_or_default();
    let rating = validate_rating(payload.rating.unwrap_or_default())?;

    let data = NewDestination {
        name,
        description: payload.description,
        country,
        city,
        rating,
        tags: payload
            .tags
            .map(|labels| label_names("tag", labels))
            .transpose()?
            .unwrap_or_default(),
        features: payload
            .features
            .map(|labels| label_names("feature", labels))
            .transpose()?
            .unwrap_or_default(),
    };

    let model = state.store().create_destination(user.id, data).await?;
    let dto = detail_dto(&state, model).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(dto))))
}

/// GET /destinations/{id}
/// Full representation including the description.
pub async fn get_destination(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<DestinationDetailDto>>, ApiError> {
    let model = state
        .store()
        .get_destination(user.id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Destination", id))?;

    let dto = detail_dto(&state, model).await?;
    Ok(Json(ApiResponse::success(dto)))
}

/// PUT /destinations/{id}
/// Full update: every required scalar must be supplied.
pub async fn replace_destination(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<DestinationPayload>,
) -> Result<Json<ApiResponse<DestinationDetailDto>>, ApiError> {
    require_all_scalars(&payload)?;
    apply_update(&state, &user, id, payload).await
}

/// PATCH /destinations/{id}
/// Partial update: absent scalars are untouched; a present label list
/// (even empty) replaces the whole relation set.
pub async fn update_destination(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<DestinationPayload>,
) -> Result<Json<ApiResponse<DestinationDetailDto>>, ApiError> {
    apply_update(&state, &user, id, payload).await
}

/// DELETE /destinations/{id}
pub async fn delete_destination(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if state.store().remove_destination(user.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Destination", id))
    }
}

/// POST /destinations/{id}/upload-image
/// Multipart upload; the file must decode as an image. On rejection the
/// previously stored image is untouched.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<DestinationDetailDto>>, ApiError> {
    // 404 before touching the body, so other users' IDs stay opaque.
    state
        .store()
        .get_destination(user.id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Destination", id))?;

    let mut upload: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() == Some("image") {
            let filename = field.file_name().map(ToString::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(format!("Failed to read upload: {e}")))?
                .to_vec();
            upload = Some((filename, data));
        }
    }

    let Some((filename, data)) = upload else {
        return Err(ApiError::validation("No image file provided"));
    };

    if data.is_empty() {
        return Err(ApiError::validation("The submitted file is empty"));
    }

    let stored = state
        .image_service()
        .save_upload(filename.as_deref(), data)
        .await?;

    let model = state
        .store()
        .set_destination_image(user.id, id, &stored)
        .await?
        .ok_or_else(|| ApiError::not_found("Destination", id))?;

    let dto = detail_dto(&state, model).await?;
    Ok(Json(ApiResponse::success(dto)))
}

// ============================================================================
// Helpers
// ============================================================================

async fn apply_update(
    state: &Arc<AppState>,
    user: &CurrentUser,
    id: i32,
    payload: DestinationPayload,
) -> Result<Json<ApiResponse<DestinationDetailDto>>, ApiError> {
    let changes = DestinationChanges {
        name: reject_blank("name", payload.name)?,
        description: payload.description,
        country: reject_blank("country", payload.country)?,
        city: reject_blank("city", payload.city)?,
        rating: payload.rating.map(validate_rating).transpose()?,
        tags: payload
            .tags
            .map(|labels| label_names("tag", labels))
            .transpose()?,
        features: payload
            .features
            .map(|labels| label_names("feature", labels))
            .transpose()?,
    };

    let model = state
        .store()
        .update_destination(user.id, id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Destination", id))?;

    let dto = detail_dto(state, model).await?;
    Ok(Json(ApiResponse::success(dto)))
}

async fn detail_dto(
    state: &Arc<AppState>,
    model: destinations::Model,
) -> Result<DestinationDetailDto, ApiError> {
    let tags = state.store().destination_tags(model.id).await?;
    let features = state.store().destination_features(model.id).await?;
    Ok(DestinationDetailDto::from_parts(model, tags, features))
}
