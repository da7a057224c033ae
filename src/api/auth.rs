use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::db::User;

/// The authenticated account for the current request, inserted as a
/// request extension by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        }
    }
}

/// Resolve the request's token to a user before any handler runs. Every
/// protected route sees either a `CurrentUser` extension or a 401.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let Some(key) = extract_token(&headers) else {
        return Err(ApiError::unauthorized(
            "Authentication credentials were not provided",
        ));
    };

    let user = state
        .store()
        .resolve_token(&key)
        .await
        .map_err(|e| ApiError::internal(format!("Token lookup failed: {e}")))?;

    let Some(user) = user else {
        return Err(ApiError::unauthorized("Invalid token"));
    };

    tracing::Span::current().record("user_id", user.id);

    request.extensions_mut().insert(CurrentUser::from(user));
    Ok(next.run(request).await)
}

/// Accepts `Authorization: Bearer <key>` and the legacy `Token <key>` form.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get("Authorization")?.to_str().ok()?;

    if let Some(key) = auth_header.strip_prefix("Bearer ") {
        return Some(key.trim().to_string());
    }

    if let Some(key) = auth_header.strip_prefix("Token ") {
        return Some(key.trim().to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_and_token_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc123"));

        headers.insert("Authorization", HeaderValue::from_static("Token abc123"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        let headers = HeaderMap::new();
        assert!(extract_token(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic abc123"));
        assert!(extract_token(&headers).is_none());
    }
}
