use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod destinations;
mod error;
mod features;
mod health;
mod observability;
mod tags;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

use crate::services::{AuthService, ImageService};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub auth_service: Arc<AuthService>,

    pub image_service: Arc<ImageService>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<AuthService> {
        &self.auth_service
    }

    #[must_use]
    pub fn image_service(&self) -> &Arc<ImageService> {
        &self.image_service
    }
}

pub async fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let config = shared.config.read().await.clone();

    let auth_service = Arc::new(AuthService::new(
        shared.store.clone(),
        config.security.clone(),
    ));
    let image_service = Arc::new(ImageService::new(config));

    Ok(Arc::new(AppState {
        shared,
        auth_service,
        image_service,
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared, prometheus_handle).await
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (uploads_path, cors_origins) = {
        let config = state.config().read().await;
        (
            config.general.uploads_path.clone(),
            config.server.cors_allowed_origins.clone(),
        )
    };

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/user", post(users::register))
        .route("/user/token", post(users::create_token))
        .route("/health-check", get(health::health_check))
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .nest_service("/media", tower_http::services::ServeDir::new(uploads_path))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/me", get(users::me))
        .route("/user/me", patch(users::update_me))
        .route("/destinations", get(destinations::list_destinations))
        .route("/destinations", post(destinations::create_destination))
        .route("/destinations/{id}", get(destinations::get_destination))
        .route("/destinations/{id}", put(destinations::replace_destination))
        .route(
            "/destinations/{id}",
            patch(destinations::update_destination),
        )
        .route(
            "/destinations/{id}",
            delete(destinations::delete_destination),
        )
        .route(
            "/destinations/{id}/upload-image",
            post(destinations::upload_image),
        )
        .route("/tags", get(tags::list_tags))
        .route("/tags/{id}", get(tags::get_tag))
        .route("/tags/{id}", patch(tags::update_tag))
        .route("/tags/{id}", delete(tags::delete_tag))
        .route("/features", get(features::list_features))
        .route("/features/{id}", get(features::get_feature))
        .route("/features/{id}", patch(features::update_feature))
        .route("/features/{id}", delete(features::delete_feature))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
