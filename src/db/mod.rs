use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::entities::{destinations, features, tags};

pub mod migrator;
pub mod repositories;

pub use repositories::destination::{DestinationChanges, DestinationFilter, NewDestination};
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    fn destination_repo(&self) -> repositories::destination::DestinationRepository {
        repositories::destination::DestinationRepository::new(self.conn.clone())
    }

    fn tag_repo(&self) -> repositories::tag::TagRepository {
        repositories::tag::TagRepository::new(self.conn.clone())
    }

    fn feature_repo(&self) -> repositories::feature::FeatureRepository {
        repositories::feature::FeatureRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        is_staff: bool,
        is_superuser: bool,
    ) -> Result<User> {
        self.user_repo()
            .create(email, name, password_hash, is_staff, is_superuser)
            .await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn email_taken(&self, email: &str) -> Result<bool> {
        self.user_repo().email_taken(email).await
    }

    pub async fn verify_user_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn update_user(
        &self,
        id: i32,
        email: Option<String>,
        name: Option<String>,
        password_hash: Option<String>,
    ) -> Result<User> {
        self.user_repo().update(id, email, name, password_hash).await
    }

    // ========== Tokens ==========

    pub async fn get_or_create_token(&self, user_id: i32) -> Result<String> {
        self.token_repo().get_or_create(user_id).await
    }

    pub async fn resolve_token(&self, key: &str) -> Result<Option<User>> {
        self.token_repo().resolve(key).await
    }

    // ========== Destinations ==========

    pub async fn list_destinations(
        &self,
        user_id: i32,
        filter: &DestinationFilter,
    ) -> Result<Vec<destinations::Model>> {
        self.destination_repo().list(user_id, filter).await
    }

    pub async fn get_destination(
        &self,
        user_id: i32,
        id: i32,
    ) -> Result<Option<destinations::Model>> {
        self.destination_repo().get(user_id, id).await
    }

    pub async fn create_destination(
        &self,
        user_id: i32,
        data: NewDestination,
    ) -> Result<destinations::Model> {
        self.destination_repo().create(user_id, data).await
    }

    pub async fn update_destination(
        &self,
        user_id: i32,
        id: i32,
        changes: DestinationChanges,
    ) -> Result<Option<destinations::Model>> {
        self.destination_repo().update(user_id, id, changes).await
    }

    pub async fn remove_destination(&self, user_id: i32, id: i32) -> Result<bool> {
        self.destination_repo().remove(user_id, id).await
    }

    pub async fn set_destination_image(
        &self,
        user_id: i32,
        id: i32,
        filename: &str,
    ) -> Result<Option<destinations::Model>> {
        self.destination_repo().set_image(user_id, id, filename).await
    }

    pub async fn destination_tags(&self, destination_id: i32) -> Result<Vec<tags::Model>> {
        self.destination_repo().tags_for(destination_id).await
    }

    pub async fn destination_features(&self, destination_id: i32) -> Result<Vec<features::Model>> {
        self.destination_repo().features_for(destination_id).await
    }

    pub async fn destination_tags_for_many(
        &self,
        ids: &[i32],
    ) -> Result<HashMap<i32, Vec<tags::Model>>> {
        self.destination_repo().tags_for_many(ids).await
    }

    pub async fn destination_features_for_many(
        &self,
        ids: &[i32],
    ) -> Result<HashMap<i32, Vec<features::Model>>> {
        self.destination_repo().features_for_many(ids).await
    }

    // ========== Tags ==========

    pub async fn list_tags(&self, user_id: i32, attached_only: bool) -> Result<Vec<tags::Model>> {
        self.tag_repo().list(user_id, attached_only).await
    }

    pub async fn get_tag(&self, user_id: i32, id: i32) -> Result<Option<tags::Model>> {
        self.tag_repo().get(user_id, id).await
    }

    pub async fn tag_name_taken(
        &self,
        user_id: i32,
        name: &str,
        exclude_id: i32,
    ) -> Result<bool> {
        self.tag_repo().name_taken(user_id, name, exclude_id).await
    }

    pub async fn rename_tag(
        &self,
        user_id: i32,
        id: i32,
        name: &str,
    ) -> Result<Option<tags::Model>> {
        self.tag_repo().rename(user_id, id, name).await
    }

    pub async fn remove_tag(&self, user_id: i32, id: i32) -> Result<bool> {
        self.tag_repo().remove(user_id, id).await
    }

    // ========== Features ==========

    pub async fn list_features(
        &self,
        user_id: i32,
        attached_only: bool,
    ) -> Result<Vec<features::Model>> {
        self.feature_repo().list(user_id, attached_only).await
    }

    pub async fn get_feature(&self, user_id: i32, id: i32) -> Result<Option<features::Model>> {
        self.feature_repo().get(user_id, id).await
    }

    pub async fn feature_name_taken(
        &self,
        user_id: i32,
        name: &str,
        exclude_id: i32,
    ) -> Result<bool> {
        self.feature_repo()
            .name_taken(user_id, name, exclude_id)
            .await
    }

    pub async fn rename_feature(
        &self,
        user_id: i32,
        id: i32,
        name: &str,
    ) -> Result<Option<features::Model>> {
        self.feature_repo().rename(user_id, id, name).await
    }

    pub async fn remove_feature(&self, user_id: i32, id: i32) -> Result<bool> {
        self.feature_repo().remove(user_id, id).await
    }
}
