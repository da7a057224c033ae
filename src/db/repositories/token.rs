use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::prelude::*;
use crate::entities::{auth_tokens, users};

use super::user::User;

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Return the user's token key, issuing one if none exists yet.
    /// Logging in twice yields the same key.
    pub async fn get_or_create(&self, user_id: i32) -> Result<String> {
        let existing = AuthTokens::find()
            .filter(auth_tokens::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query auth token")?;

        if let Some(token) = existing {
            return Ok(token.key);
        }

        let key = generate_token_key();
        let now = chrono::Utc::now().to_rfc3339();

        AuthTokens::insert(auth_tokens::ActiveModel {
            user_id: Set(user_id),
            key: Set(key.clone()),
            created_at: Set(now),
            ..Default::default()
        })
        .exec(&self.conn)
        .await
        .context("Failed to insert auth token")?;

        Ok(key)
    }

    /// Resolve a token key to its owning user. Unknown keys and inactive
    /// accounts both come back as None.
    pub async fn resolve(&self, key: &str) -> Result<Option<User>> {
        let found = AuthTokens::find()
            .filter(auth_tokens::Column::Key.eq(key))
            .find_also_related(Users)
            .one(&self.conn)
            .await
            .context("Failed to resolve auth token")?;

        let user = found
            .and_then(|(_, user)| user)
            .filter(|user: &users::Model| user.is_active);

        Ok(user.map(User::from))
    }
}

/// Generate a random token key (40 character hex string)
#[must_use]
pub fn generate_token_key() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 20] = rng.random();

    bytes.iter().fold(String::with_capacity(40), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
