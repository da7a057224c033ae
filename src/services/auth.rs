//! Domain service for accounts, credentials, and token issuance.

use thiserror::Error;
use tokio::task;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::repositories::user::hash_password;
use crate::db::{Store, User};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("A user with this email already exists")]
    EmailTaken,

    #[error("Unable to authenticate with provided credentials")]
    InvalidCredentials,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Field-wise profile changes; `None` leaves the field untouched.
#[derive(Default)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

pub struct AuthService {
    store: Store,
    security: SecurityConfig,
}

impl AuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    /// Register a regular account. The email is normalized before the
    /// uniqueness check so `user@EXAMPLE.com` and `user@example.com`
    /// collide.
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = normalize_email(email)?;
        self.check_password(password)?;

        if name.trim().is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }

        if self.store.email_taken(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.hash(password).await?;
        let user = self
            .store
            .create_user(&email, name, &password_hash, false, false)
            .await?;

        info!(user_id = user.id, "Registered new user");
        Ok(user)
    }

    /// Bootstrap an elevated account from the CLI.
    pub async fn create_superuser(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = normalize_email(email)?;
        self.check_password(password)?;

        if self.store.email_taken(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.hash(password).await?;
        let user = self
            .store
            .create_user(&email, name, &password_hash, true, true)
            .await?;

        info!(user_id = user.id, "Created superuser");
        Ok(user)
    }

    /// Verify credentials and return the user's token key, issuing one on
    /// first login. Bad credentials and unknown emails are indistinguishable.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .store
            .verify_user_password(&email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self.store.get_or_create_token(user.id).await?;
        Ok(token)
    }

    pub async fn update_profile(
        &self,
        user_id: i32,
        changes: ProfileChanges,
    ) -> Result<User, AuthError> {
        let email = match changes.email {
            Some(raw) => {
                let email = normalize_email(&raw)?;
                if let Some(other) = self.store.get_user_by_email(&email).await?
                    && other.id != user_id
                {
                    return Err(AuthError::EmailTaken);
                }
                Some(email)
            }
            None => None,
        };

        if let Some(name) = &changes.name
            && name.trim().is_empty()
        {
            return Err(AuthError::Validation("Name cannot be empty".to_string()));
        }

        let password_hash = match changes.password {
            Some(password) => {
                self.check_password(&password)?;
                Some(self.hash(&password).await?)
            }
            None => None,
        };

        let user = self
            .store
            .update_user(user_id, email, changes.name, password_hash)
            .await?;

        Ok(user)
    }

    fn check_password(&self, password: &str) -> Result<(), AuthError> {
        if password.len() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.security.min_password_length
            )));
        }
        Ok(())
    }

    /// Argon2 hashing is CPU-bound, so it runs on the blocking pool.
    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let security = self.security.clone();
        let password = password.to_string();

        task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task panicked: {e}")))?
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

/// Lowercase the domain part of an email, leaving the local part alone.
fn normalize_email(raw: &str) -> Result<String, AuthError> {
    let email = raw.trim();

    let Some((local, domain)) = email.rsplit_once('@') else {
        return Err(AuthError::Validation(
            "Enter a valid email address".to_string(),
        ));
    };

    if local.is_empty() || domain.is_empty() {
        return Err(AuthError::Validation(
            "Enter a valid email address".to_string(),
        ));
    }

    Ok(format!("{}@{}", local, domain.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_domain_only() {
        assert_eq!(
            normalize_email("Jane@EXAMPLE.COM").unwrap(),
            "Jane@example.com"
        );
    }

    #[test]
    fn normalize_trims_whitespace() {
        assert_eq!(
            normalize_email("  jane@example.com  ").unwrap(),
            "jane@example.com"
        );
    }

    #[test]
    fn normalize_rejects_missing_parts() {
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("jane@").is_err());
    }
}
