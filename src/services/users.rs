//! Authentication and user management service

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, Permission, User, UserClaims},
    repository::CatalogStore,
};

#[derive(Clone)]
pub struct UsersService {
    store: Arc<dyn CatalogStore>,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(store: Arc<dyn CatalogStore>, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Authenticate by username and password, returning a JWT and the user
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        tracing::info!("User {} logged in", user.username);
        Ok((token, user))
    }

    /// Issue a token carrying the user's permissions
    pub fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            permissions: user.permissions.clone(),
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Decode a bearer token
    pub fn verify_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.store.get_user(id).await
    }

    /// Create a user. `Conflict` when the username is taken.
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        user.validate()?;
        let hash = self.hash_password(&user.password)?;
        let created = self.store.create_user(&user, &hash).await?;
        tracing::info!("User {} created", created.username);
        Ok(created)
    }

    /// Create the configured administrator, holding every permission, unless
    /// it already exists or no credentials are configured
    pub async fn ensure_admin(&self) -> AppResult<Option<User>> {
        let (Some(username), Some(password)) = (
            self.config.admin_username.as_deref(),
            self.config.admin_password.as_deref(),
        ) else {
            return Ok(None);
        };

        if self.store.find_user_by_username(username).await?.is_some() {
            tracing::debug!("Administrator {} already exists", username);
            return Ok(None);
        }

        let admin = self
            .create_user(CreateUser {
                username: username.to_string(),
                password: password.to_string(),
                first_name: None,
                last_name: None,
                email: None,
                permissions: Permission::ALL.to_vec(),
            })
            .await?;
        Ok(Some(admin))
    }
}
