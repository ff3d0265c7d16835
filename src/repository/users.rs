//! Users repository

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, User, UserRow},
};

use super::{Repository, UserStore};

const USER_COLUMNS: &str = "id, username, password, first_name, last_name, email, permissions";

#[async_trait]
impl UserStore for Repository {
    async fn get_user(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::from)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn create_user(&self, user: &CreateUser, password_hash: &str) -> AppResult<User> {
        let permissions: Vec<String> = user
            .permissions
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (username, password, first_name, last_name, email, permissions)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (username) DO NOTHING
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&permissions)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Username '{}' already exists", user.username)))?;

        Ok(row.into())
    }
}
