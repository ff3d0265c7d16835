//! Session visit counters

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppResult;

use super::{Repository, SessionStore};

#[async_trait]
impl SessionStore for Repository {
    async fn record_visit(&self, session_id: Uuid) -> AppResult<i64> {
        let visits: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sessions (id, visits)
            VALUES ($1, 1)
            ON CONFLICT (id) DO UPDATE
            SET visits = sessions.visits + 1, last_seen = NOW()
            RETURNING visits
            "#,
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(visits)
    }

    async fn purge_sessions(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE last_seen < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
