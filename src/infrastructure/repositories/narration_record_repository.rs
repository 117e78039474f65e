use crate::error::{AppError, AppResult};
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use std::sync::Arc;

/// Where finished narrations are attached to their topic.
#[async_trait]
pub trait NarrationRecordRepository: Send + Sync {
    /// Point the topic at its narration. Re-running overwrites the previous URL.
    async fn attach_narration(&self, topic_id: i64, audio_url: &str) -> AppResult<()>;
}

pub struct PgNarrationRecordRepository {
    pool: Arc<DbPool>,
}

impl PgNarrationRecordRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NarrationRecordRepository for PgNarrationRecordRepository {
    async fn attach_narration(&self, topic_id: i64, audio_url: &str) -> AppResult<()> {
        let pool = self.pool.as_ref();

        let result = sqlx::query(
            r#"
            UPDATE topics
            SET narration_url = $1, updated_at = now()
            WHERE id = $2
            "#,
        )
        .bind(audio_url)
        .bind(topic_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Topic {} not found", topic_id)));
        }

        Ok(())
    }
}
