//! 游戏记录仓储
//!
//! 游戏记录只追加：提供计数、历史查询与新增，不提供更新和删除

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::traits::{PlayRecordRepositoryTrait, PlayRecordWriterTrait};
use crate::error::Result;
use crate::models::{NewPlayRecord, PlayHistoryEntry, PlayRecord, ThemePlayCount};

/// 游戏记录仓储
pub struct PlayRecordRepository {
    pool: PgPool,
}

impl PlayRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 统计 ====================

    /// 用户的游戏总局数
    pub async fn count_plays(&self, user_id: i64) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM play_records WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// 用户玩过的不同主题数
    pub async fn count_distinct_themes(&self, user_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT theme_id) FROM play_records WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// 时间区间 `[start, end)` 内的游戏局数
    pub async fn count_plays_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM play_records
            WHERE user_id = $1 AND played_at >= $2 AND played_at < $3
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    // ==================== 查询 ====================

    /// 游戏历史，关联主题标题与表情
    pub async fn list_history(&self, user_id: i64) -> Result<Vec<PlayHistoryEntry>> {
        let entries = sqlx::query_as::<_, PlayHistoryEntry>(
            r#"
            SELECT p.id, p.theme_id, t.title AS theme_title, t.emoji AS theme_emoji,
                   p.score, p.total_questions, p.elapsed_seconds, p.played_at
            FROM play_records p
            LEFT JOIN quiz_themes t ON t.id = p.theme_id
            WHERE p.user_id = $1
            ORDER BY p.played_at DESC, p.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// 最常玩的主题
    pub async fn favorite_theme(&self, user_id: i64) -> Result<Option<ThemePlayCount>> {
        let favorite = sqlx::query_as::<_, ThemePlayCount>(
            r#"
            SELECT t.id AS theme_id, t.code, t.title, COUNT(*) AS play_count
            FROM play_records p
            JOIN quiz_themes t ON t.id = p.theme_id
            WHERE p.user_id = $1
            GROUP BY t.id, t.code, t.title
            ORDER BY play_count DESC, t.title ASC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(favorite)
    }

    /// 最近一局游戏
    pub async fn latest_play(&self, user_id: i64) -> Result<Option<PlayRecord>> {
        let play = sqlx::query_as::<_, PlayRecord>(
            r#"
            SELECT id, user_id, theme_id, score, total_questions, elapsed_seconds, played_at
            FROM play_records
            WHERE user_id = $1
            ORDER BY played_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(play)
    }

    // ==================== 写入 ====================

    /// 写入一局游戏记录，返回持久化后的记录
    pub async fn insert_play(&self, record: &NewPlayRecord) -> Result<PlayRecord> {
        let play = sqlx::query_as::<_, PlayRecord>(
            r#"
            INSERT INTO play_records (user_id, theme_id, score, total_questions, elapsed_seconds, played_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, theme_id, score, total_questions, elapsed_seconds, played_at
            "#,
        )
        .bind(record.user_id)
        .bind(record.theme_id)
        .bind(record.score)
        .bind(record.total_questions)
        .bind(record.elapsed_seconds)
        .bind(record.played_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(play)
    }
}

#[async_trait]
impl PlayRecordRepositoryTrait for PlayRecordRepository {
    async fn count_plays(&self, user_id: i64) -> Result<i64> {
        self.count_plays(user_id).await
    }

    async fn count_distinct_themes(&self, user_id: i64) -> Result<i64> {
        self.count_distinct_themes(user_id).await
    }

    async fn count_plays_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64> {
        self.count_plays_between(user_id, start, end).await
    }

    async fn list_history(&self, user_id: i64) -> Result<Vec<PlayHistoryEntry>> {
        self.list_history(user_id).await
    }

    async fn favorite_theme(&self, user_id: i64) -> Result<Option<ThemePlayCount>> {
        self.favorite_theme(user_id).await
    }

    async fn latest_play(&self, user_id: i64) -> Result<Option<PlayRecord>> {
        self.latest_play(user_id).await
    }
}

#[async_trait]
impl PlayRecordWriterTrait for PlayRecordRepository {
    async fn insert_play(&self, record: &NewPlayRecord) -> Result<PlayRecord> {
        self.insert_play(record).await
    }
}
