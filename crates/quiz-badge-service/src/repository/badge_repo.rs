//! 徽章仓储
//!
//! 提供徽章定义查询与用户徽章发放记录的数据访问

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::traits::{BadgeGrantWriterTrait, BadgeRepositoryTrait};
use crate::error::Result;
use crate::models::{BadgeDefinition, GrantedBadgeView};

/// 徽章仓储
///
/// 负责徽章目录（badges）与发放关系（user_badges）的数据访问
pub struct BadgeRepository {
    pool: PgPool,
}

impl BadgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 徽章目录 ====================

    /// 按编码获取徽章定义
    pub async fn get_badge_by_code(&self, code: &str) -> Result<Option<BadgeDefinition>> {
        let badge = sqlx::query_as::<_, BadgeDefinition>(
            r#"
            SELECT id, code, title, description, icon
            FROM badges
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(badge)
    }

    // ==================== 发放记录 ====================

    /// 用户是否已获得某徽章
    pub async fn has_grant(&self, user_id: i64, badge_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM user_badges WHERE user_id = $1 AND badge_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(badge_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// 列出用户已获得的徽章，最新获得的在前
    pub async fn list_user_badges(&self, user_id: i64) -> Result<Vec<GrantedBadgeView>> {
        let badges = sqlx::query_as::<_, GrantedBadgeView>(
            r#"
            SELECT b.code, b.title, b.description, b.icon, ub.granted_at
            FROM user_badges ub
            JOIN badges b ON b.id = ub.badge_id
            WHERE ub.user_id = $1
            ORDER BY ub.granted_at DESC, ub.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(badges)
    }

    /// 写入发放记录
    ///
    /// 依赖 (user_id, badge_id) 唯一约束，并发重复请求只有一个会写入成功
    pub async fn insert_grant(
        &self,
        user_id: i64,
        badge_id: i64,
        granted_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_badges (user_id, badge_id, granted_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, badge_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(badge_id)
        .bind(granted_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl BadgeRepositoryTrait for BadgeRepository {
    async fn get_badge_by_code(&self, code: &str) -> Result<Option<BadgeDefinition>> {
        self.get_badge_by_code(code).await
    }

    async fn has_grant(&self, user_id: i64, badge_id: i64) -> Result<bool> {
        self.has_grant(user_id, badge_id).await
    }

    async fn list_user_badges(&self, user_id: i64) -> Result<Vec<GrantedBadgeView>> {
        self.list_user_badges(user_id).await
    }
}

#[async_trait]
impl BadgeGrantWriterTrait for BadgeRepository {
    async fn insert_grant(
        &self,
        user_id: i64,
        badge_id: i64,
        granted_at: DateTime<Utc>,
    ) -> Result<bool> {
        self.insert_grant(user_id, badge_id, granted_at).await
    }
}
