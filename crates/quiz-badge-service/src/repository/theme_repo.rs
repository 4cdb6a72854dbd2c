//! 测验主题仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::ThemeRepositoryTrait;
use crate::error::Result;
use crate::models::QuizTheme;

/// 测验主题仓储
pub struct ThemeRepository {
    pool: PgPool,
}

impl ThemeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 按编码获取主题
    pub async fn get_theme_by_code(&self, code: &str) -> Result<Option<QuizTheme>> {
        let theme = sqlx::query_as::<_, QuizTheme>(
            r#"
            SELECT id, code, title, emoji, color, active
            FROM quiz_themes
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(theme)
    }

    /// 启用中的主题总数（全局）
    pub async fn count_active_themes(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM quiz_themes WHERE active = TRUE")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

#[async_trait]
impl ThemeRepositoryTrait for ThemeRepository {
    async fn get_theme_by_code(&self, code: &str) -> Result<Option<QuizTheme>> {
        self.get_theme_by_code(code).await
    }

    async fn count_active_themes(&self) -> Result<i64> {
        self.count_active_themes().await
    }
}
