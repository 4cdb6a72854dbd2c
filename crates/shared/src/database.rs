//! 测验库连接
//!
//! PostgreSQL 连接池、嵌入式迁移，以及启动时的徽章目录种子检查。

use std::collections::HashSet;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, instrument, warn};

use crate::config::DatabaseConfig;
use crate::error::Result;

/// 测验库连接池
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 建立连接池
    #[instrument(skip(config), fields(max_connections = config.max_connections))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await?;

        info!("测验库连接池已就绪");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("测验库连接池已关闭");
    }

    /// 执行 migrations/ 下嵌入的迁移，返回本次新应用的版本号
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<Vec<i64>> {
        let migrator = sqlx::migrate!("../../migrations");
        let before = self.applied_versions().await?;

        migrator.run(&self.pool).await?;

        let applied: Vec<i64> = migrator
            .iter()
            .filter(|m| !m.migration_type.is_down_migration())
            .map(|m| m.version)
            .filter(|v| !before.contains(v))
            .collect();
        info!(applied = ?applied, already = before.len(), "迁移完成");
        Ok(applied)
    }

    /// 已成功执行的迁移版本，迁移表不存在时为空
    async fn applied_versions(&self) -> Result<HashSet<i64>> {
        let exists: bool =
            sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Ok(HashSet::new());
        }

        let versions: Vec<i64> =
            sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success")
                .fetch_all(&self.pool)
                .await?;
        Ok(versions.into_iter().collect())
    }

    /// 检查徽章目录，返回规则需要但 badges 表中缺失的编码
    ///
    /// 缺失的徽章在评估时会被跳过，这里只在启动时提前告警
    pub async fn missing_badge_codes(&self, codes: &[&str]) -> Result<Vec<String>> {
        let wanted: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
        let present: Vec<String> =
            sqlx::query_scalar("SELECT code FROM badges WHERE code = ANY($1)")
                .bind(wanted)
                .fetch_all(&self.pool)
                .await?;

        let missing = missing_codes(codes, &present);
        if !missing.is_empty() {
            warn!(missing = ?missing, "徽章目录缺少规则对应的徽章定义");
        }
        Ok(missing)
    }
}

/// 按 `wanted` 的顺序列出不在 `present` 中的编码
fn missing_codes(wanted: &[&str], present: &[String]) -> Vec<String> {
    let present: HashSet<&str> = present.iter().map(String::as_str).collect();
    wanted
        .iter()
        .filter(|code| !present.contains(**code))
        .map(|code| code.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: [&str; 4] = ["first_quiz", "explorateur", "perfect", "marathon"];

    #[test]
    fn test_missing_codes_keeps_catalog_order() {
        let present = vec!["perfect".to_string(), "first_quiz".to_string()];
        assert_eq!(
            missing_codes(&CATALOG, &present),
            vec!["explorateur", "marathon"]
        );
    }

    #[test]
    fn test_missing_codes_complete_catalog() {
        let present: Vec<String> = CATALOG.iter().map(|c| c.to_string()).collect();
        assert!(missing_codes(&CATALOG, &present).is_empty());
        assert_eq!(missing_codes(&CATALOG, &[]).len(), 4);
    }

    #[tokio::test]
    #[ignore = "需要 PostgreSQL 数据库连接"]
    async fn test_migrations_seed_catalog() {
        let config = DatabaseConfig {
            url: std::env::var("DATABASE_URL").unwrap_or_else(|_| DatabaseConfig::default().url),
            ..Default::default()
        };
        let db = Database::connect(&config).await.unwrap();
        db.run_migrations().await.unwrap();

        // 再次执行时没有新的迁移
        assert!(db.run_migrations().await.unwrap().is_empty());
        assert!(db.missing_badge_codes(&CATALOG).await.unwrap().is_empty());
        db.close().await;
    }
}
