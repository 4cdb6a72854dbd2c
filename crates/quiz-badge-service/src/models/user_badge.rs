//! 用户徽章实体
//!
//! 记录用户获得某徽章的事实，只追加，不更新也不删除

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::badge::DEFAULT_BADGE_ICON;

/// 用户徽章（发放记录）
///
/// 数据库对 (user_id, badge_id) 有唯一约束，同一徽章最多发放一次
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserBadge {
    pub id: i64,
    pub user_id: i64,
    pub badge_id: i64,
    /// 获得时间
    pub granted_at: DateTime<Utc>,
}

/// 个人主页展示的已获得徽章
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GrantedBadgeView {
    pub code: String,
    pub title: String,
    pub description: String,
    #[sqlx(default)]
    pub icon: Option<String>,
    pub granted_at: DateTime<Utc>,
}

impl GrantedBadgeView {
    pub fn display_icon(&self) -> &str {
        self.icon.as_deref().unwrap_or(DEFAULT_BADGE_ICON)
    }
}
