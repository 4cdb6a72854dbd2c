//! 徽章定义实体
//!
//! 徽章目录为只读参考数据，由迁移脚本或运营侧写入

use serde::{Deserialize, Serialize};

/// 未配置图标时展示的默认图标
pub const DEFAULT_BADGE_ICON: &str = "🏅";

/// 徽章定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BadgeDefinition {
    pub id: i64,
    /// 唯一编码，规则目录按编码引用
    pub code: String,
    pub title: String,
    pub description: String,
    #[sqlx(default)]
    pub icon: Option<String>,
}

impl BadgeDefinition {
    /// 展示用图标
    pub fn display_icon(&self) -> &str {
        self.icon.as_deref().unwrap_or(DEFAULT_BADGE_ICON)
    }
}
