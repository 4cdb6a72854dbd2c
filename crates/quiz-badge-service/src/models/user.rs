//! 用户实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 用户
///
/// 由资料编辑流程维护，徽章引擎只读引用
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub display_name: String,
    pub email: String,
    #[sqlx(default)]
    pub created_at: Option<DateTime<Utc>>,
}
