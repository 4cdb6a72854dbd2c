//! 游戏记录实体
//!
//! 每完成一局测验生成一条记录，写入后不可变

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 游戏记录
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlayRecord {
    pub id: i64,
    pub user_id: i64,
    pub theme_id: i64,
    pub score: i32,
    pub total_questions: i32,
    pub elapsed_seconds: i32,
    pub played_at: DateTime<Utc>,
}

/// 待写入的游戏记录
///
/// 构造时将分数、题数与耗时截断为非负值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayRecord {
    pub user_id: i64,
    pub theme_id: i64,
    pub score: i32,
    pub total_questions: i32,
    pub elapsed_seconds: i32,
    pub played_at: DateTime<Utc>,
}

impl NewPlayRecord {
    pub fn new(
        user_id: i64,
        theme_id: i64,
        score: i32,
        total_questions: i32,
        elapsed_seconds: i32,
        played_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            theme_id,
            score: score.max(0),
            total_questions: total_questions.max(0),
            elapsed_seconds: elapsed_seconds.max(0),
            played_at,
        }
    }
}

/// 历史页的一行：游戏记录关联主题信息
///
/// 主题被删除时标题和表情为空，由展示层兜底
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlayHistoryEntry {
    pub id: i64,
    pub theme_id: i64,
    #[sqlx(default)]
    pub theme_title: Option<String>,
    #[sqlx(default)]
    pub theme_emoji: Option<String>,
    pub score: i32,
    pub total_questions: i32,
    pub elapsed_seconds: i32,
    pub played_at: DateTime<Utc>,
}

/// 用户在某个主题上的游戏局数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ThemePlayCount {
    pub theme_id: i64,
    pub code: String,
    pub title: String,
    pub play_count: i64,
}
