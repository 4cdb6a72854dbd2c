//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试。
//! 读写接口分离：展示层只拿到只读接口，写接口仅注入给提交流程和徽章引擎。

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{
    BadgeDefinition, GrantedBadgeView, NewPlayRecord, PlayHistoryEntry, PlayRecord, QuizTheme,
    ThemePlayCount, User,
};

/// 用户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn get_user(&self, id: i64) -> Result<Option<User>>;
}

/// 测验主题仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ThemeRepositoryTrait: Send + Sync {
    async fn get_theme_by_code(&self, code: &str) -> Result<Option<QuizTheme>>;
    async fn count_active_themes(&self) -> Result<i64>;
}

/// 游戏记录只读接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayRecordRepositoryTrait: Send + Sync {
    async fn count_plays(&self, user_id: i64) -> Result<i64>;
    async fn count_distinct_themes(&self, user_id: i64) -> Result<i64>;
    /// 统计 `[start, end)` 区间内的游戏局数
    async fn count_plays_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64>;
    /// 按时间倒序列出游戏历史
    async fn list_history(&self, user_id: i64) -> Result<Vec<PlayHistoryEntry>>;
    /// 最常玩的主题，局数相同时按主题标题升序
    async fn favorite_theme(&self, user_id: i64) -> Result<Option<ThemePlayCount>>;
    /// 最近一局已保存的游戏
    async fn latest_play(&self, user_id: i64) -> Result<Option<PlayRecord>>;
}

/// 游戏记录写接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayRecordWriterTrait: Send + Sync {
    async fn insert_play(&self, record: &NewPlayRecord) -> Result<PlayRecord>;
}

/// 徽章只读接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeRepositoryTrait: Send + Sync {
    async fn get_badge_by_code(&self, code: &str) -> Result<Option<BadgeDefinition>>;
    async fn has_grant(&self, user_id: i64, badge_id: i64) -> Result<bool>;
    /// 按获得时间倒序列出用户徽章
    async fn list_user_badges(&self, user_id: i64) -> Result<Vec<GrantedBadgeView>>;
}

/// 徽章发放写接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeGrantWriterTrait: Send + Sync {
    /// 写入发放记录
    ///
    /// 返回 false 表示 (user_id, badge_id) 已存在，本次未写入
    async fn insert_grant(
        &self,
        user_id: i64,
        badge_id: i64,
        granted_at: DateTime<Utc>,
    ) -> Result<bool>;
}
