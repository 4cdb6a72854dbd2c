//! 测验领域模型
//!
//! 包含用户、测验主题、游戏记录、徽章定义与用户徽章等实体定义

pub mod badge;
pub mod play;
pub mod theme;
pub mod user;
pub mod user_badge;

// 重新导出常用类型
pub use badge::BadgeDefinition;
pub use play::{NewPlayRecord, PlayHistoryEntry, PlayRecord, ThemePlayCount};
pub use theme::{QuizTheme, ThemeDisplay};
pub use user::User;
pub use user_badge::{GrantedBadgeView, UserBadge};
