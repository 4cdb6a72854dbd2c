//! 数据库仓储层
//!
//! 提供所有实体的数据访问接口，封装 SQL 操作细节。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 使用 SQLx 进行类型安全的数据库操作
//! - 定义 trait 接口以支持 mock 测试

mod badge_repo;
mod play_repo;
mod theme_repo;
mod traits;
mod user_repo;

pub use badge_repo::BadgeRepository;
pub use play_repo::PlayRecordRepository;
pub use theme_repo::ThemeRepository;
pub use traits::*;
pub use user_repo::UserRepository;
