//! 服务层
//!
//! ## 模块结构
//!
//! - `dto`: 数据传输对象定义
//! - `history`: 历史统计（只读）
//! - `level`: 等级划分（纯函数）
//! - `submission`: 游戏提交流程，触发徽章引擎

pub mod dto;
pub mod history;
pub mod level;
pub mod submission;

pub use dto::*;
pub use history::HistoryAggregator;
pub use level::{LevelClassifier, ResultSummary, Tier, TierLevel};
pub use submission::PlaySubmissionService;
