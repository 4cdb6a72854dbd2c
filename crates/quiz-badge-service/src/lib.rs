//! 音乐测验成就引擎
//!
//! 每局测验结束后评估并发放徽章，同时为结果页、历史页和个人主页提供只读统计。
//!
//! ## 核心功能
//!
//! - **徽章规则引擎**：按规则目录评估 first_quiz / explorateur / perfect / marathon，
//!   每个徽章每个用户最多发放一次
//! - **历史统计**：总局数、玩过的主题数、当日局数、最常玩主题等
//! - **等级划分**：将得分映射到结果页的等级
//! - **游戏提交**：保存游戏记录后触发徽章评估
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `repository`: 数据库仓储层
//! - `achievement`: 徽章规则目录与引擎
//! - `service`: 历史统计、等级划分与提交服务
//! - `app`: 服务装配
//! - `cli`: 命令行接口

pub mod achievement;
pub mod app;
pub mod cli;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;

pub use achievement::{BadgeRuleEngine, EvaluationReport, GrantOutcome, RuleCatalog};
pub use app::{QuizServices, Repositories};
pub use error::{QuizError, Result};
pub use models::*;
pub use repository::{BadgeRepository, PlayRecordRepository, ThemeRepository, UserRepository};
pub use service::{HistoryAggregator, LevelClassifier, PlaySubmissionService, dto};
