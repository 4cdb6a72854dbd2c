//! 成就（徽章）模块
//!
//! - `catalog`: 徽章规则目录，规则为纯函数谓词
//! - `engine`: 规则引擎，负责拉取统计、评估规则与一次性发放
//! - `dto`: 评估报告

pub mod catalog;
pub mod dto;
pub mod engine;

pub use catalog::{BadgeRule, RuleCatalog, RuleContext, RuleFact};
pub use dto::{EvaluationReport, FailureStage, GrantOutcome, RuleFailure};
pub use engine::BadgeRuleEngine;

/// 内置徽章编码，需与 badges 表中的 code 一致
pub mod codes {
    pub const FIRST_QUIZ: &str = "first_quiz";
    pub const EXPLORATEUR: &str = "explorateur";
    pub const PERFECT: &str = "perfect";
    pub const MARATHON: &str = "marathon";
}
