//! 数据传输对象
//!
//! 定义服务层的请求和响应结构，与展示层解耦

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::achievement::EvaluationReport;
use crate::models::{GrantedBadgeView, PlayRecord, ThemeDisplay, ThemePlayCount, User};
use crate::service::level::ResultSummary;

// ==================== 历史 ====================

/// 单局表现档位，按正确率划分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    /// ≥ 80%
    Excellent,
    /// ≥ 60%
    Good,
    /// ≥ 40%
    Fair,
    Poor,
}

impl PerformanceBand {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            80.. => Self::Excellent,
            60..=79 => Self::Good,
            40..=59 => Self::Fair,
            _ => Self::Poor,
        }
    }

    /// 展示层使用的颜色 token
    pub fn color(&self) -> &'static str {
        match self {
            Self::Excellent => "text-green-600 bg-green-50",
            Self::Good => "text-blue-600 bg-blue-50",
            Self::Fair => "text-orange-600 bg-orange-50",
            Self::Poor => "text-red-600 bg-red-50",
        }
    }
}

/// 历史页的一行
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryView {
    pub play_id: i64,
    pub theme_title: String,
    pub theme_emoji: String,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: u32,
    pub band: PerformanceBand,
    /// 形如 "2min 5s"，耗时为 0 时为空
    pub elapsed: Option<String>,
    pub played_at: DateTime<Utc>,
}

/// 历史汇总统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_plays: usize,
    /// 原始得分之和
    pub total_points: i64,
    /// 原始得分均值，保留一位小数
    pub average_score: f64,
    /// 单局最高正确率
    pub best_performance: u32,
}

/// 历史页数据
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub stats: HistoryStats,
    pub entries: Vec<HistoryEntryView>,
}

// ==================== 个人主页 ====================

/// 个人主页统计
///
/// 任一统计读取失败时使用中性占位值（0、空、空列表）
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub user_id: i64,
    /// 用户资料（昵称、邮箱、注册时间），未接入用户仓储或读取失败时为空
    pub user: Option<User>,
    pub play_count: i64,
    pub favorite_theme: Option<ThemePlayCount>,
    pub badges: Vec<GrantedBadgeView>,
}

// ==================== 提交 ====================

/// 提交一局已完成的测验
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPlayRequest {
    pub user_id: i64,
    pub theme_code: String,
    pub score: i32,
    pub total_questions: i32,
    #[serde(default)]
    pub elapsed_seconds: i32,
}

/// 提交结果：持久化的记录、结果页数据与本次徽章评估报告
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub play: PlayRecord,
    pub theme: ThemeDisplay,
    pub result: ResultSummary,
    pub badges: EvaluationReport,
}
