//! 徽章评估结果

use serde::Serialize;

/// 单条规则的发放结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantOutcome {
    /// 本次新写入
    Granted,
    /// 之前已获得，或并发请求已先写入
    AlreadyHeld,
    /// 徽章目录中没有该编码
    NotConfigured,
}

impl GrantOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::AlreadyHeld => "already_held",
            Self::NotConfigured => "not_configured",
        }
    }
}

/// 规则失败发生的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// 拉取统计项失败
    Fact,
    /// 查询或写入发放记录失败
    Grant,
}

/// 单条规则的失败信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleFailure {
    pub code: String,
    pub stage: FailureStage,
    pub message: String,
}

/// 一次评估的完整报告
///
/// 各列表均按规则目录顺序排列
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub user_id: i64,
    /// 本次新发放的徽章编码
    pub granted: Vec<String>,
    pub already_held: Vec<String>,
    pub not_configured: Vec<String>,
    pub failures: Vec<RuleFailure>,
}

impl EvaluationReport {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }

    pub fn record(&mut self, code: &str, outcome: GrantOutcome) {
        let list = match outcome {
            GrantOutcome::Granted => &mut self.granted,
            GrantOutcome::AlreadyHeld => &mut self.already_held,
            GrantOutcome::NotConfigured => &mut self.not_configured,
        };
        list.push(code.to_string());
    }

    pub fn record_failure(&mut self, code: &str, stage: FailureStage, message: impl Into<String>) {
        self.failures.push(RuleFailure {
            code: code.to_string(),
            stage,
            message: message.into(),
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn is_granted(&self, code: &str) -> bool {
        self.granted.iter().any(|c| c == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let mut report = EvaluationReport::new(3);
        report.record("perfect", GrantOutcome::Granted);
        report.record("first_quiz", GrantOutcome::AlreadyHeld);
        report.record("marathon", GrantOutcome::NotConfigured);
        report.record_failure("explorateur", FailureStage::Fact, "timeout");

        assert!(report.is_granted("perfect"));
        assert!(!report.is_granted("first_quiz"));
        assert_eq!(report.already_held, vec!["first_quiz"]);
        assert_eq!(report.not_configured, vec!["marathon"]);
        assert!(report.has_failures());
        assert_eq!(report.failures[0].stage, FailureStage::Fact);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = EvaluationReport::new(1);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("alreadyHeld").is_some());
        assert!(json.get("notConfigured").is_some());
    }
}
