//! 徽章规则引擎
//!
//! 每提交一局游戏后运行一次：拉取规则依赖的统计项，逐条评估规则，
//! 对成立的规则执行“查询已发放 → 写入”的一次性发放。
//!
//! 规则之间相互隔离：某条规则的统计或写入失败只记录在报告中，
//! 不影响其他规则，也不回滚本轮已写入的发放记录。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local, TimeZone, Utc};
use quiz_shared::observability::metrics::{
    record_badge_evaluation, record_badge_grant, record_rule_failure,
};
use tracing::{debug, info, instrument, warn};

use super::catalog::{BadgeRule, RuleCatalog, RuleContext, RuleFact};
use super::dto::{EvaluationReport, FailureStage, GrantOutcome};
use crate::error::Result;
use crate::repository::{BadgeGrantWriterTrait, BadgeRepositoryTrait};
use crate::service::HistoryAggregator;
use crate::service::history::day_bounds;

/// 徽章规则引擎
pub struct BadgeRuleEngine {
    catalog: Arc<RuleCatalog>,
    history: Arc<HistoryAggregator>,
    badges: Arc<dyn BadgeRepositoryTrait>,
    grants: Arc<dyn BadgeGrantWriterTrait>,
}

impl BadgeRuleEngine {
    pub fn new(
        catalog: Arc<RuleCatalog>,
        history: Arc<HistoryAggregator>,
        badges: Arc<dyn BadgeRepositoryTrait>,
        grants: Arc<dyn BadgeGrantWriterTrait>,
    ) -> Self {
        Self {
            catalog,
            history,
            badges,
            grants,
        }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// 以当前时间评估并发放徽章
    pub async fn evaluate_and_grant(
        &self,
        user_id: i64,
        score: i32,
        total_questions: i32,
    ) -> EvaluationReport {
        self.evaluate_and_grant_at(user_id, score, total_questions, Local::now())
            .await
    }

    /// 以指定时间评估并发放徽章
    ///
    /// `now` 的时区决定“当天”的边界，同时作为发放时间写入
    #[instrument(skip(self, now), fields(rule_count = self.catalog.len()))]
    pub async fn evaluate_and_grant_at<Tz: TimeZone>(
        &self,
        user_id: i64,
        score: i32,
        total_questions: i32,
        now: DateTime<Tz>,
    ) -> EvaluationReport {
        let started = Instant::now();
        let today = day_bounds(&now);
        let granted_at = now.with_timezone(&Utc);

        let mut report = EvaluationReport::new(user_id);
        let (ctx, fact_errors) = self
            .build_context(user_id, score, total_questions, today)
            .await;

        for rule in self.catalog.iter() {
            let code = rule.code();

            let missing = rule
                .requires()
                .iter()
                .find_map(|fact| fact_errors.get(fact).map(|msg| (fact, msg)));
            if let Some((fact, msg)) = missing {
                record_rule_failure(code);
                report.record_failure(code, FailureStage::Fact, format!("{}: {}", fact, msg));
                continue;
            }

            if !rule.is_satisfied(&ctx) {
                continue;
            }

            match self.grant_once(user_id, rule, granted_at).await {
                Ok(outcome) => {
                    record_badge_grant(code, outcome.as_str());
                    report.record(code, outcome);
                }
                Err(e) => {
                    warn!(user_id = user_id, badge_code = code, error = %e, "徽章发放失败");
                    record_rule_failure(code);
                    report.record_failure(code, FailureStage::Grant, e.to_string());
                }
            }
        }

        record_badge_evaluation(report.granted.len(), started.elapsed().as_secs_f64());
        info!(
            user_id = user_id,
            granted = ?report.granted,
            failures = report.failures.len(),
            "徽章评估完成"
        );

        report
    }

    /// 按用户最近一局已保存的游戏重新评估
    ///
    /// 得分与题数取自游戏记录，用于补发漏掉的徽章；没有游戏记录时返回 None
    pub async fn reevaluate_latest(&self, user_id: i64) -> Result<Option<EvaluationReport>> {
        self.reevaluate_latest_at(user_id, Local::now()).await
    }

    /// 以指定时间按最近一局重新评估
    pub async fn reevaluate_latest_at<Tz: TimeZone>(
        &self,
        user_id: i64,
        now: DateTime<Tz>,
    ) -> Result<Option<EvaluationReport>> {
        let Some(play) = self.history.latest_play(user_id).await? else {
            debug!(user_id = user_id, "用户没有游戏记录，跳过评估");
            return Ok(None);
        };

        let report = self
            .evaluate_and_grant_at(user_id, play.score, play.total_questions, now)
            .await;
        Ok(Some(report))
    }

    /// 统一拉取目录依赖的统计项，每项只查询一次
    async fn build_context(
        &self,
        user_id: i64,
        score: i32,
        total_questions: i32,
        today: (DateTime<Utc>, DateTime<Utc>),
    ) -> (RuleContext, HashMap<RuleFact, String>) {
        let mut ctx = RuleContext::new(user_id, score, total_questions);
        let mut errors = HashMap::new();

        for fact in self.catalog.required_facts() {
            match self.load_fact(fact, user_id, today).await {
                Ok(value) => ctx.insert_fact(fact, value),
                Err(e) => {
                    warn!(user_id = user_id, fact = %fact, error = %e, "统计项读取失败");
                    errors.insert(fact, e.to_string());
                }
            }
        }

        (ctx, errors)
    }

    async fn load_fact(
        &self,
        fact: RuleFact,
        user_id: i64,
        (day_start, day_end): (DateTime<Utc>, DateTime<Utc>),
    ) -> Result<i64> {
        match fact {
            RuleFact::PlayCount => self.history.count_plays(user_id).await,
            RuleFact::DistinctThemesPlayed => {
                self.history.count_distinct_themes_played(user_id).await
            }
            RuleFact::ActiveThemes => self.history.count_active_themes().await,
            RuleFact::PlaysToday => {
                self.history
                    .count_plays_between(user_id, day_start, day_end)
                    .await
            }
        }
    }

    /// 一次性发放
    ///
    /// 写入前先查询是否已发放；并发写入由 (user_id, badge_id) 唯一约束兜底，
    /// 落败的一方视为已持有
    async fn grant_once(
        &self,
        user_id: i64,
        rule: &BadgeRule,
        granted_at: DateTime<Utc>,
    ) -> Result<GrantOutcome> {
        let code = rule.code();
        let Some(badge) = self.badges.get_badge_by_code(code).await? else {
            debug!(badge_code = code, "徽章未在目录中配置，跳过");
            return Ok(GrantOutcome::NotConfigured);
        };

        if self.badges.has_grant(user_id, badge.id).await? {
            return Ok(GrantOutcome::AlreadyHeld);
        }

        if self.grants.insert_grant(user_id, badge.id, granted_at).await? {
            info!(
                user_id = user_id,
                badge_code = code,
                badge_id = badge.id,
                rule = rule.description(),
                "徽章发放成功"
            );
            Ok(GrantOutcome::Granted)
        } else {
            debug!(user_id = user_id, badge_code = code, "并发请求已先写入");
            Ok(GrantOutcome::AlreadyHeld)
        }
    }
}
