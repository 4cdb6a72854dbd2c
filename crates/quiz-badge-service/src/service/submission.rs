//! 游戏提交服务
//!
//! 徽章引擎的唯一入口：先持久化游戏记录，再触发徽章评估，最后组装结果页数据。

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use quiz_shared::observability::metrics::record_play_submission;
use tracing::{info, instrument};

use crate::achievement::BadgeRuleEngine;
use crate::error::{QuizError, Result};
use crate::models::{NewPlayRecord, QuizTheme, ThemeDisplay};
use crate::repository::{PlayRecordWriterTrait, ThemeRepositoryTrait, UserRepositoryTrait};
use crate::service::dto::{SubmissionResult, SubmitPlayRequest};
use crate::service::level::LevelClassifier;

/// 游戏提交服务
pub struct PlaySubmissionService {
    plays: Arc<dyn PlayRecordWriterTrait>,
    themes: Arc<dyn ThemeRepositoryTrait>,
    users: Option<Arc<dyn UserRepositoryTrait>>,
    engine: Arc<BadgeRuleEngine>,
    classifier: LevelClassifier,
}

impl PlaySubmissionService {
    pub fn new(
        plays: Arc<dyn PlayRecordWriterTrait>,
        themes: Arc<dyn ThemeRepositoryTrait>,
        engine: Arc<BadgeRuleEngine>,
        classifier: LevelClassifier,
    ) -> Self {
        Self {
            plays,
            themes,
            users: None,
            engine,
            classifier,
        }
    }

    /// 提交前校验用户是否存在
    pub fn with_user_check(mut self, users: Arc<dyn UserRepositoryTrait>) -> Self {
        self.users = Some(users);
        self
    }

    /// 以当前时间提交
    pub async fn submit(&self, request: SubmitPlayRequest) -> Result<SubmissionResult> {
        self.submit_at(request, Local::now()).await
    }

    /// 以指定时间提交
    #[instrument(skip(self, request, now), fields(user_id = request.user_id, theme_code = %request.theme_code))]
    pub async fn submit_at<Tz: TimeZone>(
        &self,
        request: SubmitPlayRequest,
        now: DateTime<Tz>,
    ) -> Result<SubmissionResult> {
        let result = self.submit_internal(request, now).await;
        match &result {
            Ok(_) => record_play_submission("success"),
            Err(e) => record_play_submission(e.error_code()),
        }
        result
    }

    async fn submit_internal<Tz: TimeZone>(
        &self,
        request: SubmitPlayRequest,
        now: DateTime<Tz>,
    ) -> Result<SubmissionResult> {
        validate(&request)?;
        self.ensure_user(request.user_id).await?;
        let theme = self.active_theme(&request.theme_code).await?;

        let record = NewPlayRecord::new(
            request.user_id,
            theme.id,
            request.score,
            request.total_questions,
            request.elapsed_seconds,
            now.with_timezone(&Utc),
        );
        let play = self.plays.insert_play(&record).await?;

        info!(
            play_id = play.id,
            score = play.score,
            total_questions = play.total_questions,
            "游戏记录已保存"
        );

        let badges = self
            .engine
            .evaluate_and_grant_at(play.user_id, play.score, play.total_questions, now)
            .await;

        Ok(SubmissionResult {
            result: self
                .classifier
                .result_summary(play.score, play.total_questions),
            theme: ThemeDisplay::from_theme(&theme),
            play,
            badges,
        })
    }

    async fn ensure_user(&self, user_id: i64) -> Result<()> {
        let Some(users) = &self.users else {
            return Ok(());
        };
        match users.get_user(user_id).await? {
            Some(_) => Ok(()),
            None => Err(QuizError::UserNotFound(user_id)),
        }
    }

    async fn active_theme(&self, code: &str) -> Result<QuizTheme> {
        let theme = self
            .themes
            .get_theme_by_code(code)
            .await?
            .ok_or_else(|| QuizError::ThemeNotFound(code.to_string()))?;

        if !theme.active {
            return Err(QuizError::ThemeInactive(code.to_string()));
        }
        Ok(theme)
    }
}

fn validate(request: &SubmitPlayRequest) -> Result<()> {
    if request.user_id <= 0 {
        return Err(QuizError::Validation(format!(
            "user_id 必须为正数: {}",
            request.user_id
        )));
    }
    if request.theme_code.trim().is_empty() {
        return Err(QuizError::Validation("theme_code 不能为空".to_string()));
    }
    Ok(())
}
