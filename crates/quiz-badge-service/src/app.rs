//! 服务装配
//!
//! 把仓储接口组装成提交服务、历史统计与徽章引擎。
//! 规则目录与等级表在这里构建一次，之后只读共享。

use std::sync::Arc;

use quiz_shared::config::QuizConfig;
use sqlx::PgPool;
use tracing::info;

use crate::achievement::{BadgeRuleEngine, RuleCatalog};
use crate::repository::{
    BadgeGrantWriterTrait, BadgeRepository, BadgeRepositoryTrait, PlayRecordRepository,
    PlayRecordRepositoryTrait, PlayRecordWriterTrait, ThemeRepository, ThemeRepositoryTrait,
    UserRepository, UserRepositoryTrait,
};
use crate::service::{HistoryAggregator, LevelClassifier, PlaySubmissionService};

/// 装配所需的仓储接口
pub struct Repositories {
    pub plays: Arc<dyn PlayRecordRepositoryTrait>,
    pub play_writer: Arc<dyn PlayRecordWriterTrait>,
    pub themes: Arc<dyn ThemeRepositoryTrait>,
    pub badges: Arc<dyn BadgeRepositoryTrait>,
    pub grants: Arc<dyn BadgeGrantWriterTrait>,
    pub users: Option<Arc<dyn UserRepositoryTrait>>,
}

impl Repositories {
    /// PostgreSQL 实现
    pub fn postgres(pool: PgPool) -> Self {
        let plays = Arc::new(PlayRecordRepository::new(pool.clone()));
        let badges = Arc::new(BadgeRepository::new(pool.clone()));

        Self {
            plays: plays.clone(),
            play_writer: plays,
            themes: Arc::new(ThemeRepository::new(pool.clone())),
            badges: badges.clone(),
            grants: badges,
            users: Some(Arc::new(UserRepository::new(pool))),
        }
    }
}

/// 已装配的服务
#[derive(Clone)]
pub struct QuizServices {
    pub submission: Arc<PlaySubmissionService>,
    pub history: Arc<HistoryAggregator>,
    pub engine: Arc<BadgeRuleEngine>,
    pub classifier: LevelClassifier,
}

impl QuizServices {
    pub fn new(repos: Repositories, quiz: &QuizConfig) -> Self {
        let catalog = Arc::new(RuleCatalog::from_config(quiz));
        let classifier = LevelClassifier::new(quiz.level_out_of_range);

        let mut history = HistoryAggregator::new(
            repos.plays,
            repos.themes.clone(),
            repos.badges.clone(),
        );
        if let Some(users) = &repos.users {
            history = history.with_users(users.clone());
        }
        let history = Arc::new(history);
        let engine = Arc::new(BadgeRuleEngine::new(
            catalog,
            history.clone(),
            repos.badges,
            repos.grants,
        ));

        let mut submission = PlaySubmissionService::new(
            repos.play_writer,
            repos.themes,
            engine.clone(),
            classifier.clone(),
        );
        if let Some(users) = repos.users {
            submission = submission.with_user_check(users);
        }

        info!(
            rules = ?engine.catalog().codes(),
            level_policy = ?classifier.policy(),
            "服务装配完成"
        );

        Self {
            submission: Arc::new(submission),
            history,
            engine,
            classifier,
        }
    }

    pub fn from_pool(pool: PgPool, quiz: &QuizConfig) -> Self {
        Self::new(Repositories::postgres(pool), quiz)
    }
}
