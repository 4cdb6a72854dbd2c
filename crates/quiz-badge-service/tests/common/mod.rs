//! 集成测试公共设施
//!
//! 内存版存储实现全部仓储接口，语义与 PostgreSQL 实现保持一致：
//! 发放记录按 (user_id, badge_id) 唯一，历史按时间倒序。

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use tokio::sync::RwLock;

use quiz_badge::achievement::codes;
use quiz_badge::error::{QuizError, Result};
use quiz_badge::models::{
    BadgeDefinition, GrantedBadgeView, NewPlayRecord, PlayHistoryEntry, PlayRecord, QuizTheme,
    ThemePlayCount, User, UserBadge,
};
use quiz_badge::repository::{
    BadgeGrantWriterTrait, BadgeRepositoryTrait, PlayRecordRepositoryTrait,
    PlayRecordWriterTrait, ThemeRepositoryTrait, UserRepositoryTrait,
};
use quiz_badge::{QuizServices, Repositories};
use quiz_shared::config::QuizConfig;

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: Vec<User>,
    themes: Vec<QuizTheme>,
    plays: Vec<PlayRecord>,
    badges: Vec<BadgeDefinition>,
    grants: Vec<UserBadge>,
    failing_grants: HashSet<String>,
    fail_daily_count: bool,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn badge_code(&self, badge_id: i64) -> Option<&str> {
        self.badges
            .iter()
            .find(|b| b.id == badge_id)
            .map(|b| b.code.as_str())
    }
}

/// 内存存储
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// 预置四个内置徽章的存储
    pub async fn with_standard_badges() -> Arc<Self> {
        let store = Arc::new(Self::default());
        for (code, title) in [
            (codes::FIRST_QUIZ, "Premier quiz"),
            (codes::EXPLORATEUR, "Explorateur"),
            (codes::PERFECT, "Sans faute"),
            (codes::MARATHON, "Marathon"),
        ] {
            store.add_badge(code, title).await;
        }
        store
    }

    pub async fn add_badge(&self, code: &str, title: &str) -> i64 {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        inner.badges.push(BadgeDefinition {
            id,
            code: code.to_string(),
            title: title.to_string(),
            description: String::new(),
            icon: None,
        });
        id
    }

    pub async fn remove_badge(&self, code: &str) {
        self.inner.write().await.badges.retain(|b| b.code != code);
    }

    pub async fn add_user(&self, display_name: &str) -> i64 {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        inner.users.push(User {
            id,
            display_name: display_name.to_string(),
            email: format!("{}@example.com", display_name),
            created_at: Some(Utc::now()),
        });
        id
    }

    pub async fn add_theme(&self, code: &str, title: &str, active: bool) -> i64 {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        inner.themes.push(QuizTheme {
            id,
            code: code.to_string(),
            title: title.to_string(),
            emoji: None,
            color: None,
            active,
        });
        id
    }

    pub async fn delete_theme(&self, theme_id: i64) {
        self.inner.write().await.themes.retain(|t| t.id != theme_id);
    }

    /// 直接写入一局历史记录，不触发徽章评估
    pub async fn seed_play(
        &self,
        user_id: i64,
        theme_id: i64,
        score: i32,
        total: i32,
        played_at: DateTime<Utc>,
    ) -> PlayRecord {
        let record = NewPlayRecord::new(user_id, theme_id, score, total, 30, played_at);
        self.insert_play(&record).await.unwrap()
    }

    /// 指定徽章的写入一律失败
    pub async fn fail_grants_for(&self, code: &str) {
        self.inner
            .write()
            .await
            .failing_grants
            .insert(code.to_string());
    }

    pub async fn clear_failures(&self) {
        let mut inner = self.inner.write().await;
        inner.failing_grants.clear();
        inner.fail_daily_count = false;
    }

    /// 当日局数查询一律失败
    pub async fn fail_daily_count(&self) {
        self.inner.write().await.fail_daily_count = true;
    }

    /// 用户已获得的徽章编码（按编码排序）
    pub async fn granted_codes(&self, user_id: i64) -> Vec<String> {
        let inner = self.inner.read().await;
        let mut codes: Vec<String> = inner
            .grants
            .iter()
            .filter(|g| g.user_id == user_id)
            .filter_map(|g| inner.badge_code(g.badge_id).map(str::to_string))
            .collect();
        codes.sort();
        codes
    }

    pub async fn grant_count(&self, user_id: i64) -> usize {
        self.inner
            .read()
            .await
            .grants
            .iter()
            .filter(|g| g.user_id == user_id)
            .count()
    }

    pub async fn play_count(&self, user_id: i64) -> usize {
        self.inner
            .read()
            .await
            .plays
            .iter()
            .filter(|p| p.user_id == user_id)
            .count()
    }
}

fn storage_error() -> QuizError {
    QuizError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl UserRepositoryTrait for MemoryStore {
    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl ThemeRepositoryTrait for MemoryStore {
    async fn get_theme_by_code(&self, code: &str) -> Result<Option<QuizTheme>> {
        let inner = self.inner.read().await;
        Ok(inner.themes.iter().find(|t| t.code == code).cloned())
    }

    async fn count_active_themes(&self) -> Result<i64> {
        let inner = self.inner.read().await;
        Ok(inner.themes.iter().filter(|t| t.active).count() as i64)
    }
}

#[async_trait]
impl PlayRecordRepositoryTrait for MemoryStore {
    async fn count_plays(&self, user_id: i64) -> Result<i64> {
        let inner = self.inner.read().await;
        Ok(inner.plays.iter().filter(|p| p.user_id == user_id).count() as i64)
    }

    async fn count_distinct_themes(&self, user_id: i64) -> Result<i64> {
        let inner = self.inner.read().await;
        let themes: HashSet<i64> = inner
            .plays
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.theme_id)
            .collect();
        Ok(themes.len() as i64)
    }

    async fn count_plays_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64> {
        let inner = self.inner.read().await;
        if inner.fail_daily_count {
            return Err(storage_error());
        }
        Ok(inner
            .plays
            .iter()
            .filter(|p| p.user_id == user_id && p.played_at >= start && p.played_at < end)
            .count() as i64)
    }

    async fn list_history(&self, user_id: i64) -> Result<Vec<PlayHistoryEntry>> {
        let inner = self.inner.read().await;
        let mut plays: Vec<&PlayRecord> =
            inner.plays.iter().filter(|p| p.user_id == user_id).collect();
        plays.sort_by(|a, b| b.played_at.cmp(&a.played_at).then(b.id.cmp(&a.id)));

        Ok(plays
            .into_iter()
            .map(|p| {
                let theme = inner.themes.iter().find(|t| t.id == p.theme_id);
                PlayHistoryEntry {
                    id: p.id,
                    theme_id: p.theme_id,
                    theme_title: theme.map(|t| t.title.clone()),
                    theme_emoji: theme.and_then(|t| t.emoji.clone()),
                    score: p.score,
                    total_questions: p.total_questions,
                    elapsed_seconds: p.elapsed_seconds,
                    played_at: p.played_at,
                }
            })
            .collect())
    }

    async fn favorite_theme(&self, user_id: i64) -> Result<Option<ThemePlayCount>> {
        let inner = self.inner.read().await;
        let mut counts: HashMap<i64, i64> = HashMap::new();
        for play in inner.plays.iter().filter(|p| p.user_id == user_id) {
            *counts.entry(play.theme_id).or_default() += 1;
        }

        let mut ranked: Vec<ThemePlayCount> = counts
            .into_iter()
            .filter_map(|(theme_id, play_count)| {
                inner
                    .themes
                    .iter()
                    .find(|t| t.id == theme_id)
                    .map(|t| ThemePlayCount {
                        theme_id,
                        code: t.code.clone(),
                        title: t.title.clone(),
                        play_count,
                    })
            })
            .collect();
        ranked.sort_by(|a, b| b.play_count.cmp(&a.play_count).then(a.title.cmp(&b.title)));

        Ok(ranked.into_iter().next())
    }

    async fn latest_play(&self, user_id: i64) -> Result<Option<PlayRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .plays
            .iter()
            .filter(|p| p.user_id == user_id)
            .max_by(|a, b| a.played_at.cmp(&b.played_at).then(a.id.cmp(&b.id)))
            .cloned())
    }
}

#[async_trait]
impl PlayRecordWriterTrait for MemoryStore {
    async fn insert_play(&self, record: &NewPlayRecord) -> Result<PlayRecord> {
        let mut inner = self.inner.write().await;
        let play = PlayRecord {
            id: inner.next_id(),
            user_id: record.user_id,
            theme_id: record.theme_id,
            score: record.score,
            total_questions: record.total_questions,
            elapsed_seconds: record.elapsed_seconds,
            played_at: record.played_at,
        };
        inner.plays.push(play.clone());
        Ok(play)
    }
}

#[async_trait]
impl BadgeRepositoryTrait for MemoryStore {
    async fn get_badge_by_code(&self, code: &str) -> Result<Option<BadgeDefinition>> {
        let inner = self.inner.read().await;
        Ok(inner.badges.iter().find(|b| b.code == code).cloned())
    }

    async fn has_grant(&self, user_id: i64, badge_id: i64) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .grants
            .iter()
            .any(|g| g.user_id == user_id && g.badge_id == badge_id))
    }

    async fn list_user_badges(&self, user_id: i64) -> Result<Vec<GrantedBadgeView>> {
        let inner = self.inner.read().await;
        let mut grants: Vec<&UserBadge> =
            inner.grants.iter().filter(|g| g.user_id == user_id).collect();
        grants.sort_by(|a, b| b.granted_at.cmp(&a.granted_at).then(b.id.cmp(&a.id)));

        Ok(grants
            .into_iter()
            .filter_map(|g| {
                inner
                    .badges
                    .iter()
                    .find(|b| b.id == g.badge_id)
                    .map(|b| GrantedBadgeView {
                        code: b.code.clone(),
                        title: b.title.clone(),
                        description: b.description.clone(),
                        icon: b.icon.clone(),
                        granted_at: g.granted_at,
                    })
            })
            .collect())
    }
}

#[async_trait]
impl BadgeGrantWriterTrait for MemoryStore {
    async fn insert_grant(
        &self,
        user_id: i64,
        badge_id: i64,
        granted_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let failing = inner
            .badge_code(badge_id)
            .is_some_and(|code| inner.failing_grants.contains(code));
        if failing {
            return Err(storage_error());
        }
        if inner
            .grants
            .iter()
            .any(|g| g.user_id == user_id && g.badge_id == badge_id)
        {
            return Ok(false);
        }

        let id = inner.next_id();
        inner.grants.push(UserBadge {
            id,
            user_id,
            badge_id,
            granted_at,
        });
        Ok(true)
    }
}

/// 基于内存存储装配服务
pub fn services(store: &Arc<MemoryStore>, quiz: &QuizConfig) -> QuizServices {
    QuizServices::new(
        Repositories {
            plays: store.clone(),
            play_writer: store.clone(),
            themes: store.clone(),
            badges: store.clone(),
            grants: store.clone(),
            users: Some(store.clone()),
        },
        quiz,
    )
}

/// 固定的“现在”：UTC+2 的晚上九点
pub fn evening() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 10, 19, 21, 0, 0)
        .unwrap()
}

pub fn minutes_before(now: DateTime<FixedOffset>, minutes: i64) -> DateTime<Utc> {
    (now - Duration::minutes(minutes)).with_timezone(&Utc)
}
