//! 历史统计服务
//!
//! 从游戏记录实时推导用户统计，无缓存、无副作用。
//!
//! - 计数类统计：总局数、玩过的主题数、启用主题数、当日局数
//! - 纯函数：正确率、最佳表现、平均分、耗时格式化
//! - 展示聚合：历史页与个人主页，读取失败时降级为中性占位值

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::{instrument, warn};

use crate::error::Result;
use crate::models::{PlayHistoryEntry, PlayRecord, ThemeDisplay, ThemePlayCount};
use crate::models::theme::DEFAULT_THEME_EMOJI;
use crate::repository::{
    BadgeRepositoryTrait, PlayRecordRepositoryTrait, ThemeRepositoryTrait, UserRepositoryTrait,
};
use crate::service::dto::{
    HistoryEntryView, HistoryPage, HistoryStats, PerformanceBand, ProfileSummary,
};

/// 主题已删除时历史页显示的标题
const MISSING_THEME_TITLE: &str = "—";

// ==================== 纯函数 ====================

/// 正确率（0-100 的整数，四舍五入）
///
/// 负数输入先截断为 0；题数为 0 时返回 0
pub fn percentage(score: i32, total: i32) -> u32 {
    let score = score.max(0);
    let total = total.max(0);
    if total == 0 {
        return 0;
    }
    (f64::from(score) / f64::from(total) * 100.0).round() as u32
}

/// 所有局中的最高正确率，无记录时为 0
pub fn best_performance(history: &[PlayHistoryEntry]) -> u32 {
    history
        .iter()
        .map(|entry| percentage(entry.score, entry.total_questions))
        .max()
        .unwrap_or(0)
}

/// 原始得分的平均值（非正确率），保留一位小数，无记录时为 0
pub fn average_score(history: &[PlayHistoryEntry]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let total: i64 = history.iter().map(|e| i64::from(e.score.max(0))).sum();
    round_to(total as f64 / history.len() as f64, 1)
}

/// 一次遍历得到历史汇总
pub fn history_stats(history: &[PlayHistoryEntry]) -> HistoryStats {
    HistoryStats {
        total_plays: history.len(),
        total_points: history.iter().map(|e| i64::from(e.score.max(0))).sum(),
        average_score: average_score(history),
        best_performance: best_performance(history),
    }
}

/// 耗时格式化，如 125 -> "2min 5s"；非正数返回 None
pub fn format_elapsed(seconds: i32) -> Option<String> {
    if seconds <= 0 {
        return None;
    }
    Some(format!("{}min {}s", seconds / 60, seconds % 60))
}

/// `now` 所在自然日的 UTC 起止时间 `[start, end)`
///
/// 按 `now` 的时区规则截断日期，而不是滚动 24 小时窗口。
/// 零点按当天零点实际生效的偏移解析，夏令时切换日的窗口为 23 或 25 小时。
pub fn day_bounds<Tz: TimeZone>(now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = now.timezone();
    let today = now.date_naive();
    let tomorrow = today.succ_opt().unwrap_or(today);
    (midnight(&tz, today), midnight(&tz, tomorrow))
}

/// 当地日期的第一个时刻
///
/// 零点落在跳过的区间内时，取跳变后的第一个整点
fn midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    (0..=2)
        .find_map(|hour| {
            tz.from_local_datetime(&(naive + Duration::hours(hour)))
                .earliest()
        })
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn to_view(entry: &PlayHistoryEntry) -> HistoryEntryView {
    let pct = percentage(entry.score, entry.total_questions);
    HistoryEntryView {
        play_id: entry.id,
        theme_title: entry
            .theme_title
            .clone()
            .unwrap_or_else(|| MISSING_THEME_TITLE.to_string()),
        theme_emoji: entry
            .theme_emoji
            .clone()
            .unwrap_or_else(|| DEFAULT_THEME_EMOJI.to_string()),
        score: entry.score,
        total_questions: entry.total_questions,
        percentage: pct,
        band: PerformanceBand::from_percentage(pct),
        elapsed: format_elapsed(entry.elapsed_seconds),
        played_at: entry.played_at,
    }
}

// ==================== 聚合服务 ====================

/// 历史统计服务
///
/// 只持有只读仓储接口
pub struct HistoryAggregator {
    plays: Arc<dyn PlayRecordRepositoryTrait>,
    themes: Arc<dyn ThemeRepositoryTrait>,
    badges: Arc<dyn BadgeRepositoryTrait>,
    users: Option<Arc<dyn UserRepositoryTrait>>,
}

impl HistoryAggregator {
    pub fn new(
        plays: Arc<dyn PlayRecordRepositoryTrait>,
        themes: Arc<dyn ThemeRepositoryTrait>,
        badges: Arc<dyn BadgeRepositoryTrait>,
    ) -> Self {
        Self {
            plays,
            themes,
            badges,
            users: None,
        }
    }

    /// 个人主页附带用户资料
    pub fn with_users(mut self, users: Arc<dyn UserRepositoryTrait>) -> Self {
        self.users = Some(users);
        self
    }

    /// 用户游戏总局数
    pub async fn count_plays(&self, user_id: i64) -> Result<i64> {
        Ok(self.plays.count_plays(user_id).await?.max(0))
    }

    /// 用户玩过的不同主题数
    pub async fn count_distinct_themes_played(&self, user_id: i64) -> Result<i64> {
        Ok(self.plays.count_distinct_themes(user_id).await?.max(0))
    }

    /// 启用中的主题总数（全局）
    pub async fn count_active_themes(&self) -> Result<i64> {
        Ok(self.themes.count_active_themes().await?.max(0))
    }

    /// 服务器本地时区当天的游戏局数
    pub async fn count_plays_today(&self, user_id: i64) -> Result<i64> {
        self.count_plays_on(user_id, Local::now()).await
    }

    /// `now` 所在自然日的游戏局数
    pub async fn count_plays_on<Tz: TimeZone>(&self, user_id: i64, now: DateTime<Tz>) -> Result<i64> {
        let (start, end) = day_bounds(&now);
        self.count_plays_between(user_id, start, end).await
    }

    /// `[start, end)` 区间内的游戏局数
    pub async fn count_plays_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64> {
        Ok(self
            .plays
            .count_plays_between(user_id, start, end)
            .await?
            .max(0))
    }

    /// 最近一局已保存的游戏
    pub async fn latest_play(&self, user_id: i64) -> Result<Option<PlayRecord>> {
        self.plays.latest_play(user_id).await
    }

    /// 最常玩的主题
    pub async fn favorite_theme(&self, user_id: i64) -> Result<Option<ThemePlayCount>> {
        self.plays.favorite_theme(user_id).await
    }

    /// 历史页：汇总统计与逐局明细（最新在前）
    #[instrument(skip(self))]
    pub async fn history(&self, user_id: i64) -> Result<HistoryPage> {
        let history = self.plays.list_history(user_id).await?;
        Ok(HistoryPage {
            stats: history_stats(&history),
            entries: history.iter().map(to_view).collect(),
        })
    }

    /// 个人主页统计
    ///
    /// 每项统计独立读取，失败时记录警告并使用占位值，不向调用方返回错误
    #[instrument(skip(self))]
    pub async fn profile_summary(&self, user_id: i64) -> ProfileSummary {
        let play_count = degrade(self.count_plays(user_id).await, user_id, "play_count");
        let favorite_theme = degrade(self.favorite_theme(user_id).await, user_id, "favorite_theme");
        let badges = degrade(
            self.badges.list_user_badges(user_id).await,
            user_id,
            "badges",
        );
        let user = match &self.users {
            Some(users) => degrade(users.get_user(user_id).await, user_id, "user"),
            None => None,
        };

        ProfileSummary {
            user_id,
            user,
            play_count,
            favorite_theme,
            badges,
        }
    }

    /// 结果页的主题信息，查不到时由编码推导
    pub async fn theme_display(&self, code: &str) -> ThemeDisplay {
        match self.themes.get_theme_by_code(code).await {
            Ok(Some(theme)) => ThemeDisplay::from_theme(&theme),
            Ok(None) => ThemeDisplay::fallback(code),
            Err(e) => {
                warn!(theme_code = %code, error = %e, "主题读取失败，使用默认展示");
                ThemeDisplay::fallback(code)
            }
        }
    }
}

fn degrade<T: Default>(result: Result<T>, user_id: i64, stat: &str) -> T {
    result.unwrap_or_else(|e| {
        warn!(user_id = user_id, stat = stat, error = %e, "统计读取失败，使用占位值");
        T::default()
    })
}
