//! 徽章规则目录
//!
//! 每条规则是一个以徽章编码为键的纯函数谓词，并声明自己依赖的统计项。
//! 引擎在评估前按声明统一拉取统计，规则本身不访问存储。
//!
//! 目录在启动时构建一次，之后以 `Arc` 只读共享。

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use quiz_shared::config::QuizConfig;
use tracing::{debug, info};

use super::codes;

/// 规则依赖的统计项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleFact {
    /// 用户游戏总局数（含本局）
    PlayCount,
    /// 用户玩过的不同主题数
    DistinctThemesPlayed,
    /// 启用中的主题总数
    ActiveThemes,
    /// 用户当天的游戏局数
    PlaysToday,
}

impl RuleFact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayCount => "play_count",
            Self::DistinctThemesPlayed => "distinct_themes_played",
            Self::ActiveThemes => "active_themes",
            Self::PlaysToday => "plays_today",
        }
    }
}

impl fmt::Display for RuleFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 规则评估上下文
///
/// 得分与题数已截断为非负数
#[derive(Debug, Clone, Default)]
pub struct RuleContext {
    pub user_id: i64,
    pub score: i32,
    pub total_questions: i32,
    facts: HashMap<RuleFact, i64>,
}

impl RuleContext {
    pub fn new(user_id: i64, score: i32, total_questions: i32) -> Self {
        Self {
            user_id,
            score: score.max(0),
            total_questions: total_questions.max(0),
            facts: HashMap::new(),
        }
    }

    pub fn with_fact(mut self, fact: RuleFact, value: i64) -> Self {
        self.insert_fact(fact, value);
        self
    }

    pub fn insert_fact(&mut self, fact: RuleFact, value: i64) {
        self.facts.insert(fact, value);
    }

    pub fn fact(&self, fact: RuleFact) -> Option<i64> {
        self.facts.get(&fact).copied()
    }

    /// 规则依赖的统计项是否都已就绪
    pub fn satisfies(&self, requires: &[RuleFact]) -> bool {
        requires.iter().all(|f| self.facts.contains_key(f))
    }
}

type Predicate = Box<dyn Fn(&RuleContext) -> bool + Send + Sync>;

/// 单条徽章规则
pub struct BadgeRule {
    code: String,
    description: String,
    requires: Vec<RuleFact>,
    predicate: Predicate,
}

impl BadgeRule {
    pub fn new<F>(
        code: impl Into<String>,
        description: impl Into<String>,
        requires: Vec<RuleFact>,
        predicate: F,
    ) -> Self
    where
        F: Fn(&RuleContext) -> bool + Send + Sync + 'static,
    {
        Self {
            code: code.into(),
            description: description.into(),
            requires,
            predicate: Box::new(predicate),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn requires(&self) -> &[RuleFact] {
        &self.requires
    }

    pub fn is_satisfied(&self, ctx: &RuleContext) -> bool {
        (self.predicate)(ctx)
    }
}

impl fmt::Debug for BadgeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BadgeRule")
            .field("code", &self.code)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}

// ==================== 内置规则 ====================

/// 第一局游戏
pub fn is_first_quiz(ctx: &RuleContext) -> bool {
    ctx.fact(RuleFact::PlayCount) == Some(1)
}

/// 玩遍所有启用中的主题；没有启用主题时不成立
pub fn is_explorer(ctx: &RuleContext) -> bool {
    match (
        ctx.fact(RuleFact::DistinctThemesPlayed),
        ctx.fact(RuleFact::ActiveThemes),
    ) {
        (Some(played), Some(active)) => active > 0 && played >= active,
        _ => false,
    }
}

/// 全部答对
pub fn is_perfect(ctx: &RuleContext) -> bool {
    ctx.total_questions > 0 && ctx.score == ctx.total_questions
}

/// 当天游戏局数达到阈值
pub fn is_marathon(ctx: &RuleContext, daily_plays: i64) -> bool {
    ctx.fact(RuleFact::PlaysToday)
        .is_some_and(|today| today >= daily_plays)
}

// ==================== 目录 ====================

/// 徽章规则目录，保持注册顺序
#[derive(Debug, Default)]
pub struct RuleCatalog {
    rules: Vec<BadgeRule>,
}

impl RuleCatalog {
    /// 创建空目录
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// 注册一条规则，编码已存在时原位替换
    pub fn register(&mut self, rule: BadgeRule) -> &mut Self {
        debug!(
            badge_code = rule.code(),
            requires = ?rule.requires(),
            "注册徽章规则"
        );
        match self.rules.iter_mut().find(|r| r.code == rule.code) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
        self
    }

    /// 内置的四条规则
    pub fn standard(marathon_daily_plays: i64) -> Self {
        let mut catalog = Self::new();

        catalog
            .register(BadgeRule::new(
                codes::FIRST_QUIZ,
                "完成第一局游戏",
                vec![RuleFact::PlayCount],
                is_first_quiz,
            ))
            .register(BadgeRule::new(
                codes::EXPLORATEUR,
                "玩遍所有启用中的主题",
                vec![RuleFact::DistinctThemesPlayed, RuleFact::ActiveThemes],
                is_explorer,
            ))
            .register(BadgeRule::new(
                codes::PERFECT,
                "单局全部答对",
                Vec::new(),
                is_perfect,
            ))
            .register(BadgeRule::new(
                codes::MARATHON,
                format!("同一天内完成 {} 局游戏", marathon_daily_plays),
                vec![RuleFact::PlaysToday],
                move |ctx| is_marathon(ctx, marathon_daily_plays),
            ));

        info!(
            rule_count = catalog.len(),
            codes = ?catalog.codes(),
            "徽章规则目录初始化完成"
        );

        catalog
    }

    /// 按业务配置构建内置目录
    pub fn from_config(config: &QuizConfig) -> Self {
        Self::standard(config.marathon_daily_plays)
    }

    pub fn get(&self, code: &str) -> Option<&BadgeRule> {
        self.rules.iter().find(|r| r.code == code)
    }

    pub fn codes(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.code()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BadgeRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 全部规则依赖的统计项（去重）
    pub fn required_facts(&self) -> BTreeSet<RuleFact> {
        self.rules
            .iter()
            .flat_map(|r| r.requires.iter().copied())
            .collect()
    }
}
