//! 等级划分
//!
//! 将原始得分映射到结果页展示的等级。等级表为静态有序表，进程内只读。

use quiz_shared::config::LevelOutOfRangePolicy;
use serde::Serialize;

use crate::service::history::round_to;

/// 结果页播放庆祝动画的最低得分
pub const CELEBRATION_MIN_SCORE: i32 = 7;

/// 等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierLevel {
    Beginner,
    Amateur,
    Confirmed,
    Expert,
    Master,
}

/// 等级表中的一档，区间两端均包含
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tier {
    pub level: TierLevel,
    pub min: i32,
    pub max: i32,
    pub title: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    pub message: &'static str,
}

impl Tier {
    pub fn contains(&self, score: i32) -> bool {
        (self.min..=self.max).contains(&score)
    }
}

/// 等级表，按区间升序排列
pub static LEVEL_TIERS: [Tier; 5] = [
    Tier {
        level: TierLevel::Beginner,
        min: 0,
        max: 2,
        title: "🔇 Débutant",
        label: "Mélomane en herbe",
        color: "from-gray-400 to-gray-600",
        message: "C'est un début ! La musique n'a pas encore de secrets pour vous, mais c'est le moment d'ouvrir grand vos oreilles !",
    },
    Tier {
        level: TierLevel::Amateur,
        min: 3,
        max: 4,
        title: "🎵 Amateur",
        label: "Auditeur curieux",
        color: "from-blue-400 to-blue-600",
        message: "Pas mal ! Vous commencez à reconnaître quelques classiques. Continuez à explorer !",
    },
    Tier {
        level: TierLevel::Confirmed,
        min: 5,
        max: 6,
        title: "🎶 Confirmé",
        label: "Mélomane averti",
        color: "from-purple-400 to-purple-600",
        message: "Bravo ! Vous avez de bonnes bases musicales. Votre culture s'étend bien !",
    },
    Tier {
        level: TierLevel::Expert,
        min: 7,
        max: 8,
        title: "🎸 Expert",
        label: "Connaisseur",
        color: "from-orange-400 to-orange-600",
        message: "Impressionnant ! Vous maîtrisez vraiment votre sujet. Peu de choses vous échappent !",
    },
    Tier {
        level: TierLevel::Master,
        min: 9,
        max: 10,
        title: "🏆 Maître",
        label: "Virtuose musical",
        color: "from-yellow-400 to-yellow-600",
        message: "Exceptionnel ! Vous êtes un véritable expert. Bravo pour cette performance parfaite !",
    },
];

/// 结果页数据
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub score: i32,
    pub total_questions: i32,
    /// 正确率，保留两位小数
    pub percentage: f64,
    /// 进度条宽度，限定在 0-100
    pub progress: f64,
    pub tier: Tier,
    pub celebrate: bool,
}

/// 等级划分器
///
/// 无状态，超出等级表范围的得分按配置的策略处理
#[derive(Debug, Clone)]
pub struct LevelClassifier {
    tiers: &'static [Tier],
    policy: LevelOutOfRangePolicy,
}

impl Default for LevelClassifier {
    fn default() -> Self {
        Self::new(LevelOutOfRangePolicy::default())
    }
}

impl LevelClassifier {
    pub fn new(policy: LevelOutOfRangePolicy) -> Self {
        Self {
            tiers: &LEVEL_TIERS,
            policy,
        }
    }

    pub fn policy(&self) -> LevelOutOfRangePolicy {
        self.policy
    }

    /// 返回第一个包含该得分的等级
    pub fn classify(&self, score: i32) -> &'static Tier {
        let score = score.max(0);
        if let Some(tier) = self.tiers.iter().find(|t| t.contains(score)) {
            return tier;
        }

        let first = &self.tiers[0];
        match self.policy {
            LevelOutOfRangePolicy::FirstTier => first,
            LevelOutOfRangePolicy::Clamp => {
                let last = &self.tiers[self.tiers.len() - 1];
                if score > last.max { last } else { first }
            }
        }
    }

    /// 结果页数据：正确率、进度条、等级与是否庆祝
    pub fn result_summary(&self, score: i32, total_questions: i32) -> ResultSummary {
        let score = score.max(0);
        let total_questions = total_questions.max(0);
        let percentage = if total_questions > 0 {
            round_to(f64::from(score) / f64::from(total_questions) * 100.0, 2)
        } else {
            0.0
        };

        ResultSummary {
            score,
            total_questions,
            percentage,
            progress: percentage.clamp(0.0, 100.0),
            tier: *self.classify(score),
            celebrate: score >= CELEBRATION_MIN_SCORE,
        }
    }
}
