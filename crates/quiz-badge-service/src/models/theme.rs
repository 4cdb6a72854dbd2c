//! 测验主题实体

use serde::{Deserialize, Serialize};

/// 主题未配置表情时的默认值
pub const DEFAULT_THEME_EMOJI: &str = "🎵";
/// 主题未配置颜色时的默认渐变
pub const DEFAULT_THEME_COLOR: &str = "from-indigo-500 to-purple-600";

/// 测验主题
///
/// 静态参考数据，`active` 为 false 的主题不计入“全部主题”统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuizTheme {
    pub id: i64,
    pub code: String,
    pub title: String,
    #[sqlx(default)]
    pub emoji: Option<String>,
    #[sqlx(default)]
    pub color: Option<String>,
    pub active: bool,
}

/// 结果页展示的主题信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeDisplay {
    pub code: String,
    pub title: String,
    pub emoji: String,
    pub color: String,
}

impl ThemeDisplay {
    pub fn from_theme(theme: &QuizTheme) -> Self {
        Self {
            code: theme.code.clone(),
            title: theme.title.clone(),
            emoji: theme
                .emoji
                .clone()
                .unwrap_or_else(|| DEFAULT_THEME_EMOJI.to_string()),
            color: theme
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_THEME_COLOR.to_string()),
        }
    }

    /// 主题查不到时由编码推导标题，如 "annees_80" -> "Annees 80"
    pub fn fallback(code: &str) -> Self {
        let source = if code.is_empty() { "Thème" } else { code };
        let spaced = source.replace('_', " ");
        let mut chars = spaced.chars();
        let title = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };

        Self {
            code: code.to_string(),
            title,
            emoji: DEFAULT_THEME_EMOJI.to_string(),
            color: DEFAULT_THEME_COLOR.to_string(),
        }
    }
}
