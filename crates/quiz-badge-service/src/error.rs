//! 测验徽章服务错误类型
//!
//! 定义服务层的业务错误和系统错误

use thiserror::Error;

/// 测验徽章服务错误类型
#[derive(Debug, Error)]
pub enum QuizError {
    // === 业务错误 ===
    #[error("用户不存在: {0}")]
    UserNotFound(i64),

    #[error("测验主题不存在: {0}")]
    ThemeNotFound(String),

    #[error("测验主题已停用: {0}")]
    ThemeInactive(String),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("内部错误: {0}")]
    Internal(String),

    #[error("参数校验失败: {0}")]
    Validation(String),
}

/// 测验徽章服务 Result 类型别名
pub type Result<T> = std::result::Result<T, QuizError>;

impl QuizError {
    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Internal(_))
    }

    /// 获取错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::ThemeNotFound(_) => "THEME_NOT_FOUND",
            Self::ThemeInactive(_) => "THEME_INACTIVE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}
