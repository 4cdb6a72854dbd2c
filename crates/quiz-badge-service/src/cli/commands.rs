//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。

use clap::{Parser, Subcommand};

/// 音乐测验徽章工具
///
/// 提交游戏、按已保存的游戏补评徽章、查看历史与个人主页。结果以 JSON 输出到 stdout。
#[derive(Parser, Debug)]
#[command(name = "quiz-badge")]
#[command(version, about = "音乐测验成就引擎工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别，覆盖配置文件 (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// 输出单行 JSON
    #[arg(long)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 子命令枚举
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// 提交一局已完成的游戏并评估徽章
    Submit {
        /// 用户 ID
        #[arg(short, long)]
        user_id: i64,

        /// 主题编码
        #[arg(short, long)]
        theme: String,

        /// 答对题数
        #[arg(short, long)]
        score: i32,

        /// 总题数
        #[arg(short = 'n', long)]
        total: i32,

        /// 耗时（秒）
        #[arg(short, long, default_value = "0")]
        elapsed: i32,
    },

    /// 按用户最近一局已保存的游戏重新评估徽章
    Evaluate {
        #[arg(short, long)]
        user_id: i64,
    },

    /// 游戏历史与汇总统计
    History {
        #[arg(short, long)]
        user_id: i64,
    },

    /// 个人主页统计
    Profile {
        #[arg(short, long)]
        user_id: i64,
    },

    /// 查询得分对应的等级
    Classify {
        score: i32,
    },

    /// 结果页数据（正确率、进度条、等级）
    Result {
        #[arg(short, long)]
        score: i32,

        #[arg(short = 'n', long)]
        total: i32,
    },
}

impl Commands {
    /// 是否需要连接数据库
    pub fn needs_database(&self) -> bool {
        !matches!(self, Self::Classify { .. } | Self::Result { .. })
    }
}
