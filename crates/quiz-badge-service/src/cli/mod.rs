//! CLI 模块
//!
//! 提供运维与调试用的命令行接口：
//!
//! - `submit` - 提交一局游戏并评估徽章
//! - `evaluate` - 按当前统计重新评估徽章
//! - `history` / `profile` - 只读统计
//! - `classify` / `result` - 等级与结果页数据，无需数据库
//!
//! # 使用示例
//!
//! ```bash
//! quiz-badge submit -u 7 --theme rock -s 5 -n 5 -e 48
//! quiz-badge profile -u 7
//! quiz-badge --compact classify 8
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands};
pub use runner::CommandRunner;
