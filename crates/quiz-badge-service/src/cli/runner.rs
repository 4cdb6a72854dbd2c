//! 命令执行器
//!
//! 将命令行参数转化为服务调用，结果以 JSON 写到 stdout。

use std::io::Write as _;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use tracing::{info, warn};

use super::commands::Commands;
use crate::app::QuizServices;
use crate::service::{LevelClassifier, SubmitPlayRequest};

/// 命令执行器
pub struct CommandRunner {
    classifier: LevelClassifier,
    pretty: bool,
}

impl CommandRunner {
    pub fn new(classifier: LevelClassifier, pretty: bool) -> Self {
        Self { classifier, pretty }
    }

    /// 执行不依赖数据库的命令，其他命令返回 false
    pub fn run_offline(&self, command: &Commands) -> Result<bool> {
        match command {
            Commands::Classify { score } => {
                self.print(self.classifier.classify(*score))?;
            }
            Commands::Result { score, total } => {
                self.print(&self.classifier.result_summary(*score, *total))?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// 执行命令
    pub async fn run(&self, services: &QuizServices, command: Commands) -> Result<()> {
        if self.run_offline(&command)? {
            return Ok(());
        }

        match command {
            Commands::Submit {
                user_id,
                theme,
                score,
                total,
                elapsed,
            } => {
                let request = SubmitPlayRequest {
                    user_id,
                    theme_code: theme,
                    score,
                    total_questions: total,
                    elapsed_seconds: elapsed,
                };
                let result = services
                    .submission
                    .submit(request)
                    .await
                    .inspect_err(|e| {
                        warn!(
                            error_code = e.error_code(),
                            retryable = e.is_retryable(),
                            business = e.is_business_error(),
                            "提交被拒绝"
                        )
                    })
                    .context("提交游戏失败")?;
                info!(
                    play_id = result.play.id,
                    granted = ?result.badges.granted,
                    "提交完成"
                );
                self.print(&result)
            }
            Commands::Evaluate { user_id } => {
                let report = services
                    .engine
                    .reevaluate_latest(user_id)
                    .await
                    .context("读取最近一局游戏失败")?
                    .ok_or_else(|| anyhow!("用户 {} 没有游戏记录，无法评估", user_id))?;
                self.print(&report)
            }
            Commands::History { user_id } => {
                let page = services
                    .history
                    .history(user_id)
                    .await
                    .context("读取游戏历史失败")?;
                self.print(&page)
            }
            Commands::Profile { user_id } => {
                let summary = services.history.profile_summary(user_id).await;
                self.print(&summary)
            }
            Commands::Classify { .. } | Commands::Result { .. } => Ok(()),
        }
    }

    /// 序列化为 JSON 字符串
    pub fn render<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }

    fn print<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let json = self.render(value)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", json).context("写入 stdout 失败")?;
        Ok(())
    }
}
