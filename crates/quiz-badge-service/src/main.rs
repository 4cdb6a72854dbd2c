//! 音乐测验成就引擎
//!
//! 命令行入口：加载配置、初始化可观测性，按需连接数据库后执行子命令。

use anyhow::Result;
use clap::Parser;
use quiz_shared::{config::AppConfig, database::Database, observability};
use tracing::{error, info, warn};

use quiz_badge::{
    QuizServices,
    cli::{Cli, CommandRunner},
    service::LevelClassifier,
};

const SERVICE_NAME: &str = "quiz-badge";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. 加载配置，失败时使用默认值并在日志就绪后告警
    let (mut config, load_error) = match AppConfig::load(SERVICE_NAME) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }

    // 2. 初始化可观测性
    let _guard = observability::init(&config.observability_config()).await?;
    if let Some(e) = load_error {
        warn!(error = %e, "配置加载失败，使用默认配置");
    }
    info!(environment = %config.environment, "Configuration loaded");

    let runner = CommandRunner::new(
        LevelClassifier::new(config.quiz.level_out_of_range),
        !cli.compact,
    );

    // 3. 无需数据库的命令直接执行
    if runner.run_offline(&cli.command)? {
        return Ok(());
    }

    // 4. 连接数据库、执行迁移并装配服务
    let db = Database::connect(&config.database)
        .await
        .inspect_err(|e| error!(error_code = e.code(), error = %e, "数据库连接失败"))?;
    if config.database.run_migrations {
        db.run_migrations()
            .await
            .inspect_err(|e| error!(error_code = e.code(), error = %e, "数据库迁移失败"))?;
    }

    let services = QuizServices::from_pool(db.pool().clone(), &config.quiz);

    // 5. 徽章目录缺项只告警，评估时会跳过
    let missing = db
        .missing_badge_codes(&services.engine.catalog().codes())
        .await?;
    info!(missing = missing.len(), "徽章目录检查完成");
    let outcome = runner.run(&services, cli.command).await;

    db.close().await;
    outcome
}
