//! LearnBench CLI
//!
//! 数据集生成与 CRUD 基准测试的命令行入口点。

use anyhow::Context;
use clap::Parser;
use learnbench_datagen::cli::{Cli, CommandRunner, Commands};
use learnbench_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("加载配置失败")?;
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }

    // RUST_LOG 优先于配置和命令行指定的级别
    learnbench_shared::observability::init(&config.observability)?;

    let mut runner = CommandRunner::new(config);

    match cli.command {
        Commands::Run {
            generation,
            output_dir,
            no_chart,
            no_export,
        } => {
            runner
                .run_benchmark(&generation, output_dir, no_chart, no_export)
                .await?;
        }
        Commands::Generate { generation } => {
            runner.run_generate(&generation).await?;
        }
        Commands::Reset { store } => {
            runner.run_reset(store).await?;
        }
    }

    Ok(())
}
