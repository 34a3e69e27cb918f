//! 命令执行器
//!
//! 负责执行各 CLI 子命令的具体逻辑。
//! 把命令行参数合并进加载好的配置，再调用生成器、基准计时器和报告模块。

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use learnbench_shared::config::{AppConfig, StoreBackend};

use super::commands::GenerationArgs;
use crate::benchmark::crud::{create_collections, drop_collections, insert_all_data};
use crate::benchmark::{BenchmarkHarness, PhaseTiming, standard_plan};
use crate::generators::{FakerProvider, GeneratorConfig, IntegrityReport, Multiplier, check_store};
use crate::report::{ReportOptions, TimingReport, publish};
use crate::store::{DocumentStore, open_store};

const MULTIPLIER_PROMPT: &str = "Enter how many times to multiply the amount of data: ";

/// 从输入流读取一行作为倍数
///
/// 输入为空或非整数时回退为 1。
pub async fn read_multiplier<R>(reader: &mut R) -> Result<Multiplier>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .await
        .context("读取倍数输入失败")?;
    Ok(Multiplier::parse(&line))
}

/// 命令执行器
///
/// 持有合并后的应用配置，作为 CLI 与业务逻辑之间的桥梁。
pub struct CommandRunner {
    config: AppConfig,
}

impl CommandRunner {
    /// 创建命令执行器
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 用命令行参数覆盖配置
    pub fn apply_generation_args(&mut self, args: &GenerationArgs) -> Result<()> {
        if let Some(store) = &args.store {
            self.apply_store(store)?;
        }

        let generation = &mut self.config.generation;
        if let Some(profile) = &args.profile {
            generation.profile = profile.clone();
        }
        if let Some(multiplier) = &args.multiplier {
            generation.multiplier = Some(multiplier.clone());
        }
        if args.seed.is_some() {
            generation.seed = args.seed;
        }
        if let Some(write_mode) = &args.write_mode {
            generation.write_mode = write_mode.clone();
        }
        if args.enforce_answer_in_options {
            generation.enforce_answer_in_options = true;
        }
        Ok(())
    }

    fn apply_store(&mut self, store: &str) -> Result<()> {
        self.config.store.backend = store.parse::<StoreBackend>().map_err(|e| anyhow!(e))?;
        Ok(())
    }

    /// 确定倍数：交互输入优先，其次命令行 / 配置，缺省为 1
    pub async fn resolve_multiplier(&self, prompt: bool) -> Result<Multiplier> {
        if prompt {
            print!("{MULTIPLIER_PROMPT}");
            std::io::stdout().flush().ok();
            let mut stdin = BufReader::new(tokio::io::stdin());
            return read_multiplier(&mut stdin).await;
        }

        Ok(self
            .config
            .generation
            .multiplier
            .as_deref()
            .map(Multiplier::parse)
            .unwrap_or_default())
    }

    fn generator_config(&self, multiplier: Multiplier) -> Result<GeneratorConfig> {
        GeneratorConfig::from_settings(&self.config.generation, multiplier)
            .context("生成参数无效")
    }

    async fn open(&self) -> Result<Arc<dyn DocumentStore>> {
        open_store(&self.config)
            .await
            .with_context(|| format!("无法打开存储: {}", self.config.store.backend))
    }

    /// 执行 run 命令
    ///
    /// 运行标准 CRUD 基准计划并输出报告。报告失败只记录警告。
    pub async fn run_benchmark(
        &mut self,
        args: &GenerationArgs,
        output_dir: Option<String>,
        no_chart: bool,
        no_export: bool,
    ) -> Result<Vec<PhaseTiming>> {
        self.apply_generation_args(args)?;
        if let Some(dir) = output_dir {
            self.config.report.output_dir = dir;
        }

        let multiplier = self.resolve_multiplier(args.prompt).await?;
        let config = self.generator_config(multiplier)?;
        let store = self.open().await?;

        info!(
            store = store.backend_name(),
            %multiplier,
            users = config.counts.users,
            courses = config.counts.courses,
            write_mode = config.write_mode.as_str(),
            "开始 CRUD 基准测试"
        );

        let mut harness = BenchmarkHarness::new();
        harness
            .run_all(standard_plan(
                store.as_ref(),
                &config,
                self.config.generation.seed,
            ))
            .await
            .context("基准测试中止")?;
        println!("Performance test completed");

        let timings = harness.finish();
        let report = TimingReport::new(store.backend_name(), multiplier, timings.clone());
        let options = ReportOptions {
            output_dir: PathBuf::from(&self.config.report.output_dir),
            csv: self.config.report.export_csv && !no_export,
            json: self.config.report.export_json && !no_export,
            chart: self.config.report.chart && !no_chart,
        };
        publish(&report, &options);

        Ok(timings)
    }

    /// 执行 generate 命令
    ///
    /// 清空并写入数据集后校验完整性，输出各集合数量。
    pub async fn run_generate(&mut self, args: &GenerationArgs) -> Result<IntegrityReport> {
        self.apply_generation_args(args)?;
        let multiplier = self.resolve_multiplier(args.prompt).await?;
        let config = self.generator_config(multiplier)?;
        let store = self.open().await?;

        drop_collections(store.as_ref()).await?;
        create_collections(store.as_ref()).await?;
        let summary = insert_all_data(
            store.as_ref(),
            &config,
            FakerProvider::new(self.config.generation.seed),
        )
        .await
        .context("数据集生成失败")?;
        info!(
            courses = summary.generation.courses,
            enrollments = summary.enrollment.enrollments,
            "数据集生成完成"
        );

        let report = check_store(
            store.as_ref(),
            Some(&config.counts),
            config.enforce_answer_in_options,
        )
        .await?;

        println!("{}", report.counts);
        if !report.is_ok() {
            for violation in &report.violations {
                warn!("{}", violation);
            }
            bail!(
                "完整性校验失败: {} 个问题",
                report.violations.len() + report.truncated
            );
        }
        Ok(report)
    }

    /// 执行 reset 命令
    pub async fn run_reset(&mut self, store: Option<String>) -> Result<()> {
        if let Some(store) = store {
            self.apply_store(&store)?;
        }
        let store = self.open().await?;
        drop_collections(store.as_ref()).await?;
        println!("All collections reset on {}", store.backend_name());
        Ok(())
    }
}
