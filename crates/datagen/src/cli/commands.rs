//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。
//! 命令行参数优先于配置文件和环境变量。

use clap::{Args, Parser, Subcommand};

/// 在线学习数据集生成与 CRUD 基准测试工具
///
/// 使用 `--help` 查看各子命令的详细说明。
#[derive(Parser, Debug)]
#[command(name = "learnbench")]
#[command(version, about = "在线学习数据集生成与 CRUD 基准测试工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，默认取配置文件
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// 配置文件目录
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 数据生成相关的公共参数
#[derive(Args, Debug, Clone, Default)]
pub struct GenerationArgs {
    /// 规模倍数，非整数时回退为 1
    #[arg(short, long)]
    pub multiplier: Option<String>,

    /// 从标准输入交互式读取倍数
    #[arg(long, conflicts_with = "multiplier")]
    pub prompt: bool,

    /// 预设规模 (small, standard, stress)
    #[arg(long)]
    pub profile: Option<String>,

    /// 存储后端 (memory, postgres)
    #[arg(short, long)]
    pub store: Option<String>,

    /// 随机种子，指定后生成结果可复现
    #[arg(long)]
    pub seed: Option<u64>,

    /// 写入模式 (batched, per-document)
    #[arg(long)]
    pub write_mode: Option<String>,

    /// 正确答案从选项中选取
    #[arg(long)]
    pub enforce_answer_in_options: bool,
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 运行完整 CRUD 基准测试
    ///
    /// 依次执行清空、创建、写入、读取、更新、删除六个阶段并输出耗时报告。
    Run {
        #[command(flatten)]
        generation: GenerationArgs,

        /// 报告输出目录
        #[arg(short, long)]
        output_dir: Option<String>,

        /// 不绘制终端条形图
        #[arg(long)]
        no_chart: bool,

        /// 不导出报告文件
        #[arg(long)]
        no_export: bool,
    },

    /// 只生成数据集并校验完整性
    ///
    /// 清空全部集合后写入数据，输出各集合文档数量。
    Generate {
        #[command(flatten)]
        generation: GenerationArgs,
    },

    /// 清空全部集合
    Reset {
        /// 存储后端 (memory, postgres)
        #[arg(short, long)]
        store: Option<String>,
    },
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run_defaults() {
        let cli = Cli::parse_from(["learnbench", "run"]);
        assert!(cli.log_level.is_none());
        assert!(cli.config.is_none());
        match cli.command {
            Commands::Run {
                generation,
                output_dir,
                no_chart,
                no_export,
            } => {
                assert!(generation.multiplier.is_none());
                assert!(!generation.prompt);
                assert!(generation.seed.is_none());
                assert!(!generation.enforce_answer_in_options);
                assert!(output_dir.is_none());
                assert!(!no_chart);
                assert!(!no_export);
            }
            _ => panic!("预期 Run 命令"),
        }
    }

    #[test]
    fn test_cli_parse_run_custom() {
        let cli = Cli::parse_from([
            "learnbench",
            "run",
            "--multiplier",
            "abc",
            "--profile",
            "stress",
            "--store",
            "postgres",
            "--seed",
            "42",
            "--write-mode",
            "per-document",
            "--enforce-answer-in-options",
            "--output-dir",
            "reports",
            "--no-chart",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Commands::Run {
                generation,
                output_dir,
                no_chart,
                no_export,
            } => {
                // 非数字倍数在解析阶段保留原文，执行时回退为 1
                assert_eq!(generation.multiplier.as_deref(), Some("abc"));
                assert_eq!(generation.profile.as_deref(), Some("stress"));
                assert_eq!(generation.store.as_deref(), Some("postgres"));
                assert_eq!(generation.seed, Some(42));
                assert_eq!(generation.write_mode.as_deref(), Some("per-document"));
                assert!(generation.enforce_answer_in_options);
                assert_eq!(output_dir.as_deref(), Some("reports"));
                assert!(no_chart);
                assert!(!no_export);
            }
            _ => panic!("预期 Run 命令"),
        }
    }

    #[test]
    fn test_prompt_conflicts_with_multiplier() {
        let result = Cli::try_parse_from(["learnbench", "run", "--prompt", "-m", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_generate_and_reset() {
        let cli = Cli::parse_from(["learnbench", "--config", "conf", "generate", "-m", "3"]);
        assert_eq!(cli.config.as_deref(), Some("conf"));
        match cli.command {
            Commands::Generate { generation } => {
                assert_eq!(generation.multiplier.as_deref(), Some("3"));
            }
            _ => panic!("预期 Generate 命令"),
        }

        let cli = Cli::parse_from(["learnbench", "reset", "-s", "memory"]);
        match cli.command {
            Commands::Reset { store } => assert_eq!(store.as_deref(), Some("memory")),
            _ => panic!("预期 Reset 命令"),
        }
    }

    #[test]
    fn test_cli_verify() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
