//! CLI 模块
//!
//! 提供命令行接口，支持以下功能：
//!
//! - `run` - 运行完整 CRUD 基准测试并导出耗时报告
//! - `generate` - 生成数据集并校验完整性
//! - `reset` - 清空全部集合
//!
//! # 使用示例
//!
//! ```bash
//! # 以 3 倍规模运行基准测试
//! learnbench run -m 3 --seed 42
//!
//! # 交互式输入倍数，使用 PostgreSQL 存储
//! learnbench run --prompt --store postgres
//!
//! # 只生成数据并校验
//! learnbench generate --profile small
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands, GenerationArgs};
pub use runner::CommandRunner;
