//! LearnBench 数据生成与基准测试
//!
//! 为在线学习领域生成引用一致的多层数据集（用户、课程、课时、测验、题目、选课记录），
//! 批量写入文档存储后对增删改查各阶段计时。
//!
//! # 主要模块
//!
//! - `models`: 领域实体
//! - `store`: 文档存储 trait 与内存 / PostgreSQL 实现
//! - `generators`: 实体图生成、选课抽样、规模控制与完整性校验
//! - `benchmark`: 阶段计时器与标准 CRUD 计划
//! - `report`: CSV / JSON 导出与终端条形图
//! - `cli`: 命令行接口
//!
//! # 使用示例
//!
//! ```rust,no_run
//! use learnbench_datagen::benchmark::{BenchmarkHarness, standard_plan};
//! use learnbench_datagen::generators::GeneratorConfig;
//! use learnbench_datagen::store::MemoryDocumentStore;
//!
//! # async fn demo() -> learnbench_shared::error::Result<()> {
//! let store = MemoryDocumentStore::new();
//! let config = GeneratorConfig::default();
//!
//! let mut harness = BenchmarkHarness::new();
//! harness.run_all(standard_plan(&store, &config, Some(42))).await?;
//! for timing in harness.finish() {
//!     println!("{}: {:.2}s", timing.name, timing.seconds());
//! }
//! # Ok(())
//! # }
//! ```

pub mod benchmark;
pub mod cli;
pub mod generators;
pub mod models;
pub mod report;
pub mod store;
