//! 基准测试
//!
//! `harness` 负责顺序执行与计时，`crud` 定义标准的六个 CRUD 阶段。

pub mod crud;
pub mod harness;

pub use crud::{PopulationSummary, standard_plan};
pub use harness::{BenchmarkHarness, Phase, PhaseTiming};
