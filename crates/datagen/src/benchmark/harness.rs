//! 阶段计时器
//!
//! 严格顺序执行各阶段，每个阶段完成后才开始下一个。
//! 阶段失败时立即中止，失败阶段不记录耗时，后续阶段不再执行。

use std::future::Future;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use serde::Serialize;
use tracing::{info, instrument};

use learnbench_shared::error::Result;

/// 可计时的阶段
pub type Phase<'a> = BoxFuture<'a, Result<()>>;

/// 单个阶段的耗时
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTiming {
    pub name: String,
    pub duration: Duration,
}

impl PhaseTiming {
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }

    pub fn seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

impl Serialize for PhaseTiming {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("PhaseTiming", 2)?;
        state.serialize_field("operation", &self.name)?;
        state.serialize_field("durationSeconds", &self.seconds())?;
        state.end()
    }
}

/// 基准测试计时器
///
/// 耗时结果归计时器实例所有，通过 [`BenchmarkHarness::finish`] 取出。
#[derive(Debug, Default)]
pub struct BenchmarkHarness {
    timings: Vec<PhaseTiming>,
    quiet: bool,
}

impl BenchmarkHarness {
    pub fn new() -> Self {
        Self::default()
    }

    /// 不向标准输出打印进度行，只写日志
    pub fn quiet() -> Self {
        Self {
            timings: Vec::new(),
            quiet: true,
        }
    }

    /// 执行并计时单个阶段
    ///
    /// 阶段返回错误时原样向上传播，不记录耗时。
    pub async fn measure<T, F>(&mut self, name: &str, phase: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let start = Instant::now();
        let value = phase.await?;
        self.record(name, start.elapsed());
        Ok(value)
    }

    /// 按顺序执行全部阶段，遇到第一个失败即中止
    #[instrument(skip_all, fields(phases = phases.len()))]
    pub async fn run_all(&mut self, phases: Vec<(String, Phase<'_>)>) -> Result<()> {
        for (name, phase) in phases {
            self.measure(&name, phase).await?;
        }
        Ok(())
    }

    fn record(&mut self, name: &str, duration: Duration) {
        let seconds = duration.as_secs_f64();
        if !self.quiet {
            println!("{name} took {seconds:.2} seconds");
        }
        info!(phase = name, seconds, "阶段完成");
        self.timings.push(PhaseTiming::new(name, duration));
    }

    /// 已完成阶段的耗时，按执行顺序排列
    pub fn timings(&self) -> &[PhaseTiming] {
        &self.timings
    }

    /// 结束计时并取出结果
    pub fn finish(self) -> Vec<PhaseTiming> {
        self.timings
    }
}
