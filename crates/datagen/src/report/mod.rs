//! 基准结果报告
//!
//! 耗时列表导出为 CSV / JSON 文件，并可在终端绘制横向条形图。
//! 报告失败只记录警告，不影响基准测试本身的结果。

pub mod chart;
pub mod export;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::benchmark::PhaseTiming;
use crate::generators::Multiplier;

pub use chart::render_bar_chart;
pub use export::{to_csv, write_csv, write_json};

/// 一次基准运行的耗时报告
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingReport {
    pub store: String,
    #[serde(serialize_with = "serialize_multiplier")]
    pub multiplier: Multiplier,
    pub timings: Vec<PhaseTiming>,
}

fn serialize_multiplier<S: serde::Serializer>(
    multiplier: &Multiplier,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(multiplier.get() as u64)
}

impl TimingReport {
    pub fn new(store: impl Into<String>, multiplier: Multiplier, timings: Vec<PhaseTiming>) -> Self {
        Self {
            store: store.into(),
            multiplier,
            timings,
        }
    }

    /// 报告文件名：`timings_<store>_<multiplier>.<ext>`
    pub fn file_name(&self, extension: &str) -> String {
        format!("timings_{}_{}.{}", self.store, self.multiplier, extension)
    }

    /// 全部阶段耗时之和（秒）
    pub fn total_seconds(&self) -> f64 {
        self.timings.iter().map(PhaseTiming::seconds).sum()
    }
}

/// 报告输出选项
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub output_dir: PathBuf,
    pub csv: bool,
    pub json: bool,
    pub chart: bool,
}

/// 按选项输出报告，返回成功写入的文件
///
/// 单项失败记录警告后继续输出其余部分。
pub fn publish(report: &TimingReport, options: &ReportOptions) -> Vec<PathBuf> {
    let mut written = Vec::new();

    if options.csv {
        record(write_csv(report, &options.output_dir), "CSV", &mut written);
    }
    if options.json {
        record(write_json(report, &options.output_dir), "JSON", &mut written);
    }
    if options.chart {
        println!("{}", render_bar_chart(&report.timings));
    }

    written
}

fn record(
    result: learnbench_shared::error::Result<PathBuf>,
    format: &str,
    written: &mut Vec<PathBuf>,
) {
    match result {
        Ok(path) => {
            println!("Timings saved to {} successfully", path.display());
            info!(format, path = %path.display(), "报告已保存");
            written.push(path);
        }
        Err(e) => warn!(format, error = %e, "报告保存失败"),
    }
}

/// 报告文件的完整路径
pub fn report_path(report: &TimingReport, dir: &Path, extension: &str) -> PathBuf {
    dir.join(report.file_name(extension))
}
