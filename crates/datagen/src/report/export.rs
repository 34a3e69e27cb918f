//! 耗时列表导出

use std::fs;
use std::path::{Path, PathBuf};

use learnbench_shared::error::Result;

use super::{TimingReport, report_path};
use crate::benchmark::PhaseTiming;

/// CSV 表头
pub const CSV_HEADER: &str = "Operation,Duration (seconds)";

/// 转义 CSV 字段：含逗号、引号或换行时加引号，内部引号加倍
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// 生成 CSV 文本，空列表只输出表头
pub fn to_csv(timings: &[PhaseTiming]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for timing in timings {
        out.push_str(&csv_field(&timing.name));
        out.push(',');
        out.push_str(&timing.seconds().to_string());
        out.push('\n');
    }
    out
}

/// 写入 CSV 文件，目录不存在时自动创建
pub fn write_csv(report: &TimingReport, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = report_path(report, dir, "csv");
    fs::write(&path, to_csv(&report.timings))?;
    Ok(path)
}

/// 写入 JSON 文件
pub fn write_json(report: &TimingReport, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = report_path(report, dir, "json");
    fs::write(&path, serde_json::to_string_pretty(report)?)?;
    Ok(path)
}
