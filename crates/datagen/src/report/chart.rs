//! 终端横向条形图

use crate::benchmark::PhaseTiming;

/// 最长条形的宽度（字符数）
const BAR_WIDTH: usize = 50;

const TITLE: &str = "Performance of Database Operations";

/// 绘制横向条形图
///
/// 条形长度与耗时成正比，最长阶段占满 `BAR_WIDTH`；非零耗时至少绘制一格。
pub fn render_bar_chart(timings: &[PhaseTiming]) -> String {
    let mut out = format!("{TITLE}\n");
    if timings.is_empty() {
        out.push_str("(no timings recorded)\n");
        return out;
    }

    let label_width = timings
        .iter()
        .map(|t| t.name.chars().count())
        .max()
        .unwrap_or(0);
    let max = timings
        .iter()
        .map(PhaseTiming::seconds)
        .fold(0.0_f64, f64::max);

    for timing in timings {
        let seconds = timing.seconds();
        let cells = if max > 0.0 {
            let scaled = (seconds / max * BAR_WIDTH as f64).round() as usize;
            if seconds > 0.0 { scaled.max(1) } else { 0 }
        } else {
            0
        };
        out.push_str(&format!(
            "{:<width$} | {} {:.2}s\n",
            timing.name,
            "█".repeat(cells),
            seconds,
            width = label_width
        ));
    }
    out.push_str(&format!(
        "{:<width$}   Time (seconds)\n",
        "",
        width = label_width
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_empty_chart() {
        let chart = render_bar_chart(&[]);
        assert!(chart.contains("no timings"));
    }

    #[test]
    fn test_longest_bar_fills_width() {
        let timings = vec![
            PhaseTiming::new("Insert All Data", Duration::from_secs(4)),
            PhaseTiming::new("Read", Duration::from_secs(1)),
            PhaseTiming::new("Noop", Duration::ZERO),
        ];
        let chart = render_bar_chart(&timings);
        let lines: Vec<_> = chart.lines().collect();

        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[2].matches('█').count(), BAR_WIDTH / 4 + 1);
        assert_eq!(lines[3].matches('█').count(), 0);
        // 标签左对齐到同一列
        assert_eq!(lines[1].find('|'), lines[2].find('|'));
    }

    #[test]
    fn test_single_zero_timing() {
        let chart = render_bar_chart(&[PhaseTiming::new("Create Tables", Duration::ZERO)]);
        assert!(chart.contains("Create Tables | "));
        assert!(chart.contains("0.00s"));
    }
}
