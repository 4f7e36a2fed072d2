//! 摄碘率结果报告
//!
//! 报告按行切分后逐行写入工作单，行格式必须保持稳定。

use crate::calculator::UptakeResult;
use thyroid_core::utils::{format_fixed, format_timestamp};
use thyroid_core::{StudyInputs, TimePoint};

/// 报告标题行
pub const REPORT_TITLE: &str = "--- THYROID UPTAKE RESULTS ---";

/// 报告末尾的参考范围说明
pub const NORMAL_RANGE_NOTE: &str = "*Normal Range: 4h (5-20%), 24h (15-35%)";

/// 标签列宽
const LABEL_WIDTH: usize = 25;

fn value_line(label: &str, value: &str) -> String {
    format!("  {:<width$}| {}", label, value, width = LABEL_WIDTH)
}

fn uptake_line(label: &str, uptake_pct: f64) -> String {
    format!(
        "  {:<width$}= {}%",
        label,
        format_fixed(uptake_pct, 2),
        width = LABEL_WIDTH
    )
}

/// 单个测量时间点的报告段
fn measurement_block(
    lines: &mut Vec<String>,
    inputs: &StudyInputs,
    point: TimePoint,
    elapsed_hours: f64,
    net_neck: f64,
    decay_factor: f64,
    uptake_pct: f64,
) {
    lines.push(format!(
        "{} Uptake (Time: {}, Elapsed: {} hrs)",
        point.label(),
        format_timestamp(&inputs.timestamp(point)),
        format_fixed(elapsed_hours, 2)
    ));
    lines.push(value_line("Net Neck", &format_fixed(net_neck, 1)));
    lines.push(value_line(
        "Decay correction factor",
        &format!("x {}", format_fixed(decay_factor, 3)),
    ));
    lines.push(uptake_line(
        &format!("{} hour uptake", point.nominal_hours()),
        uptake_pct,
    ));
}

/// 生成固定格式的文本报告
///
/// 行之间以 `\n` 分隔，末尾没有换行。相同输入得到逐字节相同的输出。
pub fn format_report(inputs: &StudyInputs, result: &UptakeResult) -> String {
    let mut lines = vec![
        REPORT_TITLE.to_string(),
        String::new(),
        format!(
            "{} (Time: {})",
            TimePoint::Zero.label(),
            format_timestamp(&inputs.zero_time)
        ),
        value_line("Net (standard)", &format_fixed(result.net_standard, 1)),
        String::new(),
    ];

    measurement_block(
        &mut lines,
        inputs,
        TimePoint::FourHour,
        result.elapsed_hours_4,
        result.net_neck_4,
        result.decay_factor_4,
        result.uptake_pct_4,
    );
    lines.push(String::new());

    measurement_block(
        &mut lines,
        inputs,
        TimePoint::TwentyFourHour,
        result.elapsed_hours_24,
        result.net_neck_24,
        result.decay_factor_24,
        result.uptake_pct_24,
    );
    lines.push(String::new());

    lines.push(NORMAL_RANGE_NOTE.to_string());
    lines.join("\n")
}
