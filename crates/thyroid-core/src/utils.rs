//! 通用工具函数

use crate::error::{Result, ThyroidError};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// 报告中使用的时间格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// 可接受的输入时间格式
const INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// 将日期和时间组合为完整时间戳
pub fn combine(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}

/// 解析输入时间戳
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| ThyroidError::InvalidTimestamp(value.to_string()))
}

/// 报告格式的时间戳
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// 两个时间戳之间的小时数（可为负）
pub fn elapsed_hours(from: &NaiveDateTime, to: &NaiveDateTime) -> f64 {
    let seconds = (*to - *from).num_milliseconds() as f64 / 1000.0;
    seconds / 3600.0
}

/// 固定小数位格式化，非有限值输出 `nan` / `inf` / `-inf`
pub fn format_fixed(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{:.*}", decimals, value)
    }
}

/// 序列化实数，非有限值写成与 `format_fixed` 相同的字符串
///
/// JSON没有NaN和无穷大，直接序列化会变成 `null`。
pub fn serialize_real<S>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_str(&format_fixed(*value, 0))
    }
}
