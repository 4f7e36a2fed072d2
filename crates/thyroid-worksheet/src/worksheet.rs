//! 工作单文档模型

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thyroid_core::PatientInfo;

/// 工作单标题
pub const WORKSHEET_TITLE: &str = "THYROID UPTAKE WORKSHEET";

/// 未填写字段的占位符
pub const PLACEHOLDER: &str = "____________________";

/// 工作单中的排版块
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Block {
    Title(String),                         // 居中标题
    Field { label: String, value: String }, // 定宽标签 + 值
    Separator,                             // 水平分隔线
    Spacer,                                // 空行
    Mono(String),                          // 等宽报告行
}

/// 工作单
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worksheet {
    blocks: Vec<Block>,
    date: NaiveDate,
}

/// 空值或空白值替换为占位符
fn field_value(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

fn field(label: &str, value: Option<&str>) -> Block {
    Block::Field {
        label: label.to_string(),
        value: field_value(value),
    }
}

impl Worksheet {
    /// 组装工作单
    ///
    /// `today` 为页脚日期，由调用方传入。
    pub fn build(
        report: &str,
        patient: &PatientInfo,
        today: NaiveDate,
        technologist: Option<&str>,
    ) -> Self {
        let mut blocks = vec![Block::Title(WORKSHEET_TITLE.to_string()), Block::Spacer];

        // 患者信息
        for (label, value) in patient.fields() {
            blocks.push(field(label, value));
        }

        blocks.extend([Block::Spacer, Block::Separator, Block::Spacer]);

        // 结果报告，每行一个等宽单元
        blocks.extend(report.split('\n').map(|line| Block::Mono(line.to_string())));

        blocks.extend([Block::Spacer, Block::Separator, Block::Spacer]);

        // 页脚
        blocks.push(field("Technologist", technologist));
        let date = today.format("%Y-%m-%d").to_string();
        blocks.push(field("Date", Some(date.as_str())));

        tracing::debug!("Worksheet built with {} blocks", blocks.len());

        Self { blocks, date: today }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// 报告行
    pub fn report_lines(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Mono(line) => Some(line.as_str()),
            _ => None,
        })
    }
}

/// 建议的输出文件名
pub fn file_name(patient: &PatientInfo, extension: &str) -> String {
    let stem = match patient.mrn.as_deref().map(str::trim) {
        Some(mrn) if !mrn.is_empty() => mrn,
        _ => "Report",
    };
    format!("Thyroid_{}.{}", stem, extension)
}
