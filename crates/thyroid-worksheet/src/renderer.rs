//! 工作单渲染器

use crate::worksheet::{Block, Worksheet};
use thyroid_core::{Result, ThyroidError};
use tracing::info;

/// 工作单渲染器
///
/// 文本、PDF等输出格式各自实现该trait。
pub trait WorksheetRenderer {
    /// 输出文件扩展名
    fn extension(&self) -> &'static str;

    /// 渲染工作单
    fn render(&self, worksheet: &Worksheet) -> Result<Vec<u8>>;
}

/// 等宽文本渲染器
#[derive(Debug, Clone)]
pub struct TextRenderer {
    page_width: usize,
    label_width: usize,
}

impl TextRenderer {
    /// 默认页面宽度（字符）
    pub const DEFAULT_PAGE_WIDTH: usize = 72;
    /// 标签列宽，可容纳最长的 `Referring Physician:`
    pub const LABEL_WIDTH: usize = 22;

    /// 创建文本渲染器
    pub fn new(page_width: usize) -> Result<Self> {
        if page_width < Self::LABEL_WIDTH + crate::worksheet::PLACEHOLDER.len() {
            return Err(ThyroidError::Render(format!(
                "页面宽度过小: {}",
                page_width
            )));
        }

        Ok(Self {
            page_width,
            label_width: Self::LABEL_WIDTH,
        })
    }

    pub fn page_width(&self) -> usize {
        self.page_width
    }

    fn render_block(&self, block: &Block) -> String {
        match block {
            Block::Title(title) => format!("{:^width$}", title, width = self.page_width)
                .trim_end()
                .to_string(),
            Block::Field { label, value } => format!(
                "{:<width$}{}",
                format!("{}:", label),
                value,
                width = self.label_width
            ),
            Block::Separator => "-".repeat(self.page_width),
            Block::Spacer => String::new(),
            Block::Mono(line) => line.clone(),
        }
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            page_width: Self::DEFAULT_PAGE_WIDTH,
            label_width: Self::LABEL_WIDTH,
        }
    }
}

impl WorksheetRenderer for TextRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, worksheet: &Worksheet) -> Result<Vec<u8>> {
        let mut output = String::new();
        for block in worksheet.blocks() {
            output.push_str(&self.render_block(block));
            output.push('\n');
        }

        info!(
            "Rendered text worksheet: {} lines, {} bytes",
            worksheet.blocks().len(),
            output.len()
        );
        Ok(output.into_bytes())
    }
}
