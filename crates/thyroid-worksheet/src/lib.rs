//! # 摄碘率工作单模块
//!
//! 将结果报告和患者信息排版为可打印的工作单。计算模块不依赖本模块。

pub mod renderer;
pub mod worksheet;

pub use renderer::{TextRenderer, WorksheetRenderer};
pub use worksheet::{file_name, Block, Worksheet, PLACEHOLDER, WORKSHEET_TITLE};
