//! 错误定义模块

use thiserror::Error;

/// 摄碘率系统统一错误类型
///
/// 数值退化（除零产生的无穷大或NaN）不属于错误，会原样传递到报告中。
#[derive(Error, Debug)]
pub enum ThyroidError {
    #[error("验证错误: {0}")]
    Validation(String),

    #[error("时间格式无效: {0}")]
    InvalidTimestamp(String),

    #[error("渲染错误: {0}")]
    Render(String),
}

/// 摄碘率系统统一结果类型
pub type Result<T> = std::result::Result<T, ThyroidError>;
