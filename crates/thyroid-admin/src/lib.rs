//! # 摄碘率管理模块
//!
//! 提供配置加载、验证和保存功能

pub mod config;

pub use config::{ConfigManager, ConfigValidator, LoggingConfig, ThyroidConfig, WorksheetConfig};
