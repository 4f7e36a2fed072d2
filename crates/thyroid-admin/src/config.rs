//! 配置管理
//!
//! 从TOML文件和 `THYROID_` 环境变量加载配置，支持验证和保存

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thyroid_uptake::SessionDefaults;
use tracing::{error, info};

/// 环境变量前缀，例如 `THYROID_LOGGING__LEVEL=debug`
pub const ENV_PREFIX: &str = "THYROID";

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    /// 配置数据
    config: ThyroidConfig,
    /// 配置文件路径
    config_path: Option<String>,
    /// 配置验证器
    validator: ConfigValidator,
}

/// 摄碘率系统完整配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThyroidConfig {
    /// 会话默认值
    pub session: SessionDefaults,
    /// 工作单配置
    pub worksheet: WorksheetConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 工作单配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorksheetConfig {
    /// 页面宽度（字符）
    pub page_width: usize,
    /// 工作单输出目录
    pub output_dir: Option<String>,
    /// 默认技师姓名
    pub technologist: Option<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别或过滤表达式
    pub level: String,
    /// 日志格式：text 或 json
    pub format: String,
}

/// 配置验证器
#[derive(Debug)]
pub struct ConfigValidator {
    /// 验证规则
    validation_rules: Vec<ValidationRule>,
}

/// 验证规则
#[derive(Debug)]
struct ValidationRule {
    /// 字段路径
    field_path: String,
    /// 验证函数
    validator: fn(&ThyroidConfig) -> Result<()>,
    /// 错误消息
    error_message: String,
}

impl ConfigManager {
    /// 创建新的配置管理器
    ///
    /// 未指定文件时仅使用默认值和环境变量。
    pub fn new(config_path: Option<&str>) -> Result<Self> {
        let config = Self::load_config(config_path)?;
        let validator = ConfigValidator::new();
        validator.validate(&config)?;

        Ok(Self {
            config,
            config_path: config_path.map(str::to_string),
            validator,
        })
    }

    /// 从文件和环境变量加载配置
    fn load_config(config_path: Option<&str>) -> Result<ThyroidConfig> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: ThyroidConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        match config_path {
            Some(path) => info!("Configuration loaded successfully from: {}", path),
            None => info!("Using default configuration"),
        }
        Ok(config)
    }

    /// 获取配置
    pub fn get_config(&self) -> &ThyroidConfig {
        &self.config
    }

    /// 更新配置
    pub fn update_config(&mut self, new_config: ThyroidConfig) -> Result<()> {
        self.validator.validate(&new_config)?;
        self.config = new_config;

        info!("Configuration updated successfully");
        Ok(())
    }

    /// 保存配置到指定文件
    pub fn save_config(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let config_str = self.config.to_toml()?;

        std::fs::write(path, config_str)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        info!("Configuration saved to: {}", path.display());
        Ok(())
    }

    /// 重新加载配置
    pub fn reload_config(&mut self) -> Result<()> {
        let new_config = Self::load_config(self.config_path.as_deref())?;
        self.update_config(new_config)
    }
}

impl ThyroidConfig {
    /// 序列化为TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

impl ConfigValidator {
    /// 创建新的配置验证器
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "session".to_string(),
                validator: |config| {
                    let session = &config.session;
                    if !session.phantom_count.is_finite() || !session.background_count.is_finite() {
                        Err(anyhow::anyhow!("Session counts must be finite"))
                    } else if session.phantom_count <= session.background_count {
                        Err(anyhow::anyhow!(
                            "Phantom count {} must exceed background {}",
                            session.phantom_count,
                            session.background_count
                        ))
                    } else {
                        Ok(())
                    }
                },
                error_message: "Invalid session defaults".to_string(),
            },
            ValidationRule {
                field_path: "worksheet.page_width".to_string(),
                validator: |config| {
                    if config.worksheet.page_width < WorksheetConfig::MIN_PAGE_WIDTH {
                        Err(anyhow::anyhow!(
                            "Page width must be at least {}",
                            WorksheetConfig::MIN_PAGE_WIDTH
                        ))
                    } else {
                        Ok(())
                    }
                },
                error_message: "Invalid worksheet page width".to_string(),
            },
            ValidationRule {
                field_path: "logging.format".to_string(),
                validator: |config| match config.logging.format.as_str() {
                    "text" | "json" => Ok(()),
                    other => Err(anyhow::anyhow!("Unknown log format: {}", other)),
                },
                error_message: "Invalid logging format".to_string(),
            },
        ];

        Self { validation_rules }
    }

    /// 验证配置
    pub fn validate(&self, config: &ThyroidConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(anyhow::anyhow!("{}: {}", rule.error_message, e));
            }
        }

        info!("Configuration validation passed");
        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl WorksheetConfig {
    /// 最小页面宽度：标签列 + 占位符
    pub const MIN_PAGE_WIDTH: usize = 42;
}

impl Default for WorksheetConfig {
    fn default() -> Self {
        Self {
            page_width: 72,
            output_dir: None,
            technologist: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ThyroidConfig::default();
        assert!(ConfigValidator::new().validate(&config).is_ok());
        assert_eq!(config.session.phantom_count, 50000.0);
        assert_eq!(config.session.background_count, 50.0);
        assert_eq!(config.worksheet.page_width, 72);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_partial_file() {
        let file = write_config(
            r#"
[session]
phantom_count = 42000.0

[worksheet]
technologist = "J. Smith"
"#,
        );

        let manager = ConfigManager::new(file.path().to_str()).unwrap();
        let config = manager.get_config();
        assert_eq!(config.session.phantom_count, 42000.0);
        assert_eq!(config.session.background_count, 50.0);
        assert_eq!(config.worksheet.technologist.as_deref(), Some("J. Smith"));
        assert_eq!(config.worksheet.page_width, 72);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let file = write_config(
            r#"
[session]
phantom_count = 10.0
background_count = 50.0
"#,
        );

        assert!(ConfigManager::new(file.path().to_str()).is_err());
    }

    #[test]
    fn test_missing_file_rejected() {
        assert!(ConfigManager::new(Some("/nonexistent/thyroid-config.toml")).is_err());
    }

    #[test]
    fn test_validator_rules() {
        let validator = ConfigValidator::new();

        let mut config = ThyroidConfig::default();
        config.worksheet.page_width = 20;
        assert!(validator.validate(&config).is_err());

        let mut config = ThyroidConfig::default();
        config.logging.format = "xml".to_string();
        assert!(validator.validate(&config).is_err());

        let mut config = ThyroidConfig::default();
        config.session.phantom_count = f64::NAN;
        assert!(validator.validate(&config).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thyroid.toml");

        let mut manager = ConfigManager::new(None).unwrap();
        let mut updated = manager.get_config().clone();
        updated.worksheet.page_width = 60;
        updated.logging.format = "json".to_string();
        manager.update_config(updated.clone()).unwrap();
        manager.save_config(&path).unwrap();

        let reloaded = ConfigManager::new(path.to_str()).unwrap();
        assert_eq!(reloaded.get_config().worksheet.page_width, 60);
        assert_eq!(reloaded.get_config().logging.format, "json");
    }

    #[test]
    fn test_update_rejects_invalid() {
        let mut manager = ConfigManager::new(None).unwrap();
        let mut invalid = manager.get_config().clone();
        invalid.worksheet.page_width = 0;

        assert!(manager.update_config(invalid).is_err());
        assert_eq!(manager.get_config().worksheet.page_width, 72);
    }
}
