//! 检查输入验证
//!
//! 验证只给出建议，不阻止计算。计算本身对任何实数输入都有定义。

use serde::Serialize;
use thyroid_core::{Result, StudyInputs, ThyroidError, TimePoint};
use tracing::{debug, info};

/// 检查输入验证器
#[derive(Debug, Default)]
pub struct StudyValidator;

impl StudyValidator {
    /// 创建新的验证器
    pub fn new() -> Self {
        Self
    }

    /// 验证一次检查的输入
    pub fn validate(&self, inputs: &StudyInputs) -> ValidationResult {
        let mut result = ValidationResult::new();

        // 1. 验证时间顺序
        self.validate_time_order(inputs, &mut result);

        // 2. 验证计数值
        self.validate_counts(inputs, &mut result);

        // 3. 验证标准源
        self.validate_standard(inputs, &mut result);

        info!("{}", result.get_summary());
        result
    }

    fn validate_time_order(&self, inputs: &StudyInputs, result: &mut ValidationResult) {
        for point in [TimePoint::FourHour, TimePoint::TwentyFourHour] {
            if inputs.timestamp(point) < inputs.zero_time {
                result.add_error(format!("{}测量时间早于零时", point.label()));
            }
        }

        if inputs.twenty_four_hour.timestamp <= inputs.four_hour.timestamp {
            result.add_warning("24小时测量时间不晚于4小时测量时间".to_string());
        }
    }

    fn validate_counts(&self, inputs: &StudyInputs, result: &mut ValidationResult) {
        let counts = [
            ("标准源计数", inputs.dose.phantom_count),
            ("零时本底计数", inputs.dose.background_count),
            ("4小时颈部计数", inputs.four_hour.neck_count),
            ("4小时大腿计数", inputs.four_hour.background_count),
            ("24小时颈部计数", inputs.twenty_four_hour.neck_count),
            ("24小时大腿计数", inputs.twenty_four_hour.background_count),
        ];

        for (name, value) in counts {
            if !value.is_finite() {
                result.add_error(format!("{}不是有限值: {}", name, value));
            } else if value < 0.0 {
                result.add_warning(format!("{}为负值: {}", name, value));
            } else {
                debug!("{} 验证通过: {}", name, value);
            }
        }

        for (point, net) in [
            (TimePoint::FourHour, inputs.four_hour.net()),
            (TimePoint::TwentyFourHour, inputs.twenty_four_hour.net()),
        ] {
            if net < 0.0 {
                result.add_warning(format!("{}净颈部计数为负值: {}", point.label(), net));
            }
        }
    }

    fn validate_standard(&self, inputs: &StudyInputs, result: &mut ValidationResult) {
        let net = inputs.dose.net();
        if net <= 0.0 {
            result.add_error(format!("标准源净计数必须为正: {}", net));
        }
    }
}

/// 验证结果
///
/// 只要存在错误 `is_valid` 即为 false，警告不影响结论。
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub is_valid: bool,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            is_valid: true,
        }
    }

    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// 一行摘要，用于日志
    pub fn get_summary(&self) -> String {
        match (self.errors.len(), self.warnings.len()) {
            (0, 0) => "输入验证完全通过".to_string(),
            (0, warnings) => format!("输入验证通过，但有 {} 个警告", warnings),
            (errors, warnings) => format!("输入验证失败：{} 个错误，{} 个警告", errors, warnings),
        }
    }

    /// 严格模式：存在错误时返回验证错误
    pub fn into_result(self) -> Result<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(ThyroidError::Validation(self.errors.join("; ")))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use thyroid_core::utils::parse_timestamp;
    use thyroid_core::{Measurement, StandardDose};

    fn ts(value: &str) -> NaiveDateTime {
        parse_timestamp(value).unwrap()
    }

    fn valid_inputs() -> StudyInputs {
        StudyInputs {
            zero_time: ts("2024-01-01 08:00"),
            dose: StandardDose::new(50000.0, 50.0),
            four_hour: Measurement::new(ts("2024-01-01 12:00"), 6000.0, 20.0),
            twenty_four_hour: Measurement::new(ts("2024-01-02 08:00"), 15000.0, 20.0),
        }
    }

    #[test]
    fn test_valid_study() {
        let result = StudyValidator::new().validate(&valid_inputs());
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_measurement_before_zero_hour() {
        let mut inputs = valid_inputs();
        inputs.four_hour.timestamp = ts("2024-01-01 07:00");

        let result = StudyValidator::new().validate(&inputs);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("4 Hour"));
    }

    #[test]
    fn test_out_of_order_measurements_warn() {
        let mut inputs = valid_inputs();
        inputs.twenty_four_hour.timestamp = inputs.four_hour.timestamp;

        let result = StudyValidator::new().validate(&inputs);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_negative_counts_warn() {
        let mut inputs = valid_inputs();
        inputs.four_hour = Measurement::new(inputs.four_hour.timestamp, -5.0, 20.0);

        let result = StudyValidator::new().validate(&inputs);
        assert!(result.is_valid);
        // 负颈部计数 + 负净计数
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_degenerate_standard_is_error() {
        let mut inputs = valid_inputs();
        inputs.dose = StandardDose::new(50.0, 50.0);

        let result = StudyValidator::new().validate(&inputs);
        assert!(!result.errors.is_empty());
        assert!(matches!(
            result.into_result(),
            Err(ThyroidError::Validation(_))
        ));
    }

    #[test]
    fn test_non_finite_count_is_error() {
        let mut inputs = valid_inputs();
        inputs.twenty_four_hour.neck_count = f64::NAN;

        let result = StudyValidator::new().validate(&inputs);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_summary() {
        let mut result = ValidationResult::new();
        assert_eq!(result.get_summary(), "输入验证完全通过");

        result.add_warning("警告".to_string());
        assert!(result.is_valid);
        assert_eq!(result.get_summary(), "输入验证通过，但有 1 个警告");

        result.add_error("错误".to_string());
        assert!(!result.is_valid);
        assert_eq!(result.get_summary(), "输入验证失败：1 个错误，1 个警告");
    }
}
