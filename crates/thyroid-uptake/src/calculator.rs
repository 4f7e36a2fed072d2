//! 摄碘率计算
//!
//! 将零时标准源计数按衰变投影到4小时和24小时测量时刻，再与净颈部计数比较。

use crate::decay::DecayModel;
use chrono::NaiveDateTime;
use serde::Serialize;
use thyroid_core::utils::{elapsed_hours, serialize_real};
use thyroid_core::{Measurement, StandardDose, StudyInputs};
use tracing::{debug, warn};

/// 摄碘率计算结果
///
/// 每次计算重新生成，不缓存。标准源净计数为零时，摄碘率为无穷大或NaN。
/// JSON中非有限值写成与报告相同的字符串（`nan`、`inf`、`-inf`）。
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct UptakeResult {
    #[serde(serialize_with = "serialize_real")]
    pub elapsed_hours_4: f64,
    #[serde(serialize_with = "serialize_real")]
    pub elapsed_hours_24: f64,
    #[serde(serialize_with = "serialize_real")]
    pub decay_factor_4: f64,
    #[serde(serialize_with = "serialize_real")]
    pub decay_factor_24: f64,
    #[serde(serialize_with = "serialize_real")]
    pub net_standard: f64,
    #[serde(serialize_with = "serialize_real")]
    pub net_neck_4: f64,
    #[serde(serialize_with = "serialize_real")]
    pub net_neck_24: f64,
    #[serde(serialize_with = "serialize_real")]
    pub uptake_pct_4: f64,
    #[serde(serialize_with = "serialize_real")]
    pub uptake_pct_24: f64,
}

impl UptakeResult {
    /// 两个摄碘率是否均为有限值
    pub fn is_finite(&self) -> bool {
        self.uptake_pct_4.is_finite() && self.uptake_pct_24.is_finite()
    }
}

/// 计算摄碘率
///
/// `meas4` / `meas24` 携带各自的测量时间戳。
pub fn compute(
    zero_time: NaiveDateTime,
    dose: &StandardDose,
    meas4: &Measurement,
    meas24: &Measurement,
    model: &DecayModel,
) -> UptakeResult {
    let elapsed_hours_4 = elapsed_hours(&zero_time, &meas4.timestamp);
    let elapsed_hours_24 = elapsed_hours(&zero_time, &meas24.timestamp);

    let decay_factor_4 = model.decay_factor(elapsed_hours_4);
    let decay_factor_24 = model.decay_factor(elapsed_hours_24);

    let net_standard = dose.net();
    let corrected_standard_4 = net_standard * decay_factor_4;
    let corrected_standard_24 = net_standard * decay_factor_24;

    let net_neck_4 = meas4.net();
    let net_neck_24 = meas24.net();

    let result = UptakeResult {
        elapsed_hours_4,
        elapsed_hours_24,
        decay_factor_4,
        decay_factor_24,
        net_standard,
        net_neck_4,
        net_neck_24,
        uptake_pct_4: net_neck_4 / corrected_standard_4 * 100.0,
        uptake_pct_24: net_neck_24 / corrected_standard_24 * 100.0,
    };

    debug!(
        elapsed_4 = result.elapsed_hours_4,
        elapsed_24 = result.elapsed_hours_24,
        uptake_4 = result.uptake_pct_4,
        uptake_24 = result.uptake_pct_24,
        "Uptake computed"
    );

    if !result.is_finite() {
        warn!(
            "Non-finite uptake (net standard {}): 4h={}, 24h={}",
            net_standard, result.uptake_pct_4, result.uptake_pct_24
        );
    }

    result
}

/// 摄碘率计算器
#[derive(Debug, Clone, Copy, Default)]
pub struct UptakeCalculator {
    model: DecayModel,
}

impl UptakeCalculator {
    /// 创建新的计算器
    pub fn new(model: DecayModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &DecayModel {
        &self.model
    }

    /// 根据一次检查的全部输入计算摄碘率
    pub fn compute(&self, inputs: &StudyInputs) -> UptakeResult {
        compute(
            inputs.zero_time,
            &inputs.dose,
            &inputs.four_hour,
            &inputs.twenty_four_hour,
            &self.model,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thyroid_core::utils::parse_timestamp;

    fn ts(value: &str) -> NaiveDateTime {
        parse_timestamp(value).unwrap()
    }

    fn sample_inputs() -> StudyInputs {
        StudyInputs {
            zero_time: ts("2024-01-01 08:00"),
            dose: StandardDose::new(50000.0, 50.0),
            four_hour: Measurement::new(ts("2024-01-01 12:00"), 6000.0, 20.0),
            twenty_four_hour: Measurement::new(ts("2024-01-02 08:00"), 15000.0, 20.0),
        }
    }

    #[test]
    fn test_worked_example() {
        let result = UptakeCalculator::default().compute(&sample_inputs());

        assert_eq!(result.elapsed_hours_4, 4.0);
        assert_eq!(result.elapsed_hours_24, 24.0);
        assert_eq!(result.net_standard, 49950.0);
        assert_eq!(result.net_neck_4, 5980.0);
        assert_eq!(result.net_neck_24, 14980.0);

        let lambda = 2f64.ln() / 13.2235;
        assert!((result.decay_factor_4 - (-lambda * 4.0).exp()).abs() < 1e-12);
        assert!((result.decay_factor_24 - (-lambda * 24.0).exp()).abs() < 1e-12);
        assert!((result.decay_factor_4 - 0.81085).abs() < 1e-4);
        assert!((result.decay_factor_24 - 0.28421).abs() < 1e-4);

        assert!((result.uptake_pct_4 - 14.7647).abs() < 1e-3);
        assert!((result.uptake_pct_24 - 105.5191).abs() < 1e-3);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let calculator = UptakeCalculator::default();
        let inputs = sample_inputs();

        let first = calculator.compute(&inputs);
        let second = calculator.compute(&inputs);
        assert_eq!(first.uptake_pct_4.to_bits(), second.uptake_pct_4.to_bits());
        assert_eq!(first.uptake_pct_24.to_bits(), second.uptake_pct_24.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_duration() {
        let mut inputs = sample_inputs();
        inputs.four_hour.timestamp = inputs.zero_time;

        let result = UptakeCalculator::default().compute(&inputs);
        assert_eq!(result.elapsed_hours_4, 0.0);
        assert_eq!(result.decay_factor_4, 1.0);
        assert_eq!(result.uptake_pct_4, 5980.0 / 49950.0 * 100.0);
    }

    #[test]
    fn test_zero_net_standard_is_non_finite() {
        let mut inputs = sample_inputs();
        inputs.dose = StandardDose::new(500.0, 500.0);

        let result = UptakeCalculator::default().compute(&inputs);
        assert_eq!(result.net_standard, 0.0);
        assert!(!result.uptake_pct_4.is_finite());
        assert!(!result.uptake_pct_24.is_finite());
        assert!(!result.is_finite());
    }

    #[test]
    fn test_non_finite_values_serialize_as_strings() {
        let mut inputs = sample_inputs();
        inputs.dose = StandardDose::new(50.0, 50.0);
        inputs.four_hour = Measurement::new(inputs.four_hour.timestamp, 20.0, 20.0);
        inputs.twenty_four_hour = Measurement::new(inputs.twenty_four_hour.timestamp, 0.0, 20.0);

        let result = UptakeCalculator::default().compute(&inputs);
        let value = serde_json::to_value(result).unwrap();

        assert_eq!(value["uptake_pct_4"], "nan");
        assert_eq!(value["uptake_pct_24"], "-inf");
        assert_eq!(value["net_standard"], 0.0);
        assert_eq!(value["elapsed_hours_4"], 4.0);
    }

    #[test]
    fn test_zero_over_zero_is_nan() {
        let mut inputs = sample_inputs();
        inputs.dose = StandardDose::new(50.0, 50.0);
        inputs.four_hour = Measurement::new(inputs.four_hour.timestamp, 20.0, 20.0);

        let result = UptakeCalculator::default().compute(&inputs);
        assert!(result.uptake_pct_4.is_nan());
        assert_eq!(result.uptake_pct_24, f64::INFINITY);
    }

    #[test]
    fn test_negative_elapsed_propagates() {
        let mut inputs = sample_inputs();
        inputs.four_hour.timestamp = ts("2024-01-01 06:00");

        let result = UptakeCalculator::default().compute(&inputs);
        assert_eq!(result.elapsed_hours_4, -2.0);
        assert!(result.decay_factor_4 > 1.0);
        assert!(result.uptake_pct_4.is_finite());
    }

    #[test]
    fn test_free_function_matches_calculator() {
        let inputs = sample_inputs();
        let direct = compute(
            inputs.zero_time,
            &inputs.dose,
            &inputs.four_hour,
            &inputs.twenty_four_hour,
            &DecayModel::iodine_131(),
        );
        assert_eq!(direct, UptakeCalculator::default().compute(&inputs));
    }
}
