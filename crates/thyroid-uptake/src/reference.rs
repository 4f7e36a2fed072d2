//! 摄碘率参考范围

use crate::calculator::UptakeResult;
use serde::{Deserialize, Serialize};
use thyroid_core::TimePoint;

/// 参考范围判定
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RangeStatus {
    Low,           // 低于参考范围
    Normal,        // 参考范围内
    High,          // 高于参考范围
    Indeterminate, // 非有限值，无法判定
}

/// 摄碘率参考范围（百分比，闭区间）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReferenceRange {
    pub low: f64,
    pub high: f64,
}

impl ReferenceRange {
    /// 4小时参考范围 5-20%
    pub const FOUR_HOUR: ReferenceRange = ReferenceRange { low: 5.0, high: 20.0 };
    /// 24小时参考范围 15-35%
    pub const TWENTY_FOUR_HOUR: ReferenceRange = ReferenceRange { low: 15.0, high: 35.0 };

    /// 获取时间点的参考范围
    pub fn for_time_point(point: TimePoint) -> Option<ReferenceRange> {
        match point {
            TimePoint::Zero => None,
            TimePoint::FourHour => Some(Self::FOUR_HOUR),
            TimePoint::TwentyFourHour => Some(Self::TWENTY_FOUR_HOUR),
        }
    }

    pub fn classify(&self, uptake_pct: f64) -> RangeStatus {
        if !uptake_pct.is_finite() {
            RangeStatus::Indeterminate
        } else if uptake_pct < self.low {
            RangeStatus::Low
        } else if uptake_pct > self.high {
            RangeStatus::High
        } else {
            RangeStatus::Normal
        }
    }
}

/// 两个时间点的参考范围判定
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UptakeInterpretation {
    pub four_hour: RangeStatus,
    pub twenty_four_hour: RangeStatus,
}

impl UptakeInterpretation {
    pub fn from_result(result: &UptakeResult) -> Self {
        Self {
            four_hour: ReferenceRange::FOUR_HOUR.classify(result.uptake_pct_4),
            twenty_four_hour: ReferenceRange::TWENTY_FOUR_HOUR.classify(result.uptake_pct_24),
        }
    }

    pub fn is_normal(&self) -> bool {
        self.four_hour == RangeStatus::Normal && self.twenty_four_hour == RangeStatus::Normal
    }
}
