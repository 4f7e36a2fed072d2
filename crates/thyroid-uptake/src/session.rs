//! 检查会话
//!
//! 保存输入表单的可变状态。计算器本身无状态，只接收会话导出的输入。
//! 当前时间一律由调用方传入。

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thyroid_core::{
    Measurement, PatientInfo, Result, StandardDose, StudyInputs, ThyroidError, TimePoint,
};
use tracing::debug;

/// 会话默认值
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionDefaults {
    /// 体模中的标准源计数 (cpm)
    pub phantom_count: f64,
    /// 零时本底计数 (cpm)
    pub background_count: f64,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            phantom_count: 50000.0,
            background_count: 50.0,
        }
    }
}

/// 检查会话
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySession {
    zero_time: NaiveDateTime,
    four_hour_time: NaiveDateTime,
    twenty_four_hour_time: NaiveDateTime,
    dose: StandardDose,
    neck_4: f64,
    thigh_4: f64,
    neck_24: f64,
    thigh_24: f64,
    patient: PatientInfo,
    defaults: SessionDefaults,
}

impl StudySession {
    /// 以 `now` 为零时创建新的会话
    ///
    /// 默认测量时间超出可表示范围时返回 `InvalidTimestamp`。
    pub fn new(now: NaiveDateTime, defaults: SessionDefaults) -> Result<Self> {
        Ok(Self {
            zero_time: now,
            four_hour_time: Self::default_time(TimePoint::FourHour, now)?,
            twenty_four_hour_time: Self::default_time(TimePoint::TwentyFourHour, now)?,
            dose: StandardDose::new(defaults.phantom_count, defaults.background_count),
            neck_4: 0.0,
            thigh_4: 0.0,
            neck_24: 0.0,
            thigh_24: 0.0,
            patient: PatientInfo::default(),
            defaults,
        })
    }

    fn default_time(point: TimePoint, now: NaiveDateTime) -> Result<NaiveDateTime> {
        now.checked_add_signed(Duration::hours(point.nominal_hours()))
            .ok_or_else(|| {
                ThyroidError::InvalidTimestamp(format!("{} 之后 {} 超出范围", now, point))
            })
    }

    /// 将指定时间点设为当前时间
    pub fn set_now(&mut self, point: TimePoint, now: NaiveDateTime) {
        self.set_timestamp(point, now);
    }

    pub fn set_timestamp(&mut self, point: TimePoint, timestamp: NaiveDateTime) {
        debug!("Session {} set to {}", point, timestamp);
        match point {
            TimePoint::Zero => self.zero_time = timestamp,
            TimePoint::FourHour => self.four_hour_time = timestamp,
            TimePoint::TwentyFourHour => self.twenty_four_hour_time = timestamp,
        }
    }

    pub fn timestamp(&self, point: TimePoint) -> NaiveDateTime {
        match point {
            TimePoint::Zero => self.zero_time,
            TimePoint::FourHour => self.four_hour_time,
            TimePoint::TwentyFourHour => self.twenty_four_hour_time,
        }
    }

    /// 设置零时标准源计数
    pub fn set_standard(&mut self, phantom_count: f64, background_count: f64) {
        self.dose = StandardDose::new(phantom_count, background_count);
    }

    /// 设置颈部和大腿计数
    ///
    /// 零时没有颈部测量，传入 `TimePoint::Zero` 返回错误。
    pub fn set_counts(&mut self, point: TimePoint, neck_count: f64, thigh_count: f64) -> Result<()> {
        match point {
            TimePoint::Zero => {
                return Err(ThyroidError::Validation(
                    "零时只记录标准源计数".to_string(),
                ))
            }
            TimePoint::FourHour => {
                self.neck_4 = neck_count;
                self.thigh_4 = thigh_count;
            }
            TimePoint::TwentyFourHour => {
                self.neck_24 = neck_count;
                self.thigh_24 = thigh_count;
            }
        }
        Ok(())
    }

    pub fn set_patient(&mut self, patient: PatientInfo) {
        self.patient = patient.normalized();
    }

    pub fn patient(&self) -> &PatientInfo {
        &self.patient
    }

    /// 全部清除，恢复以 `now` 为零时的默认值
    pub fn clear_all(&mut self, now: NaiveDateTime) -> Result<()> {
        debug!("Session cleared at {}", now);
        *self = Self::new(now, self.defaults)?;
        Ok(())
    }

    /// 导出计算输入
    pub fn inputs(&self) -> StudyInputs {
        StudyInputs {
            zero_time: self.zero_time,
            dose: self.dose,
            four_hour: Measurement::new(self.four_hour_time, self.neck_4, self.thigh_4),
            twenty_four_hour: Measurement::new(
                self.twenty_four_hour_time,
                self.neck_24,
                self.thigh_24,
            ),
        }
    }
}
