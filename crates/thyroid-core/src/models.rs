//! 核心数据模型定义

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 测量时间点
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimePoint {
    Zero,           // 零时（标准源）
    FourHour,       // 4小时
    TwentyFourHour, // 24小时
}

impl TimePoint {
    /// 获取时间点的显示名称
    pub fn label(&self) -> &'static str {
        match self {
            TimePoint::Zero => "Zero Hour",
            TimePoint::FourHour => "4 Hour",
            TimePoint::TwentyFourHour => "24 Hour",
        }
    }

    /// 相对零时的名义间隔（小时）
    pub fn nominal_hours(&self) -> i64 {
        match self {
            TimePoint::Zero => 0,
            TimePoint::FourHour => 4,
            TimePoint::TwentyFourHour => 24,
        }
    }
}

impl std::fmt::Display for TimePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 颈部计数测量
///
/// `background_count` 是同一时刻的大腿参考计数，不是室内本底。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Measurement {
    pub timestamp: NaiveDateTime,
    pub neck_count: f64,       // cpm
    pub background_count: f64, // cpm
}

impl Measurement {
    pub fn new(timestamp: NaiveDateTime, neck_count: f64, background_count: f64) -> Self {
        Self {
            timestamp,
            neck_count,
            background_count,
        }
    }

    /// 净颈部计数
    pub fn net(&self) -> f64 {
        self.neck_count - self.background_count
    }
}

/// 零时标准源（体模）计数
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StandardDose {
    pub phantom_count: f64,    // cpm
    pub background_count: f64, // cpm
}

impl StandardDose {
    pub fn new(phantom_count: f64, background_count: f64) -> Self {
        Self {
            phantom_count,
            background_count,
        }
    }

    /// 净标准计数
    pub fn net(&self) -> f64 {
        self.phantom_count - self.background_count
    }
}

/// 一次摄碘率检查的全部输入
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StudyInputs {
    pub zero_time: NaiveDateTime,
    pub dose: StandardDose,
    pub four_hour: Measurement,
    pub twenty_four_hour: Measurement,
}

impl StudyInputs {
    /// 获取指定时间点的时间戳
    pub fn timestamp(&self, point: TimePoint) -> NaiveDateTime {
        match point {
            TimePoint::Zero => self.zero_time,
            TimePoint::FourHour => self.four_hour.timestamp,
            TimePoint::TwentyFourHour => self.twenty_four_hour.timestamp,
        }
    }
}

/// 患者基本信息
///
/// 仅用于工作单显示，不参与计算。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientInfo {
    pub name: Option<String>,
    pub mrn: Option<String>, // 病历号
    pub dob: Option<String>, // 出生日期
    pub sex: Option<String>,
    pub referring_physician: Option<String>,
}

impl PatientInfo {
    /// 按工作单顺序返回标签和值
    pub fn fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("Patient Name", self.name.as_deref()),
            ("MRN", self.mrn.as_deref()),
            ("DOB", self.dob.as_deref()),
            ("SEX", self.sex.as_deref()),
            ("Referring Physician", self.referring_physician.as_deref()),
        ]
    }

    /// 去除空白后为空的字段视为未填写
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            name: clean(self.name),
            mrn: clean(self.mrn),
            dob: clean(self.dob),
            sex: clean(self.sex),
            referring_physician: clean(self.referring_physician),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_net_counts() {
        assert_eq!(StandardDose::new(50000.0, 50.0).net(), 49950.0);
        assert_eq!(Measurement::new(at(12), 6000.0, 20.0).net(), 5980.0);
        assert_eq!(Measurement::new(at(12), 10.0, 30.0).net(), -20.0);
    }

    #[test]
    fn test_patient_fields_order() {
        let patient = PatientInfo {
            name: Some("Doe, Jane".to_string()),
            mrn: Some("123456".to_string()),
            ..Default::default()
        };

        let labels: Vec<_> = patient.fields().iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            vec!["Patient Name", "MRN", "DOB", "SEX", "Referring Physician"]
        );
        assert_eq!(patient.fields()[1].1, Some("123456"));
        assert_eq!(patient.fields()[2].1, None);
    }

    #[test]
    fn test_patient_normalized() {
        let patient = PatientInfo {
            name: Some("  ".to_string()),
            sex: Some(" F ".to_string()),
            ..Default::default()
        }
        .normalized();

        assert_eq!(patient.name, None);
        assert_eq!(patient.sex.as_deref(), Some("F"));
    }

    #[test]
    fn test_study_timestamp_lookup() {
        let inputs = StudyInputs {
            zero_time: at(8),
            dose: StandardDose::new(50000.0, 50.0),
            four_hour: Measurement::new(at(12), 0.0, 0.0),
            twenty_four_hour: Measurement::new(at(20), 0.0, 0.0),
        };

        assert_eq!(inputs.timestamp(TimePoint::Zero), at(8));
        assert_eq!(inputs.timestamp(TimePoint::FourHour), at(12));
        assert_eq!(inputs.timestamp(TimePoint::TwentyFourHour), at(20));
    }
}
