//! # 甲状腺摄碘率计算模块
//!
//! 提供I-131衰变校正与摄碘率计算，包括：
//! - 衰变模型：按物理半衰期计算衰变校正因子
//! - 摄碘率计算：由三个时间点的计数得到4小时和24小时摄碘率
//! - 结果报告：固定格式的文本报告
//! - 参考范围与建议性输入验证
//! - 检查会话：保存表单状态（默认值、“设为当前时间”、“全部清除”）

pub mod calculator;
pub mod decay;
pub mod reference;
pub mod report;
pub mod session;
pub mod validator;

// 重新导出主要类型
pub use calculator::{compute, UptakeCalculator, UptakeResult};
pub use decay::{DecayModel, I131_HALF_LIFE_HOURS};
pub use reference::{RangeStatus, ReferenceRange, UptakeInterpretation};
pub use report::{format_report, NORMAL_RANGE_NOTE, REPORT_TITLE};
pub use session::{SessionDefaults, StudySession};
pub use validator::{StudyValidator, ValidationResult};
