//! 放射性衰变模型

use serde::Serialize;

/// I-131 物理半衰期（小时）
pub const I131_HALF_LIFE_HOURS: f64 = 13.2235;

/// 指数衰变模型
///
/// 衰变校正因子为 `e^(-λt)`，其中 `λ = ln(2) / 半衰期`。
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct DecayModel {
    half_life_hours: f64,
    decay_constant: f64,
}

impl DecayModel {
    /// 创建I-131衰变模型
    pub fn iodine_131() -> Self {
        Self {
            half_life_hours: I131_HALF_LIFE_HOURS,
            decay_constant: std::f64::consts::LN_2 / I131_HALF_LIFE_HOURS,
        }
    }

    pub fn half_life_hours(&self) -> f64 {
        self.half_life_hours
    }

    /// 衰变常数 λ（每小时）
    pub fn decay_constant(&self) -> f64 {
        self.decay_constant
    }

    /// 经过 `elapsed_hours` 小时后的衰变因子
    ///
    /// 负的时间间隔同样有效，结果大于1。
    pub fn decay_factor(&self, elapsed_hours: f64) -> f64 {
        (-self.decay_constant * elapsed_hours).exp()
    }
}

impl Default for DecayModel {
    fn default() -> Self {
        Self::iodine_131()
    }
}
