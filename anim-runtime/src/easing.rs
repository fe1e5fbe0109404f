//! # Easing 模块
//!
//! 进度曲线（progression）库：把 `[0, 1]` 的时间进度映射为表观进度。
//!
//! - [`EasingFunction`]：具名缓动函数，可序列化
//! - [`Progression`]：步骤实际使用的曲线，具名 / 脉冲 / 自定义闭包

use std::f32::consts::PI;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// 线性（匀速）
    Linear,
    /// 缓入（先慢后快）
    #[serde(alias = "easein")]
    EaseIn,
    /// 缓出（先快后慢）
    #[serde(alias = "easeout")]
    EaseOut,
    /// 缓入缓出（两头慢中间快）
    #[default]
    #[serde(alias = "easeinout")]
    EaseInOut,
    /// 二次缓入
    EaseInQuad,
    /// 二次缓出
    EaseOutQuad,
    /// 二次缓入缓出
    EaseInOutQuad,
    /// 三次缓入
    EaseInCubic,
    /// 三次缓出
    EaseOutCubic,
    /// 三次缓入缓出
    EaseInOutCubic,
    /// 正弦缓入
    EaseInSine,
    /// 正弦缓出
    EaseOutSine,
    /// 正弦缓入缓出
    EaseInOutSine,
    /// 弹性缓出
    EaseOutElastic,
    /// 弹跳缓出
    EaseOutBounce,
}

impl EasingFunction {
    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)
    ///
    /// # 返回
    /// - 缓动后的进度值 (0.0 - 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseIn | EasingFunction::EaseInCubic => t * t * t,
            EasingFunction::EaseOut | EasingFunction::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingFunction::EaseInOut | EasingFunction::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingFunction::EaseInQuad => t * t,
            EasingFunction::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingFunction::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            EasingFunction::EaseOutSine => (t * PI / 2.0).sin(),
            EasingFunction::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            EasingFunction::EaseOutElastic => ease_out_elastic(t),
            EasingFunction::EaseOutBounce => ease_out_bounce(t),
        }
    }

    /// 按名称查找（兼容 `easeinout` / `ease_in_out` 两种写法）
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        let easing = match normalized.as_str() {
            "linear" => Self::Linear,
            "easein" => Self::EaseIn,
            "easeout" => Self::EaseOut,
            "easeinout" => Self::EaseInOut,
            "easeinquad" => Self::EaseInQuad,
            "easeoutquad" => Self::EaseOutQuad,
            "easeinoutquad" => Self::EaseInOutQuad,
            "easeincubic" => Self::EaseInCubic,
            "easeoutcubic" => Self::EaseOutCubic,
            "easeinoutcubic" => Self::EaseInOutCubic,
            "easeinsine" => Self::EaseInSine,
            "easeoutsine" => Self::EaseOutSine,
            "easeinoutsine" => Self::EaseInOutSine,
            "easeoutelastic" => Self::EaseOutElastic,
            "easeoutbounce" => Self::EaseOutBounce,
            _ => return None,
        };
        Some(easing)
    }
}

/// 弹性缓出
fn ease_out_elastic(t: f32) -> f32 {
    if t == 0.0 {
        0.0
    } else if t == 1.0 {
        1.0
    } else {
        let c4 = (2.0 * PI) / 3.0;
        2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
    }
}

/// 弹跳缓出
fn ease_out_bounce(t: f32) -> f32 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

/// 步骤使用的进度曲线
///
/// 具名曲线满足 `f(0) = 0, f(1) = 1`；`Pulse` 是例外，它在 `t = 1` 时回到 0，
/// 用于"放大再还原"这类往返效果。
#[derive(Clone)]
pub enum Progression {
    /// 具名缓动
    Easing(EasingFunction),
    /// 往返脉冲：`(1 - cos(2π·cycles·t)) / 2`
    Pulse { cycles: f32 },
    /// 自定义曲线
    Custom(Rc<dyn Fn(f32) -> f32>),
}

impl Progression {
    /// 线性
    pub fn linear() -> Self {
        Self::Easing(EasingFunction::Linear)
    }

    /// 自定义曲线
    pub fn custom(f: impl Fn(f32) -> f32 + 'static) -> Self {
        Self::Custom(Rc::new(f))
    }

    /// 按名称查找具名曲线
    pub fn named(name: &str) -> Option<Self> {
        EasingFunction::from_name(name).map(Self::Easing)
    }

    /// 计算表观进度
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Easing(easing) => {
                if t >= 1.0 {
                    1.0
                } else {
                    easing.apply(t)
                }
            }
            Self::Pulse { cycles } => {
                // 整数圈在终点精确回到 0
                if t >= 1.0 && cycles.fract() == 0.0 {
                    0.0
                } else {
                    (1.0 - (2.0 * PI * cycles * t).cos()) / 2.0
                }
            }
            Self::Custom(f) => f(t),
        }
    }

    /// 反查：找到 `t` 使 `apply(t) ≈ percent`
    ///
    /// 对单调曲线是精确反函数；非单调曲线返回二分得到的某个解。
    pub fn invert(&self, percent: f32) -> f32 {
        let percent = percent.clamp(0.0, 1.0);
        if let Self::Easing(EasingFunction::Linear) = self {
            return percent;
        }

        let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
        for _ in 0..40 {
            let mid = (lo + hi) * 0.5;
            if self.apply(mid) < percent {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        (lo + hi) * 0.5
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self::Easing(EasingFunction::default())
    }
}

impl From<EasingFunction> for Progression {
    fn from(easing: EasingFunction) -> Self {
        Self::Easing(easing)
    }
}

impl fmt::Debug for Progression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easing(easing) => write!(f, "Easing({easing:?})"),
            Self::Pulse { cycles } => write!(f, "Pulse({cycles})"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear() {
        let easing = EasingFunction::Linear;
        assert_eq!(easing.apply(0.0), 0.0);
        assert_eq!(easing.apply(0.5), 0.5);
        assert_eq!(easing.apply(1.0), 1.0);
    }

    #[test]
    fn test_ease_in_out() {
        let easing = EasingFunction::EaseInOut;
        assert_eq!(easing.apply(0.0), 0.0);
        assert_eq!(easing.apply(1.0), 1.0);
        // 中点应该是 0.5
        let mid = easing.apply(0.5);
        assert!((mid - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_clamp() {
        let easing = EasingFunction::Linear;
        assert_eq!(easing.apply(-0.5), 0.0);
        assert_eq!(easing.apply(1.5), 1.0);
    }

    #[test]
    fn test_progression_end_is_exact() {
        // 弹跳曲线在 t=1 处有浮点误差，Progression 必须精确落到 1
        let progression = Progression::Easing(EasingFunction::EaseOutBounce);
        assert_eq!(progression.apply(1.0), 1.0);
        assert_eq!(progression.apply(2.0), 1.0);
    }

    #[test]
    fn test_pulse_returns_to_rest() {
        let pulse = Progression::Pulse { cycles: 1.0 };
        assert_eq!(pulse.apply(0.0), 0.0);
        assert!((pulse.apply(0.5) - 1.0).abs() < 1e-6);
        assert!(pulse.apply(1.0).abs() < 1e-6);
    }

    #[test]
    fn test_invert() {
        let linear = Progression::linear();
        assert_eq!(linear.invert(0.3), 0.3);

        for easing in [
            EasingFunction::EaseIn,
            EasingFunction::EaseOut,
            EasingFunction::EaseInOut,
            EasingFunction::EaseInOutSine,
        ] {
            let progression = Progression::Easing(easing);
            for p in [0.1, 0.25, 0.5, 0.9] {
                let t = progression.invert(p);
                assert!((progression.apply(t) - p).abs() < 1e-4, "{easing:?} @ {p}");
            }
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(EasingFunction::from_name("easeinout"), Some(EasingFunction::EaseInOut));
        assert_eq!(EasingFunction::from_name("ease_in_out"), Some(EasingFunction::EaseInOut));
        assert_eq!(EasingFunction::from_name("linear"), Some(EasingFunction::Linear));
        assert_eq!(EasingFunction::from_name("wobble"), None);
    }

    #[test]
    fn test_serde_alias() {
        let easing: EasingFunction = serde_json::from_str("\"easeinout\"").unwrap();
        assert_eq!(easing, EasingFunction::EaseInOut);
        let easing: EasingFunction = serde_json::from_str("\"ease_out_quad\"").unwrap();
        assert_eq!(easing, EasingFunction::EaseOutQuad);
    }
}
