//! # Options 模块
//!
//! 各类步骤的配置记录。
//!
//! 构造器方法接受 `impl Into<XxxOptions>`，数字、数组、元组、向量和完整配置
//! 在这里统一归一成一种记录，调度核心只看到归一后的结果。
//!
//! ```rust,ignore
//! // 以下写法等价
//! seq.position((1.0, 1.0));
//! seq.position([1.0, 1.0]);
//! seq.position(Vec2::ONE);
//! seq.position(TweenOptions::new().to(Vec2::ONE));
//! ```
//!
//! 补间、淡入淡出、脉冲和自定义步骤都支持 `delay`：步骤开始前先等待这么久。

use std::fmt;

use glam::{Vec2, Vec3, Vec4};

use crate::easing::Progression;
use crate::error::CallbackError;
use crate::step::{CustomCallback, FinishCallback, TriggerCallback, infallible_finish};
use crate::value::{AnimValue, Rotation, RotationDirection};

// ========== 补间 ==========

/// 补间配置
pub struct TweenOptions<T: AnimValue> {
    pub(crate) target: Option<T>,
    pub(crate) delta: Option<T>,
    pub(crate) from: Option<T>,
    pub(crate) duration: Option<f32>,
    pub(crate) velocity: Option<f32>,
    pub(crate) max_duration: Option<f32>,
    pub(crate) progression: Option<Progression>,
    pub(crate) start_percent: Option<f32>,
    pub(crate) direction: RotationDirection,
    pub(crate) delay: f32,
    pub(crate) on_finish: Option<FinishCallback>,
    pub(crate) complete_on_cancel: Option<bool>,
}

impl<T: AnimValue> Default for TweenOptions<T> {
    fn default() -> Self {
        Self {
            target: None,
            delta: None,
            from: None,
            duration: None,
            velocity: None,
            max_duration: None,
            progression: None,
            start_percent: None,
            direction: RotationDirection::Unspecified,
            delay: 0.0,
            on_finish: None,
            complete_on_cancel: None,
        }
    }
}

impl<T: AnimValue> TweenOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 绝对终点
    pub fn to(mut self, target: impl Into<T>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// 相对起点的增量（同时给出 `to` 时以 `to` 为准）
    pub fn by(mut self, delta: impl Into<T>) -> Self {
        self.delta = Some(delta.into());
        self
    }

    /// 显式起点，不设置时开始时从目标读取
    pub fn starting_at(mut self, start: impl Into<T>) -> Self {
        self.from = Some(start.into());
        self
    }

    /// 时长（秒）
    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// 速度（每秒变化量），设置后时长由变化量推导
    pub fn velocity(mut self, velocity: f32) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// 推导时长的上限
    pub fn max_duration(mut self, seconds: f32) -> Self {
        self.max_duration = Some(seconds);
        self
    }

    pub fn progression(mut self, progression: impl Into<Progression>) -> Self {
        self.progression = Some(progression.into());
        self
    }

    /// 从曲线的某个进度开始
    pub fn start_percent(mut self, percent: f32) -> Self {
        self.start_percent = Some(percent);
        self
    }

    /// 平面旋转方向
    pub fn direction(mut self, direction: RotationDirection) -> Self {
        self.direction = direction;
        self
    }

    /// 开始前等待的时间；起点在等待结束时读取
    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    pub fn on_finish(mut self, callback: impl FnMut(bool) + 'static) -> Self {
        self.on_finish = Some(infallible_finish(callback));
        self
    }

    pub fn try_on_finish(
        mut self,
        callback: impl FnMut(bool) -> Result<(), CallbackError> + 'static,
    ) -> Self {
        self.on_finish = Some(Box::new(callback));
        self
    }

    pub fn complete_on_cancel(mut self, complete: bool) -> Self {
        self.complete_on_cancel = Some(complete);
        self
    }
}

impl<T: AnimValue + fmt::Debug> fmt::Debug for TweenOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenOptions")
            .field("target", &self.target)
            .field("delta", &self.delta)
            .field("from", &self.from)
            .field("duration", &self.duration)
            .field("velocity", &self.velocity)
            .field("progression", &self.progression)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl<T: AnimValue> From<T> for TweenOptions<T> {
    fn from(target: T) -> Self {
        Self::new().to(target)
    }
}

impl From<[f32; 2]> for TweenOptions<Vec2> {
    fn from(target: [f32; 2]) -> Self {
        Self::new().to(target)
    }
}

impl From<(f32, f32)> for TweenOptions<Vec2> {
    fn from(target: (f32, f32)) -> Self {
        Self::new().to(target)
    }
}

/// 单个数字同时作用于两个分量
impl From<f32> for TweenOptions<Vec2> {
    fn from(target: f32) -> Self {
        Self::new().to(Vec2::splat(target))
    }
}

impl From<[f32; 3]> for TweenOptions<Vec3> {
    fn from(target: [f32; 3]) -> Self {
        Self::new().to(target)
    }
}

impl From<(f32, f32, f32)> for TweenOptions<Vec3> {
    fn from(target: (f32, f32, f32)) -> Self {
        Self::new().to(target)
    }
}

impl From<[f32; 4]> for TweenOptions<Vec4> {
    fn from(target: [f32; 4]) -> Self {
        Self::new().to(target)
    }
}

impl From<f32> for TweenOptions<Rotation> {
    fn from(angle: f32) -> Self {
        Self::new().to(Rotation::angle(angle))
    }
}

// ========== 淡入淡出 / 变暗 ==========

/// dissolveIn / dissolveOut / dim / undim 的配置
#[derive(Default)]
pub struct FadeOptions {
    pub(crate) duration: Option<f32>,
    pub(crate) progression: Option<Progression>,
    pub(crate) delay: f32,
    pub(crate) on_finish: Option<FinishCallback>,
    pub(crate) complete_on_cancel: Option<bool>,
}

impl FadeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn progression(mut self, progression: impl Into<Progression>) -> Self {
        self.progression = Some(progression.into());
        self
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    pub fn on_finish(mut self, callback: impl FnMut(bool) + 'static) -> Self {
        self.on_finish = Some(infallible_finish(callback));
        self
    }

    pub fn complete_on_cancel(mut self, complete: bool) -> Self {
        self.complete_on_cancel = Some(complete);
        self
    }
}

/// 单个数字表示时长
impl From<f32> for FadeOptions {
    fn from(seconds: f32) -> Self {
        Self::new().duration(seconds)
    }
}

impl fmt::Debug for FadeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FadeOptions")
            .field("duration", &self.duration)
            .field("progression", &self.progression)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

// ========== 脉冲 ==========

/// 脉冲配置
pub struct PulseOptions {
    pub(crate) scale: f32,
    pub(crate) duration: f32,
    pub(crate) cycles: f32,
    pub(crate) opacity: Option<f32>,
    pub(crate) delay: f32,
    pub(crate) on_finish: Option<FinishCallback>,
    pub(crate) complete_on_cancel: Option<bool>,
}

impl Default for PulseOptions {
    fn default() -> Self {
        Self {
            scale: 1.5,
            duration: 1.0,
            cycles: 1.0,
            opacity: None,
            delay: 0.0,
            on_finish: None,
            complete_on_cancel: None,
        }
    }
}

impl PulseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 峰值缩放倍数
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    /// 往返次数
    pub fn cycles(mut self, cycles: f32) -> Self {
        self.cycles = cycles;
        self
    }

    /// 峰值不透明度
    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    pub fn on_finish(mut self, callback: impl FnMut(bool) + 'static) -> Self {
        self.on_finish = Some(infallible_finish(callback));
        self
    }

    pub fn complete_on_cancel(mut self, complete: bool) -> Self {
        self.complete_on_cancel = Some(complete);
        self
    }
}

/// 单个数字表示峰值缩放
impl From<f32> for PulseOptions {
    fn from(scale: f32) -> Self {
        Self::new().scale(scale)
    }
}

impl fmt::Debug for PulseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PulseOptions")
            .field("scale", &self.scale)
            .field("duration", &self.duration)
            .field("cycles", &self.cycles)
            .field("opacity", &self.opacity)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

// ========== 自定义 / 触发 ==========

/// 自定义步骤配置
pub struct CustomOptions {
    pub(crate) callback: CustomCallback,
    /// `None` 表示无限时长
    pub(crate) duration: Option<f32>,
    pub(crate) progression: Option<Progression>,
    pub(crate) start_percent: Option<f32>,
    pub(crate) delay: f32,
    pub(crate) on_finish: Option<FinishCallback>,
    pub(crate) complete_on_cancel: Option<bool>,
}

impl CustomOptions {
    /// 默认时长 1 秒，回调返回 `true` 时提前结束
    pub fn new(mut callback: impl FnMut(f32) -> bool + 'static) -> Self {
        Self::fallible(move |value| Ok(callback(value)))
    }

    /// 回调可以返回错误，错误会从 `next_frame` 传给调用方
    pub fn fallible(callback: impl FnMut(f32) -> Result<bool, CallbackError> + 'static) -> Self {
        Self {
            callback: Box::new(callback),
            duration: Some(1.0),
            progression: None,
            start_percent: None,
            delay: 0.0,
            on_finish: None,
            complete_on_cancel: None,
        }
    }

    /// 有限时长，回调收到经过曲线映射的进度
    ///
    /// 传入 `f32::INFINITY` 等价于 [`CustomOptions::infinite`]。
    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = if seconds.is_infinite() && seconds > 0.0 {
            None
        } else {
            Some(seconds)
        };
        self
    }

    /// 无限时长，回调收到步骤开始以来的秒数
    pub fn infinite(mut self) -> Self {
        self.duration = None;
        self
    }

    pub fn progression(mut self, progression: impl Into<Progression>) -> Self {
        self.progression = Some(progression.into());
        self
    }

    pub fn start_percent(mut self, percent: f32) -> Self {
        self.start_percent = Some(percent);
        self
    }

    /// 开始前等待的时间，等待期间回调不会被调用
    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    pub fn on_finish(mut self, callback: impl FnMut(bool) + 'static) -> Self {
        self.on_finish = Some(infallible_finish(callback));
        self
    }

    pub fn complete_on_cancel(mut self, complete: bool) -> Self {
        self.complete_on_cancel = Some(complete);
        self
    }
}

impl fmt::Debug for CustomOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomOptions")
            .field("duration", &self.duration)
            .field("progression", &self.progression)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// 触发步骤配置
pub struct TriggerOptions {
    pub(crate) callback: TriggerCallback,
    pub(crate) delay: f32,
    pub(crate) duration: f32,
    pub(crate) on_finish: Option<FinishCallback>,
    pub(crate) complete_on_cancel: Option<bool>,
}

impl TriggerOptions {
    pub fn new(mut callback: impl FnMut() + 'static) -> Self {
        Self::fallible(move || {
            callback();
            Ok(())
        })
    }

    pub fn fallible(callback: impl FnMut() -> Result<(), CallbackError> + 'static) -> Self {
        Self {
            callback: Box::new(callback),
            delay: 0.0,
            duration: 0.0,
            on_finish: None,
            complete_on_cancel: None,
        }
    }

    /// 触发前等待的时间
    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    /// 触发后保持的时间
    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn on_finish(mut self, callback: impl FnMut(bool) + 'static) -> Self {
        self.on_finish = Some(infallible_finish(callback));
        self
    }

    pub fn complete_on_cancel(mut self, complete: bool) -> Self {
        self.complete_on_cancel = Some(complete);
        self
    }
}

impl fmt::Debug for TriggerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerOptions")
            .field("delay", &self.delay)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}
