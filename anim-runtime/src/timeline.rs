//! # Timeline 模块
//!
//! 声明式时间线。
//!
//! 这些类型只负责序列化，加载后转换为 [`Sequence`] 或配方再交给管理器。
//! 闭包无法写进 JSON，所以这里没有 custom / trigger 步骤。
//!
//! ```json
//! {
//!   "timelines": [
//!     {
//!       "id": "intro",
//!       "steps": [
//!         { "step": "dissolve_in", "duration": 0.5 },
//!         { "step": "position", "to": [1.0, 0.0], "duration": 2.0, "progression": "linear" },
//!         { "step": "parallel", "steps": [
//!           { "step": "scale", "to": [2.0, 2.0] },
//!           { "step": "dim" }
//!         ] }
//!       ]
//!     }
//!   ]
//! }
//! ```

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::builder::{Chain, Sequence};
use crate::easing::EasingFunction;
use crate::error::AnimResult;
use crate::options::{FadeOptions, PulseOptions, TweenOptions};
use crate::recipe::RecipeBook;
use crate::step::StepTemplate;
use crate::steps;
use crate::value::{AnimValue, Rotation, RotationDirection, Transform};

/// 时间线文件
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimelineFile {
    #[serde(default)]
    pub timelines: Vec<TimelineDef>,
}

impl TimelineFile {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 每条时间线注册为同名配方
    pub fn recipes(&self) -> RecipeBook {
        let mut book = RecipeBook::new();
        for timeline in &self.timelines {
            let def = timeline.clone();
            book.define(timeline.id.clone(), move |seq| def.append_to(seq));
        }
        book
    }

    pub fn get(&self, id: &str) -> Option<&TimelineDef> {
        self.timelines.iter().find(|t| t.id == id)
    }
}

/// 一条时间线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineDef {
    /// 动画 ID
    pub id: String,
    #[serde(default)]
    pub steps: Vec<StepDef>,
    /// 被 cancel 时按 complete 处理
    #[serde(default)]
    pub complete_on_cancel: bool,
}

impl TimelineDef {
    pub fn to_sequence(&self) -> Sequence {
        self.append_to(Sequence::new())
    }

    /// 在已有序列后追加本时间线的步骤
    pub fn append_to(&self, sequence: Sequence) -> Sequence {
        let sequence = self
            .steps
            .iter()
            .fold(sequence, |seq, step| seq.then(step.to_step()));
        if self.complete_on_cancel {
            sequence.if_canceled_then_complete()
        } else {
            sequence
        }
    }

    /// 作为配方使用
    pub fn recipe(&self) -> impl Fn(Sequence) -> Sequence + 'static {
        let def = self.clone();
        move |seq| def.append_to(seq)
    }
}

/// 步骤描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepDef {
    Position(TweenDef<Vec2>),
    Position3(TweenDef<Vec3>),
    Scale(TweenDef<Vec2>),
    Rotation(TweenDef<Rotation>),
    Color(TweenDef<Vec4>),
    Opacity(TweenDef<f32>),
    Transform(TweenDef<Transform>),
    DissolveIn(FadeDef),
    DissolveOut(FadeDef),
    Dim(FadeDef),
    Undim(FadeDef),
    Pulse(PulseDef),
    Delay { duration: f32 },
    Parallel { steps: Vec<StepDef> },
    Serial { steps: Vec<StepDef> },
}

impl StepDef {
    /// 转换为步骤模板，校验规则与工厂函数相同
    pub fn to_step(&self) -> AnimResult<StepTemplate> {
        match self {
            StepDef::Position(def) => steps::position(def.to_options()),
            StepDef::Position3(def) => steps::position3(def.to_options()),
            StepDef::Scale(def) => steps::scale(def.to_options()),
            StepDef::Rotation(def) => steps::rotation(def.to_options()),
            StepDef::Color(def) => steps::color(def.to_options()),
            StepDef::Opacity(def) => steps::opacity(def.to_options()),
            StepDef::Transform(def) => steps::transform(def.to_options()),
            StepDef::DissolveIn(def) => steps::dissolve_in(def.to_options()),
            StepDef::DissolveOut(def) => steps::dissolve_out(def.to_options()),
            StepDef::Dim(def) => steps::dim(def.to_options()),
            StepDef::Undim(def) => steps::undim(def.to_options()),
            StepDef::Pulse(def) => steps::pulse(def.to_options()),
            StepDef::Delay { duration } => steps::delay(*duration),
            StepDef::Parallel { steps: children } => {
                steps::parallel(children.iter().map(StepDef::to_step))
            }
            StepDef::Serial { steps: children } => steps::serial(children.iter().map(StepDef::to_step)),
        }
    }
}

/// 补间描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweenDef<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progression: Option<EasingFunction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_percent: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<RotationDirection>,
    /// 开始延时（秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete_on_cancel: Option<bool>,
}

impl<T: AnimValue + Copy> TweenDef<T> {
    fn to_options(&self) -> TweenOptions<T> {
        let mut options = TweenOptions::new();
        if let Some(target) = self.to {
            options = options.to(target);
        }
        if let Some(delta) = self.by {
            options = options.by(delta);
        }
        if let Some(start) = self.from {
            options = options.starting_at(start);
        }
        if let Some(duration) = self.duration {
            options = options.duration(duration);
        }
        if let Some(velocity) = self.velocity {
            options = options.velocity(velocity);
        }
        if let Some(max) = self.max_duration {
            options = options.max_duration(max);
        }
        if let Some(easing) = self.progression {
            options = options.progression(easing);
        }
        if let Some(percent) = self.start_percent {
            options = options.start_percent(percent);
        }
        if let Some(direction) = self.direction {
            options = options.direction(direction);
        }
        if let Some(delay) = self.delay {
            options = options.delay(delay);
        }
        if let Some(complete) = self.complete_on_cancel {
            options = options.complete_on_cancel(complete);
        }
        options
    }
}

/// 淡入淡出 / 变暗描述
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FadeDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progression: Option<EasingFunction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_on_cancel: Option<bool>,
}

impl FadeDef {
    fn to_options(self) -> FadeOptions {
        let mut options = FadeOptions::new();
        if let Some(duration) = self.duration {
            options = options.duration(duration);
        }
        if let Some(easing) = self.progression {
            options = options.progression(easing);
        }
        if let Some(delay) = self.delay {
            options = options.delay(delay);
        }
        if let Some(complete) = self.complete_on_cancel {
            options = options.complete_on_cancel(complete);
        }
        options
    }
}

/// 脉冲描述
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PulseDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycles: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_on_cancel: Option<bool>,
}

impl PulseDef {
    fn to_options(self) -> PulseOptions {
        let mut options = PulseOptions::new();
        if let Some(scale) = self.scale {
            options = options.scale(scale);
        }
        if let Some(duration) = self.duration {
            options = options.duration(duration);
        }
        if let Some(cycles) = self.cycles {
            options = options.cycles(cycles);
        }
        if let Some(opacity) = self.opacity {
            options = options.opacity(opacity);
        }
        if let Some(delay) = self.delay {
            options = options.delay(delay);
        }
        if let Some(complete) = self.complete_on_cancel {
            options = options.complete_on_cancel(complete);
        }
        options
    }
}
