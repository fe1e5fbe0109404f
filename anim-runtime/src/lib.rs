//! # Anim Runtime
//!
//! 时间驱动的动画调度引擎。
//!
//! ## 架构概述
//!
//! `anim-runtime` 是纯逻辑核心，不依赖渲染或窗口。
//! 它只负责把"在一段时间内改变某个值"的描述变成每帧对目标属性的写入：
//!
//! ```text
//! Driver                        AnimationManager                 Target
//!   │                                 │                             │
//!   │──── next_frame(dt) ───────────►│                             │
//!   │                                 │── get_value / set_value ──►│
//!   │◄─── Vec<AnimationEvent> ────────│                             │
//!   │                                 │                             │
//! ```
//!
//! 单线程、协作式：没有后台计时器，时间只会随着 `next_frame` 传入的 `dt` 流逝。
//!
//! ## 核心类型
//!
//! - [`AnimationManager`]：一个目标上的动画列表，负责推进、取消与快照
//! - [`Chain`]：构造器接口，[`Sequence`] 与 [`AnimationBuilder`] 都实现它
//! - [`steps`]：独立的步骤工厂函数，与构造器方法一一对应
//! - [`Animatable`]：动画目标接口，[`PropertyStore`] 是它的内存实现
//! - [`ManagerSnapshot`]：可序列化的逻辑进度
//!
//! ## 使用示例
//!
//! ```ignore
//! use anim_runtime::prelude::*;
//!
//! let store = PropertyStore::new();
//! let mut manager = AnimationManager::new(Rc::new(store.clone()));
//!
//! manager
//!     .new_animation(Some("intro"))
//!     .dissolve_in(0.5)
//!     .in_parallel([steps::position((1.0, 1.0)), steps::scale(2.0)])
//!     .when_finished(|cancelled| println!("结束: {cancelled}"))
//!     .start()?;
//!
//! // 主循环
//! while manager.is_animating() {
//!     for event in manager.next_frame(1.0 / 60.0)? {
//!         println!("{event:?}");
//!     }
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`value`]：属性、值类型与插值（含多种旋转表示）
//! - [`easing`]：进度曲线
//! - [`step`]：步骤生命周期
//! - [`builder`] / [`options`] / [`steps`]：构造 API
//! - [`manager`] / [`animation`]：调度与取消策略
//! - [`snapshot`] / [`recipe`]：快照与恢复
//! - [`timeline`]：声明式时间线
//! - [`clock`] / [`config`]：驱动方时钟与配置

pub mod animation;
pub mod builder;
pub mod clock;
pub mod config;
pub mod easing;
pub mod error;
pub mod manager;
pub mod options;
pub mod recipe;
pub mod snapshot;
pub mod step;
pub mod steps;
pub mod target;
pub mod timeline;
pub mod value;

// 重导出核心类型
pub use animation::{Animation, AnimationState};
pub use builder::{AnimationBuilder, Chain, Sequence};
pub use clock::Clock;
pub use config::{ClockConfig, ManagerConfig, RuntimeConfig};
pub use easing::{EasingFunction, Progression};
pub use error::{AnimError, AnimResult, CallbackError, SnapshotError, StepError};
pub use manager::{AnimationEvent, AnimationManager, CancelPolicy, ManagerState};
pub use options::{CustomOptions, FadeOptions, PulseOptions, TriggerOptions, TweenOptions};
pub use recipe::{Recipe, RecipeBook};
pub use snapshot::{
    AnimationSnapshot, ManagerSnapshot, SnapshotVersion, StepKindTag, StepSnapshot, TweenProgress,
};
pub use step::{StepState, StepTemplate};
pub use steps::IntoStep;
pub use target::{Animatable, PropertyStore};
pub use timeline::{StepDef, TimelineDef, TimelineFile};
pub use value::{
    AnimValue, Color, Property, Rotation, RotationDirection, RotationRepr, Transform, Value,
    ValueKind,
};

/// 常用导入
pub mod prelude {
    pub use std::rc::Rc;

    pub use glam::{Vec2, Vec3, Vec4};

    pub use crate::steps;
    pub use crate::{
        AnimError, AnimResult, Animatable, AnimationEvent, AnimationManager, CancelPolicy, Chain,
        Clock, CustomOptions, EasingFunction, FadeOptions, IntoStep, ManagerSnapshot, Progression,
        Property, PropertyStore, PulseOptions, Rotation, RotationDirection, Sequence,
        TriggerOptions, TweenOptions, Value,
    };
}
