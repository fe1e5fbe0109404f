//! # Steps 模块
//!
//! 独立的步骤工厂函数。
//!
//! 构造器上的每个简写方法都直接调用这里的同名函数，所以
//! `seq.position(..)` 与 `seq.then(steps::position(..))` 产出完全相同的步骤。
//! 构造错误（缺少终点、负时长等）在这里立即返回。

use glam::{Vec2, Vec3, Vec4};

use crate::builder::Sequence;
use crate::easing::{EasingFunction, Progression};
use crate::error::{AnimResult, StepError};
use crate::options::{CustomOptions, FadeOptions, PulseOptions, TriggerOptions, TweenOptions};
use crate::step::{
    Custom, Delay, FinishCallback, Goal, Serial, StepKind, StepTemplate, Timing, Trigger, Tween,
};
use crate::value::{AnimValue, Property, Rotation, RotationDirection, Transform, Value, adapter_for};

/// 补间默认时长（秒）
pub const DEFAULT_DURATION: f32 = 1.0;

/// 能放进组合步骤的东西
pub trait IntoStep {
    fn into_step(self) -> AnimResult<StepTemplate>;
}

impl IntoStep for StepTemplate {
    fn into_step(self) -> AnimResult<StepTemplate> {
        Ok(self)
    }
}

impl IntoStep for AnimResult<StepTemplate> {
    fn into_step(self) -> AnimResult<StepTemplate> {
        self
    }
}

/// 一整条序列作为一个串行子步骤
impl IntoStep for Sequence {
    fn into_step(self) -> AnimResult<StepTemplate> {
        self.into_template()
    }
}

// ========== 补间 ==========

/// 任意属性的补间
pub fn tween<T: AnimValue>(
    property: Property,
    options: impl Into<TweenOptions<T>>,
) -> AnimResult<StepTemplate> {
    let options = options.into();
    if T::KIND != property.kind() {
        return Err(StepError::KindMismatch {
            property,
            expected: property.kind(),
            actual: T::KIND,
        }
        .into());
    }

    let goal = match (options.target, options.delta) {
        (Some(target), _) => Goal::Target(target.into_value()),
        (None, Some(delta)) => Goal::Delta(delta.into_value()),
        (None, None) => return Err(StepError::MissingTarget { property }.into()),
    };

    build_tween(TweenSetup {
        property,
        goal,
        from: options.from.map(AnimValue::into_value),
        duration: options.duration,
        velocity: options.velocity,
        max_duration: options.max_duration,
        progression: options.progression.unwrap_or_default(),
        start_percent: options.start_percent.unwrap_or(0.0),
        direction: options.direction,
        delay: options.delay,
        begin_writes: Vec::new(),
        settle_writes: Vec::new(),
        on_finish: options.on_finish,
        complete_on_cancel: options.complete_on_cancel,
    })
}

pub fn position(options: impl Into<TweenOptions<Vec2>>) -> AnimResult<StepTemplate> {
    tween(Property::Position, options)
}

/// 三维位置
pub fn position3(options: impl Into<TweenOptions<Vec3>>) -> AnimResult<StepTemplate> {
    tween(Property::Position3, options)
}

pub fn scale(options: impl Into<TweenOptions<Vec2>>) -> AnimResult<StepTemplate> {
    tween(Property::Scale, options)
}

pub fn rotation(options: impl Into<TweenOptions<Rotation>>) -> AnimResult<StepTemplate> {
    tween(Property::Rotation, options)
}

pub fn color(options: impl Into<TweenOptions<Vec4>>) -> AnimResult<StepTemplate> {
    tween(Property::Color, options)
}

pub fn opacity(options: impl Into<TweenOptions<f32>>) -> AnimResult<StepTemplate> {
    tween(Property::Opacity, options)
}

pub fn transform(options: impl Into<TweenOptions<Transform>>) -> AnimResult<StepTemplate> {
    tween(Property::Transform, options)
}

// ========== 淡入淡出 / 变暗 ==========

/// 显示并把不透明度从 0 渐变到 1
pub fn dissolve_in(options: impl Into<FadeOptions>) -> AnimResult<StepTemplate> {
    let options = options.into();
    let mut setup = fade_setup(Property::Opacity, Goal::Target(Value::Scalar(1.0)), options, linear());
    setup.from = Some(Value::Scalar(0.0));
    setup.begin_writes = vec![(Property::Shown, Value::Flag(true))];
    build_tween(setup)
}

/// 不透明度渐变到 0，结束后隐藏并把不透明度复位为 1
pub fn dissolve_out(options: impl Into<FadeOptions>) -> AnimResult<StepTemplate> {
    let options = options.into();
    let mut setup = fade_setup(Property::Opacity, Goal::Target(Value::Scalar(0.0)), options, linear());
    setup.settle_writes = vec![
        (Property::Shown, Value::Flag(false)),
        (Property::Opacity, Value::Scalar(1.0)),
    ];
    build_tween(setup)
}

/// 颜色渐变到变暗色
pub fn dim(options: impl Into<FadeOptions>) -> AnimResult<StepTemplate> {
    let options = options.into();
    let mut setup = fade_setup(
        Property::Color,
        Goal::Property(Property::DimColor),
        options,
        Progression::default(),
    );
    setup.complete_on_cancel = setup.complete_on_cancel.or(Some(true));
    build_tween(setup)
}

/// 颜色渐变回默认色
pub fn undim(options: impl Into<FadeOptions>) -> AnimResult<StepTemplate> {
    let options = options.into();
    let mut setup = fade_setup(
        Property::Color,
        Goal::Property(Property::DefaultColor),
        options,
        Progression::default(),
    );
    setup.complete_on_cancel = setup.complete_on_cancel.or(Some(true));
    build_tween(setup)
}

// ========== 脉冲 ==========

/// 缩放（以及可选的不透明度）先到峰值再回到原值
pub fn pulse(options: impl Into<PulseOptions>) -> AnimResult<StepTemplate> {
    let options = options.into();
    let progression = Progression::Pulse {
        cycles: options.cycles,
    };

    let mut children = vec![build_tween(pulse_setup(
        Property::Scale,
        Goal::Scaled(options.scale),
        options.duration,
        progression.clone(),
    ))?];
    if let Some(opacity) = options.opacity {
        children.push(build_tween(pulse_setup(
            Property::Opacity,
            Goal::Target(Value::Scalar(opacity)),
            options.duration,
            progression,
        ))?);
    }

    check_duration("pulse", options.delay)?;
    let mut template = StepTemplate::new(StepKind::Parallel(
        children.into_iter().map(StepTemplate::into_runtime).collect(),
    ));
    template.step.start_delay = options.delay;
    template.step.on_finish = options.on_finish;
    template.step.complete_on_cancel = options.complete_on_cancel;
    Ok(template)
}

// ========== 时间步骤 ==========

/// 纯延时
pub fn delay(seconds: f32) -> AnimResult<StepTemplate> {
    check_duration("delay", seconds)?;
    Ok(StepTemplate::new(StepKind::Delay(Delay { duration: seconds })))
}

/// 立即触发的回调
pub fn trigger(callback: impl FnMut() + 'static) -> AnimResult<StepTemplate> {
    trigger_with(TriggerOptions::new(callback))
}

/// 带延时 / 保持时间的回调
pub fn trigger_with(options: TriggerOptions) -> AnimResult<StepTemplate> {
    check_duration("trigger", options.delay)?;
    check_duration("trigger", options.duration)?;

    let mut trigger = Trigger::new(options.callback);
    trigger.delay = options.delay;
    trigger.hold = options.duration;

    let mut template = StepTemplate::new(StepKind::Trigger(trigger));
    template.step.on_finish = options.on_finish;
    template.step.complete_on_cancel = options.complete_on_cancel;
    Ok(template)
}

/// 自定义回调步骤
pub fn custom(options: CustomOptions) -> AnimResult<StepTemplate> {
    if let Some(duration) = options.duration {
        check_duration("custom", duration)?;
    }
    check_duration("custom", options.delay)?;
    let start_percent = check_start_percent(options.start_percent)?;

    let mut custom = Custom::new(options.callback, options.duration);
    custom.start_percent = start_percent;
    if let Some(progression) = options.progression {
        custom.progression = progression;
    }

    let mut template = StepTemplate::new(StepKind::Custom(custom));
    template.step.start_delay = options.delay;
    template.step.on_finish = options.on_finish;
    template.step.complete_on_cancel = options.complete_on_cancel;
    Ok(template)
}

// ========== 组合 ==========

/// 并行组合：所有子步骤结束时结束
pub fn parallel<I>(steps: I) -> AnimResult<StepTemplate>
where
    I: IntoIterator,
    I::Item: IntoStep,
{
    let children = collect_children(steps)?;
    Ok(StepTemplate::new(StepKind::Parallel(children)))
}

/// 串行组合：按顺序逐个执行
pub fn serial<I>(steps: I) -> AnimResult<StepTemplate>
where
    I: IntoIterator,
    I::Item: IntoStep,
{
    let children = collect_children(steps)?;
    Ok(StepTemplate::new(StepKind::Serial(Serial::new(children))))
}

fn collect_children<I>(steps: I) -> AnimResult<Vec<crate::step::Step>>
where
    I: IntoIterator,
    I::Item: IntoStep,
{
    steps
        .into_iter()
        .map(|s| s.into_step().map(StepTemplate::into_runtime))
        .collect()
}

// ========== 内部 ==========

struct TweenSetup {
    property: Property,
    goal: Goal,
    from: Option<Value>,
    duration: Option<f32>,
    velocity: Option<f32>,
    max_duration: Option<f32>,
    progression: Progression,
    start_percent: f32,
    direction: RotationDirection,
    /// 开始延时
    delay: f32,
    begin_writes: Vec<(Property, Value)>,
    settle_writes: Vec<(Property, Value)>,
    on_finish: Option<FinishCallback>,
    complete_on_cancel: Option<bool>,
}

fn fade_setup(
    property: Property,
    goal: Goal,
    options: FadeOptions,
    default_progression: Progression,
) -> TweenSetup {
    TweenSetup {
        property,
        goal,
        from: None,
        duration: options.duration,
        velocity: None,
        max_duration: None,
        progression: options.progression.unwrap_or(default_progression),
        start_percent: 0.0,
        direction: RotationDirection::Unspecified,
        delay: options.delay,
        begin_writes: Vec::new(),
        settle_writes: Vec::new(),
        on_finish: options.on_finish,
        complete_on_cancel: options.complete_on_cancel,
    }
}

fn pulse_setup(property: Property, goal: Goal, duration: f32, progression: Progression) -> TweenSetup {
    TweenSetup {
        property,
        goal,
        from: None,
        duration: Some(duration),
        velocity: None,
        max_duration: None,
        progression,
        start_percent: 0.0,
        direction: RotationDirection::Unspecified,
        delay: 0.0,
        begin_writes: Vec::new(),
        settle_writes: Vec::new(),
        on_finish: None,
        complete_on_cancel: None,
    }
}

fn linear() -> Progression {
    Progression::Easing(EasingFunction::Linear)
}

fn build_tween(setup: TweenSetup) -> AnimResult<StepTemplate> {
    let property = setup.property;
    let duration = setup.duration.unwrap_or(DEFAULT_DURATION);
    check_duration("tween", duration)?;
    if let Some(max) = setup.max_duration {
        check_duration("tween", max)?;
    }
    check_duration("tween", setup.delay)?;

    let timing = match setup.velocity {
        Some(velocity) if velocity > 0.0 && velocity.is_finite() => Timing::Velocity(velocity),
        Some(velocity) => return Err(StepError::InvalidVelocity { property, velocity }.into()),
        None => Timing::Duration(duration),
    };
    let start_percent = check_start_percent(Some(setup.start_percent))?;

    let mut tween = Tween::new(
        property,
        adapter_for(property.kind()),
        setup.goal,
        timing,
        setup.progression,
    );
    tween.from = setup.from;
    tween.max_duration = setup.max_duration;
    tween.start_percent = start_percent;
    tween.direction = setup.direction;
    tween.begin_writes = setup.begin_writes;
    tween.settle_writes = setup.settle_writes;

    let mut template = StepTemplate::new(StepKind::Tween(tween));
    template.step.start_delay = setup.delay;
    template.step.on_finish = setup.on_finish;
    template.step.complete_on_cancel = setup.complete_on_cancel;
    Ok(template)
}

fn check_duration(step: &'static str, duration: f32) -> Result<(), StepError> {
    // NaN 也在这里被拒绝
    if duration >= 0.0 {
        Ok(())
    } else {
        Err(StepError::NegativeDuration { step, duration })
    }
}

fn check_start_percent(percent: Option<f32>) -> Result<f32, StepError> {
    match percent {
        None => Ok(0.0),
        Some(value) if (0.0..=1.0).contains(&value) => Ok(value),
        Some(value) => Err(StepError::InvalidStartPercent { value }),
    }
}
