//! # Builder 模块
//!
//! 动画构造器。
//!
//! [`Sequence`] 只累积步骤模板，不持有任何运行时状态；
//! [`AnimationBuilder`] 是绑定到管理器的同一条链，`start()` 时才生成可运行的动画。
//! 两者都通过 [`Chain`] 提供全部简写方法，每个简写都直接调用 [`crate::steps`] 中的同名工厂。
//!
//! ```rust,ignore
//! manager
//!     .new_animation(Some("intro"))
//!     .dissolve_in(0.5)
//!     .position(TweenOptions::<Vec2>::new().to((1.0, 0.0)).duration(2.0))
//!     .trigger(|| println!("到位"))
//!     .when_finished(|cancelled| println!("结束: {cancelled}"))
//!     .start()?;
//! ```

use std::fmt;

use glam::{Vec2, Vec3, Vec4};

use crate::error::{AnimError, AnimResult, CallbackError};
use crate::manager::AnimationManager;
use crate::options::{CustomOptions, FadeOptions, PulseOptions, TriggerOptions, TweenOptions};
use crate::step::{FinishCallback, Serial, Step, StepKind, StepTemplate, infallible_finish};
use crate::steps::{self, IntoStep};
use crate::value::{AnimValue, Property, Rotation, Transform};

/// 步骤序列
///
/// 构造过程中遇到的第一个错误会被记住，在 `start()` / `into_template()` 时返回。
#[derive(Default)]
pub struct Sequence {
    steps: Vec<StepTemplate>,
    error: Option<AnimError>,
    when_finished: Vec<FinishCallback>,
    complete_on_cancel: bool,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已累积的步骤数量
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 构造过程中记下的第一个错误
    pub fn error(&self) -> Option<&AnimError> {
        self.error.as_ref()
    }

    fn push(&mut self, step: AnimResult<StepTemplate>) {
        if self.error.is_some() {
            return;
        }
        match step {
            Ok(template) => self.steps.push(template),
            Err(e) => self.error = Some(e),
        }
    }

    /// 整条序列作为一个串行步骤
    ///
    /// `when_finished` 回调挂在这个串行步骤的 on_finish 上。
    pub fn into_template(self) -> AnimResult<StepTemplate> {
        let (steps, when_finished, complete_on_cancel) = self.into_parts()?;

        let mut template = StepTemplate::new(StepKind::Serial(Serial::new(steps)));
        if !when_finished.is_empty() {
            template.step.on_finish = Some(merge_callbacks(when_finished));
        }
        if complete_on_cancel {
            template.step.complete_on_cancel = Some(true);
        }
        Ok(template)
    }

    pub(crate) fn into_parts(self) -> AnimResult<(Vec<Step>, Vec<FinishCallback>, bool)> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let steps = self
            .steps
            .into_iter()
            .map(StepTemplate::into_runtime)
            .collect();
        Ok((steps, self.when_finished, self.complete_on_cancel))
    }
}

impl Chain for Sequence {
    fn sequence_mut(&mut self) -> &mut Sequence {
        self
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("steps", &self.steps)
            .field("error", &self.error)
            .field("when_finished", &self.when_finished.len())
            .field("complete_on_cancel", &self.complete_on_cancel)
            .finish()
    }
}

fn merge_callbacks(mut callbacks: Vec<FinishCallback>) -> FinishCallback {
    Box::new(move |cancelled| {
        for callback in callbacks.iter_mut() {
            callback(cancelled)?;
        }
        Ok(())
    })
}

/// 链式构造接口
///
/// 实现方只需要提供 [`Chain::sequence_mut`]。
pub trait Chain: Sized {
    fn sequence_mut(&mut self) -> &mut Sequence;

    /// 追加任意步骤（工厂函数的结果、模板或另一条序列）
    fn then(mut self, step: impl IntoStep) -> Self {
        self.sequence_mut().push(step.into_step());
        self
    }

    /// 任意属性的补间
    fn tween<T: AnimValue>(self, property: Property, options: impl Into<TweenOptions<T>>) -> Self {
        self.then(steps::tween(property, options))
    }

    // ========== 补间简写 ==========

    fn position(self, options: impl Into<TweenOptions<Vec2>>) -> Self {
        self.then(steps::position(options))
    }

    fn position3(self, options: impl Into<TweenOptions<Vec3>>) -> Self {
        self.then(steps::position3(options))
    }

    fn scale(self, options: impl Into<TweenOptions<Vec2>>) -> Self {
        self.then(steps::scale(options))
    }

    fn rotation(self, options: impl Into<TweenOptions<Rotation>>) -> Self {
        self.then(steps::rotation(options))
    }

    fn color(self, options: impl Into<TweenOptions<Vec4>>) -> Self {
        self.then(steps::color(options))
    }

    fn opacity(self, options: impl Into<TweenOptions<f32>>) -> Self {
        self.then(steps::opacity(options))
    }

    fn transform(self, options: impl Into<TweenOptions<Transform>>) -> Self {
        self.then(steps::transform(options))
    }

    fn dissolve_in(self, options: impl Into<FadeOptions>) -> Self {
        self.then(steps::dissolve_in(options))
    }

    fn dissolve_out(self, options: impl Into<FadeOptions>) -> Self {
        self.then(steps::dissolve_out(options))
    }

    fn dim(self, options: impl Into<FadeOptions>) -> Self {
        self.then(steps::dim(options))
    }

    fn undim(self, options: impl Into<FadeOptions>) -> Self {
        self.then(steps::undim(options))
    }

    fn pulse(self, options: impl Into<PulseOptions>) -> Self {
        self.then(steps::pulse(options))
    }

    // ========== 时间步骤 ==========

    fn delay(self, seconds: f32) -> Self {
        self.then(steps::delay(seconds))
    }

    fn trigger(self, callback: impl FnMut() + 'static) -> Self {
        self.then(steps::trigger(callback))
    }

    fn trigger_with(self, options: TriggerOptions) -> Self {
        self.then(steps::trigger_with(options))
    }

    fn custom(self, options: CustomOptions) -> Self {
        self.then(steps::custom(options))
    }

    // ========== 组合 ==========

    fn in_parallel<I>(self, steps: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoStep,
    {
        self.then(steps::parallel(steps))
    }

    fn in_serial<I>(self, steps: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoStep,
    {
        self.then(steps::serial(steps))
    }

    // ========== 收尾 ==========

    /// 动画结束时调用，参数表示是否因取消 / complete 而结束
    fn when_finished(self, callback: impl FnMut(bool) + 'static) -> Self {
        self.push_when_finished(infallible_finish(callback))
    }

    fn try_when_finished(
        self,
        callback: impl FnMut(bool) -> Result<(), CallbackError> + 'static,
    ) -> Self {
        self.push_when_finished(Box::new(callback))
    }

    /// 被 cancel 时按 complete 处理
    fn if_canceled_then_complete(mut self) -> Self {
        self.sequence_mut().complete_on_cancel = true;
        self
    }

    #[doc(hidden)]
    fn push_when_finished(mut self, callback: FinishCallback) -> Self {
        self.sequence_mut().when_finished.push(callback);
        self
    }
}

/// 构造目标
#[derive(Debug, Clone, PartialEq, Eq)]
enum BuildMode {
    /// 新动画，`None` 时自动分配 ID
    New(Option<String>),
    /// 追加到已有动画
    AddTo(String),
}

/// 绑定到管理器的构造器
pub struct AnimationBuilder<'a> {
    manager: &'a mut AnimationManager,
    mode: BuildMode,
    sequence: Sequence,
}

impl<'a> AnimationBuilder<'a> {
    pub(crate) fn new(manager: &'a mut AnimationManager, id: Option<String>) -> Self {
        Self {
            manager,
            mode: BuildMode::New(id),
            sequence: Sequence::new(),
        }
    }

    pub(crate) fn add_to(manager: &'a mut AnimationManager, id: String) -> Self {
        Self {
            manager,
            mode: BuildMode::AddTo(id),
            sequence: Sequence::new(),
        }
    }

    /// 把整条预先构造好的序列接到当前链上
    pub fn extend(mut self, sequence: Sequence) -> Self {
        let Sequence {
            steps,
            error,
            when_finished,
            complete_on_cancel,
        } = sequence;

        let own = &mut self.sequence;
        if own.error.is_none() {
            own.error = error;
        }
        own.steps.extend(steps);
        own.when_finished.extend(when_finished);
        own.complete_on_cancel |= complete_on_cancel;
        self
    }

    /// 交给管理器
    ///
    /// # 返回
    /// 动画 ID；追加到不存在的动画时什么也不做，同样返回该 ID
    pub fn start(self) -> AnimResult<String> {
        match self.mode {
            BuildMode::New(id) => self.manager.start_sequence(id, self.sequence),
            BuildMode::AddTo(id) => self.manager.append_sequence(id, self.sequence),
        }
    }
}

impl Chain for AnimationBuilder<'_> {
    fn sequence_mut(&mut self) -> &mut Sequence {
        &mut self.sequence
    }
}

impl fmt::Debug for AnimationBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationBuilder")
            .field("mode", &self.mode)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StepError;
    use crate::snapshot::StepKindTag;

    #[test]
    fn test_sequence_collects_steps() {
        let seq = Sequence::new()
            .position((1.0, 1.0))
            .delay(0.5)
            .trigger(|| {})
            .in_parallel([steps::opacity(0.0), steps::scale(2.0)]);
        assert_eq!(seq.len(), 4);
        assert!(seq.error().is_none());
    }

    #[test]
    fn test_first_error_is_kept() {
        let seq = Sequence::new()
            .delay(-1.0)
            .position(TweenOptions::<Vec2>::new())
            .delay(1.0);
        assert_eq!(seq.len(), 0);
        assert!(matches!(
            seq.error(),
            Some(AnimError::Step(StepError::NegativeDuration { .. }))
        ));
        assert!(seq.into_template().is_err());
    }

    #[test]
    fn test_into_template() {
        let template = Sequence::new()
            .delay(1.0)
            .when_finished(|_| {})
            .if_canceled_then_complete()
            .into_template()
            .unwrap();
        assert_eq!(template.kind(), StepKindTag::Serial);
        assert!(template.step.on_finish.is_some());
        assert_eq!(template.step.complete_on_cancel, Some(true));
    }

    #[test]
    fn test_nested_sequence() {
        let inner = Sequence::new().delay(1.0).delay(1.0);
        let seq = Sequence::new().then(inner).in_serial([Sequence::new().delay(0.5)]);
        assert_eq!(seq.len(), 2);
        assert!(seq.error().is_none());
    }
}
