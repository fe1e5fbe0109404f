//! Tween 步骤：把一个属性从起点插值到终点。

use tracing::{trace, warn};

use super::{Progress, StepState, StepStatus};
use crate::easing::Progression;
use crate::error::{AnimResult, StepError};
use crate::snapshot::TweenProgress;
use crate::target::Animatable;
use crate::value::{Property, RotationDirection, Value, ValueAdapter};

/// 终点的给出方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Goal {
    /// 绝对终点
    Target(Value),
    /// 相对起点的增量
    Delta(Value),
    /// 起点乘以系数
    Scaled(f32),
    /// 开始时读取另一个属性作为终点
    Property(Property),
}

/// 时长的给出方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Timing {
    Duration(f32),
    /// 开始时按 `distance / velocity` 推导
    Velocity(f32),
}

pub(crate) struct Tween {
    pub(crate) property: Property,
    pub(crate) adapter: &'static dyn ValueAdapter,
    /// 显式起点；为空时开始时从目标读取
    pub(crate) from: Option<Value>,
    pub(crate) goal: Goal,
    pub(crate) timing: Timing,
    pub(crate) max_duration: Option<f32>,
    pub(crate) progression: Progression,
    pub(crate) start_percent: f32,
    pub(crate) direction: RotationDirection,
    /// 开始时附带写入的值
    pub(crate) begin_writes: Vec<(Property, Value)>,
    /// 到达终点后附带写入的值
    pub(crate) settle_writes: Vec<(Property, Value)>,
    /// 开始时确定的起点、终点与时长
    pub(crate) resolved: Option<TweenProgress>,
    /// 目标拒绝过写入；只警告一次
    pub(crate) write_rejected: bool,
}

impl Tween {
    pub(crate) fn new(
        property: Property,
        adapter: &'static dyn ValueAdapter,
        goal: Goal,
        timing: Timing,
        progression: Progression,
    ) -> Self {
        Self {
            property,
            adapter,
            from: None,
            goal,
            timing,
            max_duration: None,
            progression,
            start_percent: 0.0,
            direction: RotationDirection::Unspecified,
            begin_writes: Vec::new(),
            settle_writes: Vec::new(),
            resolved: None,
            write_rejected: false,
        }
    }

    pub(crate) fn advance(
        &mut self,
        progress: &mut Progress,
        dt: f32,
        target: &dyn Animatable,
    ) -> AnimResult<StepStatus> {
        if progress.state == StepState::WaitingToStart {
            write_all(target, &self.begin_writes);
            let resolved = self.resolve(target)?;
            self.resolved = Some(resolved);

            if self.is_still(&resolved) {
                trace!(property = %self.property, "补间无位移，直接结束");
                self.write(target, resolved.target);
                write_all(target, &self.settle_writes);
                progress.elapsed = 0.0;
                return Ok(StepStatus::Finished);
            }

            progress.state = StepState::Animating;
            progress.elapsed = self.progression.invert(self.start_percent) * resolved.duration;
        }

        let resolved = match self.resolved {
            Some(resolved) => resolved,
            None => self.resolve(target)?,
        };
        self.resolved = Some(resolved);

        progress.elapsed = (progress.elapsed + dt).min(resolved.duration);
        let percent = if resolved.duration > 0.0 {
            progress.elapsed / resolved.duration
        } else {
            1.0
        };
        self.write_at(&resolved, percent, target)?;

        if percent >= 1.0 {
            write_all(target, &self.settle_writes);
            Ok(StepStatus::Finished)
        } else {
            Ok(StepStatus::Running)
        }
    }

    /// 跳到终点
    pub(crate) fn complete(&mut self, progress: &mut Progress, target: &dyn Animatable) -> AnimResult<()> {
        let resolved = match self.resolved {
            Some(resolved) if progress.state != StepState::WaitingToStart => resolved,
            _ => {
                write_all(target, &self.begin_writes);
                self.resolve(target)?
            }
        };
        self.resolved = Some(resolved);

        self.write_at(&resolved, 1.0, target)?;
        write_all(target, &self.settle_writes);
        progress.elapsed = resolved.duration;
        Ok(())
    }

    /// 剩余时间；尚未开始时按目标当前值估算
    pub(crate) fn remaining_time(&self, progress: &Progress, target: &dyn Animatable) -> f32 {
        match self.resolved {
            Some(resolved) if progress.state != StepState::WaitingToStart => {
                (resolved.duration - progress.elapsed).max(0.0)
            }
            _ => self
                .resolve(target)
                .map(|r| r.duration * (1.0 - self.progression.invert(self.start_percent)))
                .unwrap_or(0.0),
        }
    }

    /// 确定起点、终点与时长
    fn resolve(&self, target: &dyn Animatable) -> AnimResult<TweenProgress> {
        let start = match self.from {
            Some(from) => from,
            None => self.read(target, self.property)?,
        };
        self.check_kind(&start)?;

        let goal = match self.goal {
            Goal::Target(value) => value,
            Goal::Delta(delta) => self
                .adapter
                .offset(&start, &delta)
                .ok_or_else(|| self.mismatch(&delta))?,
            Goal::Scaled(factor) => self
                .adapter
                .scaled(&start, factor)
                .ok_or_else(|| self.mismatch(&start))?,
            Goal::Property(property) => self.read(target, property)?,
        };
        self.check_kind(&goal)?;
        let goal = self.apply_direction(&start, goal);

        let duration = match self.timing {
            Timing::Duration(duration) => duration,
            Timing::Velocity(velocity) => {
                let distance = self
                    .adapter
                    .distance(&start, &goal)
                    .ok_or_else(|| self.mismatch(&goal))?;
                distance / velocity
            }
        };
        let duration = self.max_duration.map_or(duration, |max| duration.min(max));

        Ok(TweenProgress {
            start,
            target: goal,
            duration,
        })
    }

    fn write_at(&mut self, resolved: &TweenProgress, percent: f32, target: &dyn Animatable) -> AnimResult<()> {
        let t = self.progression.apply(percent);
        let value = self
            .adapter
            .interpolate(&resolved.start, &resolved.target, t)
            .ok_or_else(|| self.mismatch(&resolved.target))?;
        self.write(target, value);
        Ok(())
    }

    /// 写入目标；被拒绝时补间照常推进，只记录警告
    fn write(&mut self, target: &dyn Animatable, value: Value) {
        if !self.adapter.apply(target, self.property, value) && !self.write_rejected {
            self.write_rejected = true;
            warn!(property = %self.property, "目标拒绝写入，补间不会产生效果");
        }
    }

    fn is_still(&self, resolved: &TweenProgress) -> bool {
        self.adapter
            .distance(&resolved.start, &resolved.target)
            .is_some_and(|d| d <= f32::EPSILON)
    }

    /// 两端都是平面角时按旋转方向调整终点
    fn apply_direction(&self, start: &Value, goal: Value) -> Value {
        let (Value::Rotation(from), Value::Rotation(to)) = (start, goal) else {
            return goal;
        };
        match (from.planar_angle(), to.planar_angle()) {
            (Some(a), Some(b)) => Value::Rotation(to.with_planar_angle(a + self.direction.adjust(b - a))),
            _ => goal,
        }
    }

    fn read(&self, target: &dyn Animatable, property: Property) -> AnimResult<Value> {
        target
            .get_value(property)
            .ok_or_else(|| StepError::UnsupportedProperty { property }.into())
    }

    fn check_kind(&self, value: &Value) -> AnimResult<()> {
        if value.kind() == self.adapter.kind() {
            Ok(())
        } else {
            Err(self.mismatch(value).into())
        }
    }

    fn mismatch(&self, value: &Value) -> StepError {
        StepError::KindMismatch {
            property: self.property,
            expected: self.adapter.kind(),
            actual: value.kind(),
        }
    }
}

fn write_all(target: &dyn Animatable, writes: &[(Property, Value)]) {
    for (property, value) in writes {
        if !target.set_value(*property, *value) {
            warn!(property = %property, "目标拒绝写入");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnimError;
    use crate::target::PropertyStore;
    use crate::value::{Rotation, adapter_for};
    use glam::Vec2;
    use std::f32::consts::PI;

    fn tween(property: Property, goal: Goal, timing: Timing) -> Tween {
        Tween::new(
            property,
            adapter_for(property.kind()),
            goal,
            timing,
            Progression::linear(),
        )
    }

    #[test]
    fn test_linear_progress() {
        let store = PropertyStore::new();
        let mut progress = Progress::default();
        let mut t = tween(
            Property::Position,
            Goal::Target(Value::Vec2(Vec2::ONE)),
            Timing::Duration(1.0),
        );

        assert_eq!(t.advance(&mut progress, 0.0, &store).unwrap(), StepStatus::Running);
        assert_eq!(store.position(), Vec2::ZERO);
        t.advance(&mut progress, 0.5, &store).unwrap();
        assert_eq!(store.position(), Vec2::splat(0.5));
        assert_eq!(t.advance(&mut progress, 0.6, &store).unwrap(), StepStatus::Finished);
        assert_eq!(store.position(), Vec2::ONE);
        assert_eq!(progress.elapsed, 1.0);
    }

    #[test]
    fn test_delta_goal() {
        let store = PropertyStore::new().with(Property::Opacity, Value::Scalar(0.25));
        let mut progress = Progress::default();
        let mut t = tween(
            Property::Opacity,
            Goal::Delta(Value::Scalar(0.5)),
            Timing::Duration(1.0),
        );
        t.advance(&mut progress, 2.0, &store).unwrap();
        assert_eq!(store.opacity(), 0.75);
    }

    #[test]
    fn test_velocity_duration() {
        let store = PropertyStore::new();
        let mut progress = Progress::default();
        let mut t = tween(
            Property::Position,
            Goal::Target(Value::Vec2(Vec2::new(4.0, 2.0))),
            Timing::Velocity(2.0),
        );
        t.advance(&mut progress, 0.0, &store).unwrap();
        assert_eq!(t.resolved.map(|r| r.duration), Some(2.0));

        let mut capped = tween(
            Property::Position,
            Goal::Target(Value::Vec2(Vec2::new(4.0, 2.0))),
            Timing::Velocity(2.0),
        );
        capped.max_duration = Some(0.5);
        let mut progress = Progress::default();
        capped.advance(&mut progress, 0.0, &store).unwrap();
        assert_eq!(capped.resolved.map(|r| r.duration), Some(0.5));
    }

    #[test]
    fn test_zero_movement_never_animates() {
        let store = PropertyStore::new();
        let mut progress = Progress::default();
        let mut t = tween(
            Property::Position,
            Goal::Target(Value::Vec2(Vec2::ZERO)),
            Timing::Velocity(1.0),
        );
        assert_eq!(t.advance(&mut progress, 0.0, &store).unwrap(), StepStatus::Finished);
        assert_eq!(progress.state, StepState::WaitingToStart);
    }

    #[test]
    fn test_start_percent_skips_curve() {
        let store = PropertyStore::new();
        let mut progress = Progress::default();
        let mut t = tween(
            Property::Opacity,
            Goal::Target(Value::Scalar(0.0)),
            Timing::Duration(2.0),
        );
        t.from = Some(Value::Scalar(1.0));
        t.start_percent = 0.5;
        t.advance(&mut progress, 0.0, &store).unwrap();
        assert_eq!(progress.elapsed, 1.0);
        assert_eq!(store.opacity(), 0.5);
    }

    #[test]
    fn test_property_goal_and_settle_writes() {
        let store = PropertyStore::new();
        let mut progress = Progress::default();
        let mut t = tween(
            Property::Color,
            Goal::Property(Property::DimColor),
            Timing::Duration(1.0),
        );
        t.settle_writes = vec![(Property::Shown, Value::Flag(false))];
        t.advance(&mut progress, 1.0, &store).unwrap();
        assert_eq!(store.get_value(Property::Color), store.get_value(Property::DimColor));
        assert!(!store.is_shown());
    }

    #[test]
    fn test_scaled_goal_needs_scalable_kind() {
        let store = PropertyStore::new();
        let mut progress = Progress::default();
        let mut t = tween(Property::Rotation, Goal::Scaled(2.0), Timing::Duration(1.0));
        let err = t.advance(&mut progress, 0.1, &store).unwrap_err();
        assert!(matches!(
            err,
            AnimError::Step(StepError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_unsupported_property() {
        struct Empty;
        impl Animatable for Empty {
            fn get_value(&self, _property: Property) -> Option<Value> {
                None
            }
            fn set_value(&self, _property: Property, _value: Value) -> bool {
                false
            }
            fn property_list(&self) -> &'static [Property] {
                &[]
            }
        }

        let mut progress = Progress::default();
        let mut t = tween(
            Property::Opacity,
            Goal::Target(Value::Scalar(0.0)),
            Timing::Duration(1.0),
        );
        let err = t.advance(&mut progress, 0.1, &Empty).unwrap_err();
        assert_eq!(
            err,
            AnimError::from(StepError::UnsupportedProperty {
                property: Property::Opacity
            })
        );
    }

    #[test]
    fn test_rejected_write_still_finishes() {
        // 可以读取但拒绝一切写入的目标
        struct ReadOnly;
        impl Animatable for ReadOnly {
            fn get_value(&self, property: Property) -> Option<Value> {
                match property {
                    Property::Opacity => Some(Value::Scalar(1.0)),
                    _ => None,
                }
            }
            fn set_value(&self, _property: Property, _value: Value) -> bool {
                false
            }
            fn property_list(&self) -> &'static [Property] {
                &[Property::Opacity]
            }
        }

        let mut progress = Progress::default();
        let mut t = tween(
            Property::Opacity,
            Goal::Target(Value::Scalar(0.0)),
            Timing::Duration(1.0),
        );
        t.settle_writes = vec![(Property::Shown, Value::Flag(false))];

        assert_eq!(t.advance(&mut progress, 0.5, &ReadOnly).unwrap(), StepStatus::Running);
        assert!(t.write_rejected);
        assert_eq!(t.advance(&mut progress, 0.5, &ReadOnly).unwrap(), StepStatus::Finished);
        assert_eq!(progress.elapsed, 1.0);
    }

    #[test]
    fn test_accepted_writes_do_not_flag() {
        let store = PropertyStore::new();
        let mut progress = Progress::default();
        let mut t = tween(
            Property::Opacity,
            Goal::Target(Value::Scalar(0.0)),
            Timing::Duration(1.0),
        );
        t.advance(&mut progress, 1.0, &store).unwrap();
        assert!(!t.write_rejected);
    }

    #[test]
    fn test_rotation_direction_negative() {
        let store = PropertyStore::new();
        let mut progress = Progress::default();
        let mut t = tween(
            Property::Rotation,
            Goal::Target(Value::Rotation(Rotation::angle(PI / 2.0))),
            Timing::Duration(1.0),
        );
        t.direction = RotationDirection::Negative;
        t.advance(&mut progress, 0.0, &store).unwrap();

        let goal = t.resolved.map(|r| r.target);
        let Some(Value::Rotation(rotation)) = goal else {
            panic!("unexpected goal {goal:?}");
        };
        let angle = rotation.planar_angle().unwrap();
        assert!((angle + 3.0 * PI / 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_complete_before_start() {
        let store = PropertyStore::new();
        let mut progress = Progress::default();
        let mut t = tween(
            Property::Scale,
            Goal::Target(Value::Vec2(Vec2::splat(3.0))),
            Timing::Duration(1.0),
        );
        t.complete(&mut progress, &store).unwrap();
        assert_eq!(store.scale(), Vec2::splat(3.0));
    }
}
