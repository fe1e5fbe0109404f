//! # Step 模块
//!
//! 动画步骤：Tween / Custom / Trigger / Delay / Parallel / Serial。
//!
//! 每个步骤有统一的生命周期 `WaitingToStart → Animating → Finished`，
//! 由 [`Step::advance`] 推进。已结束的步骤不会再被推进。
//!
//! 步骤可以带开始延时：等待期间保持 `WaitingToStart`，等待结束那一帧多出的时间直接进入步骤本身。
//!
//! ## 取消语义
//!
//! - `complete`：跳到终点（补间写入目标值、未触发的 Trigger 立即触发），回调参数 `cancelled = true`
//! - `cancel`：仅对 `complete_on_cancel == Some(true)` 的步骤执行 `complete`，其余原地停止、不回调；
//!   组合步骤把自己的有效标记传给子步骤

mod composite;
mod timed;
mod tween;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AnimResult, CallbackError, SnapshotError};
use crate::snapshot::{StepKindTag, StepSnapshot};
use crate::target::Animatable;

pub(crate) use composite::Serial;
pub(crate) use timed::{Custom, Delay, Trigger};
pub(crate) use tween::{Goal, Timing, Tween};

/// 步骤结束回调，参数为 `cancelled`
pub type FinishCallback = Box<dyn FnMut(bool) -> Result<(), CallbackError>>;

/// Custom 步骤回调
///
/// 有限时长时参数为经过曲线映射的进度，无限时长时为步骤开始以来的秒数；
/// 返回 `true` 表示提前结束。
pub type CustomCallback = Box<dyn FnMut(f32) -> Result<bool, CallbackError>>;

/// Trigger 步骤回调
pub type TriggerCallback = Box<dyn FnMut() -> Result<(), CallbackError>>;

/// 步骤状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    /// 等待开始
    #[default]
    WaitingToStart,
    /// 进行中
    Animating,
    /// 已结束
    Finished,
}

/// 单次推进的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// 仍在进行
    Running,
    /// 已结束
    Finished,
}

/// 步骤进度（所有步骤共有）
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Progress {
    pub(crate) state: StepState,
    /// 步骤内已经过的逻辑时间（秒），不含开始延时
    pub(crate) elapsed: f32,
    /// 开始延时中已等待的时间
    pub(crate) waited: f32,
}

/// 运行时步骤
pub(crate) struct Step {
    pub(crate) progress: Progress,
    pub(crate) on_finish: Option<FinishCallback>,
    pub(crate) complete_on_cancel: Option<bool>,
    /// 开始前等待的时间（秒）
    pub(crate) start_delay: f32,
    pub(crate) kind: StepKind,
}

pub(crate) enum StepKind {
    Tween(Tween),
    Custom(Custom),
    Trigger(Trigger),
    Delay(Delay),
    Parallel(Vec<Step>),
    Serial(Serial),
}

impl StepKind {
    fn tag(&self) -> StepKindTag {
        match self {
            StepKind::Tween(_) => StepKindTag::Tween,
            StepKind::Custom(_) => StepKindTag::Custom,
            StepKind::Trigger(_) => StepKindTag::Trigger,
            StepKind::Delay(_) => StepKindTag::Delay,
            StepKind::Parallel(_) => StepKindTag::Parallel,
            StepKind::Serial(_) => StepKindTag::Serial,
        }
    }
}

impl Step {
    pub(crate) fn new(kind: StepKind) -> Self {
        Self {
            progress: Progress::default(),
            on_finish: None,
            complete_on_cancel: None,
            start_delay: 0.0,
            kind,
        }
    }

    pub(crate) fn state(&self) -> StepState {
        self.progress.state
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.progress.state == StepState::Finished
    }

    pub(crate) fn tag(&self) -> StepKindTag {
        self.kind.tag()
    }

    /// 推进 `dt` 秒
    pub(crate) fn advance(&mut self, dt: f32, target: &dyn Animatable) -> AnimResult<StepStatus> {
        if self.is_finished() {
            return Ok(StepStatus::Finished);
        }

        let mut dt = dt;
        let wait_left = self.start_delay - self.progress.waited;
        if wait_left > 0.0 {
            if dt < wait_left {
                self.progress.waited += dt;
                return Ok(StepStatus::Running);
            }
            self.progress.waited = self.start_delay;
            dt -= wait_left;
        }

        let progress = &mut self.progress;
        let status = match &mut self.kind {
            StepKind::Tween(tween) => tween.advance(progress, dt, target)?,
            StepKind::Custom(custom) => custom.advance(progress, dt)?,
            StepKind::Trigger(trigger) => trigger.advance(progress, dt)?,
            StepKind::Delay(delay) => delay.advance(progress, dt),
            StepKind::Parallel(children) => composite::advance_parallel(children, progress, dt, target)?,
            StepKind::Serial(serial) => serial.advance(progress, dt, target)?,
        };

        if status == StepStatus::Finished {
            self.finish(false)?;
        }
        Ok(status)
    }

    /// 立即跳到终点
    pub(crate) fn complete(&mut self, target: &dyn Animatable) -> AnimResult<()> {
        if self.is_finished() {
            return Ok(());
        }

        self.progress.waited = self.start_delay;
        let progress = &mut self.progress;
        match &mut self.kind {
            StepKind::Tween(tween) => tween.complete(progress, target)?,
            StepKind::Custom(custom) => custom.complete(progress)?,
            StepKind::Trigger(trigger) => trigger.complete(progress)?,
            StepKind::Delay(delay) => delay.complete(progress),
            StepKind::Parallel(children) => {
                for child in children.iter_mut() {
                    child.complete(target)?;
                }
            }
            StepKind::Serial(serial) => serial.complete(target)?,
        }

        self.finish(true)
    }

    /// 取消
    ///
    /// `force` 为上层传下来的 complete_on_cancel；自身的标记只在上层未指定时生效。
    pub(crate) fn cancel(&mut self, target: &dyn Animatable, force: Option<bool>) -> AnimResult<()> {
        if self.is_finished() {
            return Ok(());
        }

        let effective = force.or(self.complete_on_cancel);
        if !matches!(self.kind, StepKind::Parallel(_) | StepKind::Serial(_)) {
            if effective == Some(true) {
                return self.complete(target);
            }
            self.progress.state = StepState::Finished;
            return Ok(());
        }

        let children: &mut [Step] = match &mut self.kind {
            StepKind::Parallel(children) => children,
            StepKind::Serial(serial) => serial.pending_mut(),
            _ => &mut [],
        };

        for child in children.iter_mut() {
            child.cancel(target, effective)?;
        }
        if let StepKind::Serial(serial) = &mut self.kind {
            serial.index = serial.children.len();
        }

        if effective == Some(true) {
            self.finish(true)
        } else {
            self.progress.state = StepState::Finished;
            Ok(())
        }
    }

    /// 剩余逻辑时间；`None` 表示无限
    pub(crate) fn remaining_time(&self, target: &dyn Animatable) -> Option<f32> {
        if self.is_finished() {
            return Some(0.0);
        }

        let elapsed = self.progress.elapsed;
        let wait_left = (self.start_delay - self.progress.waited).max(0.0);
        let remaining = match &self.kind {
            StepKind::Tween(tween) => Some(tween.remaining_time(&self.progress, target)),
            StepKind::Custom(custom) => custom.duration.map(|d| (d - elapsed).max(0.0)),
            StepKind::Trigger(trigger) => Some((trigger.total() - elapsed).max(0.0)),
            StepKind::Delay(delay) => Some((delay.duration - elapsed).max(0.0)),
            StepKind::Parallel(children) => children
                .iter()
                .map(|c| c.remaining_time(target))
                .try_fold(0.0_f32, |acc, r| r.map(|r| acc.max(r))),
            StepKind::Serial(serial) => serial
                .children
                .iter()
                .skip(serial.index)
                .map(|c| c.remaining_time(target))
                .try_fold(0.0_f32, |acc, r| r.map(|r| acc + r)),
        };
        remaining.map(|r| r + wait_left)
    }

    fn finish(&mut self, cancelled: bool) -> AnimResult<()> {
        self.progress.state = StepState::Finished;
        if let Some(callback) = self.on_finish.as_mut() {
            callback(cancelled)?;
        }
        Ok(())
    }

    // ========== 快照 ==========

    /// 记录当前进度
    pub(crate) fn snapshot(&self) -> StepSnapshot {
        let mut snapshot = StepSnapshot {
            kind: self.tag(),
            state: self.progress.state,
            elapsed: self.progress.waited + self.progress.elapsed,
            tween: None,
            fired: None,
            finished_by_callback: None,
            index: None,
            children: Vec::new(),
        };

        match &self.kind {
            StepKind::Tween(tween) => snapshot.tween = tween.resolved,
            StepKind::Custom(custom) => {
                snapshot.finished_by_callback = Some(custom.finished_by_callback);
            }
            StepKind::Trigger(trigger) => snapshot.fired = Some(trigger.fired),
            StepKind::Delay(_) => {}
            StepKind::Parallel(children) => {
                snapshot.children = children.iter().map(Step::snapshot).collect();
            }
            StepKind::Serial(serial) => {
                snapshot.index = Some(serial.index);
                snapshot.children = serial.children.iter().map(Step::snapshot).collect();
            }
        }
        snapshot
    }

    /// 按快照恢复进度
    ///
    /// 快照中缺字段、值类型不符或时间越界都视为结构不匹配，不会用默认值补齐。
    pub(crate) fn restore(&mut self, snapshot: &StepSnapshot, path: &str) -> Result<(), SnapshotError> {
        if snapshot.kind != self.tag() {
            return Err(SnapshotError::mismatch(
                path,
                self.tag().name(),
                snapshot.kind.name(),
            ));
        }
        if !(snapshot.elapsed.is_finite() && snapshot.elapsed >= 0.0) {
            return Err(SnapshotError::mismatch(
                path,
                "有限且非负的 elapsed",
                snapshot.elapsed.to_string(),
            ));
        }

        // 快照里的 elapsed 包含开始延时
        match snapshot.state {
            StepState::WaitingToStart => check_within(path, snapshot.elapsed, self.start_delay)?,
            StepState::Animating if snapshot.elapsed + tolerance(self.start_delay) < self.start_delay => {
                return Err(SnapshotError::mismatch(
                    path,
                    format!("进行中的步骤 elapsed >= {}", self.start_delay),
                    snapshot.elapsed.to_string(),
                ));
            }
            _ => {}
        }
        let waited = snapshot.elapsed.min(self.start_delay);
        let elapsed = (snapshot.elapsed - self.start_delay).max(0.0);

        match &mut self.kind {
            StepKind::Tween(tween) => {
                match snapshot.tween {
                    Some(resolved) => {
                        let expected = tween.adapter.kind();
                        for value in [resolved.start, resolved.target] {
                            if value.kind() != expected {
                                return Err(SnapshotError::mismatch(
                                    path,
                                    format!("{expected:?} 类型的补间端点"),
                                    format!("{:?}", value.kind()),
                                ));
                            }
                        }
                        if !(resolved.duration.is_finite() && resolved.duration >= 0.0) {
                            return Err(SnapshotError::mismatch(
                                path,
                                "有限且非负的补间时长",
                                resolved.duration.to_string(),
                            ));
                        }
                        check_within(path, elapsed, resolved.duration)?;
                    }
                    None if snapshot.state == StepState::Animating => {
                        return Err(SnapshotError::mismatch(
                            path,
                            "进行中的补间需要起点与终点",
                            "缺失",
                        ));
                    }
                    None => {}
                }
                tween.resolved = snapshot.tween;
            }
            StepKind::Custom(custom) => {
                if let Some(duration) = custom.duration {
                    check_within(path, elapsed, duration)?;
                }
                custom.finished_by_callback =
                    required(snapshot.finished_by_callback, path, "finished_by_callback")?;
            }
            StepKind::Trigger(trigger) => {
                check_within(path, elapsed, trigger.total())?;
                trigger.fired = required(snapshot.fired, path, "fired")?;
            }
            StepKind::Delay(delay) => check_within(path, elapsed, delay.duration)?,
            StepKind::Parallel(children) => restore_children(children, snapshot, path)?,
            StepKind::Serial(serial) => {
                restore_children(&mut serial.children, snapshot, path)?;
                let index = required(snapshot.index, path, "index")?;
                if index > serial.children.len() {
                    return Err(SnapshotError::mismatch(
                        path,
                        format!("index <= {}", serial.children.len()),
                        index.to_string(),
                    ));
                }
                // 当前下标之前的子步骤必须都已结束
                if let Some(i) = serial.children[..index].iter().position(|c| !c.is_finished()) {
                    return Err(SnapshotError::mismatch(
                        &format!("{path}.children[{i}]"),
                        "finished",
                        format!("{:?}", serial.children[i].state()),
                    ));
                }
                serial.index = index;
            }
        }

        self.progress = Progress {
            state: snapshot.state,
            elapsed,
            waited,
        };
        Ok(())
    }
}

/// 浮点误差容限
fn tolerance(limit: f32) -> f32 {
    1e-4 * limit.max(1.0)
}

fn check_within(path: &str, elapsed: f32, limit: f32) -> Result<(), SnapshotError> {
    if elapsed <= limit + tolerance(limit) {
        Ok(())
    } else {
        Err(SnapshotError::mismatch(
            path,
            format!("elapsed <= {limit}"),
            elapsed.to_string(),
        ))
    }
}

fn required<T>(field: Option<T>, path: &str, name: &str) -> Result<T, SnapshotError> {
    field.ok_or_else(|| SnapshotError::mismatch(path, format!("{name} 字段"), "缺失"))
}

fn restore_children(
    children: &mut [Step],
    snapshot: &StepSnapshot,
    path: &str,
) -> Result<(), SnapshotError> {
    if children.len() != snapshot.children.len() {
        return Err(SnapshotError::mismatch(
            path,
            format!("{} 个子步骤", children.len()),
            format!("{} 个子步骤", snapshot.children.len()),
        ));
    }
    for (i, (child, child_snapshot)) in children.iter_mut().zip(&snapshot.children).enumerate() {
        child.restore(child_snapshot, &format!("{path}.children[{i}]"))?;
    }
    Ok(())
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Step");
        s.field("kind", &self.tag())
            .field("state", &self.progress.state)
            .field("elapsed", &self.progress.elapsed);
        match &self.kind {
            StepKind::Parallel(children) => {
                s.field("children", children);
            }
            StepKind::Serial(serial) => {
                s.field("index", &serial.index).field("children", &serial.children);
            }
            _ => {}
        }
        s.finish()
    }
}

/// 步骤模板
///
/// 由构造器或 [`crate::steps`] 中的工厂函数生成，只描述"要做什么"；
/// 调用 `start()` 时才变成运行时步骤。两条路径产出的模板完全相同。
pub struct StepTemplate {
    pub(crate) step: Step,
}

impl StepTemplate {
    pub(crate) fn new(kind: StepKind) -> Self {
        Self {
            step: Step::new(kind),
        }
    }

    pub(crate) fn into_runtime(self) -> Step {
        self.step
    }

    /// 步骤类型
    pub fn kind(&self) -> StepKindTag {
        self.step.tag()
    }

    /// 附加结束回调
    pub fn on_finish(mut self, callback: impl FnMut(bool) + 'static) -> Self {
        self.step.on_finish = Some(infallible_finish(callback));
        self
    }

    /// 附加可能失败的结束回调
    pub fn try_on_finish(
        mut self,
        callback: impl FnMut(bool) -> Result<(), CallbackError> + 'static,
    ) -> Self {
        self.step.on_finish = Some(Box::new(callback));
        self
    }

    /// 设置取消时是否跳到终点
    pub fn complete_on_cancel(mut self, complete: bool) -> Self {
        self.step.complete_on_cancel = Some(complete);
        self
    }
}

impl fmt::Debug for StepTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StepTemplate").field(&self.step).finish()
    }
}

pub(crate) fn infallible_finish(mut callback: impl FnMut(bool) + 'static) -> FinishCallback {
    Box::new(move |cancelled| {
        callback(cancelled);
        Ok(())
    })
}
