//! # Animation 模块
//!
//! 单条动画时间线。
//!
//! 一个 Animation 是一串按顺序执行的步骤（根步骤是隐式的 Serial），
//! 附带 `when_finished` 回调和取消时的行为标记。

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{AnimResult, SnapshotError};
use crate::snapshot::AnimationSnapshot;
use crate::step::{FinishCallback, Serial, Step, StepKind, StepState};
use crate::target::Animatable;

/// 剩余时间已不超过收尾时长时，至少按这个倍数加速
const MIN_HURRY_FACTOR: f32 = 2.0;

/// 动画状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationState {
    /// 已启动，尚未推进过
    #[default]
    WaitingToStart,
    /// 正在播放
    Animating,
    /// 已结束
    Finished,
}

impl AnimationState {
    /// 是否为活跃状态（需要更新）
    pub fn is_active(&self) -> bool {
        matches!(self, Self::WaitingToStart | Self::Animating)
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// 动画实例
pub struct Animation {
    id: String,
    root: Step,
    state: AnimationState,
    when_finished: Vec<FinishCallback>,
    /// 取消时按 complete 处理
    complete_on_cancel: bool,
    /// 推进时乘到 dt 上的系数
    time_scale: f32,
}

impl Animation {
    pub(crate) fn new(
        id: String,
        steps: Vec<Step>,
        when_finished: Vec<FinishCallback>,
        complete_on_cancel: bool,
    ) -> Self {
        Self {
            id,
            root: Step::new(StepKind::Serial(Serial::new(steps))),
            state: AnimationState::WaitingToStart,
            when_finished,
            complete_on_cancel,
            time_scale: 1.0,
        }
    }

    /// 动画 ID
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// 取消时是否按 complete 处理
    pub fn completes_on_cancel(&self) -> bool {
        self.complete_on_cancel
    }

    /// 顶层步骤数量
    pub fn step_count(&self) -> usize {
        self.serial().map_or(0, |s| s.children.len())
    }

    /// 当前执行到的顶层步骤下标
    pub fn current_step(&self) -> usize {
        self.serial().map_or(0, |s| s.index)
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    fn serial(&self) -> Option<&Serial> {
        match &self.root.kind {
            StepKind::Serial(serial) => Some(serial),
            _ => None,
        }
    }

    /// 追加步骤（addTo）
    pub(crate) fn append(
        &mut self,
        steps: Vec<Step>,
        when_finished: Vec<FinishCallback>,
        complete_on_cancel: bool,
    ) {
        if let StepKind::Serial(serial) = &mut self.root.kind {
            serial.children.extend(steps);
        }
        self.when_finished.extend(when_finished);
        self.complete_on_cancel |= complete_on_cancel;
    }

    /// 推进动画
    ///
    /// # 返回
    /// - `true`: 动画已结束
    /// - `false`: 动画仍在进行中
    pub(crate) fn advance(&mut self, dt: f32, target: &dyn Animatable) -> AnimResult<bool> {
        if self.is_finished() {
            return Ok(true);
        }
        self.state = AnimationState::Animating;

        let status = self.root.advance(dt * self.time_scale, target)?;
        if self.root.is_finished() {
            trace!(id = %self.id, ?status, "动画步骤全部结束");
            self.finish(false)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// 跳到终点并调用 `when_finished(true)`
    pub(crate) fn complete(&mut self, target: &dyn Animatable) -> AnimResult<()> {
        if self.is_finished() {
            return Ok(());
        }
        self.root.complete(target)?;
        self.finish(true)
    }

    /// 取消
    ///
    /// 标记了 `if_canceled_then_complete` 的动画按 complete 处理；
    /// 否则只有 `complete_on_cancel` 的步骤会跳到终点，`when_finished` 不会被调用。
    pub(crate) fn cancel(&mut self, target: &dyn Animatable) -> AnimResult<()> {
        if self.is_finished() {
            return Ok(());
        }
        if self.complete_on_cancel {
            return self.complete(target);
        }
        self.root.cancel(target, None)?;
        self.state = AnimationState::Finished;
        Ok(())
    }

    /// 原地停止，不写值、不回调
    pub(crate) fn freeze(&mut self) {
        self.state = AnimationState::Finished;
    }

    /// 把剩余时间压缩到 `wrap_up` 秒内
    ///
    /// 剩余时间本来就不超过 `wrap_up` 时按 `MIN_HURRY_FACTOR` 加速，
    /// 保证动画总是比原定时间更早结束。
    ///
    /// # 返回
    /// - `true`: 已调整时间缩放，动画会在后续帧自然到达终点
    /// - `false`: 无法压缩（剩余时间无限或 `wrap_up` 非正），调用方应改用 complete
    pub(crate) fn hurry(&mut self, wrap_up: f32, target: &dyn Animatable) -> bool {
        if wrap_up <= 0.0 {
            return false;
        }
        let Some(remaining) = self.remaining_time(target) else {
            return false;
        };

        let factor = if remaining > wrap_up {
            remaining / wrap_up
        } else {
            MIN_HURRY_FACTOR
        };
        self.time_scale *= factor;
        trace!(id = %self.id, time_scale = self.time_scale, "压缩剩余时间");
        true
    }

    /// 按当前时间缩放计算的剩余时间；`None` 表示无限
    pub(crate) fn remaining_time(&self, target: &dyn Animatable) -> Option<f32> {
        if self.is_finished() {
            return Some(0.0);
        }
        self.root
            .remaining_time(target)
            .map(|logical| logical / self.time_scale)
    }

    fn finish(&mut self, cancelled: bool) -> AnimResult<()> {
        self.state = AnimationState::Finished;
        for callback in self.when_finished.iter_mut() {
            callback(cancelled)?;
        }
        Ok(())
    }

    // ========== 快照 ==========

    pub(crate) fn snapshot(&self) -> AnimationSnapshot {
        AnimationSnapshot {
            id: self.id.clone(),
            state: self.state,
            time_scale: self.time_scale,
            root: self.root.snapshot(),
        }
    }

    /// 把快照中的进度覆盖到刚由配方重建的动画上
    pub(crate) fn restore(&mut self, snapshot: &AnimationSnapshot) -> Result<(), SnapshotError> {
        if snapshot.state.is_finished() {
            return Err(SnapshotError::mismatch(
                &snapshot.id,
                "未结束的动画",
                "finished",
            ));
        }
        if !(snapshot.time_scale.is_finite() && snapshot.time_scale > 0.0) {
            return Err(SnapshotError::mismatch(
                &snapshot.id,
                "正数 time_scale",
                snapshot.time_scale.to_string(),
            ));
        }

        self.root.restore(&snapshot.root, &snapshot.id)?;
        self.state = match self.root.state() {
            StepState::WaitingToStart => AnimationState::WaitingToStart,
            _ => AnimationState::Animating,
        };
        self.time_scale = snapshot.time_scale;
        Ok(())
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("time_scale", &self.time_scale)
            .field("when_finished", &self.when_finished.len())
            .field("root", &self.root)
            .finish()
    }
}
