//! 纯时间驱动的步骤：Custom / Trigger / Delay。

use super::{CustomCallback, Progress, StepState, StepStatus, TriggerCallback};
use crate::easing::Progression;
use crate::error::AnimResult;

/// 自定义步骤
pub(crate) struct Custom {
    pub(crate) callback: CustomCallback,
    /// `None` 表示无限时长，只能由回调返回 `true` 结束
    pub(crate) duration: Option<f32>,
    pub(crate) progression: Progression,
    pub(crate) start_percent: f32,
    pub(crate) finished_by_callback: bool,
}

impl Custom {
    pub(crate) fn new(callback: CustomCallback, duration: Option<f32>) -> Self {
        Self {
            callback,
            duration,
            progression: Progression::linear(),
            start_percent: 0.0,
            finished_by_callback: false,
        }
    }

    pub(crate) fn advance(&mut self, progress: &mut Progress, dt: f32) -> AnimResult<StepStatus> {
        if progress.state == StepState::WaitingToStart {
            progress.state = StepState::Animating;
            progress.elapsed = match self.duration {
                Some(duration) => self.progression.invert(self.start_percent) * duration,
                None => 0.0,
            };
        }

        let (done, reached_end) = match self.duration {
            Some(duration) => {
                progress.elapsed = (progress.elapsed + dt).min(duration);
                let percent = if duration > 0.0 {
                    progress.elapsed / duration
                } else {
                    1.0
                };
                let done = (self.callback)(self.progression.apply(percent))?;
                (done, percent >= 1.0)
            }
            None => {
                progress.elapsed += dt;
                ((self.callback)(progress.elapsed)?, false)
            }
        };

        if done {
            self.finished_by_callback = true;
        }
        if done || reached_end {
            Ok(StepStatus::Finished)
        } else {
            Ok(StepStatus::Running)
        }
    }

    /// 有限时长的回调以终点进度调用一次；无限时长的没有终点可跳
    pub(crate) fn complete(&mut self, progress: &mut Progress) -> AnimResult<()> {
        if let Some(duration) = self.duration {
            progress.elapsed = duration;
            (self.callback)(1.0)?;
        }
        Ok(())
    }
}

/// 触发步骤
pub(crate) struct Trigger {
    pub(crate) callback: TriggerCallback,
    pub(crate) delay: f32,
    /// 触发后保持的时间
    pub(crate) hold: f32,
    pub(crate) fired: bool,
}

impl Trigger {
    pub(crate) fn new(callback: TriggerCallback) -> Self {
        Self {
            callback,
            delay: 0.0,
            hold: 0.0,
            fired: false,
        }
    }

    pub(crate) fn total(&self) -> f32 {
        self.delay + self.hold
    }

    pub(crate) fn advance(&mut self, progress: &mut Progress, dt: f32) -> AnimResult<StepStatus> {
        progress.state = StepState::Animating;
        progress.elapsed = (progress.elapsed + dt).min(self.total());

        if !self.fired && progress.elapsed >= self.delay {
            self.fire()?;
        }

        if self.fired && progress.elapsed >= self.total() {
            Ok(StepStatus::Finished)
        } else {
            Ok(StepStatus::Running)
        }
    }

    pub(crate) fn complete(&mut self, progress: &mut Progress) -> AnimResult<()> {
        progress.elapsed = self.total();
        if !self.fired {
            self.fire()?;
        }
        Ok(())
    }

    fn fire(&mut self) -> AnimResult<()> {
        // 先标记，回调出错也不会再次触发
        self.fired = true;
        (self.callback)()?;
        Ok(())
    }
}

/// 延时步骤
pub(crate) struct Delay {
    pub(crate) duration: f32,
}

impl Delay {
    pub(crate) fn advance(&mut self, progress: &mut Progress, dt: f32) -> StepStatus {
        progress.state = StepState::Animating;
        progress.elapsed = (progress.elapsed + dt).min(self.duration);
        if progress.elapsed >= self.duration {
            StepStatus::Finished
        } else {
            StepStatus::Running
        }
    }

    pub(crate) fn complete(&mut self, progress: &mut Progress) {
        progress.elapsed = self.duration;
    }
}
