//! 组合步骤：Parallel / Serial。

use super::{Progress, Step, StepState, StepStatus};
use crate::error::AnimResult;
use crate::target::Animatable;

/// 并行推进所有子步骤，全部结束时结束
pub(crate) fn advance_parallel(
    children: &mut [Step],
    progress: &mut Progress,
    dt: f32,
    target: &dyn Animatable,
) -> AnimResult<StepStatus> {
    progress.state = StepState::Animating;
    progress.elapsed += dt;

    let mut running = false;
    for child in children.iter_mut() {
        if child.advance(dt, target)? == StepStatus::Running {
            running = true;
        }
    }

    Ok(if running {
        StepStatus::Running
    } else {
        StepStatus::Finished
    })
}

/// 串行步骤
pub(crate) struct Serial {
    pub(crate) children: Vec<Step>,
    /// 当前子步骤下标
    pub(crate) index: usize,
}

impl Serial {
    pub(crate) fn new(children: Vec<Step>) -> Self {
        Self { children, index: 0 }
    }

    /// 尚未结束的子步骤
    pub(crate) fn pending_mut(&mut self) -> &mut [Step] {
        let start = self.index.min(self.children.len());
        &mut self.children[start..]
    }

    /// 只推进当前子步骤
    ///
    /// 子步骤结束后，后续子步骤在同一帧以 `dt = 0` 开始，直到某个仍在进行；
    /// 本帧剩余的时间不会带入下一个子步骤。
    pub(crate) fn advance(
        &mut self,
        progress: &mut Progress,
        dt: f32,
        target: &dyn Animatable,
    ) -> AnimResult<StepStatus> {
        progress.state = StepState::Animating;
        progress.elapsed += dt;

        let mut dt = dt;
        while let Some(child) = self.children.get_mut(self.index) {
            if child.advance(dt, target)? == StepStatus::Running {
                return Ok(StepStatus::Running);
            }
            self.index += 1;
            dt = 0.0;
        }
        Ok(StepStatus::Finished)
    }

    /// 按顺序完成剩余子步骤
    pub(crate) fn complete(&mut self, target: &dyn Animatable) -> AnimResult<()> {
        while let Some(child) = self.children.get_mut(self.index) {
            child.complete(target)?;
            self.index += 1;
        }
        Ok(())
    }
}
