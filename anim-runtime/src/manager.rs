//! # Manager 模块
//!
//! 动画管理器。
//!
//! 一个管理器驱动一个目标对象上的所有动画：
//! ```rust,ignore
//! let mut manager = AnimationManager::new(Rc::new(store.clone()));
//! manager.new_animation(Some("grow")).scale(2.0).start()?;
//! loop {
//!     let events = manager.next_frame(dt)?;
//!     // 值已经直接写到目标上
//! }
//! ```
//!
//! 同一帧内动画按加入顺序推进；多个动画写同一属性时，后加入的覆盖先加入的。

use std::fmt;
use std::rc::Rc;

use tracing::{debug, info, trace, warn};

use crate::animation::Animation;
use crate::builder::{AnimationBuilder, Sequence};
use crate::clock::Clock;
use crate::config::ManagerConfig;
use crate::error::{AnimResult, SnapshotError};
use crate::recipe::RecipeBook;
use crate::snapshot::{AnimationSnapshot, ManagerSnapshot, SnapshotVersion};
use crate::target::Animatable;

/// 管理器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManagerState {
    /// 没有动画
    #[default]
    Idle,
    /// 至少有一个动画在播放
    Animating,
}

/// 取消策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelPolicy {
    /// 立即移除；只有标记了 complete_on_cancel 的部分会跳到终点
    #[default]
    Cancel,
    /// 跳到终点，触发所有未触发的回调
    Complete,
    /// 原地停止，不写值、不回调
    Freeze,
    /// 在收尾时间内加速播放到终点
    AnimateToComplete,
}

impl CancelPolicy {
    pub fn name(self) -> &'static str {
        match self {
            Self::Cancel => "cancel",
            Self::Complete => "complete",
            Self::Freeze => "freeze",
            Self::AnimateToComplete => "animate_to_complete",
        }
    }
}

impl fmt::Display for CancelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 动画事件
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationEvent {
    /// 动画开始
    Started(String),
    /// 动画自然结束
    Finished(String),
    /// 动画被取消
    Cancelled(String, CancelPolicy),
}

/// 动画管理器
pub struct AnimationManager {
    /// 动画目标
    target: Rc<dyn Animatable>,
    /// 动画列表（按加入顺序）
    animations: Vec<Animation>,
    state: ManagerState,
    config: ManagerConfig,
    /// 快照恢复用的配方
    recipes: RecipeBook,
    /// 待处理的事件队列
    events: Vec<AnimationEvent>,
    /// 下一个匿名动画编号
    next_anonymous: u64,
}

impl fmt::Debug for AnimationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationManager")
            .field("state", &self.state)
            .field("animations", &self.animations)
            .field("recipes", &self.recipes)
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl AnimationManager {
    /// 创建驱动 `target` 的管理器
    pub fn new(target: Rc<dyn Animatable>) -> Self {
        Self {
            target,
            animations: Vec::new(),
            state: ManagerState::Idle,
            config: ManagerConfig::default(),
            recipes: RecipeBook::new(),
            events: Vec::new(),
            next_anonymous: 0,
        }
    }

    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_recipes(mut self, recipes: RecipeBook) -> Self {
        self.recipes = recipes;
        self
    }

    pub fn target(&self) -> &Rc<dyn Animatable> {
        &self.target
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    fn anonymous_id(&mut self) -> String {
        let id = format!("_anim_{}", self.next_anonymous);
        self.next_anonymous += 1;
        id
    }

    // ========== 构造 ==========

    /// 开始构造新动画，`start()` 之前不会运行
    pub fn new_animation(&mut self, id: Option<&str>) -> AnimationBuilder<'_> {
        AnimationBuilder::new(self, id.map(str::to_string))
    }

    /// 向已有动画追加步骤；ID 不存在时 `start()` 什么也不做
    pub fn add_to(&mut self, id: &str) -> AnimationBuilder<'_> {
        AnimationBuilder::add_to(self, id.to_string())
    }

    /// 直接启动一条序列
    ///
    /// 已有同名动画时先按 [`CancelPolicy::Cancel`] 取消它。
    /// 没有步骤的动画立即结束（`when_finished` 当场调用），不会进入列表。
    pub fn start_sequence(&mut self, id: Option<String>, sequence: Sequence) -> AnimResult<String> {
        let (steps, when_finished, complete_on_cancel) = sequence.into_parts()?;
        let id = match id {
            Some(id) => id,
            None => self.anonymous_id(),
        };

        if self.contains(&id) {
            debug!(id = %id, "替换同名动画");
            self.cancel(&id, CancelPolicy::Cancel)?;
        }

        let mut animation = Animation::new(id.clone(), steps, when_finished, complete_on_cancel);
        self.events.push(AnimationEvent::Started(id.clone()));

        if animation.step_count() == 0 {
            debug!(id = %id, "空动画立即结束");
            animation.advance(0.0, self.target.as_ref())?;
            self.events.push(AnimationEvent::Finished(id.clone()));
            return Ok(id);
        }

        info!(id = %id, steps = animation.step_count(), "启动动画");
        self.animations.push(animation);
        self.state = ManagerState::Animating;
        Ok(id)
    }

    /// 追加到已有动画
    pub fn append_sequence(&mut self, id: String, sequence: Sequence) -> AnimResult<String> {
        let (steps, when_finished, complete_on_cancel) = sequence.into_parts()?;
        match self.animations.iter_mut().find(|a| a.id() == id) {
            Some(animation) => {
                debug!(id = %id, steps = steps.len(), "追加步骤");
                animation.append(steps, when_finished, complete_on_cancel);
            }
            None => debug!(id = %id, "追加目标不存在，忽略"),
        }
        Ok(id)
    }

    /// 注册配方
    pub fn define(&mut self, id: impl Into<String>, recipe: impl Fn(Sequence) -> Sequence + 'static) {
        self.recipes.define(id, recipe);
    }

    /// 按配方启动动画，动画 ID 即配方 ID
    pub fn play(&mut self, id: &str) -> AnimResult<String> {
        let sequence = self.recipes.build(id)?;
        self.start_sequence(Some(id.to_string()), sequence)
    }

    // ========== 推进 ==========

    /// 推进一帧
    ///
    /// 回调出错时，本帧已结束的动画照常移除，错误原样返回；
    /// 已产生的事件留在队列里，可通过 [`AnimationManager::drain_events`] 取出。
    /// `when_finished` 出错时动画已经结束，它的 `Finished` 事件同样入队。
    pub fn next_frame(&mut self, dt: f32) -> AnimResult<Vec<AnimationEvent>> {
        let dt = dt.max(0.0);
        let target = Rc::clone(&self.target);

        let mut result = Ok(());
        for animation in self.animations.iter_mut() {
            match animation.advance(dt, target.as_ref()) {
                Ok(true) => {
                    info!(id = %animation.id(), "动画结束");
                    self.events.push(AnimationEvent::Finished(animation.id().to_string()));
                }
                Ok(false) => {}
                Err(e) => {
                    if animation.is_finished() {
                        warn!(id = %animation.id(), error = %e, "结束回调出错");
                        self.events.push(AnimationEvent::Finished(animation.id().to_string()));
                    }
                    result = Err(e);
                    break;
                }
            }
        }

        self.remove_finished();
        result?;
        Ok(std::mem::take(&mut self.events))
    }

    /// 绝对时间版本：帧间隔由时钟换算
    pub fn next_frame_at(&mut self, now: f64, clock: &mut Clock) -> AnimResult<Vec<AnimationEvent>> {
        let dt = clock.delta_to(now);
        self.next_frame(dt)
    }

    fn remove_finished(&mut self) {
        self.animations.retain(|a| !a.is_finished());
        if self.animations.is_empty() && self.state == ManagerState::Animating {
            trace!("管理器空闲");
            self.state = ManagerState::Idle;
        }
    }

    // ========== 取消 ==========

    /// 按策略取消所有动画
    pub fn cancel_all(&mut self, policy: CancelPolicy) -> AnimResult<()> {
        info!(?policy, count = self.animations.len(), "取消所有动画");
        let target = Rc::clone(&self.target);
        let wrap_up = self.config.wrap_up_duration;

        let mut result = Ok(());
        for animation in self.animations.iter_mut() {
            if let Err(e) = apply_policy(animation, policy, wrap_up, target.as_ref(), &mut self.events) {
                result = Err(e);
                break;
            }
        }

        self.remove_finished();
        result
    }

    /// 按策略取消指定动画
    ///
    /// # 返回
    /// 是否找到了该动画
    pub fn cancel(&mut self, id: &str, policy: CancelPolicy) -> AnimResult<bool> {
        let target = Rc::clone(&self.target);
        let wrap_up = self.config.wrap_up_duration;

        let Some(animation) = self.animations.iter_mut().find(|a| a.id() == id) else {
            debug!(id = %id, "取消目标不存在");
            return Ok(false);
        };
        info!(id = %id, ?policy, "取消动画");
        let result = apply_policy(animation, policy, wrap_up, target.as_ref(), &mut self.events);

        self.remove_finished();
        result.map(|_| true)
    }

    /// 冻结并丢弃所有动画，不产生事件
    pub fn clear(&mut self) {
        self.animations.clear();
        self.events.clear();
        self.state = ManagerState::Idle;
    }

    // ========== 快照 ==========

    /// 记录所有未结束动画的逻辑进度
    pub fn get_state(&self) -> ManagerSnapshot {
        let animations: Vec<AnimationSnapshot> = self
            .animations
            .iter()
            .filter(|a| !a.is_finished())
            .map(Animation::snapshot)
            .collect();
        info!(count = animations.len(), "记录动画快照");
        ManagerSnapshot::new(animations)
    }

    /// 用快照替换当前动画列表
    ///
    /// 每个动画都按配方重建后再覆盖进度；任何一个失败都会在修改列表之前返回错误。
    /// 被替换掉的动画直接丢弃，不调用回调。
    pub fn set_state(&mut self, snapshot: &ManagerSnapshot) -> AnimResult<()> {
        if !snapshot.version.is_compatible() {
            return Err(SnapshotError::IncompatibleVersion {
                snapshot_version: snapshot.version.to_string(),
                current_version: SnapshotVersion::current().to_string(),
            }
            .into());
        }

        let mut rebuilt = Vec::with_capacity(snapshot.animations.len());
        for saved in &snapshot.animations {
            let sequence = self.recipes.build(&saved.id)?;
            let (steps, when_finished, complete_on_cancel) = sequence.into_parts()?;
            let mut animation = Animation::new(saved.id.clone(), steps, when_finished, complete_on_cancel);
            animation.restore(saved)?;
            rebuilt.push(animation);
        }

        info!(count = rebuilt.len(), "从快照恢复动画");
        self.animations = rebuilt;
        self.state = if self.animations.is_empty() {
            ManagerState::Idle
        } else {
            ManagerState::Animating
        };
        Ok(())
    }

    // ========== 查询方法 ==========

    pub fn state(&self) -> ManagerState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.state == ManagerState::Animating
    }

    /// 列表中的动画数量
    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.animations.iter().any(|a| a.id() == id)
    }

    pub fn animation(&self, id: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.id() == id)
    }

    /// 所有动画 ID（按加入顺序）
    pub fn ids(&self) -> Vec<&str> {
        self.animations.iter().map(Animation::id).collect()
    }

    /// 剩余时间（秒）
    ///
    /// `id` 为 `None` 时取所有动画中最长的。
    ///
    /// # 返回
    /// - `Some(t)`: 剩余 `t` 秒；ID 不存在时为 0
    /// - `None`: 存在无限时长的步骤
    pub fn remaining_time(&self, id: Option<&str>) -> Option<f32> {
        let target = self.target.as_ref();
        match id {
            Some(id) => self
                .animation(id)
                .map_or(Some(0.0), |a| a.remaining_time(target)),
            None => self
                .animations
                .iter()
                .map(|a| a.remaining_time(target))
                .try_fold(0.0_f32, |acc, r| r.map(|r| acc.max(r))),
        }
    }

    /// 最近一个动画结束前的剩余时间（秒）
    ///
    /// 只看有限且大于 0 的剩余时间；没有这样的动画时为 `None`。
    pub fn next_finish_time(&self) -> Option<f32> {
        let target = self.target.as_ref();
        self.animations
            .iter()
            .filter_map(|a| a.remaining_time(target))
            .filter(|r| *r > 0.0)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// 取出队列中的事件
    pub fn drain_events(&mut self) -> Vec<AnimationEvent> {
        std::mem::take(&mut self.events)
    }
}

/// 对单个动画执行取消策略
fn apply_policy(
    animation: &mut Animation,
    policy: CancelPolicy,
    wrap_up: f32,
    target: &dyn Animatable,
    events: &mut Vec<AnimationEvent>,
) -> AnimResult<()> {
    match policy {
        CancelPolicy::Cancel => animation.cancel(target)?,
        CancelPolicy::Complete => animation.complete(target)?,
        CancelPolicy::Freeze => animation.freeze(),
        CancelPolicy::AnimateToComplete => {
            if animation.hurry(wrap_up, target) {
                // 仍在列表中，之后自然结束
                return Ok(());
            }
            animation.complete(target)?;
        }
    }
    events.push(AnimationEvent::Cancelled(animation.id().to_string(), policy));
    Ok(())
}
