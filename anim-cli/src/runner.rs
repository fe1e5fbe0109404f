//! # Runner 模块
//!
//! 在内存属性表上无窗口地播放时间线。
//!
//! 采样时间由帧序号换算，避免长时间运行时的累加误差。

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anim_runtime::{
    AnimationEvent, AnimationManager, CancelPolicy, Clock, ManagerSnapshot, Property,
    PropertyStore, RuntimeConfig, SnapshotVersion, TimelineFile, Value,
};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AppConfig;

/// 未指定 `--until` 时的最长运行时间（秒）
pub const MAX_RUN_SECONDS: f32 = 600.0;

/// 比较两次运行时允许的误差
const TOLERANCE: f32 = 1e-5;

/// 加载时间线文件
pub fn load_timelines(path: impl AsRef<Path>) -> Result<TimelineFile> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("读取时间线文件失败: {}", path.display()))?;
    let file = TimelineFile::from_json(&content)
        .with_context(|| format!("解析时间线文件失败: {}", path.display()))?;
    if file.timelines.is_empty() {
        bail!("时间线文件中没有任何时间线: {}", path.display());
    }
    Ok(file)
}

// ========== 场景 ==========

/// 一帧采样结果
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// 驱动时间（秒，不含倍速）
    pub time: f32,
    pub values: Vec<(Property, Value)>,
    pub events: Vec<AnimationEvent>,
}

/// 一个属性表加上驱动它的管理器
pub struct Scene {
    store: PropertyStore,
    manager: AnimationManager,
    clock: Clock,
    frame_delta: f32,
    frames: u64,
}

impl Scene {
    /// 创建场景，时间线注册为同名配方
    pub fn new(file: &TimelineFile, config: &AppConfig) -> Self {
        let store = PropertyStore::new();
        let manager = manager_for(&store, file, &config.runtime);
        Self {
            store,
            manager,
            clock: Clock::from_config(&config.runtime.clock),
            frame_delta: config.frame_delta(),
            frames: 0,
        }
    }

    /// 从保存的状态恢复场景
    pub fn restore(
        file: &TimelineFile,
        config: &AppConfig,
        saved: &SavedState,
        frames: u64,
    ) -> Result<Self> {
        let mut scene = Self::new(file, config);
        scene.store.load(&saved.scene);
        scene
            .manager
            .set_state(&saved.manager)
            .context("恢复动画快照失败")?;
        scene.frames = frames;
        Ok(scene)
    }

    /// 启动文件中的全部时间线，并以 dt = 0 推进一帧写入初始值
    pub fn start_all(&mut self, file: &TimelineFile) -> Result<Frame> {
        for timeline in &file.timelines {
            self.manager
                .play(&timeline.id)
                .with_context(|| format!("启动时间线失败: {}", timeline.id))?;
        }
        info!(count = file.timelines.len(), "已启动时间线");
        self.advance(0.0)
    }

    /// 推进一帧
    pub fn tick(&mut self) -> Result<Frame> {
        self.frames += 1;
        let dt = self.clock.delta(self.frame_delta);
        self.advance(dt)
    }

    fn advance(&mut self, dt: f32) -> Result<Frame> {
        let events = self.manager.next_frame(dt)?;
        for event in &events {
            debug!(time = self.time(), event = ?event, "动画事件");
        }
        Ok(Frame {
            time: self.time(),
            values: self.store.snapshot(),
            events,
        })
    }

    /// 推进到指定时间，返回途中的帧
    pub fn run_until(&mut self, until: f32) -> Result<Vec<Frame>> {
        let target = (until / self.frame_delta).round().max(0.0) as u64;
        let mut frames = Vec::new();
        while self.frames < target && self.manager.is_animating() {
            frames.push(self.tick()?);
        }
        Ok(frames)
    }

    pub fn time(&self) -> f32 {
        self.frames as f32 * self.frame_delta
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_animating(&self) -> bool {
        self.manager.is_animating()
    }

    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    pub fn manager_mut(&mut self) -> &mut AnimationManager {
        &mut self.manager
    }

    /// 保存逻辑进度与场景值
    pub fn save(&self) -> SavedState {
        SavedState {
            manager: self.manager.get_state(),
            scene: self.store.snapshot(),
        }
    }
}

fn manager_for(
    store: &PropertyStore,
    file: &TimelineFile,
    config: &RuntimeConfig,
) -> AnimationManager {
    AnimationManager::new(store.shared())
        .with_config(config.manager.clone())
        .with_recipes(file.recipes())
}

// ========== 保存状态 ==========

/// 快照文件内容
///
/// 管理器快照只记录逻辑进度，属性值需要一并保存。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    pub manager: ManagerSnapshot,
    pub scene: Vec<(Property, Value)>,
}

impl SavedState {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("序列化快照失败")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let saved: SavedState = serde_json::from_str(json).context("解析快照失败")?;
        if !saved.manager.version.is_compatible() {
            bail!(
                "快照版本不兼容: 快照版本 {}，当前版本 {}",
                saved.manager.version,
                SnapshotVersion::current()
            );
        }
        Ok(saved)
    }
}

// ========== run ==========

/// `run` 的结果
#[derive(Debug, Clone)]
pub struct RunReport {
    pub frames: Vec<Frame>,
    /// 运行中发生过变化的属性
    pub animated: Vec<Property>,
    /// 是否在时间限制内全部结束
    pub finished: bool,
}

/// 播放全部时间线直到结束或到达 `until`
pub fn run(file: &TimelineFile, config: &AppConfig, until: Option<f32>) -> Result<RunReport> {
    let mut scene = Scene::new(file, config);
    let mut frames = vec![scene.start_all(file)?];
    frames.extend(scene.run_until(until.unwrap_or(MAX_RUN_SECONDS))?);

    let finished = !scene.is_animating();
    if !finished && until.is_none() {
        warn!(limit = MAX_RUN_SECONDS, "超过最长运行时间，停止播放");
    }

    Ok(RunReport {
        animated: animated_properties(&frames),
        frames,
        finished,
    })
}

/// 找出任意一帧与第一帧不同的属性
pub fn animated_properties(frames: &[Frame]) -> Vec<Property> {
    let Some(first) = frames.first() else {
        return Vec::new();
    };
    let changed: BTreeSet<usize> = frames
        .iter()
        .flat_map(|frame| {
            frame
                .values
                .iter()
                .zip(&first.values)
                .enumerate()
                .filter(|(_, (a, b))| a != b)
                .map(|(index, _)| index)
        })
        .collect();
    changed
        .into_iter()
        .map(|index| first.values[index].0)
        .collect()
}

// ========== resume ==========

/// 第一处不一致
#[derive(Debug, Clone, PartialEq)]
pub struct Divergence {
    pub time: f32,
    pub property: Property,
    pub expected: Value,
    pub actual: Value,
}

/// `resume` 的结果
#[derive(Debug, Clone)]
pub struct ResumeReport {
    /// 实际拍快照的时间
    pub at: f32,
    pub saved: SavedState,
    /// 恢复后比较过的帧数
    pub compared: usize,
    pub divergence: Option<Divergence>,
}

/// 运行到 `at` 拍快照，恢复到新场景后与原场景并行推进并逐帧比较
pub fn resume(file: &TimelineFile, config: &AppConfig, at: f32) -> Result<ResumeReport> {
    let mut original = Scene::new(file, config);
    original.start_all(file)?;
    original.run_until(at)?;
    let at = original.time();

    // 经过 JSON 往返，与写入文件的内容一致
    let saved = SavedState::from_json(&original.save().to_json()?)?;
    info!(
        time = at,
        animations = saved.manager.animations.len(),
        "已拍摄快照"
    );
    let mut restored = Scene::restore(file, config, &saved, original.frames())?;

    let limit = (MAX_RUN_SECONDS / config.frame_delta()).round() as u64;
    let mut compared = 0;
    let mut divergence = None;
    while (original.is_animating() || restored.is_animating()) && original.frames() < limit {
        let expected = original.tick()?;
        let actual = restored.tick()?;
        compared += 1;
        if divergence.is_none() {
            divergence = first_difference(&expected, &actual);
        }
    }

    Ok(ResumeReport {
        at,
        saved,
        compared,
        divergence,
    })
}

fn first_difference(expected: &Frame, actual: &Frame) -> Option<Divergence> {
    expected
        .values
        .iter()
        .zip(&actual.values)
        .find(|((_, a), (_, b))| !values_close(a, b))
        .map(|((property, a), (_, b))| Divergence {
            time: expected.time,
            property: *property,
            expected: *a,
            actual: *b,
        })
}

/// 按误差比较两个值
pub fn values_close(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Scalar(x), Value::Scalar(y)) => (x - y).abs() <= TOLERANCE,
        (Value::Vec2(x), Value::Vec2(y)) => x.abs_diff_eq(*y, TOLERANCE),
        (Value::Vec3(x), Value::Vec3(y)) => x.abs_diff_eq(*y, TOLERANCE),
        (Value::Color(x), Value::Color(y)) => x.abs_diff_eq(*y, TOLERANCE),
        (Value::Rotation(x), Value::Rotation(y)) => {
            x.repr() == y.repr() && x.to_quat().dot(y.to_quat()).abs() >= 1.0 - TOLERANCE
        }
        (Value::Transform(x), Value::Transform(y)) => {
            x.position.abs_diff_eq(y.position, TOLERANCE)
                && x.scale.abs_diff_eq(y.scale, TOLERANCE)
                && (x.rotation - y.rotation).abs() <= TOLERANCE
        }
        (Value::Flag(x), Value::Flag(y)) => x == y,
        _ => false,
    }
}

// ========== cancel ==========

/// `cancel` 的结果
#[derive(Debug, Clone)]
pub struct CancelReport {
    pub policy: CancelPolicy,
    /// 实际取消的时间
    pub at: f32,
    pub before: Vec<(Property, Value)>,
    /// 取消调用返回后立即的值
    pub after: Vec<(Property, Value)>,
    /// 取消时产生的事件
    pub events: Vec<AnimationEvent>,
    /// 取消后的帧（animateToComplete 的收尾过程）
    pub frames: Vec<Frame>,
    /// 全部结束的时间
    pub settled_at: Option<f32>,
    /// 整个过程中发生过变化的属性
    pub animated: Vec<Property>,
}

/// 运行到 `at` 后对全部动画应用取消策略，再推进到结束
pub fn cancel(
    file: &TimelineFile,
    config: &AppConfig,
    at: f32,
    policy: CancelPolicy,
) -> Result<CancelReport> {
    let mut scene = Scene::new(file, config);
    let mut history = vec![scene.start_all(file)?];
    history.extend(scene.run_until(at)?);

    let time = scene.time();
    let before = scene.store().snapshot();
    let manager = scene.manager_mut();
    manager.cancel_all(policy)?;
    let events = manager.drain_events();
    let after = scene.store().snapshot();
    info!(time, %policy, events = events.len(), "已取消全部动画");

    let frames = scene.run_until(MAX_RUN_SECONDS)?;
    let settled_at = (!scene.is_animating()).then(|| scene.time());

    history.push(Frame {
        time,
        values: after.clone(),
        events: Vec::new(),
    });
    history.extend(frames.iter().cloned());

    Ok(CancelReport {
        policy,
        at: time,
        before,
        after,
        events,
        animated: animated_properties(&history),
        frames,
        settled_at,
    })
}

// ========== 输出格式 ==========

/// 格式化单个值
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Scalar(v) => format!("{v:.3}"),
        Value::Vec2(v) => format!("({:.3}, {:.3})", v.x, v.y),
        Value::Vec3(v) => format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z),
        Value::Color(c) => format!("rgba({:.3}, {:.3}, {:.3}, {:.3})", c.x, c.y, c.z, c.w),
        Value::Rotation(r) => match r.planar_angle() {
            Some(angle) => format!("{angle:.3}rad"),
            None => {
                let q = r.to_quat();
                format!("quat({:.3}, {:.3}, {:.3}, {:.3})", q.x, q.y, q.z, q.w)
            }
        },
        Value::Transform(t) => format!(
            "[pos ({:.3}, {:.3}) scale ({:.3}, {:.3}) rot {:.3}rad]",
            t.position.x, t.position.y, t.scale.x, t.scale.y, t.rotation
        ),
        Value::Flag(v) => v.to_string(),
    }
}

/// 格式化事件
pub fn format_event(event: &AnimationEvent) -> String {
    match event {
        AnimationEvent::Started(id) => format!("started {id}"),
        AnimationEvent::Finished(id) => format!("finished {id}"),
        AnimationEvent::Cancelled(id, policy) => format!("cancelled {id} ({policy})"),
    }
}

/// 格式化属性列表，只输出 `properties` 中列出的属性
pub fn format_values(values: &[(Property, Value)], properties: &[Property]) -> String {
    values
        .iter()
        .filter(|(property, _)| properties.contains(property))
        .map(|(property, value)| format!("{property}={}", format_value(value)))
        .collect::<Vec<_>>()
        .join("  ")
}

/// 格式化一帧
pub fn format_frame(frame: &Frame, properties: &[Property]) -> String {
    let mut line = format!("t={:>7.3}  {}", frame.time, format_values(&frame.values, properties));
    if !frame.events.is_empty() {
        let events: Vec<String> = frame.events.iter().map(format_event).collect();
        line.push_str(&format!("  [{}]", events.join(", ")));
    }
    line
}
