//! # Snapshot 模块
//!
//! 动画进度快照的数据模型。
//!
//! ## 设计原则
//!
//! - 只记录逻辑进度（步骤下标、步骤内已过时间），不记录任何墙钟时间
//! - 快照不包含闭包；恢复时由配方重建动画，再把进度覆盖上去
//! - 必须有版本号，支持向后兼容检测

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::animation::AnimationState;
use crate::error::SnapshotError;
use crate::step::StepState;
use crate::value::Value;

/// 快照格式版本
///
/// 版本号含义：
/// - MAJOR: 不兼容的格式变更
/// - MINOR: 向后兼容的新字段
pub const SNAPSHOT_VERSION_MAJOR: u32 = 1;
pub const SNAPSHOT_VERSION_MINOR: u32 = 0;

/// 快照版本信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotVersion {
    pub major: u32,
    pub minor: u32,
}

impl SnapshotVersion {
    /// 当前版本
    pub fn current() -> Self {
        Self {
            major: SNAPSHOT_VERSION_MAJOR,
            minor: SNAPSHOT_VERSION_MINOR,
        }
    }

    /// major 相同即兼容
    pub fn is_compatible(&self) -> bool {
        self.major == SNAPSHOT_VERSION_MAJOR
    }
}

impl Default for SnapshotVersion {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// 步骤类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKindTag {
    Tween,
    Custom,
    Trigger,
    Delay,
    Parallel,
    Serial,
}

impl StepKindTag {
    pub fn name(self) -> &'static str {
        match self {
            StepKindTag::Tween => "tween",
            StepKindTag::Custom => "custom",
            StepKindTag::Trigger => "trigger",
            StepKindTag::Delay => "delay",
            StepKindTag::Parallel => "parallel",
            StepKindTag::Serial => "serial",
        }
    }
}

/// 补间开始时确定的起点、终点与时长
///
/// 开始后目标属性会被补间自己改写，所以起点必须随快照保存，不能在恢复时重新读取。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TweenProgress {
    pub start: Value,
    pub target: Value,
    pub duration: f32,
}

/// 单个步骤的进度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSnapshot {
    pub kind: StepKindTag,
    pub state: StepState,
    /// 步骤内已过的逻辑时间（秒），包含开始延时
    pub elapsed: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tween: Option<TweenProgress>,
    /// Trigger 是否已触发
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fired: Option<bool>,
    /// Custom 是否由回调结束
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_by_callback: Option<bool>,
    /// Serial 当前子步骤下标
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StepSnapshot>,
}

/// 单个动画的进度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSnapshot {
    pub id: String,
    pub state: AnimationState,
    /// 时间缩放（animateToComplete 会调高它）
    #[serde(default = "default_time_scale")]
    pub time_scale: f32,
    pub root: StepSnapshot,
}

fn default_time_scale() -> f32 {
    1.0
}

/// 管理器快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerSnapshot {
    /// 快照格式版本
    pub version: SnapshotVersion,
    /// 按插入顺序排列的动画
    pub animations: Vec<AnimationSnapshot>,
}

impl ManagerSnapshot {
    pub fn new(animations: Vec<AnimationSnapshot>) -> Self {
        Self {
            version: SnapshotVersion::current(),
            animations,
        }
    }

    /// 是否没有任何动画
    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    /// 序列化为 JSON 字符串
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// 从 JSON 字符串反序列化
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: ManagerSnapshot = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;

        // 检查版本兼容性
        if !snapshot.version.is_compatible() {
            return Err(SnapshotError::IncompatibleVersion {
                snapshot_version: snapshot.version.to_string(),
                current_version: SnapshotVersion::current().to_string(),
            });
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn sample() -> ManagerSnapshot {
        let tween = StepSnapshot {
            kind: StepKindTag::Tween,
            state: StepState::Animating,
            elapsed: 0.5,
            tween: Some(TweenProgress {
                start: Value::Vec2(Vec2::ZERO),
                target: Value::Vec2(Vec2::ONE),
                duration: 1.0,
            }),
            fired: None,
            finished_by_callback: None,
            index: None,
            children: Vec::new(),
        };
        ManagerSnapshot::new(vec![AnimationSnapshot {
            id: "move".to_string(),
            state: AnimationState::Animating,
            time_scale: 1.0,
            root: StepSnapshot {
                kind: StepKindTag::Serial,
                state: StepState::Animating,
                elapsed: 0.5,
                tween: None,
                fired: None,
                finished_by_callback: None,
                index: Some(0),
                children: vec![tween],
            },
        }])
    }

    #[test]
    fn test_snapshot_version_compatibility() {
        assert!(SnapshotVersion::current().is_compatible());
        assert!(SnapshotVersion { major: 1, minor: 7 }.is_compatible());
        assert!(!SnapshotVersion { major: 2, minor: 0 }.is_compatible());
        assert_eq!(SnapshotVersion { major: 1, minor: 2 }.to_string(), "1.2");
    }

    #[test]
    fn test_snapshot_json() {
        let snapshot = sample();
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"move\""));
        // 未使用的可选字段不写出
        assert!(!json.contains("fired"));

        let loaded = ManagerSnapshot::from_json(&json).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_incompatible_version_error() {
        let json = r#"{
            "version": { "major": 99, "minor": 0 },
            "animations": []
        }"#;
        let result = ManagerSnapshot::from_json(json);
        assert!(matches!(
            result,
            Err(SnapshotError::IncompatibleVersion { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        let result = ManagerSnapshot::from_json("{ not json");
        assert!(matches!(
            result,
            Err(SnapshotError::DeserializationFailed(_))
        ));
    }
}
