//! # Error 模块
//!
//! 定义 anim-runtime 中使用的错误类型。

use thiserror::Error;

use crate::value::{Property, ValueKind};

/// 步骤构造错误
///
/// 在构造步骤时立即返回，不会拖到第一次推进才暴露。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    /// 补间既没有 target 也没有 delta
    #[error("{property} 补间缺少 target 或 delta")]
    MissingTarget { property: Property },

    /// 时长为负数（或 NaN）
    #[error("{step} 的时长无效：{duration}")]
    NegativeDuration { step: &'static str, duration: f32 },

    /// 速度必须为正数
    #[error("{property} 补间的速度必须为正数：{velocity}")]
    InvalidVelocity { property: Property, velocity: f32 },

    /// startPercent 超出 [0, 1]
    #[error("startPercent 必须位于 [0, 1]：{value}")]
    InvalidStartPercent { value: f32 },

    /// 值类型与属性不匹配
    #[error("{property} 期望 {expected:?} 类型的值，实际为 {actual:?}")]
    KindMismatch {
        property: Property,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// 目标对象无法读取该属性
    #[error("目标对象不支持属性 {property}")]
    UnsupportedProperty { property: Property },
}

/// 快照错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    /// 没有可以重建该动画的配方
    #[error("动画 '{id}' 没有注册配方，无法从快照重建")]
    UnknownRecipe { id: String },

    /// 快照与重建出的步骤结构不一致
    #[error("快照结构不匹配（{path}）：期望 {expected}，实际 {actual}")]
    StructureMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// 序列化失败
    #[error("序列化失败: {0}")]
    SerializationFailed(String),

    /// 反序列化失败
    #[error("反序列化失败: {0}")]
    DeserializationFailed(String),

    /// 版本不兼容
    #[error("快照版本不兼容: 快照版本 {snapshot_version} vs 当前版本 {current_version}")]
    IncompatibleVersion {
        snapshot_version: String,
        current_version: String,
    },
}

impl SnapshotError {
    pub(crate) fn mismatch(
        path: &str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::StructureMismatch {
            path: path.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// 用户回调返回的错误
///
/// 引擎不会吞掉回调错误，它们原样从 `next_frame` / `cancel` 返回给调用方。
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct CallbackError {
    pub message: String,
}

impl CallbackError {
    /// 创建回调错误
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// anim-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimError {
    /// 步骤错误
    #[error("步骤错误: {0}")]
    Step(#[from] StepError),

    /// 快照错误
    #[error("快照错误: {0}")]
    Snapshot(#[from] SnapshotError),

    /// 回调错误
    #[error("回调错误: {0}")]
    Callback(#[from] CallbackError),
}

/// Result 类型别名
pub type AnimResult<T> = Result<T, AnimError>;
