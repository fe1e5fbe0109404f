//! # Config 模块
//!
//! 引擎配置。
//!
//! 所有字段都有默认值，配置文件里缺失的字段按默认值补齐。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// 管理器配置
    #[serde(default)]
    pub manager: ManagerConfig,

    /// 时钟配置
    #[serde(default)]
    pub clock: ClockConfig,
}

/// 管理器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// animateToComplete 的收尾时间（秒）
    #[serde(default = "default_wrap_up_duration")]
    pub wrap_up_duration: f32,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            wrap_up_duration: default_wrap_up_duration(),
        }
    }
}

/// 时钟配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// 倍速
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// 单帧间隔上限（秒）
    #[serde(default)]
    pub max_frame_delta: Option<f32>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            max_frame_delta: None,
        }
    }
}

// 默认值函数
fn default_wrap_up_duration() -> f32 {
    0.25
}

fn default_speed() -> f32 {
    1.0
}

impl RuntimeConfig {
    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// 从文件加载配置
    ///
    /// 文件不存在或解析失败时使用默认值。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => match Self::from_json(&content) {
                Ok(config) => {
                    info!(path = %path.display(), "已加载配置文件");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "解析配置文件失败，使用默认配置");
                    Self::default()
                }
            },
            Err(_) => {
                warn!(path = %path.display(), "配置文件不存在，使用默认配置");
                Self::default()
            }
        }
    }
}
