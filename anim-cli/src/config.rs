//! # Config 模块
//!
//! 命令行工具配置。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::Path;
use std::str::FromStr;

use anim_runtime::RuntimeConfig;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::Level;

/// 应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 采样帧率
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// 日志级别（trace / debug / info / warn / error）
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 引擎配置
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            log_level: default_log_level(),
            runtime: RuntimeConfig::default(),
        }
    }
}

// 默认值函数
fn default_fps() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 命令行覆盖项
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub fps: Option<u32>,
    pub speed: Option<f32>,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// 读取并解析配置文件
    ///
    /// 调用时日志尚未初始化，所以这里只返回错误，由调用方决定如何提示。
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))
    }

    /// 应用命令行覆盖项
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(fps) = overrides.fps {
            self.fps = fps;
        }
        if let Some(speed) = overrides.speed {
            self.runtime.clock.speed = speed;
        }
        if let Some(level) = &overrides.log_level {
            self.log_level = level.clone();
        }
        self
    }

    /// 解析日志级别，无法识别时回退到 info
    pub fn level(&self) -> Level {
        Level::from_str(&self.log_level).unwrap_or(Level::INFO)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            bail!("fps 必须大于 0");
        }
        if !(self.runtime.clock.speed.is_finite() && self.runtime.clock.speed >= 0.0) {
            bail!("倍速必须是非负数: {}", self.runtime.clock.speed);
        }
        if self.runtime.manager.wrap_up_duration.is_nan() {
            bail!("wrap_up_duration 不能是 NaN");
        }
        Ok(())
    }

    /// 每帧间隔（秒）
    pub fn frame_delta(&self) -> f32 {
        1.0 / self.fps as f32
    }
}
