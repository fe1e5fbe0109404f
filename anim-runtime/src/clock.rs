//! # Clock 模块
//!
//! 驱动方持有的时钟上下文。
//!
//! 调度器本身不读取任何全局时间；暂停、倍速与帧间隔上限都由驱动方
//! 通过 [`Clock`] 显式传入 `next_frame_at`。

use serde::{Deserialize, Serialize};

use crate::config::ClockConfig;

/// 时钟
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    /// 倍速
    pub speed: f32,
    /// 是否暂停
    pub paused: bool,
    /// 单帧原始间隔上限（秒），防止卡顿后一帧跳过太多
    pub max_delta: Option<f32>,
    /// 上一次的绝对时间
    #[serde(skip)]
    last_time: Option<f64>,
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            speed: 1.0,
            paused: false,
            max_delta: None,
            last_time: None,
        }
    }
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从配置创建
    pub fn from_config(config: &ClockConfig) -> Self {
        Self {
            speed: config.speed,
            max_delta: config.max_frame_delta,
            ..Self::default()
        }
    }

    /// 设置倍速
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// 设置单帧间隔上限
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = Some(max_delta);
        self
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// 把原始帧间隔换算成逻辑时间
    ///
    /// 依次应用：负值归零、间隔上限、暂停、倍速。
    pub fn delta(&self, raw: f32) -> f32 {
        let mut dt = raw.max(0.0);
        if let Some(max) = self.max_delta {
            dt = dt.min(max);
        }
        if self.paused {
            return 0.0;
        }
        dt * self.speed.max(0.0)
    }

    /// 由绝对时间求逻辑帧间隔
    ///
    /// 第一次调用返回 0；暂停期间仍会记录时间，恢复后不会补上暂停的时长。
    pub fn delta_to(&mut self, now: f64) -> f32 {
        let raw = match self.last_time {
            Some(last) => (now - last) as f32,
            None => 0.0,
        };
        self.last_time = Some(now);
        self.delta(raw)
    }

    /// 上一次记录的绝对时间
    pub fn last_time(&self) -> Option<f64> {
        self.last_time
    }

    /// 忘记上一次的绝对时间（例如恢复快照后重新开始计时）
    pub fn reset(&mut self) {
        self.last_time = None;
    }
}
