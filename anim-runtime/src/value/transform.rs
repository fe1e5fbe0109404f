//! # Transform 模块
//!
//! 变换值，表示一个对象的位置、缩放与平面旋转。

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 变换值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// 位置
    pub position: Vec2,
    /// 缩放因子
    pub scale: Vec2,
    /// 旋转角度（弧度）
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }
}

impl Transform {
    /// 创建默认变换（无偏移、无缩放、无旋转）
    pub fn identity() -> Self {
        Self::default()
    }

    /// 设置位置
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// 设置缩放
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// 设置旋转
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// 线性插值
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            scale: self.scale.lerp(other.scale, t),
            rotation: self.rotation + (other.rotation - self.rotation) * t,
        }
    }

    /// 叠加增量（各分量相加）
    pub fn offset(&self, delta: &Self) -> Self {
        Self {
            position: self.position + delta.position,
            scale: self.scale + delta.scale,
            rotation: self.rotation + delta.rotation,
        }
    }

    /// 各分量变化量中的最大值
    pub fn max_component_distance(&self, other: &Self) -> f32 {
        let position = (other.position - self.position).abs().max_element();
        let scale = (other.scale - self.scale).abs().max_element();
        let rotation = (other.rotation - self.rotation).abs();
        position.max(scale).max(rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_lerp() {
        let a = Transform::identity();
        let b = Transform::identity()
            .with_position(Vec2::new(100.0, 200.0))
            .with_scale(Vec2::splat(2.0))
            .with_rotation(1.0);

        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.position, Vec2::new(50.0, 100.0));
        assert_eq!(mid.scale, Vec2::splat(1.5));
        assert_eq!(mid.rotation, 0.5);
    }

    #[test]
    fn test_offset_and_distance() {
        let a = Transform::identity();
        let delta = Transform {
            position: Vec2::new(3.0, -4.0),
            scale: Vec2::ZERO,
            rotation: 0.5,
        };
        let b = a.offset(&delta);
        assert_eq!(b.position, Vec2::new(3.0, -4.0));
        assert_eq!(b.scale, Vec2::ONE);
        assert_eq!(a.max_component_distance(&b), 4.0);
    }
}
