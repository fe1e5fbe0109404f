//! # Value 模块
//!
//! 可动画的值与属性。
//!
//! ## 核心概念
//!
//! - [`Property`]：目标对象上可读写的属性，每个属性有固定的 [`ValueKind`]
//! - [`Value`]：按值类型区分的标签联合
//! - [`ValueAdapter`]：每种值类型一份的插值/叠加/距离逻辑，构造步骤时选定

mod adapter;
mod rotation;
mod transform;

use std::fmt;

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

pub use adapter::{ValueAdapter, adapter_for};
pub use rotation::{Rotation, RotationDirection, RotationRepr};
pub use transform::Transform;

/// RGBA 颜色（各分量 0.0 - 1.0）
pub type Color = Vec4;

/// 值类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// 标量
    Scalar,
    /// 二维向量
    Vec2,
    /// 三维向量
    Vec3,
    /// 颜色
    Color,
    /// 旋转（多种表示）
    Rotation,
    /// 变换（位置 + 缩放 + 平面旋转）
    Transform,
    /// 布尔标记（只做瞬时写入，不插值）
    Flag,
}

/// 可动画属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// 平面位置
    Position,
    /// 三维位置
    Position3,
    /// 缩放
    Scale,
    /// 旋转
    Rotation,
    /// 组合变换
    Transform,
    /// 当前颜色
    Color,
    /// 变暗时使用的颜色（只读语义）
    DimColor,
    /// 默认颜色（只读语义）
    DefaultColor,
    /// 透明度
    Opacity,
    /// 是否显示
    Shown,
}

impl Property {
    /// 全部属性
    pub const ALL: [Property; 10] = [
        Property::Position,
        Property::Position3,
        Property::Scale,
        Property::Rotation,
        Property::Transform,
        Property::Color,
        Property::DimColor,
        Property::DefaultColor,
        Property::Opacity,
        Property::Shown,
    ];

    /// 属性对应的值类型
    pub fn kind(self) -> ValueKind {
        match self {
            Property::Position | Property::Scale => ValueKind::Vec2,
            Property::Position3 => ValueKind::Vec3,
            Property::Rotation => ValueKind::Rotation,
            Property::Transform => ValueKind::Transform,
            Property::Color | Property::DimColor | Property::DefaultColor => ValueKind::Color,
            Property::Opacity => ValueKind::Scalar,
            Property::Shown => ValueKind::Flag,
        }
    }

    /// 属性名
    pub fn name(self) -> &'static str {
        match self {
            Property::Position => "position",
            Property::Position3 => "position3",
            Property::Scale => "scale",
            Property::Rotation => "rotation",
            Property::Transform => "transform",
            Property::Color => "color",
            Property::DimColor => "dim_color",
            Property::DefaultColor => "default_color",
            Property::Opacity => "opacity",
            Property::Shown => "shown",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 可动画的值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Scalar(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Color(Color),
    Rotation(Rotation),
    Transform(Transform),
    Flag(bool),
}

impl Value {
    /// 值的类型
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Scalar(_) => ValueKind::Scalar,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Color(_) => ValueKind::Color,
            Value::Rotation(_) => ValueKind::Rotation,
            Value::Transform(_) => ValueKind::Transform,
            Value::Flag(_) => ValueKind::Flag,
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Value::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            Value::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Value::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_rotation(&self) -> Option<Rotation> {
        match self {
            Value::Rotation(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_transform(&self) -> Option<Transform> {
        match self {
            Value::Transform(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Value::Flag(v) => Some(*v),
            _ => None,
        }
    }
}

/// 能作为补间端点的 Rust 类型
///
/// 把 `f32` / `Vec2` / `Rotation` 等具体类型与 [`ValueKind`] 绑定，
/// 让构造器在编译期就知道步骤的值类型。
pub trait AnimValue: Copy + 'static {
    /// 对应的值类型
    const KIND: ValueKind;

    /// 转为通用值
    fn into_value(self) -> Value;
}

impl AnimValue for f32 {
    const KIND: ValueKind = ValueKind::Scalar;
    fn into_value(self) -> Value {
        Value::Scalar(self)
    }
}

impl AnimValue for Vec2 {
    const KIND: ValueKind = ValueKind::Vec2;
    fn into_value(self) -> Value {
        Value::Vec2(self)
    }
}

impl AnimValue for Vec3 {
    const KIND: ValueKind = ValueKind::Vec3;
    fn into_value(self) -> Value {
        Value::Vec3(self)
    }
}

impl AnimValue for Vec4 {
    const KIND: ValueKind = ValueKind::Color;
    fn into_value(self) -> Value {
        Value::Color(self)
    }
}

impl AnimValue for Rotation {
    const KIND: ValueKind = ValueKind::Rotation;
    fn into_value(self) -> Value {
        Value::Rotation(self)
    }
}

impl AnimValue for Transform {
    const KIND: ValueKind = ValueKind::Transform;
    fn into_value(self) -> Value {
        Value::Transform(self)
    }
}

impl AnimValue for bool {
    const KIND: ValueKind = ValueKind::Flag;
    fn into_value(self) -> Value {
        Value::Flag(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_kinds() {
        assert_eq!(Property::Position.kind(), ValueKind::Vec2);
        assert_eq!(Property::Opacity.kind(), ValueKind::Scalar);
        assert_eq!(Property::DimColor.kind(), ValueKind::Color);
        assert_eq!(Property::Shown.kind(), ValueKind::Flag);
        assert_eq!(Property::ALL.len(), 10);
    }

    #[test]
    fn test_value_kind_matches_anim_value() {
        assert_eq!(0.5_f32.into_value().kind(), f32::KIND);
        assert_eq!(Vec2::ONE.into_value().kind(), Vec2::KIND);
        assert_eq!(Rotation::angle(1.0).into_value().kind(), Rotation::KIND);
        assert_eq!(true.into_value().kind(), bool::KIND);
    }

    #[test]
    fn test_value_serialization() {
        let value = Value::Vec2(Vec2::new(1.0, 2.0));
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"kind":"vec2","value":[1.0,2.0]}"#);

        let loaded: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, value);
    }
}
