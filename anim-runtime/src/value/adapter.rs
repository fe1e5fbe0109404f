//! # Adapter 模块
//!
//! 每种值类型一个无状态适配器。补间在构造时通过 [`adapter_for`] 选定适配器，
//! 之后每帧直接调用，不再按值类型分派。

use super::{Property, Rotation, Value, ValueKind};
use crate::target::Animatable;

/// 值适配器
///
/// 所有方法在参数类型与适配器不符时返回 `None`，由调用方转成错误。
pub trait ValueAdapter: Sync {
    /// 适配的值类型
    fn kind(&self) -> ValueKind;

    /// 插值；`t >= 1` 时精确返回 `target`
    fn interpolate(&self, start: &Value, target: &Value, t: f32) -> Option<Value>;

    /// 在起点上叠加增量
    fn offset(&self, start: &Value, delta: &Value) -> Option<Value>;

    /// 按比例缩放起点
    fn scaled(&self, start: &Value, factor: f32) -> Option<Value>;

    /// 变化量大小，用于由速度推导时长
    fn distance(&self, start: &Value, target: &Value) -> Option<f32>;

    /// 把值写入目标
    fn apply(&self, target: &dyn Animatable, property: Property, value: Value) -> bool {
        target.set_value(property, value)
    }
}

/// 获取值类型对应的适配器
pub fn adapter_for(kind: ValueKind) -> &'static dyn ValueAdapter {
    match kind {
        ValueKind::Scalar => &ScalarAdapter,
        ValueKind::Vec2 => &Vec2Adapter,
        ValueKind::Vec3 => &Vec3Adapter,
        ValueKind::Color => &ColorAdapter,
        ValueKind::Rotation => &RotationAdapter,
        ValueKind::Transform => &TransformAdapter,
        ValueKind::Flag => &FlagAdapter,
    }
}

struct ScalarAdapter;

impl ValueAdapter for ScalarAdapter {
    fn kind(&self) -> ValueKind {
        ValueKind::Scalar
    }

    fn interpolate(&self, start: &Value, target: &Value, t: f32) -> Option<Value> {
        let (a, b) = (start.as_scalar()?, target.as_scalar()?);
        if t >= 1.0 {
            return Some(*target);
        }
        Some(Value::Scalar(a + (b - a) * t))
    }

    fn offset(&self, start: &Value, delta: &Value) -> Option<Value> {
        Some(Value::Scalar(start.as_scalar()? + delta.as_scalar()?))
    }

    fn scaled(&self, start: &Value, factor: f32) -> Option<Value> {
        Some(Value::Scalar(start.as_scalar()? * factor))
    }

    fn distance(&self, start: &Value, target: &Value) -> Option<f32> {
        Some((target.as_scalar()? - start.as_scalar()?).abs())
    }
}

struct Vec2Adapter;

impl ValueAdapter for Vec2Adapter {
    fn kind(&self) -> ValueKind {
        ValueKind::Vec2
    }

    fn interpolate(&self, start: &Value, target: &Value, t: f32) -> Option<Value> {
        let (a, b) = (start.as_vec2()?, target.as_vec2()?);
        if t >= 1.0 {
            return Some(*target);
        }
        Some(Value::Vec2(a.lerp(b, t)))
    }

    fn offset(&self, start: &Value, delta: &Value) -> Option<Value> {
        Some(Value::Vec2(start.as_vec2()? + delta.as_vec2()?))
    }

    fn scaled(&self, start: &Value, factor: f32) -> Option<Value> {
        Some(Value::Vec2(start.as_vec2()? * factor))
    }

    fn distance(&self, start: &Value, target: &Value) -> Option<f32> {
        Some((target.as_vec2()? - start.as_vec2()?).abs().max_element())
    }
}

struct Vec3Adapter;

impl ValueAdapter for Vec3Adapter {
    fn kind(&self) -> ValueKind {
        ValueKind::Vec3
    }

    fn interpolate(&self, start: &Value, target: &Value, t: f32) -> Option<Value> {
        let (a, b) = (start.as_vec3()?, target.as_vec3()?);
        if t >= 1.0 {
            return Some(*target);
        }
        Some(Value::Vec3(a.lerp(b, t)))
    }

    fn offset(&self, start: &Value, delta: &Value) -> Option<Value> {
        Some(Value::Vec3(start.as_vec3()? + delta.as_vec3()?))
    }

    fn scaled(&self, start: &Value, factor: f32) -> Option<Value> {
        Some(Value::Vec3(start.as_vec3()? * factor))
    }

    fn distance(&self, start: &Value, target: &Value) -> Option<f32> {
        Some((target.as_vec3()? - start.as_vec3()?).abs().max_element())
    }
}

struct ColorAdapter;

impl ValueAdapter for ColorAdapter {
    fn kind(&self) -> ValueKind {
        ValueKind::Color
    }

    fn interpolate(&self, start: &Value, target: &Value, t: f32) -> Option<Value> {
        let (a, b) = (start.as_color()?, target.as_color()?);
        if t >= 1.0 {
            return Some(*target);
        }
        Some(Value::Color(a.lerp(b, t)))
    }

    fn offset(&self, start: &Value, delta: &Value) -> Option<Value> {
        Some(Value::Color(start.as_color()? + delta.as_color()?))
    }

    fn scaled(&self, start: &Value, factor: f32) -> Option<Value> {
        Some(Value::Color(start.as_color()? * factor))
    }

    fn distance(&self, start: &Value, target: &Value) -> Option<f32> {
        Some((target.as_color()? - start.as_color()?).abs().max_element())
    }
}

struct RotationAdapter;

impl ValueAdapter for RotationAdapter {
    fn kind(&self) -> ValueKind {
        ValueKind::Rotation
    }

    fn interpolate(&self, start: &Value, target: &Value, t: f32) -> Option<Value> {
        let (a, b) = (start.as_rotation()?, target.as_rotation()?);
        if t >= 1.0 {
            return Some(*target);
        }
        Some(Value::Rotation(a.interpolate(&b, t)))
    }

    /// 平面表示直接叠加角度；其他表示按四元数复合（先起点，再增量）
    fn offset(&self, start: &Value, delta: &Value) -> Option<Value> {
        let (a, d) = (start.as_rotation()?, delta.as_rotation()?);
        let rotation = match (a.planar_angle(), d.planar_angle()) {
            (Some(angle), Some(delta_angle)) => a.with_planar_angle(angle + delta_angle),
            _ => Rotation::from_quat(a.repr(), d.to_quat() * a.to_quat()),
        };
        Some(Value::Rotation(rotation))
    }

    fn scaled(&self, _start: &Value, _factor: f32) -> Option<Value> {
        None
    }

    fn distance(&self, start: &Value, target: &Value) -> Option<f32> {
        Some(start.as_rotation()?.distance(&target.as_rotation()?))
    }
}

struct TransformAdapter;

impl ValueAdapter for TransformAdapter {
    fn kind(&self) -> ValueKind {
        ValueKind::Transform
    }

    fn interpolate(&self, start: &Value, target: &Value, t: f32) -> Option<Value> {
        let (a, b) = (start.as_transform()?, target.as_transform()?);
        if t >= 1.0 {
            return Some(*target);
        }
        Some(Value::Transform(a.lerp(&b, t)))
    }

    fn offset(&self, start: &Value, delta: &Value) -> Option<Value> {
        Some(Value::Transform(
            start.as_transform()?.offset(&delta.as_transform()?),
        ))
    }

    fn scaled(&self, start: &Value, factor: f32) -> Option<Value> {
        let mut transform = start.as_transform()?;
        transform.scale *= factor;
        Some(Value::Transform(transform))
    }

    fn distance(&self, start: &Value, target: &Value) -> Option<f32> {
        Some(
            start
                .as_transform()?
                .max_component_distance(&target.as_transform()?),
        )
    }
}

/// 布尔值在终点瞬间切换
struct FlagAdapter;

impl ValueAdapter for FlagAdapter {
    fn kind(&self) -> ValueKind {
        ValueKind::Flag
    }

    fn interpolate(&self, start: &Value, target: &Value, t: f32) -> Option<Value> {
        start.as_flag()?;
        target.as_flag()?;
        Some(if t >= 1.0 { *target } else { *start })
    }

    fn offset(&self, _start: &Value, delta: &Value) -> Option<Value> {
        delta.as_flag().map(Value::Flag)
    }

    fn scaled(&self, _start: &Value, _factor: f32) -> Option<Value> {
        None
    }

    fn distance(&self, start: &Value, target: &Value) -> Option<f32> {
        let (a, b) = (start.as_flag()?, target.as_flag()?);
        Some(if a == b { 0.0 } else { 1.0 })
    }
}
