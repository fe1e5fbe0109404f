//! # Target 模块
//!
//! 动画目标接口。
//!
//! 引擎不拥有任何值：补间通过 [`Animatable`] 读取起点、写入插值结果。
//! 目标通常由场景图实现；[`PropertyStore`] 是一个内存实现，供测试和命令行驱动使用。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::{Vec2, Vec3, Vec4};

use crate::value::{Color, Property, Rotation, Transform, Value};

/// 可动画对象接口
///
/// 对象通过实现此 trait 声明自己有哪些属性可以被动画。
///
/// ## 设计说明
///
/// setter 使用 `&self`，实现方自行通过 `RefCell` 等方式提供内部可变性，
/// 这样管理器可以持有 `Rc<dyn Animatable>`，回调也可以同时持有同一个目标。
///
/// ## 实现示例
///
/// ```rust,ignore
/// struct Sprite {
///     opacity: RefCell<f32>,
/// }
///
/// impl Animatable for Sprite {
///     fn get_value(&self, property: Property) -> Option<Value> {
///         match property {
///             Property::Opacity => Some(Value::Scalar(*self.opacity.borrow())),
///             _ => None,
///         }
///     }
///
///     fn set_value(&self, property: Property, value: Value) -> bool {
///         match (property, value) {
///             (Property::Opacity, Value::Scalar(v)) => {
///                 *self.opacity.borrow_mut() = v;
///                 true
///             }
///             _ => false,
///         }
///     }
///
///     fn property_list(&self) -> &'static [Property] {
///         &[Property::Opacity]
///     }
/// }
/// ```
pub trait Animatable: 'static {
    /// 获取属性的当前值
    ///
    /// # 返回
    /// - `Some(value)`: 属性存在，返回当前值
    /// - `None`: 属性不存在
    fn get_value(&self, property: Property) -> Option<Value>;

    /// 设置属性的新值
    ///
    /// # 返回
    /// - `true`: 设置成功
    /// - `false`: 属性不存在或值类型不符
    fn set_value(&self, property: Property, value: Value) -> bool;

    /// 获取所有可动画属性的列表
    fn property_list(&self) -> &'static [Property];
}

/// 内存属性表
///
/// 克隆后共享同一份数据（`Rc<RefCell<..>>`），方便回调闭包捕获。
#[derive(Debug, Clone)]
pub struct PropertyStore {
    values: Rc<RefCell<HashMap<Property, Value>>>,
}

/// 属性表中直接存储的属性（`Transform` 由位置/缩放/旋转组合而成）
const STORED: [Property; 9] = [
    Property::Position,
    Property::Position3,
    Property::Scale,
    Property::Rotation,
    Property::Color,
    Property::DimColor,
    Property::DefaultColor,
    Property::Opacity,
    Property::Shown,
];

impl Default for PropertyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyStore {
    /// 创建带默认值的属性表
    pub fn new() -> Self {
        let values = HashMap::from([
            (Property::Position, Value::Vec2(Vec2::ZERO)),
            (Property::Position3, Value::Vec3(Vec3::ZERO)),
            (Property::Scale, Value::Vec2(Vec2::ONE)),
            (Property::Rotation, Value::Rotation(Rotation::default())),
            (Property::Color, Value::Color(Vec4::ONE)),
            (Property::DimColor, Value::Color(Vec4::new(0.5, 0.5, 0.5, 1.0))),
            (Property::DefaultColor, Value::Color(Vec4::ONE)),
            (Property::Opacity, Value::Scalar(1.0)),
            (Property::Shown, Value::Flag(true)),
        ]);
        Self {
            values: Rc::new(RefCell::new(values)),
        }
    }

    /// 设置初始值（构造期使用）
    pub fn with(self, property: Property, value: Value) -> Self {
        self.set_value(property, value);
        self
    }

    /// 作为 trait object 共享给管理器
    pub fn shared(&self) -> Rc<dyn Animatable> {
        Rc::new(self.clone())
    }

    pub fn position(&self) -> Vec2 {
        self.read(Property::Position, Value::as_vec2).unwrap_or(Vec2::ZERO)
    }

    pub fn position3(&self) -> Vec3 {
        self.read(Property::Position3, Value::as_vec3).unwrap_or(Vec3::ZERO)
    }

    pub fn scale(&self) -> Vec2 {
        self.read(Property::Scale, Value::as_vec2).unwrap_or(Vec2::ONE)
    }

    pub fn rotation(&self) -> Rotation {
        self.read(Property::Rotation, Value::as_rotation)
            .unwrap_or_default()
    }

    pub fn color(&self) -> Color {
        self.read(Property::Color, Value::as_color).unwrap_or(Vec4::ONE)
    }

    pub fn opacity(&self) -> f32 {
        self.read(Property::Opacity, Value::as_scalar).unwrap_or(1.0)
    }

    pub fn is_shown(&self) -> bool {
        self.read(Property::Shown, Value::as_flag).unwrap_or(true)
    }

    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position(),
            scale: self.scale(),
            rotation: self.rotation().planar_angle().unwrap_or_else(|| {
                let heading = self.rotation().to_quat() * Vec3::X;
                heading.y.atan2(heading.x)
            }),
        }
    }

    /// 按属性顺序导出全部值
    pub fn snapshot(&self) -> Vec<(Property, Value)> {
        let values = self.values.borrow();
        STORED
            .iter()
            .filter_map(|p| values.get(p).map(|v| (*p, *v)))
            .collect()
    }

    /// 载入导出的值
    pub fn load(&self, values: &[(Property, Value)]) {
        for (property, value) in values {
            self.set_value(*property, *value);
        }
    }

    fn read<T>(&self, property: Property, f: impl Fn(&Value) -> Option<T>) -> Option<T> {
        self.values.borrow().get(&property).and_then(f)
    }
}

impl Animatable for PropertyStore {
    fn get_value(&self, property: Property) -> Option<Value> {
        if property == Property::Transform {
            return Some(Value::Transform(self.transform()));
        }
        self.values.borrow().get(&property).copied()
    }

    fn set_value(&self, property: Property, value: Value) -> bool {
        if value.kind() != property.kind() {
            return false;
        }
        if let Value::Transform(transform) = value {
            let mut values = self.values.borrow_mut();
            values.insert(Property::Position, Value::Vec2(transform.position));
            values.insert(Property::Scale, Value::Vec2(transform.scale));
            values.insert(
                Property::Rotation,
                Value::Rotation(Rotation::angle(transform.rotation)),
            );
            return true;
        }
        self.values.borrow_mut().insert(property, value);
        true
    }

    fn property_list(&self) -> &'static [Property] {
        &Property::ALL
    }
}
