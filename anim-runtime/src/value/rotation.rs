//! # Rotation 模块
//!
//! 旋转的多种等价表示，以及它们与规范形式（单位四元数）之间的转换。
//!
//! | 表示 | 参数 | 规范形式 |
//! |------|------|----------|
//! | `Angle` | 平面角 | 绕 +Z 旋转 |
//! | `Signed2D` | 平面角，限制在 (-π, π] | 绕 +Z 旋转 |
//! | `Spherical` | 倾角 θ、方位角 φ | +X 转到球面方向的最短弧 |
//! | `Cartesian` | 欧拉角 (x, y, z)，XYZ 顺序 | `Quat::from_euler` |
//! | `AxisAngle` | 轴 + 角 | `Quat::from_axis_angle` |
//! | `Direction` | 方向向量 | +X 转到该方向的最短弧 |
//! | `Basis` | 正交基三列 | `Quat::from_mat3` |

use std::f32::consts::{PI, TAU};

use glam::{EulerRot, Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// 旋转值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rotation {
    /// 平面角（弧度，可超过一圈）
    Angle { angle: f32 },
    /// 带符号平面角（弧度，(-π, π]）
    Signed2D { angle: f32 },
    /// 球坐标方向
    Spherical { theta: f32, phi: f32 },
    /// 欧拉角
    Cartesian { x: f32, y: f32, z: f32 },
    /// 轴角
    AxisAngle { axis: Vec3, angle: f32 },
    /// 方向向量
    Direction { direction: Vec3 },
    /// 正交基
    Basis { x: Vec3, y: Vec3, z: Vec3 },
}

/// 旋转表示的种类（不带参数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationRepr {
    Angle,
    Signed2D,
    Spherical,
    Cartesian,
    AxisAngle,
    Direction,
    Basis,
}

impl RotationRepr {
    /// 全部表示
    pub const ALL: [RotationRepr; 7] = [
        RotationRepr::Angle,
        RotationRepr::Signed2D,
        RotationRepr::Spherical,
        RotationRepr::Cartesian,
        RotationRepr::AxisAngle,
        RotationRepr::Direction,
        RotationRepr::Basis,
    ];

    /// 是否为平面角表示
    pub fn is_planar(self) -> bool {
        matches!(self, RotationRepr::Angle | RotationRepr::Signed2D)
    }

    /// 是否能无损还原任意三维旋转
    pub fn is_lossless(self) -> bool {
        matches!(
            self,
            RotationRepr::Cartesian | RotationRepr::AxisAngle | RotationRepr::Basis
        )
    }
}

/// 平面旋转方向
///
/// 只影响两端都是平面角的补间。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationDirection {
    /// 直接使用 target - start
    #[default]
    Unspecified,
    /// 逆时针（角度增加）
    Positive,
    /// 顺时针（角度减小）
    Negative,
    /// 最短路径
    Shortest,
}

impl RotationDirection {
    /// 按方向调整角度差
    pub fn adjust(self, delta: f32) -> f32 {
        match self {
            RotationDirection::Unspecified => delta,
            RotationDirection::Positive => delta.rem_euclid(TAU),
            RotationDirection::Negative => {
                let wrapped = delta.rem_euclid(TAU);
                if wrapped > 0.0 { wrapped - TAU } else { 0.0 }
            }
            RotationDirection::Shortest => wrap_signed(delta),
        }
    }
}

/// 把角度限制到 (-π, π]
pub(crate) fn wrap_signed(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// 球坐标 → 单位方向
fn spherical_direction(theta: f32, phi: f32) -> Vec3 {
    Vec3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos())
}

/// 把 +X 转到 `direction` 的最短弧
fn arc_from_x(direction: Vec3) -> Quat {
    let direction = direction.normalize_or_zero();
    if direction == Vec3::ZERO {
        Quat::IDENTITY
    } else {
        Quat::from_rotation_arc(Vec3::X, direction)
    }
}

impl Rotation {
    pub fn angle(angle: f32) -> Self {
        Self::Angle { angle }
    }

    pub fn signed_2d(angle: f32) -> Self {
        Self::Signed2D {
            angle: wrap_signed(angle),
        }
    }

    pub fn spherical(theta: f32, phi: f32) -> Self {
        Self::Spherical { theta, phi }
    }

    pub fn cartesian(x: f32, y: f32, z: f32) -> Self {
        Self::Cartesian { x, y, z }
    }

    pub fn axis_angle(axis: Vec3, angle: f32) -> Self {
        Self::AxisAngle { axis, angle }
    }

    pub fn direction(direction: Vec3) -> Self {
        Self::Direction { direction }
    }

    pub fn basis(x: Vec3, y: Vec3, z: Vec3) -> Self {
        Self::Basis { x, y, z }
    }

    /// 表示种类
    pub fn repr(&self) -> RotationRepr {
        match self {
            Rotation::Angle { .. } => RotationRepr::Angle,
            Rotation::Signed2D { .. } => RotationRepr::Signed2D,
            Rotation::Spherical { .. } => RotationRepr::Spherical,
            Rotation::Cartesian { .. } => RotationRepr::Cartesian,
            Rotation::AxisAngle { .. } => RotationRepr::AxisAngle,
            Rotation::Direction { .. } => RotationRepr::Direction,
            Rotation::Basis { .. } => RotationRepr::Basis,
        }
    }

    /// 平面角（仅平面表示有值）
    pub fn planar_angle(&self) -> Option<f32> {
        match self {
            Rotation::Angle { angle } | Rotation::Signed2D { angle } => Some(*angle),
            _ => None,
        }
    }

    /// 以同一种平面表示替换角度
    ///
    /// 非平面表示原样返回。
    pub fn with_planar_angle(&self, angle: f32) -> Self {
        match self {
            Rotation::Angle { .. } => Rotation::Angle { angle },
            Rotation::Signed2D { .. } => Rotation::signed_2d(angle),
            other => *other,
        }
    }

    /// 转为规范形式（单位四元数）
    pub fn to_quat(&self) -> Quat {
        match *self {
            Rotation::Angle { angle } | Rotation::Signed2D { angle } => Quat::from_rotation_z(angle),
            Rotation::Spherical { theta, phi } => arc_from_x(spherical_direction(theta, phi)),
            Rotation::Cartesian { x, y, z } => Quat::from_euler(EulerRot::XYZ, x, y, z),
            Rotation::AxisAngle { axis, angle } => {
                let axis = axis.normalize_or_zero();
                if axis == Vec3::ZERO {
                    Quat::IDENTITY
                } else {
                    Quat::from_axis_angle(axis, angle)
                }
            }
            Rotation::Direction { direction } => arc_from_x(direction),
            Rotation::Basis { x, y, z } => Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize(),
        }
    }

    /// 从规范形式转回指定表示
    ///
    /// 平面与方向类表示只保留 +X 轴的朝向。
    pub fn from_quat(repr: RotationRepr, q: Quat) -> Self {
        let heading = q * Vec3::X;
        match repr {
            RotationRepr::Angle => Rotation::Angle {
                angle: heading.y.atan2(heading.x),
            },
            RotationRepr::Signed2D => Rotation::signed_2d(heading.y.atan2(heading.x)),
            RotationRepr::Spherical => Rotation::Spherical {
                theta: heading.z.clamp(-1.0, 1.0).acos(),
                phi: heading.y.atan2(heading.x),
            },
            RotationRepr::Cartesian => {
                let (x, y, z) = q.to_euler(EulerRot::XYZ);
                Rotation::Cartesian { x, y, z }
            }
            RotationRepr::AxisAngle => {
                let (axis, angle) = q.to_axis_angle();
                Rotation::AxisAngle { axis, angle }
            }
            RotationRepr::Direction => Rotation::Direction { direction: heading },
            RotationRepr::Basis => {
                let m = Mat3::from_quat(q);
                Rotation::Basis {
                    x: m.x_axis,
                    y: m.y_axis,
                    z: m.z_axis,
                }
            }
        }
    }

    /// 两个旋转之间的角距离（弧度）
    pub fn distance(&self, other: &Rotation) -> f32 {
        match (self.planar_angle(), other.planar_angle()) {
            (Some(a), Some(b)) => (b - a).abs(),
            _ => self.to_quat().angle_between(other.to_quat()),
        }
    }

    /// 在两个（可能不同表示的）旋转之间插值，结果使用 `target` 的表示
    pub fn interpolate(&self, target: &Rotation, t: f32) -> Rotation {
        if let (Some(a), Some(b)) = (self.planar_angle(), target.planar_angle()) {
            return target.with_planar_angle(a + (b - a) * t);
        }
        let q = self.to_quat().slerp(target.to_quat(), t);
        Rotation::from_quat(target.repr(), q)
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::Angle { angle: 0.0 }
    }
}

/// 单个数字按平面角处理
impl From<f32> for Rotation {
    fn from(angle: f32) -> Self {
        Rotation::Angle { angle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_wrap_signed() {
        assert!(approx(wrap_signed(3.0 * PI / 2.0), -PI / 2.0));
        assert!(approx(wrap_signed(-PI), PI));
        assert!(approx(wrap_signed(0.5), 0.5));
    }

    #[test]
    fn test_direction_adjust() {
        let delta = 3.0 * PI / 2.0;
        assert!(approx(RotationDirection::Unspecified.adjust(delta), delta));
        assert!(approx(RotationDirection::Positive.adjust(delta), delta));
        assert!(approx(RotationDirection::Negative.adjust(delta), -PI / 2.0));
        assert!(approx(RotationDirection::Shortest.adjust(delta), -PI / 2.0));
    }

    #[test]
    fn test_planar_interpolation_keeps_turns() {
        // 平面角之间按标量插值，多圈旋转不会被折叠
        let start = Rotation::angle(0.0);
        let target = Rotation::angle(4.0 * PI);
        let mid = start.interpolate(&target, 0.5);
        assert_eq!(mid, Rotation::angle(2.0 * PI));
    }

    #[test]
    fn test_roundtrip_lossless() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 2.0, 3.0).normalize(), 0.8);
        for repr in RotationRepr::ALL.into_iter().filter(|r| r.is_lossless()) {
            let rotation = Rotation::from_quat(repr, q);
            assert!(rotation.to_quat().angle_between(q) < 1e-4, "{repr:?}");
        }
    }

    #[test]
    fn test_spherical_direction() {
        // θ = π/2, φ = π/2 指向 +Y
        let rotation = Rotation::spherical(PI / 2.0, PI / 2.0);
        let heading = rotation.to_quat() * Vec3::X;
        assert!((heading - Vec3::Y).length() < 1e-4);

        let back = Rotation::from_quat(RotationRepr::Spherical, rotation.to_quat());
        match back {
            Rotation::Spherical { theta, phi } => {
                assert!(approx(theta, PI / 2.0));
                assert!(approx(phi, PI / 2.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_angle_and_axis_angle_agree() {
        let planar = Rotation::angle(0.7);
        let axis = Rotation::axis_angle(Vec3::Z, 0.7);
        assert!(planar.to_quat().angle_between(axis.to_quat()) < 1e-5);
        assert!(approx(planar.distance(&axis), 0.0));
    }
}
