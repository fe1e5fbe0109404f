//! 旋转表示混合测试。
//!
//! 从表示 A 补间到表示 B，在 50% 处的结果必须与把两端都换成规范形式后的补间一致。

use anim_runtime::prelude::*;
use anim_runtime::{RotationRepr, Value};
use glam::{EulerRot, Quat};

fn samples() -> Vec<Rotation> {
    vec![
        Rotation::angle(0.3),
        Rotation::signed_2d(1.1),
        Rotation::spherical(1.2, 0.4),
        Rotation::cartesian(0.2, -0.3, 0.5),
        Rotation::axis_angle(Vec3::new(0.3, 0.4, 0.87).normalize(), 0.9),
        Rotation::direction(Vec3::new(1.0, 0.8, 0.3)),
        Rotation::from_quat(
            RotationRepr::Basis,
            Quat::from_euler(EulerRot::XYZ, -0.2, 0.1, 0.7),
        ),
    ]
}

/// 用无损表示（欧拉角）表达同一个规范旋转
fn canonical(rotation: Rotation) -> Rotation {
    Rotation::from_quat(RotationRepr::Cartesian, rotation.to_quat())
}

/// 以线性曲线从 `start` 补间到 `target`，返回 50% 处的值
fn halfway(start: Rotation, target: Rotation) -> Rotation {
    let store = PropertyStore::new().with(Property::Rotation, Value::Rotation(start));
    let mut manager = AnimationManager::new(Rc::new(store.clone()));
    manager
        .new_animation(None)
        .rotation(
            TweenOptions::<Rotation>::new()
                .to(target)
                .duration(1.0)
                .progression(Progression::linear()),
        )
        .start()
        .unwrap();
    manager.next_frame(0.5).unwrap();
    store.rotation()
}

fn same_heading(a: Quat, b: Quat) -> bool {
    (a * Vec3::X).distance(b * Vec3::X) < 1e-3
}

fn same_rotation(a: Quat, b: Quat) -> bool {
    a.dot(b).abs() > 1.0 - 1e-4
}

#[test]
fn test_every_pair_matches_canonical_tween() {
    let rotations = samples();
    for (i, start) in rotations.iter().enumerate() {
        for (j, target) in rotations.iter().enumerate() {
            if i == j {
                continue;
            }

            let mixed = halfway(*start, *target);
            let reference = halfway(canonical(*start), canonical(*target));
            assert_eq!(mixed.repr(), target.repr(), "结果应使用终点的表示");

            let label = format!("{:?} -> {:?}", start.repr(), target.repr());
            if target.repr().is_lossless() {
                assert!(
                    same_rotation(mixed.to_quat(), reference.to_quat()),
                    "{label}: {mixed:?} vs {reference:?}"
                );
            } else {
                // 平面与方向类表示只保留朝向
                assert!(
                    same_heading(mixed.to_quat(), reference.to_quat()),
                    "{label}: {mixed:?} vs {reference:?}"
                );
            }
        }
    }
}

#[test]
fn test_planar_tween_keeps_multiple_turns() {
    let target = Rotation::angle(4.0 * std::f32::consts::PI);
    let result = halfway(Rotation::angle(0.0), target);
    let angle = result.planar_angle().unwrap();
    assert!((angle - 2.0 * std::f32::consts::PI).abs() < 1e-4);
}

#[test]
fn test_shortest_direction() {
    let store = PropertyStore::new().with(
        Property::Rotation,
        Value::Rotation(Rotation::angle(0.1)),
    );
    let mut manager = AnimationManager::new(Rc::new(store.clone()));
    manager
        .new_animation(None)
        .rotation(
            TweenOptions::<Rotation>::new()
                .to(Rotation::angle(2.0 * std::f32::consts::PI - 0.1))
                .direction(RotationDirection::Shortest)
                .duration(1.0)
                .progression(Progression::linear()),
        )
        .start()
        .unwrap();

    manager.next_frame(0.5).unwrap();
    let angle = store.rotation().planar_angle().unwrap();
    // 最短路径经过 0 而不是 π
    assert!(angle.abs() < 1e-4, "angle = {angle}");
}
