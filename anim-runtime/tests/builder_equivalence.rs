//! 构造器与工厂函数等价性测试。
//!
//! `seq.x(..)` 与 `seq.then(steps::x(..))` 在每个采样帧上必须把目标驱动到相同的值。

use anim_runtime::prelude::*;
use anim_runtime::{Transform, Value};

type Samples = Vec<Vec<(Property, Value)>>;

/// 在新的属性表上运行序列，每 0.25 秒采样一次
fn run(build: impl Fn(&PropertyStore) -> Sequence) -> Samples {
    let store = PropertyStore::new();
    let mut manager = AnimationManager::new(Rc::new(store.clone()));
    manager
        .start_sequence(Some("case".to_string()), build(&store))
        .unwrap();

    let mut samples = vec![store.snapshot()];
    for _ in 0..14 {
        manager.next_frame(0.25).unwrap();
        samples.push(store.snapshot());
    }
    assert!(manager.is_empty(), "动画应在采样结束前完成");
    samples
}

fn assert_same(
    name: &str,
    builder: impl Fn(&PropertyStore) -> Sequence,
    factory: impl Fn(&PropertyStore) -> Sequence,
) {
    let a = run(builder);
    let b = run(factory);
    assert_eq!(a, b, "{name}: 构造器与工厂函数结果不同");
    assert!(a.iter().any(|s| s != &a[0]), "{name}: 动画没有改变任何值");
}

#[test]
fn test_position_literal_forms() {
    assert_same(
        "tuple",
        |_| Sequence::new().position((1.0, 2.0)),
        |_| Sequence::new().then(steps::position((1.0, 2.0))),
    );
    assert_same(
        "array",
        |_| Sequence::new().position([1.0, 2.0]),
        |_| Sequence::new().then(steps::position([1.0, 2.0])),
    );
    assert_same(
        "vector",
        |_| Sequence::new().position(Vec2::new(1.0, 2.0)),
        |_| Sequence::new().then(steps::position(Vec2::new(1.0, 2.0))),
    );
    assert_same(
        "number",
        |_| Sequence::new().position(3.0),
        |_| Sequence::new().then(steps::position(3.0)),
    );
    assert_same(
        "options",
        |_| {
            Sequence::new().position(
                TweenOptions::<Vec2>::new()
                    .by([1.0, -1.0])
                    .duration(2.0)
                    .progression(EasingFunction::EaseOutQuad),
            )
        },
        |_| {
            Sequence::new().then(steps::position(
                TweenOptions::<Vec2>::new()
                    .by([1.0, -1.0])
                    .duration(2.0)
                    .progression(EasingFunction::EaseOutQuad),
            ))
        },
    );
    assert_same(
        "velocity",
        |_| Sequence::new().position(TweenOptions::<Vec2>::new().to((2.0, 0.0)).velocity(1.0)),
        |_| {
            Sequence::new().then(steps::position(
                TweenOptions::<Vec2>::new().to((2.0, 0.0)).velocity(1.0),
            ))
        },
    );
}

#[test]
fn test_other_tweens() {
    assert_same(
        "position3",
        |_| Sequence::new().position3((1.0, 2.0, 3.0)),
        |_| Sequence::new().then(steps::position3((1.0, 2.0, 3.0))),
    );
    assert_same(
        "scale",
        |_| Sequence::new().scale(2.0),
        |_| Sequence::new().then(steps::scale(2.0)),
    );
    assert_same(
        "rotation number",
        |_| Sequence::new().rotation(1.5),
        |_| Sequence::new().then(steps::rotation(1.5)),
    );
    assert_same(
        "rotation axis-angle",
        |_| Sequence::new().rotation(Rotation::axis_angle(Vec3::Y, 0.8)),
        |_| Sequence::new().then(steps::rotation(Rotation::axis_angle(Vec3::Y, 0.8))),
    );
    assert_same(
        "color array",
        |_| Sequence::new().color([1.0, 0.0, 0.0, 1.0]),
        |_| Sequence::new().then(steps::color([1.0, 0.0, 0.0, 1.0])),
    );
    assert_same(
        "opacity",
        |_| Sequence::new().opacity(0.2),
        |_| Sequence::new().then(steps::opacity(0.2)),
    );
    assert_same(
        "transform",
        |_| {
            Sequence::new().transform(
                Transform::identity()
                    .with_position(Vec2::new(1.0, 1.0))
                    .with_rotation(0.5),
            )
        },
        |_| {
            Sequence::new().then(steps::transform(
                Transform::identity()
                    .with_position(Vec2::new(1.0, 1.0))
                    .with_rotation(0.5),
            ))
        },
    );
    assert_same(
        "generic tween",
        |_| Sequence::new().tween(Property::Opacity, TweenOptions::<f32>::new().to(0.4)),
        |_| Sequence::new().then(steps::tween(Property::Opacity, TweenOptions::<f32>::new().to(0.4))),
    );
}

#[test]
fn test_fades_and_pulse() {
    assert_same(
        "dissolve",
        |_| Sequence::new().dissolve_out(0.5).dissolve_in(FadeOptions::new().duration(1.0)),
        |_| {
            Sequence::new()
                .then(steps::dissolve_out(0.5))
                .then(steps::dissolve_in(FadeOptions::new().duration(1.0)))
        },
    );
    assert_same(
        "dim",
        |_| Sequence::new().dim(1.0).undim(0.5),
        |_| Sequence::new().then(steps::dim(1.0)).then(steps::undim(0.5)),
    );
    assert_same(
        "pulse",
        |_| Sequence::new().pulse(PulseOptions::new().scale(2.0).cycles(2.0).opacity(0.5)),
        |_| {
            Sequence::new().then(steps::pulse(
                PulseOptions::new().scale(2.0).cycles(2.0).opacity(0.5),
            ))
        },
    );
}

#[test]
fn test_timed_and_composite_steps() {
    assert_same(
        "delay + trigger",
        |store| {
            let target = store.clone();
            Sequence::new()
                .delay(0.5)
                .trigger(move || {
                    target.set_value(Property::Opacity, Value::Scalar(0.3));
                })
        },
        |store| {
            let target = store.clone();
            Sequence::new().then(steps::delay(0.5)).then(steps::trigger(move || {
                target.set_value(Property::Opacity, Value::Scalar(0.3));
            }))
        },
    );
    assert_same(
        "custom",
        |store| {
            let target = store.clone();
            Sequence::new().custom(CustomOptions::new(move |p: f32| {
                target.set_value(Property::Opacity, Value::Scalar(1.0 - p));
                false
            }))
        },
        |store| {
            let target = store.clone();
            Sequence::new().then(steps::custom(CustomOptions::new(move |p: f32| {
                target.set_value(Property::Opacity, Value::Scalar(1.0 - p));
                false
            })))
        },
    );
    assert_same(
        "parallel + serial",
        |_| {
            Sequence::new()
                .in_parallel([steps::position((1.0, 0.0)), steps::scale(0.5)])
                .in_serial([steps::opacity(0.0), steps::delay(0.25)])
        },
        |_| {
            Sequence::new()
                .then(steps::parallel([steps::position((1.0, 0.0)), steps::scale(0.5)]))
                .then(steps::serial([steps::opacity(0.0), steps::delay(0.25)]))
        },
    );
    assert_same(
        "nested sequence",
        |_| Sequence::new().position((1.0, 0.0)).opacity(0.5),
        |_| Sequence::new().then(Sequence::new().position((1.0, 0.0)).opacity(0.5)),
    );
}

#[test]
fn test_start_delay_forms() {
    assert_same(
        "tween delay",
        |_| Sequence::new().position(TweenOptions::<Vec2>::new().to((2.0, 1.0)).delay(0.5)),
        |_| {
            Sequence::new().then(steps::position(
                TweenOptions::<Vec2>::new().to((2.0, 1.0)).delay(0.5),
            ))
        },
    );
    assert_same(
        "fade and pulse delay",
        |_| {
            Sequence::new()
                .dissolve_out(FadeOptions::new().duration(0.5).delay(0.75))
                .pulse(PulseOptions::new().scale(2.0).delay(0.25))
        },
        |_| {
            Sequence::new()
                .then(steps::dissolve_out(FadeOptions::new().duration(0.5).delay(0.75)))
                .then(steps::pulse(PulseOptions::new().scale(2.0).delay(0.25)))
        },
    );
    assert_same(
        "custom delay",
        |store| {
            let target = store.clone();
            Sequence::new().custom(
                CustomOptions::new(move |p: f32| {
                    target.set_value(Property::Opacity, Value::Scalar(1.0 - p));
                    false
                })
                .delay(1.0),
            )
        },
        |store| {
            let target = store.clone();
            Sequence::new().then(steps::custom(
                CustomOptions::new(move |p: f32| {
                    target.set_value(Property::Opacity, Value::Scalar(1.0 - p));
                    false
                })
                .delay(1.0),
            ))
        },
    );
    // 采样间隔整除延时时，延时选项与前置的 delay 步骤逐帧一致
    assert_same(
        "option vs leading delay",
        |_| Sequence::new().opacity(TweenOptions::<f32>::new().to(0.0).delay(0.5)),
        |_| Sequence::new().delay(0.5).opacity(0.0),
    );
}

#[test]
fn test_manager_builder_matches_sequence() {
    let store = PropertyStore::new();
    let mut manager = AnimationManager::new(Rc::new(store.clone()));
    manager
        .new_animation(Some("direct"))
        .position((1.0, 2.0))
        .scale(2.0)
        .start()
        .unwrap();

    let mut direct = vec![store.snapshot()];
    for _ in 0..10 {
        manager.next_frame(0.25).unwrap();
        direct.push(store.snapshot());
    }

    let from_sequence = run(|_| Sequence::new().position((1.0, 2.0)).scale(2.0));
    assert_eq!(direct, from_sequence[..direct.len()]);
}

#[test]
fn test_errors_surface_at_start() {
    let store = PropertyStore::new();
    let mut manager = AnimationManager::new(Rc::new(store.clone()));

    let builder_err = manager
        .new_animation(None)
        .position(TweenOptions::<Vec2>::new().duration(1.0))
        .start()
        .unwrap_err();
    let factory_err = steps::position(TweenOptions::<Vec2>::new().duration(1.0)).unwrap_err();
    assert_eq!(builder_err, factory_err);
    assert!(manager.is_empty());
}
