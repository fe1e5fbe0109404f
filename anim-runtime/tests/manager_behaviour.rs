//! 管理器行为测试：线性补间、并行独立时钟、无限自定义步骤与四种取消策略。

use std::cell::RefCell;
use std::rc::Rc;

use anim_runtime::prelude::*;
use anim_runtime::{AnimationState, ManagerConfig, ManagerState};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

fn approx_vec2(a: Vec2, b: Vec2) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y)
}

fn linear_position(target: [f32; 2], duration: f32) -> TweenOptions<Vec2> {
    TweenOptions::<Vec2>::new()
        .to(target)
        .duration(duration)
        .progression(Progression::linear())
}

#[test]
fn test_linear_tween() {
    let store = PropertyStore::new();
    let mut manager = AnimationManager::new(Rc::new(store.clone()));
    manager
        .new_animation(Some("move"))
        .position(linear_position([1.0, 1.0], 1.0))
        .start()
        .unwrap();

    manager.next_frame(0.0).unwrap();
    assert_eq!(store.position(), Vec2::ZERO);

    manager.next_frame(0.5).unwrap();
    assert!(approx_vec2(store.position(), Vec2::splat(0.5)));
    assert!(manager.contains("move"));

    // t = 1.1，截断到终点并移出列表
    manager.next_frame(0.6).unwrap();
    assert_eq!(store.position(), Vec2::ONE);
    assert!(!manager.contains("move"));
    assert_eq!(manager.state(), ManagerState::Idle);
}

#[test]
fn test_parallel_children_use_own_clocks() {
    let store = PropertyStore::new();
    let mut manager = AnimationManager::new(Rc::new(store.clone()));
    manager
        .new_animation(Some("both"))
        .in_parallel([
            steps::position(linear_position([1.0, 1.0], 1.0)),
            steps::dissolve_out(2.0),
        ])
        .start()
        .unwrap();

    manager.next_frame(0.5).unwrap();
    assert!(approx_vec2(store.position(), Vec2::splat(0.5)));
    assert!(approx(store.opacity(), 0.75));

    manager.next_frame(1.0).unwrap();
    assert_eq!(store.position(), Vec2::ONE);
    assert!(approx(store.opacity(), 0.25));
    assert!(manager.contains("both"));

    manager.next_frame(0.6).unwrap();
    assert!(!manager.contains("both"));
    // dissolve_out 结束后隐藏并复位不透明度
    assert!(!store.is_shown());
    assert_eq!(store.opacity(), 1.0);
}

#[test]
fn test_infinite_custom_step() {
    let store = PropertyStore::new();
    let mut manager = AnimationManager::new(Rc::new(store.clone()));

    let writer = store.clone();
    manager
        .new_animation(Some("spin"))
        .custom(
            CustomOptions::new(move |elapsed: f32| {
                writer.set_value(Property::Opacity, Value::Scalar(elapsed / 100.0));
                elapsed > 20.0
            })
            .infinite(),
        )
        .start()
        .unwrap();
    assert_eq!(manager.remaining_time(Some("spin")), None);

    for _ in 0..4 {
        manager.next_frame(5.0).unwrap();
        assert_eq!(manager.state(), ManagerState::Animating);
        assert_eq!(
            manager.animation("spin").map(|a| a.state()),
            Some(AnimationState::Animating)
        );
    }
    assert!(approx(store.opacity(), 0.2));

    manager.next_frame(5.0).unwrap();
    assert_eq!(manager.state(), ManagerState::Idle);
    assert!(approx(store.opacity(), 0.25));

    // 回调写下的值保持不变
    manager.next_frame(5.0).unwrap();
    assert!(approx(store.opacity(), 0.25));
}

// ========== 取消策略 ==========

struct Grow {
    store: PropertyStore,
    manager: AnimationManager,
    finished: Rc<RefCell<Vec<bool>>>,
}

/// 从 0 长到 2 的补间，推进到 50%
fn grow_halfway(complete_on_cancel: bool) -> Grow {
    let store = PropertyStore::new().with(Property::Scale, Value::Vec2(Vec2::ZERO));
    let mut manager = AnimationManager::new(Rc::new(store.clone()));
    let finished = Rc::new(RefCell::new(Vec::new()));
    let log = finished.clone();

    let builder = manager
        .new_animation(Some("grow"))
        .scale(
            TweenOptions::<Vec2>::new()
                .to(Vec2::splat(2.0))
                .duration(1.0)
                .progression(Progression::linear()),
        )
        .when_finished(move |cancelled| log.borrow_mut().push(cancelled));
    let builder = if complete_on_cancel {
        builder.if_canceled_then_complete()
    } else {
        builder
    };
    builder.start().unwrap();

    manager.next_frame(0.5).unwrap();
    assert!(approx_vec2(store.scale(), Vec2::ONE));

    Grow {
        store,
        manager,
        finished,
    }
}

#[test]
fn test_cancel_policy_complete() {
    let Grow {
        store,
        mut manager,
        finished,
    } = grow_halfway(false);

    manager.cancel("grow", CancelPolicy::Complete).unwrap();
    assert_eq!(store.scale(), Vec2::splat(2.0));
    assert!(manager.is_empty());
    assert_eq!(*finished.borrow(), vec![true]);

    insta::assert_debug_snapshot!(manager.drain_events(), @r#"
    [
        Cancelled(
            "grow",
            Complete,
        ),
    ]
    "#);
}

#[test]
fn test_cancel_policy_cancel() {
    let Grow {
        store,
        mut manager,
        finished,
    } = grow_halfway(false);

    manager.cancel("grow", CancelPolicy::Cancel).unwrap();
    assert!(manager.is_empty());

    for _ in 0..3 {
        manager.next_frame(0.5).unwrap();
    }
    assert!(approx_vec2(store.scale(), Vec2::ONE));
    assert!(finished.borrow().is_empty());
}

#[test]
fn test_cancel_policy_cancel_with_complete_flag() {
    let Grow {
        store,
        mut manager,
        finished,
    } = grow_halfway(true);

    manager.cancel_all(CancelPolicy::Cancel).unwrap();
    assert_eq!(store.scale(), Vec2::splat(2.0));
    assert_eq!(*finished.borrow(), vec![true]);
}

#[test]
fn test_cancel_policy_freeze() {
    let Grow {
        store,
        mut manager,
        finished,
    } = grow_halfway(true);

    // freeze 不看 complete_on_cancel
    manager.cancel("grow", CancelPolicy::Freeze).unwrap();
    assert!(manager.is_empty());
    manager.next_frame(1.0).unwrap();
    assert!(approx_vec2(store.scale(), Vec2::ONE));
    assert!(finished.borrow().is_empty());
}

#[test]
fn test_cancel_policy_animate_to_complete() {
    let Grow {
        store,
        mut manager,
        finished,
    } = grow_halfway(false);
    assert_eq!(manager.config().wrap_up_duration, 0.25);

    manager
        .cancel("grow", CancelPolicy::AnimateToComplete)
        .unwrap();
    assert!(manager.contains("grow"));
    assert!(approx_vec2(store.scale(), Vec2::ONE));

    // 剩余 0.5 秒压缩到 0.25 秒
    manager.next_frame(0.125).unwrap();
    assert!(approx_vec2(store.scale(), Vec2::splat(1.5)));

    let events = manager.next_frame(0.125).unwrap();
    assert_eq!(store.scale(), Vec2::splat(2.0));
    assert!(manager.is_empty());
    assert_eq!(*finished.borrow(), vec![false]);

    insta::assert_debug_snapshot!(events, @r#"
    [
        Finished(
            "grow",
        ),
    ]
    "#);
}

#[test]
fn test_animate_to_complete_infinite_falls_back_to_complete() {
    let store = PropertyStore::new();
    let mut manager = AnimationManager::new(Rc::new(store.clone()));
    let calls = Rc::new(RefCell::new(0));
    let counter = calls.clone();

    manager
        .new_animation(Some("forever"))
        .custom(CustomOptions::new(|_| false).infinite())
        .trigger(move || *counter.borrow_mut() += 1)
        .start()
        .unwrap();
    manager.next_frame(1.0).unwrap();

    manager
        .cancel_all(CancelPolicy::AnimateToComplete)
        .unwrap();
    assert!(manager.is_empty());
    // complete 会补上未触发的 trigger
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn test_wrap_up_from_config() {
    let store = PropertyStore::new().with(Property::Opacity, Value::Scalar(0.0));
    let mut manager = AnimationManager::new(Rc::new(store.clone())).with_config(ManagerConfig {
        wrap_up_duration: 1.0,
    });
    manager
        .new_animation(Some("fade"))
        .opacity(
            TweenOptions::<f32>::new()
                .to(1.0)
                .duration(4.0)
                .progression(Progression::linear()),
        )
        .start()
        .unwrap();
    manager.next_frame(2.0).unwrap();

    manager
        .cancel("fade", CancelPolicy::AnimateToComplete)
        .unwrap();
    assert_eq!(manager.remaining_time(Some("fade")), Some(1.0));
    manager.next_frame(1.0).unwrap();
    assert!(manager.is_empty());
    assert_eq!(store.opacity(), 1.0);
}

#[test]
fn test_later_animation_wins_on_same_property() {
    let store = PropertyStore::new();
    let mut manager = AnimationManager::new(Rc::new(store.clone()));
    manager
        .new_animation(Some("a"))
        .position(linear_position([1.0, 0.0], 1.0))
        .start()
        .unwrap();
    manager
        .new_animation(Some("b"))
        .position(linear_position([0.0, 1.0], 1.0))
        .start()
        .unwrap();

    manager.next_frame(0.5).unwrap();
    assert!(approx_vec2(store.position(), Vec2::new(0.0, 0.5)));
    assert_eq!(manager.ids(), vec!["a", "b"]);
}

#[test]
fn test_exact_boundary_does_not_bleed_into_next_step() {
    let store = PropertyStore::new();
    let mut manager = AnimationManager::new(Rc::new(store.clone()));
    manager
        .new_animation(Some("two"))
        .position(linear_position([1.0, 0.0], 1.0))
        .position(linear_position([1.0, 1.0], 1.0))
        .start()
        .unwrap();

    manager.next_frame(1.5).unwrap();
    // 第一段结束，第二段从 0 开始
    assert!(approx_vec2(store.position(), Vec2::new(1.0, 0.0)));
    manager.next_frame(0.5).unwrap();
    assert!(approx_vec2(store.position(), Vec2::new(1.0, 0.5)));
}

#[test]
fn test_relative_and_absolute_driving_agree() {
    let relative_store = PropertyStore::new();
    let absolute_store = PropertyStore::new();
    let mut relative = AnimationManager::new(Rc::new(relative_store.clone()));
    let mut absolute = AnimationManager::new(Rc::new(absolute_store.clone()));
    for manager in [&mut relative, &mut absolute] {
        manager
            .new_animation(Some("move"))
            .position(linear_position([2.0, 0.0], 2.0))
            .dissolve_out(0.5)
            .start()
            .unwrap();
    }

    let mut clock = Clock::new();
    let mut now = 1000.0_f64;
    absolute.next_frame_at(now, &mut clock).unwrap();
    for dt in [0.25_f32, 0.5, 0.125, 1.0, 0.75] {
        relative.next_frame(dt).unwrap();
        now += f64::from(dt);
        absolute.next_frame_at(now, &mut clock).unwrap();
        assert!(approx_vec2(relative_store.position(), absolute_store.position()));
        assert!(approx(relative_store.opacity(), absolute_store.opacity()));
    }
    assert!(relative.is_empty());
    assert!(absolute.is_empty());
}
