mod common;

use common::{id, SnakeBuilder, WorldBuilder};
use serpentine_data::{Action, EffectDescriptor, EffectFlags, EffectKind, HazardKind, ZoneTempo};
use serpentine_lib::model::movement::max_speed;
use std::collections::BTreeMap;

const DT: f64 = 1.0 / 60.0;

#[test]
fn test_slow_zone_limits_speed_while_inside() {
    let mut world = WorldBuilder::new()
        .with_snake(SnakeBuilder::new(1).velocity(300.0, 0.0).build())
        .with_hazard(70, HazardKind::SpeedZone(ZoneTempo::Slow), 500.0, 400.0, 400.0, 0.5)
        .build();
    let cap = max_speed(&world.config.motion, 3, world.config.lifecycle.initial_snake_size);
    let mut overrides = BTreeMap::new();
    overrides.insert(id(1), Action::Right);

    // The zone is sampled at the end of a tick and applies from the next.
    world.update_with_overrides(DT, &overrides);
    let snake = world.snake(id(1)).expect("snake");
    assert!(world.effects.effect_flags(snake).contains(EffectFlags::SLOW_ZONE));

    for _ in 0..30 {
        world.update_with_overrides(DT, &overrides);
        let snake = world.snake(id(1)).expect("snake");
        assert!(snake.velocity.length() <= 0.5 * cap + 1e-9);
    }
}

#[test]
fn test_zone_effect_is_not_timed() {
    let mut world = WorldBuilder::new()
        .with_snake(SnakeBuilder::new(1).build())
        .with_hazard(70, HazardKind::SpeedZone(ZoneTempo::Fast), 500.0, 400.0, 50.0, 1.5)
        .build();

    world.update(DT);
    assert!(world.snake(id(1)).expect("snake").effects.is_empty());
    assert!((world.effects.transient(id(1)).zone_multiplier - 1.5).abs() < 1e-12);

    world.state.hazards.clear();
    world.update(DT);
    assert_eq!(world.effects.transient(id(1)).zone_multiplier, 1.0);
}

#[test]
fn test_black_hole_pulls_snakes_and_food() {
    let mut world = WorldBuilder::new()
        .with_snake(SnakeBuilder::new(1).at(600.0, 400.0).build())
        .with_food(100, 500.0, 300.0)
        .with_hazard(70, HazardKind::BlackHole, 500.0, 400.0, 200.0, 360.0)
        .build();

    world.update(DT);
    let pull = world.effects.pull(id(1));
    assert!(pull.x < 0.0, "pull should point at the centre, got {pull:?}");
    let snake = world.snake(id(1)).expect("snake");
    assert!(world.effects.effect_flags(snake).contains(EffectFlags::HAZARD_PULL));

    for _ in 0..9 {
        world.update(DT);
    }
    assert!(world.state.foods[0].position.y > 301.0);
}

#[test]
fn test_hazards_expire() {
    let mut world = WorldBuilder::new()
        .with_hazard(70, HazardKind::FoodMagnet, 500.0, 400.0, 150.0, 120.0)
        .build();
    world.state.hazards[0].remaining = 0.05;

    let mut expired = 0;
    for _ in 0..4 {
        expired += world.update(DT).lifecycle.expired_hazards;
    }
    assert_eq!(expired, 1);
    assert!(world.state.hazards.is_empty());
}

#[test]
fn test_world_slow_caps_every_snake_until_it_expires() {
    let mut world = WorldBuilder::new()
        .with_snake(SnakeBuilder::new(1).at(200.0, 200.0).velocity(300.0, 0.0).build())
        .with_snake(SnakeBuilder::new(2).at(200.0, 600.0).velocity(300.0, 0.0).build())
        .build();
    let cap = max_speed(&world.config.motion, 3, world.config.lifecycle.initial_snake_size);
    let overrides = BTreeMap::from([(id(1), Action::Right), (id(2), Action::Right)]);

    assert!(!world.apply_world_effect(EffectKind::Slow, EffectDescriptor::new(1.0, 0.4)));
    let mut expired = 0;
    for _ in 0..30 {
        expired += world.update_with_overrides(DT, &overrides).effects_expired;
        for snake in world.state.snakes.iter() {
            assert!(snake.effects.is_empty());
            assert!(world.effects.effect_flags(snake).contains(EffectFlags::SLOW));
            assert!(snake.velocity.length() <= 0.4 * cap + 1e-9);
        }
    }

    for _ in 0..60 {
        expired += world.update_with_overrides(DT, &overrides).effects_expired;
    }
    assert_eq!(expired, 1);
    assert!(world.effects.world_effects().is_empty());
    for snake in world.state.snakes.iter() {
        assert!(snake.velocity.length() > 0.9 * cap);
    }
}
