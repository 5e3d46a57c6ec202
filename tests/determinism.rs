use serpentine_data::{Action, WallMode};
use serpentine_lib::model::config::AppConfig;
use serpentine_lib::model::world::World;
use std::collections::BTreeMap;

fn busy_config(seed: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.world.seed = Some(seed);
    config.world.initial_snakes = 12;
    config.food.spawn_interval = 0.2;
    config.hazards.black_hole.spawn_interval = 1.0;
    config.hazards.speed_zone.spawn_interval = 1.0;
    config.hazards.food_magnet.spawn_interval = 1.0;
    config.creatures.scavenger_spawn_interval = 1.0;
    config
}

fn digests(config: AppConfig, ticks: usize) -> Vec<String> {
    let mut world = World::new(config).expect("world");
    (0..ticks)
        .map(|_| {
            world.step();
            world.snapshot().digest()
        })
        .collect()
}

#[test]
fn test_same_seed_replays_identically() {
    let a = digests(busy_config(12345), 400);
    let b = digests(busy_config(12345), 400);
    assert_eq!(a, b);
}

#[test]
fn test_destructive_walls_replay_identically() {
    let mut config = busy_config(7);
    config.world.wall_mode = WallMode::Destructive;
    assert_eq!(digests(config.clone(), 300), digests(config, 300));
}

#[test]
fn test_different_seed_diverges() {
    let a = digests(busy_config(1), 5);
    let b = digests(busy_config(2), 5);
    assert_ne!(a.last(), b.last());
}

#[test]
fn test_input_sequence_replays_identically() {
    let run = || {
        let mut world = World::new(busy_config(99)).expect("world");
        let mut out = Vec::new();
        for t in 0..200usize {
            let mut overrides = BTreeMap::new();
            if let Some(first) = world.state.snakes.first() {
                overrides.insert(first.id, Action::ALL[t % 4]);
            }
            world.update_with_overrides(1.0 / 60.0, &overrides);
            out.push(world.snapshot().digest());
        }
        out
    };
    assert_eq!(run(), run());
}

#[test]
fn test_sessions_do_not_share_state() {
    let mut interleaved_a = World::new(busy_config(5)).expect("world");
    let mut interleaved_b = World::new(busy_config(6)).expect("world");
    let mut alone = World::new(busy_config(5)).expect("world");
    for _ in 0..100 {
        interleaved_a.step();
        interleaved_b.step();
        alone.step();
    }
    assert_eq!(interleaved_a.snapshot().digest(), alone.snapshot().digest());
}
