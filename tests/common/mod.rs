pub mod macros;

use serpentine_data::{
    Creature, CreatureKind, EffectDescriptor, EffectKind, Food, FoodKind, Hazard, HazardKind, Role,
    Snake, Vec2,
};
use serpentine_lib::model::config::AppConfig;
use serpentine_lib::model::decision::DecisionPipeline;
use serpentine_lib::model::world::World;
use uuid::Uuid;

/// Spawn intervals long enough that no timer fires during a test.
#[allow(dead_code)]
pub const NEVER: f64 = 1e9;

#[allow(dead_code)]
pub struct WorldBuilder {
    config: AppConfig,
    snakes: Vec<Snake>,
    foods: Vec<Food>,
    hazards: Vec<Hazard>,
    creatures: Vec<Creature>,
    pipeline: Option<DecisionPipeline>,
}

#[allow(dead_code)]
impl WorldBuilder {
    /// Empty, seeded world with every spawn timer disabled.
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.seed = Some(42);
        config.world.initial_snakes = 0;
        config.food.initial_food = 0;
        config.food.spawn_interval = NEVER;
        config.lifecycle.snake_spawn_interval = NEVER;
        config.hazards.black_hole.spawn_interval = NEVER;
        config.hazards.speed_zone.spawn_interval = NEVER;
        config.hazards.food_magnet.spawn_interval = NEVER;
        config.creatures.ripper_spawn_interval = NEVER;
        config.creatures.scavenger_spawn_interval = NEVER;
        Self {
            config,
            snakes: Vec::new(),
            foods: Vec::new(),
            hazards: Vec::new(),
            creatures: Vec::new(),
            pipeline: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_snake(mut self, snake: Snake) -> Self {
        self.snakes.push(snake);
        self
    }

    pub fn with_food(mut self, n: u128, x: f64, y: f64) -> Self {
        self.foods.push(Food::plain(Uuid::from_u128(n), Vec2::new(x, y)));
        self
    }

    pub fn with_special_food(
        mut self,
        n: u128,
        x: f64,
        y: f64,
        kind: FoodKind,
        effect: EffectDescriptor,
    ) -> Self {
        self.foods
            .push(Food::special(Uuid::from_u128(n), Vec2::new(x, y), kind, effect));
        self
    }

    pub fn with_hazard(
        mut self,
        n: u128,
        kind: HazardKind,
        x: f64,
        y: f64,
        radius: f64,
        strength: f64,
    ) -> Self {
        self.hazards.push(Hazard {
            id: Uuid::from_u128(n),
            kind,
            position: Vec2::new(x, y),
            radius,
            strength,
            remaining: 60.0,
        });
        self
    }

    pub fn with_creature(mut self, n: u128, kind: CreatureKind, x: f64, y: f64) -> Self {
        self.creatures
            .push(Creature::new(Uuid::from_u128(n), kind, Vec2::new(x, y)));
        self
    }

    pub fn with_pipeline(mut self, pipeline: DecisionPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn build(self) -> World {
        let mut world = World::empty_with(self.config, self.pipeline.unwrap_or_default())
            .expect("Failed to create world in test builder");
        world.state.snakes = self.snakes;
        world.state.foods = self.foods;
        world.state.hazards = self.hazards;
        world.state.creatures = self.creatures;
        world.reindex();
        world
    }
}

#[allow(dead_code)]
pub struct SnakeBuilder {
    id: Uuid,
    head: Vec2,
    heading: Vec2,
    size: usize,
    role: Role,
    food_eaten: u32,
    velocity: Vec2,
    starvation_timer: f64,
    effects: Vec<(EffectKind, EffectDescriptor)>,
}

#[allow(dead_code)]
impl SnakeBuilder {
    pub fn new(n: u128) -> Self {
        Self {
            id: Uuid::from_u128(n),
            head: Vec2::new(500.0, 400.0),
            heading: Vec2::new(1.0, 0.0),
            size: 3,
            role: Role::Normal,
            food_eaten: 0,
            velocity: Vec2::ZERO,
            starvation_timer: 0.0,
            effects: Vec::new(),
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.head = Vec2::new(x, y);
        self
    }

    /// Direction the snake faces; the body trails the opposite way.
    pub fn heading(mut self, x: f64, y: f64) -> Self {
        self.heading = Vec2::new(x, y);
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn hunter(mut self) -> Self {
        self.role = Role::Hunter;
        self.food_eaten = self.food_eaten.max(10);
        self
    }

    pub fn food_eaten(mut self, count: u32) -> Self {
        self.food_eaten = count;
        self
    }

    pub fn velocity(mut self, x: f64, y: f64) -> Self {
        self.velocity = Vec2::new(x, y);
        self
    }

    pub fn starving_for(mut self, seconds: f64) -> Self {
        self.starvation_timer = seconds;
        self
    }

    pub fn effect(mut self, kind: EffectKind, duration: f64, magnitude: f64) -> Self {
        self.effects
            .push((kind, EffectDescriptor::new(duration, magnitude)));
        self
    }

    pub fn build(self) -> Snake {
        let mut snake = Snake::new(self.id, self.head, self.heading, self.size, 5.0);
        snake.role = self.role;
        snake.food_eaten = self.food_eaten;
        snake.velocity = self.velocity;
        snake.starvation_timer = self.starvation_timer;
        for (kind, desc) in self.effects {
            snake.effects.apply(kind, desc);
        }
        snake
    }
}

#[allow(dead_code)]
pub fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}
