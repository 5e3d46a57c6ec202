//! # Serpentine Core
//!
//! The simulation engine for Serpentine, a multi-agent snake arena.
//!
//! This crate contains the deterministic per-tick logic:
//! - Spatial indexing for proximity queries
//! - Timed effects and per-tick hazard transients
//! - Acceleration-limited movement with size-derived caps
//! - Feature extraction and a pluggable policy (learned or rule-based)
//! - Collision resolution against a pre-tick snapshot
//! - Spawn governance, starvation and creature control
//! - Metrics collection and structured logging
//!
//! ## Determinism
//!
//! Every random draw goes through a caller-supplied generator, and entity
//! collections are processed in insertion order. Parallel work (feature
//! extraction, spatial hash counting) never touches the generator.
//!
//! ## Example
//!
//! ```
//! use serpentine_core::config::AppConfig;
//! use serpentine_core::movement::{advance, MoveInput, MoveOutcome};
//! use serpentine_data::{Snake, Vec2};
//! use uuid::Uuid;
//!
//! let config = AppConfig::default();
//! let origin = Vec2::new(100.0, 100.0);
//! let mut snake = Snake::new(Uuid::from_u128(1), origin, Vec2::new(1.0, 0.0), 3, 5.0);
//!
//! let input = MoveInput::steer(Vec2::new(0.0, 1.0));
//! let outcome = advance(&mut snake, &input, &config, 1.0 / 60.0);
//! assert_eq!(outcome, MoveOutcome::Moved);
//! assert_eq!(snake.segments.len(), 3);
//! ```

/// Session configuration and validation
pub mod config;
/// Creature steering and re-targeting
pub mod creature;
/// Per-tick decision pipeline
pub mod decision;
/// Timed and transient effects
pub mod effects;
pub mod error;
/// Collision detection and buffered resolution
pub mod interaction;
/// Spawning, despawning and starvation
pub mod lifecycle;
/// Metrics collection and logging setup
pub mod metrics;
pub mod movement;
/// Read-only tick snapshots
pub mod snapshot;
/// Spatial hashing for proximity queries
pub mod spatial_hash;
pub mod state;
