//! Gameplay core
//!
//! Everything here is platform free: time arrives as milliseconds through
//! `advance`, layout arrives through the `Scene` trait, and side effects
//! leave as `GameEvent`s. Randomness comes only from the seeded RNG in
//! `GameState`.

pub mod collision;
pub mod signal;
pub mod state;
pub mod tick;

pub use collision::{Aabb, aabb_overlap, obstacle_collision};
pub use signal::SmileTrigger;
pub use state::{CommandError, GameEvent, GamePhase, GameState, SoundEffect};
pub use tick::{Entity, Scene, SceneSnapshot, advance};
