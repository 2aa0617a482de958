//! Smile Jump - smile at the webcam to make the dino jump
//!
//! Core modules:
//! - `sim`: Game state machine, collision & scoring engine, smile trigger
//! - `highscores`: Top-5 leaderboard with player names
//! - `persistence`: Key-value storage (LocalStorage on web, in-memory elsewhere)
//! - `settings`: Player preferences
//! - `tuning`: Data-driven game balance

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::{HighScoreEntry, HighScores};
pub use settings::{Sensitivity, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Collision & scoring tick period (ms)
    pub const COLLISION_TICK_MS: f64 = 100.0;
    /// How long the player stays airborne per jump (ms)
    pub const JUMP_DURATION_MS: f64 = 1000.0;

    /// Delay before an eaten berry can be collected again (ms)
    pub const RESPAWN_DELAY_MS: f64 = 3000.0;
    /// Upper bound (exclusive) of the random reappearance offset (ms)
    pub const RESPAWN_JITTER_MS: f64 = 1000.0;
    /// Points per berry
    pub const COLLECTIBLE_POINTS: u64 = 10;

    /// Obstacle tail that doesn't count as a hit (px)
    pub const TRAILING_MARGIN: f32 = 65.0;
    /// Player horn that doesn't count as a hit (px)
    pub const LEADING_MARGIN: f32 = 65.0;

    /// Happiness above this fires a jump
    pub const HAPPY_THRESHOLD: f32 = 0.9;
    /// Relaxed sensitivity threshold
    pub const HAPPY_THRESHOLD_RELAXED: f32 = 0.8;
    /// Expected cadence of the webcam sampler (ms)
    pub const SIGNAL_SAMPLE_MS: f64 = 200.0;

    /// Gap between the "ouch" and the game over jingle (ms)
    pub const GAME_OVER_SOUND_DELAY_MS: f64 = 500.0;
    /// Delay before the high score celebration plays (ms)
    pub const CELEBRATION_DELAY_MS: f64 = 1000.0;
}
