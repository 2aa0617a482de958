//! Data-driven game balance
//!
//! Every duration and margin the simulation uses lives here so the
//! browser host and tests can adjust them without touching `sim`.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Timing and geometry knobs for one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Airborne time per jump (ms)
    pub jump_duration_ms: f64,
    /// Collision & scoring tick period (ms)
    pub collision_tick_ms: f64,
    /// Time from pickup until the berry can be collected again (ms)
    pub respawn_delay_ms: f64,
    /// Random reappearance offset is drawn from [0, respawn_jitter_ms)
    pub respawn_jitter_ms: f64,
    /// Points per berry
    pub collectible_points: u64,
    /// Shrinks the obstacle's right edge (tail)
    pub trailing_margin: f32,
    /// Shrinks the player's right edge (horn)
    pub leading_margin: f32,
    /// Happiness above this fires a jump
    pub happy_threshold: f32,
    pub game_over_sound_delay_ms: f64,
    pub celebration_delay_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            jump_duration_ms: JUMP_DURATION_MS,
            collision_tick_ms: COLLISION_TICK_MS,
            respawn_delay_ms: RESPAWN_DELAY_MS,
            respawn_jitter_ms: RESPAWN_JITTER_MS,
            collectible_points: COLLECTIBLE_POINTS,
            trailing_margin: TRAILING_MARGIN,
            leading_margin: LEADING_MARGIN,
            happy_threshold: HAPPY_THRESHOLD,
            game_over_sound_delay_ms: GAME_OVER_SOUND_DELAY_MS,
            celebration_delay_ms: CELEBRATION_DELAY_MS,
        }
    }
}

impl Tuning {
    /// Tuning with the given collision margins (the rest stays default)
    pub fn with_margins(trailing: f32, leading: f32) -> Self {
        Self {
            trailing_margin: trailing,
            leading_margin: leading,
            ..Self::default()
        }
    }
}
