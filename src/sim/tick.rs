//! Timers and the collision & scoring tick
//!
//! `advance` moves the game clock forward by a frame's worth of time. Inside
//! that window every deadline (jump landing, berry respawn, delayed sounds,
//! the fixed-period collision tick) fires in time order, so the result does
//! not depend on how the host slices frames.

use super::collision::{Aabb, aabb_overlap, obstacle_collision};
use super::state::{GameEvent, GamePhase, GameState};

/// Deadlines closer than this count as due
const EPSILON_MS: f64 = 1e-6;

/// Entities the presentation layer can measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Player,
    Obstacle,
    Collectible,
}

/// Live layout, queried once per collision tick
///
/// Returning None (element not mounted yet) makes the related test miss.
pub trait Scene {
    fn bounds(&self, entity: Entity) -> Option<Aabb>;
}

/// Fixed snapshot, handy when boxes are measured once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SceneSnapshot {
    pub player: Option<Aabb>,
    pub obstacle: Option<Aabb>,
    pub collectible: Option<Aabb>,
}

impl Scene for SceneSnapshot {
    fn bounds(&self, entity: Entity) -> Option<Aabb> {
        match entity {
            Entity::Player => self.player,
            Entity::Obstacle => self.obstacle,
            Entity::Collectible => self.collectible,
        }
    }
}

/// Advance the game clock by `dt_ms`
pub fn advance(state: &mut GameState, dt_ms: f64, scene: &impl Scene) {
    let mut remaining = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };

    loop {
        let next = next_deadline(state);
        if next > remaining {
            elapse(state, remaining);
            break;
        }
        elapse(state, next);
        remaining -= next;

        if state.jump_ms.is_some_and(|ms| ms <= EPSILON_MS) {
            state.land();
        }
        if state.respawn_ms.is_some_and(|ms| ms <= EPSILON_MS) {
            state.respawn();
        }
        state.play_due_sounds(EPSILON_MS);
        if state.tick_ms.is_some_and(|ms| ms <= EPSILON_MS) {
            collision_tick(state, scene);
        }
    }
}

/// Time until the earliest pending deadline (infinity if none)
fn next_deadline(state: &GameState) -> f64 {
    [state.jump_ms, state.respawn_ms, state.tick_ms]
        .into_iter()
        .flatten()
        .chain(state.pending_sounds.iter().map(|&(ms, _)| ms))
        .fold(f64::INFINITY, f64::min)
        .max(0.0)
}

fn elapse(state: &mut GameState, ms: f64) {
    if ms <= 0.0 {
        return;
    }
    for timer in [&mut state.jump_ms, &mut state.respawn_ms, &mut state.tick_ms] {
        if let Some(t) = timer {
            *t -= ms;
        }
    }
    for (t, _) in &mut state.pending_sounds {
        *t -= ms;
    }
}

/// One collision & scoring tick
///
/// Both tests use the same snapshot. A berry touched on the fatal tick still
/// scores, and is applied first so the high score verdict includes it.
fn collision_tick(state: &mut GameState, scene: &impl Scene) {
    if state.phase() != GamePhase::Playing {
        return;
    }
    state.count_collision_tick();

    let Some(player) = scene.bounds(Entity::Player) else {
        return;
    };

    let hit_obstacle = scene.bounds(Entity::Obstacle).is_some_and(|obstacle| {
        obstacle_collision(
            &player,
            &obstacle,
            state.tuning.trailing_margin,
            state.tuning.leading_margin,
        )
    });

    let hit_collectible = !state.collectible_latched()
        && scene
            .bounds(Entity::Collectible)
            .is_some_and(|berry| aabb_overlap(&player, &berry));

    if hit_collectible {
        state.collect();
    }
    if hit_obstacle {
        log::debug!("Obstacle hit at player {:?}", player);
        state.emit(GameEvent::ObstacleCollision);
        state.enter_game_over();
    }
}
