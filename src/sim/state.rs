//! Game state machine
//!
//! `GameState` is the only owner of the phase, the score and the cached
//! high score verdict. Hosts drive it with commands (`start`, `restart`,
//! `request_jump`, `on_happy_level`) plus `tick::advance`, and react to the
//! `GameEvent`s it queues.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::signal::SmileTrigger;
use crate::highscores::{HighScoreEntry, HighScores};
use crate::persistence::Storage;
use crate::tuning::Tuning;

/// Shortest collision tick we'll schedule (ms)
const MIN_TICK_MS: f64 = 1.0;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first START
    Idle,
    /// Active gameplay
    Playing,
    /// Round ended, waiting for RESET
    GameOver,
}

/// Sound intents; the host decides how (and whether) to play them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Round start ("let's go!")
    LetsGo,
    /// Looping background music, requested once on the first start
    Background,
    Jump,
    /// Berry eaten
    Eat,
    /// Hit the obstacle
    Ouch,
    /// Game over jingle
    GameOver,
    /// New high score fanfare
    Win,
    /// Applause after the fanfare
    Clap,
}

/// Side-effect requests for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseEntered(GamePhase),
    /// Webcam sampler should run
    SamplingStarted,
    /// Webcam sampler should stop
    SamplingStopped,
    JumpStarted,
    JumpEnded,
    ObstacleCollision,
    ScoreChanged(u64),
    CollectibleHidden,
    /// Berry is collectible again; start its animation after `delay_ms`
    CollectibleShown { delay_ms: f64 },
    /// Restart the obstacle animation from the right edge
    ObstacleReset,
    /// Leaderboard updated and saved
    HighScoreCommitted { rank: Option<usize> },
    Sound(SoundEffect),
}

/// Refused command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// New high score needs a non-blank player name
    NameRequired,
    /// Command isn't valid in the current phase
    WrongPhase {
        expected: GamePhase,
        actual: GamePhase,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::NameRequired => write!(f, "a name is required for a new high score"),
            CommandError::WrongPhase { expected, actual } => {
                write!(f, "command needs phase {:?}, game is {:?}", expected, actual)
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Balance knobs for this session
    pub tuning: Tuning,
    phase: GamePhase,
    score: u64,
    /// Leaderboard (reloaded by the host at startup)
    high_scores: HighScores,
    /// Verdict taken when the round ended
    new_high_score: bool,
    smile: SmileTrigger,
    /// Time left in the current jump (None = on the ground)
    pub(super) jump_ms: Option<f64>,
    /// Berry eaten and waiting to respawn
    collectible_latched: bool,
    pub(super) respawn_ms: Option<f64>,
    /// Time until the next collision tick (None = ticking suspended)
    pub(super) tick_ms: Option<f64>,
    /// Delayed sound intents
    pub(super) pending_sounds: Vec<(f64, SoundEffect)>,
    collision_ticks: u64,
    music_started: bool,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create an idle game
    pub fn new(seed: u64, tuning: Tuning, high_scores: HighScores) -> Self {
        let smile = SmileTrigger::new(tuning.happy_threshold);
        Self {
            tuning,
            phase: GamePhase::Idle,
            score: 0,
            high_scores,
            new_high_score: false,
            smile,
            jump_ms: None,
            collectible_latched: false,
            respawn_ms: None,
            tick_ms: None,
            pending_sounds: Vec::new(),
            collision_ticks: 0,
            music_started: false,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    /// Whether the round that just ended made the leaderboard
    pub fn is_new_high_score(&self) -> bool {
        self.phase == GamePhase::GameOver && self.new_high_score
    }

    pub fn is_jumping(&self) -> bool {
        self.jump_ms.is_some()
    }

    pub fn collectible_latched(&self) -> bool {
        self.collectible_latched
    }

    /// Latest happiness level seen
    pub fn happy_level(&self) -> f32 {
        self.smile.level()
    }

    /// Collision ticks run since creation
    pub fn collision_ticks(&self) -> u64 {
        self.collision_ticks
    }

    /// Take queued events (oldest first)
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(super) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn tick_period(&self) -> f64 {
        self.tuning.collision_tick_ms.max(MIN_TICK_MS)
    }

    /// START button (Idle -> Playing)
    pub fn start(&mut self) -> Result<(), CommandError> {
        self.expect_phase(GamePhase::Idle)?;
        if !self.music_started {
            self.music_started = true;
            self.emit(GameEvent::Sound(SoundEffect::Background));
        }
        self.enter_playing();
        Ok(())
    }

    /// RESET button (GameOver -> Playing)
    ///
    /// A qualifying score is committed under `name` and the leaderboard is
    /// saved before the new round starts. Without a usable name the restart
    /// is refused and nothing changes.
    pub fn restart(&mut self, name: Option<&str>, storage: &impl Storage) -> Result<(), CommandError> {
        self.expect_phase(GamePhase::GameOver)?;

        if self.new_high_score {
            let Some(entry) = name.and_then(|n| HighScoreEntry::new(n, self.score)) else {
                log::warn!("Restart refused: new high score needs a name");
                return Err(CommandError::NameRequired);
            };
            log::info!("New high score {} by {}", entry.score(), entry.name());
            let rank = self.high_scores.add(entry);
            self.high_scores.save(storage);
            self.emit(GameEvent::HighScoreCommitted { rank });
        }

        self.enter_playing();
        Ok(())
    }

    fn expect_phase(&self, expected: GamePhase) -> Result<(), CommandError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(CommandError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    fn enter_playing(&mut self) {
        self.phase = GamePhase::Playing;
        self.score = 0;
        self.new_high_score = false;
        self.collectible_latched = false;
        self.respawn_ms = None;
        self.pending_sounds.clear();
        self.smile.reset();
        self.tick_ms = Some(self.tick_period());

        self.emit(GameEvent::PhaseEntered(GamePhase::Playing));
        self.emit(GameEvent::ScoreChanged(0));
        self.emit(GameEvent::CollectibleShown { delay_ms: 0.0 });
        self.emit(GameEvent::ObstacleReset);
        self.emit(GameEvent::SamplingStarted);
        self.emit(GameEvent::Sound(SoundEffect::LetsGo));
        log::info!("Round started");
    }

    pub(super) fn enter_game_over(&mut self) {
        // Cancel the collision tick before anything else can observe Playing
        self.tick_ms = None;
        self.phase = GamePhase::GameOver;
        self.respawn_ms = None;
        self.collectible_latched = true;
        self.smile.reset();
        self.new_high_score = self.high_scores.qualifies(self.score);

        self.emit(GameEvent::PhaseEntered(GamePhase::GameOver));
        self.emit(GameEvent::SamplingStopped);
        self.emit(GameEvent::CollectibleHidden);
        self.emit(GameEvent::Sound(SoundEffect::Ouch));
        self.pending_sounds
            .push((self.tuning.game_over_sound_delay_ms, SoundEffect::GameOver));
        if self.new_high_score {
            let delay = self.tuning.celebration_delay_ms;
            self.pending_sounds.push((delay, SoundEffect::Win));
            self.pending_sounds.push((delay, SoundEffect::Clap));
        }
        log::info!(
            "Game over: score {} (new high score: {})",
            self.score,
            self.new_high_score
        );
    }

    /// Jump (spacebar or smile). Returns true if a jump started.
    ///
    /// Ignored outside Playing and while a jump is already in the air.
    pub fn request_jump(&mut self) -> bool {
        if self.phase != GamePhase::Playing || self.jump_ms.is_some() {
            return false;
        }
        self.jump_ms = Some(self.tuning.jump_duration_ms.max(0.0));
        self.emit(GameEvent::JumpStarted);
        self.emit(GameEvent::Sound(SoundEffect::Jump));
        true
    }

    /// Webcam sample. Returns true if it started a jump.
    pub fn on_happy_level(&mut self, level: f32) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        if self.smile.sample(level) {
            log::debug!("Smile detected ({:.3})", level);
            self.request_jump()
        } else {
            false
        }
    }

    /// Webcam denied or dropped: treat the level as 0
    pub fn signal_lost(&mut self) {
        self.smile.reset();
    }

    pub(super) fn land(&mut self) {
        self.jump_ms = None;
        self.emit(GameEvent::JumpEnded);
    }

    pub(super) fn collect(&mut self) {
        self.score += self.tuning.collectible_points;
        self.collectible_latched = true;
        self.respawn_ms = Some(self.tuning.respawn_delay_ms.max(0.0));
        self.emit(GameEvent::ScoreChanged(self.score));
        self.emit(GameEvent::CollectibleHidden);
        self.emit(GameEvent::Sound(SoundEffect::Eat));
        log::debug!("Berry eaten, score {}", self.score);
    }

    pub(super) fn respawn(&mut self) {
        self.respawn_ms = None;
        self.collectible_latched = false;
        let delay_ms = if self.tuning.respawn_jitter_ms > 0.0 {
            self.rng.random_range(0.0..self.tuning.respawn_jitter_ms)
        } else {
            0.0
        };
        self.emit(GameEvent::CollectibleShown { delay_ms });
    }

    pub(super) fn play_due_sounds(&mut self, epsilon: f64) {
        let mut due = Vec::new();
        self.pending_sounds.retain(|&(ms, sound)| {
            if ms <= epsilon {
                due.push(sound);
                false
            } else {
                true
            }
        });
        for sound in due {
            self.emit(GameEvent::Sound(sound));
        }
    }

    pub(super) fn count_collision_tick(&mut self) {
        self.collision_ticks += 1;
        let period = self.tick_period();
        self.tick_ms = self.tick_ms.map(|ms| ms + period);
    }

    /// End the round without a collision
    #[cfg(test)]
    pub(crate) fn force_game_over(&mut self) {
        if self.phase == GamePhase::Playing {
            self.enter_game_over();
        }
    }

    /// Set the score directly (tests)
    #[cfg(test)]
    pub(crate) fn set_score(&mut self, score: u64) {
        self.score = score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    fn full_board() -> HighScores {
        HighScores::from_entries(
            [("A", 50), ("B", 40), ("C", 30), ("D", 20), ("E", 10)]
                .iter()
                .map(|(n, s)| HighScoreEntry::new(n, *s).unwrap())
                .collect(),
        )
    }

    fn playing(high_scores: HighScores) -> GameState {
        let mut state = GameState::new(7, Tuning::default(), high_scores);
        state.start().unwrap();
        state.drain_events();
        state
    }

    #[test]
    fn test_start_from_idle() {
        let mut state = GameState::new(1, Tuning::default(), HighScores::new());
        assert_eq!(state.phase(), GamePhase::Idle);
        state.start().unwrap();
        assert_eq!(state.phase(), GamePhase::Playing);

        let events = state.drain_events();
        assert_eq!(events[0], GameEvent::Sound(SoundEffect::Background));
        assert!(events.contains(&GameEvent::SamplingStarted));
        assert!(events.contains(&GameEvent::Sound(SoundEffect::LetsGo)));

        assert_eq!(
            state.start(),
            Err(CommandError::WrongPhase {
                expected: GamePhase::Idle,
                actual: GamePhase::Playing
            })
        );
    }

    #[test]
    fn test_restart_requires_game_over() {
        let storage = MemoryStorage::new();
        let mut state = playing(HighScores::new());
        assert!(matches!(
            state.restart(Some("x"), &storage),
            Err(CommandError::WrongPhase { .. })
        ));
    }

    #[test]
    fn test_jump_debounced() {
        let mut state = playing(HighScores::new());
        assert!(state.request_jump());
        assert!(!state.request_jump());
        let jumps = state
            .drain_events()
            .iter()
            .filter(|e| **e == GameEvent::JumpStarted)
            .count();
        assert_eq!(jumps, 1);
    }

    #[test]
    fn test_jump_ignored_when_not_playing() {
        let mut state = GameState::new(1, Tuning::default(), HighScores::new());
        assert!(!state.request_jump());
        assert!(!state.on_happy_level(1.0));
    }

    #[test]
    fn test_smile_edge_triggers_single_jump() {
        let mut state = playing(HighScores::new());
        let fired: Vec<bool> = [0.95, 0.96, 0.97]
            .iter()
            .map(|&l| state.on_happy_level(l))
            .collect();
        assert_eq!(fired, [true, false, false]);
    }

    #[test]
    fn test_held_smile_fires_again_after_restart() {
        let storage = MemoryStorage::new();
        let mut state = playing(HighScores::new());
        assert!(state.on_happy_level(0.95));
        state.force_game_over();
        assert!(!state.on_happy_level(0.95));

        // Let the first jump land so the restart is not debounced
        crate::sim::advance(&mut state, 1000.0, &crate::sim::SceneSnapshot::default());
        state.restart(None, &storage).unwrap();

        // Entering Playing re-arms the trigger, so the held smile counts as a new edge
        assert!(state.on_happy_level(0.95));
        assert!(!state.on_happy_level(0.95));
    }

    #[test]
    fn test_high_score_verdict_cached() {
        let storage = MemoryStorage::new();
        let mut state = playing(full_board());
        state.set_score(15);
        state.force_game_over();
        assert!(state.is_new_high_score());

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::SamplingStopped));
        assert_eq!(state.pending_sounds.len(), 3);

        // Blank names are refused and nothing changes
        assert_eq!(state.restart(Some("   "), &storage), Err(CommandError::NameRequired));
        assert_eq!(state.restart(None, &storage), Err(CommandError::NameRequired));
        assert_eq!(state.phase(), GamePhase::GameOver);
        assert!(state.is_new_high_score());
        assert!(storage.is_empty());

        state.restart(Some(" Mai "), &storage).unwrap();
        assert_eq!(state.phase(), GamePhase::Playing);
        assert_eq!(state.score(), 0);
        assert_eq!(state.high_scores().len(), 5);
        assert_eq!(state.high_scores().min_score(), Some(15));
        assert_eq!(state.high_scores().entries()[4].name(), "Mai");
        assert!(state.pending_sounds.is_empty());
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::HighScoreCommitted { rank: Some(5) })
        );

        let saved = HighScores::load(&storage);
        assert_eq!(&saved, state.high_scores());
    }

    #[test]
    fn test_non_qualifying_restart_ignores_name() {
        let storage = MemoryStorage::new();
        let mut state = playing(full_board());
        state.set_score(10);
        state.force_game_over();
        assert!(!state.is_new_high_score());
        assert_eq!(state.pending_sounds.len(), 1);

        state.restart(None, &storage).unwrap();
        assert_eq!(state.phase(), GamePhase::Playing);
        assert_eq!(state.high_scores(), &full_board());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_zero_score_never_qualifies() {
        let mut state = playing(HighScores::new());
        state.force_game_over();
        assert!(!state.is_new_high_score());
    }

    #[test]
    fn test_background_music_only_first_start() {
        let storage = MemoryStorage::new();
        let mut state = playing(HighScores::new());
        state.force_game_over();
        state.restart(None, &storage).unwrap();
        assert!(
            !state
                .drain_events()
                .contains(&GameEvent::Sound(SoundEffect::Background))
        );
    }

    #[test]
    fn test_command_error_display() {
        assert_eq!(
            CommandError::NameRequired.to_string(),
            "a name is required for a new high score"
        );
    }
}
