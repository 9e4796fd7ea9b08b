//! Game state and core simulation types
//!
//! A `Session` is the root aggregate for one run. It is rebuilt from scratch
//! whenever a new game starts; nothing but the best scores carries over.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clouds::CloudLayer;
use crate::consts::*;
use crate::leaderboard::TimeFilter;

/// The bird. Only its vertical axis moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BirdState {
    /// Top edge, px from the top of the playfield
    pub position: f32,
    /// px/tick, positive is downward
    pub velocity: f32,
    /// Cosmetic tilt in degrees (never affects physics)
    pub rotation: f32,
    /// Ticks until the tilt reverts
    pub tilt_ticks: u32,
}

impl Default for BirdState {
    fn default() -> Self {
        Self {
            position: BIRD_START_POSITION,
            velocity: 0.0,
            rotation: 0.0,
            tilt_ticks: 0,
        }
    }
}

impl BirdState {
    /// Lowest legal top edge
    pub fn floor_bound() -> f32 {
        PLAYFIELD_HEIGHT - BIRD_HEIGHT
    }

    pub fn bottom(&self) -> f32 {
        self.position + BIRD_HEIGHT
    }
}

/// The single scrolling pipe pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipePair {
    /// Left edge, px (decreases every tick)
    pub position: f32,
    /// Position recorded on the previous tick, for pass detection
    pub last_position: f32,
    /// Height of the top pipe (= top of the gap)
    pub gap_top: f32,
    /// Height of the opening
    pub gap_size: u32,
}

impl PipePair {
    pub fn new(gap_size: u32) -> Self {
        Self {
            position: PIPE_SPAWN_X,
            last_position: PIPE_SPAWN_X,
            gap_top: INITIAL_PIPE_HEIGHT,
            gap_size,
        }
    }

    pub fn gap_bottom(&self) -> f32 {
        self.gap_top + self.gap_size as f32
    }

    /// Height of the bottom pipe
    pub fn bottom_height(&self) -> f32 {
        PLAYFIELD_HEIGHT - self.gap_top - self.gap_size as f32
    }
}

/// Scores visible to the player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    /// Pipes passed this session
    pub current: u32,
    /// Best score on this device (persisted)
    pub best_local: u32,
    /// Best score on the remote leaderboard, if fetched
    pub best_global: Option<u32>,
}

/// Per-session difficulty. `pipe_speed` only ever grows within a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultySettings {
    /// px/tick
    pub pipe_speed: f32,
    /// px
    pub pipe_gap: u32,
    /// Added to `pipe_speed` every SPEED_INTERVAL points
    pub speed_increment: f32,
}

/// Steps of the pre-game countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownStep {
    Three,
    Two,
    One,
    Go,
}

impl CountdownStep {
    /// Next step, or None once "GO!" has been shown
    pub fn next(self) -> Option<Self> {
        match self {
            CountdownStep::Three => Some(CountdownStep::Two),
            CountdownStep::Two => Some(CountdownStep::One),
            CountdownStep::One => Some(CountdownStep::Go),
            CountdownStep::Go => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CountdownStep::Three => "3",
            CountdownStep::Two => "2",
            CountdownStep::One => "1",
            CountdownStep::Go => "GO!",
        }
    }
}

/// Whether the final score earns a leaderboard slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Qualification {
    /// Waiting on the store
    Pending,
    /// No slot, or nothing to submit
    NotQualified,
    /// Store unreachable; treated as not qualified
    Unknown,
}

/// Where the leaderboard modal was opened from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderboardOrigin {
    /// Title menu, no session involved
    Menu,
    /// After submitting a score
    AfterGame,
}

/// The one mode tag every overlay and input decision derives from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Title menu, nothing moves
    Idle,
    /// Difficulty/audio settings, reachable from Idle only
    Settings,
    /// Pre-game countdown, physics frozen
    Countdown { step: CountdownStep },
    /// Tick loop active
    Running,
    /// Run ended; state frozen at the moment of collision
    GameOver { qualification: Qualification },
    /// Name entry for a qualifying score
    ScoreSubmission { submitting: bool },
    /// Top-K table
    LeaderboardView {
        origin: LeaderboardOrigin,
        filter: TimeFilter,
    },
}

/// Fieldless mirror of `GameMode` for comparisons and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeKind {
    Idle,
    Settings,
    Countdown,
    Running,
    GameOver,
    ScoreSubmission,
    LeaderboardView,
}

impl GameMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            GameMode::Idle => ModeKind::Idle,
            GameMode::Settings => ModeKind::Settings,
            GameMode::Countdown { .. } => ModeKind::Countdown,
            GameMode::Running => ModeKind::Running,
            GameMode::GameOver { .. } => ModeKind::GameOver,
            GameMode::ScoreSubmission { .. } => ModeKind::ScoreSubmission,
            GameMode::LeaderboardView { .. } => ModeKind::LeaderboardView,
        }
    }

    /// A modal overlay currently owns input
    pub fn is_modal(&self) -> bool {
        matches!(
            self,
            GameMode::Settings
                | GameMode::Countdown { .. }
                | GameMode::ScoreSubmission { .. }
                | GameMode::LeaderboardView { .. }
        )
    }
}

/// Things that happened during a command or tick, for audio/persistence/UI
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// A new session began (id)
    Started(u64),
    Flap,
    /// A pipe was passed; new score
    Scored(u32),
    /// Pipe speed increased; new speed
    SpeedUp(f32),
    Hit,
    /// Session ended; qualification lookup needed unless the score is 0
    GameOver { score: u32, needs_qualification: bool },
    /// Local best beaten; persist it
    NewBest(u32),
    CountdownStep(CountdownStep),
    ModeChanged(ModeKind),
}

/// One run of the game
#[derive(Debug, Clone)]
pub struct Session {
    /// Generation counter; ticks and async results carry it
    pub id: u64,
    pub bird: BirdState,
    pub pipe: PipePair,
    pub score: ScoreState,
    pub difficulty: DifficultySettings,
    pub clouds: CloudLayer,
    /// Ticks simulated while Running
    pub time_ticks: u64,
    /// Pipe height RNG
    pub rng: Pcg32,
}

impl Session {
    /// Fresh session with the bird and pipe at their start positions
    pub fn new(id: u64, seed: u64, baseline: DifficultySettings, score: ScoreState) -> Self {
        Self {
            id,
            bird: BirdState::default(),
            pipe: PipePair::new(baseline.pipe_gap),
            score: ScoreState {
                current: 0,
                ..score
            },
            difficulty: baseline,
            clouds: CloudLayer::new(seed),
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}
