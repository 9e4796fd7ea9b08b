//! Flappy Sky - a Flappy Bird clone for the browser
//!
//! Core modules:
//! - `sim`: Deterministic game engine (physics, collisions, scoring, game modes)
//! - `leaderboard`: Ranked score entries and the stores that hold them
//! - `persistence`: Key-value slots for best score and preferences
//! - `render`: Read-only scene snapshots for the presentation layer
//! - `app`: Host shell wiring the engine to clocks, audio and storage

pub mod app;
pub mod audio;
pub mod error;
pub mod leaderboard;
pub mod persistence;
pub mod render;
pub mod settings;
pub mod sim;

pub use app::{App, StoreRequest};
pub use error::{GameError, StoreError};
pub use leaderboard::{LeaderboardEntry, TimeFilter};
pub use settings::{DifficultyLevel, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (20 ms, 50 Hz)
    pub const SIM_DT: f32 = 0.02;
    /// Countdown step length (seconds per 3, 2, 1, GO!)
    pub const COUNTDOWN_STEP_SECS: f32 = 1.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta fed to the clocks (tab switches etc.)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 400.0;
    pub const PLAYFIELD_HEIGHT: f32 = 500.0;

    /// Bird geometry - fixed horizontal position, moves vertically only
    pub const BIRD_LEFT: f32 = 50.0;
    pub const BIRD_WIDTH: f32 = 80.0;
    pub const BIRD_HEIGHT: f32 = 56.0;
    pub const BIRD_START_POSITION: f32 = 250.0;

    /// Downward acceleration (px/tick²)
    pub const GRAVITY: f32 = 0.4;
    /// Upward velocity set by a flap (px/tick)
    pub const JUMP_IMPULSE: f32 = 8.0;
    /// Terminal fall velocity (px/tick)
    pub const MAX_FALL_VELOCITY: f32 = 10.0;
    /// Cosmetic tilt applied on a flap (degrees)
    pub const JUMP_TILT: f32 = -20.0;
    /// Ticks before the flap tilt reverts (300 ms)
    pub const JUMP_TILT_TICKS: u32 = 15;

    /// Pipe geometry
    pub const PIPE_WIDTH: f32 = 60.0;
    pub const PIPE_SPAWN_X: f32 = 400.0;
    pub const MIN_PIPE_HEIGHT: f32 = 50.0;
    pub const MAX_PIPE_HEIGHT: f32 = 300.0;
    pub const INITIAL_PIPE_HEIGHT: f32 = 200.0;
    /// Hard cap on scroll speed; must stay below PIPE_WIDTH
    pub const MAX_PIPE_SPEED: f32 = 40.0;

    /// Score points between speed-ups
    pub const SPEED_INTERVAL: u32 = 5;
    /// Forgiveness applied to pipe hitboxes (px)
    pub const COLLISION_BUFFER: f32 = 5.0;

    /// Decorative clouds
    pub const CLOUD_SPEED: f32 = 0.5;
    pub const CLOUD_WIDTH: f32 = 300.0;
    pub const CLOUD_HEIGHT: f32 = 150.0;

    /// Leaderboard
    pub const LEADERBOARD_TOP_K: usize = 10;
    pub const MAX_NAME_LEN: usize = 16;
}
