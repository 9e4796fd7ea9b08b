//! Deterministic game engine
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Fixed 20 ms ticks only
//! - Seeded RNG only
//! - No rendering, audio or storage dependencies

pub mod autopilot;
pub mod clock;
pub mod clouds;
pub mod collision;
pub mod mode;
pub mod physics;
pub mod scoring;
pub mod state;

pub use clock::{Tick, Ticker};
pub use clouds::{Cloud, CloudLayer};
pub use collision::{Aabb, Collision, check_collision};
pub use mode::{Game, Submission};
pub use physics::StepOutcome;
pub use state::{
    BirdState, CountdownStep, DifficultySettings, GameEvent, GameMode, LeaderboardOrigin,
    ModeKind, PipePair, Qualification, ScoreState, Session,
};
