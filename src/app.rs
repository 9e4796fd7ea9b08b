//! Host shell
//!
//! `App` wires the engine to everything outside it: the two clocks, the
//! key-value store, audio and the player's settings. It never talks to the
//! network itself. Leaderboard work is queued as `StoreRequest`s which the
//! host drains, runs detached, and hands back through the `deliver_*` and
//! `complete_*` methods tagged with the session they were made for.

use crate::audio::{AudioPlayer, Clip};
use crate::consts::{COUNTDOWN_STEP_SECS, MAX_SUBSTEPS, SIM_DT};
use crate::error::{GameError, StoreError};
use crate::leaderboard::{LeaderboardEntry, TimeFilter};
use crate::persistence::{self, KeyValueStore};
use crate::render::Scene;
use crate::settings::{DifficultyLevel, Settings};
use crate::sim::{Game, GameEvent, GameMode, Submission, Ticker};

/// Leaderboard work the host should run in the background
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRequest {
    /// Fetch today's top-K to decide whether the ended session qualifies
    CheckQualification { session_id: u64 },
    /// Store a validated name, then fetch the all-time table
    Submit(Submission),
    /// Fetch the table for a filter
    FetchTop(TimeFilter),
    FetchGlobalBest,
}

pub struct App<S: KeyValueStore, A: AudioPlayer> {
    game: Game,
    settings: Settings,
    store: S,
    audio: A,
    sim_clock: Ticker,
    countdown_clock: Ticker,
    requests: Vec<StoreRequest>,
    /// Tab hidden: frames are ignored
    suspended: bool,
}

impl<S: KeyValueStore, A: AudioPlayer> App<S, A> {
    pub fn new(store: S, mut audio: A, seed: u64) -> Self {
        let settings = Settings::load(&store);
        let best = persistence::load_best_score(&store);

        audio.set_volume(settings.effective_volume());

        log::info!("Game initialized with seed: {}", seed);
        Self {
            game: Game::new(seed, settings.difficulty, best),
            settings,
            store,
            audio,
            sim_clock: Ticker::new(SIM_DT, MAX_SUBSTEPS),
            countdown_clock: Ticker::new(COUNTDOWN_STEP_SECS, 1),
            requests: vec![StoreRequest::FetchGlobalBest],
            suspended: false,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Snapshot for the presentation layer
    pub fn scene(&self) -> Scene {
        Scene::capture(&self.game, &self.settings)
    }

    /// Drain queued leaderboard work
    pub fn take_requests(&mut self) -> Vec<StoreRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn set_suspended(&mut self, suspended: bool) {
        if suspended != self.suspended {
            log::info!("{}", if suspended { "Suspended" } else { "Resumed" });
        }
        self.suspended = suspended;
    }

    pub fn set_autopilot(&mut self, on: bool) {
        self.game.set_autopilot(on);
    }

    /// Advance both clocks by `dt` seconds of wall time
    pub fn frame(&mut self, dt: f32) -> Vec<GameEvent> {
        if self.suspended {
            return Vec::new();
        }

        let mut events = Vec::new();

        self.sync_clocks();
        for tick in self.countdown_clock.advance(dt) {
            match self.game.countdown_step(tick) {
                Ok(step) => events.extend(step),
                Err(err) => {
                    log::debug!("Dropped countdown tick: {}", err);
                    break;
                }
            }
        }

        self.sync_clocks();
        for tick in self.sim_clock.advance(dt) {
            match self.game.tick(tick) {
                Ok(step) => events.extend(step),
                Err(err) => {
                    log::debug!("Dropped tick: {}", err);
                    break;
                }
            }
        }

        self.sync_clocks();
        self.handle_events(&events);
        events
    }

    /// Arm exactly the clock the current mode needs, for the live session
    fn sync_clocks(&mut self) {
        let id = self.game.session_id();
        match self.game.mode() {
            GameMode::Running => {
                self.sim_clock.arm(id);
                self.countdown_clock.disarm();
            }
            GameMode::Countdown { .. } => {
                self.countdown_clock.arm(id);
                self.sim_clock.disarm();
            }
            _ => {
                self.sim_clock.disarm();
                self.countdown_clock.disarm();
            }
        }
    }

    fn handle_events(&mut self, events: &[GameEvent]) {
        for event in events {
            if let Some(clip) = Clip::for_event(event) {
                self.audio.play(clip);
            }
            match *event {
                GameEvent::NewBest(best) => persistence::save_best_score(&self.store, best),
                GameEvent::GameOver {
                    needs_qualification: true,
                    ..
                } => self.requests.push(StoreRequest::CheckQualification {
                    session_id: self.game.session_id(),
                }),
                _ => {}
            }
        }
    }

    fn apply(
        &mut self,
        result: Result<Vec<GameEvent>, GameError>,
    ) -> Result<Vec<GameEvent>, GameError> {
        let events = result.inspect_err(|err| log::debug!("Rejected: {}", err))?;
        self.sync_clocks();
        self.handle_events(&events);
        Ok(events)
    }

    // === Player commands ===

    pub fn jump(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let result = self.game.jump();
        self.apply(result)
    }

    pub fn play_again(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let result = self.game.play_again();
        self.apply(result)
    }

    pub fn cancel_countdown(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let result = self.game.cancel_countdown();
        self.apply(result)
    }

    pub fn back_to_home(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let result = self.game.back_to_home();
        self.apply(result)
    }

    pub fn open_leaderboard(&mut self, filter: TimeFilter) -> Result<Vec<GameEvent>, GameError> {
        let result = self.game.open_leaderboard(filter);
        let events = self.apply(result)?;
        self.requests.push(StoreRequest::FetchTop(filter));
        Ok(events)
    }

    pub fn set_leaderboard_filter(&mut self, filter: TimeFilter) -> Result<(), GameError> {
        self.game.set_leaderboard_filter(filter)?;
        self.requests.push(StoreRequest::FetchTop(filter));
        Ok(())
    }

    pub fn close_leaderboard(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let result = self.game.close_leaderboard();
        self.apply(result)
    }

    pub fn open_settings(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let result = self.game.open_settings();
        self.apply(result)
    }

    pub fn close_settings(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let result = self.game.close_settings();
        self.apply(result)
    }

    pub fn submit_name(&mut self, raw: &str) -> Result<(), GameError> {
        let submission = self.game.submit_name(raw)?;
        log::info!("Submitting {} for {}", submission.score, submission.name);
        self.requests.push(StoreRequest::Submit(submission));
        Ok(())
    }

    // === Settings ===

    pub fn select_difficulty(&mut self, level: DifficultyLevel) -> Result<(), GameError> {
        self.game.select_difficulty(level)?;
        self.settings.difficulty = level;
        self.settings.save(&self.store);
        Ok(())
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        self.audio.set_volume(self.settings.effective_volume());
        self.settings.save(&self.store);
    }

    pub fn set_volume(&mut self, master: f32, sfx: f32) {
        self.settings.set_master_volume(master);
        self.settings.set_sfx_volume(sfx);
        self.audio.set_volume(self.settings.effective_volume());
        self.settings.save(&self.store);
    }

    pub fn set_show_clouds(&mut self, show: bool) {
        self.settings.show_clouds = show;
        self.settings.save(&self.store);
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.settings.reduced_motion = reduced;
        self.settings.save(&self.store);
    }

    // === Store results ===

    pub fn resolve_qualification(
        &mut self,
        session_id: u64,
        daily_top: Result<Vec<LeaderboardEntry>, StoreError>,
    ) -> Result<Vec<GameEvent>, GameError> {
        let result = self.game.resolve_qualification(session_id, daily_top);
        self.apply(result)
    }

    pub fn complete_submission(
        &mut self,
        session_id: u64,
        top: Result<Vec<LeaderboardEntry>, StoreError>,
    ) -> Result<Vec<GameEvent>, GameError> {
        let stored = top.is_ok();
        let result = self.game.complete_submission(session_id, top);
        let events = self.apply(result)?;
        if stored {
            self.requests.push(StoreRequest::FetchGlobalBest);
        }
        Ok(events)
    }

    pub fn deliver_leaderboard(
        &mut self,
        filter: TimeFilter,
        top: Result<Vec<LeaderboardEntry>, StoreError>,
    ) {
        self.game.deliver_leaderboard(filter, top);
    }

    pub fn deliver_global_best(&mut self, best: Result<u32, StoreError>) {
        self.game.deliver_global_best(best);
    }
}
