//! Game mode state machine
//!
//! `Game` owns the live `Session` and the single `GameMode` tag. Every input,
//! tick and async store result goes through it; anything not valid for the
//! current mode (or for a replaced session) is refused without side effects.

use super::autopilot;
use super::clock::Tick;
use super::collision;
use super::physics;
use super::scoring;
use super::state::{
    CountdownStep, GameEvent, GameMode, LeaderboardOrigin, Qualification, ScoreState, Session,
};
use crate::consts::LEADERBOARD_TOP_K;
use crate::error::{GameError, StoreError};
use crate::leaderboard::{self, LeaderboardEntry, TimeFilter};
use crate::settings::DifficultyLevel;

/// A validated name, ready to hand to a leaderboard store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub session_id: u64,
    pub name: String,
    pub score: u32,
}

pub struct Game {
    mode: GameMode,
    session: Session,
    level: DifficultyLevel,
    seed: u64,
    /// Last fetched top-K view
    leaderboard: Vec<LeaderboardEntry>,
    /// Demo mode: the game flaps for the player
    autopilot: bool,
}

impl Game {
    pub fn new(seed: u64, level: DifficultyLevel, best_local: u32) -> Self {
        let score = ScoreState {
            best_local,
            ..Default::default()
        };
        Self {
            mode: GameMode::Idle,
            session: Session::new(1, session_seed(seed, 1), level.baseline(), score),
            level,
            seed,
            leaderboard: Vec::new(),
            autopilot: false,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_id(&self) -> u64 {
        self.session.id
    }

    pub fn score(&self) -> &ScoreState {
        &self.session.score
    }

    pub fn level(&self) -> DifficultyLevel {
        self.level
    }

    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.leaderboard
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    pub fn set_autopilot(&mut self, on: bool) {
        self.autopilot = on;
        log::info!("Autopilot: {}", on);
    }

    // === Internal transitions ===

    fn set_mode(&mut self, mode: GameMode, events: &mut Vec<GameEvent>) {
        let changed = mode.kind() != self.mode.kind();
        self.mode = mode;
        if changed {
            log::debug!("Mode -> {:?}", mode.kind());
            events.push(GameEvent::ModeChanged(mode.kind()));
        }
    }

    /// Replace the session; scores other than `current` carry over
    fn new_session(&mut self) -> u64 {
        let id = self.session.id + 1;
        self.session = Session::new(
            id,
            session_seed(self.seed, id),
            self.level.baseline(),
            self.session.score,
        );
        id
    }

    fn reset_to_idle(&mut self, events: &mut Vec<GameEvent>) {
        self.new_session();
        self.set_mode(GameMode::Idle, events);
    }

    fn start_running(&mut self, events: &mut Vec<GameEvent>) {
        let id = self.new_session();
        log::info!("Session {} started ({})", id, self.level.as_str());
        events.push(GameEvent::Started(id));
        self.set_mode(GameMode::Running, events);
    }

    fn start_countdown(&mut self, events: &mut Vec<GameEvent>) {
        let id = self.new_session();
        log::info!("Session {} counting down ({})", id, self.level.as_str());
        events.push(GameEvent::Started(id));
        let step = CountdownStep::Three;
        self.set_mode(GameMode::Countdown { step }, events);
        events.push(GameEvent::CountdownStep(step));
    }

    fn end_session(&mut self, events: &mut Vec<GameEvent>) {
        let score = self.session.score.current;
        events.push(GameEvent::Hit);
        if scoring::on_session_end(&mut self.session.score) {
            log::info!("New best score: {}", score);
            events.push(GameEvent::NewBest(score));
        }

        let needs_qualification = score > 0;
        let qualification = if needs_qualification {
            Qualification::Pending
        } else {
            Qualification::NotQualified
        };
        log::info!("Session {} over, score {}", self.session.id, score);
        self.set_mode(GameMode::GameOver { qualification }, events);
        events.push(GameEvent::GameOver {
            score,
            needs_qualification,
        });
    }

    fn wrong_mode(&self, expected: &'static str) -> GameError {
        GameError::WrongMode {
            expected,
            actual: self.mode.kind(),
        }
    }

    fn check_session(&self, session_id: u64) -> Result<(), GameError> {
        if session_id == self.session.id {
            Ok(())
        } else {
            Err(GameError::StaleSession {
                expected: self.session.id,
                got: session_id,
            })
        }
    }

    // === Player input ===

    /// The single "jump" intent: starts a game from Idle/GameOver, flaps while Running
    pub fn jump(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let mut events = Vec::new();
        match self.mode {
            GameMode::Idle | GameMode::GameOver { .. } => {
                self.start_running(&mut events);
            }
            GameMode::Running => {}
            _ => return Err(self.wrong_mode("Idle, Running or GameOver")),
        }
        physics::flap(&mut self.session.bird);
        events.push(GameEvent::Flap);
        Ok(events)
    }

    /// New session behind a 3, 2, 1, GO! countdown
    pub fn play_again(&mut self) -> Result<Vec<GameEvent>, GameError> {
        match self.mode {
            GameMode::GameOver { .. } | GameMode::LeaderboardView { .. } => {
                let mut events = Vec::new();
                self.start_countdown(&mut events);
                Ok(events)
            }
            _ => Err(self.wrong_mode("GameOver or LeaderboardView")),
        }
    }

    /// Abort the countdown back to the title menu
    pub fn cancel_countdown(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if !matches!(self.mode, GameMode::Countdown { .. }) {
            return Err(self.wrong_mode("Countdown"));
        }
        let mut events = Vec::new();
        self.reset_to_idle(&mut events);
        Ok(events)
    }

    /// Leave the post-game screens for the title menu (full reset)
    pub fn back_to_home(&mut self) -> Result<Vec<GameEvent>, GameError> {
        match self.mode {
            GameMode::GameOver { .. } | GameMode::ScoreSubmission { .. } => {
                let mut events = Vec::new();
                self.reset_to_idle(&mut events);
                Ok(events)
            }
            _ => Err(self.wrong_mode("GameOver or ScoreSubmission")),
        }
    }

    pub fn open_leaderboard(&mut self, filter: TimeFilter) -> Result<Vec<GameEvent>, GameError> {
        if self.mode != GameMode::Idle {
            return Err(self.wrong_mode("Idle"));
        }
        let mut events = Vec::new();
        self.set_mode(
            GameMode::LeaderboardView {
                origin: LeaderboardOrigin::Menu,
                filter,
            },
            &mut events,
        );
        Ok(events)
    }

    /// Switch the table's time window
    pub fn set_leaderboard_filter(&mut self, filter: TimeFilter) -> Result<(), GameError> {
        match &mut self.mode {
            GameMode::LeaderboardView { filter: current, .. } => {
                *current = filter;
                Ok(())
            }
            _ => Err(self.wrong_mode("LeaderboardView")),
        }
    }

    /// Close the table; always lands on a freshly reset title menu
    pub fn close_leaderboard(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if !matches!(self.mode, GameMode::LeaderboardView { .. }) {
            return Err(self.wrong_mode("LeaderboardView"));
        }
        let mut events = Vec::new();
        self.reset_to_idle(&mut events);
        Ok(events)
    }

    pub fn open_settings(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if self.mode != GameMode::Idle {
            return Err(self.wrong_mode("Idle"));
        }
        let mut events = Vec::new();
        self.set_mode(GameMode::Settings, &mut events);
        Ok(events)
    }

    pub fn close_settings(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if self.mode != GameMode::Settings {
            return Err(self.wrong_mode("Settings"));
        }
        let mut events = Vec::new();
        self.set_mode(GameMode::Idle, &mut events);
        Ok(events)
    }

    /// Change the baseline for future sessions. Never touches a running game.
    pub fn select_difficulty(&mut self, level: DifficultyLevel) -> Result<(), GameError> {
        if !matches!(self.mode, GameMode::Idle | GameMode::Settings) {
            return Err(self.wrong_mode("Idle or Settings"));
        }
        self.level = level;
        self.new_session();
        log::info!("Difficulty set to {}", level.as_str());
        Ok(())
    }

    // === Clocks ===

    /// One simulation step. Only valid while Running, for the live session.
    pub fn tick(&mut self, tick: Tick) -> Result<Vec<GameEvent>, GameError> {
        self.check_session(tick.generation)?;
        if self.mode != GameMode::Running {
            return Err(self.wrong_mode("Running"));
        }

        let mut events = Vec::new();
        let session = &mut self.session;

        if self.autopilot && autopilot::should_flap(&session.bird, &session.pipe) {
            physics::flap(&mut session.bird);
            events.push(GameEvent::Flap);
        }

        let step = physics::advance(
            &mut session.bird,
            &mut session.pipe,
            &session.difficulty,
            &mut session.rng,
        );
        session.clouds.advance();
        session.time_ticks += 1;

        if step.passed {
            let sped_up = scoring::on_pipe_passed(&mut session.score, &mut session.difficulty);
            events.push(GameEvent::Scored(session.score.current));
            if let Some(speed) = sped_up {
                log::debug!("Pipe speed now {:.1}", speed);
                events.push(GameEvent::SpeedUp(speed));
            }
        }

        if step.hit_floor || collision::check_collision(&session.bird, &session.pipe) {
            self.end_session(&mut events);
        }

        Ok(events)
    }

    /// Advance the countdown by one step; after "GO!" the game runs
    pub fn countdown_step(&mut self, tick: Tick) -> Result<Vec<GameEvent>, GameError> {
        self.check_session(tick.generation)?;
        let GameMode::Countdown { step } = self.mode else {
            return Err(self.wrong_mode("Countdown"));
        };

        let mut events = Vec::new();
        match step.next() {
            Some(next) => {
                self.set_mode(GameMode::Countdown { step: next }, &mut events);
                events.push(GameEvent::CountdownStep(next));
            }
            None => self.set_mode(GameMode::Running, &mut events),
        }
        Ok(events)
    }

    // === Store results ===

    /// Today's top-K arrived (or failed) for the session that just ended
    pub fn resolve_qualification(
        &mut self,
        session_id: u64,
        daily_top: Result<Vec<LeaderboardEntry>, StoreError>,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.check_session(session_id)?;
        if self.mode
            != (GameMode::GameOver {
                qualification: Qualification::Pending,
            })
        {
            return Err(self.wrong_mode("GameOver awaiting qualification"));
        }

        let mut events = Vec::new();
        let score = self.session.score.current;
        match daily_top {
            Ok(top) => match leaderboard::potential_rank(&top, LEADERBOARD_TOP_K, score) {
                Some(rank) => {
                    log::info!("Score {} qualifies at rank {}", score, rank);
                    self.set_mode(GameMode::ScoreSubmission { submitting: false }, &mut events);
                }
                None => {
                    let qualification = Qualification::NotQualified;
                    self.set_mode(GameMode::GameOver { qualification }, &mut events);
                }
            },
            Err(err) => {
                log::warn!("Could not check leaderboard: {}", err);
                let qualification = Qualification::Unknown;
                self.set_mode(GameMode::GameOver { qualification }, &mut events);
            }
        }
        Ok(events)
    }

    /// Validate the typed name. Nothing changes if it is rejected.
    pub fn submit_name(&mut self, raw: &str) -> Result<Submission, GameError> {
        if self.mode != (GameMode::ScoreSubmission { submitting: false }) {
            return Err(self.wrong_mode("ScoreSubmission"));
        }
        let name = leaderboard::validate_name(raw)?;
        self.mode = GameMode::ScoreSubmission { submitting: true };
        Ok(Submission {
            session_id: self.session.id,
            name,
            score: self.session.score.current,
        })
    }

    /// Store acknowledged (or failed) a submission; on success show the table
    pub fn complete_submission(
        &mut self,
        session_id: u64,
        top: Result<Vec<LeaderboardEntry>, StoreError>,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.check_session(session_id)?;
        if self.mode != (GameMode::ScoreSubmission { submitting: true }) {
            return Err(self.wrong_mode("ScoreSubmission in flight"));
        }

        let mut events = Vec::new();
        match top {
            Ok(top) => {
                self.leaderboard = top;
                self.set_mode(
                    GameMode::LeaderboardView {
                        origin: LeaderboardOrigin::AfterGame,
                        filter: TimeFilter::All,
                    },
                    &mut events,
                );
            }
            Err(err) => {
                log::warn!("Score submission failed: {}", err);
                self.mode = GameMode::ScoreSubmission { submitting: false };
            }
        }
        Ok(events)
    }

    /// Refresh the table slot. Failures keep the previous entries.
    pub fn deliver_leaderboard(
        &mut self,
        filter: TimeFilter,
        top: Result<Vec<LeaderboardEntry>, StoreError>,
    ) {
        match top {
            Ok(top) => {
                let showing = matches!(
                    self.mode,
                    GameMode::LeaderboardView { filter: f, .. } if f == filter
                );
                if showing {
                    self.leaderboard = top;
                } else {
                    log::debug!("Dropping leaderboard for {} (not shown)", filter.as_str());
                }
            }
            Err(err) => log::warn!("Could not load leaderboard: {}", err),
        }
    }

    /// Update the global best. Failures keep the previous value.
    pub fn deliver_global_best(&mut self, best: Result<u32, StoreError>) {
        match best {
            Ok(best) => self.session.score.best_global = Some(best),
            Err(err) => log::warn!("Could not load global best: {}", err),
        }
    }
}

/// Per-session RNG seed
fn session_seed(seed: u64, id: u64) -> u64 {
    seed ^ id.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::leaderboard::tests::entry;
    use crate::sim::state::{BirdState, ModeKind};

    fn tick_of(game: &Game) -> Tick {
        Tick {
            generation: game.session_id(),
        }
    }

    fn running_game() -> Game {
        let mut game = Game::new(42, DifficultyLevel::Normal, 0);
        game.jump().unwrap();
        game
    }

    /// Tick until the run ends, returning all events
    fn play_out(game: &mut Game) -> Vec<GameEvent> {
        let mut all = Vec::new();
        for _ in 0..2000 {
            all.extend(game.tick(tick_of(game)).unwrap());
            if game.mode().kind() == ModeKind::GameOver {
                return all;
            }
        }
        panic!("session never ended");
    }

    /// Ended session with the given score
    fn game_over_with(score: u32) -> Game {
        let mut game = running_game();
        game.session.score.current = score;
        game.session.bird.position = BirdState::floor_bound() - 1.0;
        play_out(&mut game);
        game
    }

    #[test]
    fn test_starts_idle() {
        let game = Game::new(1, DifficultyLevel::Easy, 12);
        assert_eq!(game.mode(), GameMode::Idle);
        assert_eq!(game.score().best_local, 12);
        assert_eq!(game.session().difficulty.pipe_speed, 2.5);
    }

    #[test]
    fn test_jump_from_idle_runs_without_countdown() {
        let mut game = Game::new(1, DifficultyLevel::Normal, 0);
        let events = game.jump().unwrap();
        assert_eq!(game.mode(), GameMode::Running);
        assert!(events.contains(&GameEvent::Flap));
        assert!(events.contains(&GameEvent::ModeChanged(ModeKind::Running)));
        assert_eq!(game.session().bird.velocity, -JUMP_IMPULSE);
    }

    #[test]
    fn test_scenario_first_tick() {
        let mut game = Game::new(1, DifficultyLevel::Normal, 0);
        game.jump().unwrap();
        game.session.bird.velocity = 0.0;
        game.tick(tick_of(&game)).unwrap();
        assert!((game.session().bird.velocity - 0.4).abs() < 1e-6);
        assert!((game.session().bird.position - 250.4).abs() < 1e-4);
    }

    #[test]
    fn test_flap_mid_flight() {
        let mut game = running_game();
        for _ in 0..5 {
            game.tick(tick_of(&game)).unwrap();
        }
        game.jump().unwrap();
        assert_eq!(game.session().bird.velocity, -8.0);
        game.tick(tick_of(&game)).unwrap();
        assert!((game.session().bird.velocity - -7.6).abs() < 1e-5);
    }

    #[test]
    fn test_pass_scores_once_then_keeps_scrolling() {
        let mut game = running_game();
        game.session.pipe.position = 10.0;
        game.session.pipe.last_position = 50.0;
        // keep the bird inside the gap
        game.session.pipe.gap_top = 200.0;
        game.session.bird.position = 250.0;
        game.session.bird.velocity = -0.4;

        let events = game.tick(tick_of(&game)).unwrap();
        assert!(events.contains(&GameEvent::Scored(1)));
        assert_eq!(game.session().pipe.position, 7.0);

        game.session.bird.velocity = -0.4;
        let events = game.tick(tick_of(&game)).unwrap();
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Scored(_))));
        assert_eq!(game.score().current, 1);
        assert_eq!(game.session().pipe.position, 4.0);
    }

    #[test]
    fn test_speed_up_at_five() {
        let mut game = running_game();
        game.session.score.current = 4;
        game.session.pipe.position = 49.0;
        game.session.pipe.last_position = 52.0;
        game.session.pipe.gap_top = 200.0;
        game.session.bird.position = 250.0;

        let events = game.tick(tick_of(&game)).unwrap();
        assert!(events.contains(&GameEvent::SpeedUp(3.5)));
        for _ in 0..3 {
            game.session.bird.velocity = -0.4;
            game.tick(tick_of(&game)).unwrap();
        }
        assert_eq!(game.session().difficulty.pipe_speed, 3.5);
    }

    /// Score the fifth point so the pipe speeds up
    fn force_speed_up(game: &mut Game) {
        game.session.score.current = 4;
        game.session.pipe.position = 49.0;
        game.session.pipe.last_position = 52.0;
        game.session.pipe.gap_top = 200.0;
        game.session.bird.position = 250.0;
        game.session.bird.velocity = 0.0;
        game.tick(tick_of(game)).unwrap();
        assert_eq!(game.session().difficulty.pipe_speed, 3.5);
    }

    #[test]
    fn test_speed_resets_on_every_new_session() {
        let baseline = DifficultyLevel::Normal.baseline();

        let mut game = running_game();
        force_speed_up(&mut game);
        play_out(&mut game);
        game.jump().unwrap();
        assert_eq!(game.mode(), GameMode::Running);
        assert_eq!(game.session().difficulty, baseline);

        force_speed_up(&mut game);
        play_out(&mut game);
        game.play_again().unwrap();
        assert_eq!(game.session().difficulty, baseline);
    }

    #[test]
    fn test_falling_ends_game_once() {
        let mut game = running_game();
        let events = play_out(&mut game);
        let overs = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
        assert_eq!(
            game.mode(),
            GameMode::GameOver {
                qualification: Qualification::NotQualified
            }
        );

        let frozen = game.session().bird;
        for _ in 0..5 {
            assert!(game.tick(tick_of(&game)).is_err());
        }
        assert_eq!(game.session().bird, frozen);
        assert_eq!(game.score().current, 0);
    }

    #[test]
    fn test_new_best_reported() {
        let mut game = running_game();
        game.session.score.current = 3;
        game.session.bird.position = BirdState::floor_bound() - 1.0;
        let events = play_out(&mut game);
        assert!(events.contains(&GameEvent::NewBest(3)));
        assert!(events.contains(&GameEvent::GameOver {
            score: 3,
            needs_qualification: true
        }));
        assert_eq!(game.score().best_local, 3);
    }

    #[test]
    fn test_stale_tick_is_rejected() {
        let mut game = game_over_with(2);
        let old = tick_of(&game);
        game.play_again().unwrap();
        assert!(matches!(
            game.tick(old),
            Err(GameError::StaleSession { .. })
        ));
        assert!(game.countdown_step(old).is_err());
    }

    #[test]
    fn test_countdown_then_run() {
        let mut game = game_over_with(0);
        let events = game.play_again().unwrap();
        assert!(events.contains(&GameEvent::CountdownStep(CountdownStep::Three)));
        assert_eq!(game.score().current, 0);

        // jump and ticks are suppressed during the countdown
        assert!(game.jump().is_err());
        assert!(game.tick(tick_of(&game)).is_err());

        let mut labels = Vec::new();
        while let GameMode::Countdown { step } = game.mode() {
            labels.push(step.label());
            game.countdown_step(tick_of(&game)).unwrap();
        }
        assert_eq!(labels, ["3", "2", "1", "GO!"]);
        assert_eq!(game.mode(), GameMode::Running);
        assert!(game.tick(tick_of(&game)).is_ok());
    }

    #[test]
    fn test_cancel_countdown() {
        let mut game = game_over_with(0);
        game.play_again().unwrap();
        game.cancel_countdown().unwrap();
        assert_eq!(game.mode(), GameMode::Idle);
    }

    #[test]
    fn test_qualifying_flow() {
        let mut game = game_over_with(7);
        let id = game.session_id();
        game.resolve_qualification(id, Ok(vec![entry("a", 9, 0.0)]))
            .unwrap();
        assert_eq!(game.mode(), GameMode::ScoreSubmission { submitting: false });
        assert!(game.jump().is_err());

        let submission = game.submit_name("  Ada ").unwrap();
        assert_eq!(submission.name, "Ada");
        assert_eq!(submission.score, 7);

        let top = vec![entry("a", 9, 0.0), entry("Ada", 7, 1.0)];
        game.complete_submission(id, Ok(top.clone())).unwrap();
        assert_eq!(
            game.mode(),
            GameMode::LeaderboardView {
                origin: LeaderboardOrigin::AfterGame,
                filter: TimeFilter::All
            }
        );
        assert_eq!(game.leaderboard(), top.as_slice());

        game.close_leaderboard().unwrap();
        assert_eq!(game.mode(), GameMode::Idle);
        assert_eq!(game.score().current, 0);
        assert_eq!(game.score().best_local, 7);
        assert_eq!(game.session().bird, BirdState::default());
        assert_eq!(game.session().pipe.position, PIPE_SPAWN_X);
        assert_eq!(game.session().difficulty, DifficultyLevel::Normal.baseline());
    }

    #[test]
    fn test_empty_name_rejected_without_transition() {
        let mut game = game_over_with(7);
        let id = game.session_id();
        game.resolve_qualification(id, Ok(Vec::new())).unwrap();

        assert_eq!(game.submit_name("   "), Err(GameError::InvalidName));
        assert_eq!(game.submit_name(""), Err(GameError::InvalidName));
        assert_eq!(game.mode(), GameMode::ScoreSubmission { submitting: false });
    }

    #[test]
    fn test_failed_submission_allows_retry() {
        let mut game = game_over_with(7);
        let id = game.session_id();
        game.resolve_qualification(id, Ok(Vec::new())).unwrap();
        game.submit_name("Ada").unwrap();
        // second submit while in flight is refused
        assert!(game.submit_name("Ada").is_err());

        game.complete_submission(id, Err(StoreError::Http(500)))
            .unwrap();
        assert_eq!(game.mode(), GameMode::ScoreSubmission { submitting: false });
        assert!(game.submit_name("Ada").is_ok());
    }

    #[test]
    fn test_non_qualifying_and_unreachable() {
        let full: Vec<_> = (0..10).map(|i| entry("p", 50 + i, i as f64)).collect();

        let mut game = game_over_with(7);
        let id = game.session_id();
        game.resolve_qualification(id, Ok(full)).unwrap();
        assert_eq!(
            game.mode(),
            GameMode::GameOver {
                qualification: Qualification::NotQualified
            }
        );

        let mut game = game_over_with(7);
        let id = game.session_id();
        game.resolve_qualification(id, Err(StoreError::Unavailable("offline".into())))
            .unwrap();
        assert_eq!(
            game.mode(),
            GameMode::GameOver {
                qualification: Qualification::Unknown
            }
        );
        // still free to restart or go home
        game.back_to_home().unwrap();
        assert_eq!(game.mode(), GameMode::Idle);
    }

    #[test]
    fn test_late_qualification_ignored_after_restart() {
        let mut game = game_over_with(7);
        let id = game.session_id();
        game.jump().unwrap();
        assert!(game.resolve_qualification(id, Ok(Vec::new())).is_err());
        assert_eq!(game.mode(), GameMode::Running);
    }

    #[test]
    fn test_menu_leaderboard_and_filters() {
        let mut game = Game::new(1, DifficultyLevel::Normal, 0);
        game.open_leaderboard(TimeFilter::Weekly).unwrap();
        assert!(game.jump().is_err());

        game.deliver_leaderboard(TimeFilter::Daily, Ok(vec![entry("x", 1, 0.0)]));
        assert!(game.leaderboard().is_empty());
        game.deliver_leaderboard(TimeFilter::Weekly, Ok(vec![entry("y", 2, 0.0)]));
        assert_eq!(game.leaderboard().len(), 1);
        game.deliver_leaderboard(TimeFilter::Weekly, Err(StoreError::Http(503)));
        assert_eq!(game.leaderboard().len(), 1);

        game.set_leaderboard_filter(TimeFilter::Monthly).unwrap();
        game.play_again().unwrap();
        assert!(matches!(game.mode(), GameMode::Countdown { .. }));
    }

    #[test]
    fn test_settings_only_from_idle() {
        let mut game = running_game();
        assert!(game.open_settings().is_err());
        assert!(game.select_difficulty(DifficultyLevel::Hard).is_err());
        assert_eq!(game.session().difficulty.pipe_speed, 3.0);

        let mut game = Game::new(1, DifficultyLevel::Normal, 0);
        game.open_settings().unwrap();
        game.select_difficulty(DifficultyLevel::Hard).unwrap();
        game.close_settings().unwrap();
        game.jump().unwrap();
        assert_eq!(game.session().difficulty, DifficultyLevel::Hard.baseline());
        assert_eq!(game.session().pipe.gap_size, 170);
    }

    #[test]
    fn test_global_best_fail_soft() {
        let mut game = Game::new(1, DifficultyLevel::Normal, 0);
        game.deliver_global_best(Ok(40));
        game.deliver_global_best(Err(StoreError::Unavailable("offline".into())));
        assert_eq!(game.score().best_global, Some(40));
        game.jump().unwrap();
        assert_eq!(game.score().best_global, Some(40));
    }

    #[test]
    fn test_autopilot_survives_first_pipe() {
        let mut game = Game::new(9, DifficultyLevel::Easy, 0);
        game.set_autopilot(true);
        game.jump().unwrap();
        game.session.pipe.gap_top = 150.0;
        for _ in 0..200 {
            game.tick(tick_of(&game)).unwrap();
        }
        assert_eq!(game.mode(), GameMode::Running);
        assert!(game.score().current >= 1);
    }
}
