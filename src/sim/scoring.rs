//! Score keeping and difficulty escalation

use super::state::{DifficultySettings, ScoreState};
use crate::consts::{MAX_PIPE_SPEED, SPEED_INTERVAL};

/// Count a passed pipe. Returns the new pipe speed if it just increased.
///
/// Speed steps up once per SPEED_INTERVAL points and is capped at
/// MAX_PIPE_SPEED, so it never decreases mid-session.
pub fn on_pipe_passed(score: &mut ScoreState, difficulty: &mut DifficultySettings) -> Option<f32> {
    score.current += 1;
    if score.current % SPEED_INTERVAL != 0 {
        return None;
    }

    let next = (difficulty.pipe_speed + difficulty.speed_increment).min(MAX_PIPE_SPEED);
    if next > difficulty.pipe_speed {
        difficulty.pipe_speed = next;
        Some(next)
    } else {
        None
    }
}

/// Fold the final score into the local best. Returns true on a new best.
pub fn on_session_end(score: &mut ScoreState) -> bool {
    if score.current > score.best_local {
        score.best_local = score.current;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DifficultyLevel;
    use proptest::prelude::*;

    #[test]
    fn test_speed_up_on_fifth_point_only() {
        let mut score = ScoreState::default();
        let mut difficulty = DifficultyLevel::Normal.baseline();

        for _ in 0..4 {
            assert_eq!(on_pipe_passed(&mut score, &mut difficulty), None);
        }
        assert_eq!(on_pipe_passed(&mut score, &mut difficulty), Some(3.5));
        assert_eq!(score.current, 5);

        for _ in 0..4 {
            assert_eq!(on_pipe_passed(&mut score, &mut difficulty), None);
            assert_eq!(difficulty.pipe_speed, 3.5);
        }
        assert_eq!(on_pipe_passed(&mut score, &mut difficulty), Some(4.0));
    }

    #[test]
    fn test_speed_is_capped() {
        let mut score = ScoreState::default();
        let mut difficulty = DifficultySettings {
            pipe_speed: MAX_PIPE_SPEED - 0.1,
            pipe_gap: 200,
            speed_increment: 0.5,
        };
        score.current = SPEED_INTERVAL - 1;
        assert_eq!(on_pipe_passed(&mut score, &mut difficulty), Some(MAX_PIPE_SPEED));
        score.current = 2 * SPEED_INTERVAL - 1;
        assert_eq!(on_pipe_passed(&mut score, &mut difficulty), None);
        assert_eq!(difficulty.pipe_speed, MAX_PIPE_SPEED);
    }

    #[test]
    fn test_session_end_updates_best() {
        let mut score = ScoreState {
            current: 8,
            best_local: 5,
            best_global: None,
        };
        assert!(on_session_end(&mut score));
        assert_eq!(score.best_local, 8);
        assert!(!on_session_end(&mut score));

        score.current = 3;
        assert!(!on_session_end(&mut score));
        assert_eq!(score.best_local, 8);
    }

    proptest! {
        #[test]
        fn prop_score_and_speed_monotonic(passes in 0usize..200) {
            let mut score = ScoreState::default();
            let mut difficulty = DifficultyLevel::Hard.baseline();
            let mut last_speed = difficulty.pipe_speed;
            for i in 0..passes {
                on_pipe_passed(&mut score, &mut difficulty);
                prop_assert_eq!(score.current as usize, i + 1);
                prop_assert!(difficulty.pipe_speed >= last_speed);
                last_speed = difficulty.pipe_speed;
            }
        }
    }
}
