//! Per-tick motion: bird gravity and flaps, pipe scrolling and recycling

use rand::Rng;

use super::state::{BirdState, DifficultySettings, PipePair};
use crate::consts::*;

/// What one physics step observed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Bird reached the floor (terminal)
    pub hit_floor: bool,
    /// Pipe crossed the bird's left edge since the previous tick
    pub passed: bool,
    /// Pipe left the screen and respawned
    pub recycled: bool,
}

/// Instant upward impulse plus a short cosmetic tilt
pub fn flap(bird: &mut BirdState) {
    bird.velocity = -JUMP_IMPULSE;
    bird.rotation = JUMP_TILT;
    bird.tilt_ticks = JUMP_TILT_TICKS;
}

/// Apply gravity. Returns true when the bird hit the floor.
///
/// The new velocity is applied in the same tick, so a bird at rest moves by
/// GRAVITY on its first tick. The ceiling clamps; the floor is terminal.
pub fn advance_bird(bird: &mut BirdState) -> bool {
    bird.velocity = (bird.velocity + GRAVITY).min(MAX_FALL_VELOCITY);

    if bird.tilt_ticks > 0 {
        bird.tilt_ticks -= 1;
        if bird.tilt_ticks == 0 {
            bird.rotation = 0.0;
        }
    }

    let next = bird.position + bird.velocity;
    let floor = BirdState::floor_bound();
    if next >= floor {
        bird.position = floor;
        true
    } else {
        bird.position = next.max(0.0);
        false
    }
}

/// Uniform top-pipe height in [MIN_PIPE_HEIGHT, MAX_PIPE_HEIGHT]
pub fn roll_gap_top(rng: &mut impl Rng) -> f32 {
    rng.random_range(MIN_PIPE_HEIGHT..=MAX_PIPE_HEIGHT)
}

/// Scroll the pipe left. Returns (passed, recycled).
///
/// The pass check compares this tick's position with the one recorded on the
/// previous tick, so it fires exactly once per crossing at any speed below
/// MAX_PIPE_SPEED.
pub fn advance_pipe(pipe: &mut PipePair, speed: f32, rng: &mut impl Rng) -> (bool, bool) {
    let passed = pipe.position < BIRD_LEFT && pipe.last_position >= BIRD_LEFT;

    pipe.last_position = pipe.position;
    pipe.position -= speed;

    let recycled = pipe.position <= -PIPE_WIDTH;
    if recycled {
        pipe.position = PIPE_SPAWN_X;
        pipe.last_position = PIPE_SPAWN_X;
        pipe.gap_top = roll_gap_top(rng);
    }

    (passed, recycled)
}

/// One physics step for bird and pipe
pub fn advance(
    bird: &mut BirdState,
    pipe: &mut PipePair,
    difficulty: &DifficultySettings,
    rng: &mut impl Rng,
) -> StepOutcome {
    let hit_floor = advance_bird(bird);
    let (passed, recycled) = advance_pipe(pipe, difficulty.pipe_speed, rng);
    StepOutcome {
        hit_floor,
        passed,
        recycled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn normal() -> DifficultySettings {
        crate::DifficultyLevel::Normal.baseline()
    }

    #[test]
    fn test_first_tick_from_rest() {
        let mut bird = BirdState::default();
        assert!(!advance_bird(&mut bird));
        assert!((bird.velocity - 0.4).abs() < 1e-6);
        assert!((bird.position - 250.4).abs() < 1e-4);
    }

    #[test]
    fn test_flap_overrides_velocity() {
        let mut bird = BirdState {
            velocity: 9.2,
            ..Default::default()
        };
        flap(&mut bird);
        assert_eq!(bird.velocity, -8.0);
        advance_bird(&mut bird);
        assert!((bird.velocity - -7.6).abs() < 1e-6);
    }

    #[test]
    fn test_tilt_reverts_after_delay() {
        let mut bird = BirdState::default();
        flap(&mut bird);
        assert_eq!(bird.rotation, JUMP_TILT);
        for _ in 0..JUMP_TILT_TICKS - 1 {
            advance_bird(&mut bird);
        }
        assert_eq!(bird.rotation, JUMP_TILT);
        advance_bird(&mut bird);
        assert_eq!(bird.rotation, 0.0);
    }

    #[test]
    fn test_floor_is_terminal() {
        let mut bird = BirdState {
            position: BirdState::floor_bound() - 1.0,
            velocity: 5.0,
            ..Default::default()
        };
        assert!(advance_bird(&mut bird));
        assert_eq!(bird.position, BirdState::floor_bound());
    }

    #[test]
    fn test_ceiling_clamps() {
        let mut bird = BirdState {
            position: 3.0,
            velocity: -8.0,
            ..Default::default()
        };
        assert!(!advance_bird(&mut bird));
        assert_eq!(bird.position, 0.0);
    }

    #[test]
    fn test_pass_fires_once() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pipe = PipePair {
            position: 10.0,
            last_position: 50.0,
            ..PipePair::new(200)
        };
        let (passed, _) = advance_pipe(&mut pipe, 3.0, &mut rng);
        assert!(passed);
        assert_eq!(pipe.position, 7.0);

        let (passed, _) = advance_pipe(&mut pipe, 3.0, &mut rng);
        assert!(!passed);
        assert_eq!(pipe.position, 4.0);
    }

    #[test]
    fn test_full_crossing_scores_once() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut pipe = PipePair::new(200);
        let mut passes = 0;
        let mut recycles = 0;
        while recycles == 0 {
            let (passed, recycled) = advance_pipe(&mut pipe, 3.0, &mut rng);
            passes += passed as u32;
            recycles += recycled as u32;
        }
        assert_eq!(passes, 1);
    }

    #[test]
    fn test_recycle_respawns() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut pipe = PipePair {
            position: -PIPE_WIDTH + 1.0,
            last_position: -PIPE_WIDTH + 4.0,
            ..PipePair::new(200)
        };
        let (_, recycled) = advance_pipe(&mut pipe, 3.0, &mut rng);
        assert!(recycled);
        assert_eq!(pipe.position, PIPE_SPAWN_X);
        assert!((MIN_PIPE_HEIGHT..=MAX_PIPE_HEIGHT).contains(&pipe.gap_top));
    }

    proptest! {
        #[test]
        fn prop_bird_stays_in_bounds(flaps in proptest::collection::vec(any::<bool>(), 1..400)) {
            let mut bird = BirdState::default();
            for do_flap in flaps {
                if do_flap {
                    flap(&mut bird);
                }
                let hit_floor = advance_bird(&mut bird);
                prop_assert!(bird.velocity <= MAX_FALL_VELOCITY);
                prop_assert!(bird.position >= 0.0);
                prop_assert!(bird.position <= BirdState::floor_bound());
                if hit_floor {
                    break;
                }
            }
        }

        #[test]
        fn prop_recycled_pipe_respawns_in_range(seed in any::<u64>(), speed in 0.5f32..MAX_PIPE_SPEED) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut pipe = PipePair::new(normal().pipe_gap);
            for _ in 0..2000 {
                let (_, recycled) = advance_pipe(&mut pipe, speed, &mut rng);
                if recycled {
                    prop_assert_eq!(pipe.position, PIPE_SPAWN_X);
                    prop_assert!(pipe.gap_top >= MIN_PIPE_HEIGHT && pipe.gap_top <= MAX_PIPE_HEIGHT);
                }
                prop_assert!(pipe.position > -PIPE_WIDTH);
            }
        }
    }
}
