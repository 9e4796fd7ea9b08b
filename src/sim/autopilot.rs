//! Demo-mode pilot: flaps to keep the bird in the lower half of the gap

use super::state::{BirdState, PipePair};

/// Clearance kept above the bottom pipe (px)
const FLOOR_MARGIN: f32 = 24.0;

/// True when the bird should flap this tick
pub fn should_flap(bird: &BirdState, pipe: &PipePair) -> bool {
    let falling = bird.velocity >= 0.0;
    falling && bird.bottom() >= pipe.gap_bottom() - FLOOR_MARGIN
}
