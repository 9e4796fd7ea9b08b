//! Decorative background clouds
//!
//! Purely cosmetic. Advanced from the same tick as the physics but with its
//! own RNG stream, so toggling clouds never changes pipe heights.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::{CLOUD_SPEED, CLOUD_WIDTH, PLAYFIELD_WIDTH};

/// RNG stream reserved for clouds
const CLOUD_STREAM: u64 = 0xc10d;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cloud {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Cloud {
    pub fn width(&self) -> f32 {
        CLOUD_WIDTH * self.scale
    }
}

#[derive(Debug, Clone)]
pub struct CloudLayer {
    pub clouds: Vec<Cloud>,
    rng: Pcg32,
}

impl CloudLayer {
    pub fn new(seed: u64) -> Self {
        let layout = [
            (400.0, 50.0, 0.8),
            (700.0, 100.0, 1.0),
            (1000.0, 150.0, 0.9),
            (1300.0, 80.0, 1.1),
            (1600.0, 120.0, 0.7),
            (1900.0, 60.0, 0.9),
            (2200.0, 130.0, 0.8),
            (2500.0, 90.0, 1.0),
        ];
        let clouds = layout
            .iter()
            .enumerate()
            .map(|(i, &(x, y, scale))| Cloud {
                id: i as u32 + 1,
                x,
                y,
                scale,
            })
            .collect();
        Self {
            clouds,
            rng: Pcg32::new(seed, CLOUD_STREAM),
        }
    }

    /// Drift left; clouds fully off screen re-enter just past the right edge
    pub fn advance(&mut self) {
        for cloud in &mut self.clouds {
            if cloud.x <= -cloud.width() {
                cloud.x = PLAYFIELD_WIDTH + self.rng.random_range(0.0..200.0);
            } else {
                cloud.x -= CLOUD_SPEED;
            }
        }
    }
}
