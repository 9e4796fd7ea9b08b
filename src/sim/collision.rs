//! Collision detection between the bird and the playfield/pipes
//!
//! Everything is axis-aligned: the bird is a box at a fixed x, the pipe pair
//! is a full-height column with a safe opening. Pipe hitboxes are trimmed by
//! COLLISION_BUFFER so grazing contact is forgiven.

use glam::Vec2;

use super::state::{BirdState, PipePair};
use crate::consts::*;

/// Axis-aligned box, y grows downward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + w, y + h),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Strict overlap on the x axis (touching edges do not count)
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.max.x > other.min.x && self.min.x < other.max.x
    }

    /// Vertical span lies within `other`'s (edges inclusive)
    pub fn within_y(&self, other: &Aabb) -> bool {
        self.min.y >= other.min.y && self.max.y <= other.max.y
    }

    /// Move both x edges inward by `amount`
    pub fn shrink_x(&self, amount: f32) -> Self {
        Self {
            min: Vec2::new(self.min.x + amount, self.min.y),
            max: Vec2::new(self.max.x - amount, self.max.y),
        }
    }

    /// Move both y edges outward by `amount`
    pub fn grow_y(&self, amount: f32) -> Self {
        Self {
            min: Vec2::new(self.min.x, self.min.y - amount),
            max: Vec2::new(self.max.x, self.max.y + amount),
        }
    }
}

/// What the bird ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Ceiling,
    Floor,
    Pipe,
}

pub fn bird_box(bird: &BirdState) -> Aabb {
    Aabb::from_xywh(BIRD_LEFT, bird.position, BIRD_WIDTH, BIRD_HEIGHT)
}

/// Full-height column the pipe pair occupies
pub fn pipe_column(pipe: &PipePair) -> Aabb {
    Aabb::from_xywh(pipe.position, 0.0, PIPE_WIDTH, PLAYFIELD_HEIGHT)
}

/// Safe opening between the two pipes
pub fn gap_zone(pipe: &PipePair) -> Aabb {
    Aabb::from_xywh(pipe.position, pipe.gap_top, PIPE_WIDTH, pipe.gap_size as f32)
}

/// Classify the bird's contact, if any
pub fn detect(bird: &BirdState, pipe: &PipePair) -> Option<Collision> {
    let bird = bird_box(bird);

    if bird.min.y <= 0.0 {
        return Some(Collision::Ceiling);
    }
    if bird.max.y >= PLAYFIELD_HEIGHT {
        return Some(Collision::Floor);
    }

    let column = pipe_column(pipe).shrink_x(COLLISION_BUFFER);
    let safe = gap_zone(pipe).grow_y(COLLISION_BUFFER);
    if bird.overlaps_x(&column) && !bird.within_y(&safe) {
        return Some(Collision::Pipe);
    }

    None
}

/// Pure predicate; has no side effects and may be called any number of times
pub fn check_collision(bird: &BirdState, pipe: &PipePair) -> bool {
    detect(bird, pipe).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bird_at(position: f32) -> BirdState {
        BirdState {
            position,
            ..Default::default()
        }
    }

    fn pipe_at(position: f32, gap_top: f32) -> PipePair {
        PipePair {
            position,
            last_position: position,
            gap_top,
            gap_size: 200,
        }
    }

    #[test]
    fn test_clear_when_pipe_far_away() {
        assert_eq!(detect(&bird_at(250.0), &pipe_at(400.0, 50.0)), None);
    }

    #[test]
    fn test_ceiling_and_floor() {
        assert_eq!(detect(&bird_at(0.0), &pipe_at(400.0, 200.0)), Some(Collision::Ceiling));
        assert_eq!(
            detect(&bird_at(BirdState::floor_bound()), &pipe_at(400.0, 200.0)),
            Some(Collision::Floor)
        );
    }

    #[test]
    fn test_inside_gap_is_safe() {
        // gap 150..350, bird 200..256
        assert!(!check_collision(&bird_at(200.0), &pipe_at(60.0, 150.0)));
    }

    #[test]
    fn test_hits_top_pipe() {
        // bird top 100 is above gap top 150 minus buffer
        assert_eq!(detect(&bird_at(100.0), &pipe_at(60.0, 150.0)), Some(Collision::Pipe));
    }

    #[test]
    fn test_hits_bottom_pipe() {
        // bird bottom 360 is below gap bottom 350 plus buffer
        assert_eq!(detect(&bird_at(304.0), &pipe_at(60.0, 150.0)), Some(Collision::Pipe));
    }

    #[test]
    fn test_buffer_forgives_grazes() {
        // 4 px above the gap top is within the 5 px buffer
        assert!(!check_collision(&bird_at(146.0), &pipe_at(60.0, 150.0)));
        // pipe left edge 126: bird right 130 only overlaps by 4 px
        assert!(!check_collision(&bird_at(100.0), &pipe_at(126.0, 150.0)));
        // pipe right edge 54: only 4 px past bird left
        assert!(!check_collision(&bird_at(100.0), &pipe_at(-6.0, 150.0)));
    }

    #[test]
    fn test_repeated_checks_agree() {
        let bird = bird_at(100.0);
        let pipe = pipe_at(60.0, 150.0);
        let first = check_collision(&bird, &pipe);
        for _ in 0..10 {
            assert_eq!(check_collision(&bird, &pipe), first);
        }
    }

    #[test]
    fn test_aabb_helpers() {
        let b = Aabb::from_xywh(10.0, 20.0, 30.0, 40.0);
        assert_eq!(b.width(), 30.0);
        assert_eq!(b.height(), 40.0);
        let s = b.shrink_x(5.0);
        assert_eq!(s.width(), 20.0);
        assert_eq!(b.grow_y(5.0).height(), 50.0);
    }
}
