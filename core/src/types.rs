use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Single signed coordinate axis used for grid positions and probes.
pub type Coord = i32;

/// Two-dimensional grid coordinates `(x, y)`.
pub type Point = (Coord, Coord);

/// Valid transitions:
/// - Ready -> Running
/// - Ready -> Won
/// - Ready -> Lost
/// - Running -> Won
/// - Running -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Session allocated, no move made yet
    Ready,
    /// Game in progress
    Running,
    /// Game ended and the player won
    Won,
    /// Game ended and the player lost
    Lost,
}

impl GamePhase {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Indicates the game has ended and input is no longer accepted
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GamePhase {
    fn default() -> Self {
        Self::Ready
    }
}

/// Axis-aligned rectangle with a top-left anchor, in screen units.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Exact rectangle overlap, exclusive at the edges.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.pos.x < other.pos.x + other.size.x
            && self.pos.x + self.size.x > other.pos.x
            && self.pos.y < other.pos.y + other.size.y
            && self.pos.y + self.size.y > other.pos.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_exclusive_at_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 10.0, 10.0);
        let crossing = Rect::new(9.0, 9.0, 10.0, 10.0);
        let apart = Rect::new(30.0, 30.0, 5.0, 5.0);

        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&crossing));
        assert!(crossing.overlaps(&a));
        assert!(!a.overlaps(&apart));
    }

    #[test]
    fn phase_predicates() {
        assert!(GamePhase::Ready.is_ready());
        assert!(!GamePhase::Running.is_final());
        assert!(GamePhase::Won.is_final());
        assert!(GamePhase::Lost.is_final());
    }
}
