//! Tetrowall - a scrolling tetromino wall shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, shapes, projectiles, game state)
//! - `settings`: Data-driven game configuration

pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

use glam::{IVec2, Vec2};

/// Game configuration constants
pub mod consts {
    use glam::IVec2;

    /// Default grid dimensions (cells)
    pub const GRID_WIDTH: i32 = 24;
    pub const GRID_HEIGHT: i32 = 12;

    /// Seconds between wall scrolls
    pub const SCROLL_INTERVAL: f32 = 2.5;

    /// Projectile speed in cells per second
    pub const PROJECTILE_SPEED: f32 = 12.0;

    /// Player spawn (bottom-left of the shape's bounding box)
    pub const PLAYER_START: IVec2 = IVec2::new(1, 4);

    /// Chance for each cell of a freshly generated wall column to be filled
    pub const WALL_FILL_CHANCE: f32 = 0.35;

    /// Default RNG seed for the wall generator
    pub const DEFAULT_SEED: u64 = 0x7e7_4a11;

    /// Projectile ring buffer holds this many projectiles per grid cell
    pub const PROJECTILES_PER_CELL: usize = 2;

    /// Slack used when comparing accumulated float timers
    pub const TIME_EPSILON: f32 = 1e-4;
}

/// Rotate a point 90 degrees inside a `size` bounding box (y axis up).
///
/// The box is re-anchored so the rotated box again starts at the origin:
/// clockwise maps `(x, y)` to `(y, w - 1 - x)`, counterclockwise maps it to
/// `(h - 1 - y, x)`. Works for points outside the box too (muzzle offsets).
#[inline]
pub fn rotate_in_box(point: IVec2, size: IVec2, clockwise: bool) -> IVec2 {
    if clockwise {
        IVec2::new(point.y, size.x - 1 - point.x)
    } else {
        IVec2::new(size.y - 1 - point.y, point.x)
    }
}

/// Rotate a direction vector 90 degrees (y axis up)
#[inline]
pub fn rotate_vector(v: IVec2, clockwise: bool) -> IVec2 {
    if clockwise {
        IVec2::new(v.y, -v.x)
    } else {
        IVec2::new(-v.y, v.x)
    }
}

/// Grid cell nearest to a continuous position (cell centers sit on integers)
#[inline]
pub fn cell_of(pos: Vec2) -> IVec2 {
    (pos + Vec2::splat(0.5)).floor().as_ivec2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_in_box_round_trips_both_ways() {
        let size = IVec2::new(2, 3);
        let p = IVec2::new(1, 2);
        let cw = rotate_in_box(p, size, true);
        // Rotated box is 3x2
        let back = rotate_in_box(cw, IVec2::new(size.y, size.x), false);
        assert_eq!(back, p);
    }

    #[test]
    fn rotate_vector_cycles_through_four_directions() {
        let mut v = IVec2::X;
        let mut seen = Vec::new();
        for _ in 0..4 {
            v = rotate_vector(v, true);
            seen.push(v);
        }
        assert_eq!(seen, vec![IVec2::NEG_Y, IVec2::NEG_X, IVec2::Y, IVec2::X]);
    }

    #[test]
    fn cell_of_rounds_to_nearest_center() {
        assert_eq!(cell_of(Vec2::new(3.0, 4.0)), IVec2::new(3, 4));
        assert_eq!(cell_of(Vec2::new(3.4, 4.0)), IVec2::new(3, 4));
        assert_eq!(cell_of(Vec2::new(3.6, 4.0)), IVec2::new(4, 4));
        assert_eq!(cell_of(Vec2::new(-0.6, 0.0)), IVec2::new(-1, 0));
    }
}
