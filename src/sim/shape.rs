//! The player's shape: a fragment placed on the grid with a facing
//!
//! Shapes are values. Moving or rotating produces a new shape; the four
//! rotated forms are built once and shared between all derived values.

use std::rc::Rc;

use glam::IVec2;

use super::fragment::Fragment;
use super::state::{Color, Direction};
use crate::rotate_in_box;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerShape {
    /// Bottom-left of the active form's bounding box
    position: IVec2,
    direction: Direction,
    /// Rotation center, relative to `position`
    pivot: IVec2,
    /// Projectile spawn offset, relative to `position`
    muzzle: IVec2,
    color: Color,
    /// Forms indexed by [`Direction::index`]
    forms: Rc<[Fragment; 4]>,
}

impl PlayerShape {
    /// Build a shape from its right-facing form
    pub fn new(base: Fragment, pivot: IVec2, muzzle: IVec2, color: Color, position: IVec2) -> Self {
        assert!(!base.is_empty(), "player shape needs at least one cell");
        let down = base.rotated(true);
        let left = down.rotated(true);
        let up = left.rotated(true);
        Self {
            position,
            direction: Direction::Right,
            pivot,
            muzzle,
            color,
            forms: Rc::new([base, down, left, up]),
        }
    }

    /// The default T-shaped ship, nose pointing right
    pub fn standard(color: Color, position: IVec2) -> Self {
        let (base, _) = Fragment::from_matrix(&[[true, false], [true, true], [true, false]]);
        Self::new(base, IVec2::new(0, 1), IVec2::new(2, 1), color, position)
    }

    #[inline]
    pub fn position(&self) -> IVec2 {
        self.position
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn pivot(&self) -> IVec2 {
        self.pivot
    }

    #[inline]
    pub fn muzzle(&self) -> IVec2 {
        self.muzzle
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Active form
    pub fn fragment(&self) -> &Fragment {
        &self.forms[self.direction.index()]
    }

    /// Absolute cell where projectiles spawn
    pub fn muzzle_position(&self) -> IVec2 {
        self.position + self.muzzle
    }

    /// Same shape, moved
    pub fn with_position(&self, position: IVec2) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }

    /// Quarter turn about the pivot.
    ///
    /// Pivot and muzzle rotate inside the old bounding box; the position is
    /// then chosen so the pivot keeps its absolute location.
    pub fn rotate(&self, clockwise: bool) -> Self {
        let old_size = self.fragment().size();
        let pivot = rotate_in_box(self.pivot, old_size, clockwise);
        let muzzle = rotate_in_box(self.muzzle, old_size, clockwise);
        Self {
            position: self.position + self.pivot - pivot,
            direction: self.direction.turned(clockwise),
            pivot,
            muzzle,
            color: self.color,
            forms: Rc::clone(&self.forms),
        }
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        self.fragment().contains(cell, self.position)
    }

    /// Absolute occupied cells
    pub fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.fragment().cells_at(self.position)
    }

    /// Absolute occupied cells in grid column `x`
    pub fn vertical_slice(&self, x: i32) -> impl Iterator<Item = IVec2> + '_ {
        self.fragment().vertical_slice(x, self.position)
    }
}
