//! Projectile motion and discretized collision
//!
//! Projectiles move continuously but collide on grid cells. The engine never
//! advances a projectile by more than one cell per call, so the cell it ends
//! up in is either the cell it started in or the next one along its
//! direction. That is what makes the checks below sufficient.

use glam::{IVec2, Vec2};

use super::grid::ColorGrid;
use super::shape::PlayerShape;
use super::state::{Projectile, lateral_offsets};
use crate::cell_of;
use crate::consts::TIME_EPSILON;

/// What happened to a projectile during one sub-step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    /// Still flying; new position
    Moved(Vec2),
    /// Was already outside the grid; deactivate
    Left,
    /// Comes to rest in this cell
    Frozen(IVec2),
    /// Pushed back into the player's shape: fatal
    Crushed,
    /// Pushed back out of the grid without finding room; deactivate
    Lost,
}

/// Read-only view of everything a projectile can collide with
#[derive(Debug, Clone, Copy)]
pub struct Motion<'a> {
    pub grid: &'a ColorGrid,
    pub shape: &'a PlayerShape,
    /// Current simulation time
    pub time: f32,
    /// Cells per second
    pub speed: f32,
    /// Occupied cells beside the path stop projectiles
    pub lateral_cells_stop: bool,
    /// Top and bottom grid edges stop projectiles
    pub vertical_bounds_stop: bool,
}

impl Motion<'_> {
    /// Seconds a projectile needs to cross one cell
    #[inline]
    pub fn cell_time(&self) -> f32 {
        1.0 / self.speed
    }

    /// Move `projectile` forward by `step` seconds (at most one cell)
    pub fn advance(&self, projectile: &Projectile, step: f32) -> Advance {
        let direction = projectile.direction;
        let from_cell = cell_of(projectile.position);
        if self.grid.is_out_of_bounds(from_cell) {
            return Advance::Left;
        }
        // The wall scrolled onto the projectile
        if self.grid.get(from_cell).is_some() {
            return self.push_back(from_cell, direction);
        }

        let to = projectile.position + direction.as_vec2() * (self.speed * step);
        let to_cell = cell_of(to);

        if self.grid.is_out_of_bounds(to_cell) {
            if self.vertical_bounds_stop && self.is_vertical_exit(to_cell) {
                return Advance::Frozen(from_cell);
            }
            // Reported once more so observers can see it leave
            return Advance::Moved(to);
        }

        if self.grid.get(to_cell).is_some() {
            return self.push_back(to_cell, direction);
        }
        if self.shape.contains(to_cell) {
            return Advance::Frozen(to_cell);
        }

        if to_cell != from_cell && self.stops_at(to_cell, direction) {
            return Advance::Frozen(to_cell);
        }

        Advance::Moved(to)
    }

    fn is_vertical_exit(&self, cell: IVec2) -> bool {
        cell.y < 0 || cell.y >= self.grid.height()
    }

    /// Does a projectile that just entered `cell` stop there?
    fn stops_at(&self, cell: IVec2, direction: IVec2) -> bool {
        let front = cell + direction;
        if self.grid.is_out_of_bounds(front) {
            if self.vertical_bounds_stop && self.is_vertical_exit(front) {
                return true;
            }
        } else if self.is_settled(front) {
            return true;
        }

        self.lateral_cells_stop
            && lateral_offsets(direction).into_iter().any(|side| {
                let n = cell + side;
                !self.grid.is_out_of_bounds(n) && self.is_settled(n)
            })
    }

    /// Occupied for at least one cell-crossing time.
    ///
    /// A wall cell that scrolled in this very instant does not stop anything.
    fn is_settled(&self, cell: IVec2) -> bool {
        match self.grid.spawn_time(cell) {
            Some(spawned) => self.time - spawned + TIME_EPSILON >= self.cell_time(),
            None => false,
        }
    }

    /// The destination is occupied: walk backwards to the first free cell
    fn push_back(&self, occupied: IVec2, direction: IVec2) -> Advance {
        let mut cell = occupied - direction;
        loop {
            if self.grid.is_out_of_bounds(cell) {
                return Advance::Lost;
            }
            if self.shape.contains(cell) {
                return Advance::Crushed;
            }
            if self.grid.get(cell).is_none() {
                return Advance::Frozen(cell);
            }
            cell -= direction;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Color;

    struct World {
        grid: ColorGrid,
        shape: PlayerShape,
    }

    impl World {
        fn new() -> Self {
            Self {
                grid: ColorGrid::new(IVec2::new(8, 8)),
                shape: PlayerShape::standard(Color::Purple, IVec2::new(1, 3)),
            }
        }

        fn motion(&self, time: f32) -> Motion<'_> {
            Motion {
                grid: &self.grid,
                shape: &self.shape,
                time,
                speed: 1.0,
                lateral_cells_stop: true,
                vertical_bounds_stop: true,
            }
        }
    }

    fn shot(x: f32, y: f32, direction: IVec2) -> Projectile {
        Projectile::new(Vec2::new(x, y), direction)
    }

    #[test]
    fn free_flight_moves_one_cell() {
        let world = World::new();
        let advance = world.motion(1.0).advance(&shot(3.0, 4.0, IVec2::X), 1.0);
        assert_eq!(advance, Advance::Moved(Vec2::new(4.0, 4.0)));
    }

    #[test]
    fn leaving_the_grid_is_reported_then_deactivated() {
        let world = World::new();
        let motion = world.motion(1.0);
        assert_eq!(
            motion.advance(&shot(7.0, 4.0, IVec2::X), 1.0),
            Advance::Moved(Vec2::new(8.0, 4.0))
        );
        assert_eq!(motion.advance(&shot(8.0, 4.0, IVec2::X), 1.0), Advance::Left);
    }

    #[test]
    fn settled_front_cell_stops_on_entry() {
        let mut world = World::new();
        world.grid.set(IVec2::new(6, 4), Some(Color::Red), 0.0);
        let advance = world.motion(5.0).advance(&shot(4.0, 4.0, IVec2::X), 1.0);
        assert_eq!(advance, Advance::Frozen(IVec2::new(5, 4)));
    }

    #[test]
    fn fresh_wall_cell_does_not_stop() {
        let mut world = World::new();
        world.grid.set(IVec2::new(6, 4), Some(Color::Red), 5.0);
        let motion = world.motion(5.0);
        assert_eq!(
            motion.advance(&shot(4.0, 4.0, IVec2::X), 1.0),
            Advance::Moved(Vec2::new(5.0, 4.0))
        );
        // Next step runs into it and gets pushed back to the free cell
        assert_eq!(
            motion.advance(&shot(5.0, 4.0, IVec2::X), 1.0),
            Advance::Frozen(IVec2::new(5, 4))
        );
    }

    #[test]
    fn lateral_neighbors_stop_only_when_enabled() {
        let mut world = World::new();
        world.grid.set(IVec2::new(5, 5), Some(Color::Red), 0.0);
        let projectile = shot(4.0, 4.0, IVec2::X);

        let motion = world.motion(3.0);
        assert_eq!(
            motion.advance(&projectile, 1.0),
            Advance::Frozen(IVec2::new(5, 4))
        );

        let motion = Motion {
            lateral_cells_stop: false,
            ..world.motion(3.0)
        };
        assert_eq!(
            motion.advance(&projectile, 1.0),
            Advance::Moved(Vec2::new(5.0, 4.0))
        );
    }

    #[test]
    fn push_back_into_shape_is_fatal() {
        let mut world = World::new();
        // Wall lands on the projectile right in front of the nose
        world.grid.set(IVec2::new(4, 4), Some(Color::Red), 0.0);
        world.grid.set(IVec2::new(3, 4), Some(Color::Red), 0.0);
        let advance = world.motion(3.0).advance(&shot(3.0, 4.0, IVec2::X), 0.5);
        assert_eq!(advance, Advance::Crushed);
    }

    #[test]
    fn wall_scrolled_onto_projectile_pushes_it_back() {
        let mut world = World::new();
        // Free destination, but the current cell is now wall
        world.grid.set(IVec2::new(6, 4), Some(Color::Red), 0.0);
        let advance = world.motion(3.0).advance(&shot(6.0, 4.0, IVec2::X), 1.0);
        assert_eq!(advance, Advance::Frozen(IVec2::new(5, 4)));

        world.grid.set(IVec2::new(3, 4), Some(Color::Red), 0.0);
        let advance = world.motion(3.0).advance(&shot(3.0, 4.0, IVec2::X), 0.5);
        assert_eq!(advance, Advance::Crushed);
    }

    #[test]
    fn sub_cell_steps_stay_in_the_same_cell() {
        let world = World::new();
        let advance = world.motion(0.0).advance(&shot(4.0, 4.0, IVec2::NEG_X), 0.25);
        assert_eq!(advance, Advance::Moved(Vec2::new(3.75, 4.0)));
    }

    #[test]
    fn vertical_edge_stops_when_enabled() {
        let world = World::new();
        let up = shot(5.0, 6.0, IVec2::Y);
        assert_eq!(
            world.motion(0.0).advance(&up, 1.0),
            Advance::Frozen(IVec2::new(5, 7))
        );

        let motion = Motion {
            vertical_bounds_stop: false,
            ..world.motion(0.0)
        };
        assert_eq!(motion.advance(&up, 1.0), Advance::Moved(Vec2::new(5.0, 7.0)));
        assert_eq!(
            motion.advance(&shot(5.0, 7.0, IVec2::Y), 1.0),
            Advance::Moved(Vec2::new(5.0, 8.0))
        );
    }
}
