//! Game state and core simulation types
//!
//! Everything the engine mutates during a step lives in [`GameState`].
//! Observers get read-only access through the engine.

use std::fmt;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::grid::ColorGrid;
use super::shape::PlayerShape;
use crate::rotate_vector;

/// Cell colors. Declaration order breaks ties in color assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    Red,
    Orange,
    Yellow,
    Green,
    PaleBlue,
    Blue,
    Purple,
}

impl Color {
    pub const ALL: [Color; 7] = [
        Color::Red,
        Color::Orange,
        Color::Yellow,
        Color::Green,
        Color::PaleBlue,
        Color::Blue,
        Color::Purple,
    ];

    /// Position in declaration order
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "Red",
            Color::Orange => "Orange",
            Color::Yellow => "Yellow",
            Color::Green => "Green",
            Color::PaleBlue => "PaleBlue",
            Color::Blue => "Blue",
            Color::Purple => "Purple",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A colored grid position in transit between components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub position: IVec2,
    pub color: Color,
}

impl Cell {
    pub fn new(position: IVec2, color: Color) -> Self {
        Self { position, color }
    }
}

/// Facing of the player shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// Clockwise order starting from `Right`
    pub const CLOCKWISE: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    /// Unit vector (y axis up)
    pub fn vector(self) -> IVec2 {
        match self {
            Direction::Right => IVec2::X,
            Direction::Down => IVec2::NEG_Y,
            Direction::Left => IVec2::NEG_X,
            Direction::Up => IVec2::Y,
        }
    }

    /// Index into [`Direction::CLOCKWISE`]
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Direction after a quarter turn
    pub fn turned(self, clockwise: bool) -> Self {
        let step = if clockwise { 1 } else { 3 };
        Self::CLOCKWISE[(self.index() + step) % 4]
    }

    /// Inverse of [`Direction::vector`]
    pub fn from_vector(v: IVec2) -> Option<Self> {
        Self::CLOCKWISE.into_iter().find(|d| d.vector() == v)
    }
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first StartGame
    #[default]
    NotStarted,
    /// Active gameplay
    Started,
    /// Game is paused
    Paused,
    /// Run ended, waiting for a restart
    GameOver,
}

/// A projectile slot in the ring buffer
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Projectile {
    pub active: bool,
    /// Continuous position in cell units (cell centers on integers)
    pub position: Vec2,
    pub direction: IVec2,
}

impl Projectile {
    pub fn new(position: Vec2, direction: IVec2) -> Self {
        Self {
            active: true,
            position,
            direction,
        }
    }
}

/// Fixed-capacity projectile storage; inactive slots are skipped and reused
#[derive(Debug, Clone)]
pub struct ProjectileRing {
    slots: Vec<Projectile>,
    /// Next slot to overwrite
    cursor: usize,
}

impl ProjectileRing {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![Projectile::default(); capacity.max(1)],
            cursor: 0,
        }
    }

    /// Store a projectile in the next slot, overwriting whatever was there
    pub fn push(&mut self, projectile: Projectile) {
        self.slots[self.cursor] = projectile;
        self.cursor = (self.cursor + 1) % self.slots.len();
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots_mut(&mut self) -> &mut [Projectile] {
        &mut self.slots
    }

    pub fn active(&self) -> impl Iterator<Item = &Projectile> {
        self.slots.iter().filter(|p| p.active)
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }
}

/// Complete game state, owned by the engine
#[derive(Debug, Clone)]
pub struct GameState {
    /// Current phase
    pub phase: GamePhase,
    /// Score (one point per eliminated cell)
    pub score: u64,
    /// The wall
    pub grid: ColorGrid,
    /// Player shape (replaced on every move/rotate)
    pub shape: PlayerShape,
    /// In-flight projectiles
    pub projectiles: ProjectileRing,
    /// Simulation clock in seconds since the game started
    pub time: f32,
    /// Seconds accumulated toward the next wall scroll
    pub scroll_timer: f32,
}

impl GameState {
    /// Fresh state for a new game
    pub fn new(size: IVec2, shape: PlayerShape, phase: GamePhase) -> Self {
        let capacity = crate::consts::PROJECTILES_PER_CELL * (size.x * size.y).max(1) as usize;
        Self {
            phase,
            score: 0,
            grid: ColorGrid::new(size),
            shape,
            projectiles: ProjectileRing::with_capacity(capacity),
            time: 0.0,
            scroll_timer: 0.0,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn grid(&self) -> &ColorGrid {
        &self.grid
    }

    pub fn shape(&self) -> &PlayerShape {
        &self.shape
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.active()
    }

    /// True when any shape cell sits on an occupied (or out of range) grid cell
    pub fn shape_collides(&self) -> bool {
        self.shape
            .cells()
            .any(|c| self.grid.is_out_of_bounds(c) || self.grid.get(c).is_some())
    }
}

/// Perpendicular directions used for lateral stop checks
pub fn lateral_offsets(direction: IVec2) -> [IVec2; 2] {
    let side = rotate_vector(direction, false);
    [side, -side]
}
