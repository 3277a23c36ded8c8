//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through frame inputs
//! - Seeded RNG only
//! - Stable iteration order (grid rows, projectile slots, subscription order)
//! - No rendering or platform dependencies

pub mod events;
pub mod fragment;
pub mod generator;
pub mod grid;
pub mod patterns;
pub mod projectile;
pub mod replay;
pub mod shape;
pub mod state;
pub mod tick;

pub use events::{Channel, Outputs};
pub use fragment::Fragment;
pub use generator::{CellGenerator, FixedColumnGenerator, RandomCellGenerator};
pub use grid::{ColorGrid, FloodBuffer};
pub use patterns::{PatternBank, PatternDefinition, PatternError, standard_definitions};
pub use replay::InputLog;
pub use shape::PlayerShape;
pub use state::{Cell, Color, Direction, GamePhase, GameState, Projectile, ProjectileRing};
pub use tick::{Engine, Horizontal, InputEvent, Vertical};
