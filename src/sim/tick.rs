//! Frame-driven simulation engine
//!
//! The engine consumes [`InputEvent`]s strictly in arrival order. Frame
//! ticks are split into sub-steps of at most one cell of projectile travel,
//! so neither a projectile nor the wall can skip a cell between collision
//! checks. Game over is never handled inside collision evaluation: it is
//! flagged and resolved at the end of the sub-step (or at the start of the
//! next frame for player actions).

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::events::Outputs;
use super::generator::{CellGenerator, RandomCellGenerator};
use super::grid::{FloodBuffer, ORTHOGONAL};
use super::patterns::PatternBank;
use super::projectile::{Advance, Motion};
use super::replay::InputLog;
use super::shape::PlayerShape;
use super::state::{Cell, Color, GamePhase, GameState, Projectile};
use crate::consts::TIME_EPSILON;
use crate::settings::{Settings, SettingsError};

/// Horizontal part of a move request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Horizontal {
    #[default]
    None,
    Left,
    Right,
}

impl Horizontal {
    fn step(self) -> i32 {
        match self {
            Horizontal::None => 0,
            Horizontal::Left => -1,
            Horizontal::Right => 1,
        }
    }
}

/// Vertical part of a move request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Vertical {
    #[default]
    None,
    Up,
    Down,
}

impl Vertical {
    fn step(self) -> i32 {
        match self {
            Vertical::None => 0,
            Vertical::Up => 1,
            Vertical::Down => -1,
        }
    }
}

/// Everything that can drive the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Advance the clock by `elapsed` seconds
    Frame { elapsed: f32 },
    Move {
        horizontal: Horizontal,
        vertical: Vertical,
    },
    Rotate { clockwise: bool },
    Shoot,
    StartGame,
    /// `pause = true` pauses a running game, `false` resumes a paused one
    PauseResume { pause: bool },
}

impl InputEvent {
    pub fn frame(elapsed: f32) -> Self {
        InputEvent::Frame { elapsed }
    }

    pub fn moved(horizontal: Horizontal, vertical: Vertical) -> Self {
        InputEvent::Move {
            horizontal,
            vertical,
        }
    }
}

/// Owns the game state and is its only mutator
pub struct Engine {
    settings: Settings,
    bank: PatternBank,
    generator: Box<dyn CellGenerator>,
    state: GameState,
    outputs: Outputs,

    // Scratch buffers reused across steps
    flood: FloodBuffer,
    matched: Vec<IVec2>,
    column: Vec<Option<Color>>,

    /// Full columns waiting for the next frame to be cleared
    pending_columns: Vec<i32>,
    pending_game_over: bool,
    log: Option<InputLog>,
}

impl Engine {
    /// Build an engine in the `NotStarted` phase.
    ///
    /// `settings` are trusted; run [`Settings::validate`] first when they
    /// come from outside.
    pub fn new(
        settings: Settings,
        bank: PatternBank,
        generator: impl CellGenerator + 'static,
    ) -> Self {
        let size = settings.grid_size();
        let state = GameState::new(size, settings.start_shape(), GamePhase::NotStarted);
        Self {
            bank,
            generator: Box::new(generator),
            state,
            outputs: Outputs::default(),
            flood: FloodBuffer::new(size),
            matched: Vec::with_capacity(4),
            column: vec![None; size.y as usize],
            pending_columns: Vec::new(),
            pending_game_over: false,
            log: None,
            settings,
        }
    }

    /// Validated engine with the seeded random wall generator
    pub fn from_settings(settings: Settings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let bank = settings.pattern_bank()?;
        let generator = RandomCellGenerator::new(settings.seed, settings.wall_fill_chance);
        Ok(Self::new(settings, bank, generator))
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Subscribe to output streams here, before handling any input
    pub fn outputs_mut(&mut self) -> &mut Outputs {
        &mut self.outputs
    }

    /// Start recording every handled input
    pub fn record_inputs(&mut self) {
        if self.log.is_none() {
            self.log = Some(InputLog::new());
        }
    }

    pub fn input_log(&self) -> Option<&InputLog> {
        self.log.as_ref()
    }

    /// Process one input event to completion
    pub fn handle(&mut self, input: &InputEvent) {
        if let Some(log) = &mut self.log {
            log.push(*input);
        }

        match *input {
            InputEvent::Frame { elapsed } => self.frame(elapsed),
            InputEvent::Move {
                horizontal,
                vertical,
            } => self.move_shape(IVec2::new(horizontal.step(), vertical.step())),
            InputEvent::Rotate { clockwise } => self.rotate(clockwise),
            InputEvent::Shoot => self.shoot(),
            InputEvent::StartGame => self.start(),
            InputEvent::PauseResume { pause } => self.pause_resume(pause),
        }
    }

    // === Phase transitions ===

    fn set_phase(&mut self, phase: GamePhase) {
        if self.state.phase == phase {
            return;
        }
        log::info!("Phase {:?} -> {:?}", self.state.phase, phase);
        self.state.phase = phase;
        self.outputs.phase_changed.emit(&phase);
    }

    fn start(&mut self) {
        match self.state.phase {
            GamePhase::Paused => self.set_phase(GamePhase::Started),
            GamePhase::Started => {}
            GamePhase::NotStarted | GamePhase::GameOver => {
                let size = self.settings.grid_size();
                self.state = GameState::new(size, self.settings.start_shape(), self.state.phase);
                self.pending_columns.clear();
                self.pending_game_over = false;
                log::info!("New game on a {}x{} grid", size.x, size.y);

                self.outputs.game_started.emit(&size);
                self.outputs.player_shape_updated.emit(&self.state.shape);
                self.outputs.score.emit(&0);
                self.set_phase(GamePhase::Started);
            }
        }
    }

    fn pause_resume(&mut self, pause: bool) {
        match (self.state.phase, pause) {
            (GamePhase::Started, true) => self.set_phase(GamePhase::Paused),
            (GamePhase::Paused, false) => self.set_phase(GamePhase::Started),
            _ => {}
        }
    }

    fn game_over(&mut self) {
        self.pending_game_over = false;
        self.pending_columns.clear();

        let time = self.state.time;
        let color = self.state.shape.color();
        for position in self.state.shape.cells() {
            if self.state.grid.is_out_of_bounds(position) || self.state.grid.get(position).is_some()
            {
                continue;
            }
            self.state.grid.set(position, Some(color), time);
            self.outputs.new_cell.emit(&Cell::new(position, color));
        }

        for projectile in self.state.projectiles.slots_mut() {
            projectile.active = false;
        }

        log::info!("Game over, final score {}", self.state.score);
        self.set_phase(GamePhase::GameOver);
    }

    // === Player actions ===

    fn move_shape(&mut self, delta: IVec2) {
        if self.state.phase != GamePhase::Started || delta == IVec2::ZERO {
            return;
        }
        let moved = self
            .state
            .shape
            .with_position(self.state.shape.position() + delta);
        self.replace_shape(moved);
    }

    fn rotate(&mut self, clockwise: bool) {
        if self.state.phase != GamePhase::Started {
            return;
        }
        let rotated = self.state.shape.rotate(clockwise);
        if self.replace_shape(rotated) {
            self.outputs.rotated.emit(&clockwise);
        }
    }

    /// Swap in a moved or rotated shape. Shapes leaving the grid are
    /// rejected; shapes overlapping the wall are accepted and doom the game.
    fn replace_shape(&mut self, shape: PlayerShape) -> bool {
        if shape.cells().any(|c| self.state.grid.is_out_of_bounds(c)) {
            log::trace!("Shape move to {} rejected", shape.position());
            return false;
        }

        self.state.shape = shape;
        self.outputs.player_shape_updated.emit(&self.state.shape);
        if self.state.shape_collides() {
            log::debug!("Shape moved into the wall");
            self.pending_game_over = true;
        }
        true
    }

    fn shoot(&mut self) {
        if self.state.phase != GamePhase::Started {
            return;
        }
        let muzzle = self.state.shape.muzzle_position();
        if self.state.grid.is_out_of_bounds(muzzle) {
            return;
        }
        if self.state.grid.get(muzzle).is_some() {
            log::debug!("Shot into the wall at {muzzle}");
            self.pending_game_over = true;
            return;
        }

        let direction = self.state.shape.direction().vector();
        self.state
            .projectiles
            .push(Projectile::new(muzzle.as_vec2(), direction));
        self.outputs.shot_fired.emit(&direction);
    }

    // === Frame ===

    fn frame(&mut self, elapsed: f32) {
        if self.state.phase != GamePhase::Started {
            return;
        }
        if !elapsed.is_finite() {
            log::warn!("Ignoring frame with elapsed time {elapsed}");
            return;
        }
        if self.pending_game_over {
            self.game_over();
            return;
        }

        self.eliminate_pending_columns();

        let cell_time = self.settings.cell_time();
        let (full_steps, tail) = split_frame(elapsed, cell_time);
        for _ in 0..full_steps {
            if self.state.phase != GamePhase::Started {
                break;
            }
            self.step(cell_time);
        }
        if tail > 0.0 && self.state.phase == GamePhase::Started {
            self.step(tail);
        }

        self.outputs.frame_elapsed.emit(&elapsed);
    }

    /// One sub-step: scroll, then move every projectile
    fn step(&mut self, dt: f32) {
        self.state.time += dt;
        self.state.scroll_timer += dt;
        if self.state.scroll_timer + TIME_EPSILON >= self.settings.scroll_interval {
            self.state.scroll_timer -= self.settings.scroll_interval;
            self.scroll();
        }

        self.advance_projectiles(dt);

        if self.pending_game_over {
            self.game_over();
        }
    }

    fn scroll(&mut self) {
        self.generator.generate(&mut self.column);
        self.state.grid.scroll_left(&self.column, self.state.time);
        self.outputs.table_scrolled.emit(self.column.as_slice());
        log::debug!("Wall scrolled at t={:.3}", self.state.time);

        self.pending_columns.retain_mut(|x| {
            *x -= 1;
            *x >= 0
        });

        if self.state.shape_collides() {
            log::debug!("Wall scrolled into the shape");
            self.pending_game_over = true;
        }
    }

    fn motion(&self) -> Motion<'_> {
        Motion {
            grid: &self.state.grid,
            shape: &self.state.shape,
            time: self.state.time,
            speed: self.settings.projectile_speed,
            lateral_cells_stop: self.settings.lateral_cells_stop,
            vertical_bounds_stop: self.settings.vertical_bounds_stop,
        }
    }

    fn advance_projectiles(&mut self, dt: f32) {
        for i in 0..self.state.projectiles.capacity() {
            let projectile = self.state.projectiles.slots_mut()[i];
            if !projectile.active {
                continue;
            }

            let advance = self.motion().advance(&projectile, dt);
            let slot = &mut self.state.projectiles.slots_mut()[i];
            match advance {
                Advance::Moved(position) => {
                    slot.position = position;
                    log::trace!("Projectile {i} at {position}");
                    self.outputs.projectile_position.emit(&position);
                }
                Advance::Left | Advance::Lost => slot.active = false,
                Advance::Frozen(cell) => {
                    slot.active = false;
                    self.freeze(cell);
                }
                Advance::Crushed => {
                    slot.active = false;
                    log::debug!("Projectile pushed back into the shape");
                    self.pending_game_over = true;
                }
            }
        }
    }

    // === Freezing ===

    fn freeze(&mut self, cell: IVec2) {
        self.outputs.frozen_at.emit(&cell);
        log::debug!("Projectile froze at {cell}");

        if self.state.shape.contains(cell) {
            self.pending_game_over = true;
            return;
        }

        // Checked before the landing cell is written
        if self.column_is_full(cell) {
            self.place(cell, self.settings.frozen_color);
            if !self.pending_columns.contains(&cell.x) {
                self.pending_columns.push(cell.x);
            }
            log::debug!("Column {} is full", cell.x);
            return;
        }

        if let Some(color) = self
            .state
            .grid
            .find_pattern(&self.bank, cell, &mut self.matched)
        {
            self.place(cell, color);
            log::debug!("{color} pattern matched through {cell}");
            let time = self.state.time;
            for &position in &self.matched {
                self.state.grid.set(position, None, time);
                self.outputs
                    .cell_eliminated
                    .emit(&Cell::new(position, color));
                self.state.score += 1;
            }
            self.outputs.score.emit(&self.state.score);
            return;
        }

        let color = self.assign_color(cell);
        self.place(cell, color);
    }

    fn place(&mut self, cell: IVec2, color: Color) {
        self.state.grid.set(cell, Some(color), self.state.time);
        self.outputs.new_cell.emit(&Cell::new(cell, color));
    }

    /// Would `cell` complete its column? Shape cells count as filled.
    fn column_is_full(&self, cell: IVec2) -> bool {
        let grid = &self.state.grid;
        let filled = grid.column(cell.x).filter(Option::is_some).count();
        let covered = self
            .state
            .shape
            .vertical_slice(cell.x)
            .filter(|&c| !grid.is_out_of_bounds(c) && grid.get(c).is_none())
            .count();
        filled + covered + 1 == grid.height() as usize
    }

    /// Color for a frozen cell that completed no pattern.
    ///
    /// Two or more neighbors of one color bridge them and force that color.
    /// Otherwise the neighbor color with the largest connected region wins,
    /// ties going to declaration order.
    fn assign_color(&mut self, cell: IVec2) -> Color {
        let grid = &self.state.grid;

        let mut counts = [0u8; 7];
        for offset in ORTHOGONAL {
            let n = cell + offset;
            if grid.is_out_of_bounds(n) {
                continue;
            }
            if let Some(color) = grid.get(n) {
                counts[color.index()] += 1;
            }
        }

        if let Some(bridge) = Color::ALL.into_iter().find(|c| counts[c.index()] >= 2) {
            return bridge;
        }

        let mut best: Option<(usize, Color)> = None;
        for color in Color::ALL {
            if counts[color.index()] == 0 {
                continue;
            }
            self.flood.clear();
            let region: usize = ORTHOGONAL
                .iter()
                .map(|&offset| grid.count_connected_cells(color, cell + offset, &mut self.flood))
                .sum();
            match best {
                Some((size, _)) if size >= region => {}
                _ => best = Some((region, color)),
            }
        }

        best.map_or(self.settings.frozen_color, |(_, color)| color)
    }

    fn eliminate_pending_columns(&mut self) {
        if self.pending_columns.is_empty() {
            return;
        }

        let time = self.state.time;
        let mut eliminated = 0;
        for x in std::mem::take(&mut self.pending_columns) {
            for y in 0..self.state.grid.height() {
                let position = IVec2::new(x, y);
                if let Some(color) = self.state.grid.get(position) {
                    self.state.grid.set(position, None, time);
                    self.outputs
                        .cell_eliminated
                        .emit(&Cell::new(position, color));
                    eliminated += 1;
                }
            }
            log::debug!("Column {x} eliminated");
        }

        if eliminated > 0 {
            self.state.score += eliminated;
            self.outputs.score.emit(&self.state.score);
        }
    }
}

/// Whole cell-time sub-steps in `elapsed`, plus the shorter remainder
fn split_frame(elapsed: f32, cell_time: f32) -> (u64, f32) {
    if elapsed <= 0.0 {
        return (0, 0.0);
    }
    let full = (elapsed / cell_time).floor();
    let tail = (elapsed - full * cell_time).clamp(0.0, cell_time);
    (full as u64, tail)
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("pending_columns", &self.pending_columns)
            .field("pending_game_over", &self.pending_game_over)
            .finish_non_exhaustive()
    }
}
