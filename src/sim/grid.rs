//! The scrolling wall: a rectangular grid of optional colors
//!
//! Scrolling left never moves data. A rotating `origin` names the buffer
//! column that currently plays logical column 0, so a scroll only rewrites
//! the column that drops off the left edge and becomes the new rightmost one.
//!
//! All accessors are bounds-checked and panic outside `[0, size)`. Callers
//! pre-check with [`ColorGrid::is_out_of_bounds`].

use glam::IVec2;

use super::fragment::Fragment;
use super::patterns::PatternBank;
use super::state::Color;

/// Orthogonal neighbor offsets, in search order: left, right, down, up
pub const ORTHOGONAL: [IVec2; 4] = [IVec2::NEG_X, IVec2::X, IVec2::NEG_Y, IVec2::Y];

/// Reusable scratch space for flood fills (one flag per grid cell)
#[derive(Debug, Clone)]
pub struct FloodBuffer {
    visited: Vec<bool>,
    stack: Vec<IVec2>,
}

impl FloodBuffer {
    pub fn new(size: IVec2) -> Self {
        let area = (size.x.max(0) * size.y.max(0)) as usize;
        Self {
            visited: vec![false; area],
            stack: Vec::with_capacity(area),
        }
    }

    /// Forget all visited flags
    pub fn clear(&mut self) {
        self.visited.fill(false);
        self.stack.clear();
    }
}

#[derive(Debug, Clone)]
pub struct ColorGrid {
    size: IVec2,
    /// Row-major by buffer column: `y * width + buffer_x`
    colors: Vec<Option<Color>>,
    /// Simulation time each cell was last colored
    spawn_times: Vec<Option<f32>>,
    /// Buffer column that holds logical column 0
    origin: i32,
    /// Number of colored cells
    occupied: usize,
}

impl ColorGrid {
    pub fn new(size: IVec2) -> Self {
        assert!(
            size.x > 0 && size.y > 0,
            "grid size must be positive, got {size}"
        );
        let area = (size.x * size.y) as usize;
        Self {
            size,
            colors: vec![None; area],
            spawn_times: vec![None; area],
            origin: 0,
            occupied: 0,
        }
    }

    #[inline]
    pub fn size(&self) -> IVec2 {
        self.size
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.size.y
    }

    /// Number of colored cells
    #[inline]
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    #[inline]
    pub fn is_out_of_bounds(&self, pos: IVec2) -> bool {
        pos.x < 0 || pos.y < 0 || pos.x >= self.size.x || pos.y >= self.size.y
    }

    fn index(&self, pos: IVec2) -> usize {
        assert!(
            !self.is_out_of_bounds(pos),
            "grid position {pos} out of bounds for size {}",
            self.size
        );
        let buffer_x = (self.origin + pos.x) % self.size.x;
        (pos.y * self.size.x + buffer_x) as usize
    }

    /// Logical (scroll-independent) index used by flood buffers
    #[inline]
    fn logical_index(&self, pos: IVec2) -> usize {
        (pos.y * self.size.x + pos.x) as usize
    }

    pub fn get(&self, pos: IVec2) -> Option<Color> {
        self.colors[self.index(pos)]
    }

    /// When the cell at `pos` was last colored
    pub fn spawn_time(&self, pos: IVec2) -> Option<f32> {
        self.spawn_times[self.index(pos)]
    }

    /// Write a cell. Colored writes stamp `time`; clearing drops the stamp.
    pub fn set(&mut self, pos: IVec2, color: Option<Color>, time: f32) {
        let i = self.index(pos);
        match (self.colors[i].is_some(), color.is_some()) {
            (false, true) => self.occupied += 1,
            (true, false) => self.occupied -= 1,
            _ => {}
        }
        self.colors[i] = color;
        self.spawn_times[i] = color.map(|_| time);
    }

    /// Colors of logical column `x`, bottom to top
    pub fn column(&self, x: i32) -> impl Iterator<Item = Option<Color>> + '_ {
        (0..self.size.y).map(move |y| self.get(IVec2::new(x, y)))
    }

    /// Shift everything one column left and append `new_column` on the right.
    ///
    /// `new_column` holds one entry per row, bottom to top. The leftmost
    /// column is dropped. O(height).
    pub fn scroll_left(&mut self, new_column: &[Option<Color>], time: f32) {
        assert_eq!(
            new_column.len(),
            self.size.y as usize,
            "scrolled column must have one entry per row"
        );
        self.origin = (self.origin + 1) % self.size.x;
        let right = self.size.x - 1;
        for (y, &color) in new_column.iter().enumerate() {
            self.set(IVec2::new(right, y as i32), color, time);
        }
    }

    /// Distinct colors of the occupied orthogonal neighbors of `pos`, in
    /// neighbor order. Returns the filled prefix length.
    pub fn neighbor_colors(&self, pos: IVec2, out: &mut [Option<Color>; 4]) -> usize {
        let mut n = 0;
        for offset in ORTHOGONAL {
            let p = pos + offset;
            if self.is_out_of_bounds(p) {
                continue;
            }
            if let Some(color) = self.get(p) {
                if !out[..n].contains(&Some(color)) {
                    out[n] = Some(color);
                    n += 1;
                }
            }
        }
        n
    }

    /// Find a pattern that the cell `include` completes.
    ///
    /// Candidate colors come from the cell itself when it is colored, else
    /// from its occupied neighbors. For each color, each rotation pattern of
    /// that color is slid over every placement covering `include` (rows
    /// bottom-up, then columns left to right). `include` counts as a match
    /// whatever the grid holds there. The first full match is written to
    /// `buffer` (absolute cells) and its color returned.
    pub fn find_pattern(
        &self,
        bank: &PatternBank,
        include: IVec2,
        buffer: &mut Vec<IVec2>,
    ) -> Option<Color> {
        buffer.clear();

        let mut candidates = [None; 4];
        let count = match self.get(include) {
            Some(color) => {
                candidates[0] = Some(color);
                1
            }
            None => self.neighbor_colors(include, &mut candidates),
        };

        for color in candidates[..count].iter().flatten().copied() {
            for pattern in bank.patterns(color) {
                if let Some(shift) = self.match_pattern(pattern, color, include) {
                    buffer.extend(pattern.cells_at(shift));
                    return Some(color);
                }
            }
        }
        None
    }

    /// First placement of `pattern` covering `include` where every other
    /// cell holds `color`
    fn match_pattern(&self, pattern: &Fragment, color: Color, include: IVec2) -> Option<IVec2> {
        let size = pattern.size();
        let min = (include - size + IVec2::ONE).max(IVec2::ZERO);
        let max = include.min(self.size - size);

        for y in min.y..=max.y {
            for x in min.x..=max.x {
                let shift = IVec2::new(x, y);
                if !pattern.contains(include, shift) {
                    continue;
                }
                if pattern
                    .cells_at(shift)
                    .all(|c| c == include || self.get(c) == Some(color))
                {
                    return Some(shift);
                }
            }
        }
        None
    }

    /// Size of the 4-connected region of `color` containing `start`.
    ///
    /// Cells already flagged in `visited` are not counted again; the caller
    /// clears the buffer between independent queries.
    pub fn count_connected_cells(
        &self,
        color: Color,
        start: IVec2,
        visited: &mut FloodBuffer,
    ) -> usize {
        if self.is_out_of_bounds(start) || self.get(start) != Some(color) {
            return 0;
        }
        let start_index = self.logical_index(start);
        if visited.visited[start_index] {
            return 0;
        }

        visited.stack.clear();
        visited.visited[start_index] = true;
        visited.stack.push(start);

        let mut count = 0;
        while let Some(pos) = visited.stack.pop() {
            count += 1;
            for offset in ORTHOGONAL {
                let next = pos + offset;
                if self.is_out_of_bounds(next) {
                    continue;
                }
                let i = self.logical_index(next);
                if !visited.visited[i] && self.get(next) == Some(color) {
                    visited.visited[i] = true;
                    visited.stack.push(next);
                }
            }
        }
        count
    }
}
