//! Wall column generators
//!
//! The engine asks a [`CellGenerator`] for a fresh rightmost column every
//! time the wall scrolls. Generators must be deterministic for a given seed
//! so runs can be replayed from their input log.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::Color;

/// Strategy that fills a new wall column (one entry per row, bottom to top)
pub trait CellGenerator {
    fn generate(&mut self, column: &mut [Option<Color>]);
}

impl<F: FnMut(&mut [Option<Color>])> CellGenerator for F {
    fn generate(&mut self, column: &mut [Option<Color>]) {
        self(column)
    }
}

/// Random colors with a per-cell fill chance. Never produces a full column.
#[derive(Debug, Clone)]
pub struct RandomCellGenerator {
    rng: Pcg32,
    fill_chance: f32,
}

impl RandomCellGenerator {
    pub fn new(seed: u64, fill_chance: f32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            fill_chance: fill_chance.clamp(0.0, 1.0),
        }
    }
}

impl CellGenerator for RandomCellGenerator {
    fn generate(&mut self, column: &mut [Option<Color>]) {
        for cell in column.iter_mut() {
            *cell = if self.rng.random::<f32>() < self.fill_chance {
                Some(Color::ALL[self.rng.random_range(0..Color::ALL.len())])
            } else {
                None
            };
        }

        // Always leave a gap to shoot through
        if !column.is_empty() && column.iter().all(Option::is_some) {
            let gap = self.rng.random_range(0..column.len());
            column[gap] = None;
        }
    }
}

/// Repeats the same column forever (scripted scenarios, tests)
#[derive(Debug, Clone, Default)]
pub struct FixedColumnGenerator {
    column: Vec<Option<Color>>,
}

impl FixedColumnGenerator {
    pub fn new(column: Vec<Option<Color>>) -> Self {
        Self { column }
    }

    /// Generator that only ever scrolls in empty columns
    pub fn empty() -> Self {
        Self::default()
    }
}

impl CellGenerator for FixedColumnGenerator {
    fn generate(&mut self, column: &mut [Option<Color>]) {
        for (y, cell) in column.iter_mut().enumerate() {
            *cell = self.column.get(y).copied().flatten();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_generator_is_deterministic_per_seed() {
        let mut a = RandomCellGenerator::new(42, 0.5);
        let mut b = RandomCellGenerator::new(42, 0.5);
        let mut col_a = vec![None; 16];
        let mut col_b = vec![None; 16];
        for _ in 0..20 {
            a.generate(&mut col_a);
            b.generate(&mut col_b);
            assert_eq!(col_a, col_b);
        }
    }

    #[test]
    fn random_generator_always_leaves_a_gap() {
        let mut generator = RandomCellGenerator::new(7, 1.0);
        let mut column = vec![None; 8];
        for _ in 0..50 {
            generator.generate(&mut column);
            assert_eq!(column.iter().filter(|c| c.is_none()).count(), 1);
        }
    }

    #[test]
    fn zero_fill_chance_yields_empty_columns() {
        let mut generator = RandomCellGenerator::new(7, 0.0);
        let mut column = vec![Some(Color::Red); 5];
        generator.generate(&mut column);
        assert!(column.iter().all(Option::is_none));
    }

    #[test]
    fn fixed_generator_pads_short_columns() {
        let mut generator = FixedColumnGenerator::new(vec![Some(Color::Blue)]);
        let mut column = vec![Some(Color::Red); 3];
        generator.generate(&mut column);
        assert_eq!(column, vec![Some(Color::Blue), None, None]);
    }

    #[test]
    fn closures_are_generators() {
        let mut calls = 0;
        let mut generator = |col: &mut [Option<Color>]| {
            calls += 1;
            col.fill(Some(Color::Green));
        };
        let mut column = vec![None; 2];
        generator.generate(&mut column);
        assert_eq!(column, vec![Some(Color::Green); 2]);
        drop(generator);
        assert_eq!(calls, 1);
    }
}
