//! Elimination patterns, grouped by color
//!
//! Each color owns one or more canonical shapes. The bank stores every
//! distinct 90 degree rotation of those shapes, in the order produced by
//! rotating clockwise from the canonical form.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::fragment::Fragment;
use super::state::Color;

/// Problems with externally supplied pattern definitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern for {color} has no filled cells")]
    Empty { color: Color },
    #[error("pattern for {color} has rows of different lengths")]
    Ragged { color: Color },
    #[error("pattern for {color} contains unexpected character {ch:?} (use '#' or '.')")]
    BadCell { color: Color, ch: char },
    #[error("no pattern defined for {color}")]
    Missing { color: Color },
}

/// A shape drawn as text, top row first: `#` filled, `.` empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub color: Color,
    pub rows: Vec<String>,
}

impl PatternDefinition {
    pub fn new(color: Color, rows: &[&str]) -> Self {
        Self {
            color,
            rows: rows.iter().map(|r| (*r).to_owned()).collect(),
        }
    }

    /// Validate and convert to a normalized fragment
    pub fn to_fragment(&self) -> Result<Fragment, PatternError> {
        let color = self.color;
        let width = self.rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if self.rows.iter().any(|r| r.chars().count() != width) {
            return Err(PatternError::Ragged { color });
        }
        if let Some(ch) = self
            .rows
            .iter()
            .flat_map(|r| r.chars())
            .find(|ch| !matches!(ch, '#' | '.'))
        {
            return Err(PatternError::BadCell { color, ch });
        }

        let fragment = fragment_from_rows(self.rows.iter().map(String::as_str));
        if fragment.is_empty() {
            return Err(PatternError::Empty { color });
        }
        Ok(fragment)
    }
}

/// Text rows (already validated) to a fragment
fn fragment_from_rows<'a>(rows: impl Iterator<Item = &'a str>) -> Fragment {
    let matrix: Vec<Vec<bool>> = rows.map(|r| r.chars().map(|c| c == '#').collect()).collect();
    Fragment::from_matrix(&matrix).0
}

/// Canonical tetromino for each color
pub fn standard_definitions() -> Vec<PatternDefinition> {
    vec![
        PatternDefinition::new(Color::PaleBlue, &["####"]),
        PatternDefinition::new(Color::Yellow, &["##", "##"]),
        PatternDefinition::new(Color::Purple, &[".#.", "###"]),
        PatternDefinition::new(Color::Green, &[".##", "##."]),
        PatternDefinition::new(Color::Red, &["##.", ".##"]),
        PatternDefinition::new(Color::Blue, &["#..", "###"]),
        PatternDefinition::new(Color::Orange, &["..#", "###"]),
    ]
}

/// Read-only per-color pattern lists
#[derive(Debug, Clone)]
pub struct PatternBank {
    by_color: [Vec<Fragment>; 7],
}

impl PatternBank {
    /// Bank of the canonical tetrominoes
    pub fn standard() -> Self {
        let mut by_color: [Vec<Fragment>; 7] = Default::default();
        for def in standard_definitions() {
            let base = fragment_from_rows(def.rows.iter().map(String::as_str));
            add_rotations(&mut by_color[def.color.index()], base);
        }
        Self { by_color }
    }

    /// Build from external definitions. Every color needs at least one shape.
    pub fn from_definitions(definitions: &[PatternDefinition]) -> Result<Self, PatternError> {
        let mut by_color: [Vec<Fragment>; 7] = Default::default();
        for def in definitions {
            let base = def.to_fragment()?;
            add_rotations(&mut by_color[def.color.index()], base);
        }
        if let Some(color) = Color::ALL
            .into_iter()
            .find(|c| by_color[c.index()].is_empty())
        {
            return Err(PatternError::Missing { color });
        }
        log::debug!(
            "Pattern bank built: {} fragments",
            by_color.iter().map(Vec::len).sum::<usize>()
        );
        Ok(Self { by_color })
    }

    /// All rotations for a color, in bank order
    pub fn patterns(&self, color: Color) -> &[Fragment] {
        let patterns = &self.by_color[color.index()];
        assert!(!patterns.is_empty(), "pattern bank has no entry for {color}");
        patterns
    }
}

impl Default for PatternBank {
    fn default() -> Self {
        Self::standard()
    }
}

/// Rotate clockwise four times, keeping each form not seen yet
fn add_rotations(list: &mut Vec<Fragment>, base: Fragment) {
    let mut current = base;
    for _ in 0..4 {
        let next = current.rotated(true);
        if !list.contains(&current) {
            list.push(current);
        }
        current = next;
    }
}
