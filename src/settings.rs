//! Game configuration
//!
//! Loaded from JSON (any missing field falls back to its default) and
//! validated before an engine is built from it.

use std::path::{Path, PathBuf};

use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::{Color, PatternBank, PatternDefinition, PatternError, PlayerShape};

/// Configuration problems, reported at startup
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Grid ===
    /// Columns
    pub grid_width: i32,
    /// Rows
    pub grid_height: i32,
    /// Seconds between wall scrolls
    pub scroll_interval: f32,

    // === Player ===
    /// Bottom-left of the ship's bounding box at game start
    pub player_start: IVec2,
    pub player_color: Color,

    // === Projectiles ===
    /// Cells per second
    pub projectile_speed: f32,
    /// Color a projectile freezes with when nothing nearby decides it
    pub frozen_color: Color,
    /// Occupied cells beside the flight path stop projectiles
    pub lateral_cells_stop: bool,
    /// Top and bottom grid edges stop projectiles
    pub vertical_bounds_stop: bool,

    // === Wall generation ===
    pub seed: u64,
    /// Chance for each generated wall cell to be filled (0.0 - 1.0)
    pub wall_fill_chance: f32,
    /// Custom elimination patterns (standard tetrominoes when absent)
    pub patterns: Option<Vec<PatternDefinition>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_width: GRID_WIDTH,
            grid_height: GRID_HEIGHT,
            scroll_interval: SCROLL_INTERVAL,

            player_start: PLAYER_START,
            player_color: Color::Purple,

            projectile_speed: PROJECTILE_SPEED,
            frozen_color: Color::Red,
            lateral_cells_stop: true,
            vertical_bounds_stop: true,

            seed: DEFAULT_SEED,
            wall_fill_chance: WALL_FILL_CHANCE,
            patterns: None,
        }
    }
}

impl Settings {
    /// Grid size in cells
    pub fn grid_size(&self) -> IVec2 {
        IVec2::new(self.grid_width, self.grid_height)
    }

    /// Seconds a projectile needs to cross one cell
    pub fn cell_time(&self) -> f32 {
        1.0 / self.projectile_speed
    }

    /// The ship as it appears at game start
    pub fn start_shape(&self) -> PlayerShape {
        PlayerShape::standard(self.player_color, self.player_start)
    }

    /// Pattern bank described by these settings
    pub fn pattern_bank(&self) -> Result<PatternBank, SettingsError> {
        match &self.patterns {
            Some(definitions) => Ok(PatternBank::from_definitions(definitions)?),
            None => Ok(PatternBank::standard()),
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
            SettingsError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.grid_width <= 0 || self.grid_height <= 0 {
            return Err(invalid(
                "grid_width/grid_height",
                format!(
                    "grid must be at least 1x1, got {}x{}",
                    self.grid_width, self.grid_height
                ),
            ));
        }
        if self.scroll_interval.is_nan() || self.scroll_interval <= 0.0 {
            return Err(invalid("scroll_interval", "must be positive"));
        }
        if self.projectile_speed.is_nan() || self.projectile_speed <= 0.0 {
            return Err(invalid("projectile_speed", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.wall_fill_chance) {
            return Err(invalid("wall_fill_chance", "must be between 0 and 1"));
        }

        let size = self.grid_size();
        let outside = |c: IVec2| c.x < 0 || c.y < 0 || c.x >= size.x || c.y >= size.y;
        if self.start_shape().cells().any(outside) {
            return Err(invalid(
                "player_start",
                format!("ship at {} does not fit in the grid", self.player_start),
            ));
        }

        self.pattern_bank()?;
        Ok(())
    }

    /// Parse and validate JSON settings
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings = Settings::from_json(r#"{ "grid_width": 8, "grid_height": 8 }"#).unwrap();
        assert_eq!(settings.grid_size(), IVec2::new(8, 8));
        assert_eq!(settings.projectile_speed, PROJECTILE_SPEED);
        assert!(settings.patterns.is_none());
    }

    #[test]
    fn json_round_trip() {
        let settings = Settings {
            player_start: IVec2::new(2, 2),
            lateral_cells_stop: false,
            ..Settings::default()
        };
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn rejects_bad_values() {
        let err = Settings::from_json(r#"{ "projectile_speed": 0.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "projectile_speed",
                ..
            }
        ));

        let err = Settings::from_json(r#"{ "grid_height": 2 }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "player_start",
                ..
            }
        ));

        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn bad_patterns_surface_as_settings_errors() {
        let json = r##"{ "patterns": [ { "color": "Red", "rows": ["#?"] } ] }"##;
        let err = Settings::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Pattern(PatternError::BadCell { ch: '?', .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Settings::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
        assert!(err.to_string().contains("here.json"));
    }
}
