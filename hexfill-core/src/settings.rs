//! Settings - board shape, palette and winning score

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::board::MAX_COLORS;
use crate::error::{FillerError, Result};
use crate::grid::{HexGrid, Origins};

/// Fewest colors that leave a player a real choice
pub const MIN_COLORS: usize = 3;

/// Game settings, passed by value wherever they are needed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub columns: usize,
    pub rows: usize,
    pub num_colors: usize,
    /// Score that ends the game; half the valid cells plus one when unset
    pub points_to_win: Option<usize>,
    /// Starting cells as `(x, y)` for seat 0 and seat 1
    pub origins: Option<[(usize, usize); 2]>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            columns: 95,
            rows: 15,
            num_colors: 9,
            points_to_win: None,
            origins: None,
        }
    }
}

impl Settings {
    pub fn with_size(mut self, columns: usize, rows: usize) -> Self {
        self.columns = columns;
        self.rows = rows;
        self
    }

    pub fn with_colors(mut self, num_colors: usize) -> Self {
        self.num_colors = num_colors;
        self
    }

    pub fn with_points_to_win(mut self, points: usize) -> Self {
        self.points_to_win = Some(points);
        self
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns < 3 || self.rows < 2 {
            return Err(FillerError::InvalidSettings(format!(
                "board {}x{} is too small",
                self.columns, self.rows
            )));
        }
        if !(MIN_COLORS..=MAX_COLORS).contains(&self.num_colors) {
            return Err(FillerError::InvalidSettings(format!(
                "{} colors, expected {}..={}",
                self.num_colors, MIN_COLORS, MAX_COLORS
            )));
        }
        if self.points_to_win == Some(0) {
            return Err(FillerError::InvalidSettings(
                "points_to_win must be positive".to_string(),
            ));
        }
        if let Some([a, b]) = self.origins {
            if a == b {
                return Err(FillerError::InvalidSettings(
                    "origins must be distinct".to_string(),
                ));
            }
            for (x, y) in [a, b] {
                let on_board = x < self.columns && y < self.rows;
                if !on_board || (x % 2 == 0 && y == 0) {
                    return Err(FillerError::InvalidSettings(format!(
                        "origin ({}, {}) is not a valid cell",
                        x, y
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn grid(&self) -> HexGrid {
        HexGrid::new(self.columns, self.rows)
    }

    /// Configured origins, or the grid's default corners
    pub fn origins_on(&self, grid: &HexGrid) -> Origins {
        match self.origins {
            Some([(ax, ay), (bx, by)]) => Origins::new(grid.index(ax, ay), grid.index(bx, by)),
            None => grid.default_origins(),
        }
    }

    pub fn points_to_win_on(&self, grid: &HexGrid) -> usize {
        self.points_to_win
            .unwrap_or_else(|| grid.valid_count() / 2 + 1)
    }
}
