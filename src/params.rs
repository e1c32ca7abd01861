use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::color::Rgb;

pub const DEFAULT_GRID_SIZE: usize = 17;
pub const MAX_GRID_SIZE: usize = 99;

/// Parameters for a single picking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PickerParams {
    /// Colour reported before any sampling happens, usually the value being edited.
    pub previous_color: Rgb,
    /// Cells per side of the sampled square. Must be odd so there is a centre cell.
    pub grid_size: usize,
}

impl Default for PickerParams {
    fn default() -> Self {
        Self {
            previous_color: Rgb::default(),
            grid_size: DEFAULT_GRID_SIZE,
        }
    }
}

impl PickerParams {
    pub fn new(previous_color: Rgb, grid_size: usize) -> Self {
        Self {
            previous_color,
            grid_size,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_grid_size(self.grid_size)
    }
}

pub fn validate_grid_size(grid_size: usize) -> Result<()> {
    if grid_size == 0 || grid_size > MAX_GRID_SIZE {
        bail!("Grid size must be between 1 and {MAX_GRID_SIZE}, got {grid_size}");
    }
    if grid_size % 2 == 0 {
        bail!("Grid size must be odd so the grid has a centre cell, got {grid_size}");
    }
    Ok(())
}
