//! Grid compiler - lays a scenario out as a character grid for an external
//! livecoding tool that polls a text file.
//!
//! Each entity becomes one ASCII character chosen by hashing its name, so the
//! same entity always plays the same "sample". Glyphs are uppercase while the
//! entity's energy is high.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use world_rules::Scenario;

use crate::atomic_io::write_text_atomic;

/// Characters glyphs are drawn from.
pub const GLYPH_PALETTE: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// Character for a cell with no entity.
pub const EMPTY_CELL: char = '.';

/// Energy at or above which a glyph is uppercased.
pub const LOUD_ENERGY: u8 = 70;

/// Half-extent of the authored coordinate space projected onto the grid.
const WORLD_EXTENT: f32 = 10.0;

/// Deterministic 31-multiplier string hash, wrapping in 32 bits.
pub fn name_hash(name: &str) -> i32 {
    name.chars()
        .fold(0i32, |hash, c| hash.wrapping_mul(31).wrapping_add(c as i32))
}

/// Glyph for an entity name.
pub fn glyph_for(name: &str) -> char {
    let palette: Vec<char> = GLYPH_PALETTE.chars().collect();
    let index = name_hash(name).unsigned_abs() as usize % palette.len();
    palette[index]
}

/// Grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 16,
            height: 8,
        }
    }
}

/// A compiled grid of glyphs, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl Grid {
    fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![EMPTY_CELL; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, col: usize, row: usize) -> Option<char> {
        if col < self.width && row < self.height {
            Some(self.cells[row * self.width + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> Option<String> {
        (row < self.height).then(|| {
            self.cells[row * self.width..(row + 1) * self.width]
                .iter()
                .collect()
        })
    }

    /// Number of non-empty cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| **c != EMPTY_CELL).count()
    }

    /// Overwrite `path` with this grid.
    pub fn write_live(&self, path: &Path) -> io::Result<()> {
        write_text_atomic(path, &self.to_string())
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..self.height {
            let line: String = self.cells[row * self.width..(row + 1) * self.width]
                .iter()
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Compiles scenarios into grids.
#[derive(Debug, Clone, Default)]
pub struct GridCompiler {
    config: GridConfig,
}

impl GridCompiler {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config: GridConfig {
                width: config.width.max(1),
                height: config.height.max(1),
            },
        }
    }

    /// Place every entity on the grid. The first entity wins a shared cell.
    pub fn compile(&self, scenario: &Scenario) -> Grid {
        let mut grid = Grid::empty(self.config.width, self.config.height);

        for entity in &scenario.entities {
            let col = project(entity.position.x, self.config.width);
            // Positive y is up; row 0 is the top line.
            let row = self.config.height - 1 - project(entity.position.y, self.config.height);
            let index = row * self.config.width + col;
            if grid.cells[index] != EMPTY_CELL {
                continue;
            }

            let glyph = glyph_for(&entity.name);
            grid.cells[index] = if entity.energy >= LOUD_ENERGY {
                glyph.to_ascii_uppercase()
            } else {
                glyph
            };
        }

        grid
    }
}

/// Map a coordinate in `[-WORLD_EXTENT, WORLD_EXTENT]` onto `0..cells`.
fn project(value: f32, cells: usize) -> usize {
    let unit = ((value + WORLD_EXTENT) / (2.0 * WORLD_EXTENT)).clamp(0.0, 1.0);
    (unit * (cells - 1) as f32).round() as usize
}
