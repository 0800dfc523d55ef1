//! Maze cell grid with pellet bookkeeping
//!
//! The grid is stored with a one-cell `Solid` border on every side. Callers
//! address cells in interior coordinates; the border offset stays in here.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Width of the solid border wrapped around the playable interior
const BORDER: usize = 1;

/// Kind of a single maze cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellKind {
    #[default]
    Solid,
    Empty,
    Pellet,
}

impl CellKind {
    /// Parse a level digit: 0 = solid, 1 = empty, 2 = pellet
    pub fn from_digit(c: char) -> Option<Self> {
        match c {
            '0' => Some(CellKind::Solid),
            '1' => Some(CellKind::Empty),
            '2' => Some(CellKind::Pellet),
            _ => None,
        }
    }

    pub fn is_solid(self) -> bool {
        self == CellKind::Solid
    }
}

/// The maze: bordered cell grid plus a running pellet count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridMap {
    width: usize,
    height: usize,
    /// `[row][col]`, `(height + 2) x (width + 2)` including the border
    cells: Vec<Vec<CellKind>>,
    pellet_count: usize,
}

impl GridMap {
    /// Parse level text (one row per line) into a bordered grid.
    ///
    /// Reads exactly `height` lines of `width` digits. Lines past `height`
    /// are ignored. Trailing whitespace on a line (e.g. `\r`) is tolerated.
    pub fn load(width: usize, height: usize, text: &str) -> SimResult<Self> {
        Self::from_rows(width, height, text.lines())
    }

    /// Build a grid from an iterator of digit rows
    pub fn from_rows<'a, I>(width: usize, height: usize, rows: I) -> SimResult<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if width == 0 || height == 0 {
            return Err(SimError::InvalidArgument(format!(
                "grid dimensions must be non-zero, got {width}x{height}"
            )));
        }

        // Border cells keep the default (Solid) kind
        let mut cells = vec![vec![CellKind::Solid; width + 2 * BORDER]; height + 2 * BORDER];
        let mut pellet_count = 0;
        let mut rows = rows.into_iter();

        for row in 0..height {
            let line = rows.next().ok_or_else(|| SimError::Format {
                line: row + 1,
                reason: format!("expected {height} rows, found {row}"),
            })?;
            let line = line.trim_end();
            let len = line.chars().count();
            if len != width {
                return Err(SimError::Format {
                    line: row + 1,
                    reason: format!("expected {width} cells, found {len}"),
                });
            }

            for (col, c) in line.chars().enumerate() {
                let kind = CellKind::from_digit(c).ok_or_else(|| SimError::Format {
                    line: row + 1,
                    reason: format!("invalid cell symbol {c:?} at column {}", col + 1),
                })?;
                if kind == CellKind::Pellet {
                    pellet_count += 1;
                }
                cells[row + BORDER][col + BORDER] = kind;
            }
        }

        Ok(Self {
            width,
            height,
            cells,
            pellet_count,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Map interior coordinates to storage indices.
    ///
    /// Accepts `0..=width` / `0..=height`; the upper bound lands on the
    /// right/bottom border so leading-edge probes can look one cell past
    /// the interior.
    fn index(&self, x: i32, y: i32) -> SimResult<(usize, usize)> {
        if x < 0 || y < 0 || x as usize > self.width || y as usize > self.height {
            return Err(SimError::OutOfRange { x, y });
        }
        Ok((y as usize + BORDER, x as usize + BORDER))
    }

    /// Kind of the cell at interior coordinates `(x, y)`
    pub fn cell_at(&self, x: i32, y: i32) -> SimResult<CellKind> {
        let (row, col) = self.index(x, y)?;
        Ok(self.cells[row][col])
    }

    /// Eat the pellet at `(x, y)` if there is one.
    ///
    /// Returns `true` only when a pellet was actually removed.
    pub fn consume_pellet(&mut self, x: i32, y: i32) -> SimResult<bool> {
        let (row, col) = self.index(x, y)?;
        if self.cells[row][col] != CellKind::Pellet {
            return Ok(false);
        }
        self.cells[row][col] = CellKind::Empty;
        self.pellet_count -= 1;
        Ok(true)
    }

    pub fn remaining_pellets(&self) -> usize {
        self.pellet_count
    }

    /// Debug cheat: empty every pellet except the last one in row-major order.
    ///
    /// Returns how many pellets were removed.
    pub fn clear_all_but_one(&mut self) -> usize {
        let mut cleared = 0;
        for row in self.cells.iter_mut().skip(BORDER).take(self.height) {
            for cell in row.iter_mut().skip(BORDER).take(self.width) {
                if self.pellet_count <= 1 {
                    return cleared;
                }
                if *cell == CellKind::Pellet {
                    *cell = CellKind::Empty;
                    self.pellet_count -= 1;
                    cleared += 1;
                }
            }
        }
        cleared
    }

    /// Count pellet cells by scanning the interior
    pub fn count_pellet_cells(&self) -> usize {
        self.cells
            .iter()
            .skip(BORDER)
            .take(self.height)
            .flat_map(|row| row.iter().skip(BORDER).take(self.width))
            .filter(|&&c| c == CellKind::Pellet)
            .count()
    }
}
