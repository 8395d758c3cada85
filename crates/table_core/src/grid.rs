//! Grid coordinate math shared by card placement and pointer picking.
//!
//! Every conversion between a `(row, col)` cell and a table-local position goes
//! through [`GridLayout`]. Card placement and the "cell under the pointer"
//! lookup both use it, so a card is always drawn in exactly the cell the store
//! says it occupies.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Card face width in world units.
pub const CARD_WIDTH: f32 = 0.895;
/// Card face height in world units.
pub const CARD_HEIGHT: f32 = 1.25;
/// Gap added around a card to form a grid cell.
pub const CELL_MARGIN: f32 = 0.05;
pub const GRID_COLS: u32 = 10;
pub const GRID_ROWS: u32 = 4;

/// An addressable slot of a table grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

impl Cell {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A straight grid line in table-local XZ coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub start: Vec2,
    pub end: Vec2,
}

/// Dimensions of a table grid, centred on the table's local origin.
///
/// Columns run along local X, rows along local Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    cols: u32,
    rows: u32,
    cell_width: f32,
    cell_height: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::from_card(GRID_COLS, GRID_ROWS, CARD_WIDTH, CARD_HEIGHT, CELL_MARGIN)
    }
}

impl GridLayout {
    /// Builds a grid whose cells are one card plus `margin` in each dimension.
    pub fn from_card(
        cols: u32,
        rows: u32,
        card_width: f32,
        card_height: f32,
        margin: f32,
    ) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
            cell_width: (card_width + margin).max(f32::EPSILON),
            cell_height: (card_height + margin).max(f32::EPSILON),
        }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cell_width(&self) -> f32 {
        self.cell_width
    }

    pub fn cell_height(&self) -> f32 {
        self.cell_height
    }

    pub fn cell_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Total extent of the grid (width along X, depth along Z).
    pub fn size(&self) -> Vec2 {
        Vec2::new(
            self.cols as f32 * self.cell_width,
            self.rows as f32 * self.cell_height,
        )
    }

    /// Local position of the grid's corner at `(row 0, col 0)`.
    pub fn origin(&self) -> Vec2 {
        -self.size() / 2.0
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Centre of `cell` in table-local XZ coordinates.
    pub fn cell_center(&self, cell: Cell) -> Vec2 {
        let origin = self.origin();
        Vec2::new(
            origin.x + cell.col as f32 * self.cell_width + self.cell_width / 2.0,
            origin.y + cell.row as f32 * self.cell_height + self.cell_height / 2.0,
        )
    }

    /// Cell containing the local XZ point, or `None` outside the grid.
    pub fn cell_at(&self, local: Vec2) -> Option<Cell> {
        let (col, row) = self.fractional_cell(local);
        if !col.is_finite() || !row.is_finite() || col < 0.0 || row < 0.0 {
            return None;
        }
        let cell = Cell::new(row as u32, col as u32);
        self.contains(cell).then_some(cell)
    }

    fn fractional_cell(&self, local: Vec2) -> (f32, f32) {
        let offset = local - self.origin();
        (
            (offset.x / self.cell_width).floor(),
            (offset.y / self.cell_height).floor(),
        )
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<> {
        let (rows, cols) = (self.rows, self.cols);
        (0..rows).flat_map(move |row| (0..cols).map(move |col| Cell::new(row, col)))
    }

    /// The `cols + 1` vertical and `rows + 1` horizontal lines outlining the grid.
    pub fn lines(&self) -> Vec<GridLine> {
        let origin = self.origin();
        let size = self.size();
        let vertical = (0..=self.cols).map(|c| {
            let x = origin.x + c as f32 * self.cell_width;
            GridLine {
                start: Vec2::new(x, origin.y),
                end: Vec2::new(x, origin.y + size.y),
            }
        });
        let horizontal = (0..=self.rows).map(|r| {
            let z = origin.y + r as f32 * self.cell_height;
            GridLine {
                start: Vec2::new(origin.x, z),
                end: Vec2::new(origin.x + size.x, z),
            }
        });
        vertical.chain(horizontal).collect()
    }
}
