// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

//! Text rendering for flow snapshots.
//!
//! The renderer produces a Unicode character canvas plus a cell index the
//! TUI uses for selection highlighting and the PNG exporter rasterizes.

use std::fmt;

pub mod flowchart;
mod text;

pub use flowchart::{render_flow, RenderedFlow, CELL_H_PX, CELL_W_PX};

/// A contiguous span of cells in one rendered line: `(y, x0, x1)`, inclusive.
pub type LineSpan = (usize, usize, usize);

/// An inclusive cell rectangle `(x0, y0, x1, y1)`.
pub type CellRect = (usize, usize, usize, usize);

pub const LINE_HORIZONTAL: char = '─';
pub const LINE_VERTICAL: char = '│';
pub const LINE_CROSS: char = '┼';
pub const ARROW_DOWN: char = '▼';

/// A fixed-size character grid that clips instead of failing.
///
/// Writes outside the grid are dropped; the two straight line characters
/// merge into a crossing when they meet, everything else overwrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasAreaOverflow {
    pub width: usize,
    pub height: usize,
}

impl fmt::Display for CanvasAreaOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "canvas area overflow ({}x{})", self.width, self.height)
    }
}

impl std::error::Error for CanvasAreaOverflow {}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Result<Self, CanvasAreaOverflow> {
        let len = width
            .checked_mul(height)
            .ok_or(CanvasAreaOverflow { width, height })?;
        Ok(Self {
            width,
            height,
            cells: vec![' '; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<char> {
        self.in_bounds(x, y).then(|| self.cells[y * self.width + x])
    }

    /// Writes `ch` at `(x, y)`, overwriting; out-of-bounds writes clip.
    pub fn put(&mut self, x: usize, y: usize, ch: char) {
        if !self.in_bounds(x, y) {
            return;
        }
        self.cells[y * self.width + x] = ch;
    }

    /// Writes a line character; straight lines merge into a crossing where
    /// they meet instead of overwriting each other.
    pub fn put_line(&mut self, x: usize, y: usize, ch: char) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = y * self.width + x;
        self.cells[idx] = match (self.cells[idx], ch) {
            (LINE_HORIZONTAL, LINE_VERTICAL) | (LINE_VERTICAL, LINE_HORIZONTAL) => LINE_CROSS,
            (LINE_CROSS, LINE_HORIZONTAL) | (LINE_CROSS, LINE_VERTICAL) => LINE_CROSS,
            _ => ch,
        };
    }

    /// Writes `text` left-to-right starting at `(x, y)`, clipping at the edge.
    pub fn put_str(&mut self, x: usize, y: usize, text: &str) {
        for (offset, ch) in text.chars().enumerate() {
            self.put(x + offset, y, ch);
        }
    }

    /// Draws a horizontal line over `x0..=x1` at `y` (either order).
    pub fn hline(&mut self, x0: usize, x1: usize, y: usize) {
        let (min_x, max_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        for x in min_x..=max_x {
            self.put_line(x, y, LINE_HORIZONTAL);
        }
    }

    /// Draws a vertical line over `y0..=y1` at `x` (either order).
    pub fn vline(&mut self, x: usize, y0: usize, y1: usize) {
        let (min_y, max_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        for y in min_y..=max_y {
            self.put_line(x, y, LINE_VERTICAL);
        }
    }
}
