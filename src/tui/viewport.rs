// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use ratatui::layout::Rect;

use crate::model::Point;

/// Diagram units covered by one terminal column.
pub const UNITS_PER_COLUMN: f64 = 8.0;
/// Diagram units covered by one terminal row.
pub const UNITS_PER_ROW: f64 = 16.0;

/// Maps between terminal cells inside `area` and diagram coordinates.
///
/// The top-left cell of `area` shows the diagram origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub area: Rect,
}

impl Viewport {
    pub fn new(area: Rect) -> Self {
        Self { area }
    }

    pub fn contains_cell(&self, column: u16, row: u16) -> bool {
        column >= self.area.x
            && row >= self.area.y
            && column < self.area.x.saturating_add(self.area.width)
            && row < self.area.y.saturating_add(self.area.height)
    }

    /// Diagram point at the center of a cell, `None` outside the viewport.
    pub fn cell_to_point(&self, column: u16, row: u16) -> Option<Point> {
        if !self.contains_cell(column, row) {
            return None;
        }
        let dx = f64::from(column - self.area.x);
        let dy = f64::from(row - self.area.y);
        Some(Point::new(
            (dx + 0.5) * UNITS_PER_COLUMN,
            (dy + 0.5) * UNITS_PER_ROW,
        ))
    }

    /// Fractional cell coordinates of `point`, in the same frame as `area`.
    pub fn cell_position(&self, point: Point) -> (f64, f64) {
        (
            point.x / UNITS_PER_COLUMN + f64::from(self.area.x),
            point.y / UNITS_PER_ROW + f64::from(self.area.y),
        )
    }

    /// Absolute cell containing `point`. May lie outside the viewport; clamped to
    /// ±[`CELL_LIMIT`] so callers can do plain `i64` arithmetic.
    pub fn point_to_cell(&self, point: Point) -> (i64, i64) {
        let (column, row) = self.cell_position(point);
        (clamp_cell(column.floor()), clamp_cell(row.floor()))
    }

    /// Last cell touched by a span ending (exclusive) at `point`.
    pub fn end_cell(&self, point: Point) -> (i64, i64) {
        let (column, row) = self.cell_position(point);
        (
            clamp_cell(column.ceil() - 1.0),
            clamp_cell(row.ceil() - 1.0),
        )
    }
}

/// Bound for cell coordinates handed out by [`Viewport`].
pub const CELL_LIMIT: i64 = 1 << 40;

fn clamp_cell(value: f64) -> i64 {
    // `as` saturates and maps NaN to 0.
    (value as i64).clamp(-CELL_LIMIT, CELL_LIMIT)
}
