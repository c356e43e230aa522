//! Maps a layout's orientation and ordered rows onto a concrete two-axis grid.
//!
//! A vertical layout stacks its rows top to bottom and lays each row's children out
//! left to right. A horizontal layout places its rows side by side as columns and
//! stacks each row's children top to bottom inside its column.

use serde::Serialize;

use crate::protocol::{ElementId, Layout, Orientation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub id: ElementId,
    pub column: usize,
    pub row: usize,
}

/// One declared row after arrangement: a horizontal run for vertical layouts,
/// a column for horizontal ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub axis: Axis,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Arrangement {
    /// Direction in which lines are stacked.
    pub outer: Axis,
    pub lines: Vec<Line>,
    pub columns: usize,
    pub rows: usize,
}

impl Arrangement {
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.cells.is_empty())
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.lines.iter().flat_map(|line| line.cells.iter())
    }

    pub fn cell_at(&self, column: usize, row: usize) -> Option<&Cell> {
        self.cells().find(|cell| cell.column == column && cell.row == row)
    }

    pub fn cell_for(&self, id: ElementId) -> Option<&Cell> {
        self.cells().find(|cell| cell.id == id)
    }
}

pub fn arrange(layout: &Layout) -> Arrangement {
    let outer = match layout.orientation {
        Orientation::Vertical => Axis::Vertical,
        Orientation::Horizontal => Axis::Horizontal,
    };

    let mut columns = 0;
    let mut rows = 0;
    let mut lines = Vec::with_capacity(layout.rows.len());

    for (line_index, declared) in layout.rows.iter().enumerate() {
        let mut cells = Vec::with_capacity(declared.children.len());
        // Unsupported elements take no slot.
        let mut slot = 0;
        for (index, element) in declared.children.iter().enumerate() {
            if !element.is_supported() {
                continue;
            }
            let (column, row) = match outer {
                Axis::Vertical => (slot, line_index),
                Axis::Horizontal => (line_index, slot),
            };
            columns = columns.max(column + 1);
            rows = rows.max(row + 1);
            cells.push(Cell {
                id: ElementId::new(line_index, index),
                column,
                row,
            });
            slot += 1;
        }
        lines.push(Line {
            axis: outer.cross(),
            cells,
        });
    }

    Arrangement {
        outer,
        lines,
        columns,
        rows,
    }
}

#[cfg(test)]
#[path = "tests/layout_tests.rs"]
mod tests;
