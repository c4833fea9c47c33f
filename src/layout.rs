//! Layout model - the outer warehouse grid
//!
//! A layout is a named rectangle of `rows x columns` cells. Groups are
//! anchored at individual cells; the layout itself stores nothing else.

use serde::{Deserialize, Serialize};

/// A named rectangular warehouse grid.
///
/// Layouts are immutable once created: there is no update operation, only
/// deletion, which cascades to every group and location beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// Auto-assigned identifier
    pub id: i64,
    /// Display name (non-empty)
    pub name: String,
    /// Grid height, at least 1
    pub rows: u32,
    /// Grid width, at least 1
    pub columns: u32,
    /// Creation time, unix epoch milliseconds
    pub created_at: i64,
}

impl Layout {
    /// Total number of cells in the grid
    pub fn cell_count(&self) -> u64 {
        self.rows as u64 * self.columns as u64
    }

    /// Check whether a 1-based (row, column) position falls inside the grid
    pub fn contains_position(&self, row: u32, column: u32) -> bool {
        (1..=self.rows).contains(&row) && (1..=self.columns).contains(&column)
    }
}
