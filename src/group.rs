//! Group model - a named sub-grid anchored inside a layout
//!
//! A group occupies one cell of its parent layout (1-based `row`/`column`)
//! and carries its own internal grid of `rows x columns` slots. The internal
//! grid is independent of the parent's dimensions.

use serde::{Deserialize, Serialize};

/// A named block of slots placed at one cell of a layout.
///
/// Groups are created together with their full set of locations and are
/// never updated in place. Deleting a group removes its locations with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Auto-assigned identifier
    pub id: i64,
    /// Owning layout
    pub layout_id: i64,
    /// Display name, also the prefix of every slot address in the group
    pub name: String,
    /// 1-based row position within the parent layout
    pub row: u32,
    /// 1-based column position within the parent layout
    pub column: u32,
    /// Internal grid height, at least 1
    pub rows: u32,
    /// Internal grid width, at least 1
    pub columns: u32,
    /// Creation time, unix epoch milliseconds
    pub created_at: i64,
}

impl Group {
    /// Number of slots the group's grid holds (one location per slot)
    pub fn slot_count(&self) -> u64 {
        self.rows as u64 * self.columns as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_count() {
        let group = Group {
            id: 1,
            layout_id: 1,
            name: "BULK".to_string(),
            row: 1,
            column: 2,
            rows: 3,
            columns: 5,
            created_at: 0,
        };
        assert_eq!(group.slot_count(), 15);
    }
}
