//! Location model and slot addressing
//!
//! Every cell of a group's grid gets exactly one location. Addresses are
//! synthesized from the group name and the cell's 0-based coordinates in one
//! of two formats:
//! - `RowColumn`: `BULK-2-3` (1-based row and column numbers)
//! - `LetterNumber`: `BULK-B-3` (spreadsheet-style row letters, 1-based
//!   column number)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Address synthesis scheme for the locations of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressFormat {
    /// `{group}-{row+1}-{column+1}`
    RowColumn,
    /// `{group}-{letters(row)}-{column+1}`
    LetterNumber,
}

impl AddressFormat {
    /// Get the string representation of the address format
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressFormat::RowColumn => "row-column",
            AddressFormat::LetterNumber => "letter-number",
        }
    }

    /// Get all address formats
    pub fn all() -> &'static [AddressFormat] {
        &[AddressFormat::RowColumn, AddressFormat::LetterNumber]
    }

    /// Render the address of one slot from its 0-based grid coordinates.
    pub fn address(&self, group_name: &str, row: u32, column: u32) -> String {
        match self {
            AddressFormat::RowColumn => {
                format!("{}-{}-{}", group_name, row + 1, column + 1)
            }
            AddressFormat::LetterNumber => {
                format!("{}-{}-{}", group_name, row_letters(row), column + 1)
            }
        }
    }
}

impl FromStr for AddressFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "row-column" | "rowcol" | "numeric" => Ok(AddressFormat::RowColumn),
            "letter-number" | "letter" | "alpha" => Ok(AddressFormat::LetterNumber),
            _ => Err(Error::UnknownAddressFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for AddressFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spreadsheet-style letters for a 0-based row index.
///
/// Rows 0..26 map to `A`..`Z`, then the sequence continues with `AA`, `AB`,
/// and so on, so tall groups still get unique, sortable-looking addresses.
pub fn row_letters(row: u32) -> String {
    let mut n = row as u64 + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.into_iter().rev().collect()
}

/// One addressable slot inside a group's grid.
///
/// Only `is_occupied` ever changes after creation; every other field is
/// fixed for the lifetime of the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Auto-assigned identifier
    pub id: i64,
    /// Owning group
    pub group_id: i64,
    /// Owning layout, denormalized from the group for direct lookup
    pub layout_id: i64,
    /// 0-based row within the group's grid
    pub row: u32,
    /// 0-based column within the group's grid
    pub column: u32,
    /// Human-readable slot address
    pub address: String,
    /// Whether the slot currently holds stock
    pub is_occupied: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_roundtrip() {
        for format in AddressFormat::all() {
            let s = format.as_str();
            let parsed: AddressFormat = s.parse().unwrap();
            assert_eq!(*format, parsed);
        }
    }

    #[test]
    fn test_format_aliases() {
        assert_eq!(
            AddressFormat::from_str("numeric").unwrap(),
            AddressFormat::RowColumn
        );
        assert_eq!(
            AddressFormat::from_str("letter").unwrap(),
            AddressFormat::LetterNumber
        );
        assert!(AddressFormat::from_str("hexagonal").is_err());
    }

    #[test]
    fn test_row_column_addresses() {
        let format = AddressFormat::RowColumn;
        assert_eq!(format.address("A", 0, 0), "A-1-1");
        assert_eq!(format.address("A", 1, 2), "A-2-3");
    }

    #[test]
    fn test_letter_number_addresses() {
        let format = AddressFormat::LetterNumber;
        assert_eq!(format.address("B", 0, 0), "B-A-1");
        assert_eq!(format.address("B", 1, 0), "B-B-1");
    }

    #[test]
    fn test_row_letters_past_alphabet() {
        assert_eq!(row_letters(0), "A");
        assert_eq!(row_letters(25), "Z");
        assert_eq!(row_letters(26), "AA");
        assert_eq!(row_letters(27), "AB");
        assert_eq!(row_letters(51), "AZ");
        assert_eq!(row_letters(52), "BA");
    }
}
