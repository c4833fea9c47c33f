//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - layouts(id, name, rows, columns, created_at)
//! - groups(id, layout_id, name, row, column, rows, columns, created_at)
//! - locations(id, group_id, layout_id, row, column, address, is_occupied)

pub mod schema;
pub mod sqlite;

pub use sqlite::{OrphanReport, StoreStats, WarehouseStore};
