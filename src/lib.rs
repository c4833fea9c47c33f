//! # Rackmap - Warehouse layout and slot-occupancy store
//!
//! Rackmap models a warehouse as rectangular grids and keeps every slot's
//! occupancy in an embedded SQLite database.
//!
//! Rackmap provides:
//! - Named rectangular layouts (the outer warehouse grid)
//! - Slot groups anchored at a cell of a layout, each with its own grid
//! - One addressed location per group cell, generated in bulk at group
//!   creation
//! - Occupancy toggling, cascading deletes, and an on-demand integrity scan
//!
//! The [`WarehouseStore`] is a plain handle around one database connection;
//! the [`Planner`] layers validation and bulk location generation on top of
//! it. Consumers (a visualization screen, typically) use the planner for
//! anything user-initiated and the store for raw reads.

pub mod config;
pub mod group;
pub mod layout;
pub mod location;
pub mod planner;
pub mod storage;

// Re-exports for convenient access
pub use group::Group;
pub use layout::Layout;
pub use location::{AddressFormat, Location};
pub use planner::{GroupSpec, Planner};
pub use storage::WarehouseStore;

/// Result type alias for Rackmap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Rackmap operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Layout not found: {0}")]
    LayoutNotFound(i64),

    #[error("Group not found: {0}")]
    GroupNotFound(i64),

    #[error("Location not found: {0}")]
    LocationNotFound(i64),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Position out of range: {0}")]
    OutOfRange(String),

    #[error("Unknown address format: {0}")]
    UnknownAddressFormat(String),

    #[error("Unsupported schema version {found} (this build supports up to {supported})")]
    SchemaVersion { found: i32, supported: i32 },
}
