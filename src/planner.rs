//! Planner - validated warehouse operations above the storage layer
//!
//! The store inserts whatever it is given. The planner is where user input
//! gets checked (names, dimensions, placement) before anything touches the
//! database, and where a new group is expanded into its full grid of
//! addressed locations.

use crate::group::Group;
use crate::layout::Layout;
use crate::location::{AddressFormat, Location};
use crate::storage::WarehouseStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Everything needed to create a group and its locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSpec {
    /// Display name, also the prefix of every generated address
    pub name: String,
    /// Parent layout
    pub layout_id: i64,
    /// 1-based anchor row within the parent layout
    pub row: u32,
    /// 1-based anchor column within the parent layout
    pub column: u32,
    /// Internal grid height
    pub rows: u32,
    /// Internal grid width
    pub columns: u32,
    /// Scheme used to synthesize the slot addresses
    pub address_format: AddressFormat,
}

/// Validated operations over a warehouse store
pub struct Planner<'a> {
    store: &'a WarehouseStore,
}

impl<'a> Planner<'a> {
    /// Create a new planner over a store
    pub fn new(store: &'a WarehouseStore) -> Self {
        Self { store }
    }

    /// Create a layout after validating its name and dimensions
    pub fn create_layout(&self, name: &str, rows: u32, columns: u32) -> Result<Layout> {
        let name = validated_name(name)?;
        validate_dimensions("layout", rows, columns)?;

        let id = self.store.create_layout(&name, rows, columns)?;
        self.store
            .get_layout_by_id(id)?
            .ok_or(Error::LayoutNotFound(id))
    }

    /// Create a group and the full grid of locations behind it.
    ///
    /// One location is generated per cell of `[0, rows) x [0, columns)`,
    /// all empty, with addresses synthesized by the requested format. The
    /// group row and the location rows are written in a single transaction;
    /// a failure partway leaves the store exactly as it was.
    pub fn create_group(&self, spec: &GroupSpec) -> Result<Group> {
        let name = validated_name(&spec.name)?;
        validate_dimensions("group", spec.rows, spec.columns)?;

        let layout = self
            .store
            .get_layout_by_id(spec.layout_id)?
            .ok_or(Error::LayoutNotFound(spec.layout_id))?;
        if !layout.contains_position(spec.row, spec.column) {
            return Err(Error::OutOfRange(format!(
                "group anchor ({}, {}) is outside layout '{}' ({} rows x {} columns)",
                spec.row, spec.column, layout.name, layout.rows, layout.columns
            )));
        }

        self.store.begin_transaction()?;
        match self.insert_group_and_locations(&name, &layout, spec) {
            Ok(group_id) => {
                self.store.commit()?;
                self.store
                    .get_group_by_id(group_id)?
                    .ok_or(Error::GroupNotFound(group_id))
            }
            Err(e) => {
                let _ = self.store.rollback();
                Err(e)
            }
        }
    }

    fn insert_group_and_locations(
        &self,
        name: &str,
        layout: &Layout,
        spec: &GroupSpec,
    ) -> Result<i64> {
        let group_id = self.store.create_group(
            name,
            layout.id,
            spec.column,
            spec.row,
            spec.rows,
            spec.columns,
        )?;

        for row in 0..spec.rows {
            for column in 0..spec.columns {
                let address = spec.address_format.address(name, row, column);
                self.store
                    .create_location(group_id, layout.id, row, column, &address, false)?;
            }
        }

        tracing::debug!(
            "Created group {} with {} locations",
            group_id,
            spec.rows * spec.columns
        );
        Ok(group_id)
    }

    /// Flip a location's occupancy flag and return the updated row
    pub fn toggle_location(&self, id: i64) -> Result<Location> {
        let location = self
            .store
            .get_location_by_id(id)?
            .ok_or(Error::LocationNotFound(id))?;
        self.store.set_location_occupied(id, !location.is_occupied)?;
        self.store
            .get_location_by_id(id)?
            .ok_or(Error::LocationNotFound(id))
    }

    /// Delete a layout and everything beneath it
    pub fn delete_layout(&self, id: i64) -> Result<()> {
        self.store.delete_layout(id)
    }

    /// Delete a group and its locations
    pub fn delete_group(&self, id: i64) -> Result<()> {
        self.store.delete_group(id)
    }

    /// Delete a single location
    pub fn delete_location(&self, id: i64) -> Result<()> {
        self.store.delete_location(id)
    }
}

fn validated_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidName("name must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

fn validate_dimensions(what: &str, rows: u32, columns: u32) -> Result<()> {
    if rows < 1 || columns < 1 {
        return Err(Error::InvalidDimensions(format!(
            "{} grid must be at least 1x1 (got {}x{})",
            what, rows, columns
        )));
    }
    Ok(())
}
