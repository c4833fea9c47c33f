//! SQLite storage implementation

use super::schema;
use crate::group::Group;
use crate::layout::Layout;
use crate::location::Location;
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// SQLite-backed store for layouts, groups, and locations.
///
/// The store is a plain handle object: open one per database file (or one
/// in-memory per test) and pass it to whoever needs it. It performs no
/// validation of names, dimensions, or positions; that is the planner's job.
#[derive(Debug)]
pub struct WarehouseStore {
    conn: Connection,
}

impl WarehouseStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        tracing::info!("Opening warehouse store at {}", path.display());
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        store.note_if_empty()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        store.note_if_empty()?;
        Ok(store)
    }

    /// Initialize the database schema and stamp the schema version
    fn initialize_schema(&self) -> Result<()> {
        let version = self.schema_version()?;
        if version > schema::SCHEMA_VERSION {
            return Err(Error::SchemaVersion {
                found: version,
                supported: schema::SCHEMA_VERSION,
            });
        }
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        if version < schema::SCHEMA_VERSION {
            self.conn
                .pragma_update(None, "user_version", schema::SCHEMA_VERSION)?;
        }
        Ok(())
    }

    /// Read the schema version from `PRAGMA user_version`
    pub fn schema_version(&self) -> Result<i32> {
        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    // Startup hook: an empty store only logs a notice, it is never seeded.
    fn note_if_empty(&self) -> Result<()> {
        if self.count_layouts()? == 0 {
            tracing::info!("Warehouse store holds no layouts yet");
        }
        Ok(())
    }

    // ========== Layout Operations ==========

    /// Insert a layout and return its new identifier.
    ///
    /// The creation timestamp is assigned here. No validation is performed.
    pub fn create_layout(&self, name: &str, rows: u32, columns: u32) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO layouts (name, rows, columns, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![name, rows, columns, now_millis()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get all layouts, most recently created first
    pub fn get_layouts(&self) -> Result<Vec<Layout>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, rows, columns, created_at FROM layouts
             ORDER BY created_at DESC, id DESC",
        )?;

        let layouts = stmt
            .query_map([], |row| self.row_to_layout(row))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(layouts)
    }

    /// Get a layout by id
    pub fn get_layout_by_id(&self, id: i64) -> Result<Option<Layout>> {
        self.conn
            .query_row(
                "SELECT id, name, rows, columns, created_at FROM layouts WHERE id = ?1",
                [id],
                |row| self.row_to_layout(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Delete a layout together with all its groups and their locations.
    ///
    /// Children go first, and the whole cascade runs in one transaction, so
    /// a failure partway can never leave dangling foreign keys behind.
    pub fn delete_layout(&self, id: i64) -> Result<()> {
        self.begin_transaction()?;
        let result = self.delete_layout_cascade(id);
        self.finish_transaction(result)
    }

    fn delete_layout_cascade(&self, id: i64) -> Result<()> {
        let locations = self
            .conn
            .execute("DELETE FROM locations WHERE layout_id = ?1", [id])?;
        let groups = self
            .conn
            .execute("DELETE FROM groups WHERE layout_id = ?1", [id])?;
        self.conn.execute("DELETE FROM layouts WHERE id = ?1", [id])?;
        tracing::debug!(
            "Deleted layout {} ({} groups, {} locations)",
            id,
            groups,
            locations
        );
        Ok(())
    }

    /// Count all layouts
    pub fn count_layouts(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM layouts", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Helper to convert a row to a Layout
    fn row_to_layout(&self, row: &rusqlite::Row) -> rusqlite::Result<Layout> {
        Ok(Layout {
            id: row.get(0)?,
            name: row.get(1)?,
            rows: row.get(2)?,
            columns: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    // ========== Group Operations ==========

    /// Insert a group and return its new identifier.
    ///
    /// `row`/`column` are the group's 1-based anchor cell in the parent
    /// layout; `rows`/`columns` are its own grid. No range checks here.
    pub fn create_group(
        &self,
        name: &str,
        layout_id: i64,
        column: u32,
        row: u32,
        rows: u32,
        columns: u32,
    ) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO groups (layout_id, name, "row", "column", rows, columns, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![layout_id, name, row, column, rows, columns, now_millis()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get all groups of a layout, in storage order
    pub fn get_groups_by_layout_id(&self, layout_id: i64) -> Result<Vec<Group>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, layout_id, name, "row", "column", rows, columns, created_at
               FROM groups WHERE layout_id = ?1"#,
        )?;

        let groups = stmt
            .query_map([layout_id], |row| self.row_to_group(row))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(groups)
    }

    /// Get a group by id
    pub fn get_group_by_id(&self, id: i64) -> Result<Option<Group>> {
        self.conn
            .query_row(
                r#"SELECT id, layout_id, name, "row", "column", rows, columns, created_at
                   FROM groups WHERE id = ?1"#,
                [id],
                |row| self.row_to_group(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Delete a group and all its locations in one transaction
    pub fn delete_group(&self, id: i64) -> Result<()> {
        self.begin_transaction()?;
        let result = self.delete_group_cascade(id);
        self.finish_transaction(result)
    }

    fn delete_group_cascade(&self, id: i64) -> Result<()> {
        let locations = self
            .conn
            .execute("DELETE FROM locations WHERE group_id = ?1", [id])?;
        self.conn.execute("DELETE FROM groups WHERE id = ?1", [id])?;
        tracing::debug!("Deleted group {} ({} locations)", id, locations);
        Ok(())
    }

    /// Count all groups
    pub fn count_groups(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM groups", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Helper to convert a row to a Group
    fn row_to_group(&self, row: &rusqlite::Row) -> rusqlite::Result<Group> {
        Ok(Group {
            id: row.get(0)?,
            layout_id: row.get(1)?,
            name: row.get(2)?,
            row: row.get(3)?,
            column: row.get(4)?,
            rows: row.get(5)?,
            columns: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    // ========== Location Operations ==========

    /// Insert a single location and return its new identifier.
    ///
    /// The caller owns grid generation and address uniqueness; the store
    /// only rejects a duplicate (group, row, column) cell.
    pub fn create_location(
        &self,
        group_id: i64,
        layout_id: i64,
        row: u32,
        column: u32,
        address: &str,
        is_occupied: bool,
    ) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO locations (group_id, layout_id, "row", "column", address, is_occupied)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![group_id, layout_id, row, column, address, is_occupied],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get all locations of a group
    pub fn get_locations_by_group_id(&self, group_id: i64) -> Result<Vec<Location>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, group_id, layout_id, "row", "column", address, is_occupied
               FROM locations WHERE group_id = ?1"#,
        )?;

        let locations = stmt
            .query_map([group_id], |row| self.row_to_location(row))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(locations)
    }

    /// Get all locations of a layout (via the denormalized layout id)
    pub fn get_locations_by_layout_id(&self, layout_id: i64) -> Result<Vec<Location>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, group_id, layout_id, "row", "column", address, is_occupied
               FROM locations WHERE layout_id = ?1"#,
        )?;

        let locations = stmt
            .query_map([layout_id], |row| self.row_to_location(row))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(locations)
    }

    /// Get a location by id
    pub fn get_location_by_id(&self, id: i64) -> Result<Option<Location>> {
        self.conn
            .query_row(
                r#"SELECT id, group_id, layout_id, "row", "column", address, is_occupied
                   FROM locations WHERE id = ?1"#,
                [id],
                |row| self.row_to_location(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Set a location's occupancy flag, leaving every other field untouched
    pub fn set_location_occupied(&self, id: i64, occupied: bool) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE locations SET is_occupied = ?1 WHERE id = ?2",
            params![occupied, id],
        )?;
        if changed == 0 {
            return Err(Error::LocationNotFound(id));
        }
        Ok(())
    }

    /// Delete a single location
    pub fn delete_location(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM locations WHERE id = ?1", [id])?;
        Ok(())
    }

    /// Count all locations
    pub fn count_locations(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM locations", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Count occupied locations
    pub fn count_occupied(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM locations WHERE is_occupied = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Helper to convert a row to a Location
    fn row_to_location(&self, row: &rusqlite::Row) -> rusqlite::Result<Location> {
        Ok(Location {
            id: row.get(0)?,
            group_id: row.get(1)?,
            layout_id: row.get(2)?,
            row: row.get(3)?,
            column: row.get(4)?,
            address: row.get(5)?,
            is_occupied: row.get(6)?,
        })
    }

    // ========== Transactions & Maintenance ==========

    /// Begin a transaction for multi-statement operations
    pub fn begin_transaction(&self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    /// Commit a transaction
    pub fn commit(&self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    /// Rollback a transaction
    pub fn rollback(&self) -> Result<()> {
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }

    /// Commit on success, roll back (best effort) on failure
    fn finish_transaction(&self, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => self.commit(),
            Err(e) => {
                let _ = self.rollback();
                Err(e)
            }
        }
    }

    /// Delete all data, children first
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM locations", [])?;
        self.conn.execute("DELETE FROM groups", [])?;
        self.conn.execute("DELETE FROM layouts", [])?;
        Ok(())
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            layouts: self.count_layouts()?,
            groups: self.count_groups()?,
            locations: self.count_locations()?,
            occupied: self.count_occupied()?,
        })
    }

    /// Scan for rows that violate the ownership chain.
    ///
    /// Integrity is maintained by disciplined child-first call order, not by
    /// enforced constraints, so this scan is the check that the discipline
    /// held: it finds groups without a layout, locations without a group or
    /// layout, and locations whose denormalized layout id disagrees with
    /// their group's.
    pub fn scan_orphans(&self) -> Result<OrphanReport> {
        let orphaned_groups: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM groups g
             WHERE NOT EXISTS (SELECT 1 FROM layouts l WHERE l.id = g.layout_id)",
            [],
            |row| row.get(0),
        )?;

        let orphaned_locations: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM locations x
             WHERE NOT EXISTS (SELECT 1 FROM groups g WHERE g.id = x.group_id)
                OR NOT EXISTS (SELECT 1 FROM layouts l WHERE l.id = x.layout_id)",
            [],
            |row| row.get(0),
        )?;

        let mismatched_locations: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM locations x
             JOIN groups g ON g.id = x.group_id
             WHERE g.layout_id <> x.layout_id",
            [],
            |row| row.get(0),
        )?;

        Ok(OrphanReport {
            orphaned_groups: orphaned_groups as usize,
            orphaned_locations: orphaned_locations as usize,
            mismatched_locations: mismatched_locations as usize,
        })
    }
}

/// Current unix time in milliseconds (0 if the clock predates the epoch)
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub layouts: usize,
    pub groups: usize,
    pub locations: usize,
    pub occupied: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Store Statistics:")?;
        writeln!(f, "  Layouts: {}", self.layouts)?;
        writeln!(f, "  Groups: {}", self.groups)?;
        writeln!(f, "  Locations: {}", self.locations)?;
        writeln!(f, "  Occupied: {}", self.occupied)
    }
}

/// Result of an ownership integrity scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanReport {
    /// Groups whose layout no longer exists
    pub orphaned_groups: usize,
    /// Locations whose group or layout no longer exists
    pub orphaned_locations: usize,
    /// Locations whose denormalized layout id disagrees with their group's
    pub mismatched_locations: usize,
}

impl OrphanReport {
    /// True when the ownership chain is fully intact
    pub fn is_clean(&self) -> bool {
        self.orphaned_groups == 0
            && self.orphaned_locations == 0
            && self.mismatched_locations == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_layout(rows: u32, columns: u32) -> (WarehouseStore, i64) {
        let store = WarehouseStore::open_in_memory().unwrap();
        let id = store.create_layout("Main hall", rows, columns).unwrap();
        (store, id)
    }

    #[test]
    fn test_layout_crud() {
        let store = WarehouseStore::open_in_memory().unwrap();

        let id = store.create_layout("Cold storage", 4, 6).unwrap();

        let layout = store.get_layout_by_id(id).unwrap().unwrap();
        assert_eq!(layout.name, "Cold storage");
        assert_eq!(layout.rows, 4);
        assert_eq!(layout.columns, 6);
        assert!(layout.created_at > 0);
    }

    #[test]
    fn test_missing_layout() {
        let store = WarehouseStore::open_in_memory().unwrap();
        assert!(store.get_layout_by_id(999).unwrap().is_none());
    }

    #[test]
    fn test_layouts_most_recent_first() {
        let store = WarehouseStore::open_in_memory().unwrap();

        let a = store.create_layout("a", 1, 1).unwrap();
        let b = store.create_layout("b", 1, 1).unwrap();
        let c = store.create_layout("c", 1, 1).unwrap();

        let ids: Vec<i64> = store.get_layouts().unwrap().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![c, b, a]);
    }

    #[test]
    fn test_group_crud() {
        let (store, layout_id) = store_with_layout(4, 6);

        let id = store
            .create_group("BULK", layout_id, 2, 1, 3, 5)
            .unwrap();

        let group = store.get_group_by_id(id).unwrap().unwrap();
        assert_eq!(group.name, "BULK");
        assert_eq!(group.layout_id, layout_id);
        assert_eq!(group.row, 1);
        assert_eq!(group.column, 2);
        assert_eq!(group.rows, 3);
        assert_eq!(group.columns, 5);

        let groups = store.get_groups_by_layout_id(layout_id).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0], group);
    }

    #[test]
    fn test_location_occupancy_update() {
        let (store, layout_id) = store_with_layout(4, 6);
        let group_id = store.create_group("A", layout_id, 1, 1, 2, 2).unwrap();

        let id = store
            .create_location(group_id, layout_id, 0, 1, "A-1-2", false)
            .unwrap();
        let before = store.get_location_by_id(id).unwrap().unwrap();

        store.set_location_occupied(id, true).unwrap();

        let after = store.get_location_by_id(id).unwrap().unwrap();
        assert!(after.is_occupied);
        // everything except the flag is untouched
        assert_eq!(after.address, before.address);
        assert_eq!(after.row, before.row);
        assert_eq!(after.column, before.column);
        assert_eq!(after.group_id, before.group_id);
        assert_eq!(after.layout_id, before.layout_id);
    }

    #[test]
    fn test_occupancy_update_missing_location() {
        let store = WarehouseStore::open_in_memory().unwrap();
        let err = store.set_location_occupied(42, true).unwrap_err();
        assert!(matches!(err, Error::LocationNotFound(42)));
    }

    #[test]
    fn test_duplicate_cell_rejected() {
        let (store, layout_id) = store_with_layout(4, 6);
        let group_id = store.create_group("A", layout_id, 1, 1, 2, 2).unwrap();

        store
            .create_location(group_id, layout_id, 0, 0, "A-1-1", false)
            .unwrap();
        assert!(
            store
                .create_location(group_id, layout_id, 0, 0, "A-1-1", false)
                .is_err()
        );
    }

    #[test]
    fn test_cascade_delete_layout() {
        let (store, doomed) = store_with_layout(4, 6);
        let survivor = store.create_layout("Annex", 2, 2).unwrap();

        let g1 = store.create_group("A", doomed, 1, 1, 2, 2).unwrap();
        let g2 = store.create_group("B", doomed, 2, 1, 1, 1).unwrap();
        let g3 = store.create_group("C", survivor, 1, 1, 1, 1).unwrap();
        store.create_location(g1, doomed, 0, 0, "A-1-1", false).unwrap();
        store.create_location(g2, doomed, 0, 0, "B-1-1", true).unwrap();
        store.create_location(g3, survivor, 0, 0, "C-1-1", false).unwrap();

        store.delete_layout(doomed).unwrap();

        assert!(store.get_layout_by_id(doomed).unwrap().is_none());
        assert!(store.get_groups_by_layout_id(doomed).unwrap().is_empty());
        assert!(store.get_locations_by_layout_id(doomed).unwrap().is_empty());
        assert!(store.get_locations_by_group_id(g1).unwrap().is_empty());

        // the sibling layout keeps its rows
        assert_eq!(store.get_groups_by_layout_id(survivor).unwrap().len(), 1);
        assert_eq!(store.get_locations_by_group_id(g3).unwrap().len(), 1);
    }

    #[test]
    fn test_cascade_delete_group_spares_siblings() {
        let (store, layout_id) = store_with_layout(4, 6);

        let doomed = store.create_group("A", layout_id, 1, 1, 1, 2).unwrap();
        let sibling = store.create_group("B", layout_id, 2, 1, 1, 2).unwrap();
        store.create_location(doomed, layout_id, 0, 0, "A-1-1", false).unwrap();
        store.create_location(doomed, layout_id, 0, 1, "A-1-2", false).unwrap();
        store.create_location(sibling, layout_id, 0, 0, "B-1-1", false).unwrap();

        store.delete_group(doomed).unwrap();

        assert!(store.get_group_by_id(doomed).unwrap().is_none());
        assert!(store.get_locations_by_group_id(doomed).unwrap().is_empty());
        assert_eq!(store.get_locations_by_group_id(sibling).unwrap().len(), 1);
    }

    #[test]
    fn test_stats() {
        let (store, layout_id) = store_with_layout(4, 6);
        let group_id = store.create_group("A", layout_id, 1, 1, 1, 2).unwrap();
        store.create_location(group_id, layout_id, 0, 0, "A-1-1", true).unwrap();
        store.create_location(group_id, layout_id, 0, 1, "A-1-2", false).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.layouts, 1);
        assert_eq!(stats.groups, 1);
        assert_eq!(stats.locations, 2);
        assert_eq!(stats.occupied, 1);
    }

    #[test]
    fn test_orphan_scan() {
        let (store, layout_id) = store_with_layout(4, 6);
        let group_id = store.create_group("A", layout_id, 1, 1, 1, 1).unwrap();
        store.create_location(group_id, layout_id, 0, 0, "A-1-1", false).unwrap();

        assert!(store.scan_orphans().unwrap().is_clean());

        // a location pointing at a group that was never created
        store.create_location(777, layout_id, 0, 0, "GHOST-1-1", false).unwrap();
        // a location whose denormalized layout id disagrees with its group
        store.create_location(group_id, 888, 0, 1, "A-1-2", false).unwrap();

        let report = store.scan_orphans().unwrap();
        assert_eq!(report.orphaned_groups, 0);
        assert_eq!(report.orphaned_locations, 2);
        assert_eq!(report.mismatched_locations, 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_clear_all() {
        let (store, layout_id) = store_with_layout(4, 6);
        let group_id = store.create_group("A", layout_id, 1, 1, 1, 1).unwrap();
        store.create_location(group_id, layout_id, 0, 0, "A-1-1", false).unwrap();

        store.clear_all().unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.layouts, 0);
        assert_eq!(stats.groups, 0);
        assert_eq!(stats.locations, 0);
    }

    #[test]
    fn test_schema_version_stamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warehouse.db");

        {
            let store = WarehouseStore::open(&path).unwrap();
            assert_eq!(store.schema_version().unwrap(), schema::SCHEMA_VERSION);
        }

        // the stamp survives on disk
        let conn = Connection::open(&path).unwrap();
        let version: i32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, schema::SCHEMA_VERSION);
    }

    #[test]
    fn test_newer_schema_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warehouse.db");

        {
            let conn = Connection::open(&path).unwrap();
            conn.pragma_update(None, "user_version", 99).unwrap();
        }

        let err = WarehouseStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::SchemaVersion { found: 99, .. }));
    }
}
