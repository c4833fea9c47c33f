//! Database schema definitions

/// Schema version stamped into `PRAGMA user_version`
pub const SCHEMA_VERSION: i32 = 2;

/// SQL to create the layouts table
pub const CREATE_LAYOUTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS layouts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    rows INTEGER NOT NULL,
    columns INTEGER NOT NULL,
    created_at INTEGER NOT NULL
)
"#;

/// SQL to create the groups table
///
/// `row` and `column` are the group's 1-based anchor cell within the parent
/// layout; `rows` and `columns` are the group's own grid dimensions.
pub const CREATE_GROUPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    layout_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    "row" INTEGER NOT NULL,
    "column" INTEGER NOT NULL,
    rows INTEGER NOT NULL,
    columns INTEGER NOT NULL,
    created_at INTEGER NOT NULL
)
"#;

/// SQL to create the locations table
///
/// `layout_id` is denormalized from the owning group so the visualization
/// can scan a whole layout without joining. The unique constraint pins the
/// one-location-per-cell invariant at the storage level.
pub const CREATE_LOCATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS locations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    group_id INTEGER NOT NULL,
    layout_id INTEGER NOT NULL,
    "row" INTEGER NOT NULL,
    "column" INTEGER NOT NULL,
    address TEXT NOT NULL,
    is_occupied INTEGER NOT NULL DEFAULT 0,
    UNIQUE(group_id, "row", "column")
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_layouts_name ON layouts(name)",
    "CREATE INDEX IF NOT EXISTS idx_layouts_created ON layouts(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_groups_layout ON groups(layout_id)",
    "CREATE INDEX IF NOT EXISTS idx_groups_name ON groups(name)",
    "CREATE INDEX IF NOT EXISTS idx_groups_row ON groups(\"row\")",
    "CREATE INDEX IF NOT EXISTS idx_groups_column ON groups(\"column\")",
    "CREATE INDEX IF NOT EXISTS idx_groups_created ON groups(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_locations_group ON locations(group_id)",
    "CREATE INDEX IF NOT EXISTS idx_locations_layout ON locations(layout_id)",
    "CREATE INDEX IF NOT EXISTS idx_locations_row ON locations(\"row\")",
    "CREATE INDEX IF NOT EXISTS idx_locations_column ON locations(\"column\")",
    "CREATE INDEX IF NOT EXISTS idx_locations_address ON locations(address)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_LAYOUTS_TABLE,
        CREATE_GROUPS_TABLE,
        CREATE_LOCATIONS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
