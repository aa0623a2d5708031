pub const SCHEMA_VERSION: i32 = 2;

pub const SCHEMA_V1: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL
);

-- One row per storage key; value is the raw string (JSON for collections)
CREATE TABLE IF NOT EXISTS local_storage (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// V2 migration: remember when each key was last written
pub const MIGRATION_V2: &str = r#"
ALTER TABLE local_storage ADD COLUMN updated_at TEXT;
"#;
