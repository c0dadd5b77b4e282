//! Key-value store database schema.

/// SQL to create the field-record table.
pub const CREATE_FIELDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS kv_fields (
    key   TEXT NOT NULL,
    field TEXT NOT NULL,
    value BLOB NOT NULL,
    PRIMARY KEY (key, field)
)
";

/// SQL to create the list-record table.
pub const CREATE_LISTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS kv_lists (
    key      TEXT NOT NULL,
    position INTEGER NOT NULL,
    value    TEXT NOT NULL,
    PRIMARY KEY (key, position)
)
";
