//! SQL schema definitions for the card store.
//!
//! This module contains the SQL statements for creating the store and its
//! secondary indexes. Statements are grouped by the migration version that
//! introduced them.

/// SQL statement to create the cards store.
pub const CREATE_CARDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS cards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    profession TEXT NOT NULL DEFAULT '',
    title TEXT,
    address TEXT,
    email TEXT,
    phone TEXT,
    logo_url TEXT,
    qr_code_url TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// Non-unique index on `last_name` for prefix range scans.
pub const CREATE_LAST_NAME_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_cards_last_name ON cards(last_name)
";

/// Non-unique index on `profession` for prefix range scans.
pub const CREATE_PROFESSION_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_cards_profession ON cards(profession)
";

/// Non-unique index on `created_at` for the default listing order.
pub const CREATE_CREATED_AT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_cards_created_at ON cards(created_at)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Structural statements introduced by schema version 1: the cards store and
/// its three secondary indexes.
pub const V1_STATEMENTS: &[&str] = &[
    CREATE_CARDS_TABLE,
    CREATE_LAST_NAME_INDEX,
    CREATE_PROFESSION_INDEX,
    CREATE_CREATED_AT_INDEX,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v1_statements_not_empty() {
        assert!(!V1_STATEMENTS.is_empty());
        for stmt in V1_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_create_cards_table_contains_required_columns() {
        assert!(CREATE_CARDS_TABLE.contains("id INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(CREATE_CARDS_TABLE.contains("first_name TEXT NOT NULL"));
        assert!(CREATE_CARDS_TABLE.contains("last_name TEXT NOT NULL"));
        assert!(CREATE_CARDS_TABLE.contains("created_at TEXT NOT NULL"));
        assert!(CREATE_CARDS_TABLE.contains("updated_at TEXT NOT NULL"));
    }

    #[test]
    fn test_indexes_cover_search_and_listing_fields() {
        assert!(CREATE_LAST_NAME_INDEX.contains("cards(last_name)"));
        assert!(CREATE_PROFESSION_INDEX.contains("cards(profession)"));
        assert!(CREATE_CREATED_AT_INDEX.contains("cards(created_at)"));
    }

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }
}
