//! SQL DDL for the conversation store.
//!
//! Each collection is a table of JSON documents keyed by an autoincrementing `seq`,
//! which is the replay order. `store_meta` holds the schema version and the embedding
//! model that produced the stored vectors. All DDL uses `IF NOT EXISTS`.

use rusqlite::{Connection, OptionalExtension};

pub const SCHEMA_VERSION: u32 = 1;

const META_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS store_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// `AUTOINCREMENT` keeps `seq` strictly increasing even if rows were ever removed
/// out of band, so ordering by it is insertion order.
fn collection_sql(collection: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {collection} (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            document TEXT NOT NULL
        );"
    )
}

/// Whether `name` can be spliced into SQL as a bare table name.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Initialize the metadata table and the given collection. Idempotent.
pub fn init_schema(conn: &Connection, collection: &str) -> rusqlite::Result<()> {
    conn.execute_batch(META_SQL)?;
    conn.execute_batch(&collection_sql(collection))?;

    conn.execute(
        "INSERT OR IGNORE INTO store_meta (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT value FROM store_meta WHERE key = 'schema_version'",
        [],
        |row| {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().unwrap_or(0))
        },
    )
}

/// Get the stored embedding model identifier, if any.
pub fn get_embedding_model(conn: &Connection) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM store_meta WHERE key = 'embedding_model'",
        [],
        |row| row.get::<_, String>(0),
    )
    .optional()
}

pub fn set_embedding_model(conn: &Connection, model: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO store_meta (key, value) VALUES ('embedding_model', ?1)",
        [model],
    )?;
    Ok(())
}
