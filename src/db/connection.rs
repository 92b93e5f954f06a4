use std::fs;

use rusqlite::Connection;
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::StoreError;

/// Single table, single column. The key doubles as the primary key, so the
/// implicit index is the only one; the CHECK keeps empty text out even when a
/// caller bypasses [`crate::Word`].
const CREATE_WORD_TABLE: &str = "CREATE TABLE IF NOT EXISTS word_table (
    word TEXT NOT NULL PRIMARY KEY CHECK (word <> '')
)";

/// Ensure the database file exists, create the table if needed, and return a
/// live connection. Any failure here is a construction failure for the store.
pub(crate) fn open_connection(config: &StoreConfig) -> Result<Connection, StoreError> {
    let db_path = config.path();

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| StoreError::construction(db_path, err))?;
    }

    let conn = Connection::open(db_path).map_err(|err| StoreError::construction(db_path, err))?;
    conn.execute(CREATE_WORD_TABLE, [])
        .map_err(|err| StoreError::construction(db_path, err))?;

    debug!(path = %db_path.display(), "word table ready");
    Ok(conn)
}
