//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Nyaa-Mirror database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per catalog ID ever visited
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER NOT NULL PRIMARY KEY,
    deleted INTEGER NOT NULL DEFAULT 0,
    title TEXT,
    category TEXT,
    submitter TEXT,
    information TEXT,
    file_size INTEGER,
    date TEXT,
    seeders INTEGER,
    leechers INTEGER,
    completed INTEGER,
    info_hash TEXT,
    description TEXT,
    torrent_url TEXT,
    magnet_url TEXT,
    last_fetched TEXT
);

-- Comments, soft-deleted when they disappear from their post
CREATE TABLE IF NOT EXISTS comments (
    id INTEGER NOT NULL PRIMARY KEY,
    deleted INTEGER NOT NULL DEFAULT 0,
    submitter TEXT,
    content TEXT,
    date TEXT,
    edited_date TEXT,
    post_id INTEGER NOT NULL REFERENCES posts(id),
    last_fetched TEXT
);

CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id);

-- File listings (not populated yet)
CREATE TABLE IF NOT EXISTS folders (
    id INTEGER NOT NULL PRIMARY KEY,
    folder_name TEXT,
    post_id INTEGER NOT NULL REFERENCES posts(id)
);

CREATE TABLE IF NOT EXISTS files (
    file_name TEXT NOT NULL,
    file_size INTEGER NOT NULL,
    folder_id INTEGER NOT NULL REFERENCES folders(id),
    post_id INTEGER NOT NULL REFERENCES posts(id)
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
