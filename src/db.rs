use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const SCHEMA: &str = include_str!("../db/schema.sql");

pub fn open_or_create(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(path)?;
    run_migrations(&conn)?;
    Ok(conn)
}

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Save a value under key, replacing whatever was there.
pub fn save_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let now = Utc::now().timestamp();
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3) ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, now],
    )?;
    Ok(())
}

pub fn load_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    Ok(load_entry(conn, key)?.map(|(value, _)| value))
}

/// Load a value together with its updated_at (epoch seconds)
pub fn load_entry(conn: &Connection, key: &str) -> Result<Option<(String, i64)>> {
    let mut stmt = conn.prepare("SELECT value, updated_at FROM kv_store WHERE key = ?1 LIMIT 1")?;
    let row = stmt
        .query_row(params![key], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))
        .optional()?;
    Ok(row)
}

/// Delete a key. Returns true if a row was removed.
pub fn delete_value(conn: &Connection, key: &str) -> Result<bool> {
    let removed = conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
    Ok(removed > 0)
}
