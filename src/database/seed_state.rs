use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// When the demo catalog was last seeded into this database.
pub fn find_marker(conn: &Connection) -> Result<Option<DateTime<Utc>>> {
    let sql = "SELECT seeded_at FROM seed_state WHERE id = 1";

    conn.query_row(sql, [], |row| row.get(0))
        .optional()
        .context("Failed to read seed marker")
}

pub fn record_marker(conn: &Connection, seeded_at: DateTime<Utc>) -> Result<()> {
    let sql = "INSERT INTO seed_state (id, seeded_at) VALUES (1, ?1)
               ON CONFLICT(id) DO UPDATE SET seeded_at = excluded.seeded_at";

    conn.execute(sql, params![seeded_at])
        .context("Failed to record seed marker")?;
    Ok(())
}

pub fn clear_marker(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM seed_state", [])
        .context("Failed to clear seed marker")?;
    Ok(())
}
