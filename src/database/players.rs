use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::optional_enum_column;
use crate::domain::Player;

pub fn insert_player(conn: &Connection, player: &Player, seed_key: Option<&str>) -> Result<()> {
    let sql = "INSERT INTO players (id, seed_key, nickname, level, position) VALUES (?1, ?2, ?3, ?4, ?5)";

    conn.execute(
        sql,
        params![
            player.id,
            seed_key,
            player.nickname,
            player.level,
            player.position.map(|p| p.slug()),
        ],
    )
    .context("Failed to insert player")?;

    Ok(())
}

/// Returns the player stored under `seed_key`, inserting `make()` when absent.
/// The boolean is true when a row was inserted.
pub fn ensure_seeded(
    conn: &Connection,
    seed_key: &str,
    make: impl FnOnce() -> Player,
) -> Result<(Player, bool)> {
    if let Some(existing) = find_by_seed_key(conn, seed_key)? {
        return Ok((existing, false));
    }

    let player = make();
    insert_player(conn, &player, Some(seed_key))?;
    Ok((player, true))
}

pub(crate) fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        nickname: row.get(1)?,
        level: row.get(2)?,
        position: optional_enum_column(row, 3)?,
    })
}

pub fn find_by_id(conn: &Connection, id: Uuid) -> Result<Option<Player>> {
    let sql = "SELECT id, nickname, level, position FROM players WHERE id = ?1";

    conn.query_row(sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

pub fn find_by_seed_key(conn: &Connection, seed_key: &str) -> Result<Option<Player>> {
    let sql = "SELECT id, nickname, level, position FROM players WHERE seed_key = ?1";

    conn.query_row(sql, params![seed_key], parse_player_row)
        .optional()
        .context("Failed to query player by seed key")
}

/// Nicknames are not unique; the earliest inserted match wins.
pub fn find_by_nickname(conn: &Connection, nickname: &str) -> Result<Option<Player>> {
    let sql = "SELECT id, nickname, level, position FROM players WHERE nickname = ?1 ORDER BY created_at, rowid LIMIT 1";

    conn.query_row(sql, params![nickname], parse_player_row)
        .optional()
        .context("Failed to query player by nickname")
}

/// All players, sorted by nickname.
pub fn list_all(conn: &Connection) -> Result<Vec<Player>> {
    let sql = "SELECT id, nickname, level, position FROM players ORDER BY nickname, rowid";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
