use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::players::parse_player_row;
use super::{courts, enum_column};
use crate::domain::schedule::same_minute;
use crate::domain::{Game, GameKind, Player};

/// Stored game columns; court and roster are loaded separately.
struct GameRow {
    id: Uuid,
    kind: GameKind,
    scheduled_at: DateTime<Utc>,
    court_id: Uuid,
    creator_id: Uuid,
}

pub fn insert_game(conn: &Connection, game: &Game) -> Result<()> {
    let sql = "INSERT INTO games (id, kind, scheduled_at, court_id, creator_id) VALUES (?1, ?2, ?3, ?4, ?5)";

    conn.execute(
        sql,
        params![
            game.id,
            game.kind.slug(),
            game.scheduled_at,
            game.court.id,
            game.creator_id
        ],
    )
    .context("Failed to insert game")?;

    insert_roster(conn, game)
}

/// Rewrite the roster rows of `game` to match its in-memory player list.
pub fn replace_roster(conn: &Connection, game: &Game) -> Result<()> {
    conn.execute("DELETE FROM game_players WHERE game_id = ?1", params![game.id])
        .context("Failed to clear game roster")?;

    insert_roster(conn, game)
}

fn insert_roster(conn: &Connection, game: &Game) -> Result<()> {
    let sql = "INSERT INTO game_players (game_id, player_id, join_order) VALUES (?1, ?2, ?3)";
    let mut stmt = conn.prepare(sql)?;

    for (order, player) in game.players().iter().enumerate() {
        stmt.execute(params![game.id, player.id, order as i64])
            .with_context(|| format!("Failed to add player {} to game {}", player.id, game.id))?;
    }

    Ok(())
}

fn parse_game_row(row: &rusqlite::Row) -> rusqlite::Result<GameRow> {
    Ok(GameRow {
        id: row.get(0)?,
        kind: enum_column(row, 1)?,
        scheduled_at: row.get(2)?,
        court_id: row.get(3)?,
        creator_id: row.get(4)?,
    })
}

fn load_roster(conn: &Connection, game_id: Uuid) -> Result<Vec<Player>> {
    let sql = "SELECT p.id, p.nickname, p.level, p.position FROM game_players gp JOIN players p ON p.id = gp.player_id WHERE gp.game_id = ?1 ORDER BY gp.join_order";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![game_id], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn hydrate(conn: &Connection, row: GameRow) -> Result<Game> {
    let court = courts::find_by_id(conn, row.court_id)?
        .with_context(|| format!("Court {} of game {} is missing", row.court_id, row.id))?;
    let players = load_roster(conn, row.id)?;

    Ok(Game::with_id(
        row.id,
        row.kind,
        row.scheduled_at,
        court,
        players,
        row.creator_id,
    ))
}

pub fn find_by_id(conn: &Connection, id: Uuid) -> Result<Option<Game>> {
    let sql = "SELECT id, kind, scheduled_at, court_id, creator_id FROM games WHERE id = ?1";

    let row = conn
        .query_row(sql, params![id], parse_game_row)
        .optional()
        .context("Failed to query game by id")?;

    row.map(|r| hydrate(conn, r)).transpose()
}

/// All games, sorted by schedule.
pub fn list_all(conn: &Connection) -> Result<Vec<Game>> {
    let sql = "SELECT id, kind, scheduled_at, court_id, creator_id FROM games ORDER BY scheduled_at, rowid";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], parse_game_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter().map(|r| hydrate(conn, r)).collect()
}

/// Id of a game on `court_id` of `kind` scheduled within the same minute as
/// `scheduled_at`, if any.
pub fn find_in_slot(
    conn: &Connection,
    court_id: Uuid,
    kind: GameKind,
    scheduled_at: DateTime<Utc>,
) -> Result<Option<Uuid>> {
    let sql = "SELECT id, kind, scheduled_at, court_id, creator_id FROM games WHERE court_id = ?1 AND kind = ?2";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![court_id, kind.slug()], parse_game_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to query games by slot")?;

    Ok(rows
        .into_iter()
        .find(|r| same_minute(r.scheduled_at, scheduled_at))
        .map(|r| r.id))
}

pub fn count(conn: &Connection) -> Result<usize> {
    let total: i64 = conn
        .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))
        .context("Failed to count games")?;
    Ok(total as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::courts::insert_court;
    use crate::database::players::insert_player;
    use crate::database::setup::initialize_schema;
    use crate::domain::{CourtKind, GameStatus, Governorate, NewCourt};
    use chrono::{Duration, TimeZone};

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        initialize_schema(&conn).unwrap();
        conn
    }

    fn when() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 18, 17, 30, 0).unwrap()
    }

    fn stored_game(conn: &Connection, kind: GameKind, players: usize) -> Game {
        let court = NewCourt::new("Sfax Taparura", Governorate::Sfax, "Taparura", CourtKind::Full).build();
        insert_court(conn, &court, None).unwrap();

        let roster: Vec<Player> = (0..players).map(|i| Player::new(&format!("P{i}"), 3)).collect();
        for p in &roster {
            insert_player(conn, p, None).unwrap();
        }

        let creator = roster[0].id;
        let game = Game::new(kind, when(), court, roster, creator);
        insert_game(conn, &game).unwrap();
        game
    }

    #[test]
    fn test_round_trip_keeps_roster_order_and_status() {
        let conn = conn();
        let game = stored_game(&conn, GameKind::TwoVTwo, 4);

        let loaded = find_by_id(&conn, game.id).unwrap().unwrap();
        assert_eq!(loaded, game);
        assert_eq!(loaded.status(), GameStatus::Full);
    }

    #[test]
    fn test_replace_roster() {
        let conn = conn();
        let mut game = stored_game(&conn, GameKind::TwoVTwo, 3);
        let leaving = game.players()[1].id;

        game.leave(leaving);
        replace_roster(&conn, &game).unwrap();

        let loaded = find_by_id(&conn, game.id).unwrap().unwrap();
        assert_eq!(loaded.players().len(), 2);
        assert!(!loaded.has_player(leaving));
    }

    #[test]
    fn test_find_in_slot_matches_by_minute() {
        let conn = conn();
        let game = stored_game(&conn, GameKind::FiveVFive, 1);

        let same = find_in_slot(&conn, game.court.id, GameKind::FiveVFive, when() + Duration::seconds(40)).unwrap();
        assert_eq!(same, Some(game.id));

        let other_minute = find_in_slot(&conn, game.court.id, GameKind::FiveVFive, when() + Duration::minutes(1)).unwrap();
        assert_eq!(other_minute, None);

        let other_kind = find_in_slot(&conn, game.court.id, GameKind::FourVFour, when()).unwrap();
        assert_eq!(other_kind, None);
    }

    #[test]
    fn test_list_all_sorted_by_schedule() {
        let conn = conn();
        let later = stored_game(&conn, GameKind::ThreeVThree, 1);
        let court = later.court.clone();
        let earlier = Game::new(GameKind::ThreeVThree, when() - Duration::hours(5), court, vec![], Uuid::new_v4());
        insert_game(&conn, &earlier).unwrap();

        let ids: Vec<Uuid> = list_all(&conn).unwrap().into_iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![earlier.id, later.id]);
        assert_eq!(count(&conn).unwrap(), 2);
    }

    #[test]
    fn test_deleting_court_cascades_to_games() {
        let conn = conn();
        let game = stored_game(&conn, GameKind::ThreeVThree, 2);

        conn.execute("DELETE FROM courts WHERE id = ?1", params![game.court.id]).unwrap();
        assert!(find_by_id(&conn, game.id).unwrap().is_none());
    }
}
