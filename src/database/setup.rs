use anyhow::{Context, Result};
use rusqlite::Connection;

const WIPE_SQL: &str = "
    DELETE FROM game_players;
    DELETE FROM games;
    DELETE FROM players;
    DELETE FROM courts;
    DELETE FROM seed_state;
";

/// Create any missing tables. Safe to run on every start.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    let schema_sql = include_str!("schema.sql");
    run_statements(conn, schema_sql)?;

    log::info!("Database schema ready");
    Ok(())
}

/// Delete every game, player and court along with the seed marker. Schema
/// is kept.
pub fn wipe_entities(conn: &Connection) -> Result<()> {
    run_statements(conn, WIPE_SQL)?;

    log::info!("Deleted all games, players and courts");
    Ok(())
}

fn run_statements(conn: &Connection, sql: &str) -> Result<()> {
    let statements = split_sql_statements(sql);

    for (idx, statement) in statements.iter().enumerate() {
        execute_sql(conn, statement)
            .with_context(|| format!("Failed to execute statement {}", idx + 1))?;
    }

    Ok(())
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn execute_sql(conn: &Connection, sql: &str) -> Result<()> {
    conn.execute(sql, [])
        .context("Failed to execute SQL statement")
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sql_statements() {
        let statements = split_sql_statements("CREATE TABLE a (x);\n\n  DELETE FROM a ;  ;");
        assert_eq!(statements, vec!["CREATE TABLE a (x)", "DELETE FROM a"]);
    }

    #[test]
    fn test_initialize_schema_is_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('courts', 'players', 'games', 'game_players')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 4);
    }
}
