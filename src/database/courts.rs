use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::enum_column;
use crate::domain::{Amenities, Court};

const COURT_COLUMNS: &str = "id, name, governorate, city, kind, hoops, has_lighting, has_locker_room, has_stands, has_water_point, has_parking, is_accessible, surface, ground_condition";

pub fn insert_court(conn: &Connection, court: &Court, seed_key: Option<&str>) -> Result<()> {
    let sql = "INSERT INTO courts (id, seed_key, name, governorate, city, kind, hoops, has_lighting, has_locker_room, has_stands, has_water_point, has_parking, is_accessible, surface, ground_condition) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)";
    let amenities = &court.amenities;

    conn.execute(
        sql,
        params![
            court.id,
            seed_key,
            court.name,
            court.governorate.slug(),
            court.city,
            court.kind.slug(),
            court.hoops,
            amenities.lighting,
            amenities.locker_room,
            amenities.stands,
            amenities.water_point,
            amenities.parking,
            amenities.wheelchair_accessible,
            court.surface.slug(),
            court.condition.slug(),
        ],
    )
    .context("Failed to insert court")?;

    Ok(())
}

/// Returns the court stored under `seed_key`, inserting `make()` when absent.
/// The boolean is true when a row was inserted.
pub fn ensure_seeded(
    conn: &Connection,
    seed_key: &str,
    make: impl FnOnce() -> Court,
) -> Result<(Court, bool)> {
    if let Some(existing) = find_by_seed_key(conn, seed_key)? {
        return Ok((existing, false));
    }

    let court = make();
    insert_court(conn, &court, Some(seed_key))?;
    Ok((court, true))
}

fn parse_court_row(row: &rusqlite::Row) -> rusqlite::Result<Court> {
    Ok(Court {
        id: row.get(0)?,
        name: row.get(1)?,
        governorate: enum_column(row, 2)?,
        city: row.get(3)?,
        kind: enum_column(row, 4)?,
        hoops: row.get(5)?,
        amenities: Amenities {
            lighting: row.get(6)?,
            locker_room: row.get(7)?,
            stands: row.get(8)?,
            water_point: row.get(9)?,
            parking: row.get(10)?,
            wheelchair_accessible: row.get(11)?,
        },
        surface: enum_column(row, 12)?,
        condition: enum_column(row, 13)?,
    })
}

pub fn find_by_id(conn: &Connection, id: Uuid) -> Result<Option<Court>> {
    let sql = format!("SELECT {COURT_COLUMNS} FROM courts WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_court_row)
        .optional()
        .context("Failed to query court by id")
}

pub fn find_by_seed_key(conn: &Connection, seed_key: &str) -> Result<Option<Court>> {
    let sql = format!("SELECT {COURT_COLUMNS} FROM courts WHERE seed_key = ?1");

    conn.query_row(&sql, params![seed_key], parse_court_row)
        .optional()
        .context("Failed to query court by seed key")
}

/// Names are not unique; the earliest inserted match wins.
pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Court>> {
    let sql = format!("SELECT {COURT_COLUMNS} FROM courts WHERE name = ?1 ORDER BY created_at, rowid LIMIT 1");

    conn.query_row(&sql, params![name], parse_court_row)
        .optional()
        .context("Failed to query court by name")
}

/// All courts, sorted by city then name.
pub fn list_all(conn: &Connection) -> Result<Vec<Court>> {
    let sql = format!("SELECT {COURT_COLUMNS} FROM courts ORDER BY city, name");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_court_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn count(conn: &Connection) -> Result<usize> {
    let total: i64 = conn
        .query_row("SELECT COUNT(*) FROM courts", [], |row| row.get(0))
        .context("Failed to count courts")?;
    Ok(total as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::setup::initialize_schema;
    use crate::domain::{CourtKind, Governorate, GroundCondition, NewCourt, SurfaceType};

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_find_court() {
        let conn = conn();
        let court = NewCourt::new("Sahloul Arena", Governorate::Sousse, "Sahloul", CourtKind::Full)
            .with_amenities(Amenities::all())
            .with_surface(SurfaceType::Concrete)
            .with_condition(GroundCondition::Medium)
            .with_hoops(4)
            .build();

        insert_court(&conn, &court, None).unwrap();

        assert_eq!(find_by_id(&conn, court.id).unwrap(), Some(court));
        assert_eq!(find_by_id(&conn, Uuid::new_v4()).unwrap(), None);
    }

    #[test]
    fn test_find_by_seed_key() {
        let conn = conn();
        let court = NewCourt::new("Corniche Nabeul", Governorate::Nabeul, "Nabeul", CourtKind::Full).build();
        insert_court(&conn, &court, Some("court.corniche-nabeul")).unwrap();

        let found = find_by_seed_key(&conn, "court.corniche-nabeul").unwrap();
        assert_eq!(found.map(|c| c.id), Some(court.id));
        assert!(find_by_seed_key(&conn, "court.unknown").unwrap().is_none());
        assert_eq!(find_by_name(&conn, "Corniche Nabeul").unwrap().map(|c| c.id), Some(court.id));
    }

    #[test]
    fn test_seed_key_is_unique() {
        let conn = conn();
        let a = NewCourt::new("A", Governorate::Tunis, "Tunis", CourtKind::Half).build();
        let b = NewCourt::new("B", Governorate::Tunis, "Tunis", CourtKind::Half).build();
        insert_court(&conn, &a, Some("court.same")).unwrap();

        assert!(insert_court(&conn, &b, Some("court.same")).is_err());
    }

    #[test]
    fn test_list_all_sorted_by_city() {
        let conn = conn();
        for (name, city) in [("Z", "Sfax"), ("B", "Ariana"), ("A", "Ariana")] {
            let court = NewCourt::new(name, Governorate::Tunis, city, CourtKind::Half).build();
            insert_court(&conn, &court, None).unwrap();
        }

        let names: Vec<String> = list_all(&conn).unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["A", "B", "Z"]);
        assert_eq!(count(&conn).unwrap(), 3);
    }
}
