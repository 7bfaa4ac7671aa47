pub mod connection;
pub mod courts;
pub mod games;
pub mod players;
pub mod seed_state;
pub mod setup;

use std::str::FromStr;

use rusqlite::types::Type;

pub use connection::{create_memory_pool, create_pool, get_connection, DbConn, DbPool};

/// Read a text column holding an enum slug.
pub(crate) fn enum_column<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Same as [`enum_column`] for nullable columns.
pub(crate) fn optional_enum_column<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|value| {
        value
            .parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}
