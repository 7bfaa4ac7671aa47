use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::{self, games, DbPool};
use crate::prefs::Favorites;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfileStats {
    pub upcoming_games: usize,
    pub past_games: usize,
    pub favorite_courts: usize,
}

pub struct StatsService {
    pool: DbPool,
    favorites: Favorites,
}

impl StatsService {
    pub fn new(pool: DbPool, favorites: Favorites) -> Self {
        Self { pool, favorites }
    }

    pub fn profile(&self, now: DateTime<Utc>) -> Result<ProfileStats> {
        let conn = database::get_connection(&self.pool)?;
        let all = games::list_all(&conn)?;
        let upcoming = all.iter().filter(|g| g.is_upcoming(now)).count();

        Ok(ProfileStats {
            upcoming_games: upcoming,
            past_games: all.len() - upcoming,
            favorite_courts: self.favorites.count()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::courts::insert_court;
    use crate::domain::{CourtKind, Game, GameKind, Governorate, NewCourt};
    use crate::prefs::MemoryStore;
    use crate::services::testing::memory_pool;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;
    use uuid::Uuid;

    #[test]
    fn test_profile_counts() {
        let pool = memory_pool();
        let now = Utc.with_ymd_and_hms(2025, 10, 15, 12, 0, 0).unwrap();
        let court = NewCourt::new("Corniche Nabeul", Governorate::Nabeul, "Nabeul", CourtKind::Full).build();

        {
            let conn = database::get_connection(&pool).unwrap();
            insert_court(&conn, &court, None).unwrap();
            for offset in [-3, -1, 0, 2] {
                let game = Game::new(GameKind::FiveVFive, now + Duration::hours(offset), court.clone(), vec![], Uuid::new_v4());
                games::insert_game(&conn, &game).unwrap();
            }
        }

        let store = Arc::new(MemoryStore::new());
        let favorites = Favorites::new(store.clone());
        favorites.toggle(court.id).unwrap();

        let stats = StatsService::new(pool, Favorites::new(store)).profile(now).unwrap();
        assert_eq!(
            stats,
            ProfileStats {
                upcoming_games: 2,
                past_games: 2,
                favorite_courts: 1,
            }
        );
    }
}
