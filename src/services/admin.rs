use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use rusqlite::TransactionBehavior;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use super::analytics::{track, AnalyticsEvent};
use super::bootstrap::{BootstrapService, SeedReport};
use crate::database::{self, courts, players, setup, DbPool};
use crate::domain::{Court, CourtFilter, NewCourt, Player, PlayerPosition, ValidationError};

/// Court and player directory, plus demo data maintenance.
pub struct AdminService {
    pool: DbPool,
    bootstrap: Arc<BootstrapService>,
}

impl AdminService {
    pub fn new(pool: DbPool, bootstrap: Arc<BootstrapService>) -> Self {
        Self { pool, bootstrap }
    }

    pub fn add_court(&self, court: NewCourt) -> Result<Court> {
        let court = validate_court(court).inspect_err(|e| warn!("Rejected court: {}", e))?;

        let conn = database::get_connection(&self.pool)?;
        let court = court.build();
        courts::insert_court(&conn, &court, None)?;

        info!("Added court {} ({}, {})", court.name, court.city, court.governorate);
        track(
            AnalyticsEvent::CourtAdd,
            &[("court", court.id.to_string()), ("kind", court.kind.slug().to_string())],
        );
        Ok(court)
    }

    /// `level` is clamped into the 1..=5 range.
    pub fn add_player(&self, nickname: &str, level: i64, position: Option<PlayerPosition>) -> Result<Player> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            warn!("Rejected player: empty nickname");
            return Err(ValidationError::EmptyNickname.into());
        }

        let conn = database::get_connection(&self.pool)?;
        let player = Player::new(nickname, level).with_position(position);
        players::insert_player(&conn, &player, None)?;

        info!("Added player {} (level {})", player.nickname, player.level);
        track(
            AnalyticsEvent::PlayerAdd,
            &[("player", player.id.to_string()), ("level", player.level.to_string())],
        );
        Ok(player)
    }

    pub fn courts(&self, filter: &CourtFilter, favorites: &HashSet<Uuid>) -> Result<Vec<Court>> {
        let conn = database::get_connection(&self.pool)?;
        Ok(filter.apply(courts::list_all(&conn)?, favorites))
    }

    pub fn players(&self) -> Result<Vec<Player>> {
        let conn = database::get_connection(&self.pool)?;
        players::list_all(&conn)
    }

    /// Look a court up by id, falling back to its exact name.
    pub fn find_court(&self, reference: &str) -> Result<Option<Court>> {
        let conn = database::get_connection(&self.pool)?;
        match Uuid::parse_str(reference.trim()) {
            Ok(id) => courts::find_by_id(&conn, id),
            Err(_) => courts::find_by_name(&conn, reference.trim()),
        }
    }

    /// Look a player up by id, falling back to the nickname.
    pub fn find_player(&self, reference: &str) -> Result<Option<Player>> {
        let conn = database::get_connection(&self.pool)?;
        match Uuid::parse_str(reference.trim()) {
            Ok(id) => players::find_by_id(&conn, id),
            Err(_) => players::find_by_nickname(&conn, reference.trim()),
        }
    }

    /// Delete every game, player and court, then seed the demo catalog again.
    /// Favorites and the waitlist are kept.
    pub fn reset_demo_data(&self, now: DateTime<Utc>) -> Result<SeedReport> {
        {
            let mut conn = database::get_connection(&self.pool)?;
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .context("Failed to start reset transaction")?;
            setup::wipe_entities(&tx)?;
            tx.commit().context("Failed to commit reset")?;
        }

        self.bootstrap.clear_flag()?;
        info!("Demo data wiped, seeding again");
        self.bootstrap.seed_if_needed(true, now)
    }

    pub fn seeded_at(&self) -> Result<Option<DateTime<Utc>>> {
        self.bootstrap.seeded_at()
    }
}

fn validate_court(mut court: NewCourt) -> Result<NewCourt, ValidationError> {
    court.name = court.name.trim().to_string();
    court.city = court.city.trim().to_string();

    if court.name.is_empty() {
        return Err(ValidationError::EmptyCourtName);
    }
    if court.hoops == 0 {
        return Err(ValidationError::NoHoops);
    }

    Ok(court)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::games;
    use crate::domain::{CourtKind, Governorate};
    use crate::prefs::{Favorites, KeyValueStore, MemoryStore, Waitlist};
    use crate::services::testing::memory_pool;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 15, 9, 20, 0).unwrap()
    }

    fn service_with_store() -> (AdminService, Arc<dyn KeyValueStore>) {
        let pool = memory_pool();
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let bootstrap = Arc::new(BootstrapService::new(pool.clone(), store.clone()));
        (AdminService::new(pool, bootstrap), store)
    }

    fn service() -> AdminService {
        service_with_store().0
    }

    #[test]
    fn test_add_court_trims_and_stores() {
        let admin = service();
        let court = admin
            .add_court(NewCourt::new("  El Menzah 6  ", Governorate::Ariana, " Menzah ", CourtKind::Half))
            .unwrap();

        assert_eq!(court.name, "El Menzah 6");
        assert_eq!(court.city, "Menzah");
        assert_eq!(admin.find_court(&court.id.to_string()).unwrap(), Some(court.clone()));
        assert_eq!(admin.find_court("El Menzah 6").unwrap(), Some(court));
    }

    #[test]
    fn test_add_court_rejects_invalid_input() {
        let admin = service();

        let blank = admin.add_court(NewCourt::new("   ", Governorate::Tunis, "Tunis", CourtKind::Full));
        assert_eq!(
            blank.unwrap_err().downcast_ref::<ValidationError>(),
            Some(&ValidationError::EmptyCourtName)
        );

        let no_hoops = admin.add_court(NewCourt::new("Court", Governorate::Tunis, "Tunis", CourtKind::Full).with_hoops(0));
        assert_eq!(
            no_hoops.unwrap_err().downcast_ref::<ValidationError>(),
            Some(&ValidationError::NoHoops)
        );

        assert!(admin.courts(&CourtFilter::default(), &HashSet::new()).unwrap().is_empty());
    }

    #[test]
    fn test_add_player_clamps_level() {
        let admin = service();
        let player = admin.add_player(" Skander ", 9, Some(PlayerPosition::Center)).unwrap();

        assert_eq!(player.nickname, "Skander");
        assert_eq!(player.level, 5);
        assert_eq!(admin.find_player("Skander").unwrap(), Some(player));

        assert!(admin.add_player("  ", 3, None).is_err());
    }

    #[test]
    fn test_courts_filter_by_favorites() {
        let admin = service();
        let a = admin.add_court(NewCourt::new("A", Governorate::Tunis, "Tunis", CourtKind::Half)).unwrap();
        admin.add_court(NewCourt::new("B", Governorate::Sfax, "Sfax", CourtKind::Full)).unwrap();

        let filter = CourtFilter {
            only_favorites: true,
            ..CourtFilter::default()
        };
        let favorites = HashSet::from([a.id]);
        let found = admin.courts(&filter, &favorites).unwrap();
        assert_eq!(found, vec![a]);
    }

    #[test]
    fn test_reset_replaces_user_data_and_keeps_preferences() {
        let (admin, store) = service_with_store();
        admin.bootstrap.seed_if_needed(false, now()).unwrap();

        let extra = admin.add_court(NewCourt::new("Extra", Governorate::Beja, "Béja", CourtKind::Half)).unwrap();
        let favorites = Favorites::new(store.clone());
        let waitlist = Waitlist::new(store.clone());
        favorites.toggle(extra.id).unwrap();
        waitlist.toggle(&Waitlist::key_for(extra.id, now())).unwrap();

        let report = admin.reset_demo_data(now()).unwrap();
        assert!(!report.skipped);
        assert_eq!(report.courts_inserted, 10);
        assert_eq!(report.games_inserted, 4);

        assert!(admin.find_court("Extra").unwrap().is_none());
        assert_eq!(admin.players().unwrap().len(), 10);
        assert!(admin.seeded_at().unwrap().is_some());

        assert!(favorites.is_favorite(extra.id).unwrap());
        assert_eq!(waitlist.keys().unwrap().len(), 1);

        let conn = database::get_connection(&admin.pool).unwrap();
        assert_eq!(games::count(&conn).unwrap(), 4);
    }
}
