use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone, Utc};
use log::{debug, info};
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::analytics::{track, AnalyticsEvent};
use crate::config::catalog::{self, SeedGame};
use crate::database::{self, courts, games, players, seed_state, DbPool};
use crate::domain::{Court, Game, Player};
use crate::prefs::{KeyValueStore, KeyValueStoreExt};

pub const SEED_FLAG_KEY: &str = "andone.seed_done_date";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// The flag was already set and nothing ran.
    pub skipped: bool,
    pub courts_inserted: usize,
    pub players_inserted: usize,
    pub games_inserted: usize,
}

impl SeedReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Populates the demo catalog once per store.
pub struct BootstrapService {
    pool: DbPool,
    store: Arc<dyn KeyValueStore>,
    seed_lock: Mutex<()>,
}

impl BootstrapService {
    pub fn new(pool: DbPool, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            pool,
            store,
            seed_lock: Mutex::new(()),
        }
    }

    /// When the demo data was last seeded, if ever. The preferences flag
    /// wins; the database marker covers a store that lost it.
    pub fn seeded_at(&self) -> Result<Option<DateTime<Utc>>> {
        let raw: Option<String> = self.store.get_as(SEED_FLAG_KEY)?;
        if let Some(value) = raw {
            let at = DateTime::parse_from_rfc3339(&value)
                .map(|dt| dt.with_timezone(&Utc))
                .with_context(|| format!("Failed to parse seed date: {}", value))?;
            return Ok(Some(at));
        }

        let conn = database::get_connection(&self.pool)?;
        seed_state::find_marker(&conn)
    }

    /// Forget that seeding ran, in both the preferences and the database.
    pub fn clear_flag(&self) -> Result<()> {
        let conn = database::get_connection(&self.pool)?;
        seed_state::clear_marker(&conn)?;
        drop(conn);

        self.store.remove(SEED_FLAG_KEY)
    }

    /// Seed using the local timezone for wall-clock game times.
    pub fn seed_if_needed(&self, force: bool, now: DateTime<Utc>) -> Result<SeedReport> {
        self.seed_if_needed_in(force, now, &Local)
    }

    /// Insert the catalog courts, players and games that are missing. Without
    /// `force`, does nothing once seeding has run against this database.
    pub fn seed_if_needed_in<Tz: TimeZone>(
        &self,
        force: bool,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<SeedReport> {
        if !force && self.store.contains(SEED_FLAG_KEY)? {
            return Ok(SeedReport::skipped());
        }

        let _guard = self
            .seed_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Seed lock poisoned"))?;

        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to start seed transaction")?;

        // The marker is read under the write lock, so another process that
        // seeded while we waited is seen here.
        if !force {
            if let Some(seeded_at) = seed_state::find_marker(&tx)? {
                drop(tx);
                drop(conn);
                if !self.store.contains(SEED_FLAG_KEY)? {
                    self.store.set_as(SEED_FLAG_KEY, &seeded_at.to_rfc3339())?;
                }
                debug!("Seed already ran at {}", seeded_at);
                return Ok(SeedReport::skipped());
            }
        }

        let report = seed_catalog(&tx, now, tz)?;
        seed_state::record_marker(&tx, now)?;
        tx.commit().context("Failed to commit seed data")?;

        self.store.set_as(SEED_FLAG_KEY, &now.to_rfc3339())?;

        info!(
            "Seeded demo data: {} courts, {} players, {} games",
            report.courts_inserted, report.players_inserted, report.games_inserted
        );
        track(
            AnalyticsEvent::SeedDone,
            &[
                ("courts", report.courts_inserted.to_string()),
                ("players", report.players_inserted.to_string()),
                ("games", report.games_inserted.to_string()),
            ],
        );
        Ok(report)
    }
}

fn seed_catalog<Tz: TimeZone>(conn: &Connection, now: DateTime<Utc>, tz: &Tz) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    let mut seeded_courts: HashMap<&'static str, Court> = HashMap::new();
    for entry in catalog::get_courts() {
        let (court, inserted) = courts::ensure_seeded(conn, entry.key, || entry.build())?;
        report.courts_inserted += usize::from(inserted);
        seeded_courts.insert(entry.key, court);
    }

    let mut seeded_players: HashMap<&'static str, Player> = HashMap::new();
    for entry in catalog::get_players() {
        let (player, inserted) = players::ensure_seeded(conn, entry.key, || entry.build())?;
        report.players_inserted += usize::from(inserted);
        seeded_players.insert(entry.key, player);
    }

    for entry in catalog::get_games() {
        let scheduled_at = entry.schedule.resolve(now, tz);
        let court = seeded_courts
            .get(entry.court)
            .with_context(|| format!("Seed game references unknown court: {}", entry.court))?;

        if games::find_in_slot(conn, court.id, entry.kind, scheduled_at)?.is_some() {
            continue;
        }

        let roster = seed_roster(conn, &entry, &seeded_players, &mut report)?;
        let creator_id = roster
            .first()
            .map(|p| p.id)
            .unwrap_or_else(uuid::Uuid::new_v4);

        let game = Game::new(entry.kind, scheduled_at, court.clone(), roster, creator_id);
        games::insert_game(conn, &game)?;
        report.games_inserted += 1;
    }

    Ok(report)
}

fn seed_roster(
    conn: &Connection,
    entry: &SeedGame,
    seeded_players: &HashMap<&'static str, Player>,
    report: &mut SeedReport,
) -> Result<Vec<Player>> {
    let mut roster = Vec::with_capacity(entry.players.len() + entry.guests.len());

    for key in &entry.players {
        let player = seeded_players
            .get(key)
            .with_context(|| format!("Seed game references unknown player: {}", key))?;
        roster.push(player.clone());
    }

    for guest in &entry.guests {
        let (player, inserted) = players::ensure_seeded(conn, guest.key, || guest.build())?;
        report.players_inserted += usize::from(inserted);
        roster.push(player);
    }

    Ok(roster)
}
