use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use rusqlite::TransactionBehavior;
use serde::Serialize;
use uuid::Uuid;

use super::analytics::{track, AnalyticsEvent};
use crate::database::{self, games, players, courts, DbPool};
use crate::domain::{
    CourtKind, CourtRequirement, Game, GameError, GameFilter, GameKind, GameScope, JoinOutcome,
    LeaveOutcome,
};

/// What the creation form shows before a game is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleHint {
    pub kind: GameKind,
    pub capacity: usize,
    pub requirement: CourtRequirement,
    /// `None` until a court is picked.
    pub compatible: Option<bool>,
}

impl RuleHint {
    pub fn new(kind: GameKind, court_kind: Option<CourtKind>) -> Self {
        let requirement = kind.required_court();
        Self {
            kind,
            capacity: kind.capacity(),
            requirement,
            compatible: court_kind.map(|k| requirement.accepts(k)),
        }
    }
}

/// Create, join and leave games. Each call is one SQLite transaction.
pub struct GameService {
    pool: DbPool,
}

impl GameService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Store a new game with `creator_id` as its only player. A court that
    /// does not suit `kind` yields [`GameError::CourtIncompatible`] and nothing
    /// is written.
    pub fn create_game(
        &self,
        kind: GameKind,
        scheduled_at: DateTime<Utc>,
        court_id: Uuid,
        creator_id: Uuid,
    ) -> Result<Game> {
        let mut conn = database::get_connection(&self.pool)?;
        let tx = begin_write(&mut conn)?;

        let court = courts::find_by_id(&tx, court_id)?
            .with_context(|| format!("Court not found: {}", court_id))?;
        let creator = players::find_by_id(&tx, creator_id)?
            .with_context(|| format!("Player not found: {}", creator_id))?;

        let game = Game::create(kind, scheduled_at, court, creator).inspect_err(|e| {
            warn!("Rejected game creation: {}", e);
        })?;

        games::insert_game(&tx, &game)?;
        tx.commit().context("Failed to commit new game")?;

        info!("Created {} game {} on {}", game.kind, game.id, game.court.name);
        track(
            AnalyticsEvent::GameCreate,
            &[
                ("game", game.id.to_string()),
                ("kind", game.kind.slug().to_string()),
                ("court", game.court.id.to_string()),
            ],
        );
        Ok(game)
    }

    /// Add `player_id` to the roster. Already being a member succeeds without
    /// a change; a game with no spot left yields [`GameError::GameFull`].
    pub fn join(&self, game_id: Uuid, player_id: Uuid) -> Result<(Game, JoinOutcome)> {
        let mut conn = database::get_connection(&self.pool)?;
        let tx = begin_write(&mut conn)?;

        let mut game = games::find_by_id(&tx, game_id)?
            .with_context(|| format!("Game not found: {}", game_id))?;
        let player = players::find_by_id(&tx, player_id)?
            .with_context(|| format!("Player not found: {}", player_id))?;

        let outcome = match game.join(player) {
            Ok(outcome) => outcome,
            Err(e) => {
                if let GameError::GameFull { capacity, .. } = &e {
                    track(
                        AnalyticsEvent::GameFull,
                        &[("game", game_id.to_string()), ("capacity", capacity.to_string())],
                    );
                }
                warn!("Rejected join of {} to game {}: {}", player_id, game_id, e);
                return Err(e.into());
            }
        };

        if outcome == JoinOutcome::Joined {
            games::replace_roster(&tx, &game)?;
            tx.commit().context("Failed to commit join")?;

            info!(
                "Player {} joined game {} ({} spots left)",
                player_id,
                game_id,
                game.spots_left()
            );
            track(
                AnalyticsEvent::GameJoin,
                &[("game", game_id.to_string()), ("player", player_id.to_string())],
            );
        }

        Ok((game, outcome))
    }

    /// Remove `player_id` from the roster. Never fails for a non-member.
    pub fn leave(&self, game_id: Uuid, player_id: Uuid) -> Result<(Game, LeaveOutcome)> {
        let mut conn = database::get_connection(&self.pool)?;
        let tx = begin_write(&mut conn)?;

        let mut game = games::find_by_id(&tx, game_id)?
            .with_context(|| format!("Game not found: {}", game_id))?;

        let outcome = game.leave(player_id);
        if outcome == LeaveOutcome::Left {
            games::replace_roster(&tx, &game)?;
            tx.commit().context("Failed to commit leave")?;

            info!("Player {} left game {}", player_id, game_id);
            track(
                AnalyticsEvent::GameLeave,
                &[("game", game_id.to_string()), ("player", player_id.to_string())],
            );
        }

        Ok((game, outcome))
    }

    pub fn find(&self, game_id: Uuid) -> Result<Option<Game>> {
        let conn = database::get_connection(&self.pool)?;
        games::find_by_id(&conn, game_id)
    }

    /// Games in `scope` relative to `now` that pass `filter`.
    pub fn list(&self, filter: &GameFilter, scope: GameScope, now: DateTime<Utc>) -> Result<Vec<Game>> {
        let conn = database::get_connection(&self.pool)?;
        let all = games::list_all(&conn)?;
        Ok(filter.apply(scope.select(all, now)))
    }

    /// Games with `player_id` on the roster, in `scope`.
    pub fn for_player(&self, player_id: Uuid, scope: GameScope, now: DateTime<Utc>) -> Result<Vec<Game>> {
        let conn = database::get_connection(&self.pool)?;
        let mine = games::list_all(&conn)?
            .into_iter()
            .filter(|g| g.has_player(player_id))
            .collect();
        Ok(scope.select(mine, now))
    }
}

/// Take the write lock up front so concurrent writers queue on
/// `busy_timeout` instead of failing when a read lock is upgraded.
fn begin_write(conn: &mut database::DbConn) -> Result<rusqlite::Transaction<'_>> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .context("Failed to start transaction")
}
