use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use super::enums::{CourtKind, GameKind, Governorate};
use super::models::{Court, Game};

/// Court explorer filter
#[derive(Debug, Clone, Default)]
pub struct CourtFilter {
    pub governorate: Option<Governorate>,
    pub kind: Option<CourtKind>,
    pub only_favorites: bool,
}

impl CourtFilter {
    pub fn matches(&self, court: &Court, favorites: &HashSet<Uuid>) -> bool {
        self.governorate.is_none_or(|g| court.governorate == g)
            && self.kind.is_none_or(|k| court.kind == k)
            && (!self.only_favorites || favorites.contains(&court.id))
    }

    pub fn apply(&self, courts: Vec<Court>, favorites: &HashSet<Uuid>) -> Vec<Court> {
        courts
            .into_iter()
            .filter(|c| self.matches(c, favorites))
            .collect()
    }
}

/// Game list filter. `only_with_spots` is on by default.
#[derive(Debug, Clone)]
pub struct GameFilter {
    pub governorate: Option<Governorate>,
    pub game_kind: Option<GameKind>,
    pub court_kind: Option<CourtKind>,
    pub only_with_spots: bool,
    pub lighting: bool,
    pub parking: bool,
    pub water_point: bool,
}

impl Default for GameFilter {
    fn default() -> Self {
        Self {
            governorate: None,
            game_kind: None,
            court_kind: None,
            only_with_spots: true,
            lighting: false,
            parking: false,
            water_point: false,
        }
    }
}

impl GameFilter {
    pub fn matches(&self, game: &Game) -> bool {
        let court = &game.court;
        let amenities = &court.amenities;

        self.governorate.is_none_or(|g| court.governorate == g)
            && self.game_kind.is_none_or(|k| game.kind == k)
            && self.court_kind.is_none_or(|k| court.kind == k)
            && (!self.only_with_spots || game.spots_left() > 0)
            && (!self.lighting || amenities.lighting)
            && (!self.parking || amenities.parking)
            && (!self.water_point || amenities.water_point)
    }

    pub fn apply(&self, games: Vec<Game>) -> Vec<Game> {
        games.into_iter().filter(|g| self.matches(g)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameScope {
    #[default]
    Upcoming,
    Past,
    All,
}

impl GameScope {
    /// Expects `games` sorted by schedule ascending. Past games come back
    /// most recent first.
    pub fn select(&self, games: Vec<Game>, now: DateTime<Utc>) -> Vec<Game> {
        match self {
            GameScope::Upcoming => games.into_iter().filter(|g| g.is_upcoming(now)).collect(),
            GameScope::Past => games
                .into_iter()
                .filter(|g| !g.is_upcoming(now))
                .rev()
                .collect(),
            GameScope::All => games,
        }
    }
}

/// Buckets games by calendar day in `tz`, each bucket sorted by schedule.
pub fn group_by_day<Tz: TimeZone>(games: Vec<Game>, tz: &Tz) -> BTreeMap<NaiveDate, Vec<Game>> {
    let mut days: BTreeMap<NaiveDate, Vec<Game>> = BTreeMap::new();

    for game in games {
        let day = game.scheduled_at.with_timezone(tz).date_naive();
        days.entry(day).or_default().push(game);
    }

    for bucket in days.values_mut() {
        bucket.sort_by_key(|g| g.scheduled_at);
    }

    days
}
