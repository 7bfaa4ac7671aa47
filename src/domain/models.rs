use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{
    CourtKind, CourtRequirement, GameKind, GameStatus, Governorate, GroundCondition,
    PlayerPosition, SurfaceType,
};
use super::errors::GameError;
use super::schedule;

pub const DEFAULT_HOOPS: u32 = 2;
pub const DEFAULT_LEVEL: u8 = 3;
pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 5;

/// Court equipment flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amenities {
    pub lighting: bool,
    pub locker_room: bool,
    pub stands: bool,
    pub water_point: bool,
    pub parking: bool,
    pub wheelchair_accessible: bool,
}

impl Default for Amenities {
    fn default() -> Self {
        Self {
            lighting: false,
            locker_room: false,
            stands: false,
            water_point: true,
            parking: false,
            wheelchair_accessible: false,
        }
    }
}

impl Amenities {
    /// Every amenity present.
    pub fn all() -> Self {
        Self {
            lighting: true,
            locker_room: true,
            stands: true,
            water_point: true,
            parking: true,
            wheelchair_accessible: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: Uuid,
    pub name: String,
    pub governorate: Governorate,
    pub city: String,
    pub kind: CourtKind,
    pub hoops: u32,
    pub amenities: Amenities,
    pub surface: SurfaceType,
    pub condition: GroundCondition,
}

/// Court attributes before an identity is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourt {
    pub name: String,
    pub governorate: Governorate,
    pub city: String,
    pub kind: CourtKind,
    pub hoops: u32,
    pub amenities: Amenities,
    pub surface: SurfaceType,
    pub condition: GroundCondition,
}

impl NewCourt {
    pub fn new(name: &str, governorate: Governorate, city: &str, kind: CourtKind) -> Self {
        Self {
            name: name.to_string(),
            governorate,
            city: city.to_string(),
            kind,
            hoops: DEFAULT_HOOPS,
            amenities: Amenities::default(),
            surface: SurfaceType::default(),
            condition: GroundCondition::default(),
        }
    }

    pub fn with_hoops(mut self, hoops: u32) -> Self {
        self.hoops = hoops;
        self
    }

    pub fn with_amenities(mut self, amenities: Amenities) -> Self {
        self.amenities = amenities;
        self
    }

    pub fn with_surface(mut self, surface: SurfaceType) -> Self {
        self.surface = surface;
        self
    }

    pub fn with_condition(mut self, condition: GroundCondition) -> Self {
        self.condition = condition;
        self
    }

    pub fn build(self) -> Court {
        Court {
            id: Uuid::new_v4(),
            name: self.name,
            governorate: self.governorate,
            city: self.city,
            kind: self.kind,
            hoops: self.hoops,
            amenities: self.amenities,
            surface: self.surface,
            condition: self.condition,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub nickname: String,
    pub level: u8,
    pub position: Option<PlayerPosition>,
}

impl Player {
    pub fn new(nickname: &str, level: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            nickname: nickname.to_string(),
            level: clamp_level(level),
            position: None,
        }
    }

    pub fn with_position(mut self, position: Option<PlayerPosition>) -> Self {
        self.position = position;
        self
    }
}

pub fn clamp_level(level: i64) -> u8 {
    level.clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as u8
}

/// Result of a join that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyJoined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    Left,
    NotAMember,
}

/// A scheduled pickup game.
///
/// The roster and the status are private: every change to the roster goes
/// through [`Game::join`] or [`Game::leave`], which recompute the status, so
/// `status == Full` holds exactly when the roster reaches capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub id: Uuid,
    pub kind: GameKind,
    pub scheduled_at: DateTime<Utc>,
    pub court: Court,
    pub creator_id: Uuid,
    players: Vec<Player>,
    status: GameStatus,
}

impl Game {
    /// Builds a game without checking court compatibility. Duplicate players
    /// (by id) are dropped, keeping the first occurrence.
    pub fn new(
        kind: GameKind,
        scheduled_at: DateTime<Utc>,
        court: Court,
        players: Vec<Player>,
        creator_id: Uuid,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), kind, scheduled_at, court, players, creator_id)
    }

    pub fn with_id(
        id: Uuid,
        kind: GameKind,
        scheduled_at: DateTime<Utc>,
        court: Court,
        players: Vec<Player>,
        creator_id: Uuid,
    ) -> Self {
        let mut roster: Vec<Player> = Vec::with_capacity(players.len());
        for player in players {
            if !roster.iter().any(|p| p.id == player.id) {
                roster.push(player);
            }
        }

        let mut game = Self {
            id,
            kind,
            scheduled_at,
            court,
            creator_id,
            players: roster,
            status: GameStatus::Open,
        };
        game.update_status();
        game
    }

    /// A new game with the creator as its only player. Fails when the court
    /// kind does not suit the game kind.
    pub fn create(
        kind: GameKind,
        scheduled_at: DateTime<Utc>,
        court: Court,
        creator: Player,
    ) -> Result<Self, GameError> {
        let creator_id = creator.id;
        let game = Self::new(kind, scheduled_at, court, vec![creator], creator_id);

        if !game.is_court_compatible() {
            return Err(GameError::CourtIncompatible {
                kind: game.kind,
                court_kind: game.court.kind,
            });
        }

        Ok(game)
    }

    pub fn capacity(&self) -> usize {
        self.kind.capacity()
    }

    pub fn spots_left(&self) -> usize {
        self.capacity().saturating_sub(self.players.len())
    }

    pub fn required_court(&self) -> CourtRequirement {
        self.kind.required_court()
    }

    pub fn is_court_compatible(&self) -> bool {
        self.required_court().accepts(self.court.kind)
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn has_player(&self, player_id: Uuid) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    pub fn update_status(&mut self) {
        self.status = if self.players.len() >= self.capacity() {
            GameStatus::Full
        } else {
            GameStatus::Open
        };
    }

    /// Appends the player in arrival order. Joining twice is a no-op that
    /// still succeeds; joining a full game fails without touching the roster.
    pub fn join(&mut self, player: Player) -> Result<JoinOutcome, GameError> {
        if self.has_player(player.id) {
            return Ok(JoinOutcome::AlreadyJoined);
        }

        if self.spots_left() == 0 {
            return Err(GameError::GameFull {
                game_id: self.id,
                capacity: self.capacity(),
            });
        }

        self.players.push(player);
        self.update_status();
        Ok(JoinOutcome::Joined)
    }

    /// Removes every roster entry with this id. Never fails.
    pub fn leave(&mut self, player_id: Uuid) -> LeaveOutcome {
        let before = self.players.len();
        self.players.retain(|p| p.id != player_id);
        self.update_status();

        if self.players.len() < before {
            LeaveOutcome::Left
        } else {
            LeaveOutcome::NotAMember
        }
    }

    /// Identifies the (court, minute) slot independently of the game id.
    pub fn slot_key(&self) -> String {
        slot_key(self.court.id, self.scheduled_at)
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at >= now
    }
}

/// `<COURT-UUID>_<YYYY-MM-DDTHH:MM>` with the court id upper-cased and the
/// time in UTC.
pub fn slot_key(court_id: Uuid, scheduled_at: DateTime<Utc>) -> String {
    format!(
        "{}_{}",
        court_id.hyphenated().to_string().to_uppercase(),
        schedule::iso_minute(scheduled_at)
    )
}

/// Serialized form of [`Game`], carrying the derived capacity and spots.
#[derive(Serialize)]
struct GameRecord<'a> {
    id: Uuid,
    kind: GameKind,
    scheduled_at: DateTime<Utc>,
    court: &'a Court,
    creator_id: Uuid,
    players: &'a [Player],
    status: GameStatus,
    capacity: usize,
    spots_left: usize,
}

impl Serialize for Game {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GameRecord {
            id: self.id,
            kind: self.kind,
            scheduled_at: self.scheduled_at,
            court: &self.court,
            creator_id: self.creator_id,
            players: &self.players,
            status: self.status,
            capacity: self.capacity(),
            spots_left: self.spots_left(),
        }
        .serialize(serializer)
    }
}
