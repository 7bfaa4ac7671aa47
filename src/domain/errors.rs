use thiserror::Error;
use uuid::Uuid;

use super::enums::{CourtKind, GameKind};

/// Rule violations raised by game mutations. Both are recoverable: nothing
/// has been written when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("a {kind} game cannot be played on a {court_kind} court")]
    CourtIncompatible {
        kind: GameKind,
        court_kind: CourtKind,
    },

    #[error("game {game_id} is full ({capacity} players)")]
    GameFull { game_id: Uuid, capacity: usize },
}

/// Rejected admin input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("court name must not be empty")]
    EmptyCourtName,

    #[error("nickname must not be empty")]
    EmptyNickname,

    #[error("a court needs at least one hoop")]
    NoHoops,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {type_name} value: {value:?}")]
pub struct ParseEnumError {
    type_name: &'static str,
    value: String,
}

impl ParseEnumError {
    pub fn new(type_name: &'static str, value: &str) -> Self {
        Self {
            type_name,
            value: value.to_string(),
        }
    }
}
