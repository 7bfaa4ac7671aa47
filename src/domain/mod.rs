pub mod enums;
pub mod errors;
pub mod filters;
pub mod models;
pub mod schedule;

pub use enums::*;
pub use errors::{GameError, ParseEnumError, ValidationError};
pub use filters::{group_by_day, CourtFilter, GameFilter, GameScope};
pub use models::*;
