use chrono::{DateTime, Duration, TimeZone, Utc, Weekday};

use crate::domain::schedule::{at_wall_clock, next_weekday};
use crate::domain::{
    Amenities, Court, CourtKind, GameKind, Governorate, GroundCondition, NewCourt, Player,
    SurfaceType,
};

/// Demo court. `key` is stored with the row so later seeds find it again
/// even if the court was renamed.
#[derive(Debug, Clone)]
pub struct SeedCourt {
    pub key: &'static str,
    pub court: NewCourt,
}

impl SeedCourt {
    fn new(key: &'static str, court: NewCourt) -> Self {
        Self { key, court }
    }

    pub fn build(&self) -> Court {
        self.court.clone().build()
    }
}

#[derive(Debug, Clone)]
pub struct SeedPlayer {
    pub key: &'static str,
    pub nickname: &'static str,
    pub level: i64,
}

impl SeedPlayer {
    pub fn new(key: &'static str, nickname: &'static str, level: i64) -> Self {
        Self { key, nickname, level }
    }

    pub fn build(&self) -> Player {
        Player::new(self.nickname, self.level)
    }
}

/// When a demo game happens, relative to the moment of seeding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeedSchedule {
    /// Tomorrow at the given local wall-clock time.
    TomorrowAt { hour: u32, minute: u32 },
    /// The next occurrence of `weekday` after today, never today itself.
    NextWeekdayAt { weekday: Weekday, hour: u32, minute: u32 },
    HoursFromNow(i64),
}

impl SeedSchedule {
    pub fn resolve<Tz: TimeZone>(&self, now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
        let today = now.with_timezone(tz).date_naive();

        match *self {
            SeedSchedule::TomorrowAt { hour, minute } => {
                let tomorrow = today.succ_opt().unwrap_or(today);
                at_wall_clock(tomorrow, hour, minute, tz)
            }
            SeedSchedule::NextWeekdayAt { weekday, hour, minute } => {
                at_wall_clock(next_weekday(today, weekday), hour, minute, tz)
            }
            SeedSchedule::HoursFromNow(hours) => now + Duration::hours(hours),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeedGame {
    pub kind: GameKind,
    pub court: &'static str,
    pub schedule: SeedSchedule,
    /// Seed keys of catalog players, in roster order. The first one creates the game.
    pub players: Vec<&'static str>,
    /// Extra players created only together with this game.
    pub guests: Vec<SeedPlayer>,
}

pub fn get_courts() -> Vec<SeedCourt> {
    vec![
        SeedCourt::new(
            "court.cite-olympique",
            NewCourt::new("Cité Olympique", Governorate::Tunis, "El Khadra", CourtKind::Full)
                .with_amenities(Amenities::all())
                .with_surface(SurfaceType::Concrete),
        ),
        SeedCourt::new(
            "court.parc-du-belvedere",
            NewCourt::new("Parc du Belvédère", Governorate::Tunis, "Belvédère", CourtKind::Half)
                .with_amenities(Amenities {
                    lighting: true,
                    stands: true,
                    parking: true,
                    wheelchair_accessible: true,
                    ..Amenities::default()
                }),
        ),
        SeedCourt::new(
            "court.corniche-nabeul",
            NewCourt::new("Corniche Nabeul", Governorate::Nabeul, "Nabeul", CourtKind::Full)
                .with_amenities(Amenities {
                    lighting: true,
                    parking: true,
                    ..Amenities::default()
                })
                .with_condition(GroundCondition::Medium),
        ),
        SeedCourt::new(
            "court.sahloul-arena",
            NewCourt::new("Sahloul Arena", Governorate::Sousse, "Sahloul", CourtKind::Full)
                .with_amenities(Amenities::all())
                .with_surface(SurfaceType::Concrete),
        ),
        SeedCourt::new(
            "court.monastir-marina",
            NewCourt::new("Monastir Marina Court", Governorate::Monastir, "Centre", CourtKind::Half)
                .with_amenities(Amenities {
                    lighting: true,
                    parking: true,
                    wheelchair_accessible: true,
                    ..Amenities::default()
                }),
        ),
        SeedCourt::new(
            "court.bizerte-corniche",
            NewCourt::new("Bizerte Corniche", Governorate::Bizerte, "Corniche", CourtKind::Full)
                .with_amenities(Amenities {
                    lighting: true,
                    stands: true,
                    parking: true,
                    ..Amenities::default()
                })
                .with_condition(GroundCondition::Medium),
        ),
        SeedCourt::new(
            "court.sfax-taparura",
            NewCourt::new("Sfax Taparura", Governorate::Sfax, "Taparura", CourtKind::Full)
                .with_amenities(Amenities::all())
                .with_surface(SurfaceType::Concrete),
        ),
        SeedCourt::new(
            "court.mahdia-plage",
            NewCourt::new("Mahdia Plage Court", Governorate::Mahdia, "Touristique", CourtKind::Half)
                .with_amenities(Amenities {
                    parking: true,
                    ..Amenities::default()
                })
                .with_condition(GroundCondition::Medium),
        ),
        SeedCourt::new(
            "court.gabes-oasis",
            NewCourt::new("Gabès Oasis Court", Governorate::Gabes, "Gabès-Ville", CourtKind::Full)
                .with_amenities(Amenities {
                    lighting: true,
                    stands: true,
                    parking: true,
                    wheelchair_accessible: true,
                    ..Amenities::default()
                })
                .with_surface(SurfaceType::Concrete),
        ),
        SeedCourt::new(
            "court.kairouan-medina",
            NewCourt::new("Kairouan Medina Court", Governorate::Kairouan, "Médina", CourtKind::Half)
                .with_surface(SurfaceType::Other)
                .with_condition(GroundCondition::Bad),
        ),
    ]
}

pub fn get_players() -> Vec<SeedPlayer> {
    vec![
        SeedPlayer::new("player.yassine", "Yassine", 4),
        SeedPlayer::new("player.omar", "Omar", 3),
        SeedPlayer::new("player.rami", "Rami", 3),
        SeedPlayer::new("player.anis", "Anis", 2),
        SeedPlayer::new("player.noura", "Noura", 4),
        SeedPlayer::new("player.sana", "Sana", 3),
        SeedPlayer::new("player.hedi", "Hedi", 2),
        SeedPlayer::new("player.meriem", "Meriem", 4),
    ]
}

/// Demo games. The 1v1 on Cité Olympique sits on a full court on purpose:
/// seeded games are stored as listed, without the court compatibility rule.
pub fn get_games() -> Vec<SeedGame> {
    vec![
        SeedGame {
            kind: GameKind::ThreeVThree,
            court: "court.sahloul-arena",
            schedule: SeedSchedule::TomorrowAt { hour: 18, minute: 0 },
            players: vec!["player.yassine", "player.noura", "player.rami", "player.sana"],
            guests: vec![],
        },
        SeedGame {
            kind: GameKind::FiveVFive,
            court: "court.sfax-taparura",
            schedule: SeedSchedule::NextWeekdayAt {
                weekday: Weekday::Sat,
                hour: 17,
                minute: 30,
            },
            players: vec![
                "player.yassine",
                "player.omar",
                "player.rami",
                "player.anis",
                "player.noura",
                "player.sana",
                "player.hedi",
                "player.meriem",
            ],
            guests: vec![
                SeedPlayer::new("player.guest-a", "Guest A", 3),
                SeedPlayer::new("player.guest-b", "Guest B", 3),
            ],
        },
        SeedGame {
            kind: GameKind::TwoVTwo,
            court: "court.parc-du-belvedere",
            schedule: SeedSchedule::HoursFromNow(3),
            players: vec!["player.omar", "player.anis", "player.hedi"],
            guests: vec![],
        },
        SeedGame {
            kind: GameKind::OneVOne,
            court: "court.cite-olympique",
            schedule: SeedSchedule::HoursFromNow(2),
            players: vec!["player.yassine"],
            guests: vec![],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_keys_are_unique() {
        let courts: HashSet<&str> = get_courts().iter().map(|c| c.key).collect();
        assert_eq!(courts.len(), 10);

        let players: HashSet<&str> = get_players().iter().map(|p| p.key).collect();
        assert_eq!(players.len(), 8);
    }

    #[test]
    fn test_games_reference_catalog_entries() {
        let courts: HashSet<&str> = get_courts().iter().map(|c| c.key).collect();
        let players: HashSet<&str> = get_players().iter().map(|p| p.key).collect();

        for game in get_games() {
            assert!(courts.contains(game.court), "unknown court {}", game.court);
            assert!(game.players.iter().all(|p| players.contains(p)));
            assert!(game.players.len() + game.guests.len() <= game.kind.capacity());
        }
    }

    #[test]
    fn test_five_on_five_starts_full() {
        let five = get_games()
            .into_iter()
            .find(|g| g.kind == GameKind::FiveVFive)
            .unwrap();
        assert_eq!(five.players.len() + five.guests.len(), 10);
    }

    #[test]
    fn test_schedule_resolution() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        // Wednesday 2025-10-15 10:20 local
        let now = DateTime::parse_from_rfc3339("2025-10-15T09:20:00Z").unwrap().with_timezone(&Utc);

        let tomorrow = SeedSchedule::TomorrowAt { hour: 18, minute: 0 }.resolve(now, &tz);
        assert_eq!(tomorrow.to_rfc3339(), "2025-10-16T17:00:00+00:00");

        let saturday = SeedSchedule::NextWeekdayAt {
            weekday: Weekday::Sat,
            hour: 17,
            minute: 30,
        }
        .resolve(now, &tz);
        assert_eq!(saturday.to_rfc3339(), "2025-10-18T16:30:00+00:00");

        assert_eq!(SeedSchedule::HoursFromNow(2).resolve(now, &tz), now + Duration::hours(2));
    }
}
