use chrono::{DateTime, Local, NaiveDate, Utc};
use colored::Colorize;
use std::collections::BTreeMap;

use crate::domain::{Court, Game, GameStatus, Player};
use crate::services::{ProfileStats, RuleHint, SeedReport};

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%a %d %b %H:%M").to_string()
}

fn short_id(id: uuid::Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

pub fn court_line(court: &Court, favorite: bool) -> String {
    let star = if favorite { "★".yellow().to_string() } else { " ".to_string() };
    let mut amenities = Vec::new();
    if court.amenities.lighting {
        amenities.push("lighting");
    }
    if court.amenities.parking {
        amenities.push("parking");
    }
    if court.amenities.water_point {
        amenities.push("water");
    }
    if court.amenities.locker_room {
        amenities.push("lockers");
    }
    if court.amenities.stands {
        amenities.push("stands");
    }
    if court.amenities.wheelchair_accessible {
        amenities.push("accessible");
    }

    format!(
        "{} {} {} ({}, {}) {} · {} hoops · {} · {} [{}]",
        star,
        short_id(court.id).dimmed(),
        court.name.bold(),
        court.city,
        court.governorate,
        court.kind,
        court.hoops,
        court.surface,
        court.condition,
        amenities.join(", ")
    )
}

pub fn player_line(player: &Player) -> String {
    let position = player.position.map(|p| p.label()).unwrap_or("-");
    format!(
        "{} {} level {} {}",
        short_id(player.id).dimmed(),
        player.nickname.bold(),
        player.level,
        position
    )
}

fn status_label(game: &Game) -> String {
    let label = game.status().label();
    match game.status() {
        GameStatus::Full => label.red().to_string(),
        _ => label.green().to_string(),
    }
}

pub fn game_line(game: &Game) -> String {
    format!(
        "{} {} {} @ {} · {}/{} · {}",
        game.id.to_string().dimmed(),
        local_time(game.scheduled_at),
        game.kind.to_string().bold(),
        game.court.name,
        game.players().len(),
        game.capacity(),
        status_label(game)
    )
}

pub fn game_detail(game: &Game, watching: bool) -> String {
    let mut lines = vec![
        format!("{} {}", game.kind.to_string().bold(), status_label(game)),
        format!("id:        {}", game.id),
        format!("when:      {}", local_time(game.scheduled_at)),
        format!("court:     {} ({}, {})", game.court.name, game.court.city, game.court.kind),
        format!("spots:     {} left of {}", game.spots_left(), game.capacity()),
        format!("waitlist:  {}", if watching { "watching" } else { "-" }),
        "players:".to_string(),
    ];

    for (idx, player) in game.players().iter().enumerate() {
        let creator = if player.id == game.creator_id { " (creator)" } else { "" };
        lines.push(format!("  {}. {} (level {}){}", idx + 1, player.nickname, player.level, creator));
    }

    lines.join("\n")
}

pub fn games_by_day(days: &BTreeMap<NaiveDate, Vec<Game>>) -> String {
    let mut lines = Vec::new();
    for (day, games) in days {
        lines.push(day.format("%A %d %B %Y").to_string().underline().to_string());
        lines.extend(games.iter().map(|g| format!("  {}", game_line(g))));
    }
    lines.join("\n")
}

pub fn rule_hint(hint: &RuleHint) -> String {
    let mut line = format!(
        "{}: {} players, court {}",
        hint.kind,
        hint.capacity,
        hint.requirement.label()
    );
    match hint.compatible {
        Some(true) => line.push_str(&format!(" · {}", "compatible".green())),
        Some(false) => line.push_str(&format!(" · {}", "incompatible".red())),
        None => {}
    }
    line
}

pub fn seed_report(report: &SeedReport) -> String {
    if report.skipped {
        return "Demo data already seeded".dimmed().to_string();
    }
    format!(
        "Seeded {} courts, {} players, {} games",
        report.courts_inserted, report.players_inserted, report.games_inserted
    )
}

pub fn profile_stats(stats: &ProfileStats) -> String {
    [
        format!("Upcoming games:  {}", stats.upcoming_games),
        format!("Past games:      {}", stats.past_games),
        format!("Favorite courts: {}", stats.favorite_courts),
    ]
    .join("\n")
}
