pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod prefs;
pub mod render;
pub mod services;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::{CommandFactory, Parser};
use log::info;
use serde::Serialize;
use std::io;
use std::sync::Arc;
use uuid::Uuid;

use crate::cli::{
    AddCourtArgs, Cli, Command, CourtCommand, FavoriteCommand, GameCommand, ListGamesArgs,
    PlayerCommand, WaitlistCommand,
};
use crate::config::settings::AppConfig;
use crate::database::DbPool;
use crate::domain::schedule::parse_schedule;
use crate::domain::{
    group_by_day, Amenities, Court, CourtFilter, Game, GameFilter, GameScope, NewCourt, Player,
};
use crate::prefs::{Favorites, JsonFileStore, KeyValueStore, Waitlist};
use crate::services::{AdminService, BootstrapService, GameService, RuleHint, StatsService};

pub fn interpret() -> Cli {
    Cli::parse()
}

/// Services wired to one database and one preferences store.
pub struct App {
    pub games: GameService,
    pub admin: AdminService,
    pub bootstrap: Arc<BootstrapService>,
    pub stats: StatsService,
    pub favorites: Favorites,
    pub waitlist: Waitlist,
    json: bool,
}

impl App {
    pub fn open(config: &AppConfig, json: bool) -> Result<Self> {
        let pool = database::create_pool(&config.storage.database_path)?;
        {
            let conn = database::get_connection(&pool)?;
            database::setup::initialize_schema(&conn)?;
        }

        let store = JsonFileStore::open(&config.storage.prefs_path)
            .context("Failed to open preferences")?;
        info!(
            "Using database {} and preferences {}",
            config.storage.database_path,
            store.path().display()
        );

        Ok(Self::from_parts(pool, Arc::new(store), json))
    }

    pub fn from_parts(pool: DbPool, store: Arc<dyn KeyValueStore>, json: bool) -> Self {
        let bootstrap = Arc::new(BootstrapService::new(pool.clone(), store.clone()));

        Self {
            games: GameService::new(pool.clone()),
            admin: AdminService::new(pool.clone(), Arc::clone(&bootstrap)),
            stats: StatsService::new(pool, Favorites::new(store.clone())),
            favorites: Favorites::new(store.clone()),
            waitlist: Waitlist::new(store),
            bootstrap,
            json,
        }
    }

    fn print<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
            println!("{json}");
        } else {
            println!("{}", text());
        }
        Ok(())
    }

    fn player(&self, reference: &str) -> Result<Player> {
        self.admin
            .find_player(reference)?
            .with_context(|| format!("Player not found: {}", reference))
    }

    fn court(&self, reference: &str) -> Result<Court> {
        self.admin
            .find_court(reference)?
            .with_context(|| format!("Court not found: {}", reference))
    }

    fn game(&self, reference: &str) -> Result<Game> {
        let id = Uuid::parse_str(reference.trim())
            .with_context(|| format!("Invalid game id: {}", reference))?;
        self.games
            .find(id)?
            .with_context(|| format!("Game not found: {}", reference))
    }
}

/// Seed on first use, unless the command manages seeding itself.
pub fn prepare(app: &App, config: &AppConfig, command: &Command) -> Result<()> {
    let manages_seed = matches!(
        command,
        Command::Seed { .. } | Command::Reset | Command::Completions { .. }
    );
    if config.seed.auto_seed && !manages_seed {
        app.bootstrap.seed_if_needed(false, Utc::now())?;
    }
    Ok(())
}

pub fn handle_seed(app: &App, force: bool) -> Result<()> {
    let report = app.bootstrap.seed_if_needed(force, Utc::now())?;
    app.print(&report, || render::seed_report(&report))
}

pub fn handle_reset(app: &App) -> Result<()> {
    let report = app.admin.reset_demo_data(Utc::now())?;
    app.print(&report, || render::seed_report(&report))
}

pub fn handle_courts(app: &App, command: &CourtCommand) -> Result<()> {
    match command {
        CourtCommand::List {
            governorate,
            kind,
            favorites,
        } => {
            let filter = CourtFilter {
                governorate: *governorate,
                kind: *kind,
                only_favorites: *favorites,
            };
            let favorite_ids = app.favorites.ids()?;
            let courts = app.admin.courts(&filter, &favorite_ids)?;

            app.print(&courts, || {
                courts
                    .iter()
                    .map(|c| render::court_line(c, favorite_ids.contains(&c.id)))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        CourtCommand::Add(args) => {
            let court = app.admin.add_court(new_court(args))?;
            app.print(&court, || render::court_line(&court, false))
        }
    }
}

fn new_court(args: &AddCourtArgs) -> NewCourt {
    let amenities = Amenities {
        lighting: args.lighting,
        locker_room: args.locker_room,
        stands: args.stands,
        water_point: !args.no_water,
        parking: args.parking,
        wheelchair_accessible: args.accessible,
    };

    NewCourt::new(&args.name, args.governorate, &args.city, args.kind)
        .with_hoops(args.hoops)
        .with_amenities(amenities)
        .with_surface(args.surface.unwrap_or_default())
        .with_condition(args.condition.unwrap_or_default())
}

pub fn handle_players(app: &App, command: &PlayerCommand) -> Result<()> {
    match command {
        PlayerCommand::List => {
            let players = app.admin.players()?;
            app.print(&players, || {
                players.iter().map(render::player_line).collect::<Vec<_>>().join("\n")
            })
        }
        PlayerCommand::Add {
            nickname,
            level,
            position,
        } => {
            let player = app.admin.add_player(nickname, *level, *position)?;
            app.print(&player, || render::player_line(&player))
        }
    }
}

pub fn handle_games(app: &App, command: &GameCommand) -> Result<()> {
    match command {
        GameCommand::List(args) => list_games(app, args),
        GameCommand::Create {
            kind,
            court,
            creator,
            at,
        } => {
            let court = app.court(court)?;
            let creator = app.player(creator)?;
            let scheduled_at = parse_schedule(at)?;

            let game = app.games.create_game(*kind, scheduled_at, court.id, creator.id)?;
            app.print(&game, || render::game_detail(&game, false))
        }
        GameCommand::Join { game, player } => {
            let game = app.game(game)?;
            let player = app.player(player)?;

            let (game, outcome) = app.games.join(game.id, player.id)?;
            app.print(&game, || format!("{:?}\n{}", outcome, render::game_line(&game)))
        }
        GameCommand::Leave { game, player } => {
            let game = app.game(game)?;
            let player = app.player(player)?;

            let (game, outcome) = app.games.leave(game.id, player.id)?;
            app.print(&game, || format!("{:?}\n{}", outcome, render::game_line(&game)))
        }
        GameCommand::Show { game } => {
            let game = app.game(game)?;
            let watching = app.waitlist.is_watching(&game.slot_key())?;
            app.print(&game, || render::game_detail(&game, watching))
        }
        GameCommand::Hint { kind, court } => {
            let court_kind = court.as_deref().map(|c| app.court(c)).transpose()?.map(|c| c.kind);
            let hint = RuleHint::new(*kind, court_kind);
            app.print(&hint, || render::rule_hint(&hint))
        }
    }
}

fn list_games(app: &App, args: &ListGamesArgs) -> Result<()> {
    let now = Utc::now();
    let scope: GameScope = args.scope.into();

    let games = match &args.player {
        Some(reference) => {
            let player = app.player(reference)?;
            app.games.for_player(player.id, scope, now)?
        }
        None => {
            let filter = GameFilter {
                governorate: args.governorate,
                game_kind: args.kind,
                court_kind: args.court_kind,
                only_with_spots: !args.include_full,
                lighting: args.lighting,
                parking: args.parking,
                water_point: args.water,
            };
            app.games.list(&filter, scope, now)?
        }
    };

    if args.by_day {
        let days = group_by_day(games, &Local);
        return app.print(&days, || render::games_by_day(&days));
    }

    app.print(&games, || games.iter().map(render::game_line).collect::<Vec<_>>().join("\n"))
}

pub fn handle_favorites(app: &App, command: &FavoriteCommand) -> Result<()> {
    match command {
        FavoriteCommand::Toggle { court } => {
            let court = app.court(court)?;
            let favorite = app.favorites.toggle(court.id)?;
            app.print(&favorite, || {
                let verb = if favorite { "Added" } else { "Removed" };
                format!("{} {} {} favorites", verb, court.name, if favorite { "to" } else { "from" })
            })
        }
        FavoriteCommand::List => {
            let ids = app.favorites.ids()?;
            let courts = app.admin.courts(
                &CourtFilter {
                    only_favorites: true,
                    ..CourtFilter::default()
                },
                &ids,
            )?;
            app.print(&courts, || {
                courts.iter().map(|c| render::court_line(c, true)).collect::<Vec<_>>().join("\n")
            })
        }
    }
}

pub fn handle_waitlist(app: &App, command: &WaitlistCommand) -> Result<()> {
    match command {
        WaitlistCommand::Toggle { game } => {
            let game = app.game(game)?;
            let key = game.slot_key();
            let watching = app.waitlist.toggle(&key)?;
            app.print(&watching, || {
                format!("{} {}", if watching { "Watching" } else { "Stopped watching" }, key)
            })
        }
        WaitlistCommand::List => {
            let keys = app.waitlist.keys()?;
            let every_game = GameFilter {
                only_with_spots: false,
                ..GameFilter::default()
            };
            let games: Vec<Game> = app
                .games
                .list(&every_game, GameScope::All, Utc::now())?
                .into_iter()
                .filter(|g| keys.contains(&g.slot_key()))
                .collect();

            app.print(&keys, || {
                keys.iter()
                    .map(|key| match games.iter().find(|g| &g.slot_key() == key) {
                        Some(game) => render::game_line(game),
                        None => key.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
    }
}

pub fn handle_stats(app: &App) -> Result<()> {
    let stats = app.stats.profile(Utc::now())?;
    app.print(&stats, || render::profile_stats(&stats))
}

pub fn handle_completions(shell: clap_complete::Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut io::stdout());
    Ok(())
}
