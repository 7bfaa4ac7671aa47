use anyhow::Result;

use and_one::cli::{Cli, Command};
use and_one::config::settings::AppConfig;
use and_one::{
    handle_completions, handle_courts, handle_favorites, handle_games, handle_players,
    handle_reset, handle_seed, handle_stats, handle_waitlist, interpret, prepare, App,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let cli = interpret();
    execute_command(&cli)
}

fn execute_command(cli: &Cli) -> Result<()> {
    if let Command::Completions { shell } = &cli.command {
        return handle_completions(*shell);
    }

    let config = AppConfig::new()
        .with_database_path(cli.database.clone())
        .with_prefs_path(cli.prefs.clone());
    let app = App::open(&config, cli.json)?;
    prepare(&app, &config, &cli.command)?;

    match &cli.command {
        Command::Seed { force } => handle_seed(&app, *force),
        Command::Reset => handle_reset(&app),
        Command::Courts { command } => handle_courts(&app, command),
        Command::Players { command } => handle_players(&app, command),
        Command::Games { command } => handle_games(&app, command),
        Command::Favorites { command } => handle_favorites(&app, command),
        Command::Waitlist { command } => handle_waitlist(&app, command),
        Command::Stats => handle_stats(&app),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
