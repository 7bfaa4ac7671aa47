use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::domain::{
    CourtKind, GameKind, GameScope, Governorate, GroundCondition, PlayerPosition, SurfaceType,
};

#[derive(Parser, Debug)]
#[command(name = "and-one", author, version, about = "AndOne: basketball courts and pickup games in Tunisia")]
pub struct Cli {
    /// SQLite database file (defaults to ANDONE_DATABASE_PATH or and_one.db)
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Preferences file (defaults to ANDONE_PREFS_PATH or and_one_prefs.json)
    #[arg(long, global = true)]
    pub prefs: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Load the demo courts, players and games
    Seed {
        /// Seed even if it already ran
        #[arg(short, long)]
        force: bool,
    },
    /// Delete all courts, players and games, then seed again
    Reset,
    /// Browse and add courts
    Courts {
        #[clap(subcommand)]
        command: CourtCommand,
    },
    /// Browse and add players
    Players {
        #[clap(subcommand)]
        command: PlayerCommand,
    },
    /// Create, join and leave games
    Games {
        #[clap(subcommand)]
        command: GameCommand,
    },
    /// Favorite courts
    Favorites {
        #[clap(subcommand)]
        command: FavoriteCommand,
    },
    /// Game slots you want to hear about
    Waitlist {
        #[clap(subcommand)]
        command: WaitlistCommand,
    },
    /// Upcoming, past and favorite counts
    Stats,
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum CourtCommand {
    List {
        #[arg(short, long)]
        governorate: Option<Governorate>,
        #[arg(short, long)]
        kind: Option<CourtKind>,
        /// Only favorite courts
        #[arg(short, long)]
        favorites: bool,
    },
    Add(AddCourtArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct AddCourtArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub governorate: Governorate,
    #[arg(long)]
    pub city: String,
    /// half or full
    #[arg(long)]
    pub kind: CourtKind,
    #[arg(long, default_value_t = 2)]
    pub hoops: u32,
    #[arg(long)]
    pub lighting: bool,
    #[arg(long)]
    pub locker_room: bool,
    #[arg(long)]
    pub stands: bool,
    /// The court has no water point
    #[arg(long)]
    pub no_water: bool,
    #[arg(long)]
    pub parking: bool,
    /// Wheelchair accessible
    #[arg(long)]
    pub accessible: bool,
    #[arg(long)]
    pub surface: Option<SurfaceType>,
    #[arg(long)]
    pub condition: Option<GroundCondition>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum PlayerCommand {
    List,
    Add {
        nickname: String,
        /// 1 to 5, out of range values are clamped
        #[arg(short, long, default_value_t = 3, allow_negative_numbers = true)]
        level: i64,
        #[arg(short, long)]
        position: Option<PlayerPosition>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum GameCommand {
    List(ListGamesArgs),
    /// Create a game; the creator is its first player
    Create {
        #[arg(short, long)]
        kind: GameKind,
        /// Court id or name
        #[arg(short, long)]
        court: String,
        /// Player id or nickname
        #[arg(long)]
        creator: String,
        /// RFC 3339, or local "YYYY-MM-DD HH:MM"
        #[arg(short, long)]
        at: String,
    },
    Join {
        game: String,
        /// Player id or nickname
        #[arg(short, long)]
        player: String,
    },
    Leave {
        game: String,
        /// Player id or nickname
        #[arg(short, long)]
        player: String,
    },
    Show {
        game: String,
    },
    /// Capacity and court requirement of a game kind
    Hint {
        kind: GameKind,
        /// Court id or name to check against
        #[arg(short, long)]
        court: Option<String>,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ListGamesArgs {
    #[arg(short, long, value_enum, default_value_t = ScopeArg::Upcoming)]
    pub scope: ScopeArg,
    #[arg(short, long)]
    pub governorate: Option<Governorate>,
    #[arg(short, long)]
    pub kind: Option<GameKind>,
    #[arg(long)]
    pub court_kind: Option<CourtKind>,
    /// Also list games with no spot left
    #[arg(long)]
    pub include_full: bool,
    #[arg(long)]
    pub lighting: bool,
    #[arg(long)]
    pub parking: bool,
    #[arg(long)]
    pub water: bool,
    /// Only games with this player (id or nickname)
    #[arg(short, long)]
    pub player: Option<String>,
    /// Group by calendar day
    #[arg(long)]
    pub by_day: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeArg {
    Upcoming,
    Past,
    All,
}

impl From<ScopeArg> for GameScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Upcoming => GameScope::Upcoming,
            ScopeArg::Past => GameScope::Past,
            ScopeArg::All => GameScope::All,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum FavoriteCommand {
    /// Court id or name
    Toggle { court: String },
    List,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum WaitlistCommand {
    /// Watch or unwatch the slot of a game
    Toggle { game: String },
    List,
}
