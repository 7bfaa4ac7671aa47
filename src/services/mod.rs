pub mod admin;
pub mod analytics;
pub mod bootstrap;
pub mod games;
pub mod stats;

pub use admin::AdminService;
pub use bootstrap::{BootstrapService, SeedReport, SEED_FLAG_KEY};
pub use games::{GameService, RuleHint};
pub use stats::{ProfileStats, StatsService};
