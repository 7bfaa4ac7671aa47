use std::env;

pub const DATABASE_PATH_VAR: &str = "ANDONE_DATABASE_PATH";
pub const PREFS_PATH_VAR: &str = "ANDONE_PREFS_PATH";
pub const AUTO_SEED_VAR: &str = "ANDONE_AUTO_SEED";

#[derive(Debug, Clone, PartialEq)]
pub struct StorageSettings {
    pub database_path: String,
    pub prefs_path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: "and_one.db".to_string(),
            prefs_path: "and_one_prefs.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeedSettings {
    /// Populate the demo catalog on start when it has never been seeded.
    pub auto_seed: bool,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self { auto_seed: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub storage: StorageSettings,
    pub seed: SeedSettings,
}

impl AppConfig {
    /// Defaults overridden by `ANDONE_*` environment variables.
    pub fn new() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup(DATABASE_PATH_VAR).filter(|v| !v.trim().is_empty()) {
            config.storage.database_path = path;
        }
        if let Some(path) = lookup(PREFS_PATH_VAR).filter(|v| !v.trim().is_empty()) {
            config.storage.prefs_path = path;
        }
        if let Some(flag) = lookup(AUTO_SEED_VAR) {
            config.seed.auto_seed = parse_flag(&flag).unwrap_or(config.seed.auto_seed);
        }

        config
    }

    pub fn with_database_path(mut self, path: Option<String>) -> Self {
        if let Some(path) = path {
            self.storage.database_path = path;
        }
        self
    }

    pub fn with_prefs_path(mut self, path: Option<String>) -> Self {
        if let Some(path) = path {
            self.storage.prefs_path = path;
        }
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.storage.database_path, "and_one.db");
        assert!(config.seed.auto_seed);
    }

    #[test]
    fn test_environment_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (DATABASE_PATH_VAR, "/tmp/courts.db"),
            (PREFS_PATH_VAR, ""),
            (AUTO_SEED_VAR, "off"),
        ]));

        assert_eq!(config.storage.database_path, "/tmp/courts.db");
        assert_eq!(config.storage.prefs_path, "and_one_prefs.json");
        assert!(!config.seed.auto_seed);
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = AppConfig::default()
            .with_database_path(Some("other.db".to_string()))
            .with_prefs_path(None);

        assert_eq!(config.storage.database_path, "other.db");
        assert_eq!(config.storage.prefs_path, "and_one_prefs.json");
    }
}
