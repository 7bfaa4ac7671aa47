use anyhow::Result;
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use super::store::KeyValueStore;
use super::stored_set::StoredSet;
use crate::domain::models;

pub const WAITLIST_KEY: &str = "andone.waitlist_game_keys";

/// Game slots being watched, keyed by (court, minute) rather than game id so
/// the entry outlives changes to the game record.
pub struct Waitlist {
    keys: StoredSet<String>,
}

impl Waitlist {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            keys: StoredSet::new(store, WAITLIST_KEY),
        }
    }

    pub fn key_for(court_id: Uuid, scheduled_at: DateTime<Utc>) -> String {
        models::slot_key(court_id, scheduled_at)
    }

    pub fn is_watching(&self, key: &str) -> Result<bool> {
        self.keys.contains(&key.to_string())
    }

    /// Returns true when the slot is watched after the call.
    pub fn toggle(&self, key: &str) -> Result<bool> {
        let watching = self.keys.toggle(&key.to_string())?;
        debug!("Waitlist {}: {}", key, watching);
        Ok(watching)
    }

    pub fn keys(&self) -> Result<BTreeSet<String>> {
        self.keys.members()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::store::MemoryStore;
    use chrono::TimeZone;

    #[test]
    fn test_key_ignores_seconds() {
        let court = Uuid::new_v4();
        let a = Utc.with_ymd_and_hms(2025, 10, 15, 18, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2025, 10, 15, 18, 0, 59).unwrap();
        let c = Utc.with_ymd_and_hms(2025, 10, 15, 18, 1, 0).unwrap();

        assert_eq!(Waitlist::key_for(court, a), Waitlist::key_for(court, b));
        assert_ne!(Waitlist::key_for(court, a), Waitlist::key_for(court, c));
        assert_ne!(Waitlist::key_for(court, a), Waitlist::key_for(Uuid::new_v4(), a));
    }

    #[test]
    fn test_toggle_watch() {
        let waitlist = Waitlist::new(Arc::new(MemoryStore::new()));
        let key = Waitlist::key_for(Uuid::new_v4(), Utc::now());

        assert!(!waitlist.is_watching(&key).unwrap());
        assert!(waitlist.toggle(&key).unwrap());
        assert!(waitlist.is_watching(&key).unwrap());
        assert_eq!(waitlist.keys().unwrap().len(), 1);
        assert!(!waitlist.toggle(&key).unwrap());
        assert!(waitlist.keys().unwrap().is_empty());
    }

    #[test]
    fn test_waitlist_and_favorites_do_not_collide() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let waitlist = Waitlist::new(store.clone());
        let favorites = crate::prefs::Favorites::new(store);
        let court = Uuid::new_v4();

        favorites.toggle(court).unwrap();
        assert!(waitlist.keys().unwrap().is_empty());
    }
}
