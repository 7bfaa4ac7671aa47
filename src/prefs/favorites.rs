use anyhow::Result;
use log::debug;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use super::store::KeyValueStore;
use super::stored_set::StoredSet;

pub const FAVORITES_KEY: &str = "andone.fav_court_ids";

/// Favorite courts, by court id.
pub struct Favorites {
    ids: StoredSet<Uuid>,
}

impl Favorites {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            ids: StoredSet::new(store, FAVORITES_KEY),
        }
    }

    pub fn is_favorite(&self, court_id: Uuid) -> Result<bool> {
        self.ids.contains(&court_id)
    }

    /// Returns true when the court is a favorite after the call.
    pub fn toggle(&self, court_id: Uuid) -> Result<bool> {
        let favorite = self.ids.toggle(&court_id)?;
        debug!("Court {} favorite: {}", court_id, favorite);
        Ok(favorite)
    }

    pub fn ids(&self) -> Result<HashSet<Uuid>> {
        Ok(self.ids.members()?.into_iter().collect())
    }

    pub fn sorted_ids(&self) -> Result<BTreeSet<Uuid>> {
        self.ids.members()
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.ids.members()?.len())
    }
}
