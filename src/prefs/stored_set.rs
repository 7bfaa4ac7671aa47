use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::sync::Arc;

use super::store::{KeyValueStore, KeyValueStoreExt};

/// A set of values kept as a JSON array under one key.
pub(crate) struct StoredSet<T> {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    _marker: PhantomData<T>,
}

impl<T> StoredSet<T>
where
    T: Serialize + DeserializeOwned + Ord + Clone,
{
    pub(crate) fn new(store: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            _marker: PhantomData,
        }
    }

    pub(crate) fn members(&self) -> Result<BTreeSet<T>> {
        let items: Option<Vec<T>> = self.store.get_as(self.key)?;
        Ok(items.unwrap_or_default().into_iter().collect())
    }

    pub(crate) fn contains(&self, item: &T) -> Result<bool> {
        Ok(self.members()?.contains(item))
    }

    /// Flip membership of `item`; returns whether it is a member afterwards.
    pub(crate) fn toggle(&self, item: &T) -> Result<bool> {
        let mut now_member = false;

        self.store.update_as(self.key, |items: Option<Vec<T>>| {
            let mut members: BTreeSet<T> = items.unwrap_or_default().into_iter().collect();
            now_member = if members.remove(item) {
                false
            } else {
                members.insert(item.clone());
                true
            };
            Ok(Some(members.into_iter().collect::<Vec<T>>()))
        })?;

        Ok(now_member)
    }
}
