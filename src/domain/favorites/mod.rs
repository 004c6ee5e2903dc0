//! Favorites domain — the persisted set of favorited asset ids.

pub mod storage;

use crate::error::StorageError;
use crate::shared::AssetId;
use std::collections::BTreeSet;

pub use storage::{FileStore, KeyValueStore, MemoryStore};

/// Set of favorited asset ids.
pub type FavoriteSet = BTreeSet<AssetId>;

/// Durable favorites, persisted as a JSON array of ids under one key.
///
/// Every mutation is written to storage before the in-memory set changes,
/// so a failed write leaves both sides as they were.
pub struct FavoritesStore {
    storage: Box<dyn KeyValueStore>,
    key: String,
    ids: FavoriteSet,
    revision: u64,
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore")
            .field("key", &self.key)
            .field("ids", &self.ids)
            .field("revision", &self.revision)
            .finish()
    }
}

impl FavoritesStore {
    /// Load the persisted set. Absent, unreadable or malformed payloads
    /// yield an empty set.
    pub fn load(storage: impl KeyValueStore + 'static, key: &str) -> Self {
        let ids = match read_ids(&storage, key) {
            Ok(ids) => ids,
            Err(err) => {
                tracing::warn!(key, error = %err, "Ignoring unreadable favorites");
                FavoriteSet::new()
            }
        };

        Self {
            storage: Box::new(storage),
            key: key.to_string(),
            ids,
            revision: 0,
        }
    }

    pub fn is_favorite(&self, id: &AssetId) -> bool {
        self.ids.contains(id)
    }

    /// Add `id` if absent, remove it if present. Returns the new membership.
    pub fn toggle(&mut self, id: &AssetId) -> Result<bool, StorageError> {
        let mut next = self.ids.clone();
        let now_favorite = if next.remove(id) {
            false
        } else {
            next.insert(id.clone());
            true
        };

        let payload = serde_json::to_string(&next)?;
        self.storage.set(&self.key, &payload)?;

        self.ids = next;
        self.revision += 1;
        Ok(now_favorite)
    }

    pub fn ids(&self) -> &FavoriteSet {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Bumped on every successful toggle.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }
}

fn read_ids(storage: &impl KeyValueStore, key: &str) -> Result<FavoriteSet, StorageError> {
    match storage.get(key)? {
        Some(payload) => {
            let ids: Vec<AssetId> = serde_json::from_str(&payload)?;
            Ok(ids.into_iter().collect())
        }
        None => Ok(FavoriteSet::new()),
    }
}
