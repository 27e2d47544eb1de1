mod source;

pub use source::{build_client, DatasetSource, DEFAULT_DATASET_URL};

use chrono::{Local, NaiveDate, TimeZone};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::favorites::{self, KeyValueStore, MemoryKeyValueStore};
use crate::profile::{self, Profile, RawRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to fetch dataset: {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("dataset request failed: {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read dataset file: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset is not a JSON array of records: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Every profile of the session in load order, plus the favorites backend.
///
/// Positions are stable for the lifetime of a load; favorites are persisted
/// by position.
pub struct ProfileStore {
    profiles: Vec<Profile>,
    favorites: Box<dyn KeyValueStore>,
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new(Box::new(MemoryKeyValueStore::new()))
    }
}

impl std::fmt::Debug for ProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileStore")
            .field("profiles", &self.profiles.len())
            .finish_non_exhaustive()
    }
}

/// Parses the dataset body, drops profiles whose marriage is fixed, and maps
/// the rest.
pub fn parse_dataset<Tz: TimeZone>(
    body: &str,
    today: NaiveDate,
    tz: &Tz,
) -> Result<Vec<Profile>, StoreError> {
    let entries: Vec<Value> =
        serde_json::from_str(body).map_err(|e| StoreError::Parse { source: e })?;
    let total = entries.len();

    let mut skipped = 0usize;
    let mut fixed = 0usize;
    let mut out = Vec::with_capacity(total);
    for entry in entries {
        let Some(raw) = RawRecord::from_json(entry) else {
            skipped += 1;
            continue;
        };
        if raw.is_marriage_fixed() {
            fixed += 1;
            continue;
        }
        out.push(profile::map_profile_in(&raw, today, tz));
    }

    if skipped > 0 {
        warn!(skipped, "ignored dataset entries that are not objects");
    }
    info!(total, active = out.len(), marriage_fixed = fixed, "dataset parsed");
    Ok(out)
}

impl ProfileStore {
    pub fn new(favorites: Box<dyn KeyValueStore>) -> Self {
        Self {
            profiles: Vec::new(),
            favorites,
        }
    }

    /// Fetches, normalizes and publishes the dataset. On failure the store is
    /// left empty.
    pub async fn load_all(
        &mut self,
        client: &reqwest::Client,
        source: &DatasetSource,
    ) -> Result<usize, StoreError> {
        self.profiles.clear();
        let body = source.fetch(client).await?;
        self.load_from_json(&body, Local::now().date_naive(), &Local)
    }

    pub fn load_from_json<Tz: TimeZone>(
        &mut self,
        body: &str,
        today: NaiveDate,
        tz: &Tz,
    ) -> Result<usize, StoreError> {
        self.profiles.clear();
        let mut profiles = parse_dataset(body, today, tz)?;

        let saved = favorites::load_favorites(self.favorites.as_ref());
        let mut applied = 0usize;
        for position in saved {
            if let Some(p) = profiles.get_mut(position) {
                p.favorite = true;
                applied += 1;
            }
        }
        debug!(applied, "favorites merged");

        self.profiles = profiles;
        Ok(self.profiles.len())
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn get(&self, position: usize) -> Option<&Profile> {
        self.profiles.get(position)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn favorite_positions(&self) -> Vec<usize> {
        self.profiles
            .iter()
            .enumerate()
            .filter(|(_, p)| p.favorite)
            .map(|(i, _)| i)
            .collect()
    }

    /// Sets one favorite flag and rewrites the persisted set before returning.
    /// `false` when `position` is out of range.
    pub fn set_favorite(&mut self, position: usize, value: bool) -> bool {
        let Some(p) = self.profiles.get_mut(position) else {
            warn!(position, "favorite toggle for unknown profile");
            return false;
        };
        p.favorite = value;
        let positions = self.favorite_positions();
        favorites::save_favorites(self.favorites.as_mut(), &positions);
        true
    }

    /// Flips one favorite flag, returning the new value.
    pub fn toggle_favorite(&mut self, position: usize) -> Option<bool> {
        let next = !self.profiles.get(position)?.favorite;
        self.set_favorite(position, next).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::{load_favorites, FAVORITES_STORAGE_KEY};
    use chrono::Utc;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 16).unwrap()
    }

    fn dataset() -> String {
        json!([
            { "Name": "Anil", "Is your marriage fixed ?": "No" },
            { "Name": "Bhavana", "Is your marriage fixed ?": " Yes" },
            { "Name": "Chaitanya" },
            7,
            { "Name": "Deepika", "Is your marriage fixed ?": "" }
        ])
        .to_string()
    }

    #[test]
    fn load_excludes_fixed_marriages_and_keeps_order() {
        let mut store = ProfileStore::default();
        let count = store.load_from_json(&dataset(), today(), &Utc).unwrap();
        assert_eq!(count, 3);
        let names: Vec<_> = store.profiles().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Anil", "Chaitanya", "Deepika"]);
    }

    #[test]
    fn malformed_body_leaves_store_empty() {
        let mut store = ProfileStore::default();
        store.load_from_json(&dataset(), today(), &Utc).unwrap();
        let err = store
            .load_from_json("{\"not\": \"an array\"}", today(), &Utc)
            .unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn persisted_favorites_are_merged_by_position() {
        let mut kv = MemoryKeyValueStore::new();
        kv.set(FAVORITES_STORAGE_KEY, "[2, 40]").unwrap();
        let mut store = ProfileStore::new(Box::new(kv));
        store.load_from_json(&dataset(), today(), &Utc).unwrap();
        assert_eq!(store.favorite_positions(), vec![2]);
        assert!(store.get(2).unwrap().favorite);
    }

    #[test]
    fn toggle_twice_restores_flag_and_storage() {
        let mut store = ProfileStore::default();
        store.load_from_json(&dataset(), today(), &Utc).unwrap();
        let before = load_favorites(store.favorites.as_ref());

        assert_eq!(store.toggle_favorite(1), Some(true));
        assert_eq!(load_favorites(store.favorites.as_ref()), vec![1]);
        assert_eq!(store.toggle_favorite(1), Some(false));

        assert!(!store.get(1).unwrap().favorite);
        assert_eq!(load_favorites(store.favorites.as_ref()), before);
    }

    #[test]
    fn unknown_position_is_ignored() {
        let mut store = ProfileStore::default();
        store.load_from_json(&dataset(), today(), &Utc).unwrap();
        assert!(!store.set_favorite(99, true));
        assert_eq!(store.toggle_favorite(99), None);
        assert!(store.favorite_positions().is_empty());
    }
}
