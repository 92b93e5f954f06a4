use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::models::Word;

use super::words::WordStore;

/// One-time hook run right after the store is constructed, before any other
/// caller can see it.
pub type SeedHook = dyn Fn(&WordStore) -> Result<(), StoreError> + Send + Sync;

static GLOBAL: OnceLock<Arc<StoreManager>> = OnceLock::new();

/// Hands out a single lazily opened [`WordStore`].
///
/// The fast path is a lock-free read of the published instance. Construction
/// happens under `construction`, re-checking the slot after acquiring it, so
/// concurrent first callers open the file and run the seed hook at most once.
/// A failed construction publishes nothing and the next call tries again.
pub struct StoreManager {
    instance: OnceLock<Arc<WordStore>>,
    construction: Mutex<()>,
}

impl Default for StoreManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreManager {
    pub fn new() -> Self {
        Self {
            instance: OnceLock::new(),
            construction: Mutex::new(()),
        }
    }

    /// The process-wide manager.
    pub fn global() -> Arc<StoreManager> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(StoreManager::new())))
    }

    /// Return the shared store, opening it from `config` and running `seed`
    /// on first use. Once a store exists both arguments are ignored.
    pub fn get_or_open(
        &self,
        config: &StoreConfig,
        seed: Option<&SeedHook>,
    ) -> Result<Arc<WordStore>, StoreError> {
        if let Some(store) = self.instance.get() {
            return Ok(Arc::clone(store));
        }

        let _guard = self.construction.lock();
        if let Some(store) = self.instance.get() {
            return Ok(Arc::clone(store));
        }

        let store = WordStore::open(config)?;
        if let Some(seed) = seed {
            seed(&store).map_err(|err| StoreError::construction(config.path(), err))?;
            debug!(path = %config.path().display(), "word store seeded");
        }

        let store = self.instance.get_or_init(|| Arc::new(store));
        debug!(path = %store.path().display(), "word store opened");
        Ok(Arc::clone(store))
    }

    /// The store if it has already been opened.
    pub fn get(&self) -> Option<Arc<WordStore>> {
        self.instance.get().cloned()
    }

    pub fn is_open(&self) -> bool {
        self.instance.get().is_some()
    }
}

/// Sample seeding: start every fresh open from a known two-word table.
pub fn seed_sample_words(store: &WordStore) -> Result<(), StoreError> {
    store.delete_all()?;
    store.insert(&Word::new("Hello")?)?;
    store.insert(&Word::new("world")?)?;
    Ok(())
}
