//! The entry point the front-end talks to: queue an insert, or subscribe to
//! the sorted word list. Neither call touches the database on the caller's
//! thread; opening the store, writing, and every read run on the write pool.

use std::io;
use std::sync::Arc;

use crossbeam_channel::Receiver;

use crate::config::{StoreConfig, DEFAULT_WORKERS};
use crate::db::{SeedHook, StoreManager, WordStore};
use crate::error::{StoreError, TaskFailure};
use crate::live::{LiveQuery, Subscription};
use crate::models::Word;
use crate::scheduler::WritePool;

/// State the background jobs need. Cloned into each job as an `Arc`.
struct Shared {
    manager: Arc<StoreManager>,
    config: StoreConfig,
    seed: Option<Arc<SeedHook>>,
    all_words: Arc<LiveQuery>,
}

impl Shared {
    /// Open (or reuse) the singleton store and make sure the live query is
    /// listening to it before anyone reads.
    fn store(&self) -> Result<Arc<WordStore>, StoreError> {
        let store = self.manager.get_or_open(&self.config, self.seed.as_deref())?;
        self.all_words.attach(&store);
        Ok(store)
    }
}

pub struct WordRepository {
    shared: Arc<Shared>,
    pool: Arc<WritePool>,
}

impl WordRepository {
    /// Repository over the process-wide store with its own pool of
    /// [`DEFAULT_WORKERS`] writers.
    pub fn open(config: StoreConfig) -> io::Result<Self> {
        let pool = Arc::new(WritePool::new(DEFAULT_WORKERS)?);
        Ok(Self::with_parts(StoreManager::global(), pool, config, None))
    }

    /// Assemble a repository from explicit parts. `seed` only runs if this
    /// repository is the one that ends up constructing the store.
    pub fn with_parts(
        manager: Arc<StoreManager>,
        pool: Arc<WritePool>,
        config: StoreConfig,
        seed: Option<Arc<SeedHook>>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                manager,
                config,
                seed,
                all_words: LiveQuery::new(),
            }),
            pool,
        }
    }

    /// Validate `text` and queue the insert. Only validation errors come back
    /// here; storage failures go to [`WordRepository::errors`].
    pub fn insert(&self, text: &str) -> Result<(), StoreError> {
        let word = Word::new(text)?;
        let shared = Arc::clone(&self.shared);
        self.pool.submit("insert word", move || {
            shared.store()?.insert(&word)?;
            Ok(())
        });
        Ok(())
    }

    /// Live, sorted word list. The first snapshot is computed on the pool, so
    /// this returns before the store is even open; an empty table delivers `[]`.
    pub fn subscribe_all_words(&self) -> Subscription {
        let subscription = self.shared.all_words.subscribe();
        let id = subscription.id();
        let shared = Arc::clone(&self.shared);
        self.pool.submit("deliver word list", move || {
            let store = shared.store()?;
            shared.all_words.deliver_initial(&store, id)
        });
        subscription
    }

    /// Failures from background jobs queued by this repository's pool.
    pub fn errors(&self) -> Receiver<TaskFailure> {
        self.pool.errors()
    }
}
