//! Push-based view of the sorted word list.
//!
//! A [`LiveQuery`] attaches itself to the store as a [`TableObserver`]. After
//! every committed write it re-reads the whole table on the writing thread
//! and sends the fresh snapshot to each [`Subscription`]. Senders are
//! unbounded, so a subscriber that never reads does not hold up the others.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::db::WordStore;
use crate::error::StoreError;
use crate::models::Word;

/// Hook invoked by [`WordStore`] after each write statement commits.
pub trait TableObserver: Send + Sync {
    fn on_table_changed(&self, store: &WordStore);
}

pub struct LiveQuery {
    subscribers: Mutex<HashMap<u64, Sender<Vec<Word>>>>,
    next_id: AtomicU64,
    /// Serializes read-then-send so an older snapshot is never sent after a
    /// newer one.
    evaluation: Mutex<()>,
    attached: Mutex<bool>,
}

impl LiveQuery {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            evaluation: Mutex::new(()),
            attached: Mutex::new(false),
        })
    }

    /// Register a subscriber. Nothing is delivered until the owner calls
    /// [`LiveQuery::deliver_initial`] or a write lands.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = unbounded();
        self.subscribers.lock().insert(id, tx);
        debug!(subscription = id, "subscriber registered");
        Subscription {
            id,
            updates: rx,
            query: Arc::downgrade(self),
        }
    }

    /// Start listening to `store`. Safe to call repeatedly; only the first
    /// call registers.
    pub fn attach(self: &Arc<Self>, store: &WordStore) {
        let mut attached = self.attached.lock();
        if !*attached {
            store.add_observer(self);
            *attached = true;
            debug!("live word query attached");
        }
    }

    /// Evaluate the query and send the result to one subscriber only.
    pub fn deliver_initial(&self, store: &WordStore, id: u64) -> Result<(), StoreError> {
        let _evaluation = self.evaluation.lock();
        let Some(sender) = self.subscribers.lock().get(&id).cloned() else {
            return Ok(());
        };
        let words = store.fetch_alphabetized_words()?;
        if sender.send(words).is_err() {
            self.remove(id);
        }
        Ok(())
    }

    /// Evaluate the query and broadcast the snapshot to every subscriber.
    pub fn refresh(&self, store: &WordStore) -> Result<(), StoreError> {
        let _evaluation = self.evaluation.lock();
        if self.subscribers.lock().is_empty() {
            return Ok(());
        }
        let words = store.fetch_alphabetized_words()?;

        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|_, sender| sender.send(words.clone()).is_ok());
        Ok(())
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    fn remove(&self, id: u64) {
        if self.subscribers.lock().remove(&id).is_some() {
            debug!(subscription = id, "subscriber removed");
        }
    }
}

impl TableObserver for LiveQuery {
    fn on_table_changed(&self, store: &WordStore) {
        if let Err(err) = self.refresh(store) {
            error!(error = %err, "failed to re-evaluate word list");
        }
    }
}

/// A live feed of sorted word lists. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    updates: Receiver<Vec<Word>>,
    query: Weak<LiveQuery>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Block until the next snapshot. `None` once unsubscribed and drained.
    pub fn recv(&self) -> Option<Vec<Word>> {
        self.updates.recv().ok()
    }

    /// Like [`Subscription::recv`] but gives up after `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Vec<Word>> {
        self.updates.recv_timeout(timeout).ok()
    }

    /// Drain everything pending and keep only the newest snapshot.
    pub fn try_latest(&self) -> Option<Vec<Word>> {
        self.updates.try_iter().last()
    }

    /// Stop further deliveries. Snapshots already sent stay readable.
    pub fn unsubscribe(&self) {
        if let Some(query) = self.query.upgrade() {
            query.remove(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use tempfile::tempdir;

    const WAIT: Duration = Duration::from_secs(5);

    fn setup() -> (WordStore, Arc<LiveQuery>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = WordStore::open(&StoreConfig::in_dir(dir.path())).unwrap();
        let query = LiveQuery::new();
        query.attach(&store);
        (store, query, dir)
    }

    fn texts(words: Vec<Word>) -> Vec<String> {
        words.into_iter().map(Word::into_inner).collect()
    }

    #[test]
    fn initial_delivery_goes_to_one_subscriber() {
        let (store, query, _dir) = setup();
        let first = query.subscribe();
        let second = query.subscribe();

        query.deliver_initial(&store, second.id()).unwrap();

        assert_eq!(second.recv_timeout(WAIT), Some(Vec::new()));
        assert!(first.try_latest().is_none());
    }

    #[test]
    fn writes_push_full_snapshots() {
        let (store, query, _dir) = setup();
        let sub = query.subscribe();

        store.insert(&Word::new("beta").unwrap()).unwrap();
        store.insert(&Word::new("alpha").unwrap()).unwrap();

        assert_eq!(texts(sub.recv_timeout(WAIT).unwrap()), ["beta"]);
        assert_eq!(texts(sub.recv_timeout(WAIT).unwrap()), ["alpha", "beta"]);
    }

    #[test]
    fn try_latest_skips_intermediate_snapshots() {
        let (store, query, _dir) = setup();
        let sub = query.subscribe();

        for text in ["a", "b", "c"] {
            store.insert(&Word::new(text).unwrap()).unwrap();
        }

        assert_eq!(texts(sub.try_latest().unwrap()), ["a", "b", "c"]);
        assert!(sub.try_latest().is_none());
    }

    #[test]
    fn dropping_a_subscription_unregisters_it() {
        let (store, query, _dir) = setup();
        let kept = query.subscribe();
        let dropped = query.subscribe();
        drop(dropped);

        assert_eq!(query.subscriber_count(), 1);
        store.delete_all().unwrap();
        assert_eq!(kept.recv_timeout(WAIT), Some(Vec::new()));
    }

    #[test]
    fn attaching_twice_registers_once() {
        let (store, query, _dir) = setup();
        query.attach(&store);
        let sub = query.subscribe();

        store.insert(&Word::new("once").unwrap()).unwrap();

        assert!(sub.recv_timeout(WAIT).is_some());
        assert!(sub.try_latest().is_none());
    }
}
