use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rusqlite::{params, Connection, Error as SqlError, ErrorCode};
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::live::TableObserver;
use crate::models::{InsertOutcome, Word};

use super::connection::open_connection;

/// The open `word_table`. One connection serves every caller; each public
/// method runs exactly one statement while holding the connection lock, so a
/// reader never sees half of an insert or delete.
pub struct WordStore {
    conn: Mutex<Connection>,
    path: PathBuf,
    observers: Mutex<Vec<Weak<dyn TableObserver>>>,
}

impl WordStore {
    /// Open (or create) the backing file and make sure the table exists.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let conn = open_connection(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: config.path().to_path_buf(),
            observers: Mutex::new(Vec::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add `word` unless the key already exists. A duplicate is reported as
    /// [`InsertOutcome::ConflictIgnored`] and still counts as a committed write,
    /// so observers are notified either way.
    pub fn insert(&self, word: &Word) -> Result<InsertOutcome, StoreError> {
        let inserted = {
            let conn = self.conn.lock();
            conn.execute(
                "INSERT INTO word_table (word) VALUES (?1) ON CONFLICT(word) DO NOTHING",
                params![word.as_str()],
            )
            .map_err(|err| map_constraint(err, "failed to insert word"))?
        };

        self.notify_observers();

        if inserted == 0 {
            debug!(word = %word, "duplicate word ignored");
            Ok(InsertOutcome::ConflictIgnored)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    /// Remove every row, returning how many were deleted.
    pub fn delete_all(&self) -> Result<usize, StoreError> {
        let deleted = {
            let conn = self.conn.lock();
            conn.execute("DELETE FROM word_table", [])
                .map_err(fault("failed to delete words"))?
        };

        self.notify_observers();
        Ok(deleted)
    }

    /// Every word, ascending by key under the `BINARY` collation.
    pub fn fetch_alphabetized_words(&self) -> Result<Vec<Word>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT word FROM word_table ORDER BY word ASC")
            .map_err(fault("failed to prepare word query"))?;

        let texts = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(fault("failed to load words"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(fault("failed to collect words"))?;

        texts.into_iter().map(Word::new).collect()
    }

    /// Register an observer that runs after every committed write. Only a weak
    /// reference is kept; dropped observers are pruned on the next write.
    pub fn add_observer<T>(&self, observer: &Arc<T>)
    where
        T: TableObserver + 'static,
    {
        let weak: Weak<dyn TableObserver> = Arc::downgrade(observer) as Weak<dyn TableObserver>;
        self.observers.lock().push(weak);
    }

    /// Called on the writing thread once the connection lock is released, so
    /// observers are free to query the table again.
    fn notify_observers(&self) {
        let live: Vec<Arc<dyn TableObserver>> = {
            let mut observers = self.observers.lock();
            observers.retain(|observer| observer.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };

        for observer in live {
            observer.on_table_changed(self);
        }
    }
}

fn fault(context: &'static str) -> impl FnOnce(SqlError) -> StoreError {
    move |source| StoreError::StorageFault { context, source }
}

/// Constraint violations on the key column mean the row itself was bad; any
/// other engine error is a storage fault.
fn map_constraint(err: SqlError, context: &'static str) -> StoreError {
    if matches!(err.sqlite_error_code(), Some(ErrorCode::ConstraintViolation)) {
        StoreError::InvalidRow {
            reason: err.to_string(),
        }
    } else {
        StoreError::StorageFault {
            context,
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use tempfile::tempdir;

    fn setup_store() -> (WordStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = WordStore::open(&StoreConfig::in_dir(dir.path())).unwrap();
        (store, dir)
    }

    fn texts(words: &[Word]) -> Vec<&str> {
        words.iter().map(Word::as_str).collect()
    }

    fn word(text: &str) -> Word {
        Word::new(text).unwrap()
    }

    #[derive(Default)]
    struct CountingObserver {
        calls: AtomicUsize,
    }

    impl TableObserver for CountingObserver {
        fn on_table_changed(&self, _store: &WordStore) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn empty_table_reads_as_empty() {
        let (store, _dir) = setup_store();
        assert!(store.fetch_alphabetized_words().unwrap().is_empty());
    }

    #[test]
    fn duplicate_insert_is_ignored() {
        let (store, _dir) = setup_store();

        assert_eq!(store.insert(&word("banana")).unwrap(), InsertOutcome::Inserted);
        assert_eq!(
            store.insert(&word("banana")).unwrap(),
            InsertOutcome::ConflictIgnored
        );
        assert_eq!(texts(&store.fetch_alphabetized_words().unwrap()), ["banana"]);
    }

    #[test]
    fn reads_are_sorted_case_sensitively() {
        let (store, _dir) = setup_store();
        for text in ["world", "alpha", "Hello", "Zeta"] {
            store.insert(&word(text)).unwrap();
        }

        let words = store.fetch_alphabetized_words().unwrap();
        assert_eq!(texts(&words), ["Hello", "Zeta", "alpha", "world"]);
        assert!(words.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn delete_all_empties_the_table() {
        let (store, _dir) = setup_store();
        store.insert(&word("one")).unwrap();
        store.insert(&word("two")).unwrap();

        assert_eq!(store.delete_all().unwrap(), 2);
        assert!(store.fetch_alphabetized_words().unwrap().is_empty());
    }

    #[test]
    fn rows_survive_reopening_the_file() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::in_dir(dir.path());
        {
            let store = WordStore::open(&config).unwrap();
            store.insert(&word("kept")).unwrap();
        }

        let reopened = WordStore::open(&config).unwrap();
        assert_eq!(texts(&reopened.fetch_alphabetized_words().unwrap()), ["kept"]);
    }

    #[test]
    fn empty_key_is_rejected_by_the_table() {
        let (store, _dir) = setup_store();
        let err = store
            .conn
            .lock()
            .execute("INSERT INTO word_table (word) VALUES ('')", [])
            .map_err(|err| map_constraint(err, "failed to insert word"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidRow { .. }));
    }

    #[test]
    fn every_write_attempt_notifies_observers() {
        let (store, _dir) = setup_store();
        let observer = Arc::new(CountingObserver::default());
        store.add_observer(&observer);

        store.insert(&word("same")).unwrap();
        store.insert(&word("same")).unwrap();
        store.delete_all().unwrap();

        assert_eq!(observer.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn dropped_observers_are_pruned() {
        let (store, _dir) = setup_store();
        let observer = Arc::new(CountingObserver::default());
        store.add_observer(&observer);
        drop(observer);

        store.insert(&word("after")).unwrap();
        assert!(store.observers.lock().is_empty());
    }
}
