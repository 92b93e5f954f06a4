//! Core library surface for Wordbook: a single-table word list persisted in
//! SQLite, written from a background pool, and observed through live
//! snapshots that refresh after every write.
//!
//! The `bin` target only needs [`WordRepository`]; the lower layers are public
//! so tests and other front-ends can assemble them explicitly.
pub mod config;
pub mod db;
pub mod error;
pub mod live;
pub mod models;
pub mod repository;
pub mod scheduler;
pub mod ui;

pub use config::{StoreConfig, DEFAULT_WORKERS};
pub use db::{seed_sample_words, SeedHook, StoreManager, WordStore};
pub use error::{StoreError, TaskFailure};
pub use live::{LiveQuery, Subscription, TableObserver};
pub use models::{InsertOutcome, Word};
pub use repository::WordRepository;
pub use scheduler::WritePool;

/// The interactive front-end.
pub use ui::{run_app, App};
