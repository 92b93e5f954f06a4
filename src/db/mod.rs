//! Persistence layer split into the connection bootstrap, the single-table
//! row store, and the process-wide manager that owns it.

mod connection;
mod manager;
mod words;

pub use manager::{seed_sample_words, SeedHook, StoreManager};
pub use words::WordStore;
