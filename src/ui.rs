//! Ratatui front-end: one scrolling list of words kept current from a live
//! subscription, plus a small dialog for adding a word. All persistence goes
//! through [`crate::WordRepository`].

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
