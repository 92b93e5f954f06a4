//! Error taxonomy for the data-access layer.
//!
//! Validation problems surface synchronously as [`StoreError::InvalidRow`].
//! Storage and construction problems happen on worker threads, so the write
//! pool wraps them in a [`TaskFailure`] and hands them to the out-of-band
//! error channel instead of the (already returned) caller.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The key was missing or empty. Raised before the store is touched, or
    /// when the engine itself rejects the row through a column constraint.
    #[error("invalid word: {reason}")]
    InvalidRow { reason: String },

    /// The storage engine failed while running a statement.
    #[error("{context}")]
    StorageFault {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// The backing file could not be opened or created. The singleton stays
    /// unset, so a later access retries.
    #[error("failed to open word store at {}", .path.display())]
    ConstructionFailure {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StoreError {
    pub(crate) fn construction(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        StoreError::ConstructionFailure {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// A background job that did not finish cleanly.
#[derive(Debug, Error)]
pub enum TaskFailure {
    #[error("background task `{task}` failed")]
    Failed {
        task: &'static str,
        #[source]
        error: StoreError,
    },

    #[error("background task `{task}` panicked: {message}")]
    Panicked { task: &'static str, message: String },
}

impl TaskFailure {
    pub fn task(&self) -> &'static str {
        match self {
            TaskFailure::Failed { task, .. } | TaskFailure::Panicked { task, .. } => task,
        }
    }
}
