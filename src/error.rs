use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("task title cannot be empty")]
    EmptyTitle,

    #[error("invalid due date `{0}` (expected YYYY-MM-DD)")]
    InvalidDueDate(String),

    #[error("unknown status `{0}` (expected todo, progress or done)")]
    InvalidStatus(String),

    #[error("unknown priority `{0}` (expected low, medium or high)")]
    InvalidPriority(String),

    #[error("no task with id {0}")]
    TaskNotFound(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("board file {path} is not valid JSON; move it aside to start a new board")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
