//! Error type shared by the persistence, session and export layers. The UI
//! wraps these in `anyhow` so every failure can be surfaced in the footer.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to open database at '{path}': {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Sign-up attempted with a username that is already stored.
    #[error("Username '{0}' already exists.")]
    UsernameTaken(String),

    /// A form failed validation; the message is shown to the user verbatim.
    #[error("{0}")]
    Validation(String),

    #[error("Select a record to delete.")]
    NoSelection,

    #[error("Loan record {0} not found.")]
    RecordNotFound(i64),

    /// Export requested while the loan table is empty.
    #[error("No records to export.")]
    NoData,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
}

impl Error {
    /// Errors caused by user input rather than the environment. These are
    /// reported in the UI but not logged as failures.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::UsernameTaken(_)
                | Error::Validation(_)
                | Error::NoSelection
                | Error::RecordNotFound(_)
                | Error::NoData
        )
    }
}
