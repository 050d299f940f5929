use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Unable to open table {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Table {path:?} has no header line")]
    EmptyHeader { path: PathBuf },

    #[error("No such column {column:?} in table {path:?}")]
    MissingColumn { column: String, path: PathBuf },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("Malformed time of day {0:?}, expected HH:MM:SS")]
    Malformed(String),
}
