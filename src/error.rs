use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the individual ETL phases. Every variant is fatal for a run.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("request to {url} failed")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to read document {}", path.display())]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("section anchor #{anchor} not found in document")]
    SectionNotFound { anchor: String },

    #[error("no table with class {class:?} follows section #{anchor}")]
    TableNotFound { anchor: String, class: String },

    #[error("table under section #{anchor} has no data rows")]
    EmptyTable { anchor: String },

    #[error("malformed row {row}: {reason} (value {value:?})")]
    MalformedRow {
        row: usize,
        value: String,
        reason: String,
    },

    #[error("failed to read rate file {}", path.display())]
    RateFile {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid rate {value:?} on line {line} of {}", path.display())]
    RateValue {
        path: PathBuf,
        line: u64,
        value: String,
    },

    #[error("currency {code} missing from rate file {}", path.display())]
    MissingRate { code: String, path: PathBuf },

    #[error("failed to write csv {}", path.display())]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read csv {}", path.display())]
    CsvRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("store error while {context}")]
    Store {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to write progress log {}", path.display())]
    ProgressLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EtlError {
    pub(crate) fn store(context: impl Into<String>, source: rusqlite::Error) -> Self {
        EtlError::Store {
            context: context.into(),
            source,
        }
    }
}
