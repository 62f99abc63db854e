use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the edges of the crate: reading data, reading or
/// writing config and preference files, writing exports.
///
/// The aggregation functions themselves never fail.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown dataset `{0}`")]
    UnknownDataset(String),

    #[error("unknown map layer `{0}`")]
    UnknownLayer(String),

    #[error("no data registered for dataset `{0}`")]
    MissingDataset(String),
}

impl ProfileError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProfileError>;
