use std::path::PathBuf;

use thiserror::Error;

/// Error kinds surfaced by the style-clustering core.
///
/// Structural problems (missing artifacts, cardinality mismatches) are fatal
/// and must stop a caller before it serves predictions; per-query problems
/// (`NotFound`, `InvalidInput`) are recoverable and reported back.
#[derive(Debug, Error)]
pub enum StyleError {
    #[error("missing model artifact: {path}")]
    MissingArtifact { path: PathBuf },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("no player matching '{query}'")]
    NotFound { query: String },

    #[error("inconsistent model: {0}")]
    InconsistentModel(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cluster index {index} out of range for {k} clusters")]
    UnknownCluster { index: usize, k: usize },

    #[error("read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse artifact {path}")]
    ArtifactFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("read dataset {path}")]
    Dataset {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
