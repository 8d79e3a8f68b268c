use std::path::PathBuf;

use critter_brain::definition::DefinitionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("brain definition: {0}")]
    Definition(#[from] DefinitionError),

    #[error("unknown stock brain {0:?} (expected forager or drifter)")]
    UnknownStock(String),
}
