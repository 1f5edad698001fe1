//! Load-phase error types.
//!
//! Only loading (model files, config files, images) can fail. Frame logic
//! never returns errors; it clamps or ignores bad input instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalkthroughError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse model {path}: {source}")]
    ModelParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Node '{node}' references unknown material '{material}'")]
    UnknownMaterial { node: String, material: String },
    #[error("Failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, WalkthroughError>;
