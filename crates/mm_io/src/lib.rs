//! crates/mm_io/src/lib.rs
//! File adapters for the constituency engine.
//!
//! - Readers turn on-disk tables, candidate JSON and GeoJSON into `mm_core` shapes.
//! - Writers emit canonical JSON and per-constituency GeoJSON, atomically;
//!   whole output trees are staged and committed with `staging::StagingDir`.
//! - One error type (`IoError`) with `From` conversions used across modules.

#![forbid(unsafe_code)]

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, create_dir_all, rename, fsync, ...).
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON serialization/deserialization errors with an optional JSON Pointer.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    #[error("csv error in {file}: {msg}")]
    Csv { file: String, msg: String },

    #[error("geojson error in {file}: {msg}")]
    GeoJson { file: String, msg: String },

    /// Well-formed input that breaks a domain rule.
    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps line/column, not a pointer; report at root.
        IoError::Json {
            pointer: "/".to_string(),
            msg: e.to_string(),
        }
    }
}

pub mod candidates;
pub mod canonical_json;
pub mod geo;
pub mod loader;
pub mod staging;
pub mod tables;

pub mod prelude {
    pub use crate::{IoError, IoResult};

    pub use crate::candidates::read_candidates_json;
    pub use crate::canonical_json::{to_canonical_bytes, write_canonical_file};
    pub use crate::geo::{read_keyed_collection, write_boundary_feature};
    pub use crate::loader::load_params;
    pub use crate::staging::StagingDir;
    pub use crate::tables::{read_constituency_table, read_results_csv};
}
