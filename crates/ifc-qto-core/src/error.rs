// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for take-off runs
//!
//! Only failures that abort a whole run live here. Per-entity and per-file
//! problems are recorded in the results instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for take-off operations
pub type Result<T> = std::result::Result<T, QtoError>;

/// Errors that abort a take-off run
#[derive(Error, Debug)]
pub enum QtoError {
    /// Specification document could not be read
    #[error("Cannot read specification {path}: {source}")]
    SpecIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Specification document is not valid JSON for its shape
    #[error("Cannot parse specification {path}: {source}")]
    SpecParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Specification document parsed but holds unusable values
    #[error("Invalid specification: {0}")]
    InvalidSpec(String),

    #[error("Worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QtoError {
    /// Create an invalid specification error
    pub fn invalid_spec(msg: impl Into<String>) -> Self {
        QtoError::InvalidSpec(msg.into())
    }
}
