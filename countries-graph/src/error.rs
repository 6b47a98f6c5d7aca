//! Errors.
use std::path::PathBuf;

use displaydoc::Display;
use thiserror::Error;

pub use crate::configuration::ConfigurationError;

/// Error types for loading a dataset.
#[derive(Error, Display, Debug)]
#[non_exhaustive]
pub enum DatasetError {
    /// could not read dataset file {path}: {error}
    ReadFile {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying io error.
        error: std::io::Error,
    },

    /// dataset is not valid JSON: {0}
    Malformed(#[from] serde_json::Error),
}

/// Error types for the http server.
#[derive(Error, Display, Debug)]
#[non_exhaustive]
pub enum ServerError {
    /// could not create the HTTP server: {0}
    ServerCreationError(std::io::Error),

    /// http server stopped with an error: {0}
    ServeError(std::io::Error),
}
