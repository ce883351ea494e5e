// src/core/errors.rs

use std::path::PathBuf;
use thiserror::Error;

/// A per-target failure. Reported, never fatal to the batch.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to create request for {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ProbeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProbeError::Request { source, .. } if source.is_timeout())
    }
}

/// Errors that abort the whole run.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("error opening target list {path}: {source}")]
    ReadTargets {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error creating output file {path}: {source}")]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error writing output: {0}")]
    WriteOutput(#[from] std::io::Error),
}

/// Failures while loading the remote fingerprint feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("error loading external services: {0}")]
    Fetch(#[source] reqwest::Error),

    #[error("fingerprint feed answered with HTTP {0}")]
    Status(u16),

    #[error("error decoding external services: {0}")]
    Decode(#[source] reqwest::Error),
}
