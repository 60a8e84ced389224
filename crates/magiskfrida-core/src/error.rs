//! Errors raised by the build pipeline.
//!
//! Nothing in the pipeline degrades gracefully: every variant aborts the
//! current operation and bubbles up to the driver.

use std::path::PathBuf;
use std::time::Duration;

use magiskfrida_schema::{Arch, VersionError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} timed out after {}s", .timeout.as_secs())]
    Timeout { url: String, timeout: Duration },

    #[error("Request to {url} failed with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Response from {url} has no '{field}' field")]
    MissingField { url: String, field: &'static str },

    #[error("`{program} {args}` exited with {status}: {stderr}")]
    Command {
        program: String,
        args: String,
        status: String,
        stderr: String,
    },

    #[error("`{program} {args}` timed out after {}s", .timeout.as_secs())]
    CommandTimeout {
        program: String,
        args: String,
        timeout: Duration,
    },

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy module template: {0}")]
    Copy(#[from] fs_extra::error::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("[{arch}] {source}")]
    Architecture {
        arch: Arch,
        #[source]
        source: Box<BuildError>,
    },

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl BuildError {
    /// Attach a path to an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Classify a transport failure, pulling timeouts out into their own variant.
    pub fn transport(url: &str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else if let Some(status) = err.status() {
            Self::HttpStatus {
                url: url.to_string(),
                status,
            }
        } else {
            Self::Http(err)
        }
    }
}

/// Shorthand used throughout the crate.
pub type Result<T, E = BuildError> = std::result::Result<T, E>;

/// Extension for tagging `std::io::Result` with the path it concerns.
pub trait IoContext<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| BuildError::io(path, e))
    }
}
