//! Error types for page dump inspection

use std::path::PathBuf;

use rdh_core::WalkError;
use thiserror::Error;

/// Errors raised while loading or inspecting page dumps
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The dump file holds no bytes
    #[error("page dump {} is empty", .0.display())]
    EmptyFile(PathBuf),

    /// A byte count string could not be parsed
    #[error("invalid byte count {0:?}")]
    InvalidByteCount(String),

    /// Page size of zero or one that does not fit in memory
    #[error("invalid page size {0}")]
    InvalidPageSize(u64),

    /// Synthetic headers do not fit the requested page
    #[error("cannot lay out {headers} headers in a {page_size} byte page")]
    InvalidLayout {
        /// Requested page size
        page_size: usize,
        /// Requested headers per page
        headers: usize,
    },

    /// An environment setting could not be parsed
    #[error("invalid value {value:?} for {key}")]
    InvalidSetting {
        /// Setting name
        key: &'static str,
        /// Rejected value
        value: String,
    },

    /// A page walk stopped on corrupt or truncated data
    #[error("page {page}: {source}")]
    Walk {
        /// Index of the page in the dump
        page: usize,
        /// What stopped the walk
        #[source]
        source: WalkError,
    },

    /// Configuration file could not be decoded
    #[cfg(feature = "serde")]
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for page dump inspection
pub type Result<T> = std::result::Result<T, Error>;
