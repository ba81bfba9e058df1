//! Error types for RDH operations

/// Errors that can occur while interpreting raw header bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdhError {
    /// Fewer bytes available than a header occupies
    InsufficientBuffer {
        /// Bytes that were available
        available: usize,
        /// Bytes a header needs
        needed: usize,
    },
}

impl core::fmt::Display for RdhError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RdhError::InsufficientBuffer { available, needed } => {
                write!(f, "Insufficient buffer space: {available} bytes, need {needed}")
            }
        }
    }
}

impl core::error::Error for RdhError {}

/// Result type for RDH operations
pub type Result<T> = core::result::Result<T, RdhError>;
