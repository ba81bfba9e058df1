//! RDH - Readout page dump inspection
//!
//! This library walks and validates dumps of readout DMA pages using the
//! Raw Data Header definitions from `rdh-core`.
//!
//! ## Architecture
//!
//! The workspace keeps format and I/O apart:
//!
//! - **rdh-core**: header layout, zero-copy views, validation and the
//!   bounds-checked page walk (no I/O, `no_std`)
//! - **rdh**: memory-mapped dump files, byte-count helpers, parallel page
//!   checks, per-link statistics, synthetic pages and structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rdh::{InspectConfig, Inspector, PageFile};
//!
//! fn example() -> rdh::Result<()> {
//!     let config = InspectConfig::from_env()?;
//!     let dump = PageFile::open("readout.raw")?;
//!
//!     let report = Inspector::new(config).check_file(&dump)?;
//!     println!("{} headers, {} invalid", report.total_headers, report.invalid_headers);
//!     if let Some(err) = report.first_walk_error() {
//!         return Err(err);
//!     }
//!     Ok(())
//! }
//! ```

// Re-export core definitions
pub use rdh_core::{
    // Views and walking
    BlockWalker, ChainEntry, HeaderChain, HeaderView, WalkConfig, WalkError, WalkSummary,
    // Format definitions
    HeaderFields, HEADER_SIZE, HEADER_VERSION, MAX_BLOCK_LENGTH, MAX_LINK_ID,
    // Validation
    ValidationReport, Violation,
};

pub mod bytesize;
pub mod config;
pub mod error;
pub mod inspect;
#[cfg(feature = "mmap")]
pub mod page_file;
pub mod stats;
pub mod synth;

pub use bytesize::{format_byte_count, parse_byte_count};
pub use config::InspectConfig;
pub use error::{Error, Result};
pub use inspect::{InspectionReport, Inspector, IoSink, PageReport};
#[cfg(feature = "mmap")]
pub use page_file::PageFile;
pub use stats::LinkStats;
pub use synth::PageBuilder;
