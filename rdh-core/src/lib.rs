#![no_std]

//! RDH Core - Raw Data Header format definitions
//!
//! This crate interprets pages of detector readout data: chains of 64-byte
//! version 3 Raw Data Headers, each pointing at the next through its
//! "offset to next packet" field. It provides:
//!
//! - [`HeaderView`]: zero-copy field access to one header
//! - [`ValidationReport`]: the version/size/link/length rules for a header
//! - [`BlockWalker`]: a bounds-checked walk over a page of headers
//!
//! Nothing here performs I/O. Diagnostic text goes to any
//! [`core::fmt::Write`] sink supplied by the caller.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod config;
pub mod error;
pub mod format;
pub mod validation;
pub mod view;
pub mod walker;

pub use config::WalkConfig;
pub use error::*;
pub use format::*;
pub use validation::{ValidationReport, Violation};
pub use view::HeaderView;
pub use walker::{BlockWalker, ChainEntry, HeaderChain, WalkError, WalkSummary};
