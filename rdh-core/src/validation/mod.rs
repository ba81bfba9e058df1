//! Header validation utilities
//!
//! Field rules for a single header and bounds checks for walking a chain.
//! All functions are pure and never read past the bytes they are given.

pub mod bounds;
pub mod header;

pub use bounds::{check_header_space, check_next_offset};
pub use header::{ValidationReport, Violation};
