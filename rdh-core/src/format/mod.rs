//! Binary format definitions for the Raw Data Header
//!
//! Pure layout descriptions: constants, bit positions and the owned field
//! set. Reading headers in place is done by [`crate::HeaderView`].

pub mod constants;
pub mod header;
pub mod layout;

pub use constants::{HEADER_SIZE, HEADER_VERSION, MAX_BLOCK_LENGTH, MAX_LINK_ID};
pub use header::HeaderFields;
pub use layout::BitField;
