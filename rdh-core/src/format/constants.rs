//! Format constants for the version 3 Raw Data Header

/// Only header version understood by this crate
pub const HEADER_VERSION: u8 = 3;

/// Size of a header in bytes (16 x 32-bit words)
pub const HEADER_SIZE: usize = 64;

/// Number of 64-bit words in a header
pub const HEADER_WORDS_64: usize = HEADER_SIZE / 8;

/// Number of 32-bit words in a header, as shown in raw dumps
pub const HEADER_WORDS_32: usize = HEADER_SIZE / 4;

/// Highest link id a CRU can report
pub const MAX_LINK_ID: u8 = 31;

/// Largest payload a single link block may declare (8 kB)
pub const MAX_BLOCK_LENGTH: u16 = 8 * 1024;
