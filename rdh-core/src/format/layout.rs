//! Bit layout of the version 3 Raw Data Header
//!
//! The header is eight little-endian 64-bit words. Every field lives inside a
//! single word; [`BitField`] records which word, the bit offset inside it and
//! the width. Words 3, 5 and 7 are reserved.

use super::constants::HEADER_SIZE;

/// Position of a packed field inside the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Index of the 64-bit word holding the field
    pub word: usize,
    /// Offset of the least significant bit inside the word
    pub shift: u32,
    /// Width in bits (1..=32)
    pub width: u32,
}

impl BitField {
    /// Describe a field occupying `width` bits from `shift` in `word`
    pub const fn new(word: usize, shift: u32, width: u32) -> Self {
        Self { word, shift, width }
    }

    /// Mask of the field after shifting it down to bit 0
    pub const fn mask(self) -> u64 {
        (1u64 << self.width) - 1
    }

    /// Absolute bit offset from the start of the header
    pub const fn bit_offset(self) -> usize {
        self.word * 64 + self.shift as usize
    }

    /// Extract the field from a full header
    pub fn read(self, header: &[u8; HEADER_SIZE]) -> u32 {
        ((read_word(header, self.word) >> self.shift) & self.mask()) as u32
    }

    /// Store `value` in the field, truncating to the field width
    pub fn write(self, header: &mut [u8; HEADER_SIZE], value: u32) {
        let cleared = read_word(header, self.word) & !(self.mask() << self.shift);
        let word = cleared | ((u64::from(value) & self.mask()) << self.shift);
        let start = self.word * 8;
        header[start..start + 8].copy_from_slice(&word.to_le_bytes());
    }
}

/// Read the 64-bit little-endian word at `index`
pub fn read_word(header: &[u8; HEADER_SIZE], index: usize) -> u64 {
    let start = index * 8;
    u64::from_le(bytemuck::pod_read_unaligned(&header[start..start + 8]))
}

/// Header format version, word 0 bits 0-7
pub const VERSION: BitField = BitField::new(0, 0, 8);
/// Declared header size in bytes, word 0 bits 8-15
pub const HEADER_SIZE_FIELD: BitField = BitField::new(0, 8, 8);
/// Payload size as seen on the link, word 0 bits 16-31
pub const BLOCK_LENGTH: BitField = BitField::new(0, 16, 16);
/// Front-end electronics id, word 0 bits 32-47
pub const FEE_ID: BitField = BitField::new(0, 32, 16);
/// Priority flag, word 0 bits 48-55
pub const PRIORITY: BitField = BitField::new(0, 48, 8);

/// Distance to the next header in memory, word 1 bits 0-15
pub const OFFSET_NEXT_PACKET: BitField = BitField::new(1, 0, 16);
/// Payload size as stored in memory, word 1 bits 16-31
pub const MEMORY_SIZE: BitField = BitField::new(1, 16, 16);
/// Link id, word 1 bits 32-39
pub const LINK_ID: BitField = BitField::new(1, 32, 8);
/// Packet counter per link, word 1 bits 40-47
pub const PACKET_COUNTER: BitField = BitField::new(1, 40, 8);
/// CRU id, word 1 bits 48-59
pub const CRU_ID: BitField = BitField::new(1, 48, 12);
/// Data path wrapper id, word 1 bits 60-63
pub const ENDPOINT_ID: BitField = BitField::new(1, 60, 4);

/// Trigger orbit, word 2 bits 0-31
pub const TRIGGER_ORBIT: BitField = BitField::new(2, 0, 32);
/// Heartbeat orbit, word 2 bits 32-63
pub const HEARTBEAT_ORBIT: BitField = BitField::new(2, 32, 32);

/// Trigger bunch crossing, word 4 bits 0-11
pub const TRIGGER_BC: BitField = BitField::new(4, 0, 12);
/// Heartbeat bunch crossing, word 4 bits 16-27
pub const HEARTBEAT_BC: BitField = BitField::new(4, 16, 12);
/// Trigger type bits, word 4 bits 32-63
pub const TRIGGER_TYPE: BitField = BitField::new(4, 32, 32);

/// Detector specific field, word 6 bits 0-15
pub const DETECTOR_FIELD: BitField = BitField::new(6, 0, 16);
/// PAR bits, word 6 bits 16-31
pub const PAR: BitField = BitField::new(6, 16, 16);
/// Stop bit, word 6 bits 32-39
pub const STOP_BIT: BitField = BitField::new(6, 32, 8);
/// Page counter, word 6 bits 40-55
pub const PAGE_COUNTER: BitField = BitField::new(6, 40, 16);
