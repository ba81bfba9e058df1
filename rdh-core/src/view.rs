//! Zero-copy view over one Raw Data Header
//!
//! A [`HeaderView`] borrows exactly [`HEADER_SIZE`] bytes and decodes fields
//! on every call. Nothing is cached and the bytes are never written.

use core::fmt;

use crate::error::{RdhError, Result};
use crate::format::constants::{HEADER_SIZE, HEADER_WORDS_32};
use crate::format::layout::{self, BitField};
use crate::format::HeaderFields;
use crate::validation::ValidationReport;

/// Read-only interpretation of a 64-byte header embedded in a buffer
#[derive(Clone, Copy)]
pub struct HeaderView<'a> {
    bytes: &'a [u8; HEADER_SIZE],
}

impl<'a> HeaderView<'a> {
    /// Wrap a header without inspecting it
    ///
    /// The array type already guarantees the full header is addressable, so
    /// no bounds or content checks happen here.
    pub const fn new(bytes: &'a [u8; HEADER_SIZE]) -> Self {
        Self { bytes }
    }

    /// Wrap the first [`HEADER_SIZE`] bytes of `bytes`
    pub fn from_prefix(bytes: &'a [u8]) -> Result<Self> {
        bytes
            .first_chunk::<HEADER_SIZE>()
            .map(Self::new)
            .ok_or(RdhError::InsufficientBuffer {
                available: bytes.len(),
                needed: HEADER_SIZE,
            })
    }

    /// The underlying header bytes
    pub const fn as_bytes(&self) -> &'a [u8; HEADER_SIZE] {
        self.bytes
    }

    /// Address of the first header byte
    pub fn address(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    #[inline]
    fn field(&self, field: BitField) -> u32 {
        field.read(self.bytes)
    }

    /// Header format version (8 bits at bit 0)
    pub fn version(&self) -> u8 {
        self.field(layout::VERSION) as u8
    }

    /// Header size the header claims for itself (8 bits at bit 8)
    pub fn declared_header_size(&self) -> u8 {
        self.field(layout::HEADER_SIZE_FIELD) as u8
    }

    /// Payload size in bytes as seen on the link (16 bits at bit 16)
    pub fn link_block_length(&self) -> u16 {
        self.field(layout::BLOCK_LENGTH) as u16
    }

    /// Front-end electronics id (16 bits at bit 32)
    pub fn fee_id(&self) -> u16 {
        self.field(layout::FEE_ID) as u16
    }

    /// Priority flag (8 bits at bit 48)
    pub fn priority(&self) -> u8 {
        self.field(layout::PRIORITY) as u8
    }

    /// Bytes from the start of this header to the next one (16 bits at bit 64)
    ///
    /// Zero marks the last header of a page.
    pub fn next_packet_offset(&self) -> u16 {
        self.field(layout::OFFSET_NEXT_PACKET) as u16
    }

    /// Payload size in bytes as stored in memory, padding included (16 bits at bit 80)
    pub fn memory_size(&self) -> u16 {
        self.field(layout::MEMORY_SIZE) as u16
    }

    /// Link that produced this header (8 bits at bit 96)
    pub fn link_id(&self) -> u8 {
        self.field(layout::LINK_ID) as u8
    }

    /// Packet counter of the link (8 bits at bit 104)
    pub fn packet_counter(&self) -> u8 {
        self.field(layout::PACKET_COUNTER) as u8
    }

    /// CRU id (12 bits at bit 112)
    pub fn cru_id(&self) -> u16 {
        self.field(layout::CRU_ID) as u16
    }

    /// Data path wrapper id (4 bits at bit 124)
    pub fn endpoint_id(&self) -> u8 {
        self.field(layout::ENDPOINT_ID) as u8
    }

    /// Trigger orbit (32 bits at bit 128)
    pub fn trigger_orbit(&self) -> u32 {
        self.field(layout::TRIGGER_ORBIT)
    }

    /// Heartbeat orbit (32 bits at bit 160)
    pub fn heartbeat_orbit(&self) -> u32 {
        self.field(layout::HEARTBEAT_ORBIT)
    }

    /// Trigger bunch crossing (12 bits at bit 256)
    pub fn trigger_bc(&self) -> u16 {
        self.field(layout::TRIGGER_BC) as u16
    }

    /// Heartbeat bunch crossing (12 bits at bit 272)
    pub fn heartbeat_bc(&self) -> u16 {
        self.field(layout::HEARTBEAT_BC) as u16
    }

    /// Trigger type (32 bits at bit 288)
    pub fn trigger_type(&self) -> u32 {
        self.field(layout::TRIGGER_TYPE)
    }

    /// Detector specific field (16 bits at bit 384)
    pub fn detector_field(&self) -> u16 {
        self.field(layout::DETECTOR_FIELD) as u16
    }

    /// PAR bits (16 bits at bit 400)
    pub fn par(&self) -> u16 {
        self.field(layout::PAR) as u16
    }

    /// Stop bit (8 bits at bit 416)
    pub fn stop_bit(&self) -> u8 {
        self.field(layout::STOP_BIT) as u8
    }

    /// Page counter (16 bits at bit 424)
    pub fn page_counter(&self) -> u16 {
        self.field(layout::PAGE_COUNTER) as u16
    }

    /// The header as sixteen little-endian 32-bit words
    pub fn raw_words(&self) -> [u32; HEADER_WORDS_32] {
        let words: [u32; HEADER_WORDS_32] = bytemuck::pod_read_unaligned(self.bytes);
        words.map(u32::from_le)
    }

    /// Copy every field out of the buffer
    pub fn fields(&self) -> HeaderFields {
        HeaderFields {
            version: self.version(),
            header_size: self.declared_header_size(),
            block_length: self.link_block_length(),
            fee_id: self.fee_id(),
            priority: self.priority(),
            offset_next_packet: self.next_packet_offset(),
            memory_size: self.memory_size(),
            link_id: self.link_id(),
            packet_counter: self.packet_counter(),
            cru_id: self.cru_id(),
            endpoint_id: self.endpoint_id(),
            trigger_orbit: self.trigger_orbit(),
            heartbeat_orbit: self.heartbeat_orbit(),
            trigger_bc: self.trigger_bc(),
            heartbeat_bc: self.heartbeat_bc(),
            trigger_type: self.trigger_type(),
            detector_field: self.detector_field(),
            par: self.par(),
            stop_bit: self.stop_bit(),
            page_counter: self.page_counter(),
        }
    }

    /// Write a human-readable rendering of the header to `out`
    ///
    /// Errors reported by the sink are ignored.
    pub fn dump<W: fmt::Write + ?Sized>(&self, out: &mut W) {
        let _ = write!(out, "{self}");
    }

    /// Check version, size, link id and block length, in that order
    pub fn validate(&self) -> ValidationReport {
        ValidationReport::check(self)
    }

    /// Whether every validation rule holds
    pub fn is_valid(&self) -> bool {
        self.validate().is_valid()
    }
}

impl fmt::Display for HeaderView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RDH @ {:p}", self.address())?;
        writeln!(f, "Version       = 0x{:02X}", self.version())?;
        writeln!(f, "Header size   = {}", self.declared_header_size())?;
        writeln!(f, "Block length (link) = {} bytes", self.link_block_length())?;
        writeln!(f, "Block length (memory) = {} bytes", self.memory_size())?;
        writeln!(f, "FEE Id        = {}", self.fee_id())?;
        writeln!(f, "Link Id       = {}", self.link_id())?;
        writeln!(f, "Next block    = {}", self.next_packet_offset())
    }
}

impl fmt::Debug for HeaderView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderView")
            .field("address", &self.address())
            .field("fields", &self.fields())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use alloc::string::String;

    fn sample() -> [u8; HEADER_SIZE] {
        HeaderFields::v3()
            .with_fee_id(12)
            .with_link_id(5)
            .with_payload(100)
            .to_bytes_array()
    }

    #[test]
    fn test_core_accessors() {
        let bytes = sample();
        let view = HeaderView::new(&bytes);

        assert_eq!(view.version(), 3);
        assert_eq!(view.declared_header_size(), 64);
        assert_eq!(view.link_block_length(), 100);
        assert_eq!(view.memory_size(), 100);
        assert_eq!(view.fee_id(), 12);
        assert_eq!(view.link_id(), 5);
        assert_eq!(view.next_packet_offset(), 0);
    }

    #[test]
    fn test_accessors_are_stable() {
        let bytes = sample();
        let view = HeaderView::new(&bytes);
        assert_eq!(view.fields(), view.fields());
        assert_eq!(view.as_bytes(), &bytes);
    }

    #[test]
    fn test_from_prefix() {
        let mut buffer = [0u8; 80];
        buffer[..HEADER_SIZE].copy_from_slice(&sample());

        let view = HeaderView::from_prefix(&buffer).unwrap();
        assert_eq!(view.link_id(), 5);
        assert_eq!(view.address(), buffer.as_ptr());

        assert_eq!(
            HeaderView::from_prefix(&buffer[..63]).unwrap_err(),
            RdhError::InsufficientBuffer {
                available: 63,
                needed: HEADER_SIZE
            }
        );
    }

    #[test]
    fn test_raw_words_little_endian() {
        let bytes = sample();
        let words = HeaderView::new(&bytes).raw_words();
        // version 3, size 64, block length 100
        assert_eq!(words[0], 0x0064_4003);
        assert_eq!(words[1], 12);
        assert_eq!(words[2], 100 << 16);
        assert_eq!(words[3], 5);
    }

    #[test]
    fn test_dump_lists_fields() {
        let bytes = sample();
        let view = HeaderView::new(&bytes);
        let mut out = String::new();
        view.dump(&mut out);

        assert!(out.starts_with("RDH @ 0x"));
        assert!(out.contains("Version       = 0x03\n"));
        assert!(out.contains("Header size   = 64\n"));
        assert!(out.contains("Block length (link) = 100 bytes\n"));
        assert!(out.contains("Block length (memory) = 100 bytes\n"));
        assert!(out.contains("FEE Id        = 12\n"));
        assert!(out.contains("Link Id       = 5\n"));
        assert!(out.ends_with("Next block    = 0\n"));
    }
}
