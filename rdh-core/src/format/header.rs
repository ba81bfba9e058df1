//! Owned header field values
//!
//! [`HeaderFields`] is the plain-data counterpart of
//! [`HeaderView`](crate::HeaderView): every packed field copied out into a
//! native integer. It is what reports serialize and what page generators
//! encode back into bytes.

use super::constants::{HEADER_SIZE, HEADER_VERSION};
use super::layout;

/// All fields of a version 3 Raw Data Header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeaderFields {
    /// Header format version
    pub version: u8,
    /// Declared header size in bytes
    pub header_size: u8,
    /// Payload size on the link
    pub block_length: u16,
    /// Front-end electronics id
    pub fee_id: u16,
    /// Priority flag
    pub priority: u8,
    /// Bytes from this header to the next, 0 for the last one
    pub offset_next_packet: u16,
    /// Payload size in memory
    pub memory_size: u16,
    /// Link id (0-31)
    pub link_id: u8,
    /// Packet counter per link
    pub packet_counter: u8,
    /// CRU id (12 bits)
    pub cru_id: u16,
    /// Data path wrapper id (4 bits)
    pub endpoint_id: u8,
    /// Trigger orbit
    pub trigger_orbit: u32,
    /// Heartbeat orbit
    pub heartbeat_orbit: u32,
    /// Trigger bunch crossing (12 bits)
    pub trigger_bc: u16,
    /// Heartbeat bunch crossing (12 bits)
    pub heartbeat_bc: u16,
    /// Trigger type bits
    pub trigger_type: u32,
    /// Detector specific field
    pub detector_field: u16,
    /// PAR bits
    pub par: u16,
    /// Stop bit
    pub stop_bit: u8,
    /// Page counter
    pub page_counter: u16,
}

impl HeaderFields {
    /// Fields of a well-formed, empty version 3 header
    pub const fn v3() -> Self {
        Self {
            version: HEADER_VERSION,
            header_size: HEADER_SIZE as u8,
            block_length: 0,
            fee_id: 0,
            priority: 0,
            offset_next_packet: 0,
            memory_size: 0,
            link_id: 0,
            packet_counter: 0,
            cru_id: 0,
            endpoint_id: 0,
            trigger_orbit: 0,
            heartbeat_orbit: 0,
            trigger_bc: 0,
            heartbeat_bc: 0,
            trigger_type: 0,
            detector_field: 0,
            par: 0,
            stop_bit: 0,
            page_counter: 0,
        }
    }

    /// Set the link id
    pub const fn with_link_id(mut self, link_id: u8) -> Self {
        self.link_id = link_id;
        self
    }

    /// Set the FEE id
    pub const fn with_fee_id(mut self, fee_id: u16) -> Self {
        self.fee_id = fee_id;
        self
    }

    /// Set both payload sizes to the same value
    pub const fn with_payload(mut self, bytes: u16) -> Self {
        self.block_length = bytes;
        self.memory_size = bytes;
        self
    }

    /// Set the offset to the next header
    pub const fn with_next_offset(mut self, offset: u16) -> Self {
        self.offset_next_packet = offset;
        self
    }

    /// Encode into a 64-byte header, truncating each value to its field width
    pub fn to_bytes_array(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];

        layout::VERSION.write(&mut bytes, self.version.into());
        layout::HEADER_SIZE_FIELD.write(&mut bytes, self.header_size.into());
        layout::BLOCK_LENGTH.write(&mut bytes, self.block_length.into());
        layout::FEE_ID.write(&mut bytes, self.fee_id.into());
        layout::PRIORITY.write(&mut bytes, self.priority.into());

        layout::OFFSET_NEXT_PACKET.write(&mut bytes, self.offset_next_packet.into());
        layout::MEMORY_SIZE.write(&mut bytes, self.memory_size.into());
        layout::LINK_ID.write(&mut bytes, self.link_id.into());
        layout::PACKET_COUNTER.write(&mut bytes, self.packet_counter.into());
        layout::CRU_ID.write(&mut bytes, self.cru_id.into());
        layout::ENDPOINT_ID.write(&mut bytes, self.endpoint_id.into());

        layout::TRIGGER_ORBIT.write(&mut bytes, self.trigger_orbit);
        layout::HEARTBEAT_ORBIT.write(&mut bytes, self.heartbeat_orbit);

        layout::TRIGGER_BC.write(&mut bytes, self.trigger_bc.into());
        layout::HEARTBEAT_BC.write(&mut bytes, self.heartbeat_bc.into());
        layout::TRIGGER_TYPE.write(&mut bytes, self.trigger_type);

        layout::DETECTOR_FIELD.write(&mut bytes, self.detector_field.into());
        layout::PAR.write(&mut bytes, self.par.into());
        layout::STOP_BIT.write(&mut bytes, self.stop_bit.into());
        layout::PAGE_COUNTER.write(&mut bytes, self.page_counter.into());

        bytes
    }
}
