//! Synthetic page generation
//!
//! Builds pages of evenly spaced, chained headers. Used to produce test dumps
//! for the inspector and for benchmarking the walk.

use rdh_core::{HeaderFields, HEADER_SIZE, MAX_BLOCK_LENGTH};

use crate::error::{Error, Result};

/// Lays out `headers` chained headers in a page of `page_size` bytes
#[derive(Debug, Clone)]
pub struct PageBuilder {
    page_size: usize,
    headers: usize,
    template: HeaderFields,
    last_offset: u16,
}

impl PageBuilder {
    /// One valid header per page by default
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            headers: 1,
            template: HeaderFields::v3(),
            last_offset: 0,
        }
    }

    /// Number of headers per page
    pub fn with_headers(mut self, headers: usize) -> Self {
        self.headers = headers;
        self
    }

    /// Fields copied into every header; offsets, sizes and counters are overwritten
    pub fn with_template(mut self, template: HeaderFields) -> Self {
        self.template = template;
        self
    }

    /// Next-packet offset written into the last header (0 ends the chain)
    pub fn with_last_offset(mut self, offset: u16) -> Self {
        self.last_offset = offset;
        self
    }

    /// Distance between consecutive headers
    pub fn stride(&self) -> Result<u16> {
        let invalid = || Error::InvalidLayout {
            page_size: self.page_size,
            headers: self.headers,
        };
        if self.headers == 0 {
            return Err(invalid());
        }
        let stride = self.page_size / self.headers;
        if stride < HEADER_SIZE {
            return Err(invalid());
        }
        u16::try_from(stride).map_err(|_| invalid())
    }

    /// Build one page; `page_counter` is stamped into every header
    ///
    /// Each header's memory size covers its whole span up to the next header.
    /// The link block length is capped at [`MAX_BLOCK_LENGTH`] so headers in
    /// large strides still validate.
    pub fn build(&self, page_counter: u16) -> Result<Vec<u8>> {
        let stride = self.stride()?;
        let mut page = vec![0u8; self.page_size];

        for i in 0..self.headers {
            let offset = i * usize::from(stride);
            let is_last = i + 1 == self.headers;
            let span = if is_last { self.page_size - offset } else { usize::from(stride) };
            let payload = u16::try_from(span - HEADER_SIZE).unwrap_or(u16::MAX);

            let fields = HeaderFields {
                block_length: payload.min(MAX_BLOCK_LENGTH),
                packet_counter: i as u8,
                page_counter,
                ..self
                    .template
                    .with_payload(payload)
                    .with_next_offset(if is_last { self.last_offset } else { stride })
            };
            page[offset..offset + HEADER_SIZE].copy_from_slice(&fields.to_bytes_array());
        }

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdh_core::BlockWalker;

    #[test]
    fn test_built_page_walks_cleanly() {
        let page = PageBuilder::new(8192)
            .with_headers(4)
            .with_template(HeaderFields::v3().with_link_id(9))
            .build(3)
            .unwrap();

        let walker = BlockWalker::new(&page);
        let entries: Vec<_> = walker.headers().map(|e| e.unwrap()).collect();
        assert_eq!(entries.len(), 4);
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry.offset, i * 2048);
            assert_eq!(entry.header.link_id(), 9);
            assert_eq!(entry.header.packet_counter(), i as u8);
            assert_eq!(entry.header.page_counter(), 3);
            assert_eq!(entry.header.memory_size(), 2048 - 64);
            assert!(entry.header.is_valid());
        }
        assert_eq!(entries[3].header.next_packet_offset(), 0);
        assert!(walker.walk().is_ok());
    }

    #[test]
    fn test_last_header_takes_remainder() {
        let page = PageBuilder::new(200).with_headers(2).build(0).unwrap();
        let walker = BlockWalker::new(&page);
        let last = walker.headers().last().unwrap().unwrap();

        assert_eq!(last.offset, 100);
        assert_eq!(last.header.link_block_length(), 36);
    }

    #[test]
    fn test_last_offset_corrupts_chain() {
        let page = PageBuilder::new(256).with_last_offset(1000).build(0).unwrap();
        let summary = BlockWalker::new(&page).walk();

        assert_eq!(summary.headers, 1);
        assert_eq!(summary.status_code(), -2);
    }

    #[test]
    fn test_large_stride_stays_valid() {
        let page = PageBuilder::new(32 * 1024).build(0).unwrap();
        let header = BlockWalker::new(&page).headers().next().unwrap().unwrap().header;

        assert_eq!(header.link_block_length(), MAX_BLOCK_LENGTH);
        assert_eq!(header.memory_size(), 32 * 1024 - 64);
        assert!(header.is_valid());
    }

    #[test]
    fn test_rejects_impossible_layouts() {
        assert!(matches!(
            PageBuilder::new(100).with_headers(2).build(0),
            Err(Error::InvalidLayout { page_size: 100, headers: 2 })
        ));
        assert!(matches!(
            PageBuilder::new(100).with_headers(0).build(0),
            Err(Error::InvalidLayout { headers: 0, .. })
        ));
        assert!(PageBuilder::new(1 << 20).build(0).is_err());
    }
}
