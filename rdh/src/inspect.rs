//! Page inspection
//!
//! [`Inspector`] runs the core walk over every page of a dump, either
//! printing each header or validating them silently into a report.

use std::fmt;
use std::io;

use rdh_core::{BlockWalker, HeaderFields, ValidationReport, WalkSummary};

use crate::config::InspectConfig;
use crate::error::{Error, Result};
use crate::stats::LinkStats;

#[cfg(feature = "mmap")]
use crate::page_file::PageFile;

/// Adapts an [`io::Write`] to the `fmt::Write` sink the core walker prints to
///
/// The first I/O error is kept and every later write fails fast.
pub struct IoSink<W: io::Write> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: io::Write> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, error: None }
    }

    /// Return the first I/O error seen since the last call
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Flush and hand back the writer, or the pending I/O error
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: io::Write> fmt::Write for IoSink<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.error.is_some() {
            return Err(fmt::Error);
        }
        self.inner.write_all(s.as_bytes()).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}

/// A header that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InvalidHeader {
    /// 1-based position in the page chain
    pub index: usize,
    /// Byte offset inside the page
    pub offset: usize,
    /// Broken rules
    pub violations: ValidationReport,
    /// Decoded header
    pub fields: HeaderFields,
}

/// Outcome of checking one page
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PageReport {
    /// Index of the page in the dump
    pub page: usize,
    /// Page length in bytes
    pub bytes: usize,
    /// Walk result
    pub summary: WalkSummary,
    /// Headers failing validation
    pub invalid: Vec<InvalidHeader>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub stats: LinkStats,
}

impl PageReport {
    /// Walk completed and every header validated
    pub fn is_clean(&self) -> bool {
        self.summary.is_ok() && self.invalid.is_empty()
    }
}

/// Outcome of checking a sequence of pages
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InspectionReport {
    /// Per-page results, ordered by page index
    pub pages: Vec<PageReport>,
    /// Headers over all pages
    pub total_headers: usize,
    /// Headers failing validation over all pages
    pub invalid_headers: usize,
    /// Pages whose walk stopped early
    pub failed_pages: usize,
    /// Merged per-link statistics
    pub links: LinkStats,
}

impl InspectionReport {
    fn from_pages(pages: Vec<PageReport>) -> Self {
        let mut report = Self::default();
        for page in &pages {
            report.total_headers += page.summary.headers;
            report.invalid_headers += page.invalid.len();
            report.failed_pages += usize::from(!page.summary.is_ok());
            report.links.merge(&page.stats);
        }
        report.pages = pages;
        report
    }

    /// No walk errors and no invalid headers
    pub fn is_clean(&self) -> bool {
        self.failed_pages == 0 && self.invalid_headers == 0
    }

    /// The first page whose walk failed, as an error
    pub fn first_walk_error(&self) -> Option<Error> {
        self.pages.iter().find_map(|page| {
            page.summary.error.map(|source| Error::Walk {
                page: page.page,
                source,
            })
        })
    }
}

/// Walks and validates pages according to an [`InspectConfig`]
#[derive(Debug, Clone, Default)]
pub struct Inspector {
    config: InspectConfig,
}

impl Inspector {
    pub fn new(config: InspectConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InspectConfig {
        &self.config
    }

    /// Print every header of one page to `out`
    pub fn dump_page<W: fmt::Write + ?Sized>(&self, index: usize, page: &[u8], out: &mut W) -> WalkSummary {
        let summary = BlockWalker::new(page)
            .with_config(self.config.walk)
            .print_summary(out);
        log_summary(index, &summary);
        summary
    }

    /// Walk one page silently and validate each header
    pub fn check_page(&self, index: usize, page: &[u8]) -> PageReport {
        let mut stats = LinkStats::new();
        let mut invalid = Vec::new();

        let summary = BlockWalker::new(page).walk_with(|entry| {
            let header = &entry.header;
            let report = header.validate();
            tracing::trace!(
                page = index,
                offset = entry.offset,
                fee_id = header.fee_id(),
                link_id = header.link_id(),
                next = header.next_packet_offset(),
                "header"
            );

            if !report.is_valid() {
                tracing::warn!(
                    page = index,
                    offset = entry.offset,
                    violations = report.count(),
                    "invalid header: {}",
                    report.iter().map(|v| v.message()).collect::<Vec<_>>().join(", ")
                );
                invalid.push(InvalidHeader {
                    index: entry.index,
                    offset: entry.offset,
                    violations: report,
                    fields: header.fields(),
                });
            }
            stats.record(header, report.is_valid());
        });
        log_summary(index, &summary);

        PageReport {
            page: index,
            bytes: page.len(),
            summary,
            invalid,
            stats,
        }
    }

    /// Check pages in order
    pub fn check_pages<'p, I>(&self, pages: I) -> InspectionReport
    where
        I: IntoIterator<Item = &'p [u8]>,
    {
        let pages: Vec<&[u8]> = pages.into_iter().take(self.page_limit()).collect();
        InspectionReport::from_pages(self.check_sequential(&pages))
    }

    /// Check every page of a dump, in parallel when configured
    #[cfg(feature = "mmap")]
    pub fn check_file(&self, file: &PageFile) -> Result<InspectionReport> {
        let pages: Vec<&[u8]> = file
            .pages(self.config.page_size)?
            .take(self.page_limit())
            .collect();
        tracing::info!(
            path = %file.path().display(),
            pages = pages.len(),
            page_size = self.config.page_size,
            "checking page dump"
        );

        Ok(InspectionReport::from_pages(self.check_all(&pages)))
    }

    #[cfg(all(feature = "mmap", feature = "parallel"))]
    fn check_all(&self, pages: &[&[u8]]) -> Vec<PageReport> {
        use rayon::prelude::*;

        if !self.config.parallel {
            return self.check_sequential(pages);
        }
        pages
            .par_iter()
            .enumerate()
            .map(|(index, page)| self.check_page(index, page))
            .collect()
    }

    #[cfg(all(feature = "mmap", not(feature = "parallel")))]
    fn check_all(&self, pages: &[&[u8]]) -> Vec<PageReport> {
        self.check_sequential(pages)
    }

    fn check_sequential(&self, pages: &[&[u8]]) -> Vec<PageReport> {
        pages
            .iter()
            .enumerate()
            .map(|(index, page)| self.check_page(index, page))
            .collect()
    }

    /// Print every page of a dump to `out`
    #[cfg(feature = "mmap")]
    pub fn dump_file<W: io::Write>(&self, file: &PageFile, out: W) -> Result<Vec<WalkSummary>> {
        let pages = file.pages(self.config.page_size)?.take(self.page_limit());
        tracing::info!(
            path = %file.path().display(),
            pages = pages.len(),
            page_size = self.config.page_size,
            "dumping page dump"
        );

        let mut sink = IoSink::new(out);
        let mut summaries = Vec::new();

        for (index, page) in pages.enumerate() {
            summaries.push(self.dump_page(index, page, &mut sink));
            if let Some(err) = sink.take_error() {
                return Err(err.into());
            }
        }

        sink.finish()?;
        Ok(summaries)
    }

    fn page_limit(&self) -> usize {
        self.config.max_pages.unwrap_or(usize::MAX)
    }
}

fn log_summary(index: usize, summary: &WalkSummary) {
    match summary.error {
        None => tracing::debug!(page = index, headers = summary.headers, "page walked"),
        Some(err) => tracing::warn!(
            page = index,
            headers = summary.headers,
            offset = err.offset(),
            code = err.code(),
            "page walk stopped: {err}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdh_core::{WalkConfig, WalkError, HEADER_SIZE};

    fn page(len: usize, headers: &[HeaderFields]) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        let mut offset = 0;
        for fields in headers {
            bytes[offset..offset + HEADER_SIZE].copy_from_slice(&fields.to_bytes_array());
            offset += usize::from(fields.offset_next_packet);
        }
        bytes
    }

    #[test]
    fn test_io_sink_writes_through() {
        use std::fmt::Write;

        let mut sink = IoSink::new(Vec::new());
        write!(sink, "{} {}", 1, "two").unwrap();
        assert_eq!(sink.finish().unwrap(), b"1 two");
    }

    #[test]
    fn test_io_sink_keeps_first_error() {
        use std::fmt::Write;

        let mut buffer = [0u8; 4];
        let mut sink = IoSink::new(&mut buffer[..]);
        assert!(sink.write_str("too long").is_err());
        assert!(sink.write_str("x").is_err());
        assert_eq!(sink.take_error().map(|e| e.kind()), Some(io::ErrorKind::WriteZero));
        assert!(sink.take_error().is_none());
    }

    #[test]
    fn test_check_page_counts_invalid_headers() {
        let bytes = page(
            256,
            &[
                HeaderFields::v3().with_link_id(1).with_payload(64).with_next_offset(128),
                HeaderFields::v3().with_link_id(40).with_payload(9000).with_next_offset(128),
            ],
        );
        let report = Inspector::default().check_page(3, &bytes);

        assert_eq!(report.page, 3);
        assert_eq!(report.summary.headers, 2);
        assert!(report.summary.is_ok());
        assert_eq!(report.invalid.len(), 1);
        assert_eq!(report.invalid[0].index, 2);
        assert_eq!(report.invalid[0].offset, 128);
        assert_eq!(report.invalid[0].violations.count(), 2);
        assert_eq!(report.stats.total_headers(), 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_check_pages_aggregates() {
        let good = page(64, &[HeaderFields::v3().with_link_id(2)]);
        let corrupt = page(100, &[HeaderFields::v3().with_link_id(2).with_next_offset(150)]);

        let report = Inspector::default().check_pages([&good[..], &corrupt[..], &good[..]]);

        assert_eq!(report.pages.len(), 3);
        assert_eq!(report.total_headers, 3);
        assert_eq!(report.failed_pages, 1);
        assert_eq!(report.invalid_headers, 0);
        assert_eq!(report.links.get(0, 2).map(|c| c.headers), Some(3));
        assert!(!report.is_clean());
        assert!(matches!(
            report.first_walk_error(),
            Some(Error::Walk {
                page: 1,
                source: WalkError::NextOffsetOverrun { .. }
            })
        ));
    }

    #[test]
    fn test_page_limit() {
        let good = page(64, &[HeaderFields::v3()]);
        let inspector = Inspector::new(InspectConfig::default().with_max_pages(Some(2)));
        let report = inspector.check_pages(std::iter::repeat(&good[..]).take(5));

        assert_eq!(report.pages.len(), 2);
        assert!(report.is_clean());
    }

    #[test]
    fn test_dump_page_prints_walk() {
        let bytes = page(64, &[HeaderFields::v3().with_link_id(5).with_payload(100)]);
        let inspector = Inspector::new(InspectConfig::default().with_walk(WalkConfig::new().with_raw_words(false)));
        let mut out = String::new();
        let summary = inspector.dump_page(0, &bytes, &mut out);

        assert_eq!(summary.status_code(), 0);
        assert!(out.contains("*** RDH #1 @ 0x0000 = 0\nRDH @ "));
        assert!(out.contains("End of page"));
    }

    #[test]
    fn test_random_pages_totals() {
        use rand::{Rng, SeedableRng};

        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5244_4849);
        let pages: Vec<Vec<u8>> = (0..64)
            .map(|_| {
                let mut bytes = vec![0u8; rng.gen_range(0..1024)];
                rng.fill(&mut bytes[..]);
                // small next offsets so chains get followed
                for offset in (9..bytes.len()).step_by(64) {
                    bytes[offset] &= 0x01;
                }
                bytes
            })
            .collect();

        let inspector = Inspector::new(InspectConfig::default().with_walk(WalkConfig::new().with_validation(true)));
        let report = inspector.check_pages(pages.iter().map(Vec::as_slice));

        assert_eq!(report.pages.len(), pages.len());
        let headers: usize = report.pages.iter().map(|p| p.summary.headers).sum();
        assert_eq!(report.total_headers, headers);
        assert_eq!(report.links.total_headers(), headers as u64);
        let invalid: usize = report.pages.iter().map(|p| p.invalid.len()).sum();
        assert_eq!(report.invalid_headers, invalid);

        for (index, bytes) in pages.iter().enumerate() {
            let mut out = String::new();
            let summary = inspector.dump_page(index, bytes, &mut out);
            assert_eq!(summary, report.pages[index].summary);
            assert_eq!(out.matches("*** RDH #").count(), summary.headers);
        }
    }

    #[cfg(feature = "mmap")]
    #[test]
    fn test_check_and_dump_file() {
        use std::io::Write;

        let mut dump = Vec::new();
        dump.extend(page(128, &[HeaderFields::v3().with_link_id(1).with_next_offset(64), HeaderFields::v3()]));
        dump.extend(page(128, &[HeaderFields::v3().with_link_id(4).with_next_offset(200)]));
        dump.extend(page(32, &[]));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&dump).unwrap();
        file.flush().unwrap();
        let pages = PageFile::open(file.path()).unwrap();

        for parallel in [false, true] {
            let config = InspectConfig::default().with_page_size(128).with_parallel(parallel);
            let report = Inspector::new(config).check_file(&pages).unwrap();

            let headers: Vec<usize> = report.pages.iter().map(|p| p.summary.headers).collect();
            assert_eq!(headers, [2, 1, 0]);
            assert_eq!(report.failed_pages, 2);
            assert_eq!(report.pages[2].summary.status_code(), -1);
        }

        let inspector = Inspector::new(InspectConfig::default().with_page_size(128));
        let mut out = Vec::new();
        let summaries = inspector.dump_file(&pages, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(summaries.len(), 3);
        assert_eq!(text.matches("Start of page").count(), 3);
        assert_eq!(text.matches("*** RDH #").count(), 3);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_report_serializes() {
        let bytes = page(64, &[HeaderFields::v3().with_link_id(40)]);
        let report = Inspector::default().check_pages([&bytes[..]]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["invalid_headers"], 1);
        assert_eq!(json["pages"][0]["invalid"][0]["violations"][0], "wrong link id");
        assert_eq!(json["links"][0]["link_id"], 40);
        assert_eq!(json["links"][0]["headers"], 1);
    }
}
