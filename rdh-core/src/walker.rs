//! Walking a page of chained headers
//!
//! A page holds headers linked by their "offset to next packet" field. The
//! walk keeps a cursor and the number of bytes left from it; every header is
//! gated on a full header fitting, and every jump on the offset not exceeding
//! the bytes left. A zero offset or landing exactly on the end of the page
//! finishes the walk. Anything else stops it with a [`WalkError`] and headers
//! already produced stay valid.

use core::fmt;
use core::iter::FusedIterator;

use crate::config::WalkConfig;
use crate::format::constants::HEADER_SIZE;
use crate::validation::{check_header_space, check_next_offset};
use crate::view::HeaderView;

/// Structural problem that stopped a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WalkError {
    /// Fewer bytes left than a header needs
    HeaderTruncated {
        /// Page offset where the header would start
        offset: usize,
        /// Bytes left from `offset`
        remaining: usize,
        /// Bytes a header needs
        needed: usize,
    },
    /// The next-packet offset points past the end of the page
    NextOffsetOverrun {
        /// Page offset of the header holding the offset
        offset: usize,
        /// Bytes left from `offset`
        remaining: usize,
        /// Declared offset to the next header
        next: usize,
    },
}

impl WalkError {
    /// Negative status code reported for this error
    pub const fn code(&self) -> i32 {
        match self {
            WalkError::HeaderTruncated { .. } => -1,
            WalkError::NextOffsetOverrun { .. } => -2,
        }
    }

    /// Page offset the error refers to
    pub const fn offset(&self) -> usize {
        match self {
            WalkError::HeaderTruncated { offset, .. } | WalkError::NextOffsetOverrun { offset, .. } => *offset,
        }
    }
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkError::HeaderTruncated { remaining, needed, .. } => write!(
                f,
                "page too small, {remaining} bytes left! need at least {needed} bytes for RDH"
            ),
            WalkError::NextOffsetOverrun { remaining, next, .. } => write!(
                f,
                "page too small, {remaining} bytes left! need at least {next} bytes for next offset"
            ),
        }
    }
}

impl core::error::Error for WalkError {}

/// One header found by a walk
#[derive(Debug, Clone, Copy)]
pub struct ChainEntry<'a> {
    /// 1-based position in the chain
    pub index: usize,
    /// Byte offset from the start of the page
    pub offset: usize,
    /// The header itself
    pub header: HeaderView<'a>,
}

/// Result of a complete walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WalkSummary {
    /// Headers visited, including the one whose offset overran
    pub headers: usize,
    /// Sum of the next-packet offsets that were followed
    pub bytes_consumed: usize,
    /// Why the walk stopped early, if it did
    pub error: Option<WalkError>,
}

impl WalkSummary {
    /// Whether the walk ended on a zero offset or the exact page end
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// `0` on success, the error's negative code otherwise
    pub fn status_code(&self) -> i32 {
        self.error.map_or(0, |err| err.code())
    }

    /// Header count, or the error that stopped the walk
    pub fn into_result(self) -> Result<usize, WalkError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.headers),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ChainState {
    Active,
    Failed(WalkError),
    Finished,
}

/// Iterator over the headers of a page
///
/// Yields every header in chain order, then at most one error, then stops.
#[derive(Debug, Clone)]
pub struct HeaderChain<'a> {
    block: &'a [u8],
    cursor: usize,
    remaining: usize,
    visited: usize,
    state: ChainState,
}

impl<'a> HeaderChain<'a> {
    fn new(block: &'a [u8]) -> Self {
        Self {
            block,
            cursor: 0,
            remaining: block.len(),
            visited: 0,
            state: ChainState::Active,
        }
    }

    /// Headers produced so far
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// Current cursor, relative to the page start
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Bytes between the cursor and the page end
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl<'a> Iterator for HeaderChain<'a> {
    type Item = Result<ChainEntry<'a>, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        match core::mem::replace(&mut self.state, ChainState::Finished) {
            ChainState::Finished => None,
            ChainState::Failed(err) => Some(Err(err)),
            ChainState::Active => {
                if let Err(err) = check_header_space(self.cursor, self.remaining) {
                    return Some(Err(err));
                }
                // cursor + remaining == block.len(), so this always succeeds
                let block: &'a [u8] = self.block;
                let bytes = block.get(self.cursor..)?.first_chunk::<HEADER_SIZE>()?;

                self.visited += 1;
                let entry = ChainEntry {
                    index: self.visited,
                    offset: self.cursor,
                    header: HeaderView::new(bytes),
                };

                let next = usize::from(entry.header.next_packet_offset());
                if next != 0 {
                    match check_next_offset(self.cursor, self.remaining, next) {
                        Ok(left) => {
                            self.cursor += next;
                            self.remaining = left;
                            if left != 0 {
                                self.state = ChainState::Active;
                            }
                        }
                        Err(err) => self.state = ChainState::Failed(err),
                    }
                }

                Some(Ok(entry))
            }
        }
    }
}

impl FusedIterator for HeaderChain<'_> {}

/// Non-owning view over a page expected to hold chained headers
#[derive(Debug, Clone, Copy)]
pub struct BlockWalker<'a> {
    block: &'a [u8],
    config: WalkConfig,
}

impl<'a> BlockWalker<'a> {
    /// Walker over `block` with the default configuration
    pub const fn new(block: &'a [u8]) -> Self {
        Self {
            block,
            config: WalkConfig::new(),
        }
    }

    /// Replace the print configuration
    pub const fn with_config(mut self, config: WalkConfig) -> Self {
        self.config = config;
        self
    }

    /// Declared page length in bytes
    pub const fn len(&self) -> usize {
        self.block.len()
    }

    /// Whether the page is empty
    pub const fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    /// Address of the first page byte
    pub fn address(&self) -> *const u8 {
        self.block.as_ptr()
    }

    /// Iterate the chain
    pub fn headers(&self) -> HeaderChain<'a> {
        HeaderChain::new(self.block)
    }

    /// Walk the chain without output
    pub fn walk(&self) -> WalkSummary {
        self.walk_with(|_| {})
    }

    /// Walk the chain, calling `visit` for every header found
    pub fn walk_with<F>(&self, mut visit: F) -> WalkSummary
    where
        F: FnMut(&ChainEntry<'a>),
    {
        let mut chain = self.headers();
        let mut error = None;
        for item in chain.by_ref() {
            match item {
                Ok(entry) => visit(&entry),
                Err(err) => error = Some(err),
            }
        }

        WalkSummary {
            headers: chain.visited(),
            bytes_consumed: chain.position(),
            error,
        }
    }

    /// Walk the chain and print every header to `out`
    ///
    /// Output is framed by start and end banners. A failed walk prints the
    /// reason before the end banner. Errors reported by the sink are ignored.
    pub fn print_summary<W: fmt::Write + ?Sized>(&self, out: &mut W) -> WalkSummary {
        let _ = write!(
            out,
            "\n\n************************\nStart of page {:p} ({} bytes)\n\n",
            self.address(),
            self.len()
        );

        let summary = self.walk_with(|entry| {
            let _ = self.print_entry(entry, out);
        });

        if let Some(err) = summary.error {
            let _ = writeln!(out, "{err}");
        }
        let _ = write!(
            out,
            "End of page {:p} ({} bytes)\n************************\n\n",
            self.address(),
            self.len()
        );

        summary
    }

    fn print_entry<W: fmt::Write + ?Sized>(&self, entry: &ChainEntry<'_>, out: &mut W) -> fmt::Result {
        writeln!(out, "*** RDH #{} @ 0x{:04X} = {}", entry.index, entry.offset, entry.offset)?;

        if self.config.raw_words {
            let per_line = self.config.words_per_line.max(1);
            for (i, word) in entry.header.raw_words().iter().enumerate() {
                if i % per_line == 0 {
                    out.write_char('\n')?;
                }
                write!(out, "{word:08X} ")?;
            }
            out.write_str("\n\n")?;
        }

        write!(out, "{}", entry.header)?;
        out.write_char('\n')?;

        if self.config.validate {
            let report = entry.header.validate();
            if !report.is_valid() {
                writeln!(out, "{} header error(s):", report.count())?;
                write!(out, "{report}")?;
                out.write_char('\n')?;
            }
        }
        Ok(())
    }
}
