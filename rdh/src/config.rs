//! Inspection configuration

use rdh_core::WalkConfig;

use crate::bytesize::parse_byte_count;
use crate::error::{Error, Result};

/// Default DMA page size (8 kB)
pub const DEFAULT_PAGE_SIZE: usize = 8 * 1024;

/// How a page dump is split and inspected
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InspectConfig {
    /// Bytes per page
    pub page_size: usize,
    /// Stop after this many pages
    pub max_pages: Option<usize>,
    /// Check pages on the rayon pool
    pub parallel: bool,
    /// Options for printed walks
    pub walk: WalkConfig,
}

impl InspectConfig {
    /// Set the page size
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Limit the number of inspected pages
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Enable or disable parallel page checks
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Replace the walk configuration
    pub fn with_walk(mut self, walk: WalkConfig) -> Self {
        self.walk = walk;
        self
    }

    /// Defaults overridden by `RDH_PAGE_SIZE` and `RDH_MAX_PAGES`
    ///
    /// `RDH_PAGE_SIZE` accepts byte counts such as `8k` or `1M`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("RDH_PAGE_SIZE") {
            config.page_size = page_size_from_str(&raw)?;
        }
        if let Some(raw) = lookup("RDH_MAX_PAGES") {
            let max_pages = raw
                .trim()
                .parse()
                .map_err(|_| Error::InvalidSetting {
                    key: "RDH_MAX_PAGES",
                    value: raw.clone(),
                })?;
            config.max_pages = Some(max_pages);
        }

        Ok(config)
    }

    /// Load from a JSON document; missing fields keep their defaults
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.page_size == 0 {
            return Err(Error::InvalidPageSize(0));
        }
        Ok(config)
    }
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: None,
            parallel: cfg!(feature = "parallel"),
            walk: WalkConfig::default(),
        }
    }
}

/// Parse a page size byte count, rejecting zero and sizes beyond `usize`
pub fn page_size_from_str(raw: &str) -> Result<usize> {
    let bytes = parse_byte_count(raw)?;
    match usize::try_from(bytes) {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(Error::InvalidPageSize(bytes)),
    }
}
