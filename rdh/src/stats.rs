//! Per-link header statistics

use hashbrown::HashMap;
use rdh_core::HeaderView;

/// Counters for one (FEE id, link id) pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LinkCounters {
    /// Headers seen
    pub headers: u64,
    /// Headers failing validation
    pub invalid: u64,
    /// Sum of the in-memory payload sizes
    pub memory_bytes: u64,
}

impl LinkCounters {
    fn merge(&mut self, other: &LinkCounters) {
        self.headers += other.headers;
        self.invalid += other.invalid;
        self.memory_bytes += other.memory_bytes;
    }
}

/// One row of [`LinkStats::entries`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LinkEntry {
    pub fee_id: u16,
    pub link_id: u8,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub counters: LinkCounters,
}

/// Header counts keyed by FEE id and link id
#[derive(Debug, Clone, Default)]
pub struct LinkStats {
    links: HashMap<(u16, u8), LinkCounters>,
}

impl LinkStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one header
    pub fn record(&mut self, header: &HeaderView<'_>, valid: bool) {
        let counters = self
            .links
            .entry((header.fee_id(), header.link_id()))
            .or_default();
        counters.headers += 1;
        counters.invalid += u64::from(!valid);
        counters.memory_bytes += u64::from(header.memory_size());
    }

    /// Fold another set of statistics into this one
    pub fn merge(&mut self, other: &LinkStats) {
        for (key, counters) in &other.links {
            self.links.entry(*key).or_default().merge(counters);
        }
    }

    /// Counters for a single link
    pub fn get(&self, fee_id: u16, link_id: u8) -> Option<&LinkCounters> {
        self.links.get(&(fee_id, link_id))
    }

    /// Number of distinct links seen
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Total headers over all links
    pub fn total_headers(&self) -> u64 {
        self.links.values().map(|c| c.headers).sum()
    }

    /// All links sorted by FEE id then link id
    pub fn entries(&self) -> Vec<LinkEntry> {
        let mut entries: Vec<LinkEntry> = self
            .links
            .iter()
            .map(|(&(fee_id, link_id), &counters)| LinkEntry {
                fee_id,
                link_id,
                counters,
            })
            .collect();
        entries.sort_unstable_by_key(|e| (e.fee_id, e.link_id));
        entries
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for LinkStats {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdh_core::HeaderFields;

    fn header(fee_id: u16, link_id: u8, payload: u16) -> [u8; 64] {
        HeaderFields::v3()
            .with_fee_id(fee_id)
            .with_link_id(link_id)
            .with_payload(payload)
            .to_bytes_array()
    }

    #[test]
    fn test_record_and_entries() {
        let mut stats = LinkStats::new();
        let a = header(2, 1, 100);
        let b = header(1, 7, 50);

        stats.record(&HeaderView::new(&a), true);
        stats.record(&HeaderView::new(&a), false);
        stats.record(&HeaderView::new(&b), true);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats.total_headers(), 3);
        assert_eq!(
            stats.get(2, 1),
            Some(&LinkCounters {
                headers: 2,
                invalid: 1,
                memory_bytes: 200
            })
        );

        let keys: Vec<_> = stats.entries().iter().map(|e| (e.fee_id, e.link_id)).collect();
        assert_eq!(keys, [(1, 7), (2, 1)]);
    }

    #[test]
    fn test_merge() {
        let bytes = header(3, 3, 10);
        let view = HeaderView::new(&bytes);

        let mut left = LinkStats::new();
        left.record(&view, true);
        let mut right = LinkStats::new();
        right.record(&view, false);
        right.record(&view, true);

        left.merge(&right);
        assert_eq!(left.get(3, 3).map(|c| (c.headers, c.invalid)), Some((3, 1)));
        assert!(!left.is_empty());
    }
}
