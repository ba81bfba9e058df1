//! Field validity rules for a single header
//!
//! Each rule is checked independently so a report lists every problem at
//! once. Rule order is fixed, which keeps message order deterministic.

use core::fmt;

use crate::format::constants::{HEADER_SIZE, HEADER_VERSION, MAX_BLOCK_LENGTH, MAX_LINK_ID};
use crate::view::HeaderView;

/// A broken header rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Violation {
    /// Version is not 3
    WrongVersion = 0,
    /// Declared header size is not 64
    WrongHeaderSize = 1,
    /// Link id above 31
    WrongLinkId = 2,
    /// Link block length above 8 kB
    WrongBlockLength = 3,
}

impl Violation {
    /// Every rule, in check order
    pub const ALL: [Violation; 4] = [
        Violation::WrongVersion,
        Violation::WrongHeaderSize,
        Violation::WrongLinkId,
        Violation::WrongBlockLength,
    ];

    /// One-line description
    pub const fn message(self) -> &'static str {
        match self {
            Violation::WrongVersion => "wrong header version",
            Violation::WrongHeaderSize => "wrong header size",
            Violation::WrongLinkId => "wrong link id",
            Violation::WrongBlockLength => "wrong block length",
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }

    fn is_violated_by(self, header: &HeaderView<'_>) -> bool {
        match self {
            Violation::WrongVersion => header.version() != HEADER_VERSION,
            Violation::WrongHeaderSize => usize::from(header.declared_header_size()) != HEADER_SIZE,
            Violation::WrongLinkId => header.link_id() > MAX_LINK_ID,
            Violation::WrongBlockLength => header.link_block_length() > MAX_BLOCK_LENGTH,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of validating one header
///
/// `count()` is the number of broken rules (0 means valid). Iteration and
/// `Display` both follow check order, one message per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationReport {
    violations: u8,
}

impl ValidationReport {
    /// Run every rule against `header`
    pub fn check(header: &HeaderView<'_>) -> Self {
        let violations = Violation::ALL
            .into_iter()
            .filter(|rule| rule.is_violated_by(header))
            .fold(0u8, |acc, rule| acc | rule.bit());
        Self { violations }
    }

    /// Number of violated rules
    pub fn count(&self) -> usize {
        self.violations.count_ones() as usize
    }

    /// True when no rule is violated
    pub fn is_valid(&self) -> bool {
        self.violations == 0
    }

    /// Whether a specific rule failed
    pub fn contains(&self, violation: Violation) -> bool {
        self.violations & violation.bit() != 0
    }

    /// Violated rules in check order
    pub fn iter(&self) -> impl Iterator<Item = Violation> + '_ {
        Violation::ALL.into_iter().filter(move |v| self.contains(*v))
    }

    /// Messages of the violated rules, in check order
    #[cfg(feature = "alloc")]
    pub fn messages(&self) -> alloc::vec::Vec<&'static str> {
        self.iter().map(Violation::message).collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in self.iter() {
            writeln!(f, "{violation}")?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ValidationReport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;

        let mut seq = serializer.serialize_seq(Some(self.count()))?;
        for violation in self.iter() {
            seq.serialize_element(violation.message())?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use crate::format::HeaderFields;
    use alloc::string::{String, ToString};

    fn check(fields: HeaderFields) -> ValidationReport {
        let bytes = fields.to_bytes_array();
        HeaderView::new(&bytes).validate()
    }

    #[test]
    fn test_valid_header() {
        let report = check(HeaderFields::v3().with_link_id(5).with_payload(100));
        assert_eq!(report.count(), 0);
        assert!(report.is_valid());
        assert_eq!(report.to_string(), "");
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let report = check(HeaderFields::v3().with_link_id(31).with_payload(8192));
        assert!(report.is_valid());

        let report = check(HeaderFields::v3().with_link_id(32).with_payload(8193));
        assert_eq!(report.count(), 2);
    }

    #[test]
    fn test_link_and_block_length() {
        let report = check(HeaderFields::v3().with_link_id(40).with_payload(9000));

        assert_eq!(report.count(), 2);
        assert!(report.contains(Violation::WrongLinkId));
        assert!(report.contains(Violation::WrongBlockLength));
        assert_eq!(report.to_string(), "wrong link id\nwrong block length\n");
    }

    #[test]
    fn test_all_rules_in_order() {
        let fields = HeaderFields {
            version: 4,
            header_size: 32,
            ..HeaderFields::v3().with_link_id(255).with_payload(u16::MAX)
        };
        let report = check(fields);

        assert_eq!(report.count(), 4);
        assert_eq!(report.iter().collect::<alloc::vec::Vec<_>>(), Violation::ALL);
        let text: String = report.to_string();
        assert_eq!(
            text.lines().collect::<alloc::vec::Vec<_>>(),
            [
                "wrong header version",
                "wrong header size",
                "wrong link id",
                "wrong block length"
            ]
        );
    }

    #[test]
    fn test_each_rule_independent() {
        let cases = [
            (HeaderFields { version: 2, ..HeaderFields::v3() }, Violation::WrongVersion),
            (HeaderFields { header_size: 0, ..HeaderFields::v3() }, Violation::WrongHeaderSize),
            (HeaderFields::v3().with_link_id(32), Violation::WrongLinkId),
            (HeaderFields::v3().with_payload(8193), Violation::WrongBlockLength),
        ];

        for (fields, expected) in cases {
            let report = check(fields);
            assert_eq!(report.count(), 1, "{expected:?}");
            assert_eq!(report.iter().next(), Some(expected));
        }
    }

    #[test]
    fn test_memory_size_not_checked() {
        let fields = HeaderFields {
            memory_size: u16::MAX,
            ..HeaderFields::v3().with_payload(100)
        };
        assert!(check(fields).is_valid());
    }
}
