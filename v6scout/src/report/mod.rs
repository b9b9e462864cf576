//! # Reports
//!
//! The result of scanning one source: the literals in the order they were
//! found, plus their canonical spellings.
//!
//! A [`ReportFormatter`] decides what a consumer actually receives
//! ([`RawFormatter`], [`StructuredFormatter`] or, with `serde`, a JSON string).
//!
//! ```rust
//! use v6scout::report::{ReportFormatter, RawFormatter, ScanReport};
//!
//! let report = ScanReport::from_text("syslog", "from 2001:DB8:0:0::1 and 2001:db8::1").deduplicated();
//! assert_eq!(report.addresses, vec!["2001:DB8:0:0::1", "2001:db8::1"]);
//! assert_eq!(report.canonical, vec!["2001:db8::1", "2001:db8::1"]);
//! assert_eq!(RawFormatter.format(&report), "2001:DB8:0:0::1\n2001:db8::1");
//! ```
use std::collections::HashSet;

pub mod formatter;
#[cfg(feature = "serde")]
pub use formatter::JsonFormatter;
pub use formatter::{RawFormatter, ReportFormatter, StructuredFormatter};

use crate::address::{canonicalize_ipv6, find_ipv6};

/// Addresses found in one source.
///
/// `canonical[i]` is the canonical form of `addresses[i]`. When the source
/// could not be read, both are empty and `failure` holds the reason.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanReport {
    pub source: String,
    pub addresses: Vec<String>,
    pub canonical: Vec<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub failure: Option<String>,
}

impl ScanReport {
    pub fn new(source: impl Into<String>, addresses: Vec<String>) -> Self {
        let canonical = addresses.iter().map(|a| canonicalize_ipv6(a)).collect();
        Self {
            source: source.into(),
            addresses,
            canonical,
            failure: None,
        }
    }

    /// Scans `text` and reports everything found in it.
    pub fn from_text(source: impl Into<String>, text: &str) -> Self {
        Self::new(source, find_ipv6(text))
    }

    /// A report for a source that could not be read.
    pub fn failed(source: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            source: source.into(),
            failure: Some(reason.to_string()),
            ..Self::default()
        }
    }

    /// Drops repeated literals, keeping first occurrences in order.
    pub fn deduplicated(self) -> Self {
        let addresses = dedup_preserving_order(self.addresses);
        Self::new(self.source, addresses).with_failure(self.failure)
    }

    fn with_failure(mut self, failure: Option<String>) -> Self {
        self.failure = failure;
        self
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Removes exact duplicates, keeping the first occurrence of each.
///
/// Literals are compared as written: `2001:db8::1` and `2001:DB8::1` are distinct.
pub fn dedup_preserving_order(addresses: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(addresses.len());
    addresses
        .into_iter()
        .filter(|a| seen.insert(a.clone()))
        .collect()
}
