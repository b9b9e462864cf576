//! # v6scout
//!
//! A Rust library for recognising IPv6 address literals in text: validating a
//! single candidate, extracting every literal embedded in arbitrary text, and
//! producing canonical (RFC 5952 style) spellings.
//!
//! ## Features
//!
//! (All feature versions)
//! - **Validation** - whole-string IPv6 literal check, including IPv4 tails and zone ids
//! - **Extraction** - maximal, non-overlapping literals from any text, in order
//! - **Canonicalization** - lowercase, no leading zeros, longest zero run compressed
//! - **Reports** - raw/structured formatters and order-preserving dedup
//! - **Terminal prompts** - validated interactive input
//!
//! ("std" feature, on by default)
//! - **File source** - reads a file trying `utf-8`, `windows-1251`, `latin-1` in order
//!
//! ("serde" feature)
//! - **JSON reports** - [`report::JsonFormatter`]
//!
//! ("tokio-dep" feature)
//! - **URL source** - timeout-bounded HTTP fetch of a page body
//! - **Harvester** - bounded-concurrency scan of many texts/files/URLs, streamed as reports
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! v6scout = { version = "0.1" }
//! v6scout = { version = "0.1", features = ["tokio-dep"] }
//! v6scout = { version = "0.1", default-features = false }
//! ```
//!
//! ### Core operations
//!
//! ```rust
//! use v6scout::{canonicalize_ipv6, find_ipv6, is_valid_ipv6};
//!
//! assert!(is_valid_ipv6("::ffff:192.0.2.128"));
//! assert!(!is_valid_ipv6("::ffff:256.0.2.128"));
//!
//! let text = "gateway fe80::1%eth0, dns 2001:4860:4860:0:0:0:0:8888";
//! let found = find_ipv6(text);
//! assert_eq!(found, vec!["fe80::1%eth0", "2001:4860:4860:0:0:0:0:8888"]);
//! assert_eq!(canonicalize_ipv6(&found[1]), "2001:4860:4860::8888");
//! ```
//!
//! ### Scanning a file
//!
//! ```rust,no_run
//! # #[cfg(feature = "std")]
//! # {
//! use v6scout::sources::find_ipv6_in_file;
//!
//! // Read failures are logged and reported as "no addresses".
//! for address in find_ipv6_in_file("access.log") {
//!     println!("{address}");
//! }
//! # }
//! ```
//!
//! ### Harvesting many sources
//!
//! ```rust,ignore
//! use v6scout::harvester::{Harvester, Target};
//! use v6scout::report::StructuredFormatter;
//!
//! #[tokio::main]
//! async fn main() {
//!     let harvester = Harvester::<StructuredFormatter>::new();
//!     harvester.add_targets(vec![
//!         Target::Url("example.com".to_string()),
//!         Target::File("access.log".into()),
//!     ]);
//!
//!     let mut reports = harvester.run();
//!     while let Some(report) = reports.next().await {
//!         println!("{}: {:?}", report.source, report.canonical);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`address`** - grammar, scanner and canonicalizer (pure, no I/O)
//! - **`sources`** - where text comes from (files, URLs)
//! - **`report`** - what happens to the addresses found
//! - **`harvester`** - concurrent batch scanning
//! - **`utils`** - terminal prompts, input filters, URL parsing
//!
//! ## Error Handling
//!
//! The core never fails: a non-address is ordinary data. Adapters return
//! `Result<T, SourceError>`, and their `find_ipv6_in_*` wrappers turn any
//! failure into an empty list with a `tracing` warning.
//!
//! ## License
//!
//! This project is licensed under the MIT License.

pub mod address;
pub use address::{canonicalize_ipv6, find_ipv6, find_ipv6_iter, is_valid_ipv6};

pub mod report;

pub mod sources;

pub mod utils;

cfg_if::cfg_if! {
    if #[cfg(feature = "tokio-dep")] {
        pub mod harvester;
    }
}
