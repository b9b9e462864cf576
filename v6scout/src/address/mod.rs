//! # IPv6 literal recognition
//!
//! The three core operations of the crate, all pure and synchronous:
//!
//! - [`is_valid_ipv6`]: does the (trimmed) string form exactly one IPv6 literal?
//! - [`find_ipv6`]: every maximal literal embedded in a text, in order.
//! - [`canonicalize_ipv6`]: the canonical spelling of a literal.
//!
//! None of them panic or return errors for malformed text: "not an address"
//! is an ordinary `false`, empty `Vec`, or unchanged string.
//!
//! ## Accepted syntax
//!
//! - eight groups of 1-4 hex digits separated by `:` (case-insensitive);
//! - or at most seven groups around a single `::`;
//! - the last two groups may be written as a dotted IPv4 address;
//! - an optional `%zone` suffix: any non-empty token without whitespace or
//!   `%` in a standalone literal; inside running text, ASCII alphanumerics,
//!   `_`, `-` and inner dots (`%eth0.100`).
//!
//! ## Example
//!
//! ```rust
//! use v6scout::address::{canonicalize_ipv6, find_ipv6, is_valid_ipv6};
//!
//! assert!(is_valid_ipv6("2001:0db8:85a3:0000:0000:8a2e:0370:7334"));
//! assert!(!is_valid_ipv6("2001:db8:::1"));
//! assert!(!is_valid_ipv6(None));
//!
//! let found = find_ipv6("text 2001:db8::1 more fe80::1%eth0 junk 2001:db8:::1 end");
//! assert_eq!(found, vec!["2001:db8::1", "fe80::1%eth0"]);
//!
//! assert_eq!(
//!     canonicalize_ipv6("2001:0db8:0000:0000:0000:0000:0000:0001"),
//!     "2001:db8::1"
//! );
//! ```
mod canonical;
mod grammar;
mod scanner;

pub use canonical::{AddressError, GroupRun, ParsedAddress};
pub use scanner::Ipv6Matches;

/// Checks whether `candidate`, once trimmed, is exactly one IPv6 literal.
///
/// `None` and empty input are never valid.
pub fn is_valid_ipv6<'a>(candidate: impl Into<Option<&'a str>>) -> bool {
    candidate
        .into()
        .is_some_and(|c| grammar::full_match(c.trim()).is_some())
}

/// Returns every IPv6 literal found in `text`, in order of appearance.
///
/// Duplicates are kept. `None` and empty text yield an empty `Vec`.
pub fn find_ipv6<'a>(text: impl Into<Option<&'a str>>) -> Vec<String> {
    text.into()
        .map(|t| find_ipv6_iter(t).map(str::to_owned).collect())
        .unwrap_or_default()
}

/// Borrowing, lazy form of [`find_ipv6`].
pub fn find_ipv6_iter(text: &str) -> Ipv6Matches<'_> {
    Ipv6Matches::new(text)
}

/// Returns the canonical form of a literal.
///
/// Invalid input is returned unchanged, so an already-canonical literal and a
/// rejected one look alike to the caller; use [`ParsedAddress`] to tell them
/// apart.
pub fn canonicalize_ipv6(candidate: &str) -> String {
    match candidate.parse::<ParsedAddress>() {
        Ok(address) => address.to_string(),
        Err(e) => {
            tracing::debug!(candidate, error = %e, "left literal unchanged");
            candidate.to_string()
        }
    }
}
