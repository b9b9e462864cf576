//! # Canonical form
//!
//! Expands a matched literal to its eight groups and renders the canonical
//! text: lowercase hex, no leading zeros, the longest run (at least two) of
//! zero groups replaced by `::`, leftmost on ties, zone suffix kept verbatim.
use std::{fmt::Display, net::Ipv6Addr, str::FromStr};

use thiserror::Error;

use super::grammar::{self, MAX_GROUPS, Match, Piece};

/// A run of consecutive groups, as `[start, start + len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupRun {
    pub start: usize,
    pub len: usize,
}

/// A fully expanded IPv6 literal.
///
/// Built only from text that satisfies the literal grammar, through
/// [`FromStr`]. Its [`Display`] output is the canonical form.
///
/// ```rust
/// use v6scout::address::ParsedAddress;
///
/// let addr: ParsedAddress = "::FFFF:192.0.2.128%eth0".parse().unwrap();
/// assert!(addr.has_ipv4_tail());
/// assert_eq!(addr.zone(), Some("eth0"));
/// assert_eq!(addr.to_string(), "::ffff:c000:280%eth0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    groups: [u16; MAX_GROUPS],
    elided: Option<GroupRun>,
    zone: Option<String>,
    ipv4_tail: bool,
}

/// Why a string could not be expanded into a [`ParsedAddress`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("the address is empty")]
    Empty,
    #[error("not an IPv6 literal (no valid address ends at byte {offset})")]
    Syntax { offset: usize },
    #[error("{found} explicit groups cannot form an address")]
    GroupCount { found: usize },
}

impl ParsedAddress {
    /// The eight 16-bit groups, most significant first.
    pub fn segments(&self) -> [u16; MAX_GROUPS] {
        self.groups
    }

    /// Where the literal's `::` sat and how many zero groups it stood for.
    pub fn elided(&self) -> Option<GroupRun> {
        self.elided
    }

    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    /// `true` when the last two groups were written in dotted-decimal form.
    pub fn has_ipv4_tail(&self) -> bool {
        self.ipv4_tail
    }

    /// The run that the canonical form compresses, if any.
    pub fn canonical_zero_run(&self) -> Option<GroupRun> {
        longest_zero_run(&self.groups)
    }

    fn from_match(m: &Match<'_>) -> Result<Self, AddressError> {
        let mut head: Vec<u16> = Vec::with_capacity(MAX_GROUPS);
        let mut tail: Vec<u16> = Vec::with_capacity(MAX_GROUPS);
        let mut gap = false;
        let mut ipv4_tail = false;

        for piece in &m.pieces {
            let side = if gap { &mut tail } else { &mut head };
            match *piece {
                Piece::Group(g) => side.push(g),
                Piece::Ipv4([a, b, c, d]) => {
                    side.push(u16::from_be_bytes([a, b]));
                    side.push(u16::from_be_bytes([c, d]));
                    ipv4_tail = true;
                }
                Piece::Compression => gap = true,
            }
        }

        let found = head.len() + tail.len();
        let elided = match (gap, MAX_GROUPS.checked_sub(found)) {
            (true, Some(missing)) if missing > 0 => Some(GroupRun {
                start: head.len(),
                len: missing,
            }),
            (false, Some(0)) => None,
            _ => return Err(AddressError::GroupCount { found }),
        };

        let mut groups = [0u16; MAX_GROUPS];
        groups[..head.len()].copy_from_slice(&head);
        groups[MAX_GROUPS - tail.len()..].copy_from_slice(&tail);

        Ok(Self {
            groups,
            elided,
            zone: m.zone.map(str::to_owned),
            ipv4_tail,
        })
    }
}

impl FromStr for ParsedAddress {
    type Err = AddressError;

    /// Parses a literal, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let literal = s.trim();
        if literal.is_empty() {
            return Err(AddressError::Empty);
        }

        match grammar::full_match(literal) {
            Some(m) => Self::from_match(&m),
            None => Err(AddressError::Syntax {
                offset: grammar::longest_match(literal, 0).map_or(0, |m| m.end),
            }),
        }
    }
}

impl TryFrom<&str> for ParsedAddress {
    type Error = AddressError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<&ParsedAddress> for Ipv6Addr {
    fn from(value: &ParsedAddress) -> Self {
        Ipv6Addr::from(value.groups)
    }
}

impl Display for ParsedAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match longest_zero_run(&self.groups) {
            Some(run) => {
                write_groups(f, &self.groups[..run.start])?;
                f.write_str("::")?;
                write_groups(f, &self.groups[run.start + run.len..])?;
            }
            None => write_groups(f, &self.groups)?,
        }

        if let Some(zone) = &self.zone {
            write!(f, "%{}", zone)?;
        }
        Ok(())
    }
}

fn write_groups(f: &mut std::fmt::Formatter<'_>, groups: &[u16]) -> std::fmt::Result {
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            f.write_str(":")?;
        }
        write!(f, "{:x}", group)?;
    }
    Ok(())
}

/// Longest run of zero groups with at least two members; leftmost wins ties.
pub(crate) fn longest_zero_run(groups: &[u16]) -> Option<GroupRun> {
    let mut best: Option<GroupRun> = None;
    let mut current: Option<GroupRun> = None;

    for (i, group) in groups.iter().enumerate() {
        if *group == 0 {
            let run = current.get_or_insert(GroupRun { start: i, len: 0 });
            run.len += 1;
        } else {
            current = None;
        }

        if let Some(run) = current {
            if run.len >= 2 && best.is_none_or(|b| run.len > b.len) {
                best = Some(run);
            }
        }
    }

    best
}
