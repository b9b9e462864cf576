//! # Input Sanitization & Validation
//!
//! Composable validation filters ([`Sanitize`]) for interactive input. Filters
//! run in order against the trimmed answer and short-circuit on the first
//! failure, returning a friendly message describing what went wrong.
//!
//! ## Features
//! - Non-empty answers with [`Sanitize::NotEmpty`]
//! - Type validation via [`DesiredType`]
//! - Multiple-option matching with [`Sanitize::MatchStrings`]
//! - Inclusive range validation with [`Sanitize::IsBetween`]
//! - IPv6 literal validation with [`Sanitize::IsIpv6`]
//!
//! ## Example
//! ```rust
//! use v6scout::utils::{DesiredType, Sanitize};
//!
//! let filters = [Sanitize::IsType(DesiredType::Usize), Sanitize::IsBetween(1, 6)];
//! assert_eq!(Sanitize::execute(" 3 ", &filters).unwrap(), "3");
//! assert!(Sanitize::execute("9", &filters).is_err());
//!
//! assert!(Sanitize::execute("fe80::1%eth0", &[Sanitize::IsIpv6]).is_ok());
//! ```
use std::fmt::Display;

use thiserror::Error;

use crate::address::is_valid_ipv6;

/// A validation filter applied to user input.
///
/// - `NotEmpty`: the input has at least one non-blank character.
/// - `MatchStrings`: the input matches one of the given options.
/// - `IsType`: the input parses into a certain [`DesiredType`].
/// - `IsBetween`: a numeric input within the inclusive range `[min, max]`.
/// - `IsIpv6`: the input is a single IPv6 literal.
#[derive(Debug, Clone)]
pub enum Sanitize {
    NotEmpty,
    MatchStrings(Vec<String>),
    IsType(DesiredType),
    IsBetween(isize, isize),
    IsIpv6,
}

/// Why an answer was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("The value is empty, try again!")]
    Empty,
    #[error("The value is not a {0}, try again!")]
    Type(DesiredType),
    #[error("The value doesn't match with the options: {}, try again!", .0.join(", "))]
    MatchStrings(Vec<String>),
    #[error("The value is not between {0} and {1}, try again!")]
    Between(isize, isize),
    #[error("The value is not an IPv6 address, try again!")]
    NotIpv6,
}

/// Validates that an input string parses into the given Rust type.
macro_rules! check_type {
    ($input:expr, $t:ty, $err:expr) => {
        match $input.parse::<$t>() {
            Ok(_) => Ok(()),
            Err(_) => Err($err),
        }
    };
}

impl Sanitize {
    /// Runs every filter against the trimmed answer.
    ///
    /// Returns the trimmed answer, or the first error encountered.
    pub fn execute(answer: &str, filters: &[Sanitize]) -> Result<String, SanitizeError> {
        let clean_answer = answer.trim();

        for filter in filters {
            filter.validate(clean_answer)?;
        }
        Ok(clean_answer.to_string())
    }

    fn validate(&self, input: &str) -> Result<(), SanitizeError> {
        match self {
            Sanitize::NotEmpty => {
                if input.is_empty() {
                    Err(SanitizeError::Empty)
                } else {
                    Ok(())
                }
            }
            Sanitize::IsType(ty) => ty.parse(input),
            Sanitize::MatchStrings(options) => {
                if options.iter().any(|o| o == input) {
                    Ok(())
                } else {
                    Err(SanitizeError::MatchStrings(options.clone()))
                }
            }
            Sanitize::IsBetween(min, max) => match input.parse::<isize>() {
                Ok(n) if n >= *min && n <= *max => Ok(()),
                _ => Err(SanitizeError::Between(*min, *max)),
            },
            Sanitize::IsIpv6 => {
                if is_valid_ipv6(input) {
                    Ok(())
                } else {
                    Err(SanitizeError::NotIpv6)
                }
            }
        }
    }
}

/// The primitive type an answer must parse into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredType {
    Bool,
    U16,
    Usize,
}

impl DesiredType {
    fn parse(&self, input: &str) -> Result<(), SanitizeError> {
        match self {
            DesiredType::Bool => check_type!(input, bool, SanitizeError::Type(*self)),
            DesiredType::U16 => check_type!(input, u16, SanitizeError::Type(*self)),
            DesiredType::Usize => check_type!(input, usize, SanitizeError::Type(*self)),
        }
    }
}

impl Display for DesiredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::U16 => write!(f, "u16"),
            Self::Usize => write!(f, "usize"),
        }
    }
}
