//! # SourceUrl
//!
//! A small http/https URL parser used to validate fetch targets before any
//! request is made.
//!
//! **Features:**
//! - Supports `http` and `https` schemes
//! - Host validation (`DNS`, `IPv4`, bracketed `IPv6` checked with the crate's own matcher)
//! - Optional port (`1..=65535`) and path/query
//! - Missing schemes can be defaulted to `http://`
//!
//! ## Example
//!
//! ```rust
//! use v6scout::utils::{HostKind, SourceUrl};
//!
//! let url = SourceUrl::new("https://[2001:db8::1]:8443/status").unwrap();
//! assert_eq!(url.host, "[2001:db8::1]");
//! assert_eq!(url.host_kind, HostKind::IPv6);
//! assert_eq!(url.port, 8443);
//! assert_eq!(url.path, "/status");
//!
//! let bare = SourceUrl::with_default_scheme("example.com/page").unwrap();
//! assert_eq!(bare.full_url, "http://example.com/page");
//! ```
use std::{fmt::Display, net::Ipv4Addr, str::FromStr};

use thiserror::Error;

use crate::address::is_valid_ipv6;

/// A parsed, normalised URL.
///
/// `port` is 0 when the URL does not carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrl {
    pub scheme: Scheme,
    pub host: String,
    pub host_kind: HostKind,
    pub port: u16,
    pub path: String,
    pub full_url: String,
}

impl Display for SourceUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    fn prefix(self) -> &'static str {
        match self {
            Self::Http => "http://",
            Self::Https => "https://",
        }
    }
}

impl Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

/// What kind of host a URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    Dns,
    IPv4,
    IPv6,
}

impl Display for HostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dns => write!(f, "dns"),
            Self::IPv4 => write!(f, "ipv4"),
            Self::IPv6 => write!(f, "ipv6"),
        }
    }
}

impl HostKind {
    /// Classifies a host, trying IPv4, then bracketed IPv6, then DNS.
    pub fn classify(host: &str) -> Result<HostKind, UrlError> {
        if Ipv4Addr::from_str(host).is_ok() {
            return Ok(HostKind::IPv4);
        }
        if let Some(inner) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            return if is_valid_ipv6(inner) {
                Ok(HostKind::IPv6)
            } else {
                Err(UrlError::InvalidHost(host.to_string()))
            };
        }
        if Self::is_dns(host) {
            Ok(HostKind::Dns)
        } else {
            Err(UrlError::InvalidHost(host.to_string()))
        }
    }

    /// DNS name rules:
    /// - at most 253 characters
    /// - each label 1..=63 characters, ASCII alphanumerics and `-`
    /// - labels never start or end with `-`
    fn is_dns(host: &str) -> bool {
        host.len() <= 253
            && host.split('.').all(|label| {
                !label.is_empty()
                    && label.len() <= 63
                    && !label.starts_with('-')
                    && !label.ends_with('-')
                    && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("The url is empty")]
    Empty,
    #[error("Invalid scheme => http:// or https://")]
    InvalidScheme,
    #[error("Invalid host {0} => must be a DNS name, IPv4 or [IPv6]")]
    InvalidHost(String),
    #[error("Invalid port {0} => (1 -> 65,535)")]
    InvalidPort(String),
}

impl FromStr for SourceUrl {
    type Err = UrlError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceUrl::new(s)
    }
}

impl TryFrom<&str> for SourceUrl {
    type Error = UrlError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        SourceUrl::new(value)
    }
}

impl SourceUrl {
    /// Parses an `http://` or `https://` URL.
    ///
    /// # Errors
    /// - [`UrlError::Empty`] for blank input
    /// - [`UrlError::InvalidScheme`] for any other scheme, or none
    /// - [`UrlError::InvalidHost`] / [`UrlError::InvalidPort`] for a bad authority
    pub fn new(input_url: &str) -> Result<SourceUrl, UrlError> {
        let url = input_url.trim();
        if url.is_empty() {
            return Err(UrlError::Empty);
        }

        let (scheme, rest) = split_scheme(url).ok_or(UrlError::InvalidScheme)?;

        let authority_len = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let (authority, path) = rest.split_at(authority_len);

        let (host, port_part) = if authority.starts_with('[') {
            let close = authority
                .find(']')
                .ok_or_else(|| UrlError::InvalidHost(authority.to_string()))?;
            authority.split_at(close + 1)
        } else {
            authority.split_at(authority.find(':').unwrap_or(authority.len()))
        };

        let host_kind = HostKind::classify(host)?;

        let port = match port_part {
            "" => 0,
            p => p
                .strip_prefix(':')
                .and_then(|digits| digits.parse::<u16>().ok())
                .filter(|port| *port != 0)
                .ok_or_else(|| UrlError::InvalidPort(p.trim_start_matches(':').to_string()))?,
        };

        let full_url = format!(
            "{}{}{}{}",
            scheme.prefix(),
            host,
            match port {
                0 => String::new(),
                n => format!(":{}", n),
            },
            path
        );

        Ok(SourceUrl {
            scheme,
            host: host.to_string(),
            host_kind,
            port,
            path: path.to_string(),
            full_url,
        })
    }

    /// Like [`SourceUrl::new`], but prefixes `http://` when the input does
    /// not start with `http://` or `https://`.
    pub fn with_default_scheme(input_url: &str) -> Result<SourceUrl, UrlError> {
        let url = input_url.trim();
        if url.is_empty() {
            return Err(UrlError::Empty);
        }
        match split_scheme(url) {
            Some(_) => SourceUrl::new(url),
            None => SourceUrl::new(&format!("http://{}", url)),
        }
    }
}

/// Splits off a case-insensitive `http://` or `https://` prefix.
fn split_scheme(url: &str) -> Option<(Scheme, &str)> {
    [Scheme::Https, Scheme::Http].into_iter().find_map(|scheme| {
        let prefix = scheme.prefix();
        url.get(..prefix.len())
            .filter(|head| head.eq_ignore_ascii_case(prefix))
            .map(|_| (scheme, &url[prefix.len()..]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_url_http_dns() {
        let url = SourceUrl::new("http://example.com").unwrap();
        assert_eq!(url.scheme, Scheme::Http);
        assert_eq!(url.host, "example.com");
        assert_eq!(url.host_kind, HostKind::Dns);
        assert_eq!(url.port, 0);
        assert_eq!(url.path, "");
        assert_eq!(url.full_url, "http://example.com");
        assert_eq!(url.to_string(), "http://example.com");
    }

    #[test]
    fn test_source_url_https_with_port_and_path() {
        let url = SourceUrl::new("https://example.com:420/test/path?q=1").unwrap();
        assert_eq!(url.scheme, Scheme::Https);
        assert_eq!(url.port, 420);
        assert_eq!(url.path, "/test/path?q=1");
        assert_eq!(url.full_url, "https://example.com:420/test/path?q=1");
    }

    #[test]
    fn test_source_url_ipv4_and_ipv6_hosts() {
        let url = SourceUrl::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(url.host_kind, HostKind::IPv4);
        assert_eq!(url.port, 8080);

        let url = SourceUrl::new("https://[::1]").unwrap();
        assert_eq!(url.host, "[::1]");
        assert_eq!(url.host_kind, HostKind::IPv6);
        assert_eq!(format!("{}", url.host_kind), "ipv6");
    }

    #[test]
    fn test_source_url_parse_and_try_from() {
        let url = "https://example.com:33".parse::<SourceUrl>().unwrap();
        assert_eq!(url.port, 33);
        let url = SourceUrl::try_from("HTTP://Example.com/").unwrap();
        assert_eq!(url.scheme, Scheme::Http);
        assert_eq!(url.full_url, "http://Example.com/");
    }

    #[test]
    fn test_source_url_default_scheme() {
        let url = SourceUrl::with_default_scheme("localhost:3000/ips").unwrap();
        assert_eq!(url.full_url, "http://localhost:3000/ips");
        let url = SourceUrl::with_default_scheme("https://example.com").unwrap();
        assert_eq!(url.scheme, Scheme::Https);
        assert!(matches!(
            SourceUrl::with_default_scheme("ftp://example.com"),
            Err(UrlError::InvalidPort(_))
        ));
    }

    #[test]
    fn test_source_url_invalid() {
        assert_eq!(SourceUrl::new(""), Err(UrlError::Empty));
        assert_eq!(SourceUrl::new("ftp://example.com"), Err(UrlError::InvalidScheme));
        assert!(matches!(
            SourceUrl::new("http://exa$mple.com"),
            Err(UrlError::InvalidHost(_))
        ));
        assert!(matches!(
            SourceUrl::new("http://[2001:db8:::1]/"),
            Err(UrlError::InvalidHost(_))
        ));
        assert!(matches!(
            SourceUrl::new("http://example.com:abcd"),
            Err(UrlError::InvalidPort(_))
        ));
        assert!(matches!(
            SourceUrl::new("http://example.com:70000"),
            Err(UrlError::InvalidPort(_))
        ));
        assert!(matches!(
            SourceUrl::new("http://example.com:0"),
            Err(UrlError::InvalidPort(_))
        ));
    }
}
