//! # Text Sources
//!
//! Where the text handed to [`find_ipv6`](crate::find_ipv6) comes from.
//!
//! Every source implements [`TextSource`] (blocking) and, with the
//! `tokio-dep` feature, [`AsyncTextSource`]. Reading returns a
//! [`SourceError`] on failure; the `find_ipv6_in_*` helpers turn any failure
//! into an empty list and a `tracing` warning instead.
//!
//! | Source         | Feature     | Notes                                              |
//! |----------------|-------------|----------------------------------------------------|
//! | [`InlineText`] | always      | text already in memory                             |
//! | `FileSource`   | `std`       | tries `utf-8`, `windows-1251`, `latin-1` in order  |
//! | `UrlSource`    | `tokio-dep` | GET with a timeout, lossy UTF-8 body               |
use std::{io, path::PathBuf};

use thiserror::Error;

use crate::utils::UrlError;

cfg_if::cfg_if! {
    if #[cfg(feature = "std")] {
        pub mod file;
        pub use file::{FileSource, TextEncoding, find_ipv6_in_file};
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "tokio-dep")] {
        pub mod fetch;
        pub use fetch::{FetchOptions, UrlSource, find_ipv6_in_url};

        /// Async counterpart of [`TextSource`].
        #[async_trait::async_trait]
        pub trait AsyncTextSource: Send + Sync {
            /// Human-readable name used as the report label.
            fn describe(&self) -> String;

            async fn read_text(&self) -> Result<String, SourceError>;
        }

        #[async_trait::async_trait]
        impl AsyncTextSource for InlineText {
            fn describe(&self) -> String {
                self.label.clone()
            }

            async fn read_text(&self) -> Result<String, SourceError> {
                Ok(self.body.clone())
            }
        }
    }
}

/// Anything that can produce a block of text to scan.
pub trait TextSource {
    /// Human-readable name used as the report label.
    fn describe(&self) -> String;

    fn read_text(&self) -> Result<String, SourceError>;
}

/// Text that is already in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineText {
    pub label: String,
    pub body: String,
}

impl InlineText {
    pub fn new(label: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            body: body.into(),
        }
    }
}

impl TextSource for InlineText {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn read_text(&self) -> Result<String, SourceError> {
        Ok(self.body.clone())
    }
}

/// Why a source could not produce text.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("couldn't read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("couldn't decode {} as any of: {}", path.display(), tried.join(", "))]
    Undecodable {
        path: PathBuf,
        tried: Vec<&'static str>,
    },
    #[error(transparent)]
    InvalidUrl(#[from] UrlError),
    #[error("request to {url} failed: {reason}")]
    Http { url: String, reason: String },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("{url} timed out after {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u64 },
}
