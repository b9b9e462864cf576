//! File source.
//!
//! The file is read once; its bytes are then decoded with each
//! [`TextEncoding`] in turn and the first clean decode wins.
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use super::{SourceError, TextSource};
use crate::address::find_ipv6;

/// A text encoding a file may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Windows1251,
    /// Maps every byte to the code point of the same value, so it never fails.
    Latin1,
}

impl TextEncoding {
    /// Order used by [`FileSource::new`].
    pub const DEFAULT_ORDER: [TextEncoding; 3] = [
        TextEncoding::Utf8,
        TextEncoding::Windows1251,
        TextEncoding::Latin1,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Windows1251 => "windows-1251",
            Self::Latin1 => "latin-1",
        }
    }

    /// Strict decode: `None` if any byte sequence is invalid in this encoding.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            Self::Windows1251 => encoding_rs::WINDOWS_1251
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

/// A file on disk, decoded with the first encoding that fits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
    encodings: Vec<TextEncoding>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            encodings: TextEncoding::DEFAULT_ORDER.to_vec(),
        }
    }

    /// Replaces the encodings tried, in order.
    pub fn with_encodings(mut self, encodings: Vec<TextEncoding>) -> Self {
        self.encodings = encodings;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_text(&self) -> Result<String, SourceError> {
        let bytes = fs::read(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound(self.path.clone()),
            _ => SourceError::Io {
                path: self.path.clone(),
                source: e,
            },
        })?;

        for encoding in &self.encodings {
            if let Some(text) = encoding.decode(&bytes) {
                debug!(path = %self.path.display(), encoding = encoding.label(), "decoded file");
                return Ok(text);
            }
        }

        Err(SourceError::Undecodable {
            path: self.path.clone(),
            tried: self.encodings.iter().map(|e| e.label()).collect(),
        })
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "tokio-dep")] {
        #[async_trait::async_trait]
        impl super::AsyncTextSource for FileSource {
            fn describe(&self) -> String {
                TextSource::describe(self)
            }

            async fn read_text(&self) -> Result<String, SourceError> {
                let source = self.clone();
                tokio::task::spawn_blocking(move || TextSource::read_text(&source))
                    .await
                    .map_err(|e| SourceError::Io {
                        path: self.path.clone(),
                        source: io::Error::other(e),
                    })?
            }
        }
    }
}

/// Reads `path` and returns every IPv6 literal in it.
///
/// Read or decode failures are logged and yield an empty list.
pub fn find_ipv6_in_file(path: impl AsRef<Path>) -> Vec<String> {
    match FileSource::new(path.as_ref()).read_text() {
        Ok(text) => find_ipv6(text.as_str()),
        Err(e) => {
            warn!(error = %e, "no addresses read from file");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_find_ipv6_in_utf8_file() {
        let content = "
        2001:db8::1
        192.168.1.1 (не IPv6)
        fe80::1%eth0
        невалидный 2001:db8:::1
        ";
        let file = temp_file(content.as_bytes());
        assert_eq!(
            find_ipv6_in_file(file.path()),
            vec!["2001:db8::1", "fe80::1%eth0"]
        );
    }

    #[test]
    fn test_windows_1251_file_decodes() {
        let original = "Адрес сервера 2001:db8::2a";
        let (bytes, _, had_errors) = encoding_rs::WINDOWS_1251.encode(original);
        assert!(!had_errors);
        assert!(std::str::from_utf8(&bytes).is_err());

        let file = temp_file(&bytes);
        let text = FileSource::new(file.path()).read_text().unwrap();
        assert_eq!(text, original);
        assert_eq!(find_ipv6_in_file(file.path()), vec!["2001:db8::2a"]);
    }

    #[test]
    fn test_latin1_fallback() {
        let file = temp_file(b"caf\xe9 ::1 ");
        let source = FileSource::new(file.path())
            .with_encodings(vec![TextEncoding::Utf8, TextEncoding::Latin1]);
        assert_eq!(source.read_text().unwrap(), "café ::1 ");
    }

    #[test]
    fn test_undecodable_file() {
        let file = temp_file(b"\xff\xfe::1");
        let source = FileSource::new(file.path()).with_encodings(vec![TextEncoding::Utf8]);
        match source.read_text() {
            Err(SourceError::Undecodable { tried, .. }) => assert_eq!(tried, vec!["utf-8"]),
            other => panic!("expected Undecodable, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.txt");

        assert!(matches!(
            FileSource::new(&path).read_text(),
            Err(SourceError::NotFound(p)) if p == path
        ));
        assert!(find_ipv6_in_file(&path).is_empty());
    }
}
