pub mod sanitize;
pub use sanitize::{DesiredType, Sanitize, SanitizeError};

pub mod terminal;
pub use terminal::Terminal;

pub mod url;
pub use url::{HostKind, Scheme, SourceUrl, UrlError};
