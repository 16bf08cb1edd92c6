use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ReqifError {
    /// Input path does not exist.
    DocumentNotFound(PathBuf),
    /// Archive contained no document with the expected extension.
    NoDocumentFound(PathBuf),
    /// Malformed XML or unreadable structure; wraps the underlying detail.
    ParseFailure(String),
    /// Resource-level IO failure (temp space, unreadable file).
    Io(String),
}

impl fmt::Display for ReqifError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DocumentNotFound(path) => {
                write!(f, "document not found: {}", path.display())
            }
            Self::NoDocumentFound(path) => {
                write!(f, "no requirements document in archive: {}", path.display())
            }
            Self::ParseFailure(detail) => write!(f, "parse failure: {detail}"),
            Self::Io(detail) => write!(f, "IO error: {detail}"),
        }
    }
}

impl std::error::Error for ReqifError {}

impl From<std::io::Error> for ReqifError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
