use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error in a mapping file.
    MappingParse(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MappingParse(msg) => write!(f, "mapping parse error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
