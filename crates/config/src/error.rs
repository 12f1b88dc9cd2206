use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    /// TOML parse / deserialization error.
    Parse(String),
    /// A value outside its allowed range or an inverted threshold pair.
    Validation(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::Validation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
