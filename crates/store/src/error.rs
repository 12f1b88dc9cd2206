use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// Database file could not be opened or created.
    Open(String),
    /// SQL execution or row mapping failure.
    Sql(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(msg) => write!(f, "store open error: {msg}"),
            Self::Sql(msg) => write!(f, "store SQL error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Sql(e.to_string())
    }
}
