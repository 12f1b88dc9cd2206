use std::fmt;

use enrolytics_store::StoreError;

#[derive(Debug)]
pub enum InsightError {
    /// Store read failed.
    Storage(StoreError),
}

impl fmt::Display for InsightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage error: {e}"),
        }
    }
}

impl std::error::Error for InsightError {}

impl From<StoreError> for InsightError {
    fn from(e: StoreError) -> Self {
        InsightError::Storage(e)
    }
}
