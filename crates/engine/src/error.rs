use std::fmt;

use enrolytics_store::StoreError;

#[derive(Debug)]
pub enum ClusterError {
    /// Not enough districts to form k clusters.
    TooFewSamples { needed: usize, got: usize },
}

impl fmt::Display for ClusterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewSamples { needed, got } => {
                write!(f, "need at least {needed} samples, got {got}")
            }
        }
    }
}

impl std::error::Error for ClusterError {}

#[derive(Debug)]
pub enum EngineError {
    /// Store read or write failed.
    Storage(StoreError),
    /// Clustering could not run.
    Cluster(ClusterError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage error: {e}"),
            Self::Cluster(e) => write!(f, "clustering error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        EngineError::Storage(e)
    }
}

impl From<ClusterError> for EngineError {
    fn from(e: ClusterError) -> Self {
        EngineError::Cluster(e)
    }
}
