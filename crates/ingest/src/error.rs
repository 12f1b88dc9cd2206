use std::fmt;

use enrolytics_store::StoreError;

use crate::schema;

#[derive(Debug)]
pub enum IngestError {
    /// No known header set matched the upload.
    SchemaDetection { headers: Vec<String> },
    /// A column required by a forced schema is absent.
    MissingColumn { column: String },
    /// CSV reader failure (malformed quoting, ragged rows, ...).
    Csv(String),
    /// Underlying store failure.
    Storage(StoreError),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaDetection { headers } => write!(
                f,
                "Cannot detect schema from headers: {headers:?}. Expected one of: \
                 Enrolment {:?}, Biometric {:?}, Demographic {:?}",
                schema::ENROLMENT_COLUMNS,
                schema::BIOMETRIC_COLUMNS,
                schema::DEMOGRAPHIC_COLUMNS
            ),
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Storage(e) => write!(f, "storage error: {e}"),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<StoreError> for IngestError {
    fn from(e: StoreError) -> Self {
        IngestError::Storage(e)
    }
}
