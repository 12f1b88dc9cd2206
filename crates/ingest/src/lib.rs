//! `enrolytics-ingest` — CSV upload handling for the bronze and silver tiers.
//!
//! An upload goes through schema detection, per-row validation and a bronze
//! append; a separate transform pass deduplicates bronze into silver. Bad
//! rows are data (itemized, capped error lists), not failures: only storage
//! problems surface as errors.

pub mod date;
pub mod error;
pub mod ingestor;
pub mod schema;
pub mod validate;

pub use date::{DateParseError, normalize};
pub use error::IngestError;
pub use ingestor::{IngestReport, IngestionStats, Ingestor, TableStats};
pub use schema::detect;
pub use validate::{normalize_pincode, RowError};
