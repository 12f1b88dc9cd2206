//! `enrolytics-store` — Layered persistence for the medallion pipeline.
//!
//! One SQLite database holds every tier; tables are namespaced by tier prefix
//! (`bronze_enrolment`, `gold_pincode_insights`, ...). A catalog table tracks
//! a per-table write counter and last-modified timestamp. Row types plug in
//! through the [`TableRecord`] trait.

pub mod error;
pub mod record;
pub mod sqlite;

pub use error::StoreError;
pub use record::TableRecord;
pub use sqlite::{LayeredStore, SqliteStore, TableMetadata, WriteMode};
