//! `enrolytics-core` — Shared domain types for the analytics pipeline.
//!
//! Pure type crate: transaction records, tier names, insight rows and the
//! classification label vocabulary. No IO dependencies.

pub mod insight;
pub mod model;

pub use insight::{
    DhrClassification, DistrictInsight, MaturityLabel, MiiClassification, NationalSummary,
    OvsClassification, PincodeInsight, TemporalLoadProfile, TlpClassification,
};
pub use model::{
    BiometricRecord, DemographicRecord, EnrolmentRecord, RecordKind, Tier, TransactionRecord,
};
