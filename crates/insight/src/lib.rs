//! `enrolytics-insight` — On-demand insight lookups and the four
//! intelligence pillars.
//!
//! Read-only consumers of the layered store. Keyed lookups prefer gold rows
//! and recompute from the raw tiers on a miss; pillar bundles degrade to
//! empty lists when gold has not been built yet.

pub mod error;
pub mod pillars;
pub mod query;

pub use error::InsightError;
pub use pillars::{
    GrowthPillar, OperationalPillar, PillarService, StrategicPillar, VigilancePillar,
};
pub use query::{InsightService, Lookup};
