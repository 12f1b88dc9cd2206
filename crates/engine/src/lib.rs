//! `enrolytics-engine` — Metric computation, maturity clustering and the
//! gold-tier batch rollup.
//!
//! `MetricEngine` is the single authority for metric values and their
//! classifications; both the batch aggregator and on-demand recomputes go
//! through it, so a gold row and a fresh recompute of the same slice agree.

pub mod aggregate;
pub mod cluster;
pub mod error;
pub mod kmeans;
pub mod metrics;

pub use aggregate::{
    load_raw, pincode_insight_from_rows, AggregateReport, GoldAggregator, RawData,
};
pub use cluster::{Classification, ClusterMethod, MaturityClassifier};
pub use error::{ClusterError, EngineError};
pub use metrics::{round4, MetricEngine};
