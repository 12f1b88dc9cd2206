//! `enrolytics-config` — Threshold and pipeline configuration.
//!
//! Every tunable of the analytics pipeline lives here: metric thresholds and
//! gates, clustering knobs, validation caps and the store location. Loaded
//! from TOML with full defaults, validated before use.

pub mod error;
pub mod settings;

pub use error::ConfigError;
pub use settings::{
    AnalyticsConfig, ClusteringConfig, IngestionConfig, MetricsConfig, StoreConfig,
    MIN_DAYS_FOR_OVS,
};
