use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// OVS is meaningless below one week of observations. Also the floor for the
/// configurable rolling window.
pub const MIN_DAYS_FOR_OVS: usize = 7;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub metrics: MetricsConfig,
    pub clustering: ClusteringConfig,
    pub ingestion: IngestionConfig,
    pub store: StoreConfig,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Thresholds and volume gates for the four pincode metrics.
///
/// Gates run before thresholds: a low-volume pincode is never flagged no
/// matter how extreme its ratio.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub ovs_rolling_window_days: u32,
    pub ovs_camp_threshold: f64,
    pub ovs_center_threshold: f64,
    pub min_volume_for_camp_flag: i64,
    pub mii_hotspot_threshold: f64,
    pub mii_normal_threshold: f64,
    pub min_enrolment_for_migration_flag: i64,
    pub dhr_fraud_threshold: f64,
    pub dhr_over_verified_threshold: f64,
    pub min_transactions_for_fraud_flag: i64,
    pub tlp_weekend_threshold: f64,
    pub tlp_school_drive_threshold: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            ovs_rolling_window_days: 30,
            ovs_camp_threshold: 4.0,
            ovs_center_threshold: 0.5,
            min_volume_for_camp_flag: 500,
            mii_hotspot_threshold: 0.40,
            mii_normal_threshold: 0.05,
            min_enrolment_for_migration_flag: 100,
            dhr_fraud_threshold: 1.5,
            dhr_over_verified_threshold: 0.3,
            min_transactions_for_fraud_flag: 1000,
            tlp_weekend_threshold: 0.60,
            tlp_school_drive_threshold: 0.60,
        }
    }
}

// ---------------------------------------------------------------------------
// Clustering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Number of maturity clusters. Only 3 is supported; the label mapping
    /// is defined for exactly three semantic levels.
    pub clusters: usize,
    pub seed: u64,
    pub n_init: u32,
    pub max_iter: u32,
    /// Minimum share of samples each cluster must hold for the partition to
    /// be accepted. Below this the quantile fallback takes over.
    pub balance_floor: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            clusters: 3,
            seed: 42,
            n_init: 10,
            max_iter: 300,
            balance_floor: 0.10,
        }
    }
}

// ---------------------------------------------------------------------------
// Ingestion + Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Cap on itemized row errors per report. Rejected rows beyond the cap
    /// are still counted in `rejected_rows`.
    pub max_row_errors: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_row_errors: 100,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database path. Defaults to the platform data directory.
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn resolve_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_store_path)
    }
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("enrolytics")
        .join("store.db")
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl AnalyticsConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: AnalyticsConfig =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.metrics;

        if (m.ovs_rolling_window_days as usize) < MIN_DAYS_FOR_OVS {
            return Err(ConfigError::Validation(format!(
                "ovs_rolling_window_days must be at least {MIN_DAYS_FOR_OVS}, got {}",
                m.ovs_rolling_window_days
            )));
        }
        if m.ovs_camp_threshold <= m.ovs_center_threshold {
            return Err(ConfigError::Validation(format!(
                "ovs_camp_threshold ({}) must exceed ovs_center_threshold ({})",
                m.ovs_camp_threshold, m.ovs_center_threshold
            )));
        }
        if m.mii_hotspot_threshold <= m.mii_normal_threshold {
            return Err(ConfigError::Validation(format!(
                "mii_hotspot_threshold ({}) must exceed mii_normal_threshold ({})",
                m.mii_hotspot_threshold, m.mii_normal_threshold
            )));
        }
        if m.dhr_fraud_threshold <= m.dhr_over_verified_threshold {
            return Err(ConfigError::Validation(format!(
                "dhr_fraud_threshold ({}) must exceed dhr_over_verified_threshold ({})",
                m.dhr_fraud_threshold, m.dhr_over_verified_threshold
            )));
        }
        for (name, value) in [
            ("ovs_center_threshold", m.ovs_center_threshold),
            ("mii_normal_threshold", m.mii_normal_threshold),
            ("dhr_over_verified_threshold", m.dhr_over_verified_threshold),
            ("tlp_weekend_threshold", m.tlp_weekend_threshold),
            ("tlp_school_drive_threshold", m.tlp_school_drive_threshold),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if m.tlp_weekend_threshold >= 1.0 || m.tlp_school_drive_threshold >= 1.0 {
            return Err(ConfigError::Validation(
                "tlp thresholds are shares and must be below 1.0".into(),
            ));
        }
        for (name, value) in [
            ("min_volume_for_camp_flag", m.min_volume_for_camp_flag),
            (
                "min_enrolment_for_migration_flag",
                m.min_enrolment_for_migration_flag,
            ),
            (
                "min_transactions_for_fraud_flag",
                m.min_transactions_for_fraud_flag,
            ),
        ] {
            if value <= 0 {
                return Err(ConfigError::Validation(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let c = &self.clustering;
        if c.clusters != 3 {
            return Err(ConfigError::Validation(format!(
                "clusters must be 3 (semantic labels are defined for exactly three levels), got {}",
                c.clusters
            )));
        }
        if c.n_init == 0 || c.max_iter == 0 {
            return Err(ConfigError::Validation(
                "n_init and max_iter must be at least 1".into(),
            ));
        }
        if c.balance_floor <= 0.0 || c.balance_floor > 1.0 / c.clusters as f64 {
            return Err(ConfigError::Validation(format!(
                "balance_floor must lie in (0, {:.4}], got {}",
                1.0 / c.clusters as f64,
                c.balance_floor
            )));
        }

        if self.ingestion.max_row_errors == 0 {
            return Err(ConfigError::Validation(
                "max_row_errors must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const OVERRIDES: &str = r#"
[metrics]
ovs_rolling_window_days = 14
ovs_camp_threshold = 5.0
min_volume_for_camp_flag = 250

[clustering]
seed = 7

[ingestion]
max_row_errors = 50

[store]
path = "/tmp/enrolytics-test/store.db"
"#;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = AnalyticsConfig::from_toml("").unwrap();
        assert_eq!(config.metrics.ovs_rolling_window_days, 30);
        assert_eq!(config.metrics.ovs_camp_threshold, 4.0);
        assert_eq!(config.metrics.ovs_center_threshold, 0.5);
        assert_eq!(config.metrics.min_volume_for_camp_flag, 500);
        assert_eq!(config.metrics.mii_hotspot_threshold, 0.40);
        assert_eq!(config.metrics.mii_normal_threshold, 0.05);
        assert_eq!(config.metrics.dhr_fraud_threshold, 1.5);
        assert_eq!(config.metrics.min_transactions_for_fraud_flag, 1000);
        assert_eq!(config.clustering.clusters, 3);
        assert_eq!(config.clustering.seed, 42);
        assert_eq!(config.clustering.n_init, 10);
        assert_eq!(config.clustering.max_iter, 300);
        assert_eq!(config.clustering.balance_floor, 0.10);
        assert_eq!(config.ingestion.max_row_errors, 100);
        assert!(config.store.path.is_none());
    }

    #[test]
    fn overrides_merge_with_defaults() {
        let config = AnalyticsConfig::from_toml(OVERRIDES).unwrap();
        assert_eq!(config.metrics.ovs_rolling_window_days, 14);
        assert_eq!(config.metrics.ovs_camp_threshold, 5.0);
        assert_eq!(config.metrics.min_volume_for_camp_flag, 250);
        // Untouched fields keep defaults
        assert_eq!(config.metrics.ovs_center_threshold, 0.5);
        assert_eq!(config.clustering.seed, 7);
        assert_eq!(config.clustering.n_init, 10);
        assert_eq!(config.ingestion.max_row_errors, 50);
        assert_eq!(
            config.store.resolve_path(),
            PathBuf::from("/tmp/enrolytics-test/store.db")
        );
    }

    #[test]
    fn reject_short_rolling_window() {
        let err = AnalyticsConfig::from_toml(
            "[metrics]\novs_rolling_window_days = 5\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("at least 7"));
    }

    #[test]
    fn reject_inverted_thresholds() {
        let err = AnalyticsConfig::from_toml(
            "[metrics]\novs_camp_threshold = 0.4\novs_center_threshold = 0.5\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("must exceed"));
    }

    #[test]
    fn reject_unsupported_cluster_count() {
        let err = AnalyticsConfig::from_toml("[clustering]\nclusters = 4\n").unwrap_err();
        assert!(err.to_string().contains("clusters must be 3"));
    }

    #[test]
    fn reject_non_positive_gate() {
        let err = AnalyticsConfig::from_toml(
            "[metrics]\nmin_volume_for_camp_flag = 0\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("min_volume_for_camp_flag"));
    }

    #[test]
    fn reject_balance_floor_above_uniform_share() {
        let err = AnalyticsConfig::from_toml("[clustering]\nbalance_floor = 0.5\n").unwrap_err();
        assert!(err.to_string().contains("balance_floor"));
    }

    #[test]
    fn default_store_path_is_under_data_dir() {
        let config = AnalyticsConfig::default();
        let path = config.store.resolve_path();
        assert!(path.ends_with("enrolytics/store.db"));
    }
}
