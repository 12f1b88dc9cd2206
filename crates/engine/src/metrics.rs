//! The four pincode metrics. Pure arithmetic, thresholds injected from
//! configuration; gates run before ratio thresholds so tiny samples never
//! get flagged.

use chrono::{Datelike, NaiveDate};

use enrolytics_config::{MetricsConfig, MIN_DAYS_FOR_OVS};
use enrolytics_core::{
    DhrClassification, MiiClassification, OvsClassification, TemporalLoadProfile,
    TlpClassification,
};

/// Half-away-from-zero rounding to four decimals, applied to every stored
/// metric value.
pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

pub struct MetricEngine<'a> {
    config: &'a MetricsConfig,
}

impl<'a> MetricEngine<'a> {
    pub fn new(config: &'a MetricsConfig) -> Self {
        MetricEngine { config }
    }

    // -----------------------------------------------------------------------
    // OVS: operational volatility score
    // -----------------------------------------------------------------------

    /// Coefficient of variation of daily totals, one entry per distinct day.
    /// Sample stddev (n - 1). Under a week of data, or an all-zero series,
    /// the score is 0.0.
    pub fn ovs(&self, daily_totals: &[i64]) -> f64 {
        if daily_totals.len() < MIN_DAYS_FOR_OVS {
            return 0.0;
        }
        let n = daily_totals.len() as f64;
        let mean = daily_totals.iter().sum::<i64>() as f64 / n;
        if mean == 0.0 {
            return 0.0;
        }
        let sum_sq: f64 = daily_totals
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum();
        let std = (sum_sq / (n - 1.0)).sqrt();
        round4(std / mean)
    }

    pub fn classify_ovs(&self, ovs: f64, total_volume: i64) -> OvsClassification {
        if total_volume < self.config.min_volume_for_camp_flag {
            return OvsClassification::NormalActivity;
        }
        if ovs > self.config.ovs_camp_threshold {
            OvsClassification::TemporaryCamp
        } else if ovs < self.config.ovs_center_threshold {
            OvsClassification::PermanentCenter
        } else {
            OvsClassification::NormalActivity
        }
    }

    // -----------------------------------------------------------------------
    // MII: migration influx index
    // -----------------------------------------------------------------------

    /// Adult share of new enrolments, clamped to [0, 1].
    pub fn mii(&self, enrolment_18_plus: i64, total_enrolment: i64) -> f64 {
        if total_enrolment <= 0 {
            return 0.0;
        }
        let mii = enrolment_18_plus as f64 / total_enrolment as f64;
        round4(mii.clamp(0.0, 1.0))
    }

    pub fn classify_mii(&self, mii: f64, total_enrolment: i64) -> MiiClassification {
        if total_enrolment < self.config.min_enrolment_for_migration_flag {
            return MiiClassification::MixedPopulation;
        }
        if mii > self.config.mii_hotspot_threshold {
            MiiClassification::MigrationHotspot
        } else if mii < self.config.mii_normal_threshold {
            MiiClassification::BirthRateDriven
        } else {
            MiiClassification::MixedPopulation
        }
    }

    // -----------------------------------------------------------------------
    // DHR: demographic hygiene ratio
    // -----------------------------------------------------------------------

    /// Demographic updates per biometric update. Zero biometric activity with
    /// demographic churn returns the raw demographic count, an unbounded
    /// penalty that keeps such pincodes at the top of any ranking.
    pub fn dhr(&self, demographic_updates: i64, biometric_updates: i64) -> f64 {
        if biometric_updates <= 0 {
            return if demographic_updates > 0 {
                demographic_updates as f64
            } else {
                0.0
            };
        }
        round4(demographic_updates as f64 / biometric_updates as f64)
    }

    pub fn classify_dhr(&self, dhr: f64, total_transactions: i64) -> DhrClassification {
        if total_transactions < self.config.min_transactions_for_fraud_flag {
            return DhrClassification::NormalMaintenance;
        }
        if dhr > self.config.dhr_fraud_threshold {
            DhrClassification::HighFraudRisk
        } else if dhr < self.config.dhr_over_verified_threshold {
            DhrClassification::OverVerified
        } else {
            DhrClassification::NormalMaintenance
        }
    }

    // -----------------------------------------------------------------------
    // TLP: temporal load profile
    // -----------------------------------------------------------------------

    /// Weekday load shares over (date, volume) observations. Monday is
    /// index 0. Empty input or zero total volume yields the all-zero
    /// insufficient-data profile.
    pub fn tlp(&self, observations: &[(NaiveDate, i64)]) -> TemporalLoadProfile {
        if observations.is_empty() {
            return empty_tlp();
        }

        let mut weekday_totals = [0i64; 7];
        for (date, volume) in observations {
            weekday_totals[date.weekday().num_days_from_monday() as usize] += volume;
        }
        let grand_total: i64 = weekday_totals.iter().sum();
        if grand_total == 0 {
            return empty_tlp();
        }

        let share = |idx: usize| weekday_totals[idx] as f64 / grand_total as f64;
        let weekend = share(5) + share(6);
        let school_drive = share(1) + share(2);

        let (classification, recommendation) = if weekend > self.config.tlp_weekend_threshold {
            (
                TlpClassification::WeekendWarrior,
                "Deploy Mobile Van on Saturdays and Sundays",
            )
        } else if school_drive > self.config.tlp_school_drive_threshold {
            (
                TlpClassification::SchoolDrive,
                "Coordinate with schools for Tuesday/Wednesday drives",
            )
        } else {
            (
                TlpClassification::BalancedLoad,
                "Standard staffing schedule recommended",
            )
        };

        TemporalLoadProfile {
            monday: round4(share(0)),
            tuesday: round4(share(1)),
            wednesday: round4(share(2)),
            thursday: round4(share(3)),
            friday: round4(share(4)),
            saturday: round4(share(5)),
            sunday: round4(share(6)),
            classification,
            recommendation: recommendation.to_string(),
        }
    }
}

fn empty_tlp() -> TemporalLoadProfile {
    TemporalLoadProfile {
        monday: 0.0,
        tuesday: 0.0,
        wednesday: 0.0,
        thursday: 0.0,
        friday: 0.0,
        saturday: 0.0,
        sunday: 0.0,
        classification: TlpClassification::BalancedLoad,
        recommendation: "Insufficient data for scheduling recommendation".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(config: &MetricsConfig) -> MetricEngine<'_> {
        MetricEngine::new(config)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ovs_identical_series_is_zero() {
        let config = MetricsConfig::default();
        let engine = engine_with(&config);
        assert_eq!(engine.ovs(&[100, 100, 100, 100, 100, 100, 100]), 0.0);
    }

    #[test]
    fn ovs_short_or_empty_series_is_zero() {
        let config = MetricsConfig::default();
        let engine = engine_with(&config);
        assert_eq!(engine.ovs(&[]), 0.0);
        assert_eq!(engine.ovs(&[10, 20, 30, 40, 50, 60]), 0.0);
    }

    #[test]
    fn ovs_all_zero_series_is_zero() {
        let config = MetricsConfig::default();
        let engine = engine_with(&config);
        assert_eq!(engine.ovs(&[0, 0, 0, 0, 0, 0, 0, 0]), 0.0);
    }

    #[test]
    fn ovs_single_spike_is_highly_volatile() {
        let config = MetricsConfig::default();
        let engine = engine_with(&config);
        // CV of one spike over n days is sqrt(n): sqrt(10) here.
        let ovs = engine.ovs(&[0, 0, 0, 0, 500, 0, 0, 0, 0, 0]);
        assert!(ovs > 3.0, "expected high volatility, got {ovs}");
        assert_eq!(ovs, 3.1623);
    }

    #[test]
    fn ovs_spike_over_longer_window_crosses_camp_threshold() {
        let config = MetricsConfig::default();
        let engine = engine_with(&config);
        // 17 days, one spike: sqrt(17) > 4.0.
        let mut series = vec![0i64; 17];
        series[8] = 500;
        let ovs = engine.ovs(&series);
        assert!(ovs > 4.0, "expected camp-grade volatility, got {ovs}");
        assert_eq!(engine.classify_ovs(ovs, 500), OvsClassification::TemporaryCamp);
    }

    #[test]
    fn ovs_moderate_variation_stays_in_band() {
        let config = MetricsConfig::default();
        let engine = engine_with(&config);
        let ovs = engine.ovs(&[50, 75, 60, 80, 55, 70, 65]);
        assert!(ovs > 0.1 && ovs < 2.0, "got {ovs}");
    }

    #[test]
    fn ovs_volume_gate_blocks_flag() {
        let config = MetricsConfig::default();
        let engine = engine_with(&config);
        assert_eq!(
            engine.classify_ovs(9.9, 499),
            OvsClassification::NormalActivity
        );
        assert_eq!(
            engine.classify_ovs(9.9, 500),
            OvsClassification::TemporaryCamp
        );
        assert_eq!(
            engine.classify_ovs(0.1, 500),
            OvsClassification::PermanentCenter
        );
    }

    #[test]
    fn mii_is_clamped_to_unit_interval() {
        let config = MetricsConfig::default();
        let engine = engine_with(&config);
        assert_eq!(engine.mii(1500, 1000), 1.0);
        assert_eq!(engine.mii(450, 1000), 0.45);
    }

    #[test]
    fn mii_zero_total_is_zero() {
        let config = MetricsConfig::default();
        let engine = engine_with(&config);
        assert_eq!(engine.mii(100, 0), 0.0);
        assert_eq!(engine.mii(100, -5), 0.0);
    }

    #[test]
    fn mii_classification_gates_on_enrolment() {
        let config = MetricsConfig::default();
        let engine = engine_with(&config);
        assert_eq!(
            engine.classify_mii(0.9, 99),
            MiiClassification::MixedPopulation
        );
        assert_eq!(
            engine.classify_mii(0.45, 1000),
            MiiClassification::MigrationHotspot
        );
        assert_eq!(
            engine.classify_mii(0.01, 1000),
            MiiClassification::BirthRateDriven
        );
        assert_eq!(
            engine.classify_mii(0.20, 1000),
            MiiClassification::MixedPopulation
        );
    }

    #[test]
    fn dhr_zero_biometric_returns_raw_demographic_count() {
        let config = MetricsConfig::default();
        let engine = engine_with(&config);
        assert_eq!(engine.dhr(100, 0), 100.0);
        assert_eq!(engine.dhr(0, 0), 0.0);
    }

    #[test]
    fn dhr_ratio_flags_fraud_above_gate() {
        let config = MetricsConfig::default();
        let engine = engine_with(&config);
        let dhr = engine.dhr(2000, 1000);
        assert_eq!(dhr, 2.0);
        assert_eq!(
            engine.classify_dhr(dhr, 3000),
            DhrClassification::HighFraudRisk
        );
        assert_eq!(
            engine.classify_dhr(dhr, 999),
            DhrClassification::NormalMaintenance
        );
        assert_eq!(
            engine.classify_dhr(0.2, 3000),
            DhrClassification::OverVerified
        );
    }

    #[test]
    fn tlp_weekend_heavy_week_flags_weekend_warrior() {
        let config = MetricsConfig::default();
        let engine = engine_with(&config);
        let observations = [
            (date(2024, 1, 6), 400),  // Saturday
            (date(2024, 1, 7), 300),  // Sunday
            (date(2024, 1, 8), 100),  // Monday
            (date(2024, 1, 9), 200),  // Tuesday
        ];
        let tlp = engine.tlp(&observations);
        assert_eq!(tlp.classification, TlpClassification::WeekendWarrior);
        assert_eq!(tlp.saturday, 0.4);
        assert_eq!(tlp.sunday, 0.3);
        assert_eq!(tlp.monday, 0.1);
        assert_eq!(tlp.tuesday, 0.2);
        assert_eq!(
            tlp.recommendation,
            "Deploy Mobile Van on Saturdays and Sundays"
        );
    }

    #[test]
    fn tlp_school_day_heavy_week_flags_school_drive() {
        let config = MetricsConfig::default();
        let engine = engine_with(&config);
        let observations = [
            (date(2024, 1, 9), 400),  // Tuesday
            (date(2024, 1, 10), 300), // Wednesday
            (date(2024, 1, 11), 150), // Thursday
            (date(2024, 1, 13), 150), // Saturday
        ];
        let tlp = engine.tlp(&observations);
        assert_eq!(tlp.classification, TlpClassification::SchoolDrive);
        assert_eq!(
            tlp.recommendation,
            "Coordinate with schools for Tuesday/Wednesday drives"
        );
    }

    #[test]
    fn tlp_empty_input_is_all_zero_balanced() {
        let config = MetricsConfig::default();
        let engine = engine_with(&config);
        let tlp = engine.tlp(&[]);
        assert_eq!(tlp.fractions(), [0.0; 7]);
        assert_eq!(tlp.classification, TlpClassification::BalancedLoad);
        assert_eq!(
            tlp.recommendation,
            "Insufficient data for scheduling recommendation"
        );
    }

    #[test]
    fn tlp_zero_volume_input_is_all_zero_balanced() {
        let config = MetricsConfig::default();
        let engine = engine_with(&config);
        let tlp = engine.tlp(&[(date(2024, 1, 8), 0), (date(2024, 1, 9), 0)]);
        assert_eq!(tlp.fractions(), [0.0; 7]);
        assert_eq!(tlp.classification, TlpClassification::BalancedLoad);
    }

    #[test]
    fn tlp_spread_week_is_balanced() {
        let config = MetricsConfig::default();
        let engine = engine_with(&config);
        let observations: Vec<(NaiveDate, i64)> = (8..15)
            .map(|d| (date(2024, 1, d), 100))
            .collect();
        let tlp = engine.tlp(&observations);
        assert_eq!(tlp.classification, TlpClassification::BalancedLoad);
        assert_eq!(tlp.recommendation, "Standard staffing schedule recommended");
        assert_eq!(tlp.monday, 0.1429);
    }
}
