//! On-demand insight lookups. Gold rows are preferred; a miss falls back to
//! recomputing from the raw tiers with the same metric formulas the batch
//! rollup uses, so a stale or absent gold table degrades to slower answers
//! instead of missing ones.

use std::collections::BTreeSet;

use enrolytics_config::AnalyticsConfig;
use enrolytics_core::{
    DistrictInsight, EnrolmentRecord, MaturityLabel, NationalSummary, PincodeInsight, Tier,
};
use enrolytics_engine::{load_raw, pincode_insight_from_rows, round4, MetricEngine, RawData};
use enrolytics_store::LayeredStore;

use crate::error::InsightError;

/// Outcome of a keyed lookup. `EmptyStore` means no enrolment data has been
/// ingested at all, as opposed to data existing but not for this key.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    EmptyStore,
}

impl<T> Lookup<T> {
    /// The found value, if any.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::EmptyStore => None,
        }
    }
}

pub struct InsightService<'a, S: LayeredStore> {
    store: &'a S,
    config: &'a AnalyticsConfig,
}

impl<'a, S: LayeredStore> InsightService<'a, S> {
    pub fn new(store: &'a S, config: &'a AnalyticsConfig) -> Self {
        InsightService { store, config }
    }

    /// Insight for one pincode: the gold row when present, otherwise a
    /// recompute over the raw tiers.
    pub fn pincode_insight(
        &self,
        pincode: &str,
    ) -> Result<Lookup<PincodeInsight>, InsightError> {
        let gold: Vec<PincodeInsight> = self.store.read(Tier::Gold)?;
        if let Some(row) = gold.into_iter().find(|r| r.pincode == pincode) {
            return Ok(Lookup::Found(row));
        }

        let raw = load_raw(self.store)?;
        if raw.enrolment.is_empty() {
            return Ok(Lookup::EmptyStore);
        }

        let rows: Vec<&EnrolmentRecord> = raw
            .enrolment
            .iter()
            .filter(|r| r.pincode == pincode)
            .collect();
        let total_biometric: i64 = raw
            .biometric
            .iter()
            .filter(|r| r.pincode == pincode)
            .map(|r| r.bio_age_5_17 + r.bio_age_17_plus)
            .sum();
        let total_demographic: i64 = raw
            .demographic
            .iter()
            .filter(|r| r.pincode == pincode)
            .map(|r| r.demo_age_5_17 + r.demo_age_17_plus)
            .sum();

        let metrics = MetricEngine::new(&self.config.metrics);
        match pincode_insight_from_rows(&metrics, pincode, &rows, total_biometric, total_demographic)
        {
            Some(insight) => Ok(Lookup::Found(insight)),
            None => Ok(Lookup::NotFound),
        }
    }

    /// Insight for one district, matched case-insensitively, with an
    /// optional state to disambiguate district names shared across states.
    pub fn district_insight(
        &self,
        district: &str,
        state: Option<&str>,
    ) -> Result<Lookup<DistrictInsight>, InsightError> {
        let wanted_district = district.to_uppercase();
        let wanted_state = state.map(str::to_uppercase);

        let gold: Vec<DistrictInsight> = self.store.read(Tier::Gold)?;
        if let Some(row) = gold.into_iter().find(|r| {
            r.district == wanted_district
                && wanted_state.as_deref().map_or(true, |s| r.state == s)
        }) {
            return Ok(Lookup::Found(row));
        }

        let raw = load_raw(self.store)?;
        if raw.enrolment.is_empty() {
            return Ok(Lookup::EmptyStore);
        }
        match self.recompute_district(&raw, &wanted_district, wanted_state.as_deref()) {
            Some(insight) => Ok(Lookup::Found(insight)),
            None => Ok(Lookup::NotFound),
        }
    }

    /// Nation-wide rollup. Full summary when both gold tables have rows; a
    /// fast totals-only scan of the raw tiers otherwise. Missing tables are
    /// never an error.
    pub fn national_summary(&self) -> Result<NationalSummary, InsightError> {
        let pincode_rows: Vec<PincodeInsight> = self.store.read(Tier::Gold)?;
        let district_rows: Vec<DistrictInsight> = self.store.read(Tier::Gold)?;
        if !pincode_rows.is_empty() && !district_rows.is_empty() {
            return Ok(summary_from_gold(&pincode_rows, &district_rows));
        }
        self.summary_from_raw()
    }

    fn recompute_district(
        &self,
        raw: &RawData,
        district: &str,
        state: Option<&str>,
    ) -> Option<DistrictInsight> {
        let in_district = |row_state: &str, row_district: &str| {
            row_district == district && state.map_or(true, |s| row_state == s)
        };

        let enrolment: Vec<&EnrolmentRecord> = raw
            .enrolment
            .iter()
            .filter(|r| in_district(&r.state, &r.district))
            .collect();
        let state_name = enrolment.first()?.state.clone();

        let mut total_enrolment = 0i64;
        let mut enrolment_18_plus = 0i64;
        let mut pincodes: BTreeSet<&str> = BTreeSet::new();
        for row in &enrolment {
            total_enrolment += row.age_0_5 + row.age_5_17 + row.age_18_greater;
            enrolment_18_plus += row.age_18_greater;
            pincodes.insert(row.pincode.as_str());
        }

        let total_biometric: i64 = raw
            .biometric
            .iter()
            .filter(|r| in_district(&r.state, &r.district))
            .map(|r| r.bio_age_5_17 + r.bio_age_17_plus)
            .sum();
        let total_demographic: i64 = raw
            .demographic
            .iter()
            .filter(|r| in_district(&r.state, &r.district))
            .map(|r| r.demo_age_5_17 + r.demo_age_17_plus)
            .sum();

        // Flag counts come from per-pincode insights assembled the same way
        // the batch rollup assembles them, over each pincode's full slice.
        let metrics = MetricEngine::new(&self.config.metrics);
        let mut ovs_values = Vec::with_capacity(pincodes.len());
        let mut volatile_count = 0i64;
        let mut migration_count = 0i64;
        let mut fraud_count = 0i64;
        for pincode in &pincodes {
            let rows: Vec<&EnrolmentRecord> = raw
                .enrolment
                .iter()
                .filter(|r| r.pincode == *pincode)
                .collect();
            let bio: i64 = raw
                .biometric
                .iter()
                .filter(|r| r.pincode == *pincode)
                .map(|r| r.bio_age_5_17 + r.bio_age_17_plus)
                .sum();
            let demo: i64 = raw
                .demographic
                .iter()
                .filter(|r| r.pincode == *pincode)
                .map(|r| r.demo_age_5_17 + r.demo_age_17_plus)
                .sum();
            if let Some(insight) = pincode_insight_from_rows(&metrics, pincode, &rows, bio, demo) {
                ovs_values.push(insight.ovs);
                if insight.is_volatile_camp {
                    volatile_count += 1;
                }
                if insight.is_migration_hotspot {
                    migration_count += 1;
                }
                if insight.is_fraud_risk {
                    fraud_count += 1;
                }
            }
        }

        let avg_ovs = if ovs_values.is_empty() {
            0.0
        } else {
            ovs_values.iter().sum::<f64>() / ovs_values.len() as f64
        };
        let avg_mii = metrics.mii(enrolment_18_plus, total_enrolment);
        let avg_dhr = metrics.dhr(total_demographic, total_biometric);

        let denominator = total_enrolment.max(1) as f64;
        let enrolment_rate = total_enrolment as f64 / denominator;
        let update_rate = (total_biometric + total_demographic) as f64 / denominator;
        let adult_ratio = enrolment_18_plus as f64 / denominator;

        // Rule-based label: the clustering view needs the full district set,
        // which a single-district recompute does not have.
        let sml_cluster = if enrolment_rate > 0.5 {
            MaturityLabel::Emerging
        } else if update_rate > 0.3 {
            MaturityLabel::Mature
        } else {
            MaturityLabel::HighChurn
        };

        Some(DistrictInsight {
            state: state_name,
            district: district.to_string(),
            pincode_count: pincodes.len() as i64,
            total_enrolment,
            total_biometric,
            total_demographic,
            avg_ovs: round4(avg_ovs),
            avg_mii: round4(avg_mii),
            avg_dhr: round4(avg_dhr),
            sml_cluster,
            sml_description: sml_cluster.description().to_string(),
            normalized_enrolment_rate: round4(enrolment_rate.min(1.0)),
            normalized_update_rate: round4(update_rate.min(1.0)),
            normalized_adult_ratio: round4(adult_ratio),
            volatile_camp_count: volatile_count,
            migration_hotspot_count: migration_count,
            fraud_risk_count: fraud_count,
        })
    }

    fn summary_from_raw(&self) -> Result<NationalSummary, InsightError> {
        let raw = load_raw(self.store)?;
        if raw.enrolment.is_empty() {
            return Ok(NationalSummary::empty());
        }

        let mut states = BTreeSet::new();
        let mut districts = BTreeSet::new();
        let mut pincodes = BTreeSet::new();
        let mut total_enrolment = 0i64;
        for row in &raw.enrolment {
            states.insert(row.state.as_str());
            districts.insert(row.district.as_str());
            pincodes.insert(row.pincode.as_str());
            total_enrolment += row.age_0_5 + row.age_5_17 + row.age_18_greater;
        }
        let total_biometric: i64 = raw
            .biometric
            .iter()
            .map(|r| r.bio_age_5_17 + r.bio_age_17_plus)
            .sum();
        let total_demographic: i64 = raw
            .demographic
            .iter()
            .map(|r| r.demo_age_5_17 + r.demo_age_17_plus)
            .sum();

        Ok(NationalSummary {
            total_states: states.len() as i64,
            total_districts: districts.len() as i64,
            total_pincodes: pincodes.len() as i64,
            total_enrolment,
            total_biometric,
            total_demographic,
            avg_saturation_rate: saturation_rate(
                total_enrolment,
                total_biometric,
                total_demographic,
            ),
            ..NationalSummary::empty()
        })
    }
}

fn summary_from_gold(
    pincodes: &[PincodeInsight],
    districts: &[DistrictInsight],
) -> NationalSummary {
    let states: BTreeSet<&str> = pincodes.iter().map(|r| r.state.as_str()).collect();
    let district_names: BTreeSet<&str> = pincodes.iter().map(|r| r.district.as_str()).collect();

    let total_enrolment: i64 = pincodes.iter().map(|r| r.total_enrolment).sum();
    let total_biometric: i64 = pincodes.iter().map(|r| r.total_biometric).sum();
    let total_demographic: i64 = pincodes.iter().map(|r| r.total_demographic).sum();

    let mut emerging = 0i64;
    let mut saturated = 0i64;
    let mut high_churn = 0i64;
    for row in districts {
        match row.sml_cluster {
            MaturityLabel::Emerging => emerging += 1,
            MaturityLabel::Mature => saturated += 1,
            MaturityLabel::HighChurn => high_churn += 1,
        }
    }

    let mut volatile: Vec<&PincodeInsight> =
        pincodes.iter().filter(|r| r.is_volatile_camp).collect();
    volatile.sort_by(|a, b| b.ovs.total_cmp(&a.ovs));
    let top_volatile: Vec<String> = volatile
        .iter()
        .take(10)
        .map(|r| r.pincode.clone())
        .collect();

    NationalSummary {
        total_states: states.len() as i64,
        total_districts: district_names.len() as i64,
        total_pincodes: pincodes.len() as i64,
        total_enrolment,
        total_biometric,
        total_demographic,
        avg_saturation_rate: saturation_rate(total_enrolment, total_biometric, total_demographic),
        emerging_districts: emerging,
        saturated_districts: saturated,
        high_churn_districts: high_churn,
        volatile_camp_count: pincodes.iter().filter(|r| r.is_volatile_camp).count() as i64,
        migration_hotspot_count: pincodes.iter().filter(|r| r.is_migration_hotspot).count() as i64,
        high_fraud_risk_count: pincodes.iter().filter(|r| r.is_fraud_risk).count() as i64,
        top_volatile_pincodes: top_volatile,
        top_migration_districts: top_flagged(districts, |d| d.migration_hotspot_count),
        top_fraud_risk_districts: top_flagged(districts, |d| d.fraud_risk_count),
    }
}

/// Districts with at least one flagged pincode, most-flagged first, top 10.
fn top_flagged(
    districts: &[DistrictInsight],
    count: impl Fn(&DistrictInsight) -> i64,
) -> Vec<String> {
    let mut flagged: Vec<&DistrictInsight> =
        districts.iter().filter(|d| count(d) > 0).collect();
    flagged.sort_by(|a, b| count(b).cmp(&count(a)));
    flagged.iter().take(10).map(|d| d.district.clone()).collect()
}

fn saturation_rate(enrolment: i64, biometric: i64, demographic: i64) -> f64 {
    let total = enrolment + biometric + demographic;
    if total > 0 {
        round4((biometric + demographic) as f64 / total as f64)
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use enrolytics_core::{BiometricRecord, DemographicRecord};
    use enrolytics_engine::GoldAggregator;
    use enrolytics_store::{SqliteStore, WriteMode};
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn enrolment(
        day: NaiveDate,
        state: &str,
        district: &str,
        pincode: &str,
        bands: (i64, i64, i64),
    ) -> EnrolmentRecord {
        EnrolmentRecord {
            date: day,
            state: state.to_string(),
            district: district.to_string(),
            pincode: pincode.to_string(),
            age_0_5: bands.0,
            age_5_17: bands.1,
            age_18_greater: bands.2,
        }
    }

    fn seeded_store(dir: &TempDir) -> SqliteStore {
        let store = SqliteStore::open(&dir.path().join("store.db")).unwrap();
        let mut rows = Vec::new();
        for d in 8..16 {
            rows.push(enrolment(
                date(2024, 1, d),
                "KERALA",
                "ERNAKULAM",
                "682001",
                (10, 20, 30),
            ));
            rows.push(enrolment(
                date(2024, 1, d),
                "DELHI",
                "CENTRAL",
                "110001",
                (5, 5, 5),
            ));
        }
        store
            .write(Tier::Silver, &rows, WriteMode::Overwrite)
            .unwrap();
        store
            .write(
                Tier::Silver,
                &[BiometricRecord {
                    date: date(2024, 1, 8),
                    state: "KERALA".to_string(),
                    district: "ERNAKULAM".to_string(),
                    pincode: "682001".to_string(),
                    bio_age_5_17: 40,
                    bio_age_17_plus: 60,
                }],
                WriteMode::Overwrite,
            )
            .unwrap();
        store
            .write(
                Tier::Silver,
                &[DemographicRecord {
                    date: date(2024, 1, 8),
                    state: "KERALA".to_string(),
                    district: "ERNAKULAM".to_string(),
                    pincode: "682001".to_string(),
                    demo_age_5_17: 10,
                    demo_age_17_plus: 10,
                }],
                WriteMode::Overwrite,
            )
            .unwrap();
        store
    }

    #[test]
    fn recompute_matches_gold_row() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let config = AnalyticsConfig::default();
        let service = InsightService::new(&store, &config);

        let recomputed = service
            .pincode_insight("682001")
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(recomputed.total_enrolment, 480);
        assert_eq!(recomputed.total_biometric, 100);
        assert_eq!(recomputed.total_demographic, 20);

        GoldAggregator::new(&store, &config).run().unwrap();
        let from_gold = service
            .pincode_insight("682001")
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(from_gold, recomputed);
    }

    #[test]
    fn empty_store_vs_unknown_pincode() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&dir.path().join("store.db")).unwrap();
        let config = AnalyticsConfig::default();
        let service = InsightService::new(&store, &config);

        assert_eq!(
            service.pincode_insight("682001").unwrap(),
            Lookup::EmptyStore
        );

        let seeded = seeded_store(&dir);
        let service = InsightService::new(&seeded, &config);
        assert_eq!(service.pincode_insight("999999").unwrap(), Lookup::NotFound);
    }

    #[test]
    fn district_lookup_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let config = AnalyticsConfig::default();
        let service = InsightService::new(&store, &config);

        let insight = service
            .district_insight("ernakulam", None)
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(insight.district, "ERNAKULAM");
        assert_eq!(insight.state, "KERALA");
        assert_eq!(insight.pincode_count, 1);
        assert_eq!(insight.total_enrolment, 480);
        // Positive enrolment pins the recompute rate at 1.0.
        assert_eq!(insight.normalized_enrolment_rate, 1.0);
        assert_eq!(insight.sml_cluster, MaturityLabel::Emerging);
        assert_eq!(
            insight.sml_description,
            MaturityLabel::Emerging.description()
        );

        assert_eq!(
            service.district_insight("ernakulam", Some("delhi")).unwrap(),
            Lookup::NotFound
        );
    }

    #[test]
    fn update_only_district_labels_mature() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&dir.path().join("store.db")).unwrap();
        let config = AnalyticsConfig::default();

        // Enrolment rows exist but carry no volume; updates dominate.
        let rows: Vec<EnrolmentRecord> = (8..15)
            .map(|d| enrolment(date(2024, 1, d), "KERALA", "THRISSUR", "680101", (0, 0, 0)))
            .collect();
        store
            .write(Tier::Silver, &rows, WriteMode::Overwrite)
            .unwrap();
        store
            .write(
                Tier::Silver,
                &[BiometricRecord {
                    date: date(2024, 1, 8),
                    state: "KERALA".to_string(),
                    district: "THRISSUR".to_string(),
                    pincode: "680101".to_string(),
                    bio_age_5_17: 10,
                    bio_age_17_plus: 10,
                }],
                WriteMode::Overwrite,
            )
            .unwrap();

        let service = InsightService::new(&store, &config);
        let insight = service
            .district_insight("THRISSUR", None)
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(insight.total_enrolment, 0);
        assert_eq!(insight.sml_cluster, MaturityLabel::Mature);
    }

    #[test]
    fn national_summary_fast_then_gold() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let config = AnalyticsConfig::default();
        let service = InsightService::new(&store, &config);

        let fast = service.national_summary().unwrap();
        assert_eq!(fast.total_states, 2);
        assert_eq!(fast.total_districts, 2);
        assert_eq!(fast.total_pincodes, 2);
        assert_eq!(fast.total_enrolment, 600);
        assert_eq!(fast.total_biometric, 100);
        assert_eq!(fast.total_demographic, 20);
        // 120 / 720
        assert_eq!(fast.avg_saturation_rate, 0.1667);
        assert_eq!(fast.emerging_districts, 0);
        assert!(fast.top_volatile_pincodes.is_empty());

        GoldAggregator::new(&store, &config).run().unwrap();
        let full = service.national_summary().unwrap();
        assert_eq!(full.total_pincodes, 2);
        assert_eq!(full.total_enrolment, 600);
        // Two districts, both defaulted below the clustering minimum.
        assert_eq!(full.emerging_districts, 2);
        assert_eq!(full.migration_hotspot_count, 1);
        assert_eq!(full.top_migration_districts, vec!["ERNAKULAM".to_string()]);
    }

    #[test]
    fn empty_store_summary_is_all_zero() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&dir.path().join("store.db")).unwrap();
        let config = AnalyticsConfig::default();
        let service = InsightService::new(&store, &config);

        assert_eq!(service.national_summary().unwrap(), NationalSummary::empty());
    }
}
