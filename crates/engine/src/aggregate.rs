//! Batch rollup of the raw tiers into gold insight tables. All metric values
//! and classifications go through `MetricEngine`, so the batch rows match
//! what an on-demand recompute for the same slice would produce.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use enrolytics_config::AnalyticsConfig;
use enrolytics_core::{
    BiometricRecord, DemographicRecord, DhrClassification, DistrictInsight, EnrolmentRecord,
    MaturityLabel, MiiClassification, OvsClassification, PincodeInsight, Tier,
};
use enrolytics_store::{LayeredStore, StoreError, WriteMode};

use crate::cluster::MaturityClassifier;
use crate::error::EngineError;
use crate::metrics::{round4, MetricEngine};

/// Row counts written by one aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    pub pincode_insights: usize,
    pub district_insights: usize,
}

/// The three raw tables, read together. Silver is preferred; when silver has
/// no enrolment data the whole set falls back to bronze.
pub struct RawData {
    pub enrolment: Vec<EnrolmentRecord>,
    pub biometric: Vec<BiometricRecord>,
    pub demographic: Vec<DemographicRecord>,
}

pub fn load_raw<S: LayeredStore>(store: &S) -> Result<RawData, StoreError> {
    let enrolment: Vec<EnrolmentRecord> = store.read(Tier::Silver)?;
    if enrolment.is_empty() {
        return Ok(RawData {
            enrolment: store.read(Tier::Bronze)?,
            biometric: store.read(Tier::Bronze)?,
            demographic: store.read(Tier::Bronze)?,
        });
    }
    Ok(RawData {
        enrolment,
        biometric: store.read(Tier::Silver)?,
        demographic: store.read(Tier::Silver)?,
    })
}

/// Assemble the insight row for one pincode from its enrolment rows plus
/// pre-summed update totals. Empty slice yields `None`.
pub fn pincode_insight_from_rows(
    metrics: &MetricEngine<'_>,
    pincode: &str,
    enrolment: &[&EnrolmentRecord],
    total_biometric: i64,
    total_demographic: i64,
) -> Option<PincodeInsight> {
    let first = enrolment.first()?;

    let mut total_enrolment = 0i64;
    let mut enrolment_18_plus = 0i64;
    let mut daily: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for row in enrolment {
        let volume = row.age_0_5 + row.age_5_17 + row.age_18_greater;
        total_enrolment += volume;
        enrolment_18_plus += row.age_18_greater;
        *daily.entry(row.date).or_insert(0) += volume;
    }
    let daily_totals: Vec<i64> = daily.values().copied().collect();
    let observations: Vec<(NaiveDate, i64)> = daily.iter().map(|(&d, &v)| (d, v)).collect();

    let ovs = metrics.ovs(&daily_totals);
    let ovs_classification = metrics.classify_ovs(ovs, total_enrolment);
    let mii = metrics.mii(enrolment_18_plus, total_enrolment);
    let mii_classification = metrics.classify_mii(mii, total_enrolment);
    let dhr = metrics.dhr(total_demographic, total_biometric);
    let dhr_classification = metrics.classify_dhr(dhr, total_biometric + total_demographic);
    let tlp = metrics.tlp(&observations);

    Some(PincodeInsight {
        pincode: pincode.to_string(),
        state: first.state.clone(),
        district: first.district.clone(),
        total_enrolment,
        total_biometric,
        total_demographic,
        ovs,
        ovs_classification,
        mii,
        mii_classification,
        dhr,
        dhr_classification,
        tlp,
        is_volatile_camp: ovs_classification == OvsClassification::TemporaryCamp,
        is_migration_hotspot: mii_classification == MiiClassification::MigrationHotspot,
        is_fraud_risk: dhr_classification == DhrClassification::HighFraudRisk,
    })
}

pub struct GoldAggregator<'a, S: LayeredStore> {
    store: &'a S,
    config: &'a AnalyticsConfig,
}

impl<'a, S: LayeredStore> GoldAggregator<'a, S> {
    pub fn new(store: &'a S, config: &'a AnalyticsConfig) -> Self {
        GoldAggregator { store, config }
    }

    /// Rebuild both gold tables as full overwrites. Empty input writes
    /// nothing and reports 0/0.
    pub fn run(&self) -> Result<AggregateReport, EngineError> {
        let raw = load_raw(self.store)?;
        if raw.enrolment.is_empty() {
            return Ok(AggregateReport {
                pincode_insights: 0,
                district_insights: 0,
            });
        }

        let metrics = MetricEngine::new(&self.config.metrics);
        let pincode_rows = build_pincode_rows(&metrics, &raw);
        let district_rows = self.build_district_rows(&pincode_rows)?;

        self.store
            .write(Tier::Gold, &pincode_rows, WriteMode::Overwrite)?;
        self.store
            .write(Tier::Gold, &district_rows, WriteMode::Overwrite)?;

        Ok(AggregateReport {
            pincode_insights: pincode_rows.len(),
            district_insights: district_rows.len(),
        })
    }

    fn build_district_rows(
        &self,
        pincode_rows: &[PincodeInsight],
    ) -> Result<Vec<DistrictInsight>, EngineError> {
        let mut groups: BTreeMap<(String, String), Vec<&PincodeInsight>> = BTreeMap::new();
        for row in pincode_rows {
            groups
                .entry((row.state.clone(), row.district.clone()))
                .or_default()
                .push(row);
        }

        let max_enrolment = groups
            .values()
            .map(|rows| rows.iter().map(|r| r.total_enrolment).sum::<i64>())
            .max()
            .unwrap_or(0);
        let divisor = if max_enrolment > 0 { max_enrolment } else { 1 } as f64;

        let mut districts = Vec::with_capacity(groups.len());
        for ((state, district), rows) in &groups {
            let count = rows.len() as f64;
            let total_enrolment: i64 = rows.iter().map(|r| r.total_enrolment).sum();
            let total_biometric: i64 = rows.iter().map(|r| r.total_biometric).sum();
            let total_demographic: i64 = rows.iter().map(|r| r.total_demographic).sum();
            let avg_mii = round4(rows.iter().map(|r| r.mii).sum::<f64>() / count);

            let update_rate = if total_enrolment > 0 {
                let rate =
                    (total_biometric + total_demographic) as f64 / total_enrolment as f64;
                rate.clamp(0.0, 1.0)
            } else {
                0.0
            };

            districts.push(DistrictInsight {
                state: state.clone(),
                district: district.clone(),
                pincode_count: rows.len() as i64,
                total_enrolment,
                total_biometric,
                total_demographic,
                avg_ovs: round4(rows.iter().map(|r| r.ovs).sum::<f64>() / count),
                avg_mii,
                avg_dhr: round4(rows.iter().map(|r| r.dhr).sum::<f64>() / count),
                sml_cluster: MaturityLabel::Emerging,
                sml_description: String::new(),
                normalized_enrolment_rate: round4(total_enrolment as f64 / divisor),
                normalized_update_rate: round4(update_rate),
                normalized_adult_ratio: avg_mii,
                volatile_camp_count: rows.iter().filter(|r| r.is_volatile_camp).count() as i64,
                migration_hotspot_count: rows
                    .iter()
                    .filter(|r| r.is_migration_hotspot)
                    .count() as i64,
                fraud_risk_count: rows.iter().filter(|r| r.is_fraud_risk).count() as i64,
            });
        }

        // Cluster labels need at least k districts; below that every row
        // keeps the default Emerging with no description.
        if districts.len() >= self.config.clustering.clusters {
            let features: Vec<[f64; 3]> = districts
                .iter()
                .map(|d| {
                    [
                        d.total_enrolment as f64,
                        d.total_biometric as f64,
                        d.total_demographic as f64,
                    ]
                })
                .collect();
            let classifier = MaturityClassifier::new(&self.config.clustering);
            let result = classifier.classify(&features)?;
            for (district, label) in districts.iter_mut().zip(result.labels) {
                district.sml_cluster = label;
                district.sml_description = label.description().to_string();
            }
        }

        Ok(districts)
    }
}

fn build_pincode_rows(metrics: &MetricEngine<'_>, raw: &RawData) -> Vec<PincodeInsight> {
    let mut bio_totals: HashMap<&str, i64> = HashMap::new();
    for row in &raw.biometric {
        *bio_totals.entry(row.pincode.as_str()).or_insert(0) +=
            row.bio_age_5_17 + row.bio_age_17_plus;
    }
    let mut demo_totals: HashMap<&str, i64> = HashMap::new();
    for row in &raw.demographic {
        *demo_totals.entry(row.pincode.as_str()).or_insert(0) +=
            row.demo_age_5_17 + row.demo_age_17_plus;
    }

    // Update totals join on pincode alone, so a pincode split across two
    // districts carries its full update volume into both rows, same as the
    // row produced for a single-district pincode.
    let mut groups: BTreeMap<(&str, &str, &str), Vec<&EnrolmentRecord>> = BTreeMap::new();
    for row in &raw.enrolment {
        groups
            .entry((row.pincode.as_str(), row.state.as_str(), row.district.as_str()))
            .or_default()
            .push(row);
    }

    let mut rows = Vec::with_capacity(groups.len());
    for ((pincode, _, _), group) in &groups {
        let bio = bio_totals.get(pincode).copied().unwrap_or(0);
        let demo = demo_totals.get(pincode).copied().unwrap_or(0);
        if let Some(insight) = pincode_insight_from_rows(metrics, pincode, group, bio, demo) {
            rows.push(insight);
        }
    }
    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
