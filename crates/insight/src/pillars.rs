//! The four intelligence pillars: read-only bundles assembled for the
//! presentation layer. Raw scans run over silver with the bronze fallback;
//! district and pincode lists come from gold, and a missing gold tier yields
//! empty lists rather than errors.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use enrolytics_config::AnalyticsConfig;
use enrolytics_core::{
    DistrictInsight, MaturityLabel, OvsClassification, PincodeInsight, Tier,
};
use enrolytics_engine::{load_raw, RawData};
use enrolytics_store::LayeredStore;

use crate::error::InsightError;

/// Districts at or below this enrolment volume never count as service
/// shadows.
const GHOST_MIN_ENROLMENT: i64 = 50;
/// Utilization percentage above which a pincode runs near capacity.
const UTILIZATION_FLOOR_PCT: f64 = 90.0;
/// Adult share of enrolments above this percentage is anomalous; new
/// enrolments skew heavily towards children.
const ADULT_SHARE_ANOMALY_PCT: f64 = 10.0;
/// Districts under this gold enrolment total count as zero-growth.
const ZERO_GROWTH_CEILING: i64 = 100;
/// Combined daily volume z-score beyond which a date counts as a spike.
const SPIKE_Z_THRESHOLD: f64 = 3.0;

const LABOR_INFLUX_MII: f64 = 0.6;
const SETTLEMENT_ZONE_MII: f64 = 0.5;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Bundle types
// ---------------------------------------------------------------------------

/// District counts per maturity label over the gold district table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClusterDistribution {
    pub emerging: i64,
    pub mature: i64,
    pub high_churn: i64,
}

/// District with meaningful enrolment volume but zero adult biometric
/// updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GhostDistrict {
    pub state: String,
    pub district: String,
    pub adult_enrolments: i64,
    pub total_enrolments: i64,
}

/// Pincode whose average daily volume runs close to its peak.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtilizationEntry {
    pub pincode: String,
    pub state: String,
    pub district: String,
    pub max_daily_volume: i64,
    pub avg_daily_volume: f64,
    pub total_volume: i64,
    pub utilization_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategicPillar {
    pub cluster_distribution: ClusterDistribution,
    pub total_districts: i64,
    pub ghost_districts: Vec<GhostDistrict>,
    pub ghost_district_count: i64,
    pub high_utilization_pincodes: Vec<UtilizationEntry>,
}

/// Age-band totals for one state with the adult share of new enrolments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeLadderRow {
    pub state: String,
    pub age_0_5: i64,
    pub age_5_17: i64,
    pub age_18_greater: i64,
    pub total: i64,
    pub adult_pct: f64,
    pub is_anomaly: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationHotspot {
    pub state: String,
    pub district: String,
    pub avg_mii: f64,
    pub verdict: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZeroGrowthDistrict {
    pub state: String,
    pub district: String,
    pub total_enrolment: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthPillar {
    pub age_ladder: Vec<AgeLadderRow>,
    pub anomaly_states: Vec<String>,
    pub migration_hotspots: Vec<MigrationHotspot>,
    pub hotspot_count: i64,
    pub zero_growth_districts: Vec<ZeroGrowthDistrict>,
    pub saturated_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyStudentVolume {
    pub month: u32,
    pub student_updates: i64,
}

/// School-age biometric volume by calendar month across all loaded years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSurge {
    pub monthly_data: Vec<MonthlyStudentVolume>,
    pub peak_month: Option<&'static str>,
    pub peak_value: i64,
}

/// Ratio of biometric to demographic update volume, bucketed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigitalMaturity {
    pub score: f64,
    pub classification: &'static str,
    pub recommendation: &'static str,
    pub total_biometric: i64,
    pub total_demographic: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampGridEntry {
    pub pincode: String,
    pub district: String,
    pub ovs: f64,
    pub total_enrolment: i64,
    pub ovs_classification: OvsClassification,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampGrid {
    pub data: Vec<CampGridEntry>,
    pub camp_count: i64,
    pub center_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationalPillar {
    pub student_surge: StudentSurge,
    pub digital_maturity: DigitalMaturity,
    pub camp_vs_center: CampGrid,
}

/// Date whose combined volume across all three kinds is a statistical
/// outlier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynchronizedSpike {
    pub date: NaiveDate,
    pub volume: i64,
    pub z_score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChurnMapEntry {
    pub state: String,
    pub district: String,
    pub total_demographic: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VigilancePillar {
    pub red_list: Vec<DistrictInsight>,
    pub fraud_risk_count: i64,
    pub churn_map: Vec<ChurnMapEntry>,
    pub synchronized_spikes: Vec<SynchronizedSpike>,
    pub spike_count: i64,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct PillarService<'a, S: LayeredStore> {
    store: &'a S,
    config: &'a AnalyticsConfig,
}

impl<'a, S: LayeredStore> PillarService<'a, S> {
    pub fn new(store: &'a S, config: &'a AnalyticsConfig) -> Self {
        PillarService { store, config }
    }

    /// Synthesis view: cluster spread plus capacity anomalies.
    pub fn strategic(&self) -> Result<StrategicPillar, InsightError> {
        let districts: Vec<DistrictInsight> = self.store.read(Tier::Gold)?;
        let mut distribution = ClusterDistribution {
            emerging: 0,
            mature: 0,
            high_churn: 0,
        };
        for row in &districts {
            match row.sml_cluster {
                MaturityLabel::Emerging => distribution.emerging += 1,
                MaturityLabel::Mature => distribution.mature += 1,
                MaturityLabel::HighChurn => distribution.high_churn += 1,
            }
        }

        let raw = load_raw(self.store)?;
        let ghosts: Vec<GhostDistrict> = ghost_districts(&raw).into_iter().take(10).collect();

        Ok(StrategicPillar {
            cluster_distribution: distribution,
            total_districts: districts.len() as i64,
            ghost_district_count: ghosts.len() as i64,
            ghost_districts: ghosts,
            high_utilization_pincodes: high_utilization(&raw),
        })
    }

    /// Enrolment growth and coverage.
    pub fn growth(&self) -> Result<GrowthPillar, InsightError> {
        let raw = load_raw(self.store)?;
        let age_ladder = age_ladder(&raw);
        let anomaly_states: Vec<String> = age_ladder
            .iter()
            .filter(|row| row.is_anomaly)
            .map(|row| row.state.clone())
            .collect();

        let districts: Vec<DistrictInsight> = self.store.read(Tier::Gold)?;
        let hotspots =
            migration_hotspots(&districts, self.config.metrics.mii_hotspot_threshold);
        let zero_growth = zero_growth_districts(&districts);

        Ok(GrowthPillar {
            hotspot_count: hotspots.len() as i64,
            saturated_count: zero_growth.len() as i64,
            age_ladder,
            anomaly_states,
            migration_hotspots: hotspots,
            zero_growth_districts: zero_growth,
        })
    }

    /// Biometric update operations: seasonal load, update culture, camp
    /// detection.
    pub fn operational(&self) -> Result<OperationalPillar, InsightError> {
        let raw = load_raw(self.store)?;
        let pincodes: Vec<PincodeInsight> = self.store.read(Tier::Gold)?;
        Ok(OperationalPillar {
            student_surge: student_surge(&raw),
            digital_maturity: digital_maturity(&raw),
            camp_vs_center: camp_grid(&pincodes),
        })
    }

    /// Demographic hygiene anomalies.
    pub fn vigilance(&self) -> Result<VigilancePillar, InsightError> {
        let districts: Vec<DistrictInsight> = self.store.read(Tier::Gold)?;

        let mut red_list: Vec<DistrictInsight> = districts
            .iter()
            .filter(|d| d.avg_dhr > self.config.metrics.dhr_fraud_threshold)
            .cloned()
            .collect();
        red_list.sort_by(|a, b| b.avg_dhr.total_cmp(&a.avg_dhr));
        red_list.truncate(20);

        let mut churn_map: Vec<ChurnMapEntry> = districts
            .iter()
            .map(|d| ChurnMapEntry {
                state: d.state.clone(),
                district: d.district.clone(),
                total_demographic: d.total_demographic,
            })
            .collect();
        churn_map.sort_by(|a, b| b.total_demographic.cmp(&a.total_demographic));
        churn_map.truncate(50);

        let raw = load_raw(self.store)?;
        let spikes = synchronized_spikes(&raw);

        Ok(VigilancePillar {
            fraud_risk_count: red_list.len() as i64,
            spike_count: spikes.len() as i64,
            red_list,
            churn_map,
            synchronized_spikes: spikes,
        })
    }
}

// ---------------------------------------------------------------------------
// Raw-tier scans
// ---------------------------------------------------------------------------

/// Districts with enrolment volume but no adult biometric updates at all,
/// largest first.
pub fn ghost_districts(raw: &RawData) -> Vec<GhostDistrict> {
    let mut groups: BTreeMap<(&str, &str), (i64, i64)> = BTreeMap::new();
    for row in &raw.enrolment {
        let entry = groups
            .entry((row.state.as_str(), row.district.as_str()))
            .or_insert((0, 0));
        entry.0 += row.age_18_greater;
        entry.1 += row.age_0_5 + row.age_5_17 + row.age_18_greater;
    }
    let mut adult_bio: HashMap<(&str, &str), i64> = HashMap::new();
    for row in &raw.biometric {
        *adult_bio
            .entry((row.state.as_str(), row.district.as_str()))
            .or_insert(0) += row.bio_age_17_plus;
    }

    let mut ghosts: Vec<GhostDistrict> = groups
        .iter()
        .filter(|((state, district), (_, total))| {
            *total > GHOST_MIN_ENROLMENT
                && adult_bio.get(&(*state, *district)).copied().unwrap_or(0) == 0
        })
        .map(|((state, district), (adult, total))| GhostDistrict {
            state: state.to_string(),
            district: district.to_string(),
            adult_enrolments: *adult,
            total_enrolments: *total,
        })
        .collect();
    ghosts.sort_by(|a, b| b.total_enrolments.cmp(&a.total_enrolments));
    ghosts
}

/// Per-pincode load factor: average row volume over peak row volume. Only
/// pincodes running above the utilization floor are returned, top 5.
pub fn high_utilization(raw: &RawData) -> Vec<UtilizationEntry> {
    let mut groups: BTreeMap<(&str, &str, &str), Vec<i64>> = BTreeMap::new();
    for row in &raw.enrolment {
        groups
            .entry((row.pincode.as_str(), row.state.as_str(), row.district.as_str()))
            .or_default()
            .push(row.age_0_5 + row.age_5_17 + row.age_18_greater);
    }

    let mut entries = Vec::new();
    for ((pincode, state, district), volumes) in &groups {
        let max = volumes.iter().copied().max().unwrap_or(0);
        let total: i64 = volumes.iter().sum();
        let avg = total as f64 / volumes.len() as f64;
        let rate = if max > 0 {
            avg / max as f64 * 100.0
        } else {
            0.0
        };
        if rate > UTILIZATION_FLOOR_PCT {
            entries.push(UtilizationEntry {
                pincode: pincode.to_string(),
                state: state.to_string(),
                district: district.to_string(),
                max_daily_volume: max,
                avg_daily_volume: avg,
                total_volume: total,
                utilization_rate: rate,
            });
        }
    }
    entries.sort_by(|a, b| b.utilization_rate.total_cmp(&a.utilization_rate));
    entries.truncate(5);
    entries
}

/// Age-band totals per state with the adult share, largest states first.
pub fn age_ladder(raw: &RawData) -> Vec<AgeLadderRow> {
    let mut groups: BTreeMap<&str, (i64, i64, i64)> = BTreeMap::new();
    for row in &raw.enrolment {
        let entry = groups.entry(row.state.as_str()).or_insert((0, 0, 0));
        entry.0 += row.age_0_5;
        entry.1 += row.age_5_17;
        entry.2 += row.age_18_greater;
    }

    let mut ladder: Vec<AgeLadderRow> = groups
        .iter()
        .map(|(state, (young, school, adult))| {
            let total = young + school + adult;
            let adult_pct = if total > 0 {
                round1(*adult as f64 / total as f64 * 100.0)
            } else {
                0.0
            };
            AgeLadderRow {
                state: state.to_string(),
                age_0_5: *young,
                age_5_17: *school,
                age_18_greater: *adult,
                total,
                adult_pct,
                is_anomaly: adult_pct > ADULT_SHARE_ANOMALY_PCT,
            }
        })
        .collect();
    ladder.sort_by(|a, b| b.total.cmp(&a.total));
    ladder
}

/// Monthly school-age biometric volume with the peak month called out.
pub fn student_surge(raw: &RawData) -> StudentSurge {
    let mut monthly: BTreeMap<u32, i64> = BTreeMap::new();
    for row in &raw.biometric {
        *monthly.entry(row.date.month()).or_insert(0) += row.bio_age_5_17;
    }
    if monthly.is_empty() {
        return StudentSurge {
            monthly_data: Vec::new(),
            peak_month: None,
            peak_value: 0,
        };
    }

    let monthly_data: Vec<MonthlyStudentVolume> = monthly
        .iter()
        .map(|(&month, &student_updates)| MonthlyStudentVolume {
            month,
            student_updates,
        })
        .collect();

    // Earliest month wins a tie.
    let mut peak = monthly_data[0];
    for entry in &monthly_data[1..] {
        if entry.student_updates > peak.student_updates {
            peak = *entry;
        }
    }

    StudentSurge {
        monthly_data,
        peak_month: Some(MONTH_NAMES[(peak.month - 1) as usize]),
        peak_value: peak.student_updates,
    }
}

/// Biometric-to-demographic volume ratio. No demographic volume at all reads
/// as mature usage.
pub fn digital_maturity(raw: &RawData) -> DigitalMaturity {
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

    let score = if total_demographic == 0 {
        2.0
    } else {
        total_biometric as f64 / total_demographic as f64
    };

    let (classification, recommendation) = if score < 0.5 {
        (
            "Fixing Phase",
            "High address change volume - investigate data quality",
        )
    } else if score < 1.5 {
        ("Normal Operation", "Healthy balance of updates")
    } else {
        ("Mature Usage", "Strong biometric verification culture")
    };

    DigitalMaturity {
        score: round2(score),
        classification,
        recommendation,
        total_biometric,
        total_demographic,
    }
}

/// Dates whose combined volume across all three kinds sits more than three
/// sample standard deviations from the mean, in date order.
pub fn synchronized_spikes(raw: &RawData) -> Vec<SynchronizedSpike> {
    let mut daily: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for row in &raw.enrolment {
        *daily.entry(row.date).or_insert(0) += row.age_0_5 + row.age_5_17 + row.age_18_greater;
    }
    for row in &raw.biometric {
        *daily.entry(row.date).or_insert(0) += row.bio_age_5_17 + row.bio_age_17_plus;
    }
    for row in &raw.demographic {
        *daily.entry(row.date).or_insert(0) += row.demo_age_5_17 + row.demo_age_17_plus;
    }
    if daily.len() < 2 {
        return Vec::new();
    }

    let n = daily.len() as f64;
    let mean = daily.values().map(|&v| v as f64).sum::<f64>() / n;
    let variance = daily
        .values()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / (n - 1.0);
    let std = variance.sqrt();
    if std == 0.0 {
        return Vec::new();
    }

    daily
        .iter()
        .filter_map(|(&date, &volume)| {
            let z = (volume as f64 - mean) / std;
            (z.abs() > SPIKE_Z_THRESHOLD).then(|| SynchronizedSpike {
                date,
                volume,
                z_score: z,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Gold-derived lists
// ---------------------------------------------------------------------------

fn migration_hotspots(districts: &[DistrictInsight], threshold: f64) -> Vec<MigrationHotspot> {
    let mut hotspots: Vec<MigrationHotspot> = districts
        .iter()
        .filter(|d| d.avg_mii > threshold)
        .map(|d| MigrationHotspot {
            state: d.state.clone(),
            district: d.district.clone(),
            avg_mii: d.avg_mii,
            verdict: if d.avg_mii > LABOR_INFLUX_MII {
                "Labor Influx"
            } else if d.avg_mii > SETTLEMENT_ZONE_MII {
                "Settlement Zone"
            } else {
                "Migration Detected"
            },
        })
        .collect();
    hotspots.sort_by(|a, b| b.avg_mii.total_cmp(&a.avg_mii));
    hotspots.truncate(20);
    hotspots
}

fn zero_growth_districts(districts: &[DistrictInsight]) -> Vec<ZeroGrowthDistrict> {
    let mut rows: Vec<ZeroGrowthDistrict> = districts
        .iter()
        .filter(|d| d.total_enrolment < ZERO_GROWTH_CEILING)
        .map(|d| ZeroGrowthDistrict {
            state: d.state.clone(),
            district: d.district.clone(),
            total_enrolment: d.total_enrolment,
        })
        .collect();
    rows.sort_by(|a, b| a.total_enrolment.cmp(&b.total_enrolment));
    rows.truncate(20);
    rows
}

fn camp_grid(pincodes: &[PincodeInsight]) -> CampGrid {
    let mut sorted: Vec<&PincodeInsight> = pincodes.iter().collect();
    sorted.sort_by(|a, b| b.ovs.total_cmp(&a.ovs));

    let data: Vec<CampGridEntry> = sorted
        .iter()
        .take(50)
        .map(|p| CampGridEntry {
            pincode: p.pincode.clone(),
            district: p.district.clone(),
            ovs: p.ovs,
            total_enrolment: p.total_enrolment,
            ovs_classification: p.ovs_classification,
        })
        .collect();
    let camp_count = data
        .iter()
        .filter(|e| e.ovs_classification == OvsClassification::TemporaryCamp)
        .count() as i64;
    let center_count = data
        .iter()
        .filter(|e| e.ovs_classification == OvsClassification::PermanentCenter)
        .count() as i64;

    CampGrid {
        data,
        camp_count,
        center_count,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use enrolytics_core::{BiometricRecord, DemographicRecord, EnrolmentRecord};

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

    fn biometric(
        day: NaiveDate,
        district: &str,
        pincode: &str,
        young: i64,
        adult: i64,
    ) -> BiometricRecord {
        BiometricRecord {
            date: day,
            state: "KERALA".to_string(),
            district: district.to_string(),
            pincode: pincode.to_string(),
            bio_age_5_17: young,
            bio_age_17_plus: adult,
        }
    }

    fn demographic(day: NaiveDate, pincode: &str, young: i64, adult: i64) -> DemographicRecord {
        DemographicRecord {
            date: day,
            state: "KERALA".to_string(),
            district: "ERNAKULAM".to_string(),
            pincode: pincode.to_string(),
            demo_age_5_17: young,
            demo_age_17_plus: adult,
        }
    }

    fn empty_raw() -> RawData {
        RawData {
            enrolment: Vec::new(),
            biometric: Vec::new(),
            demographic: Vec::new(),
        }
    }

    #[test]
    fn ghost_district_needs_volume_and_silence() {
        let mut raw = empty_raw();
        // SHADOW: 70 enrolments, no biometric rows at all.
        raw.enrolment.push(enrolment(
            date(2024, 1, 8),
            "KERALA",
            "SHADOW",
            "680001",
            (20, 20, 30),
        ));
        // COVERED: same volume but adult biometric activity exists.
        raw.enrolment.push(enrolment(
            date(2024, 1, 8),
            "KERALA",
            "COVERED",
            "680002",
            (20, 20, 30),
        ));
        raw.biometric
            .push(biometric(date(2024, 1, 8), "COVERED", "680002", 0, 5));
        // SMALL: silent but below the volume floor.
        raw.enrolment.push(enrolment(
            date(2024, 1, 8),
            "KERALA",
            "SMALL",
            "680003",
            (10, 10, 10),
        ));

        let ghosts = ghost_districts(&raw);
        assert_eq!(ghosts.len(), 1);
        assert_eq!(ghosts[0].district, "SHADOW");
        assert_eq!(ghosts[0].total_enrolments, 70);
        assert_eq!(ghosts[0].adult_enrolments, 30);
    }

    #[test]
    fn young_only_biometric_does_not_clear_a_shadow() {
        let mut raw = empty_raw();
        raw.enrolment.push(enrolment(
            date(2024, 1, 8),
            "KERALA",
            "SHADOW",
            "680001",
            (20, 20, 30),
        ));
        // School-age updates only; the adult column stays zero.
        raw.biometric
            .push(biometric(date(2024, 1, 8), "SHADOW", "680001", 50, 0));

        let ghosts = ghost_districts(&raw);
        assert_eq!(ghosts.len(), 1);
    }

    #[test]
    fn steady_pincode_runs_at_full_utilization() {
        let mut raw = empty_raw();
        for d in 8..15 {
            raw.enrolment.push(enrolment(
                date(2024, 1, d),
                "KERALA",
                "ERNAKULAM",
                "682001",
                (10, 10, 10),
            ));
        }
        // Bursty pincode: far below its own peak on most days.
        raw.enrolment.push(enrolment(
            date(2024, 1, 8),
            "KERALA",
            "ERNAKULAM",
            "682002",
            (100, 100, 100),
        ));
        raw.enrolment.push(enrolment(
            date(2024, 1, 9),
            "KERALA",
            "ERNAKULAM",
            "682002",
            (1, 1, 1),
        ));

        let entries = high_utilization(&raw);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pincode, "682001");
        assert_eq!(entries[0].utilization_rate, 100.0);
        assert_eq!(entries[0].max_daily_volume, 30);
        assert_eq!(entries[0].total_volume, 210);
    }

    #[test]
    fn age_ladder_flags_adult_heavy_states() {
        let mut raw = empty_raw();
        raw.enrolment.push(enrolment(
            date(2024, 1, 8),
            "KERALA",
            "ERNAKULAM",
            "682001",
            (40, 40, 20),
        ));
        raw.enrolment.push(enrolment(
            date(2024, 1, 8),
            "GOA",
            "NORTH GOA",
            "403001",
            (40, 8, 2),
        ));

        let ladder = age_ladder(&raw);
        assert_eq!(ladder.len(), 2);
        // Sorted by total volume.
        assert_eq!(ladder[0].state, "KERALA");
        assert_eq!(ladder[0].adult_pct, 20.0);
        assert!(ladder[0].is_anomaly);
        assert_eq!(ladder[1].state, "GOA");
        assert_eq!(ladder[1].adult_pct, 4.0);
        assert!(!ladder[1].is_anomaly);
    }

    #[test]
    fn student_surge_finds_peak_month() {
        let mut raw = empty_raw();
        raw.biometric
            .push(biometric(date(2024, 3, 10), "ERNAKULAM", "682001", 100, 5));
        raw.biometric
            .push(biometric(date(2024, 6, 10), "ERNAKULAM", "682001", 700, 5));
        raw.biometric
            .push(biometric(date(2023, 6, 11), "ERNAKULAM", "682001", 200, 5));

        let surge = student_surge(&raw);
        assert_eq!(surge.monthly_data.len(), 2);
        // June totals merge across years.
        assert_eq!(surge.peak_month, Some("Jun"));
        assert_eq!(surge.peak_value, 900);
    }

    #[test]
    fn student_surge_empty_without_biometric_rows() {
        let surge = student_surge(&empty_raw());
        assert!(surge.monthly_data.is_empty());
        assert_eq!(surge.peak_month, None);
        assert_eq!(surge.peak_value, 0);
    }

    #[test]
    fn digital_maturity_buckets() {
        let mut raw = empty_raw();
        raw.biometric
            .push(biometric(date(2024, 1, 8), "ERNAKULAM", "682001", 500, 500));
        raw.demographic
            .push(demographic(date(2024, 1, 8), "682001", 500, 500));
        let balanced = digital_maturity(&raw);
        assert_eq!(balanced.score, 1.0);
        assert_eq!(balanced.classification, "Normal Operation");

        // No demographic volume at all defaults high.
        raw.demographic.clear();
        let mature = digital_maturity(&raw);
        assert_eq!(mature.score, 2.0);
        assert_eq!(mature.classification, "Mature Usage");
        assert_eq!(
            mature.recommendation,
            "Strong biometric verification culture"
        );

        raw.demographic
            .push(demographic(date(2024, 1, 8), "682001", 3000, 3000));
        let fixing = digital_maturity(&raw);
        assert_eq!(fixing.score, 0.17);
        assert_eq!(fixing.classification, "Fixing Phase");
    }

    #[test]
    fn single_spike_day_stands_out() {
        let mut raw = empty_raw();
        for offset in 0..30 {
            raw.enrolment.push(enrolment(
                date(2024, 1, 1) + chrono::Days::new(offset),
                "KERALA",
                "ERNAKULAM",
                "682001",
                (30, 30, 40),
            ));
        }
        raw.enrolment.push(enrolment(
            date(2024, 2, 1),
            "KERALA",
            "ERNAKULAM",
            "682001",
            (4000, 3000, 3000),
        ));

        let spikes = synchronized_spikes(&raw);
        assert_eq!(spikes.len(), 1);
        assert_eq!(spikes[0].date, date(2024, 2, 1));
        assert_eq!(spikes[0].volume, 10_000);
        assert!(spikes[0].z_score > SPIKE_Z_THRESHOLD);
    }

    #[test]
    fn flat_volume_yields_no_spikes() {
        let mut raw = empty_raw();
        for offset in 0..10 {
            raw.enrolment.push(enrolment(
                date(2024, 1, 1) + chrono::Days::new(offset),
                "KERALA",
                "ERNAKULAM",
                "682001",
                (30, 30, 40),
            ));
        }
        assert!(synchronized_spikes(&raw).is_empty());
    }

    #[test]
    fn spikes_combine_all_three_kinds() {
        let mut raw = empty_raw();
        for offset in 0..30 {
            raw.enrolment.push(enrolment(
                date(2024, 1, 1) + chrono::Days::new(offset),
                "KERALA",
                "ERNAKULAM",
                "682001",
                (20, 20, 20),
            ));
            raw.biometric.push(biometric(
                date(2024, 1, 1) + chrono::Days::new(offset),
                "ERNAKULAM",
                "682001",
                20,
                20,
            ));
        }
        // The spike arrives through the demographic stream alone.
        raw.demographic
            .push(demographic(date(2024, 2, 15), "682001", 5000, 5000));

        let spikes = synchronized_spikes(&raw);
        assert_eq!(spikes.len(), 1);
        assert_eq!(spikes[0].date, date(2024, 2, 15));
        assert_eq!(spikes[0].volume, 10_000);
    }

    #[test]
    fn hotspot_verdict_tiers() {
        let district = |name: &str, mii: f64| DistrictInsight {
            state: "KERALA".to_string(),
            district: name.to_string(),
            pincode_count: 1,
            total_enrolment: 1000,
            total_biometric: 0,
            total_demographic: 0,
            avg_ovs: 0.0,
            avg_mii: mii,
            avg_dhr: 0.0,
            sml_cluster: MaturityLabel::Emerging,
            sml_description: String::new(),
            normalized_enrolment_rate: 0.0,
            normalized_update_rate: 0.0,
            normalized_adult_ratio: mii,
            volatile_camp_count: 0,
            migration_hotspot_count: 0,
            fraud_risk_count: 0,
        };
        let districts = vec![
            district("LOW", 0.30),
            district("DETECTED", 0.45),
            district("SETTLING", 0.55),
            district("INFLUX", 0.70),
        ];

        let hotspots = migration_hotspots(&districts, 0.40);
        assert_eq!(hotspots.len(), 3);
        assert_eq!(hotspots[0].district, "INFLUX");
        assert_eq!(hotspots[0].verdict, "Labor Influx");
        assert_eq!(hotspots[1].verdict, "Settlement Zone");
        assert_eq!(hotspots[2].verdict, "Migration Detected");
    }
}
