use serde::Serialize;

// ---------------------------------------------------------------------------
// Classification labels
// ---------------------------------------------------------------------------

/// Operational Volatility Score classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OvsClassification {
    #[serde(rename = "Temporary Camp")]
    TemporaryCamp,
    #[serde(rename = "Permanent Center")]
    PermanentCenter,
    #[serde(rename = "Normal Activity")]
    NormalActivity,
}

impl OvsClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TemporaryCamp => "Temporary Camp",
            Self::PermanentCenter => "Permanent Center",
            Self::NormalActivity => "Normal Activity",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Temporary Camp" => Some(Self::TemporaryCamp),
            "Permanent Center" => Some(Self::PermanentCenter),
            "Normal Activity" => Some(Self::NormalActivity),
            _ => None,
        }
    }
}

/// Migration Impact Index classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MiiClassification {
    #[serde(rename = "Migration Hotspot")]
    MigrationHotspot,
    #[serde(rename = "Birth-Rate Driven")]
    BirthRateDriven,
    #[serde(rename = "Mixed Population")]
    MixedPopulation,
}

impl MiiClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MigrationHotspot => "Migration Hotspot",
            Self::BirthRateDriven => "Birth-Rate Driven",
            Self::MixedPopulation => "Mixed Population",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Migration Hotspot" => Some(Self::MigrationHotspot),
            "Birth-Rate Driven" => Some(Self::BirthRateDriven),
            "Mixed Population" => Some(Self::MixedPopulation),
            _ => None,
        }
    }
}

/// Data Hygiene Ratio classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DhrClassification {
    #[serde(rename = "High Fraud Risk")]
    HighFraudRisk,
    #[serde(rename = "Normal Maintenance")]
    NormalMaintenance,
    #[serde(rename = "Over-Verified")]
    OverVerified,
}

impl DhrClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighFraudRisk => "High Fraud Risk",
            Self::NormalMaintenance => "Normal Maintenance",
            Self::OverVerified => "Over-Verified",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "High Fraud Risk" => Some(Self::HighFraudRisk),
            "Normal Maintenance" => Some(Self::NormalMaintenance),
            "Over-Verified" => Some(Self::OverVerified),
            _ => None,
        }
    }
}

/// Temporal Load Profile classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TlpClassification {
    #[serde(rename = "Weekend Warrior Zone")]
    WeekendWarrior,
    #[serde(rename = "School Drive Zone")]
    SchoolDrive,
    #[serde(rename = "Balanced Load")]
    BalancedLoad,
}

impl TlpClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WeekendWarrior => "Weekend Warrior Zone",
            Self::SchoolDrive => "School Drive Zone",
            Self::BalancedLoad => "Balanced Load",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Weekend Warrior Zone" => Some(Self::WeekendWarrior),
            "School Drive Zone" => Some(Self::SchoolDrive),
            "Balanced Load" => Some(Self::BalancedLoad),
            _ => None,
        }
    }
}

/// Saturation Maturity Level assigned per district by the clustering step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MaturityLabel {
    #[serde(rename = "Emerging")]
    Emerging,
    #[serde(rename = "Mature")]
    Mature,
    #[serde(rename = "High Churn")]
    HighChurn,
}

impl MaturityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emerging => "Emerging",
            Self::Mature => "Mature",
            Self::HighChurn => "High Churn",
        }
    }

    /// Fixed interpretation string shipped alongside the label.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Emerging => "High new enrolment activity, expanding coverage",
            Self::Mature => "Mature region with primarily update activity",
            Self::HighChurn => "Significant demographic changes, requires monitoring",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Emerging" => Some(Self::Emerging),
            "Mature" => Some(Self::Mature),
            "High Churn" => Some(Self::HighChurn),
            _ => None,
        }
    }
}

macro_rules! impl_label_display {
    ($($ty:ty),+ $(,)?) => {
        $(impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        })+
    };
}

impl_label_display!(
    OvsClassification,
    MiiClassification,
    DhrClassification,
    TlpClassification,
    MaturityLabel,
);

// ---------------------------------------------------------------------------
// Temporal load profile
// ---------------------------------------------------------------------------

/// Weekday distribution of transaction volume for one pincode.
///
/// Fractions sum to 1.0 for non-empty input; an empty series yields all
/// zeroes with the insufficient-data recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalLoadProfile {
    pub monday: f64,
    pub tuesday: f64,
    pub wednesday: f64,
    pub thursday: f64,
    pub friday: f64,
    pub saturday: f64,
    pub sunday: f64,
    pub classification: TlpClassification,
    pub recommendation: String,
}

impl TemporalLoadProfile {
    /// Fractions in Monday..Sunday order.
    pub fn fractions(&self) -> [f64; 7] {
        [
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ]
    }
}

// ---------------------------------------------------------------------------
// Insight rows
// ---------------------------------------------------------------------------

/// Aggregated operational picture of one pincode. Gold-tier row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PincodeInsight {
    pub pincode: String,
    pub state: String,
    pub district: String,
    pub total_enrolment: i64,
    pub total_biometric: i64,
    pub total_demographic: i64,
    pub ovs: f64,
    pub ovs_classification: OvsClassification,
    pub mii: f64,
    pub mii_classification: MiiClassification,
    pub dhr: f64,
    pub dhr_classification: DhrClassification,
    pub tlp: TemporalLoadProfile,
    pub is_volatile_camp: bool,
    pub is_migration_hotspot: bool,
    pub is_fraud_risk: bool,
}

/// Aggregated picture of one (state, district). Gold-tier row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictInsight {
    pub state: String,
    pub district: String,
    pub pincode_count: i64,
    pub total_enrolment: i64,
    pub total_biometric: i64,
    pub total_demographic: i64,
    pub avg_ovs: f64,
    pub avg_mii: f64,
    pub avg_dhr: f64,
    pub sml_cluster: MaturityLabel,
    pub sml_description: String,
    pub normalized_enrolment_rate: f64,
    pub normalized_update_rate: f64,
    pub normalized_adult_ratio: f64,
    pub volatile_camp_count: i64,
    pub migration_hotspot_count: i64,
    pub fraud_risk_count: i64,
}

/// Nation-wide rollup. Computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NationalSummary {
    pub total_states: i64,
    pub total_districts: i64,
    pub total_pincodes: i64,
    pub total_enrolment: i64,
    pub total_biometric: i64,
    pub total_demographic: i64,
    pub avg_saturation_rate: f64,
    pub emerging_districts: i64,
    pub saturated_districts: i64,
    pub high_churn_districts: i64,
    pub volatile_camp_count: i64,
    pub migration_hotspot_count: i64,
    pub high_fraud_risk_count: i64,
    pub top_volatile_pincodes: Vec<String>,
    pub top_migration_districts: Vec<String>,
    pub top_fraud_risk_districts: Vec<String>,
}

impl NationalSummary {
    /// All-zero summary for an empty store.
    pub fn empty() -> Self {
        NationalSummary {
            total_states: 0,
            total_districts: 0,
            total_pincodes: 0,
            total_enrolment: 0,
            total_biometric: 0,
            total_demographic: 0,
            avg_saturation_rate: 0.0,
            emerging_districts: 0,
            saturated_districts: 0,
            high_churn_districts: 0,
            volatile_camp_count: 0,
            migration_hotspot_count: 0,
            high_fraud_risk_count: 0,
            top_volatile_pincodes: Vec::new(),
            top_migration_districts: Vec::new(),
            top_fraud_risk_districts: Vec::new(),
        }
    }
}
