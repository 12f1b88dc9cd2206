use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

/// Storage tier of the medallion pipeline.
///
/// Bronze holds raw validated uploads (append-only), silver holds the
/// deduplicated view, gold holds aggregated insight rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Bronze => "bronze",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Record kinds
// ---------------------------------------------------------------------------

/// The three upload schemas the ingestion layer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Enrolment,
    Biometric,
    Demographic,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [
        RecordKind::Enrolment,
        RecordKind::Biometric,
        RecordKind::Demographic,
    ];

    /// Table name within a tier. One table per kind.
    pub fn table(&self) -> &'static str {
        match self {
            RecordKind::Enrolment => "enrolment",
            RecordKind::Biometric => "biometric",
            RecordKind::Demographic => "demographic",
        }
    }

    pub fn parse(s: &str) -> Option<RecordKind> {
        match s.trim().to_lowercase().as_str() {
            "enrolment" => Some(RecordKind::Enrolment),
            "biometric" => Some(RecordKind::Biometric),
            "demographic" => Some(RecordKind::Demographic),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

// ---------------------------------------------------------------------------
// Transaction records
// ---------------------------------------------------------------------------

/// Common geography/date accessors shared by the three record kinds.
///
/// Deduplication, sorting and per-pincode grouping are generic over this
/// trait instead of being written three times.
pub trait TransactionRecord {
    fn date(&self) -> NaiveDate;
    fn state(&self) -> &str;
    fn district(&self) -> &str;
    fn pincode(&self) -> &str;
    /// Sum of this row's measure columns.
    fn volume(&self) -> i64;
}

/// One validated row of a new-enrolment upload.
///
/// Invariants: `state`/`district` upper-cased and trimmed, `pincode` exactly
/// six ASCII digits, all age-band measures non-negative. Rows violating any
/// of these never reach storage.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrolmentRecord {
    pub date: NaiveDate,
    pub state: String,
    pub district: String,
    pub pincode: String,
    pub age_0_5: i64,
    pub age_5_17: i64,
    pub age_18_greater: i64,
}

/// One validated row of a biometric-update upload.
#[derive(Debug, Clone, PartialEq)]
pub struct BiometricRecord {
    pub date: NaiveDate,
    pub state: String,
    pub district: String,
    pub pincode: String,
    pub bio_age_5_17: i64,
    pub bio_age_17_plus: i64,
}

/// One validated row of a demographic-update upload.
#[derive(Debug, Clone, PartialEq)]
pub struct DemographicRecord {
    pub date: NaiveDate,
    pub state: String,
    pub district: String,
    pub pincode: String,
    pub demo_age_5_17: i64,
    pub demo_age_17_plus: i64,
}

impl TransactionRecord for EnrolmentRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn state(&self) -> &str {
        &self.state
    }
    fn district(&self) -> &str {
        &self.district
    }
    fn pincode(&self) -> &str {
        &self.pincode
    }
    fn volume(&self) -> i64 {
        self.age_0_5 + self.age_5_17 + self.age_18_greater
    }
}

impl TransactionRecord for BiometricRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn state(&self) -> &str {
        &self.state
    }
    fn district(&self) -> &str {
        &self.district
    }
    fn pincode(&self) -> &str {
        &self.pincode
    }
    fn volume(&self) -> i64 {
        self.bio_age_5_17 + self.bio_age_17_plus
    }
}

impl TransactionRecord for DemographicRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn state(&self) -> &str {
        &self.state
    }
    fn district(&self) -> &str {
        &self.district
    }
    fn pincode(&self) -> &str {
        &self.pincode
    }
    fn volume(&self) -> i64 {
        self.demo_age_5_17 + self.demo_age_17_plus
    }
}
