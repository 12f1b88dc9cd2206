use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Row, Statement};

use enrolytics_core::{
    BiometricRecord, DemographicRecord, DhrClassification, DistrictInsight, EnrolmentRecord,
    MaturityLabel, MiiClassification, OvsClassification, PincodeInsight, TemporalLoadProfile,
    TlpClassification,
};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Binds a row type to its SQLite shape.
///
/// The store qualifies `TABLE` with a tier prefix to form the physical table
/// name; implementations only describe columns and bindings. `from_row` reads
/// columns in `SELECT_COLUMNS` order.
pub trait TableRecord: Sized {
    /// Logical table name, namespaced by tier at the storage layer.
    const TABLE: &'static str;

    /// Column list for SELECT, in `from_row` index order.
    const SELECT_COLUMNS: &'static str;

    fn create_sql(qualified: &str) -> String;

    fn insert_sql(qualified: &str) -> String;

    /// Bind this row into the prepared insert statement and execute it.
    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

// ---------------------------------------------------------------------------
// Column helpers
// ---------------------------------------------------------------------------

fn date_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn label_col<T>(row: &Row<'_>, idx: usize, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    parse(&text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown classification label '{text}'").into(),
        )
    })
}

// ---------------------------------------------------------------------------
// Transaction records
// ---------------------------------------------------------------------------

impl TableRecord for EnrolmentRecord {
    const TABLE: &'static str = "enrolment";
    const SELECT_COLUMNS: &'static str =
        "date, state, district, pincode, age_0_5, age_5_17, age_18_greater";

    fn create_sql(qualified: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {qualified} (
    date TEXT NOT NULL,
    state TEXT NOT NULL,
    district TEXT NOT NULL,
    pincode TEXT NOT NULL,
    age_0_5 INTEGER NOT NULL,
    age_5_17 INTEGER NOT NULL,
    age_18_greater INTEGER NOT NULL
)"
        )
    }

    fn insert_sql(qualified: &str) -> String {
        format!(
            "INSERT INTO {qualified} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            Self::SELECT_COLUMNS
        )
    }

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.date.to_string(),
            self.state,
            self.district,
            self.pincode,
            self.age_0_5,
            self.age_5_17,
            self.age_18_greater,
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(EnrolmentRecord {
            date: date_col(row, 0)?,
            state: row.get(1)?,
            district: row.get(2)?,
            pincode: row.get(3)?,
            age_0_5: row.get(4)?,
            age_5_17: row.get(5)?,
            age_18_greater: row.get(6)?,
        })
    }
}

impl TableRecord for BiometricRecord {
    const TABLE: &'static str = "biometric";
    const SELECT_COLUMNS: &'static str =
        "date, state, district, pincode, bio_age_5_17, bio_age_17_plus";

    fn create_sql(qualified: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {qualified} (
    date TEXT NOT NULL,
    state TEXT NOT NULL,
    district TEXT NOT NULL,
    pincode TEXT NOT NULL,
    bio_age_5_17 INTEGER NOT NULL,
    bio_age_17_plus INTEGER NOT NULL
)"
        )
    }

    fn insert_sql(qualified: &str) -> String {
        format!(
            "INSERT INTO {qualified} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            Self::SELECT_COLUMNS
        )
    }

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.date.to_string(),
            self.state,
            self.district,
            self.pincode,
            self.bio_age_5_17,
            self.bio_age_17_plus,
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(BiometricRecord {
            date: date_col(row, 0)?,
            state: row.get(1)?,
            district: row.get(2)?,
            pincode: row.get(3)?,
            bio_age_5_17: row.get(4)?,
            bio_age_17_plus: row.get(5)?,
        })
    }
}

impl TableRecord for DemographicRecord {
    const TABLE: &'static str = "demographic";
    const SELECT_COLUMNS: &'static str =
        "date, state, district, pincode, demo_age_5_17, demo_age_17_plus";

    fn create_sql(qualified: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {qualified} (
    date TEXT NOT NULL,
    state TEXT NOT NULL,
    district TEXT NOT NULL,
    pincode TEXT NOT NULL,
    demo_age_5_17 INTEGER NOT NULL,
    demo_age_17_plus INTEGER NOT NULL
)"
        )
    }

    fn insert_sql(qualified: &str) -> String {
        format!(
            "INSERT INTO {qualified} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            Self::SELECT_COLUMNS
        )
    }

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.date.to_string(),
            self.state,
            self.district,
            self.pincode,
            self.demo_age_5_17,
            self.demo_age_17_plus,
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(DemographicRecord {
            date: date_col(row, 0)?,
            state: row.get(1)?,
            district: row.get(2)?,
            pincode: row.get(3)?,
            demo_age_5_17: row.get(4)?,
            demo_age_17_plus: row.get(5)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Gold rows
// ---------------------------------------------------------------------------

impl TableRecord for PincodeInsight {
    const TABLE: &'static str = "pincode_insights";
    const SELECT_COLUMNS: &'static str = "pincode, state, district, \
         total_enrolment, total_biometric, total_demographic, \
         ovs, ovs_classification, mii, mii_classification, dhr, dhr_classification, \
         tlp_monday, tlp_tuesday, tlp_wednesday, tlp_thursday, tlp_friday, \
         tlp_saturday, tlp_sunday, tlp_classification, tlp_recommendation, \
         is_volatile_camp, is_migration_hotspot, is_fraud_risk";

    fn create_sql(qualified: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {qualified} (
    pincode TEXT NOT NULL,
    state TEXT NOT NULL,
    district TEXT NOT NULL,
    total_enrolment INTEGER NOT NULL,
    total_biometric INTEGER NOT NULL,
    total_demographic INTEGER NOT NULL,
    ovs REAL NOT NULL,
    ovs_classification TEXT NOT NULL,
    mii REAL NOT NULL,
    mii_classification TEXT NOT NULL,
    dhr REAL NOT NULL,
    dhr_classification TEXT NOT NULL,
    tlp_monday REAL NOT NULL,
    tlp_tuesday REAL NOT NULL,
    tlp_wednesday REAL NOT NULL,
    tlp_thursday REAL NOT NULL,
    tlp_friday REAL NOT NULL,
    tlp_saturday REAL NOT NULL,
    tlp_sunday REAL NOT NULL,
    tlp_classification TEXT NOT NULL,
    tlp_recommendation TEXT NOT NULL,
    is_volatile_camp INTEGER NOT NULL,
    is_migration_hotspot INTEGER NOT NULL,
    is_fraud_risk INTEGER NOT NULL
)"
        )
    }

    fn insert_sql(qualified: &str) -> String {
        format!(
            "INSERT INTO {qualified} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, \
             ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)",
            Self::SELECT_COLUMNS
        )
    }

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.pincode,
            self.state,
            self.district,
            self.total_enrolment,
            self.total_biometric,
            self.total_demographic,
            self.ovs,
            self.ovs_classification.as_str(),
            self.mii,
            self.mii_classification.as_str(),
            self.dhr,
            self.dhr_classification.as_str(),
            self.tlp.monday,
            self.tlp.tuesday,
            self.tlp.wednesday,
            self.tlp.thursday,
            self.tlp.friday,
            self.tlp.saturday,
            self.tlp.sunday,
            self.tlp.classification.as_str(),
            self.tlp.recommendation,
            self.is_volatile_camp,
            self.is_migration_hotspot,
            self.is_fraud_risk,
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PincodeInsight {
            pincode: row.get(0)?,
            state: row.get(1)?,
            district: row.get(2)?,
            total_enrolment: row.get(3)?,
            total_biometric: row.get(4)?,
            total_demographic: row.get(5)?,
            ovs: row.get(6)?,
            ovs_classification: label_col(row, 7, OvsClassification::parse)?,
            mii: row.get(8)?,
            mii_classification: label_col(row, 9, MiiClassification::parse)?,
            dhr: row.get(10)?,
            dhr_classification: label_col(row, 11, DhrClassification::parse)?,
            tlp: TemporalLoadProfile {
                monday: row.get(12)?,
                tuesday: row.get(13)?,
                wednesday: row.get(14)?,
                thursday: row.get(15)?,
                friday: row.get(16)?,
                saturday: row.get(17)?,
                sunday: row.get(18)?,
                classification: label_col(row, 19, TlpClassification::parse)?,
                recommendation: row.get(20)?,
            },
            is_volatile_camp: row.get(21)?,
            is_migration_hotspot: row.get(22)?,
            is_fraud_risk: row.get(23)?,
        })
    }
}

impl TableRecord for DistrictInsight {
    const TABLE: &'static str = "district_insights";
    const SELECT_COLUMNS: &'static str = "state, district, pincode_count, \
         total_enrolment, total_biometric, total_demographic, \
         avg_ovs, avg_mii, avg_dhr, sml_cluster, sml_description, \
         normalized_enrolment_rate, normalized_update_rate, normalized_adult_ratio, \
         volatile_camp_count, migration_hotspot_count, fraud_risk_count";

    fn create_sql(qualified: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {qualified} (
    state TEXT NOT NULL,
    district TEXT NOT NULL,
    pincode_count INTEGER NOT NULL,
    total_enrolment INTEGER NOT NULL,
    total_biometric INTEGER NOT NULL,
    total_demographic INTEGER NOT NULL,
    avg_ovs REAL NOT NULL,
    avg_mii REAL NOT NULL,
    avg_dhr REAL NOT NULL,
    sml_cluster TEXT NOT NULL,
    sml_description TEXT NOT NULL,
    normalized_enrolment_rate REAL NOT NULL,
    normalized_update_rate REAL NOT NULL,
    normalized_adult_ratio REAL NOT NULL,
    volatile_camp_count INTEGER NOT NULL,
    migration_hotspot_count INTEGER NOT NULL,
    fraud_risk_count INTEGER NOT NULL
)"
        )
    }

    fn insert_sql(qualified: &str) -> String {
        format!(
            "INSERT INTO {qualified} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, \
             ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            Self::SELECT_COLUMNS
        )
    }

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.state,
            self.district,
            self.pincode_count,
            self.total_enrolment,
            self.total_biometric,
            self.total_demographic,
            self.avg_ovs,
            self.avg_mii,
            self.avg_dhr,
            self.sml_cluster.as_str(),
            self.sml_description,
            self.normalized_enrolment_rate,
            self.normalized_update_rate,
            self.normalized_adult_ratio,
            self.volatile_camp_count,
            self.migration_hotspot_count,
            self.fraud_risk_count,
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(DistrictInsight {
            state: row.get(0)?,
            district: row.get(1)?,
            pincode_count: row.get(2)?,
            total_enrolment: row.get(3)?,
            total_biometric: row.get(4)?,
            total_demographic: row.get(5)?,
            avg_ovs: row.get(6)?,
            avg_mii: row.get(7)?,
            avg_dhr: row.get(8)?,
            sml_cluster: label_col(row, 9, MaturityLabel::parse)?,
            sml_description: row.get(10)?,
            normalized_enrolment_rate: row.get(11)?,
            normalized_update_rate: row.get(12)?,
            normalized_adult_ratio: row.get(13)?,
            volatile_camp_count: row.get(14)?,
            migration_hotspot_count: row.get(15)?,
            fraud_risk_count: row.get(16)?,
        })
    }
}
