use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use csv::StringRecord;
use serde::Serialize;

use enrolytics_config::AnalyticsConfig;
use enrolytics_core::{
    BiometricRecord, DemographicRecord, EnrolmentRecord, RecordKind, Tier, TransactionRecord,
};
use enrolytics_store::{LayeredStore, TableRecord, WriteMode};

use crate::error::IngestError;
use crate::schema;
use crate::validate::{self, RowError, Validated};

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Outcome of one upload. Upload-shaped problems (empty file, unknown
/// schema, rejected rows) are reported here, not as errors.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub success: bool,
    #[serde(rename = "schema_type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<RecordKind>,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub rejected_rows: usize,
    pub validation_errors: Vec<RowError>,
    pub message: String,
}

impl IngestReport {
    fn failure(message: String) -> Self {
        IngestReport {
            success: false,
            kind: None,
            total_rows: 0,
            valid_rows: 0,
            rejected_rows: 0,
            validation_errors: Vec::new(),
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStats {
    pub exists: bool,
    pub row_count: i64,
    pub last_modified: Option<String>,
}

/// Per-tier, per-table row counts for the raw tiers.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionStats {
    pub bronze: BTreeMap<String, TableStats>,
    pub silver: BTreeMap<String, TableStats>,
}

// ---------------------------------------------------------------------------
// Ingestor
// ---------------------------------------------------------------------------

pub struct Ingestor<'a, S: LayeredStore> {
    store: &'a S,
    config: &'a AnalyticsConfig,
}

impl<'a, S: LayeredStore> Ingestor<'a, S> {
    pub fn new(store: &'a S, config: &'a AnalyticsConfig) -> Self {
        Ingestor { store, config }
    }

    /// Validate a CSV upload and append the surviving rows to bronze.
    ///
    /// Only storage failures return `Err`; everything upload-shaped comes
    /// back as a failure report.
    pub fn ingest_csv(
        &self,
        content: &str,
        forced_kind: Option<RecordKind>,
    ) -> Result<IngestReport, IngestError> {
        let (headers, rows) = match read_csv(content) {
            Ok(parsed) => parsed,
            Err(e) => return Ok(IngestReport::failure(format!("Ingestion failed: {e}"))),
        };

        let total_rows = rows.len();
        if total_rows == 0 {
            return Ok(IngestReport {
                success: false,
                kind: None,
                total_rows: 0,
                valid_rows: 0,
                rejected_rows: 0,
                validation_errors: Vec::new(),
                message: "Empty file uploaded".to_string(),
            });
        }

        let kind = match forced_kind {
            Some(kind) => kind,
            None => {
                let header_vec: Vec<&str> = headers.iter().collect();
                match schema::detect(&header_vec) {
                    Ok(kind) => kind,
                    Err(e) => {
                        return Ok(IngestReport {
                            success: false,
                            kind: None,
                            total_rows,
                            valid_rows: 0,
                            rejected_rows: total_rows,
                            validation_errors: vec![RowError {
                                row_number: 1,
                                column: "header".to_string(),
                                value: header_vec.join(","),
                                error: e.to_string(),
                            }],
                            message: format!("Schema detection failed: {e}"),
                        });
                    }
                }
            }
        };

        let max_errors = self.config.ingestion.max_row_errors;
        match kind {
            RecordKind::Enrolment => {
                self.finish(kind, validate::enrolment(&headers, &rows, max_errors))
            }
            RecordKind::Biometric => {
                self.finish(kind, validate::biometric(&headers, &rows, max_errors))
            }
            RecordKind::Demographic => {
                self.finish(kind, validate::demographic(&headers, &rows, max_errors))
            }
        }
    }

    fn finish<R: TableRecord>(
        &self,
        kind: RecordKind,
        validated: Result<Validated<R>, IngestError>,
    ) -> Result<IngestReport, IngestError> {
        let validated = match validated {
            Ok(v) => v,
            Err(IngestError::Storage(e)) => return Err(IngestError::Storage(e)),
            Err(e) => return Ok(IngestReport::failure(format!("Ingestion failed: {e}"))),
        };

        let valid_rows = validated.records.len();
        let rejected_rows = validated.total_rows - valid_rows;

        if valid_rows == 0 {
            return Ok(IngestReport {
                success: false,
                kind: Some(kind),
                total_rows: validated.total_rows,
                valid_rows: 0,
                rejected_rows,
                validation_errors: validated.errors,
                message: "All rows failed validation".to_string(),
            });
        }

        self.store
            .write(Tier::Bronze, &validated.records, WriteMode::Append)?;

        Ok(IngestReport {
            success: true,
            kind: Some(kind),
            total_rows: validated.total_rows,
            valid_rows,
            rejected_rows,
            validation_errors: validated.errors,
            message: format!(
                "Successfully ingested {valid_rows} rows to Bronze/{}",
                kind.table()
            ),
        })
    }

    /// Deduplicate bronze into silver for one kind. Returns the silver row
    /// count, 0 when bronze is empty (nothing written).
    pub fn transform_to_silver(&self, kind: RecordKind) -> Result<usize, IngestError> {
        match kind {
            RecordKind::Enrolment => self.transform_kind::<EnrolmentRecord>(),
            RecordKind::Biometric => self.transform_kind::<BiometricRecord>(),
            RecordKind::Demographic => self.transform_kind::<DemographicRecord>(),
        }
    }

    fn transform_kind<R>(&self) -> Result<usize, IngestError>
    where
        R: TableRecord + TransactionRecord + Clone,
    {
        let bronze: Vec<R> = self.store.read(Tier::Bronze)?;
        if bronze.is_empty() {
            return Ok(0);
        }
        let silver = dedup_keep_last(bronze);
        let written = self
            .store
            .write(Tier::Silver, &silver, WriteMode::Overwrite)?;
        Ok(written)
    }

    pub fn ingestion_stats(&self) -> Result<IngestionStats, IngestError> {
        let mut stats = IngestionStats {
            bronze: BTreeMap::new(),
            silver: BTreeMap::new(),
        };
        for kind in RecordKind::ALL {
            for tier in [Tier::Bronze, Tier::Silver] {
                let meta = self.store.metadata(tier, kind.table())?;
                let table_stats = TableStats {
                    exists: meta.exists,
                    row_count: meta.row_count,
                    last_modified: meta.last_modified,
                };
                match tier {
                    Tier::Bronze => stats.bronze.insert(kind.table().to_string(), table_stats),
                    _ => stats.silver.insert(kind.table().to_string(), table_stats),
                };
            }
        }
        Ok(stats)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_csv(content: &str) -> Result<(StringRecord, Vec<StringRecord>), IngestError> {
    let mut reader = csv::ReaderBuilder::new().from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| IngestError::Csv(e.to_string()))?
        .clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record.map_err(|e| IngestError::Csv(e.to_string()))?);
    }
    Ok((headers, rows))
}

/// Keep the last occurrence per (date, pincode, district), then order by
/// (date, state, district, pincode). Bronze reads preserve append order, so
/// "last" is the most recent upload of the duplicate.
fn dedup_keep_last<R: TransactionRecord + Clone>(rows: Vec<R>) -> Vec<R> {
    let mut last: HashMap<(NaiveDate, String, String), usize> = HashMap::new();
    for (i, row) in rows.iter().enumerate() {
        last.insert(
            (row.date(), row.pincode().to_string(), row.district().to_string()),
            i,
        );
    }

    let mut keep: Vec<usize> = last.into_values().collect();
    keep.sort_unstable();

    let mut out: Vec<R> = keep.into_iter().map(|i| rows[i].clone()).collect();
    out.sort_by(|a, b| {
        (a.date(), a.state(), a.district(), a.pincode())
            .cmp(&(b.date(), b.state(), b.district(), b.pincode()))
    });
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
