use chrono::NaiveDate;
use csv::StringRecord;
use serde::Serialize;

use enrolytics_core::{BiometricRecord, DemographicRecord, EnrolmentRecord};

use crate::date;
use crate::error::IngestError;

/// One rejected-cell record. Row numbers are 1-indexed with the header as
/// row 1, so the first data row is 2.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub row_number: usize,
    pub column: String,
    pub value: String,
    pub error: String,
}

/// Validation output for one upload batch.
#[derive(Debug)]
pub struct Validated<R> {
    pub records: Vec<R>,
    pub errors: Vec<RowError>,
    pub total_rows: usize,
}

// ---------------------------------------------------------------------------
// Per-kind entry points
// ---------------------------------------------------------------------------

pub fn enrolment(
    headers: &StringRecord,
    rows: &[StringRecord],
    max_errors: usize,
) -> Result<Validated<EnrolmentRecord>, IngestError> {
    validate_rows(
        headers,
        rows,
        &["age_0_5", "age_5_17", "age_18_greater"],
        max_errors,
        |common, measures| EnrolmentRecord {
            date: common.date,
            state: common.state,
            district: common.district,
            pincode: common.pincode,
            age_0_5: measures[0],
            age_5_17: measures[1],
            age_18_greater: measures[2],
        },
    )
}

pub fn biometric(
    headers: &StringRecord,
    rows: &[StringRecord],
    max_errors: usize,
) -> Result<Validated<BiometricRecord>, IngestError> {
    validate_rows(
        headers,
        rows,
        &["bio_age_5_17", "bio_age_17_"],
        max_errors,
        |common, measures| BiometricRecord {
            date: common.date,
            state: common.state,
            district: common.district,
            pincode: common.pincode,
            bio_age_5_17: measures[0],
            bio_age_17_plus: measures[1],
        },
    )
}

pub fn demographic(
    headers: &StringRecord,
    rows: &[StringRecord],
    max_errors: usize,
) -> Result<Validated<DemographicRecord>, IngestError> {
    validate_rows(
        headers,
        rows,
        &["demo_age_5_17", "demo_age_17_"],
        max_errors,
        |common, measures| DemographicRecord {
            date: common.date,
            state: common.state,
            district: common.district,
            pincode: common.pincode,
            demo_age_5_17: measures[0],
            demo_age_17_plus: measures[1],
        },
    )
}

// ---------------------------------------------------------------------------
// Shared row walk
// ---------------------------------------------------------------------------

struct Common {
    date: NaiveDate,
    state: String,
    district: String,
    pincode: String,
}

struct Columns {
    date: usize,
    state: usize,
    district: usize,
    pincode: usize,
    measures: Vec<usize>,
}

fn locate(headers: &StringRecord, measure_names: &[&'static str]) -> Result<Columns, IngestError> {
    let find = |name: &str| -> Result<usize, IngestError> {
        headers
            .iter()
            .position(|h| h.trim().to_lowercase() == name)
            .ok_or_else(|| IngestError::MissingColumn {
                column: name.to_string(),
            })
    };

    let mut measures = Vec::with_capacity(measure_names.len());
    for name in measure_names {
        measures.push(find(name)?);
    }
    Ok(Columns {
        date: find("date")?,
        state: find("state")?,
        district: find("district")?,
        pincode: find("pincode")?,
        measures,
    })
}

/// Left-zero-pad a pincode to six digits. Values that are not pure ASCII
/// digits of at most six characters are rejected, never coerced.
pub fn normalize_pincode(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > 6 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{trimmed:0>6}"))
}

fn validate_rows<R>(
    headers: &StringRecord,
    rows: &[StringRecord],
    measure_names: &[&'static str],
    max_errors: usize,
    build: impl Fn(Common, &[i64]) -> R,
) -> Result<Validated<R>, IngestError> {
    let columns = locate(headers, measure_names)?;

    let mut records = Vec::new();
    let mut errors: Vec<RowError> = Vec::new();
    let mut push_error = |errors: &mut Vec<RowError>, row_number: usize, column: &str, value: &str, error: String| {
        if errors.len() < max_errors {
            errors.push(RowError {
                row_number,
                column: column.to_string(),
                value: value.to_string(),
                error,
            });
        }
    };

    for (i, row) in rows.iter().enumerate() {
        let row_number = i + 2;
        let mut keep = true;

        let raw_date = row.get(columns.date).unwrap_or("");
        let parsed_date = match date::normalize(raw_date) {
            Ok(d) => Some(d),
            Err(e) => {
                push_error(&mut errors, row_number, "date", raw_date, e.to_string());
                keep = false;
                None
            }
        };

        let raw_pincode = row.get(columns.pincode).unwrap_or("");
        let pincode = match normalize_pincode(raw_pincode) {
            Some(p) => Some(p),
            None => {
                push_error(
                    &mut errors,
                    row_number,
                    "pincode",
                    raw_pincode,
                    "Invalid pincode".to_string(),
                );
                keep = false;
                None
            }
        };

        let mut measures = Vec::with_capacity(columns.measures.len());
        for (j, &idx) in columns.measures.iter().enumerate() {
            let raw = row.get(idx).unwrap_or("").trim();
            match raw.parse::<i64>() {
                Ok(v) if v < 0 => {
                    push_error(
                        &mut errors,
                        row_number,
                        measure_names[j],
                        raw,
                        "Negative value not allowed".to_string(),
                    );
                    keep = false;
                }
                Ok(v) => measures.push(v),
                Err(_) => {
                    push_error(
                        &mut errors,
                        row_number,
                        measure_names[j],
                        raw,
                        "Invalid numeric value".to_string(),
                    );
                    keep = false;
                }
            }
        }

        if !keep {
            continue;
        }
        let (Some(date), Some(pincode)) = (parsed_date, pincode) else {
            continue;
        };

        let state = row.get(columns.state).unwrap_or("").trim().to_uppercase();
        let district = row.get(columns.district).unwrap_or("").trim().to_uppercase();
        records.push(build(
            Common {
                date,
                state,
                district,
                pincode,
            },
            &measures,
        ));
    }

    Ok(Validated {
        records,
        errors,
        total_rows: rows.len(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> (StringRecord, Vec<StringRecord>) {
        let mut reader = csv::ReaderBuilder::new().from_reader(content.as_bytes());
        let headers = reader.headers().unwrap().clone();
        let rows: Vec<StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        (headers, rows)
    }

    const HEADER: &str = "date,state,district,pincode,age_0_5,age_5_17,age_18_greater\n";

    #[test]
    fn valid_rows_are_normalized() {
        let (headers, rows) = parse(&format!(
            "{HEADER}2024-01-15, kerala ,Ernakulam,1234,10,20,30\n"
        ));
        let out = enrolment(&headers, &rows, 100).unwrap();
        assert_eq!(out.total_rows, 1);
        assert!(out.errors.is_empty());
        assert_eq!(out.records.len(), 1);
        let rec = &out.records[0];
        assert_eq!(rec.state, "KERALA");
        assert_eq!(rec.district, "ERNAKULAM");
        assert_eq!(rec.pincode, "001234");
        assert_eq!(rec.age_18_greater, 30);
    }

    #[test]
    fn negative_value_rejects_row_and_names_column() {
        let (headers, rows) = parse(&format!(
            "{HEADER}2024-01-15,KL,ERNAKULAM,682001,10,20,30\n2024-01-16,KL,ERNAKULAM,682001,-5,20,30\n"
        ));
        let out = enrolment(&headers, &rows, 100).unwrap();
        assert_eq!(out.total_rows, 2);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.errors.len(), 1);
        let err = &out.errors[0];
        assert_eq!(err.row_number, 3);
        assert_eq!(err.column, "age_0_5");
        assert_eq!(err.value, "-5");
        assert_eq!(err.error, "Negative value not allowed");
    }

    #[test]
    fn bad_date_rejects_row_without_aborting_batch() {
        let (headers, rows) = parse(&format!(
            "{HEADER}garbage,KL,ERNAKULAM,682001,10,20,30\n2024-01-16,KL,ERNAKULAM,682001,1,2,3\n"
        ));
        let out = enrolment(&headers, &rows, 100).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].row_number, 2);
        assert_eq!(out.errors[0].column, "date");
        assert!(out.errors[0].error.contains("Cannot parse date"));
    }

    #[test]
    fn unparseable_numeric_rejects_row() {
        let (headers, rows) = parse(&format!(
            "{HEADER}2024-01-15,KL,ERNAKULAM,682001,ten,20,30\n"
        ));
        let out = enrolment(&headers, &rows, 100).unwrap();
        assert!(out.records.is_empty());
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].column, "age_0_5");
        assert_eq!(out.errors[0].error, "Invalid numeric value");
    }

    #[test]
    fn one_row_can_carry_several_errors() {
        let (headers, rows) = parse(&format!(
            "{HEADER}garbage,KL,ERNAKULAM,682001,-1,20,30\n"
        ));
        let out = enrolment(&headers, &rows, 100).unwrap();
        assert!(out.records.is_empty());
        assert_eq!(out.errors.len(), 2);
        assert_eq!(out.total_rows, 1);
    }

    #[test]
    fn error_list_is_capped_but_rejection_count_stays_exact() {
        let mut content = HEADER.to_string();
        for day in 1..=10 {
            content.push_str(&format!("2024-01-{day:02},KL,ERNAKULAM,682001,-1,2,3\n"));
        }
        let (headers, rows) = parse(&content);
        let out = enrolment(&headers, &rows, 5).unwrap();
        assert_eq!(out.errors.len(), 5);
        assert_eq!(out.total_rows, 10);
        assert!(out.records.is_empty());
        assert_eq!(out.total_rows - out.records.len(), 10);
    }

    #[test]
    fn oversized_or_non_numeric_pincode_is_rejected() {
        let (headers, rows) = parse(&format!(
            "{HEADER}2024-01-15,KL,ERNAKULAM,1234567,1,2,3\n2024-01-15,KL,ERNAKULAM,68a001,1,2,3\n"
        ));
        let out = enrolment(&headers, &rows, 100).unwrap();
        assert!(out.records.is_empty());
        assert_eq!(out.errors.len(), 2);
        assert!(out.errors.iter().all(|e| e.column == "pincode"));
    }

    #[test]
    fn forced_schema_with_missing_column_is_an_error() {
        let (headers, rows) = parse("date,state,district\n2024-01-15,KL,ERNAKULAM\n");
        let err = enrolment(&headers, &rows, 100).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { .. }));
    }

    #[test]
    fn pincode_normalization_pads_to_six() {
        assert_eq!(normalize_pincode("1234").as_deref(), Some("001234"));
        assert_eq!(normalize_pincode("001234").as_deref(), Some("001234"));
        assert_eq!(normalize_pincode(" 682001 ").as_deref(), Some("682001"));
        assert_eq!(normalize_pincode(""), None);
        assert_eq!(normalize_pincode("1234567"), None);
        assert_eq!(normalize_pincode("12a4"), None);
    }
}
