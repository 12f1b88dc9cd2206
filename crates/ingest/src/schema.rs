use enrolytics_core::RecordKind;

use crate::error::IngestError;

/// Required header sets per upload kind. The trailing-underscore adult
/// columns are the raw dataset's own truncated names, kept verbatim so real
/// exports match without renaming.
pub const ENROLMENT_COLUMNS: [&str; 7] = [
    "date",
    "state",
    "district",
    "pincode",
    "age_0_5",
    "age_5_17",
    "age_18_greater",
];

pub const BIOMETRIC_COLUMNS: [&str; 6] = [
    "date",
    "state",
    "district",
    "pincode",
    "bio_age_5_17",
    "bio_age_17_",
];

pub const DEMOGRAPHIC_COLUMNS: [&str; 6] = [
    "date",
    "state",
    "district",
    "pincode",
    "demo_age_5_17",
    "demo_age_17_",
];

/// Detect the upload kind from its header row.
///
/// Headers are lower-cased and trimmed, then each kind's required set is
/// subset-matched; extra columns are ignored. The three sets are mutually
/// exclusive by their measure columns, so at most one kind can match.
pub fn detect<S: AsRef<str>>(headers: &[S]) -> Result<RecordKind, IngestError> {
    let normalized: Vec<String> = headers
        .iter()
        .map(|h| h.as_ref().trim().to_lowercase())
        .collect();

    let has_all = |required: &[&str]| {
        required
            .iter()
            .all(|col| normalized.iter().any(|h| h == col))
    };

    if has_all(&ENROLMENT_COLUMNS) {
        return Ok(RecordKind::Enrolment);
    }
    if has_all(&BIOMETRIC_COLUMNS) {
        return Ok(RecordKind::Biometric);
    }
    if has_all(&DEMOGRAPHIC_COLUMNS) {
        return Ok(RecordKind::Demographic);
    }

    Err(IngestError::SchemaDetection {
        headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_each_kind_from_exact_headers() {
        assert_eq!(
            detect(&ENROLMENT_COLUMNS).unwrap(),
            RecordKind::Enrolment
        );
        assert_eq!(
            detect(&BIOMETRIC_COLUMNS).unwrap(),
            RecordKind::Biometric
        );
        assert_eq!(
            detect(&DEMOGRAPHIC_COLUMNS).unwrap(),
            RecordKind::Demographic
        );
    }

    #[test]
    fn extra_columns_are_ignored() {
        let headers = [
            "date",
            "state",
            "district",
            "pincode",
            "age_0_5",
            "age_5_17",
            "age_18_greater",
            "registrar",
            "upload_batch",
        ];
        assert_eq!(detect(&headers).unwrap(), RecordKind::Enrolment);
    }

    #[test]
    fn matching_is_case_and_whitespace_insensitive() {
        let headers = [
            " Date ",
            "STATE",
            "District",
            "Pincode",
            "Age_0_5",
            "AGE_5_17",
            "age_18_greater",
        ];
        assert_eq!(detect(&headers).unwrap(), RecordKind::Enrolment);
    }

    #[test]
    fn unknown_headers_list_all_expected_sets() {
        let err = detect(&["foo", "bar"]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Cannot detect schema"));
        assert!(message.contains("age_18_greater"));
        assert!(message.contains("bio_age_17_"));
        assert!(message.contains("demo_age_17_"));
    }

    #[test]
    fn partial_header_set_does_not_match() {
        // Missing one measure column
        let headers = ["date", "state", "district", "pincode", "age_0_5", "age_5_17"];
        assert!(detect(&headers).is_err());
    }
}
