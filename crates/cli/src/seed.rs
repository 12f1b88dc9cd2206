//! Deterministic synthetic CSV fixtures for demos and smoke tests.
//!
//! The first few pincodes carry recognizable operational profiles (a
//! one-day surge camp, an adult-heavy inflow, an address-churn cluster,
//! a weekend-loaded drive); the rest are unremarkable baseline traffic.
//! The same seed always produces byte-identical files.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

pub const FILE_NAMES: [&str; 3] = ["enrolment.csv", "biometric.csv", "demographic.csv"];

/// (state, district, pincode prefix) cycled over the generated pincodes.
const REGIONS: [(&str, &str, &str); 5] = [
    ("KERALA", "ERNAKULAM", "682"),
    ("DELHI", "CENTRAL", "110"),
    ("MAHARASHTRA", "PUNE", "411"),
    ("KARNATAKA", "BANGALORE", "560"),
    ("WEST BENGAL", "KOLKATA", "700"),
];

/// Generated CSV text for the three upload kinds, header row included.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixtures {
    pub enrolment: String,
    pub biometric: String,
    pub demographic: String,
}

#[derive(Debug, Serialize)]
pub struct SeedReport {
    pub directory: String,
    pub files: Vec<String>,
    pub days: u32,
    pub pincodes: u32,
    pub rows_per_file: usize,
}

/// Generate fixtures in memory. One row per (pincode, day) in every file,
/// dates starting at 2024-01-01.
pub fn fixtures(days: u32, pincodes: u32, seed: u64) -> Fixtures {
    let mut rng = StdRng::seed_from_u64(seed);
    let epoch = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    let mut enrolment =
        String::from("date,state,district,pincode,age_0_5,age_5_17,age_18_greater\n");
    let mut biometric = String::from("date,state,district,pincode,bio_age_5_17,bio_age_17_\n");
    let mut demographic = String::from("date,state,district,pincode,demo_age_5_17,demo_age_17_\n");

    for p in 0..pincodes {
        let (state, district, prefix) = REGIONS[(p as usize) % REGIONS.len()];
        let pincode = format!("{prefix}{p:03}");

        for d in 0..days {
            let date = epoch + Duration::days(i64::from(d));
            let (a0, a5, a18) = enrolment_bands(p, d, days, date, &mut rng);
            let (b5, b17) = biometric_bands(p, &mut rng);
            let (m5, m17) = demographic_bands(p, &mut rng);

            writeln!(enrolment, "{date},{state},{district},{pincode},{a0},{a5},{a18}").unwrap();
            writeln!(biometric, "{date},{state},{district},{pincode},{b5},{b17}").unwrap();
            writeln!(demographic, "{date},{state},{district},{pincode},{m5},{m17}").unwrap();
        }
    }

    Fixtures {
        enrolment,
        biometric,
        demographic,
    }
}

/// Write the three fixture files under `dir`, creating it if needed.
pub fn write_fixtures(dir: &Path, days: u32, pincodes: u32, seed: u64) -> io::Result<SeedReport> {
    let generated = fixtures(days, pincodes, seed);
    fs::create_dir_all(dir)?;
    fs::write(dir.join(FILE_NAMES[0]), &generated.enrolment)?;
    fs::write(dir.join(FILE_NAMES[1]), &generated.biometric)?;
    fs::write(dir.join(FILE_NAMES[2]), &generated.demographic)?;

    Ok(SeedReport {
        directory: dir.display().to_string(),
        files: FILE_NAMES.iter().map(|f| f.to_string()).collect(),
        days,
        pincodes,
        rows_per_file: days as usize * pincodes as usize,
    })
}

// ---------------------------------------------------------------------------
// Per-pincode profiles
// ---------------------------------------------------------------------------

fn enrolment_bands(
    p: u32,
    day: u32,
    days: u32,
    date: NaiveDate,
    rng: &mut StdRng,
) -> (i64, i64, i64) {
    match p {
        // Single surge day, otherwise silent.
        0 => {
            if day == days / 2 {
                (300, 300, 300)
            } else {
                (0, 0, 0)
            }
        }
        // Adult-heavy inflow every day.
        1 => (2, 8, 90),
        // Weekend-loaded enrolment drive, child-heavy.
        3 => {
            let v: i64 = if is_weekend(date) { 200 } else { 20 };
            (v * 2 / 5, v * 2 / 5, v / 5)
        }
        // Baseline traffic is child-dominated; fresh adult enrolment in a
        // mature register is rare.
        _ => (
            rng.gen_range(5..20),
            rng.gen_range(20..60),
            rng.gen_range(0..5),
        ),
    }
}

fn biometric_bands(p: u32, rng: &mut StdRng) -> (i64, i64) {
    match p {
        0 => (2, 2),
        // Low biometric paired with heavy demographic churn below.
        2 => (10, 5),
        _ => (rng.gen_range(5..30), rng.gen_range(5..30)),
    }
}

fn demographic_bands(p: u32, rng: &mut StdRng) -> (i64, i64) {
    match p {
        0 => (1, 1),
        2 => (20, 20),
        _ => (rng.gen_range(0..10), rng.gen_range(0..15)),
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
