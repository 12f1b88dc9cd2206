// Enrolytics CLI - headless pipeline and insight operations

mod exit_codes;
mod seed;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use enrolytics_config::AnalyticsConfig;
use enrolytics_core::RecordKind;
use enrolytics_engine::GoldAggregator;
use enrolytics_ingest::Ingestor;
use enrolytics_insight::{InsightError, InsightService, Lookup, PillarService};
use enrolytics_store::SqliteStore;

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "enro")]
#[command(about = "Administrative-transaction analytics over a layered SQLite store")]
#[command(version)]
struct Cli {
    /// Config file (TOML). Built-in defaults apply when omitted.
    #[arg(long, global = true, env = "ENRO_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a CSV upload and append it to the bronze tier
    #[command(after_help = "\
The upload kind is detected from the header row; use --schema to force it.
Rejected rows are listed in the report and do not abort the batch.

Examples:
  enro ingest enrolment.csv
  enro ingest march_upload.csv --schema biometric")]
    Ingest {
        /// CSV file to ingest
        file: PathBuf,

        /// Force the upload kind instead of detecting it from headers
        #[arg(long, value_enum)]
        schema: Option<SchemaArg>,
    },

    /// Deduplicate bronze into the silver tier
    Transform {
        /// Only transform one kind (default: all three)
        #[arg(long, value_enum)]
        schema: Option<SchemaArg>,
    },

    /// Roll the raw tiers up into the gold insight tables
    Aggregate,

    /// Look up the insight row for one pincode
    Pincode {
        /// Six-digit pincode
        pincode: String,
    },

    /// Look up the insight row for one district
    District {
        /// District name (case-insensitive)
        district: String,

        /// Disambiguate districts that exist in several states
        #[arg(long)]
        state: Option<String>,
    },

    /// National rollup across every state and district
    Summary,

    /// Print one of the four intelligence pillars
    Pillar {
        #[arg(value_enum)]
        pillar: PillarArg,
    },

    /// Row counts and freshness for the raw tiers
    Stats,

    /// Write deterministic synthetic CSV fixtures
    #[command(after_help = "\
The same seed always produces byte-identical files. The first four pincodes
carry recognizable profiles: a one-day surge camp, an adult-heavy inflow,
an address-churn cluster and a weekend-loaded drive.

Examples:
  enro seed demo/
  enro seed demo/ --days 60 --pincodes 100 --seed 7")]
    Seed {
        /// Directory for the generated files
        dir: PathBuf,

        /// Days of data starting 2024-01-01
        #[arg(long, default_value_t = 30)]
        days: u32,

        /// Number of pincodes
        #[arg(long, default_value_t = 25)]
        pincodes: u32,

        /// RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaArg {
    Enrolment,
    Biometric,
    Demographic,
}

impl From<SchemaArg> for RecordKind {
    fn from(arg: SchemaArg) -> Self {
        match arg {
            SchemaArg::Enrolment => RecordKind::Enrolment,
            SchemaArg::Biometric => RecordKind::Biometric,
            SchemaArg::Demographic => RecordKind::Demographic,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PillarArg {
    Strategic,
    Growth,
    Operational,
    Vigilance,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return fail(e),
    };

    let result = match cli.command {
        Commands::Ingest { file, schema } => cmd_ingest(&config, &file, schema),
        Commands::Transform { schema } => cmd_transform(&config, schema),
        Commands::Aggregate => cmd_aggregate(&config),
        Commands::Pincode { pincode } => cmd_pincode(&config, &pincode),
        Commands::District { district, state } => {
            cmd_district(&config, &district, state.as_deref())
        }
        Commands::Summary => cmd_summary(&config),
        Commands::Pillar { pillar } => cmd_pillar(&config, pillar),
        Commands::Stats => cmd_stats(&config),
        Commands::Seed {
            dir,
            days,
            pincodes,
            seed,
        } => cmd_seed(&dir, days, pincodes, seed),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => fail(e),
    }
}

fn fail(e: CliError) -> ExitCode {
    if !e.message.is_empty() {
        eprintln!("error: {}", e.message);
    }
    if let Some(hint) = e.hint {
        eprintln!("hint:  {hint}");
    }
    ExitCode::from(e.code)
}

#[derive(Debug)]
struct CliError {
    code: u8,
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn usage(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_USAGE,
            message: msg.into(),
            hint: None,
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_ERROR,
            message: msg.into(),
            hint: None,
        }
    }

    /// Non-zero exit with nothing on stderr; the command already printed
    /// its report on stdout.
    fn silent() -> Self {
        Self {
            code: EXIT_ERROR,
            message: String::new(),
            hint: None,
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Shared plumbing
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig, CliError> {
    match path {
        Some(p) => AnalyticsConfig::from_file(p).map_err(|e| CliError::usage(e.to_string())),
        None => Ok(AnalyticsConfig::default()),
    }
}

fn open_store(config: &AnalyticsConfig) -> Result<SqliteStore, CliError> {
    let path = config.store.resolve_path();
    SqliteStore::open(&path).map_err(|e| CliError::error(e.to_string()))
}

fn storage_error(e: InsightError) -> CliError {
    CliError::error(e.to_string())
}

fn empty_store_error() -> CliError {
    CliError::error("no enrolment data ingested yet")
        .with_hint("run `enro ingest <file>` first")
}

/// All command output goes through here: exactly one pretty-printed JSON
/// value on stdout, nothing else.
fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap());
}

// ============================================================================
// ingest / transform / aggregate
// ============================================================================

fn cmd_ingest(
    config: &AnalyticsConfig,
    file: &Path,
    schema: Option<SchemaArg>,
) -> Result<(), CliError> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| CliError::usage(format!("cannot read {}: {e}", file.display())))?;

    let store = open_store(config)?;
    let ingestor = Ingestor::new(&store, config);
    let report = ingestor
        .ingest_csv(&content, schema.map(RecordKind::from))
        .map_err(|e| CliError::error(e.to_string()))?;

    print_json(&report);
    if report.success {
        Ok(())
    } else {
        Err(CliError::silent())
    }
}

fn cmd_transform(config: &AnalyticsConfig, schema: Option<SchemaArg>) -> Result<(), CliError> {
    let store = open_store(config)?;
    let ingestor = Ingestor::new(&store, config);

    let kinds: Vec<RecordKind> = match schema {
        Some(arg) => vec![arg.into()],
        None => RecordKind::ALL.to_vec(),
    };

    let mut promoted = BTreeMap::new();
    for kind in kinds {
        let rows = ingestor
            .transform_to_silver(kind)
            .map_err(|e| CliError::error(e.to_string()))?;
        promoted.insert(kind.table().to_string(), rows);
    }

    print_json(&promoted);
    Ok(())
}

fn cmd_aggregate(config: &AnalyticsConfig) -> Result<(), CliError> {
    let store = open_store(config)?;
    let report = GoldAggregator::new(&store, config)
        .run()
        .map_err(|e| CliError::error(e.to_string()))?;
    print_json(&report);
    Ok(())
}

// ============================================================================
// pincode / district / summary
// ============================================================================

fn cmd_pincode(config: &AnalyticsConfig, pincode: &str) -> Result<(), CliError> {
    if pincode.len() != 6 || !pincode.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CliError::usage("pincode must be exactly six digits"));
    }

    let store = open_store(config)?;
    let service = InsightService::new(&store, config);
    match service.pincode_insight(pincode).map_err(storage_error)? {
        Lookup::Found(insight) => {
            print_json(&insight);
            Ok(())
        }
        Lookup::NotFound => Err(CliError::error(format!("pincode '{pincode}' not found"))),
        Lookup::EmptyStore => Err(empty_store_error()),
    }
}

fn cmd_district(
    config: &AnalyticsConfig,
    district: &str,
    state: Option<&str>,
) -> Result<(), CliError> {
    let store = open_store(config)?;
    let service = InsightService::new(&store, config);
    match service.district_insight(district, state).map_err(storage_error)? {
        Lookup::Found(insight) => {
            print_json(&insight);
            Ok(())
        }
        Lookup::NotFound => {
            let message = match state {
                Some(s) => format!("district '{district}' not found in state '{s}'"),
                None => format!("district '{district}' not found"),
            };
            Err(CliError::error(message))
        }
        Lookup::EmptyStore => Err(empty_store_error()),
    }
}

fn cmd_summary(config: &AnalyticsConfig) -> Result<(), CliError> {
    let store = open_store(config)?;
    let service = InsightService::new(&store, config);
    let summary = service.national_summary().map_err(storage_error)?;
    print_json(&summary);
    Ok(())
}

// ============================================================================
// pillar / stats / seed
// ============================================================================

fn cmd_pillar(config: &AnalyticsConfig, pillar: PillarArg) -> Result<(), CliError> {
    let store = open_store(config)?;
    let service = PillarService::new(&store, config);
    match pillar {
        PillarArg::Strategic => print_json(&service.strategic().map_err(storage_error)?),
        PillarArg::Growth => print_json(&service.growth().map_err(storage_error)?),
        PillarArg::Operational => print_json(&service.operational().map_err(storage_error)?),
        PillarArg::Vigilance => print_json(&service.vigilance().map_err(storage_error)?),
    }
    Ok(())
}

fn cmd_stats(config: &AnalyticsConfig) -> Result<(), CliError> {
    let store = open_store(config)?;
    let ingestor = Ingestor::new(&store, config);
    let stats = ingestor
        .ingestion_stats()
        .map_err(|e| CliError::error(e.to_string()))?;
    print_json(&stats);
    Ok(())
}

fn cmd_seed(dir: &Path, days: u32, pincodes: u32, seed_value: u64) -> Result<(), CliError> {
    if days == 0 || days > 366 {
        return Err(CliError::usage("days must be between 1 and 366"));
    }
    if pincodes == 0 || pincodes > 999 {
        return Err(CliError::usage("pincodes must be between 1 and 999"));
    }

    let report = seed::write_fixtures(dir, days, pincodes, seed_value)
        .map_err(|e| CliError::error(format!("cannot write {}: {e}", dir.display())))?;
    print_json(&report);
    Ok(())
}
