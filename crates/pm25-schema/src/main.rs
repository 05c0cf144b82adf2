//! CLI entry point for the PM2.5 schema checker.

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use pm25_schema::logging::init_logging;
use pm25_schema::{
    CheckOutcome, CheckerConfig, Severity, TargetTransform, evaluate_predictions, load_dataset,
    pm25_feature_schema, run_check,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Exit code for a run that completed but found structural violations.
const EXIT_VALIDATION_FAILED: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Schema validation for engineered PM2.5 feature datasets",
    long_about = "Validates PM2.5 feature tables against a column schema, records the\n\
                  schema in a SQLite metadata store, and scores forecasts on the original scale.\n\n\
                  EXIT CODES:\n  \
                  0    success\n  \
                  1    runtime fault (missing file, bad schema, store error)\n  \
                  2    validation completed and failed\n\n\
                  EXAMPLES:\n  \
                  # Validate the default training table\n  \
                  pm25-schema check\n\n  \
                  # Validate a CSV without touching the metadata store\n  \
                  pm25-schema check -i train.csv --no-metadata\n\n  \
                  # Score Box-Cox forecasts\n  \
                  pm25-schema evaluate -p preds.csv --actual-column pm25 --predicted-column yhat --lambda 0.12"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Append log lines to this file
    #[arg(long, default_value = "check_output_data_schema_train.log", global = true)]
    log_file: PathBuf,

    /// Do not write a log file
    #[arg(long, global = true)]
    no_log_file: bool,

    /// Only show warnings and errors on stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a dataset against the schema
    Check(CheckArgs),
    /// Print or write the built-in schema as JSON
    Schema {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Inverse-transform predictions and compute RMSE
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Dataset to validate (.csv or .parquet)
    #[arg(short, long, default_value = pm25_schema::config::DEFAULT_DATASET_PATH)]
    input: PathBuf,

    /// Custom schema JSON (defaults to the built-in PM2.5 schema)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Where to write the schema JSON that the metadata record points at
    #[arg(long, default_value = pm25_schema::config::DEFAULT_SCHEMA_OUTPUT)]
    schema_out: PathBuf,

    /// SQLite metadata store
    #[arg(long, default_value = pm25_schema::config::DEFAULT_METADATA_DB)]
    metadata_db: PathBuf,

    /// Skip writing the schema artifact to the metadata store
    #[arg(long)]
    no_metadata: bool,

    /// Write a JSON validation report to this path
    #[arg(short = 'r', long)]
    emit_report: Option<PathBuf>,

    /// Print the validation report as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// File holding actual and predicted values (.csv or .parquet)
    #[arg(short, long)]
    predictions: PathBuf,

    /// Column with the untransformed target
    #[arg(long, default_value = "pm25")]
    actual_column: String,

    /// Column with predictions in the transformed space
    #[arg(long, default_value = "yhat")]
    predicted_column: String,

    /// Box-Cox lambda used upstream
    #[arg(long, conflicts_with = "log", required_unless_present = "log")]
    lambda: Option<f64>,

    /// Predictions are in log space
    #[arg(long)]
    log: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_file = (!cli.no_log_file).then_some(cli.log_file.as_path());
    let _guard = match init_logging(&cli.log_level, cli.quiet, log_file) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to open log file {}: {}", cli.log_file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Check(args) => run_check_command(args),
        Command::Schema { output } => run_schema_command(output).map(|()| ExitCode::SUCCESS),
        Command::Evaluate(args) => run_evaluate_command(args).map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_check_command(args: CheckArgs) -> Result<ExitCode> {
    let mut builder = CheckerConfig::builder()
        .dataset_path(&args.input)
        .schema_output_path(&args.schema_out)
        .metadata_db_path(&args.metadata_db)
        .record_metadata(!args.no_metadata);

    if let Some(ref schema) = args.schema {
        builder = builder.schema_path(schema);
    }
    if let Some(ref report) = args.emit_report {
        builder = builder.report_path(report);
    }

    let config = builder.build()?;
    let outcome = run_check(&config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_summary(&outcome, &config);
    }

    Ok(if outcome.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_VALIDATION_FAILED)
    })
}

/// Human-readable summary on stdout. Findings were already logged as they
/// were found; this is the end-of-run digest.
fn print_summary(outcome: &CheckOutcome, config: &CheckerConfig) {
    let report = &outcome.report;

    println!();
    println!("{}", "=".repeat(80));
    println!(
        "SCHEMA CHECK {}",
        if report.passed { "PASSED" } else { "FAILED" }
    );
    println!("{}", "=".repeat(80));
    println!("Input:    {} ({} rows)", config.dataset_path.display(), report.rows);
    println!(
        "Findings: {} error(s), {} warning(s)",
        report.error_count(),
        report.warning_count()
    );

    if !report.findings.is_empty() {
        println!();
        for finding in &report.findings {
            let marker = match finding.severity {
                Severity::Error => "x",
                Severity::Warning => "!",
            };
            println!("  {} {}", marker, finding.message);
        }
    }

    if let Some(ref record) = outcome.schema_record {
        println!();
        println!(
            "Schema artifact {} (type {}) -> {}",
            record.artifact_id, record.type_id, record.uri
        );
    }
    println!("{}", "=".repeat(80));
}

fn run_schema_command(output: Option<PathBuf>) -> Result<()> {
    let schema = pm25_feature_schema();
    match output {
        Some(path) => {
            schema.write_json(&path)?;
            info!("Schema written to {}", path.display());
        }
        None => println!("{}", schema.to_json_pretty()?),
    }
    Ok(())
}

fn run_evaluate_command(args: EvaluateArgs) -> Result<()> {
    let transform = match (args.lambda, args.log) {
        (_, true) => TargetTransform::Log,
        (Some(lambda), false) => TargetTransform::BoxCox { lambda },
        (None, false) => return Err(anyhow!("either --lambda or --log is required")),
    };

    let df = load_dataset(&args.predictions)?;
    let summary = evaluate_predictions(
        &df,
        &args.actual_column,
        &args.predicted_column,
        transform,
    )
    .with_context(|| format!("Failed to evaluate {}", args.predictions.display()))?;

    println!(
        "RMSE (original PM2.5 target): {} over {} of {} points",
        summary.rmse, summary.valid_points, summary.total_points
    );
    Ok(())
}
