use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use genuine_tables::{
    Classification, ExtractOptions, ExtractionReport, MergedFill, OrientationSet, ShapeRules,
    TableOutcome, TableSelection, classify_html, extract_html_to_csv, read_html,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "html2csv",
    version,
    about = "Export the genuine data tables of an HTML page to CSV"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify tables and write the genuine ones as merged CSV output.
    Extract(ExtractArgs),
    /// Print the header orientation of every table.
    Classify(ClassifyArgs),
}

#[derive(Debug, Args)]
struct SelectionArgs {
    /// Input HTML path.
    #[arg(short, long)]
    input: PathBuf,

    /// Table selection like 1-3,5 (1-based, document order).
    #[arg(long)]
    tables: Option<String>,

    /// Header orientations to try, like top,left.
    #[arg(long, default_value = "top,left,right,bottom")]
    orientations: String,

    /// Wrapper tags ignored when comparing cell markup.
    #[arg(long, default_value = "span")]
    transparent_tags: String,

    /// Input encoding label; sniffed from the page when omitted.
    #[arg(long)]
    encoding: Option<String>,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Output CSV path.
    #[arg(short, long)]
    output: PathBuf,

    /// Output delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Merged cell rendering: anchor or repeat.
    #[arg(long, default_value = "anchor")]
    fill: String,

    /// Drop table_id column from output CSV.
    #[arg(long = "notable")]
    no_table: bool,

    /// Drop orientation column from output CSV.
    #[arg(long = "noorientation")]
    no_orientation: bool,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct ClassifyArgs {
    #[command(flatten)]
    selection: SelectionArgs,
}

fn parse_selection(args: &SelectionArgs) -> Result<ExtractOptions> {
    let tables = args
        .tables
        .as_deref()
        .map(TableSelection::from_str)
        .transpose()
        .map_err(|error| anyhow!("invalid table selection: {error}"))
        .context("failed to parse --tables")?;

    let orientations = OrientationSet::from_str(&args.orientations)
        .map_err(|error| anyhow!("invalid orientation set: {error}"))
        .context("failed to parse --orientations")?;

    let shape_rules = match ShapeRules::from_str(&args.transparent_tags) {
        Ok(rules) => rules,
        Err(never) => match never {},
    };

    Ok(ExtractOptions {
        tables,
        orientations,
        shape_rules,
        encoding: args.encoding.clone(),
        ..ExtractOptions::default()
    })
}

fn parse_options(args: &ExtractArgs) -> Result<ExtractOptions> {
    let options = parse_selection(&args.selection)?;

    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    let fill = MergedFill::from_str(&args.fill)
        .map_err(|error| anyhow!("{error}"))
        .context("failed to parse --fill")?;

    Ok(ExtractOptions {
        delimiter: args.delimiter as u8,
        fill,
        no_table: args.no_table,
        no_orientation: args.no_orientation,
        ..options
    })
}

fn log_report(report: &ExtractionReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} table_id={:?}: {}",
                warning.code, warning.table_id, warning.message
            );
        }
    }
}

fn run_extract(args: &ExtractArgs) -> Result<ExtractionReport> {
    let options = parse_options(args)?;
    let input = &args.selection.input;
    extract_html_to_csv(input, &args.output, &options)
        .with_context(|| format!("failed to extract tables from '{}'", input.display()))
}

fn run_classify(args: &ClassifyArgs) -> Result<Classification> {
    let options = parse_selection(&args.selection)?;
    let input = &args.selection.input;
    let html = read_html(input, options.encoding.as_deref())
        .with_context(|| format!("failed to read '{}'", input.display()))?;
    Ok(classify_html(&html, &options))
}

fn print_classification(classification: &Classification) {
    for report in &classification.tables {
        match &report.outcome {
            TableOutcome::Genuine(sheet) => println!(
                "table {}: {} ({}x{})",
                report.table_id, sheet.orientation, sheet.rows, sheet.cols
            ),
            TableOutcome::Skipped(warning) => println!(
                "table {}: {} [{}] {}",
                report.table_id,
                report.orientation(),
                warning.code.as_str(),
                warning.message
            ),
        }
    }
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("genuine_tables=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract(args) => match run_extract(&args) {
            Ok(report) => {
                log_report(&report, args.verbose);
                if report.genuine_count > 0 {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(2)
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
        Commands::Classify(args) => match run_classify(&args) {
            Ok(classification) => {
                print_classification(&classification);
                if classification.genuine_count() > 0 {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(2)
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
