use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use schedule_pdf_to_csv::{
    AmbiguityPolicy, ExtractError, ExtractOptions, ExtractionReport, extract_schedule_table,
    write_csv,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "sched2csv",
    version,
    about = "Extract a weekly shift schedule table from a PDF into CSV"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract the schedule grid and write it as CSV.
    Extract(ExtractArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Ambiguity {
    Flag,
    Reject,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input PDF path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV path.
    #[arg(short, long)]
    output: PathBuf,

    /// 1-based page holding the schedule.
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Output delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Area-overlap threshold above which two glyphs start separate words.
    #[arg(long, default_value_t = schedule_pdf_to_csv::DEFAULT_WORD_THRESHOLD)]
    word_threshold: f64,

    /// Leave a merged Friday/Saturday column unrepaired (fails on ragged rows).
    #[arg(long)]
    no_repair: bool,

    /// What to do with merged cells that cannot be placed with certainty.
    #[arg(long, value_enum, default_value = "flag")]
    ambiguity: Ambiguity,

    /// Write the page's mark, word, line and column boxes as JSON.
    #[arg(long)]
    markup: Option<PathBuf>,

    /// Enable debug logging and per-warning output.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_options(args: &ExtractArgs) -> Result<ExtractOptions> {
    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    let options = ExtractOptions {
        page: args.page,
        delimiter: args.delimiter as u8,
        word_threshold: args.word_threshold,
        repair: !args.no_repair,
        ambiguity: match args.ambiguity {
            Ambiguity::Flag => AmbiguityPolicy::Flag,
            Ambiguity::Reject => AmbiguityPolicy::Reject,
        },
        ..ExtractOptions::default()
    };
    options.validate()?;
    Ok(options)
}

fn log_report(report: &ExtractionReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} row={:?} column={:?}: {}",
                warning.code, warning.row, warning.column, warning.message
            );
        }
    }
}

fn run_extract(args: &ExtractArgs) -> Result<ExtractionReport> {
    let options = parse_options(args)?;
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let extracted = extract_schedule_table(&bytes, &options)
        .with_context(|| format!("failed to extract schedule from '{}'", args.input.display()))?;

    write_csv(&args.output, &extracted.table, options.delimiter)
        .with_context(|| format!("failed to write '{}'", args.output.display()))?;

    if let Some(path) = &args.markup {
        let json = extracted.markup.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write markup to '{}'", path.display()))?;
    }

    Ok(extracted.report)
}

/// 2 when the page held no table rows, 1 for every other failure.
fn failure_code(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<ExtractError>() {
        Some(ExtractError::EmptyTable) => 2,
        _ => 1,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let Commands::Extract(args) = cli.command;

    let default_filter = if args.verbose {
        "schedule_pdf_to_csv=debug"
    } else {
        "schedule_pdf_to_csv=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match run_extract(&args) {
        Ok(report) => {
            log_report(&report, args.verbose);
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(failure_code(&error))
        }
    }
}
