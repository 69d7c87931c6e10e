use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use schedule_pdf_to_csv::ExtractOptions;
use shift_sync::calendar::GoogleCalendar;
use shift_sync::collaborators::list_schedule_messages;
use shift_sync::config::{Config, DEFAULT_CONFIG_PATH, offset_from_minutes};
use shift_sync::csv_pipeline::{SyncOptions, convert_pdf_bytes_to_csv, interpret_csv, run_sync};
use shift_sync::error::SyncError;
use shift_sync::gmail::GmailClient;
use shift_sync::models::{DEFAULT_UTC_OFFSET_MINUTES, WeeklySchedule};
use shift_sync::name_format::schedule_key;
use shift_sync::search::{SearchCriteria, SearchWindow};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "shift-sync",
    version,
    about = "Copy a weekly shift schedule from an emailed PDF into a calendar"
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find the newest schedule email and add its shifts to the calendar.
    Sync(SyncArgs),
    /// List the schedule emails matching the configured search.
    List(MailArgs),
    /// Convert a schedule PDF into CSV.
    Convert(ConvertArgs),
    /// Print one employee's shifts from a schedule CSV.
    Interpret(InterpretArgs),
}

#[derive(Debug, Args)]
struct MailArgs {
    /// Config file path.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Search from this date (YYYY-MM-DD) instead of the lookback window.
    #[arg(long)]
    after: Option<NaiveDate>,

    /// Search up to this date (YYYY-MM-DD); requires --after.
    #[arg(long, requires = "after")]
    before: Option<NaiveDate>,
}

#[derive(Debug, Args)]
struct SyncArgs {
    #[command(flatten)]
    mail: MailArgs,

    /// Log the shifts instead of creating calendar events.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Input PDF path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV path; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 1-based page holding the schedule.
    #[arg(long, default_value_t = 1)]
    page: u32,
}

#[derive(Debug, Args)]
struct InterpretArgs {
    /// Schedule CSV path.
    #[arg(short, long)]
    input: PathBuf,

    /// Employee as "First Last".
    #[arg(short, long)]
    name: String,

    /// Offset of the schedule's local time from UTC, in minutes.
    #[arg(long, default_value_t = DEFAULT_UTC_OFFSET_MINUTES, allow_hyphen_values = true)]
    utc_offset_minutes: i32,
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "shift_sync=debug,schedule_pdf_to_csv=debug"
    } else {
        "shift_sync=info,schedule_pdf_to_csv=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn criteria_for(config: &Config, args: &MailArgs) -> Result<SearchCriteria, SyncError> {
    let window = match (args.after, args.before) {
        (Some(after), Some(before)) => SearchWindow::range(after, before)?,
        (Some(after), None) => SearchWindow::Since(after),
        _ => SearchWindow::lookback(Local::now().date_naive(), config.mail.lookback_days),
    };
    Ok(config.search_criteria_in(window)?)
}

fn print_schedule(schedule: &WeeklySchedule) {
    for shift in &schedule.shifts {
        println!(
            "{:?}\t{}\t{}",
            shift.day,
            shift.start.to_rfc3339(),
            shift.end.to_rfc3339()
        );
    }
}

fn run_sync_command(config: &Config, args: &SyncArgs) -> Result<(), SyncError> {
    let token = config.access_token()?;
    let criteria = criteria_for(config, &args.mail)?;
    let mail = GmailClient::new(&config.mail.base_url, token)?;
    let calendar = GoogleCalendar::new(
        &config.calendar.base_url,
        token,
        &config.calendar.calendar_id,
    )?;
    let options = SyncOptions {
        dry_run: args.dry_run,
        extract: ExtractOptions::default(),
    };

    let outcome = run_sync(config, &criteria, &mail, &calendar, &options)?;
    print_schedule(&outcome.schedule);
    tracing::info!(
        events = outcome.events.len(),
        dry_run = args.dry_run,
        "sync finished"
    );
    Ok(())
}

fn run_list_command(config: &Config, args: &MailArgs) -> Result<(), SyncError> {
    let token = config.access_token()?;
    let criteria = criteria_for(config, args)?;
    let mail = GmailClient::new(&config.mail.base_url, token)?;

    for message in list_schedule_messages(&mail, &criteria)? {
        let attachments = message
            .attachments
            .iter()
            .map(|attachment| attachment.filename.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{}\t{}\t{}\t{}",
            message.id,
            message.date.as_deref().unwrap_or("-"),
            attachments,
            message.snippet
        );
    }
    Ok(())
}

fn run_convert_command(args: &ConvertArgs) -> Result<()> {
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let options = ExtractOptions {
        page: args.page,
        ..ExtractOptions::default()
    };
    let (csv, report) = convert_pdf_bytes_to_csv(&bytes, &options)
        .with_context(|| format!("failed to convert '{}'", args.input.display()))?;

    match &args.output {
        Some(path) => std::fs::write(path, csv)
            .with_context(|| format!("failed to write '{}'", path.display()))?,
        None => print!("{csv}"),
    }
    tracing::info!(rows = report.row_count, repaired = report.repaired, "converted schedule");
    Ok(())
}

fn run_interpret_command(args: &InterpretArgs) -> Result<()> {
    let csv = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let offset = offset_from_minutes(args.utc_offset_minutes)
        .with_context(|| format!("invalid utc offset: {} minutes", args.utc_offset_minutes))?;
    let key = schedule_key(&args.name)?;
    let schedule = interpret_csv(&csv, b',', &key, offset)?;
    print_schedule(&schedule);
    Ok(())
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load(path).with_context(|| format!("failed to load config '{}'", path.display()))
}

fn with_config<F>(path: &Path, verbose: bool, run: F) -> ExitCode
where
    F: FnOnce(&Config) -> Result<(), SyncError>,
{
    let config = match load_config(path) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error:#}");
            return ExitCode::from(1);
        }
    };
    init_tracing(verbose || config.debug);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!(stage = error.stage(), code = error.code(), "run failed");
            eprintln!("error: [{}] {error}", error.stage());
            ExitCode::from(1)
        }
    }
}

fn exit_with(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => with_config(&args.mail.config, cli.verbose, |config| {
            run_sync_command(config, &args)
        }),
        Commands::List(args) => {
            with_config(&args.config, cli.verbose, |config| run_list_command(config, &args))
        }
        Commands::Convert(args) => {
            init_tracing(cli.verbose);
            exit_with(run_convert_command(&args))
        }
        Commands::Interpret(args) => {
            init_tracing(cli.verbose);
            exit_with(run_interpret_command(&args))
        }
    }
}
