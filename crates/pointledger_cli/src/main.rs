//! Command-line front end for point ledgers.
//!
//! # Responsibility
//! - Recompute and print ledgers from a JSON snapshot or the local store.
//! - Import snapshots and record single notes into the local store.

mod render;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::error;
use pointledger_core::db::open_db;
use pointledger_core::logging::{init_logging_with, LogOptions};
use pointledger_core::{
    default_log_level, LedgerConfig, LedgerReport, LedgerService, NewNote, NoteRepository,
    NoteSource, SnapshotSource, SqliteNoteRepository,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "pointledger")]
#[command(about = "Attendance point ledgers with monthly rollback decay", version)]
struct Cli {
    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Directory for rotated log files; logging is off when omitted
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print ledgers and data quality warnings
    Report(ReportArgs),
    /// Copy a JSON snapshot into the local note store
    Import(ImportArgs),
    /// Record one note in the local note store
    Add(AddArgs),
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// JSON snapshot exported from the realtime database
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Local SQLite note store
    #[arg(long)]
    db: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Only print this employee
    #[arg(short, long)]
    employee: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// TOML file with accrual rules and policy overrides
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// JSON snapshot to import
    #[arg(long)]
    snapshot: PathBuf,

    /// Local SQLite note store (created when missing)
    #[arg(long)]
    db: PathBuf,
}

#[derive(Args, Debug)]
struct AddArgs {
    /// Local SQLite note store (created when missing)
    #[arg(long)]
    db: PathBuf,

    #[arg(long)]
    employee: String,

    /// Note date, YYYY-MM-DD
    #[arg(long)]
    date: String,

    /// Note type label, e.g. "Callout"
    #[arg(long)]
    note_type: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = setup_logging(&cli) {
        eprintln!("pointledger: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("pointledger: {err}");
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(cli: &Cli) -> Result<(), String> {
    let Some(log_dir) = cli.log_dir.as_ref() else {
        return Ok(());
    };
    let log_dir = absolute(log_dir).map_err(|err| format!("invalid log dir: {err}"))?;
    let log_dir = log_dir
        .to_str()
        .ok_or_else(|| "log dir must be valid UTF-8".to_string())?;
    init_logging_with(LogOptions {
        level: cli.log_level.as_deref().unwrap_or(default_log_level()),
        log_dir,
        echo_stderr: true,
    })
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Report(args) => report(args),
        Command::Import(args) => import(args),
        Command::Add(args) => add(args),
    }
}

fn report(args: ReportArgs) -> Result<(), Box<dyn Error>> {
    let config = match args.config.as_ref() {
        Some(path) => LedgerConfig::load(path)?,
        None => LedgerConfig::default(),
    };

    let report = match (args.source.snapshot.as_ref(), args.source.db.as_ref()) {
        (Some(path), _) => recompute(SnapshotSource::from_path(path)?, &config)?,
        (None, Some(path)) => {
            let mut conn = open_db(path)?;
            let repo = SqliteNoteRepository::try_new(&mut conn)?;
            recompute(&repo, &config)?
        }
        (None, None) => return Err("either --snapshot or --db is required".into()),
    };

    let report = match args.employee.as_deref() {
        Some(employee_id) => render::only_employee(report, employee_id),
        None => report,
    };

    let output = match args.format {
        OutputFormat::Table => render::table(&report),
        OutputFormat::Json => render::json(&report)?,
    };
    println!("{output}");
    Ok(())
}

fn recompute<S: NoteSource>(source: S, config: &LedgerConfig) -> Result<LedgerReport, Box<dyn Error>> {
    Ok(LedgerService::from_config(source, config).recompute()?)
}

fn import(args: ImportArgs) -> Result<(), Box<dyn Error>> {
    let snapshot = SnapshotSource::from_path(&args.snapshot)?;
    let mut conn = open_db(&args.db)?;
    let mut repo = SqliteNoteRepository::try_new(&mut conn)?;
    let summary = repo.import_notes(snapshot.notes())?;
    println!(
        "imported={} duplicates={} rejected={}",
        summary.imported, summary.duplicates, summary.rejected
    );
    Ok(())
}

fn add(args: AddArgs) -> Result<(), Box<dyn Error>> {
    let note = NewNote::parse(&args.employee, &args.date, &args.note_type)?;
    let mut conn = open_db(&args.db)?;
    let repo = SqliteNoteRepository::try_new(&mut conn)?;
    let id = repo.create_note(&note)?;
    println!("{id}");
    Ok(())
}
