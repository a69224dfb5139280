use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fmb_remap::io::SheetRef;
use fmb_remap::pipeline::{self, RemapConfig};
use fmb_remap::reconcile::MatchPolicy;
use fmb_remap::report::DEFAULT_TOOL;
use fmb_remap::survey;
use fmb_remap::{RemapError, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout carries only the generated output.
fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| RemapError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Remap(args) => execute_remap(args),
        Command::Mailboxes(args) => execute_mailboxes(args),
        Command::ActiveLdus(args) => execute_active_ldus(args),
        Command::DuplicateLdus(args) => execute_duplicate_ldus(args),
    }
}

fn execute_remap(args: RemapArgs) -> Result<()> {
    let config = args.config();
    let outcome = pipeline::remap(&args.mapping, &args.snapshot, &config)?;

    if let Some(path) = &args.plan_out {
        pipeline::write_plan(&outcome.remapped, path)?;
    }
    if let Some(path) = &args.report_out {
        pipeline::write_audit(&outcome.report, path)?;
    }

    print!("{}", outcome.report);
    Ok(())
}

fn execute_mailboxes(args: SurveyArgs) -> Result<()> {
    for (_sheet, rows) in pipeline::load_mailbox_sheets(&args.sheet)? {
        for ldu in survey::mailbox_frequencies(&rows) {
            println!("{ldu}");
        }
    }
    Ok(())
}

fn execute_active_ldus(args: SurveyArgs) -> Result<()> {
    let sheets = pipeline::load_mailbox_sheets(&args.sheet)?;
    let ldus = survey::active_ldus(sheets.iter().flat_map(|(_, rows)| rows));
    println!("{}", survey::knex_insert(&ldus));
    Ok(())
}

fn execute_duplicate_ldus(args: SurveyArgs) -> Result<()> {
    for (_sheet, rows) in pipeline::load_mailbox_sheets(&args.sheet)? {
        for ldu in survey::duplicate_ldu_codes(&rows) {
            println!("{}, {}", ldu.area, ldu.ldu);
        }
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Move probation functional mailboxes onto remapped area, LDU and team codes."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate mailbox update commands for a snapshot after a code remapping.
    Remap(RemapArgs),
    /// Count how many teams of each LDU share a mailbox.
    Mailboxes(SurveyArgs),
    /// Print the distinct LDUs as an active LDU seed.
    ActiveLdus(SurveyArgs),
    /// List LDU codes that appear under more than one probation area.
    DuplicateLdus(SurveyArgs),
}

#[derive(clap::Args)]
struct RemapArgs {
    /// Remapping sheet as PATH#SHEET. Repeat for several sheets.
    #[arg(long, required = true, value_parser = parse_sheet_ref)]
    mapping: Vec<SheetRef>,

    /// JSON snapshot of the current LDUs and teams.
    #[arg(long)]
    snapshot: PathBuf,

    /// Namespace passed to the update tool.
    #[arg(long = "env", default_value = "dev")]
    environment: String,

    /// Update tool invoked by each command.
    #[arg(long, default_value = DEFAULT_TOOL)]
    tool: String,

    /// Fail when mapping rows disagree instead of using the first one.
    #[arg(long)]
    strict: bool,

    /// Write the reconciled LDUs as JSON.
    #[arg(long)]
    plan_out: Option<PathBuf>,

    /// Write an xlsx audit workbook of commands and unmatched entries.
    #[arg(long)]
    report_out: Option<PathBuf>,
}

impl RemapArgs {
    fn config(&self) -> RemapConfig {
        RemapConfig {
            environment: self.environment.clone(),
            tool: self.tool.clone(),
            policy: if self.strict {
                MatchPolicy::Strict
            } else {
                MatchPolicy::FirstMatch
            },
        }
    }
}

#[derive(clap::Args)]
struct SurveyArgs {
    /// Confirmed mailbox sheet as PATH#SHEET. Repeat for several sheets.
    #[arg(long, required = true, value_parser = parse_sheet_ref)]
    sheet: Vec<SheetRef>,
}

fn parse_sheet_ref(raw: &str) -> std::result::Result<SheetRef, String> {
    raw.parse().map_err(|error: RemapError| error.to_string())
}
