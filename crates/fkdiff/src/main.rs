//! fkdiff CLI
//!
//! Command-line tool for reporting foreign key changes between two
//! schema snapshots stored as JSON.

mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

use fkdiff_core::prelude::*;

use crate::output::Format;

/// Report foreign key changes between two schema snapshots.
#[derive(Parser)]
#[command(name = "fkdiff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Whether constraint names take part in equality.
    #[arg(
        long,
        global = true,
        env = "FKDIFF_NAME_POLICY",
        value_enum,
        default_value_t = NamePolicyArg::Ignore
    )]
    name_policy: NamePolicyArg,

    /// Treat ON DELETE / ON UPDATE changes as constraint changes.
    #[arg(long, global = true)]
    compare_actions: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the operations turning BEFORE into AFTER.
    Diff {
        /// Snapshot before the change.
        before: PathBuf,

        /// Snapshot after the change.
        after: PathBuf,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Only diff these tables (all shared tables if not specified).
        #[arg(short, long = "table")]
        tables: Vec<String>,
    },

    /// Exit with a failure status if BEFORE and AFTER differ.
    Check {
        /// Snapshot before the change.
        before: PathBuf,

        /// Snapshot after the change.
        after: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum NamePolicyArg {
    /// Pure renames are not reported.
    Ignore,
    /// Pure renames are reported as drop + add.
    Compare,
}

impl From<NamePolicyArg> for NamePolicy {
    fn from(arg: NamePolicyArg) -> Self {
        match arg {
            NamePolicyArg::Ignore => Self::Ignore,
            NamePolicyArg::Compare => Self::Compare,
        }
    }
}

fn load_snapshot(path: &Path) -> anyhow::Result<SchemaSnapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot = SchemaSnapshot::from_json_str(&json)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
    debug!(
        path = %path.display(),
        tables = snapshot.tables.len(),
        "Loaded snapshot"
    );
    Ok(snapshot)
}

/// Keeps only the named tables. An empty filter keeps everything.
fn restrict(mut snapshot: SchemaSnapshot, tables: &[String]) -> SchemaSnapshot {
    if !tables.is_empty() {
        snapshot.tables.retain(|name, _| tables.contains(name));
    }
    snapshot
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut options = DiffOptions::new().with_name_policy(cli.name_policy.into());
    if cli.compare_actions {
        options = options.with_action_comparison();
    }
    let differ = ForeignKeyDiffer::with_options(options);

    match cli.command {
        Commands::Diff {
            before,
            after,
            format,
            tables,
        } => {
            let before = restrict(load_snapshot(&before)?, &tables);
            let after = restrict(load_snapshot(&after)?, &tables);

            let ops = differ.diff_schema(&before, &after);
            info!("{} foreign key change(s) detected.", ops.len());
            print!("{}", output::render(&ops, format)?);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Check { before, after } => {
            let before = load_snapshot(&before)?;
            let after = load_snapshot(&after)?;

            let ops = differ.diff_schema(&before, &after);
            if ops.is_empty() {
                info!("No foreign key changes.");
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!("{} foreign key change(s) pending:", ops.len());
                for op in &ops {
                    eprintln!("  {op}");
                }
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
