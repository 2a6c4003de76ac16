//! mungelab CLI
//!
//! Batch and interactive shell for the transform-search cryptanalysis
//! workbench: queue one or more `-RunCommand`s for a scripted batch run, or
//! launch with none and get an interactive REPL.

mod commands;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use commands::ReplState;
use mungelab_core::settings::SettingValue;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mungelab")]
#[command(about = "Interactive transform-search cryptanalysis workbench", long_about = None)]
#[command(version)]
struct Cli {
    /// A REPL command to run before exiting or dropping into the shell,
    /// e.g. `-RunCommand "munge(-L3)"`. Repeatable; commands run in order.
    #[arg(long = "RunCommand", value_name = "COMMAND")]
    run_command: Vec<String>,

    /// Global rounds applied to every candidate sequence.
    #[arg(long = "Rounds", value_name = "N")]
    rounds: Option<u32>,

    /// Maximum sequence length Munge and Best-Fit will search.
    #[arg(long = "MaxSequenceLen", value_name = "N")]
    max_sequence_len: Option<usize>,

    /// Input classification used when no buffer is supplied.
    #[arg(long = "InputType", value_name = "Combined|Natural|Random|Sequence|UserData")]
    input_type: Option<String>,

    /// Minimum number of metrics a candidate must pass to be considered.
    #[arg(long = "PassCount", value_name = "N")]
    pass_count: Option<u32>,

    /// Top-K capacity for the contender registry.
    #[arg(long = "DesiredContenders", value_name = "N")]
    desired_contenders: Option<usize>,

    /// Candidates considered between checkpoint flushes.
    #[arg(long = "FlushThreshold", value_name = "N")]
    flush_threshold: Option<u64>,

    /// Active cryptanalysis weight-table mode.
    #[arg(long = "Mode", value_name = "Cryptographic|Exploratory|Flattening|None")]
    mode: Option<String>,

    /// Active aggregate-scoring algorithm.
    #[arg(long = "ScoringMode", value_name = "Practical|Metric")]
    scoring_mode: Option<String>,

    /// Suppress non-essential console output.
    #[arg(long = "Quiet")]
    quiet: bool,

    /// Emit compact SQL-friendly contender output.
    #[arg(long = "SqlCompact")]
    sql_compact: bool,

    /// Write rejected candidates to the optional SQLite fail database.
    #[arg(long = "CreateMungeFailDB")]
    create_munge_fail_db: bool,

    /// Exit the process once every queued `-RunCommand` completes, instead
    /// of dropping into the interactive shell afterward.
    #[arg(long = "ExitJobComplete")]
    exit_job_complete: bool,

    /// Log dropped (non-reversible) candidates during Munge runs.
    #[arg(long = "LogMungeOutput")]
    log_munge_output: bool,

    /// Path to the settings file loaded at startup and written by `settings save`.
    #[arg(long = "SettingsFile", default_value = "GlobalSettings.json")]
    settings_file: PathBuf,

    /// Path to the CutList pruning matrix.
    #[arg(long = "CutListFile", default_value = "CutList.json")]
    cutlist_file: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let mut state = ReplState::new(cli.settings_file.clone(), cli.cutlist_file.clone());
    apply_overrides(&mut state, &cli);

    for command in &cli.run_command {
        if let Err(e) = commands::dispatch(&mut state, command) {
            eprintln!("[ERROR] {command}: {e:#}");
        }
    }

    if !cli.run_command.is_empty() && (cli.exit_job_complete || state.globals.exit_job_complete) {
        return Ok(());
    }

    run_repl(&mut state)
}

fn apply_overrides(state: &mut ReplState, cli: &Cli) {
    let overrides: &[(&str, Option<SettingValue>)] = &[
        ("Rounds", cli.rounds.map(|v| SettingValue::Int(i64::from(v)))),
        ("MaxSequenceLen", cli.max_sequence_len.map(|v| SettingValue::Int(v as i64))),
        ("InputType", cli.input_type.clone().map(SettingValue::Str)),
        ("PassCount", cli.pass_count.map(|v| SettingValue::Int(i64::from(v)))),
        ("DesiredContenders", cli.desired_contenders.map(|v| SettingValue::Int(v as i64))),
        ("FlushThreshold", cli.flush_threshold.map(|v| SettingValue::Int(v as i64))),
        ("Mode", cli.mode.clone().map(SettingValue::Str)),
        ("ScoringMode", cli.scoring_mode.clone().map(SettingValue::Str)),
    ];
    for (name, value) in overrides {
        if let Some(value) = value {
            if let Err(e) = state.globals.apply_entry(name, value) {
                eprintln!("[ERROR] invalid -{name}: {e}");
            }
        }
    }
    if cli.quiet {
        state.globals.quiet = true;
    }
    if cli.sql_compact {
        state.globals.sql_compact = true;
    }
    if cli.create_munge_fail_db {
        state.globals.create_munge_fail_db = true;
    }
    if cli.exit_job_complete {
        state.globals.exit_job_complete = true;
    }
    if cli.log_munge_output {
        state.globals.log_munge_output = true;
    }
}

fn run_repl(state: &mut ReplState) -> Result<()> {
    let stdin = io::stdin();
    loop {
        if !state.globals.quiet {
            print!("mungelab> ");
            io::stdout().flush()?;
        }
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match commands::dispatch(state, &line) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => eprintln!("[ERROR] {e:#}"),
        }
    }
    Ok(())
}
