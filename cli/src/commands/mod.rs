//! CLI Commands
//!
//! All mungelab CLI commands organized as separate modules, plus the
//! `ReplState` they share and the dispatcher that routes one input line to
//! a handler.

mod args;
mod benchmark;
mod levenshtein;
mod search;
mod sequence;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use mungelab_core::{CutList, Globals, TransformRegistry};

/// Every command handler's shared, mutable working state for one REPL
/// session (or one batch `-RunCommand` invocation).
pub struct ReplState {
    /// Current settings snapshot.
    pub globals: Globals,
    /// Bootstrapped, immutable transform registry.
    pub registry: TransformRegistry,
    /// Pruning matrix consulted by search commands.
    pub cutlist: CutList,
    /// Where `settings save` writes `GlobalSettings.json`.
    pub settings_path: PathBuf,
    /// Where the CutList is persisted between runs.
    pub cutlist_path: PathBuf,
}

impl ReplState {
    /// Build a fresh state: bootstrap the registry, load settings and the
    /// CutList from disk if present, otherwise fall back to defaults.
    #[must_use]
    pub fn new(settings_path: PathBuf, cutlist_path: PathBuf) -> Self {
        let globals = mungelab_core::persistence::read_json(&settings_path)
            .ok()
            .flatten()
            .map(|entries: std::collections::BTreeMap<String, mungelab_core::settings::SettingValue>| {
                let mut globals = Globals::default();
                for (name, value) in &entries {
                    let _ = globals.apply_entry(name, value);
                }
                globals
            })
            .unwrap_or_default();
        let cutlist = CutList::load(&cutlist_path).unwrap_or_default();
        Self { globals, registry: TransformRegistry::bootstrap(), cutlist, settings_path, cutlist_path }
    }
}

/// Command names recognized by [`dispatch`], used both for routing and as
/// the candidate list fed to the Levenshtein fuzzy-match fallback.
const COMMAND_NAMES: &[&str] =
    &["settings", "show", "encrypt", "decrypt", "munge", "bestfit", "btr", "benchmark", "help", "exit"];

/// Split a raw REPL line into a command name and its argument text, peeling
/// off a single layer of parentheses if present (`munge(-L5)` and
/// `munge -L5` are both accepted).
fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim();
    if let Some(open) = line.find('(') {
        if let Some(close) = line.rfind(')') {
            if close > open {
                return (line[..open].trim(), line[open + 1..close].trim());
            }
        }
    }
    match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd.trim(), rest.trim()),
        None => (line, ""),
    }
}

/// Route one REPL input line to its handler, fuzzy-correcting an unknown
/// command name via Levenshtein distance before giving up.
///
/// Returns `Ok(true)` to keep the REPL running, `Ok(false)` on `exit`.
pub fn dispatch(state: &mut ReplState, line: &str) -> Result<bool> {
    let (raw_command, args) = split_command(line);
    if raw_command.is_empty() {
        return Ok(true);
    }

    let command = match COMMAND_NAMES.iter().find(|&&c| c.eq_ignore_ascii_case(raw_command)) {
        Some(&c) => c,
        None => match levenshtein::closest(&raw_command.to_ascii_lowercase(), COMMAND_NAMES, 2) {
            Some(c) => {
                println!("{} unknown command '{raw_command}', assuming '{c}'", "[WARN]".yellow());
                c
            }
            None => {
                println!("{} unknown command '{raw_command}' (try 'help')", "[ERROR]".red());
                return Ok(true);
            }
        },
    };

    match command {
        "settings" => settings::run(state, args)?,
        "show" => sequence::show(state, args)?,
        "encrypt" => sequence::encrypt(state, args)?,
        "decrypt" => sequence::decrypt(state, args)?,
        "munge" => search::munge(state, args)?,
        "bestfit" => search::bestfit(state, args)?,
        "btr" => search::btr(state, args)?,
        "benchmark" => benchmark::run(state)?,
        "help" => print_help(),
        "exit" => return Ok(false),
        _ => unreachable!("command resolved from COMMAND_NAMES"),
    }
    Ok(true)
}

fn print_help() {
    println!("commands: {}", COMMAND_NAMES.join(", "));
}
