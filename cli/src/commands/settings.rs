//! `settings` command: list, get, set, save, and load `GlobalSettings.json`.

use anyhow::{Context, Result};
use colored::Colorize;
use mungelab_core::settings::{schema, SettingValue};

use super::ReplState;

/// Dispatch the `settings <sub>` command. `args` is the raw text after
/// `settings `, e.g. `"set Rounds 3"` or `"list"`.
pub fn run(state: &mut ReplState, args: &str) -> Result<()> {
    let mut parts = args.split_whitespace();
    match parts.next().unwrap_or("list") {
        "list" => list(state),
        "get" => {
            let name = parts.next().context("usage: settings get <Name>")?;
            get(state, name)
        }
        "set" => {
            let name = parts.next().context("usage: settings set <Name> <Value>")?;
            let value = parts.next().context("usage: settings set <Name> <Value>")?;
            set(state, name, value)
        }
        "save" => save(state),
        other => {
            println!("{} unknown settings subcommand '{other}'; try list|get|set|save", "[ERROR]".red());
            Ok(())
        }
    }
}

fn list(state: &ReplState) -> Result<()> {
    for entry in schema() {
        if entry.flags.internal {
            continue;
        }
        let current = state.globals.to_entries(true).get(entry.name).cloned().unwrap_or(entry.default.clone());
        println!("{:<20} {}", entry.name.bold(), format_value(&current));
    }
    Ok(())
}

fn get(state: &ReplState, name: &str) -> Result<()> {
    match state.globals.to_entries(true).get(name) {
        Some(value) => println!("{name} = {}", format_value(value)),
        None => println!("{} unknown setting '{name}'", "[ERROR]".red()),
    }
    Ok(())
}

fn set(state: &mut ReplState, name: &str, value: &str) -> Result<()> {
    let parsed = parse_value_for(name, value);
    match state.globals.apply_entry(name, &parsed) {
        Ok(()) => println!("{name} = {}", format_value(&parsed)),
        Err(e) => println!("{} {e}", "[ERROR]".red()),
    }
    Ok(())
}

fn save(state: &ReplState) -> Result<()> {
    let entries = state.globals.to_entries(false);
    let json = serde_json::to_vec_pretty(&entries)?;
    std::fs::write(&state.settings_path, json)
        .with_context(|| format!("failed to write {}", state.settings_path.display()))?;
    println!("settings saved to {}", state.settings_path.display());
    Ok(())
}

fn parse_value_for(name: &str, raw: &str) -> SettingValue {
    if let Ok(i) = raw.parse::<i64>() {
        if matches!(
            name,
            "Rounds" | "MaxSequenceLen" | "PassCount" | "DesiredContenders" | "FlushThreshold"
        ) {
            return SettingValue::Int(i);
        }
    }
    match raw {
        "true" | "false" if matches!(
            name,
            "Quiet" | "SqlCompact" | "CreateMungeFailDB" | "ExitJobComplete" | "LogMungeOutput"
        ) =>
        {
            SettingValue::Bool(raw == "true")
        }
        other => SettingValue::Str(other.to_string()),
    }
}

fn format_value(value: &SettingValue) -> String {
    match value {
        SettingValue::Int(i) => i.to_string(),
        SettingValue::Str(s) => s.clone(),
        SettingValue::Bool(b) => b.to_string(),
    }
}
