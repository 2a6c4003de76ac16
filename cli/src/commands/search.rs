//! `munge`, `btr`, and `bestfit` commands: drive the corresponding
//! [`mungelab_core::search`] iterator against a fixed corpus and password,
//! writing a ranked `Contenders,-*.txt` file when the run completes.

use std::fs;

use anyhow::{Context, Result};
use colored::Colorize;
use mungelab_core::faildb::FailDbSink;
use mungelab_core::filenames::{contenders_filename, munge_fail_db_filename, state_filename, RunCoordinates};
use mungelab_core::profiler::InputType;
use mungelab_core::search::pool::build_pool;
use mungelab_core::search::{bestfit::BestFitIterator, btr::BtrIterator, munge::MungeIterator, run_driver_parallel, SearchJob};
use mungelab_core::sequence::Sequence;
use mungelab_core::ContenderRegistry;
use tracing::info;

use super::args::parse_flags;
use super::ReplState;

/// The builtin corpus every search command encrypts against when the
/// caller does not supply `-text`. Stands in for `userdata.bin` (`spec.md`
/// §6's canonical test input) without requiring a file on disk.
const DEFAULT_CORPUS: &[u8] =
    b"the quick brown fox jumps over the lazy dog, and does it again and again for good measure";
const DEFAULT_PASSWORD: &[u8] = b"mungelab-default-password";
const DEFAULT_SALT: [u8; 8] = *b"mngecli!";

/// Top N contenders whose transform ids feed the CutList at level
/// completion (`SPEC_FULL.md` §4.H.1 step 5).
const TOP_N_FOR_CUTLIST: usize = 10;

/// `munge(-L<level> [-restore] [-no-cutlist] [-remove-inverse])`.
pub fn munge(state: &mut ReplState, args: &str) -> Result<()> {
    let flags = parse_flags(&super::args::tokenize(args));
    let level: u32 = flags.get("L").map(|v| v.parse()).transpose()?.unwrap_or(state.globals.max_sequence_len as u32);
    let restore = flags.get("restore").is_some();
    let no_cutlist = flags.get("no-cutlist").is_some();
    let remove_inverse = flags.get("remove-inverse").is_some();

    let coords = coords_for(state, level);
    let contenders = load_or_create_registry(state, coords, restore)?;

    let pool = build_pool(
        &state.registry,
        &state.cutlist,
        level,
        state.globals.pass_count,
        InputType::Combined,
        no_cutlist,
        remove_inverse,
    );
    info!(level, pool_size = pool.len(), restore, "starting munge search");

    let sink = open_fail_sink(state, coords);
    let mut job = build_job(state, InputType::Combined, &sink);
    job.no_cutlist = no_cutlist;
    let candidates = MungeIterator::new(&pool, level as usize, state.globals.rounds);
    let evaluated = run_driver_parallel(&job, candidates, &contenders);

    finish(state, &contenders, coords, evaluated)
}

/// `bestfit(-ids "1,4,7" | -L<level>)`: permute a fixed transform set. With
/// no explicit `-ids`, the set defaults to the CutList-filtered pool at
/// `-L<level>` (or `Globals::max_sequence_len` ids from the registry).
pub fn bestfit(state: &mut ReplState, args: &str) -> Result<()> {
    let flags = parse_flags(&super::args::tokenize(args));
    let level: u32 = flags.get("L").map(|v| v.parse()).transpose()?.unwrap_or(state.globals.max_sequence_len as u32);

    let pool: Vec<u8> = match flags.get("ids") {
        Some(ids) => ids
            .split(',')
            .map(|s| s.trim().parse::<u8>())
            .collect::<Result<Vec<u8>, _>>()
            .context("usage: bestfit(-ids \"1,4,7\")")?,
        None => build_pool(&state.registry, &state.cutlist, level, state.globals.pass_count, InputType::Combined, false, false)
            .into_iter()
            .take(level as usize)
            .collect(),
    };

    let coords = coords_for(state, pool.len() as u32);
    let contenders = ContenderRegistry::new(state.globals.desired_contenders);
    let sink = open_fail_sink(state, coords);
    let job = build_job(state, InputType::Combined, &sink);
    let candidates = BestFitIterator::new(&pool, state.globals.rounds);

    info!(set_size = pool.len(), "starting best-fit search");
    let evaluated = run_driver_parallel(&job, candidates, &contenders);
    finish(state, &contenders, coords, evaluated)
}

/// `btr(-seq "...")`: exhaustively sweep per-transform and global rounds
/// for a fixed transform order.
pub fn btr(state: &mut ReplState, args: &str) -> Result<()> {
    let flags = parse_flags(&super::args::tokenize(args));
    let seq_text = flags.get("seq").context("usage: btr(-seq \"Name1 -> Name2\")")?;
    let base = Sequence::parse(seq_text, state.globals.rounds)?;
    let level = base.len() as u32;
    let coords = coords_for(state, level);

    let contenders = ContenderRegistry::new(state.globals.desired_contenders);
    let sink = open_fail_sink(state, coords);
    let job = build_job(state, InputType::Combined, &sink);
    let candidates = BtrIterator::new(&base);

    info!(level, "starting BTR round-count sweep");
    let evaluated = run_driver_parallel(&job, candidates, &contenders);
    finish(state, &contenders, coords, evaluated)
}

fn coords_for(state: &ReplState, level: u32) -> RunCoordinates {
    RunCoordinates {
        level,
        pass_count: state.globals.pass_count,
        data_type: InputType::Combined,
        mode: state.globals.mode,
        scoring_mode: state.globals.scoring_mode,
    }
}

fn build_job<'a>(state: &'a ReplState, data_type: InputType, fail_sink: &'a FailDbSink) -> SearchJob<'a> {
    SearchJob {
        registry: &state.registry,
        cutlist: &state.cutlist,
        globals: &state.globals,
        plaintext: DEFAULT_CORPUS,
        password: DEFAULT_PASSWORD,
        salt: DEFAULT_SALT,
        data_type,
        no_cutlist: false,
        fail_sink,
    }
}

/// Open a `MungeFailDB,-*.db` sink when `-CreateMungeFailDB` is set,
/// otherwise a no-op sink (§6 supplement).
fn open_fail_sink(state: &ReplState, coords: RunCoordinates) -> FailDbSink {
    if state.globals.create_munge_fail_db {
        FailDbSink::open(std::path::Path::new(&munge_fail_db_filename(coords)))
    } else {
        FailDbSink::disabled()
    }
}

/// `-restore`: resume from the matching `State,-*.json` checkpoint if one
/// exists; otherwise (or without `-restore`) start a fresh registry, warning
/// on a corrupt checkpoint rather than failing the run (`spec.md` §7).
fn load_or_create_registry(state: &ReplState, coords: RunCoordinates, restore: bool) -> Result<ContenderRegistry> {
    if !restore {
        return Ok(ContenderRegistry::new(state.globals.desired_contenders));
    }
    let path = std::path::PathBuf::from(state_filename(coords));
    if !path.exists() {
        println!("{} no checkpoint at {}, starting fresh", "[WARN]".yellow(), path.display());
        return Ok(ContenderRegistry::new(state.globals.desired_contenders));
    }
    match ContenderRegistry::restore(&path, state.globals.desired_contenders) {
        Ok(registry) => {
            println!("{} resumed {} contenders from {}", "[OK]".green(), registry.len(), path.display());
            Ok(registry)
        }
        Err(e) => {
            println!("{} checkpoint at {} unreadable ({e}), starting fresh", "[WARN]".yellow(), path.display());
            Ok(ContenderRegistry::new(state.globals.desired_contenders))
        }
    }
}

fn finish(state: &mut ReplState, contenders: &ContenderRegistry, coords: RunCoordinates, evaluated: u64) -> Result<()> {
    // §4.H.1 step 5: derive the top-10, update the CutList, persist both.
    let top10 = contenders.top(TOP_N_FOR_CUTLIST);
    state.cutlist.update_from_top10(top10.iter().map(|c| &c.sequence), coords.level, coords.pass_count, coords.data_type);
    state
        .cutlist
        .save(&state.cutlist_path)
        .with_context(|| format!("failed to save {}", state.cutlist_path.display()))?;

    let state_path = state_filename(coords);
    contenders
        .snapshot(std::path::Path::new(&state_path))
        .with_context(|| format!("failed to checkpoint {state_path}"))?;

    let path = contenders_filename(coords);
    let report = render_report(state, contenders);
    fs::write(&path, report).with_context(|| format!("failed to write {path}"))?;

    println!(
        "{} evaluated {evaluated} candidates, kept {} contenders -> {path}",
        "[OK]".green(),
        contenders.len()
    );
    Ok(())
}

fn render_report(state: &ReplState, contenders: &ContenderRegistry) -> String {
    use std::fmt::Write as _;
    let mut out = String::new();
    for (i, c) in contenders.top(usize::MAX).into_iter().enumerate() {
        let rendered = c.sequence.serialize(mungelab_core::sequence::SerializeOptions::full(), &state.registry);
        let _ = writeln!(out, "Contender #{}", i + 1);
        let _ = writeln!(out, "  Sequence: {rendered}");
        let _ = writeln!(out, "  Aggregate Score: {:.4}", c.score);
        let _ = writeln!(out);
    }
    out
}
