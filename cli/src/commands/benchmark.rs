//! `benchmark` command: time every registered transform over a fixed
//! corpus and write `TransformBenchmarkResults.{txt,json}`.

use std::time::Instant;

use anyhow::{Context, Result};
use mungelab_core::transforms::catalog::forward_fn;
use mungelab_core::transforms::KeyMaterial;

use super::ReplState;

const CORPUS_LEN: usize = 64 * 1024;
const ITERATIONS: u32 = 64;

/// Run each registered transform `ITERATIONS` times over a fixed buffer,
/// record the mean per-call time onto the registry, and write both a
/// human-readable and a machine-readable results file.
pub fn run(state: &mut ReplState) -> Result<()> {
    let key = KeyMaterial::new([0x42; 32]);
    let mut buf = vec![0u8; CORPUS_LEN];
    for (i, b) in buf.iter_mut().enumerate() {
        *b = (i % 256) as u8;
    }

    let ids_and_names: Vec<(u8, &'static str)> = state.registry.iterate().map(|t| (t.id, t.name)).collect();

    let mut results = Vec::new();
    for (id, name) in ids_and_names {
        let Some(f) = forward_fn(id) else { continue };
        let mut scratch = buf.clone();
        let start = Instant::now();
        for _ in 0..ITERATIONS {
            f(&mut scratch, &key);
        }
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        let per_call_ms = elapsed_ms / f64::from(ITERATIONS);
        state.registry = state.registry.with_benchmark(id, per_call_ms)?;
        results.push((id, name, per_call_ms));
    }

    write_text_report(&results)?;
    write_json_report(&results)?;
    println!("benchmarked {} transforms -> TransformBenchmarkResults.{{txt,json}}", results.len());
    Ok(())
}

fn write_text_report(results: &[(u8, &'static str, f64)]) -> Result<()> {
    use std::fmt::Write as _;
    let mut out = String::new();
    for (id, name, ms) in results {
        let _ = writeln!(out, "{id:>3}  {name:<28} {ms:.6} ms/call");
    }
    std::fs::write("TransformBenchmarkResults.txt", out).context("failed to write TransformBenchmarkResults.txt")
}

fn write_json_report(results: &[(u8, &'static str, f64)]) -> Result<()> {
    let entries: Vec<serde_json::Value> = results
        .iter()
        .map(|(id, name, ms)| serde_json::json!({ "id": id, "name": name, "ms_per_call": ms }))
        .collect();
    let json = serde_json::to_vec_pretty(&entries)?;
    std::fs::write("TransformBenchmarkResults.json", json).context("failed to write TransformBenchmarkResults.json")
}
