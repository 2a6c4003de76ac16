//! `show`, `encrypt`, and `decrypt` commands: thin wrappers over
//! [`mungelab_core::sequence`] and [`mungelab_core::pipeline`].

use anyhow::{Context, Result};
use colored::Colorize;
use mungelab_core::sequence::{Sequence, SerializeOptions};
use mungelab_core::Pipeline;

use super::args::parse_flags;
use super::ReplState;

/// `show <sequence text>`: parse and re-render a sequence, echoing back its
/// canonical full-attribute form.
pub fn show(state: &ReplState, args: &str) -> Result<()> {
    let sequence = Sequence::parse(args.trim(), state.globals.rounds)
        .with_context(|| format!("could not parse sequence: {args}"))?;
    let rendered = sequence.serialize(SerializeOptions::full(), &state.registry);
    println!("{rendered}");
    println!("steps: {}  global_rounds: {}", sequence.len(), sequence.global_rounds);
    Ok(())
}

/// `encrypt -seq "..." -password <pw> -text <plaintext>`: print hex
/// ciphertext, including the fixed header.
pub fn encrypt(state: &ReplState, args: &str) -> Result<()> {
    let flags = parse_flags(&super::args::tokenize(args));
    let seq_text = flags.get("seq").context("usage: encrypt -seq \"...\" -password <pw> -text <plaintext>")?;
    let password = flags.get("password").context("missing -password")?;
    let text = flags.get("text").context("missing -text")?;

    let sequence = Sequence::parse(seq_text, state.globals.rounds)?;
    let pipeline = Pipeline::new(&state.registry);
    let salt = derive_salt(password);
    let ciphertext = pipeline.encrypt(&sequence, password.as_bytes(), salt, text.as_bytes())?;
    println!("{}", hex::encode(ciphertext));
    Ok(())
}

/// `decrypt -seq "..." -password <pw> -hex <ciphertext hex>`: print the
/// recovered plaintext (lossy UTF-8; the pipeline itself is byte-exact).
pub fn decrypt(state: &ReplState, args: &str) -> Result<()> {
    let flags = parse_flags(&super::args::tokenize(args));
    let seq_text = flags.get("seq").context("usage: decrypt -seq \"...\" -password <pw> -hex <ciphertext>")?;
    let password = flags.get("password").context("missing -password")?;
    let hex_ciphertext = flags.get("hex").context("missing -hex")?;

    let sequence = Sequence::parse(seq_text, state.globals.rounds)?;
    let ciphertext = hex::decode(hex_ciphertext).context("ciphertext is not valid hex")?;
    let pipeline = Pipeline::new(&state.registry);
    match pipeline.decrypt(&sequence, password.as_bytes(), &ciphertext) {
        Ok(plaintext) => println!("{}", String::from_utf8_lossy(&plaintext)),
        Err(e) => println!("{} {e}", "[ERROR]".red()),
    }
    Ok(())
}

/// Derive an 8-byte salt from the password itself so `encrypt`/`decrypt`
/// invocations with the same password and sequence are reproducible
/// without the REPL having to track a salt across commands.
fn derive_salt(password: &str) -> [u8; 8] {
    let hash = blake3::hash(password.as_bytes());
    let mut salt = [0u8; 8];
    salt.copy_from_slice(&hash.as_bytes()[..8]);
    salt
}
