//! # AES Comparison Harness
//!
//! Ad-hoc stream verification: encrypts a fixed or user-supplied plaintext
//! under a mungelab transform sequence and, side by side, under AES-256-GCM,
//! then prints Shannon entropy and byte-deviation-from-uniform for both
//! outputs so a sequence's ciphertext can be eyeballed against a reference
//! standard cipher.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use anyhow::{Context, Result};
use clap::Parser;
use mungelab_core::pipeline::Pipeline;
use mungelab_core::registry::TransformRegistry;
use mungelab_core::sequence::Sequence;
use mungelab_core::statutil::{byte_deviation_from_uniform, shannon_entropy};

#[derive(Parser)]
#[command(name = "mungelab_verify")]
#[command(about = "Compare a mungelab transform sequence's ciphertext statistics against AES-256-GCM")]
struct Cli {
    /// Sequence text, e.g. "XorConstant -> CascadeXorChain -> ReverseBuffer".
    #[arg(long, default_value = "XorConstant -> CascadeXorChain -> ReverseBuffer")]
    seq: String,

    /// Password used to derive the mungelab key material.
    #[arg(long, default_value = "verification-harness-password")]
    password: String,

    /// Plaintext length in bytes (a repeating pattern fills the buffer).
    #[arg(long, default_value_t = 16_384)]
    len: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let registry = TransformRegistry::bootstrap();
    let sequence = Sequence::parse(&cli.seq, 1).context("failed to parse -seq")?;

    let mut plaintext = vec![0u8; cli.len];
    for (i, b) in plaintext.iter_mut().enumerate() {
        *b = (i % 256) as u8;
    }

    let pipeline = Pipeline::new(&registry);
    let salt = [0x5au8; 8];
    let mungelab_ciphertext = pipeline.encrypt(&sequence, cli.password.as_bytes(), salt, &plaintext)?;
    let mungelab_payload = Pipeline::payload_only(&mungelab_ciphertext)?;

    let aes_ciphertext = aes_gcm_encrypt(cli.password.as_bytes(), &plaintext)?;

    println!("{:<28} {:>10} {:>16}", "cipher", "entropy", "byte-deviation");
    println!(
        "{:<28} {:>10.4} {:>16.6}",
        "mungelab",
        shannon_entropy(mungelab_payload),
        byte_deviation_from_uniform(mungelab_payload)
    );
    println!(
        "{:<28} {:>10.4} {:>16.6}",
        "aes-256-gcm",
        shannon_entropy(&aes_ciphertext),
        byte_deviation_from_uniform(&aes_ciphertext)
    );

    Ok(())
}

fn aes_gcm_encrypt(password: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let key_bytes: [u8; 32] = blake3::hash(password).into();
    let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
    let cipher = Aes256Gcm::new(key);
    let nonce = Nonce::from_slice(b"verify-nonce");
    cipher.encrypt(nonce, plaintext).map_err(|e| anyhow::anyhow!("AES-GCM encryption failed: {e}"))
}
