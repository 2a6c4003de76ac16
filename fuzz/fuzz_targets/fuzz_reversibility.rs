#![no_main]

use libfuzzer_sys::fuzz_target;
use mungelab_core::pipeline::Pipeline;
use mungelab_core::registry::TransformRegistry;
use mungelab_core::sequence::{Sequence, MAX_ROUNDS, MIN_ROUNDS};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let registry = TransformRegistry::bootstrap();
    let ids: Vec<u8> = registry.iterate().map(|t| t.id).collect();
    if ids.is_empty() {
        return;
    }

    let global_rounds = MIN_ROUNDS + (data[0] as u32 % (MAX_ROUNDS - MIN_ROUNDS + 1));
    let step_count = (data[1] as usize % 6) + 1;
    let mut steps = Vec::with_capacity(step_count);
    for i in 0..step_count {
        let byte = data.get(2 + i).copied().unwrap_or(0);
        let id = ids[byte as usize % ids.len()];
        let rounds = MIN_ROUNDS + (byte as u32 % (MAX_ROUNDS - MIN_ROUNDS + 1));
        steps.push((id, rounds));
    }

    let sequence = match Sequence::new(steps, global_rounds) {
        Ok(seq) => seq,
        Err(_) => return,
    };

    let plaintext_start = (2 + step_count).min(data.len());
    let plaintext = &data[plaintext_start..];
    if plaintext.is_empty() {
        return;
    }

    let pipeline = Pipeline::new(&registry);
    let password = b"fuzz-password";
    let salt = [0x11u8; 8];

    let ciphertext = match pipeline.encrypt(&sequence, password, salt, plaintext) {
        Ok(c) => c,
        Err(_) => return,
    };

    let recovered = pipeline
        .decrypt(&sequence, password, &ciphertext)
        .expect("decrypt must succeed for a ciphertext this same pipeline just produced");

    assert_eq!(recovered, plaintext, "pipeline did not invert its own sequence");
});
