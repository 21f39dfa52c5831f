#![no_main]

use libfuzzer_sys::fuzz_target;

use synth::{synthesize_patch, Patch};

// Interpreting an arbitrary command list must never panic; it either
// produces a wave file or a typed error.
fuzz_target!(|data: &[u8]| {
    // Bound the command count so pathological loop/delay combinations
    // stay fast.
    let values: Vec<i32> = data
        .chunks_exact(2)
        .take(3 * 64)
        .map(|c| i32::from(i16::from_le_bytes([c[0], c[1]])))
        .collect();
    let values = &values[..values.len() - values.len() % 3];

    if let Ok(patch) = Patch::from_flat_values(values) {
        let _ = synthesize_patch(&patch);
    }
});
