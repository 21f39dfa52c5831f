//! Note-id to phase-step table

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::driver_constants::{A4_FREQ, A4_NOTE_ID, N_NOTES, SAMPLE_RATE};

use once_cell::sync::Lazy;

// The phase accumulator is 8.8 fixed-point over a 256 entry wave table,
// so one wave cycle is 0x10000 phase units.
const PHASE_UNITS_PER_CYCLE: f64 = 65536.0;

const SEMITONES_PER_OCTAVE: f64 = 12.0;

/// Per-sample phase-accumulator increments for the 127 playable
/// equal-tempered notes.
pub static STEP_TABLE: Lazy<[u16; N_NOTES]> = Lazy::new(build_step_table);

fn build_step_table() -> [u16; N_NOTES] {
    let mut table = [0; N_NOTES];

    for (note_id, step) in table.iter_mut().enumerate() {
        let semitones = note_id as f64 - f64::from(A4_NOTE_ID);
        let freq = f64::from(A4_FREQ) * (semitones / SEMITONES_PER_OCTAVE).exp2();

        let s = (freq * PHASE_UNITS_PER_CYCLE / f64::from(SAMPLE_RATE)).round();
        assert!(s >= 1.0 && s < 65536.0, "step out of range");

        *step = s as u16;
    }

    table
}

/// Phase-accumulator increment for a note.
///
/// Panics if `note_id > LAST_NOTE_ID`.
pub fn note_step(note_id: u8) -> u16 {
    STEP_TABLE[usize::from(note_id)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver_constants::LAST_NOTE_ID;

    #[test]
    fn a4_step() {
        // 440 Hz * 65536 / 15734 Hz
        assert_eq!(note_step(A4_NOTE_ID), 1833);
    }

    #[test]
    fn steps_are_strictly_increasing() {
        for w in STEP_TABLE.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn octaves_roughly_double() {
        for note in 0..=LAST_NOTE_ID - 12 {
            let s = i32::from(note_step(note));
            let o = i32::from(note_step(note + 12));
            assert!((o - 2 * s).abs() <= 1, "note {}", note);
        }
    }
}
