//! Audio-engine constants

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

// These values MUST match the console audio driver.

#![allow(clippy::assertions_on_constants)]

pub const SAMPLE_RATE: u32 = 15734;

pub const FRAMES_PER_SECOND: u32 = 60;

/// Samples rendered per delay frame (truncated, matching the driver).
pub const SAMPLES_PER_FRAME: usize = (SAMPLE_RATE / FRAMES_PER_SECOND) as usize;

pub const DEFAULT_NOTE: u8 = 80;
pub const DEFAULT_VOLUME: u8 = 0xff;

pub const N_WAVE_TABLES: usize = 10;
pub const WAVE_TABLE_SAMPLES: usize = 256;

/// The tremolo LFO is always read out of this wave table.
pub const TREMOLO_WAVE_TABLE: usize = 0;
pub const DEFAULT_TREMOLO_RATE: u8 = 24;

pub const N_NOTES: usize = 127;
pub const LAST_NOTE_ID: u8 = (N_NOTES - 1) as u8;

/// A-4, 440 Hz.
pub const A4_NOTE_ID: u8 = 69;
pub const A4_FREQ: u32 = 440;

pub const DEFAULT_SLIDE_SPEED: u8 = 0x10;

pub const NOISE_SEED: u16 = 0x0101;
pub const DEFAULT_NOISE_PARAMS: u8 = 1;

/// Frames of audio appended after the patch ends while the envelope is still audible.
pub const TAIL_FRAMES: u32 = 60;

const _: () = assert!(SAMPLES_PER_FRAME == 262, "samples-per-frame mismatch");
const _: () = assert!(N_NOTES - 1 == LAST_NOTE_ID as usize);
const _: () = assert!(TREMOLO_WAVE_TABLE < N_WAVE_TABLES);
