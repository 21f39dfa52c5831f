//! Sound patch synthesiser for the console audio driver

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)]

pub mod data;
pub mod driver_constants;
pub mod errors;
pub mod patch;
pub mod step_table;
pub mod synth;
pub mod wav_export;
pub mod wave_tables;

pub use patch::{Command, Opcode, Patch};
pub use synth::{synthesize_patch, synthesize_samples};
