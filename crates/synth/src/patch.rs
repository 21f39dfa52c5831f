//! Patch command data model

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::errors::{PatchError, ValueError};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

use std::str::FromStr;

// Command codes MUST match the console sound engine headers.
pub mod command_codes {
    pub const ENV_SPEED: u8 = 0;
    pub const NOISE_PARAMS: u8 = 1;
    pub const WAVE: u8 = 2;
    pub const NOTE_UP: u8 = 3;
    pub const NOTE_DOWN: u8 = 4;
    pub const NOTE_CUT: u8 = 5;
    pub const NOTE_HOLD: u8 = 6;
    pub const ENV_VOL: u8 = 7;
    pub const PITCH: u8 = 8;
    pub const TREMOLO_LEVEL: u8 = 9;
    pub const TREMOLO_RATE: u8 = 10;
    pub const SLIDE: u8 = 11;
    pub const SLIDE_SPEED: u8 = 12;
    pub const LOOP_START: u8 = 13;
    pub const LOOP_END: u8 = 14;
    pub const PATCH_END: u8 = 15;
}

pub const N_OPCODES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    EnvSpeed,
    NoiseParams,
    Wave,
    NoteUp,
    NoteDown,
    NoteCut,
    NoteHold,
    EnvVol,
    Pitch,
    TremoloLevel,
    TremoloRate,
    Slide,
    SlideSpeed,
    LoopStart,
    LoopEnd,
    PatchEnd,
}

impl Opcode {
    pub const fn code(self) -> u8 {
        match self {
            Opcode::EnvSpeed => command_codes::ENV_SPEED,
            Opcode::NoiseParams => command_codes::NOISE_PARAMS,
            Opcode::Wave => command_codes::WAVE,
            Opcode::NoteUp => command_codes::NOTE_UP,
            Opcode::NoteDown => command_codes::NOTE_DOWN,
            Opcode::NoteCut => command_codes::NOTE_CUT,
            Opcode::NoteHold => command_codes::NOTE_HOLD,
            Opcode::EnvVol => command_codes::ENV_VOL,
            Opcode::Pitch => command_codes::PITCH,
            Opcode::TremoloLevel => command_codes::TREMOLO_LEVEL,
            Opcode::TremoloRate => command_codes::TREMOLO_RATE,
            Opcode::Slide => command_codes::SLIDE,
            Opcode::SlideSpeed => command_codes::SLIDE_SPEED,
            Opcode::LoopStart => command_codes::LOOP_START,
            Opcode::LoopEnd => command_codes::LOOP_END,
            Opcode::PatchEnd => command_codes::PATCH_END,
        }
    }

    pub fn from_code(code: u8) -> Option<Opcode> {
        match code {
            command_codes::ENV_SPEED => Some(Opcode::EnvSpeed),
            command_codes::NOISE_PARAMS => Some(Opcode::NoiseParams),
            command_codes::WAVE => Some(Opcode::Wave),
            command_codes::NOTE_UP => Some(Opcode::NoteUp),
            command_codes::NOTE_DOWN => Some(Opcode::NoteDown),
            command_codes::NOTE_CUT => Some(Opcode::NoteCut),
            command_codes::NOTE_HOLD => Some(Opcode::NoteHold),
            command_codes::ENV_VOL => Some(Opcode::EnvVol),
            command_codes::PITCH => Some(Opcode::Pitch),
            command_codes::TREMOLO_LEVEL => Some(Opcode::TremoloLevel),
            command_codes::TREMOLO_RATE => Some(Opcode::TremoloRate),
            command_codes::SLIDE => Some(Opcode::Slide),
            command_codes::SLIDE_SPEED => Some(Opcode::SlideSpeed),
            command_codes::LOOP_START => Some(Opcode::LoopStart),
            command_codes::LOOP_END => Some(Opcode::LoopEnd),
            command_codes::PATCH_END => Some(Opcode::PatchEnd),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Opcode::EnvSpeed => "ENV_SPEED",
            Opcode::NoiseParams => "NOISE_PARAMS",
            Opcode::Wave => "WAVE",
            Opcode::NoteUp => "NOTE_UP",
            Opcode::NoteDown => "NOTE_DOWN",
            Opcode::NoteCut => "NOTE_CUT",
            Opcode::NoteHold => "NOTE_HOLD",
            Opcode::EnvVol => "ENV_VOL",
            Opcode::Pitch => "PITCH",
            Opcode::TremoloLevel => "TREMOLO_LEVEL",
            Opcode::TremoloRate => "TREMOLO_RATE",
            Opcode::Slide => "SLIDE",
            Opcode::SlideSpeed => "SLIDE_SPEED",
            Opcode::LoopStart => "LOOP_START",
            Opcode::LoopEnd => "LOOP_END",
            Opcode::PatchEnd => "PATCH_END",
        }
    }
}

impl FromStr for Opcode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The console headers spell these `PC_ENV_SPEED`, except for `PATCH_END`.
        let n = s.strip_prefix("PC_").unwrap_or(s);

        match n {
            "ENV_SPEED" => Ok(Opcode::EnvSpeed),
            "NOISE_PARAMS" => Ok(Opcode::NoiseParams),
            "WAVE" => Ok(Opcode::Wave),
            "NOTE_UP" => Ok(Opcode::NoteUp),
            "NOTE_DOWN" => Ok(Opcode::NoteDown),
            "NOTE_CUT" => Ok(Opcode::NoteCut),
            "NOTE_HOLD" => Ok(Opcode::NoteHold),
            "ENV_VOL" => Ok(Opcode::EnvVol),
            "PITCH" => Ok(Opcode::Pitch),
            "TREMOLO_LEVEL" => Ok(Opcode::TremoloLevel),
            "TREMOLO_RATE" => Ok(Opcode::TremoloRate),
            "SLIDE" => Ok(Opcode::Slide),
            "SLIDE_SPEED" => Ok(Opcode::SlideSpeed),
            "LOOP_START" => Ok(Opcode::LoopStart),
            "LOOP_END" => Ok(Opcode::LoopEnd),
            "PATCH_END" => Ok(Opcode::PatchEnd),
            _ => Err(ValueError::UnknownOpcodeName(s.to_owned())),
        }
    }
}

impl<'de> Deserialize<'de> for Opcode {
    fn deserialize<D>(deserializer: D) -> Result<Opcode, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OpcodeVisitor;

        impl Visitor<'_> for OpcodeVisitor {
            type Value = Opcode;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a patch command name or code")
            }

            fn visit_str<E: de::Error>(self, s: &str) -> Result<Opcode, E> {
                s.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Opcode, E> {
                u8::try_from(v)
                    .ok()
                    .and_then(Opcode::from_code)
                    .ok_or_else(|| E::custom(ValueError::UnknownOpcodeCode(v)))
            }
        }

        deserializer.deserialize_any(OpcodeVisitor)
    }
}

/// One patch command.
///
/// `delay` frames of audio are rendered with the current synthesis state
/// before the opcode takes effect.  The valid range and signedness of
/// `param` depend on the opcode and are checked by the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub delay: u8,
    pub opcode: Opcode,
    pub param: i32,
}

/// An ordered program of commands describing one sound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    commands: Vec<Command>,
}

impl Patch {
    pub fn new(commands: Vec<Command>) -> Patch {
        Patch { commands }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds a patch out of the flat `delay, opcode, parameter, ...` value
    /// list emitted by the patch importers.
    pub fn from_flat_values(values: &[i32]) -> Result<Patch, PatchError> {
        if values.len() % 3 != 0 {
            return Err(PatchError::NotCommandTriples(values.len()));
        }

        let mut commands = Vec::with_capacity(values.len() / 3);

        for (i, v) in values.chunks_exact(3).enumerate() {
            let delay = match u8::try_from(v[0]) {
                Ok(d) => d,
                Err(_) => {
                    return Err(PatchError::DelayOutOfRange {
                        command: i + 1,
                        value: v[0],
                    })
                }
            };
            let opcode = match u8::try_from(v[1]).ok().and_then(Opcode::from_code) {
                Some(o) => o,
                None => {
                    return Err(PatchError::UnknownOpcode {
                        command: i + 1,
                        code: v[1],
                    })
                }
            };

            commands.push(Command {
                delay,
                opcode,
                param: v[2],
            });
        }

        Ok(Patch { commands })
    }

    /// A patch is noise-driven if any of its commands is `NOISE_PARAMS`.
    ///
    /// The mode is decided for the whole patch before synthesis begins;
    /// mixing wavetable and noise output in one patch is not representable.
    pub fn is_noise_patch(&self) -> bool {
        self.commands
            .iter()
            .any(|c| c.opcode == Opcode::NoiseParams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_codes_round_trip() {
        for code in 0..N_OPCODES as u8 {
            let op = Opcode::from_code(code).unwrap();
            assert_eq!(op.code(), code);
            assert_eq!(op.name().parse::<Opcode>().unwrap(), op);
        }
        assert!(Opcode::from_code(16).is_none());
    }

    #[test]
    fn opcode_names_accept_console_prefix() {
        assert_eq!("PC_NOTE_UP".parse::<Opcode>().unwrap(), Opcode::NoteUp);
        assert_eq!("PATCH_END".parse::<Opcode>().unwrap(), Opcode::PatchEnd);
        assert!("NOTE_SIDEWAYS".parse::<Opcode>().is_err());
    }

    #[test]
    fn flat_values() {
        let p = Patch::from_flat_values(&[0, 8, 60, 10, 15, 0]).unwrap();
        assert_eq!(
            p.commands(),
            &[
                Command {
                    delay: 0,
                    opcode: Opcode::Pitch,
                    param: 60
                },
                Command {
                    delay: 10,
                    opcode: Opcode::PatchEnd,
                    param: 0
                },
            ]
        );
        assert!(!p.is_noise_patch());

        assert_eq!(
            Patch::from_flat_values(&[0, 8]),
            Err(PatchError::NotCommandTriples(2))
        );
        assert_eq!(
            Patch::from_flat_values(&[256, 8, 60]),
            Err(PatchError::DelayOutOfRange {
                command: 1,
                value: 256
            })
        );
        assert_eq!(
            Patch::from_flat_values(&[0, 15, 0, 0, 99, 0]),
            Err(PatchError::UnknownOpcode {
                command: 2,
                code: 99
            })
        );
    }

    #[test]
    fn noise_patch_scan() {
        let p = Patch::from_flat_values(&[0, 7, 128, 0, 1, 3, 60, 15, 0]).unwrap();
        assert!(p.is_noise_patch());
    }
}
