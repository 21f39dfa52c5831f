//! A single location for all of the errors in the synthesiser

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use std::fmt::Display;
use std::io;

#[derive(Debug)]
pub enum DeserializeError {
    OpenError(String, io::Error),
    SerdeError(String, serde_json::error::Error),
}

#[derive(Debug)]
pub enum ValueError {
    InvalidName(String),
    UnknownOpcodeName(String),
    UnknownOpcodeCode(u64),
}

/// Structural error in a flat `(delay, opcode, parameter)` command list.
///
/// `command` is 1-based, matching the indexes shown by the patch editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchError {
    NotCommandTriples(usize),
    DelayOutOfRange { command: usize, value: i32 },
    UnknownOpcode { command: usize, code: i32 },
}

#[derive(Debug)]
pub enum PatchFileError {
    DuplicateName(usize, String),
}

#[derive(Debug)]
pub struct PatchFileErrors(pub Vec<PatchFileError>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthErrorKind {
    InvalidEnvelopeSpeed,
    InvalidNoiseParameter,
    InvalidWave,
    InvalidNoteReached,
    InvalidNote,
    InvalidEnvelopeVolume,
    InvalidTremoloLevel,
    InvalidTremoloRate,
    InvalidSlideNote,
    InvalidSlideSpeed,
    InvalidLoopCount,
    InvalidLoopEndJump,
    LoopEndJumpToNegativeCommand,
    LoopEndJumpBeforeLoopStart,
    NoPreviousLoopStart,
}

/// Synthesis failure, reported against the 1-based index of the failing command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthError {
    pub command: usize,
    pub kind: SynthErrorKind,
}

impl SynthError {
    /// `command_index` is the 0-based index into the command list.
    pub(crate) fn new(command_index: usize, kind: SynthErrorKind) -> Self {
        Self {
            command: command_index + 1,
            kind,
        }
    }
}

impl Display for DeserializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeserializeError::OpenError(file_name, e) => {
                write!(f, "Unable to open {}: {}", file_name, e)
            }
            DeserializeError::SerdeError(file_name, e) => write!(f, "Error in {}: {}", file_name, e),
        }
    }
}

impl Display for ValueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueError::InvalidName(s) => write!(f, "invalid name: {}", s),
            ValueError::UnknownOpcodeName(s) => write!(f, "unknown patch command: {}", s),
            ValueError::UnknownOpcodeCode(c) => write!(f, "unknown patch command code: {}", c),
        }
    }
}

impl Display for PatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatchError::NotCommandTriples(len) => {
                write!(f, "command list length {} is not a multiple of 3", len)
            }
            PatchError::DelayOutOfRange { command, value } => {
                write!(f, "Command {}: delay {} out of range", command, value)
            }
            PatchError::UnknownOpcode { command, code } => {
                write!(f, "Command {}: unknown patch command code {}", command, code)
            }
        }
    }
}

impl Display for PatchFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatchFileError::DuplicateName(i, name) => {
                write!(f, "Patch {}: duplicate name: {}", i + 1, name)
            }
        }
    }
}

impl Display for PatchFileErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i != 0 {
                writeln!(f)?;
            }
            e.fmt(f)?;
        }
        Ok(())
    }
}

impl Display for SynthErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SynthErrorKind::InvalidEnvelopeSpeed => "Invalid envelope speed",
            SynthErrorKind::InvalidNoiseParameter => "Invalid noise parameter",
            SynthErrorKind::InvalidWave => "Invalid wave",
            SynthErrorKind::InvalidNoteReached => "Invalid note reached",
            SynthErrorKind::InvalidNote => "Invalid note",
            SynthErrorKind::InvalidEnvelopeVolume => "Invalid envelope volume",
            SynthErrorKind::InvalidTremoloLevel => "Invalid tremolo level",
            SynthErrorKind::InvalidTremoloRate => "Invalid tremolo rate",
            SynthErrorKind::InvalidSlideNote => "Invalid slide note",
            SynthErrorKind::InvalidSlideSpeed => "Invalid slide speed",
            SynthErrorKind::InvalidLoopCount => "Invalid loop count",
            SynthErrorKind::InvalidLoopEndJump => "Invalid loop end jump",
            SynthErrorKind::LoopEndJumpToNegativeCommand => "Loop end jump to negative command",
            SynthErrorKind::LoopEndJumpBeforeLoopStart => {
                "Loop end jump to before a loop start causes infinite loop"
            }
            SynthErrorKind::NoPreviousLoopStart => "No previous loop start",
        };
        f.write_str(s)
    }
}

impl Display for SynthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Command {}: {}", self.command, self.kind)
    }
}
