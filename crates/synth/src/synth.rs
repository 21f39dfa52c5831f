//! Patch interpreter and synthesis engine

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::driver_constants::{
    DEFAULT_NOISE_PARAMS, DEFAULT_NOTE, DEFAULT_SLIDE_SPEED, DEFAULT_TREMOLO_RATE, DEFAULT_VOLUME,
    LAST_NOTE_ID, NOISE_SEED, N_WAVE_TABLES, SAMPLES_PER_FRAME, TAIL_FRAMES, TREMOLO_WAVE_TABLE,
};
use crate::errors::{SynthError, SynthErrorKind};
use crate::patch::{Command, Opcode, Patch};
use crate::step_table::note_step;
use crate::wav_export::export_wave_file;
use crate::wave_tables::WAVE_TABLES;

/// All mutable playback state.  Built fresh for every synthesis run and
/// discarded afterwards.
struct SynthState {
    note: u8,

    /// 8.8 fixed-point wave table position.
    phase: u16,
    /// Per-sample phase increment for the current note.
    track_step: u16,

    note_volume: u8,
    envelope_volume: u8,
    envelope_step: i8,

    wave: usize,

    tremolo_level: u8,
    tremolo_rate: u8,
    tremolo_phase: u8,

    loop_count: u8,

    slide_speed: u8,
    slide_step: i16,
    slide_note: u8,
    sliding: bool,

    noise_barrel: u16,
    noise_params: u8,
    noise_divider: i8,
}

impl SynthState {
    fn new() -> SynthState {
        SynthState {
            note: DEFAULT_NOTE,
            phase: 0,
            track_step: 0,
            note_volume: DEFAULT_VOLUME,
            envelope_volume: 0xff,
            envelope_step: 0,
            wave: 0,
            tremolo_level: 0,
            tremolo_rate: DEFAULT_TREMOLO_RATE,
            tremolo_phase: 0,
            loop_count: 0,
            slide_speed: DEFAULT_SLIDE_SPEED,
            slide_step: 0,
            slide_note: 0,
            sliding: false,
            noise_barrel: NOISE_SEED,
            noise_params: DEFAULT_NOISE_PARAMS,
            noise_divider: 0,
        }
    }
}

struct PatchInterpreter<'a> {
    commands: &'a [Command],
    is_noise: bool,
    s: SynthState,
    samples: Vec<u8>,
}

/// Interprets `patch` into a complete 8-bit mono PCM wave file.
pub fn synthesize_patch(patch: &Patch) -> Result<Vec<u8>, SynthError> {
    Ok(export_wave_file(&synthesize_samples(patch)?))
}

/// Interprets `patch` into raw unsigned 8-bit PCM samples.
///
/// On failure no samples are returned; a failing patch never produces
/// partial audio.
pub fn synthesize_samples(patch: &Patch) -> Result<Vec<u8>, SynthError> {
    PatchInterpreter::new(patch).run()
}

impl<'a> PatchInterpreter<'a> {
    fn new(patch: &'a Patch) -> PatchInterpreter<'a> {
        PatchInterpreter {
            commands: patch.commands(),
            is_noise: patch.is_noise_patch(),
            s: SynthState::new(),
            samples: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<u8>, SynthError> {
        let mut i = 0;
        let mut tail_frames: u32 = 0;

        loop {
            let past_end = i >= self.commands.len();

            let delay = if tail_frames > 0 {
                tail_frames
            } else if past_end {
                0
            } else {
                u32::from(self.commands[i].delay)
            };
            for _ in 0..delay {
                self.run_frame();
            }

            if tail_frames > 0 || past_end || self.commands[i].opcode == Opcode::PatchEnd {
                // Let a still-audible envelope decay instead of clicking off.
                if self.s.envelope_volume == 0 {
                    break;
                }
                if self.s.envelope_step < 0 {
                    tail_frames = 1;
                } else if tail_frames == 0 {
                    tail_frames = TAIL_FRAMES;
                } else {
                    break;
                }
                continue;
            }
            if self.commands[i].opcode == Opcode::NoteCut {
                break;
            }

            i = self.apply_command(i)?;
        }

        Ok(self.samples)
    }

    /// Renders one frame of audio with the current state.
    fn run_frame(&mut self) {
        let s = &mut self.s;

        let e_vol = i16::from(s.envelope_volume) + i16::from(s.envelope_step);
        s.envelope_volume = e_vol.clamp(0, 0xff) as u8;

        if s.sliding {
            s.track_step = s.track_step.wrapping_add_signed(s.slide_step);
            let target = note_step(s.slide_note);

            if (s.slide_step > 0 && s.track_step >= target)
                || (s.slide_step < 0 && s.track_step <= target)
            {
                s.track_step = target;
                s.sliding = false;
            }
        }

        let mut vol = u16::from(s.note_volume);
        if s.note_volume != 0 && s.envelope_volume != 0 {
            vol = (vol * u16::from(s.envelope_volume) + 0x100) >> 8;

            // The driver multiplies a master volume in here.  It is fixed at
            // 0xff, no calculation needed.

            if s.tremolo_level > 0 {
                let t = (WAVE_TABLES[TREMOLO_WAVE_TABLE][usize::from(s.tremolo_phase)] as u8)
                    .wrapping_sub(128);
                let t_vol = (u16::from(s.tremolo_level) * u16::from(t) + 0x100) >> 8;
                vol = (vol * (0xff - t_vol) + 0x100) >> 8;
            }
        } else {
            vol = 0;
        }

        s.tremolo_phase = s.tremolo_phase.wrapping_add(s.tremolo_rate);

        for _ in 0..SAMPLES_PER_FRAME {
            let sample = if self.is_noise {
                self.next_noise_sample()
            } else {
                self.next_wave_sample()
            };

            // 16-bit signed product, truncated down to signed 8 bits, then
            // biased into unsigned PCM range.
            let v = i16::from(sample) * vol as i16;
            self.samples.push((v / 256 + 128) as u8);
        }
    }

    fn next_wave_sample(&mut self) -> i8 {
        let s = &mut self.s;

        let sample = WAVE_TABLES[s.wave][usize::from(s.phase >> 8)];
        s.phase = s.phase.wrapping_add(s.track_step);

        sample
    }

    fn next_noise_sample(&mut self) -> i8 {
        let s = &mut self.s;

        s.noise_divider -= 1;
        if s.noise_divider < 0 {
            s.noise_divider = (s.noise_params >> 1) as i8;

            let feedback = (s.noise_barrel ^ (s.noise_barrel >> 1)) & 1;
            let tap = if s.noise_params & 1 == 1 { 14 } else { 6 };
            s.noise_barrel = (s.noise_barrel >> 1) | (feedback << tap);
        }

        if s.noise_barrel & 1 == 1 {
            127
        } else {
            -128
        }
    }

    /// Applies the command at `i` after its delay has elapsed.
    ///
    /// Returns the index of the next command to execute.  `PATCH_END` and
    /// `NOTE_CUT` never reach this, they are handled in `run`.
    fn apply_command(&mut self, i: usize) -> Result<usize, SynthError> {
        let s = &mut self.s;
        let c = self.commands[i];

        match c.opcode {
            Opcode::EnvSpeed => {
                if !(-128..=127).contains(&c.param) {
                    return Err(SynthError::new(i, SynthErrorKind::InvalidEnvelopeSpeed));
                }
                s.envelope_step = c.param as i8;
            }

            Opcode::NoiseParams => {
                if !(0..=255).contains(&c.param) {
                    return Err(SynthError::new(i, SynthErrorKind::InvalidNoiseParameter));
                }
                s.noise_barrel = NOISE_SEED;
                s.noise_params = c.param as u8;
            }

            Opcode::Wave => {
                if !(0..N_WAVE_TABLES as i32).contains(&c.param) {
                    return Err(SynthError::new(i, SynthErrorKind::InvalidWave));
                }
                s.wave = c.param as usize;
            }

            Opcode::NoteUp | Opcode::NoteDown => {
                let delta = i64::from(c.param);
                let note = match c.opcode {
                    Opcode::NoteUp => i64::from(s.note) + delta,
                    _ => i64::from(s.note) - delta,
                };
                if !(0..=i64::from(LAST_NOTE_ID)).contains(&note) {
                    return Err(SynthError::new(i, SynthErrorKind::InvalidNoteReached));
                }
                s.note = note as u8;
                s.track_step = note_step(s.note);
            }

            Opcode::NoteCut | Opcode::PatchEnd => (),

            Opcode::NoteHold => {
                // Reserved by the sound engine, no effect.
            }

            Opcode::EnvVol => {
                if !(0..=255).contains(&c.param) {
                    return Err(SynthError::new(i, SynthErrorKind::InvalidEnvelopeVolume));
                }
                s.envelope_volume = c.param as u8;
            }

            Opcode::Pitch => {
                if !(0..=i32::from(LAST_NOTE_ID)).contains(&c.param) {
                    return Err(SynthError::new(i, SynthErrorKind::InvalidNote));
                }
                s.note = c.param as u8;
                s.track_step = note_step(s.note);
                s.sliding = false;
            }

            Opcode::TremoloLevel => {
                if !(0..=255).contains(&c.param) {
                    return Err(SynthError::new(i, SynthErrorKind::InvalidTremoloLevel));
                }
                s.tremolo_level = c.param as u8;
            }

            Opcode::TremoloRate => {
                if !(0..=255).contains(&c.param) {
                    return Err(SynthError::new(i, SynthErrorKind::InvalidTremoloRate));
                }
                s.tremolo_rate = c.param as u8;
            }

            Opcode::Slide => {
                let target = i64::from(s.note) + i64::from(c.param);
                if !(0..=i64::from(LAST_NOTE_ID)).contains(&target) {
                    return Err(SynthError::new(i, SynthErrorKind::InvalidSlideNote));
                }
                let target = target as u8;

                let delta = i32::from(note_step(target)) - i32::from(note_step(s.note));
                // A slide speed of 0 would divide by zero, treat it as 1.
                let speed = i32::from(s.slide_speed).max(1);

                let mut step = delta / speed;
                if step == 0 {
                    step = if delta < 0 { -1 } else { 1 };
                }

                s.slide_step = step as i16;
                s.slide_note = target;
                s.track_step = s.track_step.wrapping_add_signed(s.slide_step);
                s.sliding = true;
            }

            Opcode::SlideSpeed => {
                if !(0..=255).contains(&c.param) {
                    return Err(SynthError::new(i, SynthErrorKind::InvalidSlideSpeed));
                }
                s.slide_speed = c.param as u8;
            }

            Opcode::LoopStart => {
                if !(0..=255).contains(&c.param) {
                    return Err(SynthError::new(i, SynthErrorKind::InvalidLoopCount));
                }
                s.loop_count = c.param as u8;
            }

            Opcode::LoopEnd => return self.loop_end(i, c.param),
        }

        Ok(i + 1)
    }

    /// Resolves a `LOOP_END` at command index `i`.
    fn loop_end(&mut self, i: usize, param: i32) -> Result<usize, SynthError> {
        if !(0..=255).contains(&param) {
            return Err(SynthError::new(i, SynthErrorKind::InvalidLoopEndJump));
        }
        let jump = param as usize;
        if jump > i {
            return Err(SynthError::new(
                i,
                SynthErrorKind::LoopEndJumpToNegativeCommand,
            ));
        }

        if self.s.loop_count == 0 {
            return Ok(i + 1);
        }
        self.s.loop_count -= 1;

        if jump > 0 {
            // Jumping over a loop start would re-enter that loop without
            // ever decrementing its counter.
            for k in (i - jump..i).rev() {
                if self.commands[k].opcode == Opcode::LoopStart {
                    return Err(SynthError::new(
                        i,
                        SynthErrorKind::LoopEndJumpBeforeLoopStart,
                    ));
                }
            }
            Ok(i - jump)
        } else {
            // Jump to the nearest preceding loop start, resuming just after
            // it so the loop counter is not re-armed.
            let mut k = i;
            while k > 0 {
                k -= 1;
                if self.commands[k].opcode == Opcode::LoopStart {
                    return Ok(k + 1);
                }
            }
            Err(SynthError::new(i, SynthErrorKind::NoPreviousLoopStart))
        }
    }
}
