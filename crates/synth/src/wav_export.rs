//! Mono 8-bit PCM wave file export

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::driver_constants::SAMPLE_RATE;

pub const WAVE_HEADER_LEN: usize = 44;

const WAVE_CHUNK_ID: [u8; 4] = [b'R', b'I', b'F', b'F'];
const WAVE_ID: [u8; 4] = [b'W', b'A', b'V', b'E'];
const FMT_CHUNK_ID: [u8; 4] = [b'f', b'm', b't', b' '];
const DATA_CHUNK_ID: [u8; 4] = [b'd', b'a', b't', b'a'];

const FMT_CHUNK_SIZE: u32 = 16;
const WAV_FORMAT_PCM_FORMAT: u16 = 1;

const N_CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 8;

// One byte per sample frame.
const BYTE_RATE: u32 = SAMPLE_RATE;
const BLOCK_ALIGN: u16 = 1;

/// Wraps unsigned 8-bit mono PCM samples in an uncompressed wave file.
///
/// An empty sample buffer is allowed and produces a header-only file.
/// The data chunk is padded to an even byte length.
pub fn export_wave_file(samples: &[u8]) -> Vec<u8> {
    let data_size = samples.len();
    let subchunk2_size = if data_size % 2 == 1 {
        data_size + 1
    } else {
        data_size
    };
    let chunk_size = subchunk2_size + WAVE_HEADER_LEN - 8;

    let mut out = Vec::with_capacity(WAVE_HEADER_LEN + subchunk2_size);

    out.extend_from_slice(&WAVE_CHUNK_ID);
    out.extend_from_slice(&(chunk_size as u32).to_le_bytes());
    out.extend_from_slice(&WAVE_ID);

    out.extend_from_slice(&FMT_CHUNK_ID);
    out.extend_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
    out.extend_from_slice(&WAV_FORMAT_PCM_FORMAT.to_le_bytes());
    out.extend_from_slice(&N_CHANNELS.to_le_bytes());
    out.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    out.extend_from_slice(&BYTE_RATE.to_le_bytes());
    out.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    out.extend_from_slice(&DATA_CHUNK_ID);
    out.extend_from_slice(&(subchunk2_size as u32).to_le_bytes());

    assert!(out.len() == WAVE_HEADER_LEN);

    out.extend_from_slice(samples);
    if data_size % 2 == 1 {
        out.push(0);
    }

    out
}
