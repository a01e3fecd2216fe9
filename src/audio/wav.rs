// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use super::error::SampleSourceError;
use super::pcm::{quantize_i16, PcmBuffer};

/// Bit depth of every normalized recording.
pub const NORMALIZED_BITS_PER_SAMPLE: u16 = 16;

/// Writes the buffer as a 16-bit integer PCM WAV file, keeping its channel
/// count and sample rate. An existing file is replaced.
pub fn write_pcm16(path: &Path, buffer: &PcmBuffer) -> Result<(), SampleSourceError> {
    let spec = WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: NORMALIZED_BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for sample in buffer.samples() {
        writer.write_sample(quantize_i16(*sample))?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_pcm16() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let buffer = PcmBuffer::new(2, 48000, vec![0.5, -0.5, 1.0, -1.0]);

        write_pcm16(&path, &buffer).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(2, spec.channels);
        assert_eq!(48000, spec.sample_rate);
        assert_eq!(16, spec.bits_per_sample);
        assert_eq!(SampleFormat::Int, spec.sample_format);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(vec![16383, -16383, 32767, -32767], samples);
    }

    #[test]
    fn test_write_pcm16_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        std::fs::write(&path, vec![0u8; 4096]).unwrap();

        write_pcm16(&path, &PcmBuffer::new(1, 22050, vec![0.0, 0.25])).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(2, reader.len());
    }
}
