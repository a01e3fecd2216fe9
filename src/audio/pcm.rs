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
/// Decoded audio held in memory as interleaved `f32` samples in [-1.0, 1.0].
#[derive(Clone, Debug, PartialEq)]
pub struct PcmBuffer {
    channels: u16,
    sample_rate: u32,
    samples: Vec<f32>,
}

impl PcmBuffer {
    /// Creates a buffer from interleaved samples. A trailing partial frame is dropped.
    pub fn new(channels: u16, sample_rate: u32, mut samples: Vec<f32>) -> PcmBuffer {
        let channels = channels.max(1);
        let whole = samples.len() - samples.len() % channels as usize;
        samples.truncate(whole);
        PcmBuffer {
            channels,
            sample_rate,
            samples,
        }
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Extracts one channel quantized to 16 bits. Asking for a channel a mono
    /// (or narrower) buffer does not have reads its last channel instead, so a
    /// mono recording yields identical left and right data.
    pub fn channel_i16(&self, index: usize) -> Vec<i16> {
        let channels = self.channels as usize;
        let index = index.min(channels - 1);
        self.samples
            .iter()
            .skip(index)
            .step_by(channels)
            .map(|sample| quantize_i16(*sample))
            .collect()
    }
}

/// Quantizes a sample to 16 bits the way the bank has always done it:
/// scale by 32767 and truncate toward zero.
#[inline]
pub fn quantize_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}
