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
use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};
use tracing::debug;

use super::error::SampleSourceError;
use super::pcm::PcmBuffer;

/// Decodes an entire audio file (FLAC, WAV, and anything else symphonia
/// understands) into memory.
pub fn decode_file(path: &Path) -> Result<PcmBuffer, SampleSourceError> {
    // Include the path so the user sees which file failed.
    let file = File::open(path).map_err(|e| {
        SampleSourceError::IoError(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();
    let file_path = path.to_string_lossy().to_string();
    let probed = get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| {
            SampleSourceError::SampleConversionFailed(format!("'{}': {}", file_path, e))
        })?;
    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| {
            SampleSourceError::SampleConversionFailed(format!("'{}': no audio track", file_path))
        })?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let sample_rate = params.sample_rate.ok_or_else(|| {
        SampleSourceError::SampleConversionFailed(format!(
            "'{}': sample rate not specified",
            file_path
        ))
    })?;

    let decoder_opts: DecoderOptions = Default::default();
    let mut decoder = get_codecs().make(&params, &decoder_opts).map_err(|e| {
        SampleSourceError::SampleConversionFailed(format!("'{}': {}", file_path, e))
    })?;

    // A value of 0 means the container did not say; the first decoded buffer
    // settles it.
    let mut channels = params.channels.map(|c| c.count()).unwrap_or(0);
    let mut samples = Vec::new();
    while let Some((decoded, decoded_channels)) =
        read_and_decode_next_packet_for_track(format_reader.as_mut(), decoder.as_mut(), track_id)?
    {
        if channels == 0 {
            channels = decoded_channels;
        } else if channels != decoded_channels {
            return Err(SampleSourceError::SampleConversionFailed(format!(
                "'{}': channel count changed from {} to {}",
                file_path, channels, decoded_channels
            )));
        }
        samples.extend_from_slice(&decoded);
    }

    if channels == 0 {
        return Err(SampleSourceError::SampleConversionFailed(format!(
            "'{}': channels not specified",
            file_path
        )));
    }

    let channels = u16::try_from(channels).map_err(|_| {
        SampleSourceError::SampleConversionFailed(format!(
            "'{}': {} channels are too many",
            file_path, channels
        ))
    })?;

    // A stream that ends early reads like a clean end of stream.
    let frames = samples.len() / channels as usize;
    if let Some(expected) = params.n_frames.filter(|n| *n > 0) {
        if frames as u64 != expected {
            return Err(SampleSourceError::SampleConversionFailed(format!(
                "'{}': decoded {} of {} frames",
                file_path, frames, expected
            )));
        }
    }

    debug!(
        path = ?path,
        channels,
        sample_rate,
        frames,
        "Decoded"
    );

    Ok(PcmBuffer::new(channels, sample_rate, samples))
}

/// Reads the next packet with common error handling.
/// Returns:
/// - `Ok(Some(packet))` if a packet was successfully read
/// - `Ok(None)` if EOF was reached
/// - `Err(...)` for anything else, including ResetRequired so callers can reset the decoder
fn read_next_packet(
    format_reader: &mut dyn FormatReader,
) -> Result<Option<Packet>, SampleSourceError> {
    match format_reader.next_packet() {
        Ok(packet) => Ok(Some(packet)),
        Err(SymphoniaError::ResetRequired) => {
            Err(SampleSourceError::AudioError(SymphoniaError::ResetRequired))
        }
        Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Ok(None)
        }
        Err(e) => Err(SampleSourceError::AudioError(e)),
    }
}

/// Reads and decodes the next packet for the given track. Handles ResetRequired by
/// resetting the decoder and retrying. Returns `Ok(Some((samples, channels)))` when
/// a packet was decoded, `Ok(None)` on EOF, or `Err` on other errors.
fn read_and_decode_next_packet_for_track(
    format_reader: &mut dyn FormatReader,
    decoder: &mut dyn Decoder,
    track_id: u32,
) -> Result<Option<(Vec<f32>, usize)>, SampleSourceError> {
    loop {
        let packet = match read_next_packet(format_reader) {
            Ok(Some(packet)) => packet,
            Ok(None) => return Ok(None),
            Err(SampleSourceError::AudioError(SymphoniaError::ResetRequired)) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(e),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                decoder.decode(&packet)?
            }
            Err(e) => return Err(SampleSourceError::AudioError(e)),
        };
        let (samples, channels) = decode_buffer_to_f32(decoded);
        // Header packets of some formats decode to nothing.
        if channels > 0 && !samples.is_empty() {
            return Ok(Some((samples, channels)));
        }
    }
}

/// Converts a decoded AudioBufferRef to interleaved `f32` samples and returns
/// the channel count observed in the decoded buffer.
fn decode_buffer_to_f32(decoded: AudioBufferRef) -> (Vec<f32>, usize) {
    match decoded {
        AudioBufferRef::F32(buf) => interleave_planar_samples(&buf, |sample| sample),
        AudioBufferRef::F64(buf) => interleave_planar_samples(&buf, |sample| sample as f32),
        AudioBufferRef::S8(buf) => interleave_planar_samples(&buf, scale_s8),
        AudioBufferRef::S16(buf) => interleave_planar_samples(&buf, scale_s16),
        AudioBufferRef::S24(buf) => {
            interleave_planar_samples(&buf, |sample| scale_s24(sample.inner()))
        }
        AudioBufferRef::S32(buf) => interleave_planar_samples(&buf, scale_s32),
        AudioBufferRef::U8(buf) => interleave_planar_samples(&buf, scale_u8),
        AudioBufferRef::U16(buf) => interleave_planar_samples(&buf, scale_u16),
        AudioBufferRef::U24(buf) => {
            interleave_planar_samples(&buf, |sample| scale_u24(sample.inner()))
        }
        AudioBufferRef::U32(buf) => interleave_planar_samples(&buf, scale_u32),
    }
}

/// Interleaves the planes of a decoded buffer, converting each sample with `convert`.
fn interleave_planar_samples<T, F>(buf: &AudioBuffer<T>, convert: F) -> (Vec<f32>, usize)
where
    T: symphonia::core::sample::Sample,
    F: Fn(T) -> f32,
{
    let frames = buf.frames();
    let channels = buf.spec().channels.count();
    let planes = buf.planes();
    let mut samples = Vec::with_capacity(frames * channels);
    for frame_idx in 0..frames {
        for plane in planes.planes().iter().take(channels) {
            samples.push(convert(plane[frame_idx]));
        }
    }
    (samples, channels)
}

// Scaling helpers for all integer formats.

#[inline]
pub(crate) fn scale_s8(sample: i8) -> f32 {
    sample as f32 / (1i64 << 7) as f32
}

#[inline]
pub(crate) fn scale_s16(sample: i16) -> f32 {
    sample as f32 / (1i64 << 15) as f32
}

#[inline]
pub(crate) fn scale_s24(sample: i32) -> f32 {
    sample as f32 / (1i64 << 23) as f32
}

#[inline]
pub(crate) fn scale_s32(sample: i32) -> f32 {
    sample as f32 / (1i64 << 31) as f32
}

#[inline]
pub(crate) fn scale_u8(sample: u8) -> f32 {
    (sample as f32 / u8::MAX as f32) * 2.0 - 1.0
}

#[inline]
pub(crate) fn scale_u16(sample: u16) -> f32 {
    (sample as f32 / u16::MAX as f32) * 2.0 - 1.0
}

#[inline]
pub(crate) fn scale_u24(sample: u32) -> f32 {
    let max = (1u32 << 24) - 1;
    (sample as f32 / max as f32) * 2.0 - 1.0
}

#[inline]
pub(crate) fn scale_u32(sample: u32) -> f32 {
    (sample as f32 / u32::MAX as f32) * 2.0 - 1.0
}
