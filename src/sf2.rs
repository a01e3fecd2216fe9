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
//! SoundFont 2 bank description and writer.
//!
//! The types here describe a bank in memory: samples, instruments with zones
//! of generators and modulators, and presets pointing at instruments. The
//! [`writer`] module serializes them into the RIFF `sfbk` container.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::KitError;

pub mod writer;

/// Generator operators used by the bank.
pub mod generator {
    pub const PAN: u16 = 17;
    pub const DECAY_VOL_ENV: u16 = 36;
    pub const SUSTAIN_VOL_ENV: u16 = 37;
    pub const INSTRUMENT: u16 = 41;
    pub const KEY_RANGE: u16 = 43;
    pub const VEL_RANGE: u16 = 44;
    pub const INITIAL_ATTENUATION: u16 = 48;
    pub const COARSE_TUNE: u16 = 51;
    pub const SAMPLE_ID: u16 = 53;
    pub const SAMPLE_MODES: u16 = 54;
}

/// Modulator source operators used by the bank.
pub mod source {
    /// Note-on velocity, negative direction.
    pub const NOTE_ON_VELOCITY_NEGATIVE: u16 = 0x0102;
    /// Pitch wheel, bipolar.
    pub const PITCH_WHEEL_BIPOLAR: u16 = 0x020E;
    /// No controller, bipolar.
    pub const NONE_BIPOLAR: u16 = 0x0200;
    /// No controller.
    pub const NONE: u16 = 0x0000;
}

/// The linear modulator transform.
pub const TRANSFORM_LINEAR: u16 = 0;

/// Target sound engine every bank declares.
pub const SOUND_ENGINE: &str = "EMU8000";

/// Bank metadata stored in the INFO list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Info {
    pub name: String,
    pub version: (u16, u16),
    pub creation_date: String,
    pub engineers: String,
    pub product: String,
    pub copyright: String,
    pub comment: String,
    pub software: String,
}

/// Channel role of a sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleKind {
    Mono,
    Right,
    Left,
}

impl SampleKind {
    fn code(self) -> u16 {
        match self {
            SampleKind::Mono => 1,
            SampleKind::Right => 2,
            SampleKind::Left => 4,
        }
    }
}

/// One channel of sample data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    pub name: String,
    pub data: Vec<i16>,
    pub sample_rate: u32,
    pub original_pitch: u8,
    pub pitch_correction: i8,
    /// Loop points relative to the first point of `data`.
    pub loop_start: u32,
    pub loop_end: u32,
    /// Index of the other half of a stereo pair.
    pub link: u16,
    pub kind: SampleKind,
}

/// A generator amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Amount {
    Signed(i16),
    Unsigned(u16),
    Range(u8, u8),
}

impl Amount {
    fn to_bytes(self) -> [u8; 2] {
        match self {
            Amount::Signed(value) => value.to_le_bytes(),
            Amount::Unsigned(value) => value.to_le_bytes(),
            Amount::Range(low, high) => [low, high],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Generator {
    pub operator: u16,
    pub amount: Amount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Modulator {
    pub source: u16,
    pub destination: u16,
    pub amount: i16,
    pub amount_source: u16,
    pub transform: u16,
}

/// A preset or instrument zone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Zone {
    generators: Vec<Generator>,
    modulators: Vec<Modulator>,
}

impl Zone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_range(self, low: u8, high: u8) -> Self {
        self.generator(generator::KEY_RANGE, Amount::Range(low, high))
    }

    pub fn velocity_range(self, low: u8, high: u8) -> Self {
        self.generator(generator::VEL_RANGE, Amount::Range(low, high))
    }

    pub fn sample(self, index: u16) -> Self {
        self.generator(generator::SAMPLE_ID, Amount::Unsigned(index))
    }

    pub fn instrument(self, index: u16) -> Self {
        self.generator(generator::INSTRUMENT, Amount::Unsigned(index))
    }

    pub fn generator(mut self, operator: u16, amount: Amount) -> Self {
        self.generators.push(Generator { operator, amount });
        self
    }

    pub fn modulator(mut self, modulator: Modulator) -> Self {
        self.modulators.push(modulator);
        self
    }

    pub fn modulators(&self) -> &[Modulator] {
        &self.modulators
    }

    /// Generators in the order the format requires: key range first, velocity
    /// range second, the sample or instrument reference last, everything else
    /// in between in the order it was added.
    pub fn ordered_generators(&self) -> Vec<Generator> {
        let rank = |entry: &Generator| match entry.operator {
            generator::KEY_RANGE => 0,
            generator::VEL_RANGE => 1,
            generator::SAMPLE_ID | generator::INSTRUMENT => 3,
            _ => 2,
        };
        let mut ordered = self.generators.clone();
        ordered.sort_by_key(rank);
        ordered
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instrument {
    pub name: String,
    pub zones: Vec<Zone>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preset {
    pub name: String,
    pub preset: u16,
    pub bank: u16,
    pub zones: Vec<Zone>,
}

/// A complete bank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoundFont {
    pub info: Info,
    pub samples: Vec<Sample>,
    pub instruments: Vec<Instrument>,
    pub presets: Vec<Preset>,
}

/// Writes the bank to `path`.
///
/// The bank is written to a temporary file next to `path` and moved over it
/// once complete, so a failure never leaves a partial bank behind.
pub fn write_file(font: &SoundFont, path: &Path) -> Result<(), KitError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory).map_err(|e| KitError::io(directory, e))?;

    let mut temporary = NamedTempFile::new_in(directory).map_err(|e| KitError::io(directory, e))?;
    {
        let mut output = BufWriter::new(temporary.as_file_mut());
        writer::write(font, &mut output, path)?;
        output.flush().map_err(|e| KitError::io(path, e))?;
    }
    temporary
        .as_file()
        .sync_all()
        .map_err(|e| KitError::io(path, e))?;
    temporary
        .persist(path)
        .map_err(|e| KitError::io(path, e.error))?;

    info!(path = ?path, samples = font.samples.len(), "Wrote bank");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_order() {
        let zone = Zone::new()
            .sample(3)
            .generator(generator::PAN, Amount::Signed(-496))
            .velocity_range(0, 42)
            .generator(generator::SAMPLE_MODES, Amount::Unsigned(0))
            .key_range(36, 36);

        let operators: Vec<u16> = zone
            .ordered_generators()
            .iter()
            .map(|entry| entry.operator)
            .collect();

        assert_eq!(
            vec![
                generator::KEY_RANGE,
                generator::VEL_RANGE,
                generator::PAN,
                generator::SAMPLE_MODES,
                generator::SAMPLE_ID
            ],
            operators
        );
    }

    fn font(samples: usize) -> SoundFont {
        let sample = Sample {
            name: "S".to_string(),
            data: vec![0, 1, 2],
            sample_rate: 44100,
            original_pitch: 60,
            pitch_correction: 0,
            loop_start: 0,
            loop_end: 2,
            link: 0,
            kind: SampleKind::Mono,
        };
        SoundFont {
            info: Info {
                name: "Test".to_string(),
                version: (2, 1),
                creation_date: String::new(),
                engineers: String::new(),
                product: String::new(),
                copyright: String::new(),
                comment: String::new(),
                software: String::new(),
            },
            samples: vec![sample; samples],
            instruments: vec![Instrument {
                name: "kit".to_string(),
                zones: vec![Zone::new().key_range(60, 60).sample(0)],
            }],
            presets: vec![Preset {
                name: "kit".to_string(),
                preset: 0,
                bank: 128,
                zones: vec![Zone::new().instrument(0)],
            }],
        }
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("kit.sf2");

        write_file(&font(1), &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(b"RIFF", &bytes[0..4]);
        assert_eq!(1, fs::read_dir(path.parent().unwrap()).unwrap().count());
    }

    #[test]
    fn test_failed_write_keeps_previous_bank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kit.sf2");
        fs::write(&path, b"previous bank").unwrap();

        let result = write_file(&font(70000), &path);

        assert!(matches!(result, Err(KitError::Limit(_))));
        assert_eq!(b"previous bank".to_vec(), fs::read(&path).unwrap());
        // The temporary file is gone as well.
        assert_eq!(1, fs::read_dir(dir.path()).unwrap().count());
    }

    #[test]
    fn test_amount_encoding() {
        assert_eq!([0x10, 0xfe], Amount::Signed(-496).to_bytes());
        assert_eq!([0xf0, 0x01], Amount::Signed(496).to_bytes());
        assert_eq!([36, 40], Amount::Range(36, 40).to_bytes());
        assert_eq!([2, 0], Amount::Unsigned(2).to_bytes());
    }
}
