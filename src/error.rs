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
use std::path::PathBuf;

use crate::audio::SampleSourceError;
use crate::config::ConfigError;

/// Errors that abort a bank compilation.
#[derive(Debug, thiserror::Error)]
pub enum KitError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to convert {}: {source}", path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: SampleSourceError,
    },

    /// A file matched a family grammar but carries a code the grammar does not know.
    #[error("Unexpected {axis} code '{code}' in {family} file {}", file.display())]
    Classification {
        family: &'static str,
        axis: &'static str,
        code: String,
        file: PathBuf,
    },

    #[error("Wrote too few bytes (wrote {wrote} expected {expected})")]
    ShortWrite { wrote: usize, expected: usize },

    #[error("{count} velocity layers cannot be partitioned over 128 velocities")]
    TooManyLayers { count: usize },

    #[error("Root key {key} for {family} is outside the MIDI key range")]
    KeyOutOfRange { family: &'static str, key: u32 },

    #[error("Key span {first_low}-{first_high} of {first} overlaps {second_low}-{second_high} of {second}")]
    KeyOverlap {
        first: &'static str,
        first_low: u8,
        first_high: u8,
        second: &'static str,
        second_low: u8,
        second_high: u8,
    },

    #[error("Bank exceeds format limits: {0}")]
    Limit(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl KitError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        KitError::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps a codec error with the path it occurred on.
    pub fn codec(path: impl Into<PathBuf>, source: SampleSourceError) -> Self {
        KitError::Codec {
            path: path.into(),
            source,
        }
    }
}
