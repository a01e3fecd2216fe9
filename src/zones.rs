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
//! Key and velocity zone assignment.
//!
//! Each group of a family receives one root key, starting at the family's
//! first key and counting up in group order. The velocity axis of a group is
//! split across its recordings, softest first, and every recording becomes a
//! pair of zones: the left channel panned hard left and the right channel
//! panned hard right.

use std::path::PathBuf;

use crate::classify::{Family, SampleTree};
use crate::error::KitError;
use crate::util::truncate_bytes;

/// Highest MIDI velocity and key.
pub const MAX_MIDI: u8 = 127;

/// Sample names are stored in 20 byte fields.
pub const SAMPLE_NAME_LENGTH: usize = 20;

/// An inclusive velocity range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VelocityRange {
    pub low: u8,
    pub high: u8,
}

/// Splits [0, 127] across `count` velocity layers.
///
/// Every region is `128 / count` wide plus one for the first; the last region
/// runs to 127 whatever remains. This uneven split is what existing banks were
/// built with and is kept as is.
pub fn partition_velocity(count: usize) -> Result<Vec<VelocityRange>, KitError> {
    let mut ranges = Vec::with_capacity(count);
    if count == 0 {
        return Ok(ranges);
    }

    let max = MAX_MIDI as usize;
    // From 128 layers on, the last layer would start past 127.
    if count > max {
        return Err(KitError::TooManyLayers { count });
    }

    let region = 128 / count;
    let mut low = 0;
    let mut high = low + region;

    for index in 0..count {
        let last = index + 1 == count;
        ranges.push(VelocityRange {
            low: low as u8,
            high: if last { MAX_MIDI } else { high.min(max) as u8 },
        });

        low = high + 1;
        high = max.min(high + region);
    }

    Ok(ranges)
}

/// Stereo side of a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Left,
    Right,
}

impl Channel {
    /// Index of the channel inside the decoded recording.
    pub fn index(self) -> usize {
        match self {
            Channel::Left => 0,
            Channel::Right => 1,
        }
    }

    /// Pan generator amount in 0.1% units (-500 is fully left).
    pub fn pan(self) -> i16 {
        match self {
            Channel::Left => -496,
            Channel::Right => 496,
        }
    }

    /// Suffix of the channel's sample names.
    pub fn suffix(self) -> &'static str {
        match self {
            Channel::Left => "L",
            Channel::Right => "R",
        }
    }
}

/// One zone of the instrument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneAssignment {
    pub root_key: u8,
    pub velocity: VelocityRange,
    pub channel: Channel,
    /// The normalized recording the zone plays.
    pub sample: PathBuf,
    pub sample_name: String,
}

/// The left and right zones of one recording. Both cover the same keys and
/// velocities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StereoZone {
    pub left: ZoneAssignment,
    pub right: ZoneAssignment,
}

/// All zones of one group, sharing a root key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyGroup {
    pub root_key: u8,
    pub label: String,
    pub zones: Vec<StereoZone>,
}

/// Assigns root keys and velocity zones to every group of a family.
pub fn map_family<F: Family>(
    tree: &SampleTree<F::Key>,
    start_key: u8,
) -> Result<Vec<KeyGroup>, KitError> {
    let mut groups = Vec::with_capacity(tree.group_count());

    for (index, (key, layer)) in tree.groups().enumerate() {
        let root_key = start_key as usize + index;
        if root_key > MAX_MIDI as usize {
            return Err(KitError::KeyOutOfRange {
                family: F::NAME,
                key: root_key as u32,
            });
        }
        let root_key = root_key as u8;

        let ranges = partition_velocity(layer.len())?;
        let zones = layer
            .iter()
            .zip(ranges)
            .map(|((velocity, path), range)| {
                let zone = |channel: Channel| ZoneAssignment {
                    root_key,
                    velocity: range,
                    channel,
                    sample: path.clone(),
                    sample_name: sample_name::<F>(key, *velocity, channel),
                };
                StereoZone {
                    left: zone(Channel::Left),
                    right: zone(Channel::Right),
                }
            })
            .collect();

        groups.push(KeyGroup {
            root_key,
            label: format!("{:?}", key),
            zones,
        });
    }

    Ok(groups)
}

/// Builds a bank sample name such as `SNARE_T_HC_03_L`.
pub fn sample_name<F: Family>(key: F::Key, velocity: u32, channel: Channel) -> String {
    let mut parts = vec![F::SAMPLE_PREFIX.to_string()];
    parts.extend(F::key_short_names(key).into_iter().map(str::to_string));
    parts.push(format!("{:02}", velocity));
    parts.push(channel.suffix().to_string());
    truncate_bytes(&parts.join("_"), SAMPLE_NAME_LENGTH).to_string()
}

/// Lowest and highest root key used by a family, if it has any groups.
pub fn key_span(groups: &[KeyGroup]) -> Option<(u8, u8)> {
    let low = groups.iter().map(|group| group.root_key).min()?;
    let high = groups.iter().map(|group| group.root_key).max()?;
    Some((low, high))
}
