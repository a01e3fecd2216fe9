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
//! Assembles mapped families into one SoundFont bank.

use tracing::{debug, info};

use crate::audio::decode_file;
use crate::config::{Envelope, KitConfig, Modulation};
use crate::error::KitError;
use crate::sf2::{
    self, generator, source, Amount, Instrument, Modulator, Preset, Sample, SampleKind,
    SoundFont, Zone,
};
use crate::zones::{key_span, Channel, KeyGroup, StereoZone, ZoneAssignment, MAX_MIDI};

/// The mapped zones of one family.
#[derive(Clone, Debug)]
pub struct FamilyZones {
    pub family: &'static str,
    pub groups: Vec<KeyGroup>,
    pub envelope: Option<Envelope>,
}

/// Builds the bank: one instrument holding every zone of every family behind a
/// global zone of modulators, and one preset spanning the whole keyboard.
///
/// Each normalized recording is decoded once and becomes a linked left/right
/// sample pair.
pub fn assemble(config: &KitConfig, families: &[FamilyZones]) -> Result<SoundFont, KitError> {
    check_key_spans(families)?;

    let bank = config.bank();
    let mut samples = Vec::new();
    let mut zones = vec![global_zone(config.modulation())];

    for family in families.iter() {
        for group in family.groups.iter() {
            debug!(
                family = family.family,
                group = %group.label,
                root_key = group.root_key,
                zones = group.zones.len(),
                "Assembling group"
            );
            for stereo in group.zones.iter() {
                let (left, right) = add_sample_pair(&mut samples, stereo)?;
                zones.push(instrument_zone(stereo, Channel::Left, left, family.envelope));
                zones.push(instrument_zone(stereo, Channel::Right, right, family.envelope));
            }
        }
    }

    info!(
        samples = samples.len(),
        zones = zones.len() - 1,
        "Assembled instrument"
    );

    Ok(SoundFont {
        info: sf2::Info {
            name: bank.name.clone(),
            version: (bank.version.major, bank.version.minor),
            creation_date: bank.creation_date.clone(),
            engineers: bank.engineers.clone(),
            product: bank.product.clone(),
            copyright: bank.copyright.clone(),
            comment: config.comment().to_string(),
            software: format!("kitbank {}", env!("CARGO_PKG_VERSION")),
        },
        samples,
        instruments: vec![Instrument {
            name: bank.instrument.clone(),
            zones,
        }],
        presets: vec![Preset {
            name: bank.instrument.clone(),
            preset: bank.preset_number,
            bank: bank.preset_bank,
            zones: vec![Zone::new().key_range(0, MAX_MIDI).instrument(0)],
        }],
    })
}

/// Fails if any two families claim overlapping root keys.
fn check_key_spans(families: &[FamilyZones]) -> Result<(), KitError> {
    let spans: Vec<(&'static str, (u8, u8))> = families
        .iter()
        .filter_map(|family| key_span(&family.groups).map(|span| (family.family, span)))
        .collect();

    for (index, (first, (first_low, first_high))) in spans.iter().enumerate() {
        for (second, (second_low, second_high)) in spans.iter().skip(index + 1) {
            if first_low <= second_high && second_low <= first_high {
                return Err(KitError::KeyOverlap {
                    first: *first,
                    first_low: *first_low,
                    first_high: *first_high,
                    second: *second,
                    second_low: *second_low,
                    second_high: *second_high,
                });
            }
        }
    }
    Ok(())
}

/// The instrument's global zone: pitch wheel to coarse tune, and note-on
/// velocity to initial attenuation.
fn global_zone(modulation: &Modulation) -> Zone {
    Zone::new()
        .modulator(Modulator {
            source: source::PITCH_WHEEL_BIPOLAR,
            destination: generator::COARSE_TUNE,
            amount: modulation.pitch_wheel_semitones,
            amount_source: source::NONE_BIPOLAR,
            transform: sf2::TRANSFORM_LINEAR,
        })
        .modulator(Modulator {
            source: source::NOTE_ON_VELOCITY_NEGATIVE,
            destination: generator::INITIAL_ATTENUATION,
            amount: modulation.velocity_attenuation,
            amount_source: source::NONE,
            transform: sf2::TRANSFORM_LINEAR,
        })
}

fn instrument_zone(
    stereo: &StereoZone,
    channel: Channel,
    sample: u16,
    envelope: Option<Envelope>,
) -> Zone {
    let assignment = match channel {
        Channel::Left => &stereo.left,
        Channel::Right => &stereo.right,
    };

    let mut zone = Zone::new()
        .key_range(assignment.root_key, assignment.root_key)
        .velocity_range(assignment.velocity.low, assignment.velocity.high);
    if let Some(envelope) = envelope {
        zone = zone
            .generator(generator::DECAY_VOL_ENV, Amount::Signed(envelope.decay))
            .generator(generator::SUSTAIN_VOL_ENV, Amount::Signed(envelope.sustain));
    }
    zone.generator(generator::SAMPLE_MODES, Amount::Unsigned(0))
        .generator(generator::PAN, Amount::Signed(channel.pan()))
        .sample(sample)
}

/// Decodes the zone's recording and appends its left and right channels as a
/// linked pair, returning their indices.
fn add_sample_pair(
    samples: &mut Vec<Sample>,
    stereo: &StereoZone,
) -> Result<(u16, u16), KitError> {
    let left_index = sample_index(samples.len())?;
    let right_index = sample_index(samples.len() + 1)?;

    let path = &stereo.left.sample;
    let buffer = decode_file(path).map_err(|e| KitError::codec(path, e))?;
    let frames = buffer.frames() as u32;

    let sample = |assignment: &ZoneAssignment, kind, link| Sample {
        name: assignment.sample_name.clone(),
        data: buffer.channel_i16(assignment.channel.index()),
        sample_rate: buffer.sample_rate(),
        original_pitch: assignment.root_key,
        pitch_correction: 0,
        loop_start: 0,
        loop_end: frames.saturating_sub(1),
        link,
        kind,
    };

    samples.push(sample(&stereo.left, SampleKind::Left, right_index));
    samples.push(sample(&stereo.right, SampleKind::Right, left_index));
    Ok((left_index, right_index))
}

fn sample_index(index: usize) -> Result<u16, KitError> {
    u16::try_from(index).map_err(|_| KitError::Limit(format!("more than {} samples", u16::MAX)))
}
