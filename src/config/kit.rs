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
use config::{Config, File, FileFormat};
use serde::Deserialize;

use super::error::ConfigError;
use crate::classify::snare::Tautness;

const BUNDLED_KIT: &str = include_str!("../../assets/kit.yaml");
const BUNDLED_COMMENT: &str = include_str!("../../assets/comment.txt");

/// Highest MIDI key number.
const MAX_KEY: u8 = 127;

/// A YAML representation of the kit being compiled.
#[derive(Deserialize, Clone, Debug)]
pub struct KitConfig {
    /// Metadata written into the bank.
    bank: BankInfo,

    /// Global modulation applied to every zone of the instrument.
    modulation: Modulation,

    /// Which classified groups make it into the bank.
    #[serde(default)]
    selection: Selection,

    /// Per family layout.
    families: Families,

    /// Free text comment stored in the bank. Loaded from the bundled comment resource.
    #[serde(skip)]
    comment: String,
}

impl KitConfig {
    /// Loads the kit bundled with the binary.
    pub fn bundled() -> Result<KitConfig, ConfigError> {
        let mut kit = Self::from_yaml(BUNDLED_KIT)?;
        kit.comment = BUNDLED_COMMENT.to_string();
        Ok(kit)
    }

    /// Parses and validates a kit description.
    pub fn from_yaml(yaml: &str) -> Result<KitConfig, ConfigError> {
        let kit: KitConfig = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize()?;
        kit.validate()?;
        Ok(kit)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bank.instrument.is_empty() {
            return Err(ConfigError::Invalid("instrument name is empty".to_string()));
        }
        if self.bank.preset_bank > 128 {
            return Err(ConfigError::Invalid(format!(
                "preset bank {} is above 128",
                self.bank.preset_bank
            )));
        }
        if self.bank.preset_number > MAX_KEY as u16 {
            return Err(ConfigError::Invalid(format!(
                "preset number {} is above {}",
                self.bank.preset_number, MAX_KEY
            )));
        }
        for (name, family) in self.families.iter() {
            if family.root_key > MAX_KEY {
                return Err(ConfigError::Invalid(format!(
                    "root key {} of {} is above {}",
                    family.root_key, name, MAX_KEY
                )));
            }
            if family.directory.is_empty() || family.staging.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{} needs both a source and a staging directory",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Gets the bank metadata.
    pub fn bank(&self) -> &BankInfo {
        &self.bank
    }

    /// Gets the global modulation settings.
    pub fn modulation(&self) -> &Modulation {
        &self.modulation
    }

    /// Gets the group selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Gets the per family layout.
    pub fn families(&self) -> &Families {
        &self.families
    }

    /// Gets the bank comment.
    pub fn comment(&self) -> &str {
        &self.comment
    }
}

/// Bank metadata.
#[derive(Deserialize, Clone, Debug)]
pub struct BankInfo {
    pub name: String,
    pub version: Version,
    pub product: String,
    pub engineers: String,
    pub copyright: String,
    pub creation_date: String,
    /// Name of the single instrument (and its preset).
    pub instrument: String,
    /// 128 is the General MIDI percussion bank.
    pub preset_bank: u16,
    pub preset_number: u16,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

/// Zone independent modulators.
#[derive(Deserialize, Clone, Copy, Debug)]
pub struct Modulation {
    /// Coarse tune range reached at full pitch wheel deflection.
    pub pitch_wheel_semitones: i16,
    /// Attenuation applied by the inverted note-on velocity, in centibels.
    pub velocity_attenuation: i16,
}

/// Restricts which classified groups are compiled.
#[derive(Deserialize, Clone, Debug)]
pub struct Selection {
    #[serde(default = "all_tautness")]
    pub snare_tautness: Vec<Tautness>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            snare_tautness: all_tautness(),
        }
    }
}

fn all_tautness() -> Vec<Tautness> {
    vec![Tautness::Off, Tautness::Loose, Tautness::Tight]
}

#[derive(Deserialize, Clone, Debug)]
pub struct Families {
    pub snare: FamilyConfig,
    pub bass_drum: FamilyConfig,
    pub hi_hat: FamilyConfig,
    pub crash: FamilyConfig,
}

impl Families {
    /// Iterates the families in bank order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FamilyConfig)> {
        [
            ("snare", &self.snare),
            ("bass drum", &self.bass_drum),
            ("hi-hat", &self.hi_hat),
            ("crash", &self.crash),
        ]
        .into_iter()
    }
}

/// Layout of one instrument family.
#[derive(Deserialize, Clone, Debug)]
pub struct FamilyConfig {
    /// Directory below the source directory holding the recordings.
    pub directory: String,
    /// Directory below the staging directory receiving normalized recordings.
    pub staging: String,
    /// The first root key the family occupies.
    pub root_key: u8,
    /// Volume envelope overrides for every zone of the family.
    #[serde(default)]
    pub envelope: Option<Envelope>,
}

/// Volume envelope overrides.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// Decay time in timecents.
    pub decay: i16,
    /// Sustain attenuation in centibels.
    pub sustain: i16,
}
