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
//! Compiles multisampled percussion recordings into a velocity-layered
//! SoundFont 2 bank.
//!
//! A run classifies the recordings of the four instrument families by file
//! name, re-encodes them as 16-bit WAV into a staging directory, assigns each
//! group a root key and each recording a velocity range, and writes a single
//! bank holding one instrument and one preset.

pub mod audio;
pub mod bank;
pub mod classify;
pub mod config;
pub mod error;
pub mod normalize;
pub mod sf2;
mod util;
pub mod zones;

#[cfg(test)]
mod testutil;

use std::path::Path;

use tracing::info;

use crate::bank::FamilyZones;
use crate::classify::bass_drum::BassDrum;
use crate::classify::crash::Crash;
use crate::classify::hi_hat::HiHat;
use crate::classify::snare::Snare;
use crate::classify::{classify_directory, Family, SampleTree};
use crate::config::{FamilyConfig, KitConfig};
pub use crate::error::KitError;
use crate::normalize::normalize_tree;
use crate::zones::map_family;

/// Compiles the recordings below `source` into the bank at `output`, staging
/// normalized recordings below `staging`.
pub fn compile(source: &Path, staging: &Path, output: &Path) -> Result<(), KitError> {
    let config = KitConfig::bundled()?;
    compile_with(&config, source, staging, output)
}

/// Like [`compile`], with an explicit kit configuration.
///
/// Every family is classified before anything is written, so a file carrying
/// an unknown code aborts the run before staging or output.
pub fn compile_with(
    config: &KitConfig,
    source: &Path,
    staging: &Path,
    output: &Path,
) -> Result<(), KitError> {
    let families = config.families();

    let mut snare = classify_directory::<Snare>(&source.join(&families.snare.directory))?;
    let tautness = &config.selection().snare_tautness;
    snare.retain(|key| tautness.contains(&key.tautness));
    let bass_drum = classify_directory::<BassDrum>(&source.join(&families.bass_drum.directory))?;
    let hi_hat = classify_directory::<HiHat>(&source.join(&families.hi_hat.directory))?;
    let crash = classify_directory::<Crash>(&source.join(&families.crash.directory))?;

    let zones = vec![
        stage::<Snare>(&snare, staging, &families.snare)?,
        stage::<BassDrum>(&bass_drum, staging, &families.bass_drum)?,
        stage::<HiHat>(&hi_hat, staging, &families.hi_hat)?,
        stage::<Crash>(&crash, staging, &families.crash)?,
    ];

    let font = bank::assemble(config, &zones)?;
    sf2::write_file(&font, output)
}

/// Normalizes a family into its staging directory and maps its zones.
fn stage<F: Family>(
    tree: &SampleTree<F::Key>,
    staging: &Path,
    family: &FamilyConfig,
) -> Result<FamilyZones, KitError> {
    let normalized = normalize_tree::<F>(tree, &staging.join(&family.staging))?;
    let groups = map_family::<F>(&normalized, family.root_key)?;

    info!(
        family = F::NAME,
        groups = groups.len(),
        files = normalized.file_count(),
        root_key = family.root_key,
        "Mapped family"
    );

    Ok(FamilyZones {
        family: F::NAME,
        groups,
        envelope: family.envelope,
    })
}
