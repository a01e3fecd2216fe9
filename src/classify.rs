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
//! Filename classification.
//!
//! Every instrument family names its recordings with a fixed grammar that
//! encodes the articulation and a 1-based velocity number. Classifying a
//! directory produces a [`SampleTree`]: the family's group keys, each with the
//! recordings ordered by 0-based velocity index.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use regex::{Captures, Regex};
use tracing::debug;

use crate::error::KitError;
use crate::util::filename_display;

pub mod bass_drum;
pub mod crash;
pub mod hi_hat;
pub mod snare;

/// Recordings of one group ordered by 0-based velocity index.
pub type VelocityLayer = BTreeMap<u32, PathBuf>;

/// An instrument family: its filename grammar and its grouping axes.
pub trait Family {
    /// The group key. Its `Ord` is the order groups receive root keys in.
    type Key: Ord + Copy + Debug;

    /// Human readable family name used in logs and errors.
    const NAME: &'static str;

    /// Prefix of the bank sample names of this family.
    const SAMPLE_PREFIX: &'static str;

    /// The filename grammar. It must match whole file names.
    fn pattern() -> &'static Regex;

    /// Turns a grammar match into a group key and a 0-based velocity index.
    /// Reserved codes yield `Ok(None)`; unknown codes are an error.
    fn classify(file: &Path, captures: &Captures) -> Result<Option<(Self::Key, u32)>, KitError>;

    /// Directory names a key's recordings are staged under.
    fn key_segments(key: Self::Key) -> Vec<&'static str>;

    /// Short names identifying a key inside bank sample names.
    fn key_short_names(key: Self::Key) -> Vec<&'static str>;
}

/// Strike techniques shared by the cymbal families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CymbalStrike {
    Bell,
    Bow,
    Edge,
}

impl CymbalStrike {
    pub fn short_name(self) -> &'static str {
        match self {
            CymbalStrike::Bell => "BL",
            CymbalStrike::Bow => "BW",
            CymbalStrike::Edge => "E",
        }
    }

    pub fn dir_name(self) -> &'static str {
        match self {
            CymbalStrike::Bell => "bell",
            CymbalStrike::Bow => "bow",
            CymbalStrike::Edge => "edge",
        }
    }
}

/// Groups of recordings keyed by a family's classification axes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleTree<K: Ord> {
    groups: BTreeMap<K, VelocityLayer>,
}

impl<K: Ord + Copy> Default for SampleTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Copy> SampleTree<K> {
    pub fn new() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }

    /// Adds a recording. A recording already present at the same key and
    /// velocity is replaced and returned.
    pub fn insert(&mut self, key: K, velocity: u32, path: PathBuf) -> Option<PathBuf> {
        self.groups.entry(key).or_default().insert(velocity, path)
    }

    /// Gets the layer of a group.
    pub fn get(&self, key: &K) -> Option<&VelocityLayer> {
        self.groups.get(key)
    }

    /// Iterates the groups in key order.
    pub fn groups(&self) -> impl Iterator<Item = (K, &VelocityLayer)> {
        self.groups.iter().map(|(key, layer)| (*key, layer))
    }

    /// Iterates every recording in key, then velocity order.
    pub fn files(&self) -> impl Iterator<Item = (K, u32, &Path)> {
        self.groups.iter().flat_map(|(key, layer)| {
            layer
                .iter()
                .map(move |(velocity, path)| (*key, *velocity, path.as_path()))
        })
    }

    /// Keeps only the groups whose key satisfies the predicate.
    pub fn retain<F: FnMut(&K) -> bool>(&mut self, mut keep: F) {
        self.groups.retain(|key, _| keep(key));
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn file_count(&self) -> usize {
        self.groups.values().map(|layer| layer.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Classifies every file in `directory` against the family's grammar.
///
/// Files are visited in order of their absolute path so the result does not
/// depend on the order the file system lists them in. Files that do not match
/// the grammar are skipped.
pub fn classify_directory<F: Family>(directory: &Path) -> Result<SampleTree<F::Key>, KitError> {
    let directory = fs::canonicalize(directory).map_err(|e| KitError::io(directory, e))?;

    let mut files = Vec::new();
    for entry in fs::read_dir(&directory).map_err(|e| KitError::io(&directory, e))? {
        let entry = entry.map_err(|e| KitError::io(&directory, e))?;
        files.push(entry.path());
    }
    files.sort();

    let mut tree = SampleTree::new();
    for file in files {
        let classified = match file
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| F::pattern().captures(name))
        {
            Some(captures) => F::classify(&file, &captures)?,
            None => continue,
        };

        if let Some((key, velocity)) = classified {
            debug!(
                family = F::NAME,
                key = ?key,
                velocity,
                file = filename_display(&file),
                "Classified"
            );
            if let Some(replaced) = tree.insert(key, velocity, file) {
                debug!(
                    family = F::NAME,
                    key = ?key,
                    velocity,
                    file = filename_display(&replaced),
                    "Replaced duplicate velocity"
                );
            }
        }
    }

    Ok(tree)
}

/// Converts the 1-based velocity number of a file name into a 0-based index.
pub(crate) fn velocity_index(
    family: &'static str,
    file: &Path,
    text: &str,
) -> Result<u32, KitError> {
    match text.parse::<u32>() {
        Ok(velocity) if velocity >= 1 => Ok(velocity - 1),
        _ => Err(unexpected(family, "velocity", text, file)),
    }
}

pub(crate) fn unexpected(family: &'static str, axis: &'static str, code: &str, file: &Path) -> KitError {
    KitError::Classification {
        family,
        axis,
        code: code.to_string(),
        file: file.to_path_buf(),
    }
}

/// Compiles a family grammar anchored to whole file names.
pub(crate) fn whole_name_pattern(pattern: &str) -> Regex {
    Regex::new(&format!("^{}$", pattern)).expect("family grammars are valid regular expressions")
}
