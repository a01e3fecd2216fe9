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
//! Re-encodes classified recordings into the staging directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::audio::{decode_file, wav};
use crate::classify::{Family, SampleTree};
use crate::error::KitError;

/// Path a normalized recording is staged at:
/// `<staging>/<key segments...>/<velocity:02>.wav`.
pub fn staged_path<F: Family>(staging: &Path, key: F::Key, velocity: u32) -> PathBuf {
    let mut path = staging.to_path_buf();
    for segment in F::key_segments(key) {
        path.push(segment);
    }
    path.push(format!("{:02}.wav", velocity));
    path
}

/// Decodes every recording of the tree and writes it as 16-bit PCM WAV below
/// `staging`, returning a tree of the same shape that points at the new files.
///
/// Existing files are overwritten. The first failure aborts the whole phase.
pub fn normalize_tree<F: Family>(
    tree: &SampleTree<F::Key>,
    staging: &Path,
) -> Result<SampleTree<F::Key>, KitError> {
    let mut normalized = SampleTree::new();

    for (key, velocity, source) in tree.files() {
        let output = staged_path::<F>(staging, key, velocity);
        if let Some(directory) = output.parent() {
            fs::create_dir_all(directory).map_err(|e| KitError::io(directory, e))?;
        }

        info!(family = F::NAME, path = ?output, "Writing normalized sample");

        let buffer = decode_file(source).map_err(|e| KitError::codec(source, e))?;
        wav::write_pcm16(&output, &buffer).map_err(|e| KitError::codec(&output, e))?;

        normalized.insert(key, velocity, output);
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::hi_hat::{HiHat, HiHatKey, Openness};
    use crate::classify::snare::{Snare, SnareKey, SnareStrike, Tautness};
    use crate::classify::{bass_drum::BassDrum, CymbalStrike};
    use crate::testutil::write_wav;

    #[test]
    fn test_staged_path() {
        let staging = Path::new("/tmp/staging/hh");
        let key = HiHatKey {
            openness: Openness::HalfOpen,
            strike: CymbalStrike::Edge,
        };

        assert_eq!(
            PathBuf::from("/tmp/staging/hh/half_open/edge/07.wav"),
            staged_path::<HiHat>(staging, key, 7)
        );
        assert_eq!(
            PathBuf::from("/tmp/staging/bd/12.wav"),
            staged_path::<BassDrum>(Path::new("/tmp/staging/bd"), (), 12)
        );
    }

    #[test]
    fn test_normalize_keeps_every_entry() {
        let source = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let key = SnareKey {
            tautness: Tautness::Tight,
            strike: SnareStrike::RimShot,
        };

        let mut tree = SampleTree::new();
        for velocity in 0..3u32 {
            let path = source.path().join(format!("source-{}.wav", velocity));
            write_wav(
                path.clone(),
                vec![vec![100i16, 200, 300], vec![-100, -200, -300]],
                44100,
            )
            .unwrap();
            tree.insert(key, velocity, path);
        }

        let normalized = normalize_tree::<Snare>(&tree, staging.path()).unwrap();

        assert_eq!(tree.group_count(), normalized.group_count());
        assert_eq!(tree.file_count(), normalized.file_count());
        for (_, velocity, path) in normalized.files() {
            assert_eq!(staged_path::<Snare>(staging.path(), key, velocity), path);
            let reader = hound::WavReader::open(path).unwrap();
            assert_eq!(16, reader.spec().bits_per_sample);
            assert_eq!(2, reader.spec().channels);
            assert_eq!(6, reader.len());
        }
    }

    #[test]
    fn test_normalize_fails_fast() {
        let source = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();

        let broken = source.path().join("broken.flac");
        std::fs::write(&broken, b"not audio").unwrap();
        let mut tree = SampleTree::new();
        tree.insert((), 0, broken);

        let result = normalize_tree::<BassDrum>(&tree, staging.path());

        assert!(matches!(result, Err(KitError::Codec { .. })));
        assert!(!staging.path().join("00.wav").exists());
    }
}
