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
use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::{unexpected, velocity_index, whole_name_pattern, CymbalStrike, Family};
use crate::error::KitError;

/// 18" Zildjian A medium crash cymbal.
pub struct Crash;

impl Family for Crash {
    type Key = CymbalStrike;

    const NAME: &'static str = "crash";
    const SAMPLE_PREFIX: &'static str = "CRASH";

    fn pattern() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN.get_or_init(|| {
            whole_name_pattern(r"([0-9]+)__quartertone__cc18zm-([a-z0-9]+)-v([0-9]+)\.flac")
        })
    }

    fn classify(file: &Path, captures: &Captures) -> Result<Option<(CymbalStrike, u32)>, KitError> {
        let strike = match &captures[2] {
            "bl" => CymbalStrike::Bell,
            "bw" => CymbalStrike::Bow,
            "ed" => CymbalStrike::Edge,
            code => return Err(unexpected(Self::NAME, "strike", code, file)),
        };
        let velocity = velocity_index(Self::NAME, file, &captures[3])?;
        Ok(Some((strike, velocity)))
    }

    fn key_segments(key: CymbalStrike) -> Vec<&'static str> {
        vec![key.dir_name()]
    }

    fn key_short_names(key: CymbalStrike) -> Vec<&'static str> {
        vec![key.short_name()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_directory;
    use crate::classify::tests::touch;

    #[test]
    fn test_crash_grammar() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            &[
                "130000__quartertone__cc18zm-ed-v1.flac",
                "130001__quartertone__cc18zm-ed-v2.flac",
                "130002__quartertone__cc18zm-bw-v1.flac",
                "130003__quartertone__cc18zm-bl-v5.flac",
            ],
        );

        let tree = classify_directory::<Crash>(dir.path()).unwrap();

        let keys: Vec<CymbalStrike> = tree.groups().map(|(key, _)| key).collect();
        assert_eq!(
            vec![CymbalStrike::Bell, CymbalStrike::Bow, CymbalStrike::Edge],
            keys
        );
        assert_eq!(2, tree.get(&CymbalStrike::Edge).unwrap().len());
        assert!(tree.get(&CymbalStrike::Bell).unwrap().contains_key(&4));
    }

    #[test]
    fn test_unknown_strike_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["130000__quartertone__cc18zm-choke-v1.flac"]);

        let result = classify_directory::<Crash>(dir.path());

        assert!(matches!(
            result,
            Err(KitError::Classification { axis: "strike", .. })
        ));
    }
}
