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

/// 18x20" china hi-hats.
pub struct HiHat;

/// How far the hats are apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Openness {
    Closed,
    SemiClosed,
    HalfOpen,
    SemiOpen,
    Open,
}

impl Openness {
    pub fn short_name(self) -> &'static str {
        match self {
            Openness::Closed => "CL",
            Openness::SemiClosed => "SC",
            Openness::HalfOpen => "HO",
            Openness::SemiOpen => "SO",
            Openness::Open => "O",
        }
    }

    pub fn dir_name(self) -> &'static str {
        match self {
            Openness::Closed => "closed",
            Openness::SemiClosed => "semi_closed",
            Openness::HalfOpen => "half_open",
            Openness::SemiOpen => "semi_open",
            Openness::Open => "open",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HiHatKey {
    pub openness: Openness,
    pub strike: CymbalStrike,
}

impl Family for HiHat {
    type Key = HiHatKey;

    const NAME: &'static str = "hi-hat";
    const SAMPLE_PREFIX: &'static str = "HH";

    fn pattern() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN.get_or_init(|| {
            whole_name_pattern(r"([0-9]+)__quartertone__chh18x20-1-([a-z0-9]+)-v([0-9]+)\.flac")
        })
    }

    fn classify(file: &Path, captures: &Captures) -> Result<Option<(HiHatKey, u32)>, KitError> {
        use CymbalStrike::{Bell, Bow, Edge};
        use Openness::{Closed, HalfOpen, Open, SemiClosed, SemiOpen};

        let hat = |openness, strike| Some(HiHatKey { openness, strike });

        // The code is the strike followed by the openness.
        let key = match &captures[2] {
            "blc" => hat(Closed, Bell),
            "blho" => hat(HalfOpen, Bell),
            "blo" => hat(Open, Bell),
            "blsc" => hat(SemiClosed, Bell),
            "blso" => hat(SemiOpen, Bell),

            "bwc" => hat(Closed, Bow),
            "bwho" => hat(HalfOpen, Bow),
            "bwo" => hat(Open, Bow),
            "bwsc" => hat(SemiClosed, Bow),
            "bwso" => hat(SemiOpen, Bow),

            "ec" => hat(Closed, Edge),
            "eho" => hat(HalfOpen, Edge),
            "eo" => hat(Open, Edge),
            "esc" => hat(SemiClosed, Edge),
            "eso" => hat(SemiOpen, Edge),

            // Foot chick and foot splash are recorded but not part of the bank.
            "ftchk" | "ftspl" => None,

            code => return Err(unexpected(Self::NAME, "articulation", code, file)),
        };

        match key {
            Some(key) => Ok(Some((key, velocity_index(Self::NAME, file, &captures[3])?))),
            None => Ok(None),
        }
    }

    fn key_segments(key: HiHatKey) -> Vec<&'static str> {
        vec![key.openness.dir_name(), key.strike.dir_name()]
    }

    fn key_short_names(key: HiHatKey) -> Vec<&'static str> {
        vec![key.openness.short_name(), key.strike.short_name()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_directory;
    use crate::classify::tests::touch;

    #[test]
    fn test_hi_hat_grammar() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            &[
                "120000__quartertone__chh18x20-1-blc-v1.flac",
                "120001__quartertone__chh18x20-1-blc-v2.flac",
                "120002__quartertone__chh18x20-1-eso-v1.flac",
                "120003__quartertone__chh18x20-1-bwho-v3.flac",
                "120004__quartertone__chh18x20-1-ec-v1.flac",
            ],
        );

        let tree = classify_directory::<HiHat>(dir.path()).unwrap();

        let keys: Vec<HiHatKey> = tree.groups().map(|(key, _)| key).collect();
        assert_eq!(
            vec![
                HiHatKey {
                    openness: Openness::Closed,
                    strike: CymbalStrike::Bell
                },
                HiHatKey {
                    openness: Openness::Closed,
                    strike: CymbalStrike::Edge
                },
                HiHatKey {
                    openness: Openness::HalfOpen,
                    strike: CymbalStrike::Bow
                },
                HiHatKey {
                    openness: Openness::SemiOpen,
                    strike: CymbalStrike::Edge
                },
            ],
            keys
        );
        assert_eq!(5, tree.file_count());
    }

    #[test]
    fn test_foot_articulations_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            &[
                "120000__quartertone__chh18x20-1-ftchk-v1.flac",
                "120001__quartertone__chh18x20-1-ftspl-v1.flac",
                "120002__quartertone__chh18x20-1-bwc-v1.flac",
            ],
        );

        let tree = classify_directory::<HiHat>(dir.path()).unwrap();

        assert_eq!(1, tree.group_count());
        assert_eq!(1, tree.file_count());
    }

    #[test]
    fn test_unknown_articulation_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["120000__quartertone__chh18x20-1-bwx-v1.flac"]);

        let result = classify_directory::<HiHat>(dir.path());

        assert!(matches!(
            result,
            Err(KitError::Classification {
                axis: "articulation",
                ..
            })
        ));
    }

    #[test]
    fn test_key_names() {
        let key = HiHatKey {
            openness: Openness::SemiClosed,
            strike: CymbalStrike::Bow,
        };

        assert_eq!(vec!["semi_closed", "bow"], HiHat::key_segments(key));
        assert_eq!(vec!["SC", "BW"], HiHat::key_short_names(key));
    }
}
