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
use serde::Deserialize;

use super::{unexpected, velocity_index, whole_name_pattern, Family};
use crate::error::KitError;

/// 14x08" Tama snare drum, high pitch.
pub struct Snare;

/// How tight the snare wires are.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tautness {
    Off,
    Loose,
    Tight,
}

impl Tautness {
    fn from_code(code: &str) -> Option<Tautness> {
        match code {
            "0sn" => Some(Tautness::Off),
            "lsn" => Some(Tautness::Loose),
            "tsn" => Some(Tautness::Tight),
            _ => None,
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Tautness::Off => "O",
            Tautness::Loose => "L",
            Tautness::Tight => "T",
        }
    }

    pub fn dir_name(self) -> &'static str {
        match self {
            Tautness::Off => "off",
            Tautness::Loose => "loose",
            Tautness::Tight => "tight",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SnareStrike {
    CrossStick,
    HeadCenter,
    HeadEdge,
    RimShot,
    RimStrike,
}

impl SnareStrike {
    fn from_code(code: &str) -> Option<SnareStrike> {
        match code {
            "cs" => Some(SnareStrike::CrossStick),
            "hdc" => Some(SnareStrike::HeadCenter),
            "hde" => Some(SnareStrike::HeadEdge),
            "rm" => Some(SnareStrike::RimStrike),
            "rs" => Some(SnareStrike::RimShot),
            _ => None,
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            SnareStrike::CrossStick => "CS",
            SnareStrike::HeadCenter => "HC",
            SnareStrike::HeadEdge => "HE",
            // Existing banks name these crosswise; keep it.
            SnareStrike::RimShot => "RM",
            SnareStrike::RimStrike => "RS",
        }
    }

    pub fn dir_name(self) -> &'static str {
        match self {
            SnareStrike::CrossStick => "cross_stick",
            SnareStrike::HeadCenter => "head_center",
            SnareStrike::HeadEdge => "head_edge",
            SnareStrike::RimShot => "rim_shot",
            SnareStrike::RimStrike => "rim_strike",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnareKey {
    pub tautness: Tautness,
    pub strike: SnareStrike,
}

impl Family for Snare {
    type Key = SnareKey;

    const NAME: &'static str = "snare";
    const SAMPLE_PREFIX: &'static str = "SNARE";

    fn pattern() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN.get_or_init(|| {
            whole_name_pattern(
                r"([0-9]+)__quartertone__sd14x08tama-hp-([a-z0-9]+)-([a-z0-9]+)-v([0-9]+)\.flac",
            )
        })
    }

    fn classify(file: &Path, captures: &Captures) -> Result<Option<(SnareKey, u32)>, KitError> {
        let tautness_code = &captures[2];
        let strike_code = &captures[3];

        let tautness = Tautness::from_code(tautness_code)
            .ok_or_else(|| unexpected(Self::NAME, "tautness", tautness_code, file))?;
        let strike = SnareStrike::from_code(strike_code)
            .ok_or_else(|| unexpected(Self::NAME, "strike", strike_code, file))?;
        let velocity = velocity_index(Self::NAME, file, &captures[4])?;

        Ok(Some((SnareKey { tautness, strike }, velocity)))
    }

    fn key_segments(key: SnareKey) -> Vec<&'static str> {
        vec![key.tautness.dir_name(), key.strike.dir_name()]
    }

    fn key_short_names(key: SnareKey) -> Vec<&'static str> {
        vec![key.tautness.short_name(), key.strike.short_name()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_directory;
    use crate::classify::tests::touch;

    #[test]
    fn test_snare_grammar() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            &[
                "148000__quartertone__sd14x08tama-hp-tsn-cs-v1.flac",
                "148001__quartertone__sd14x08tama-hp-tsn-cs-v2.flac",
                "148002__quartertone__sd14x08tama-hp-tsn-hdc-v1.flac",
                "148003__quartertone__sd14x08tama-hp-lsn-hde-v4.flac",
                "148004__quartertone__sd14x08tama-hp-0sn-rm-v1.flac",
                "148005__quartertone__sd14x08tama-hp-0sn-rs-v1.flac",
            ],
        );

        let tree = classify_directory::<Snare>(dir.path()).unwrap();

        let keys: Vec<SnareKey> = tree.groups().map(|(key, _)| key).collect();
        assert_eq!(
            vec![
                SnareKey {
                    tautness: Tautness::Off,
                    strike: SnareStrike::RimShot
                },
                SnareKey {
                    tautness: Tautness::Off,
                    strike: SnareStrike::RimStrike
                },
                SnareKey {
                    tautness: Tautness::Loose,
                    strike: SnareStrike::HeadEdge
                },
                SnareKey {
                    tautness: Tautness::Tight,
                    strike: SnareStrike::CrossStick
                },
                SnareKey {
                    tautness: Tautness::Tight,
                    strike: SnareStrike::HeadCenter
                },
            ],
            keys
        );

        let cross_stick = tree
            .get(&SnareKey {
                tautness: Tautness::Tight,
                strike: SnareStrike::CrossStick,
            })
            .unwrap();
        assert_eq!(vec![0, 1], cross_stick.keys().copied().collect::<Vec<_>>());

        let head_edge = tree
            .get(&SnareKey {
                tautness: Tautness::Loose,
                strike: SnareStrike::HeadEdge,
            })
            .unwrap();
        assert_eq!(vec![3], head_edge.keys().copied().collect::<Vec<_>>());
    }

    #[test]
    fn test_unknown_strike_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            &[
                "148000__quartertone__sd14x08tama-hp-tsn-cs-v1.flac",
                "148001__quartertone__sd14x08tama-hp-tsn-brush-v1.flac",
            ],
        );

        let result = classify_directory::<Snare>(dir.path());

        match result {
            Err(KitError::Classification {
                family, axis, code, ..
            }) => {
                assert_eq!("snare", family);
                assert_eq!("strike", axis);
                assert_eq!("brush", code);
            }
            other => panic!("expected a classification error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tautness_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            &["148000__quartertone__sd14x08tama-hp-xsn-cs-v1.flac"],
        );

        let result = classify_directory::<Snare>(dir.path());

        assert!(matches!(
            result,
            Err(KitError::Classification {
                axis: "tautness",
                ..
            })
        ));
    }

    #[test]
    fn test_key_names() {
        let key = SnareKey {
            tautness: Tautness::Tight,
            strike: SnareStrike::HeadCenter,
        };

        assert_eq!(vec!["tight", "head_center"], Snare::key_segments(key));
        assert_eq!(vec!["T", "HC"], Snare::key_short_names(key));
    }

    #[test]
    fn test_rim_short_names() {
        assert_eq!("RM", SnareStrike::RimShot.short_name());
        assert_eq!("RS", SnareStrike::RimStrike.short_name());

        let rim_shot = SnareKey {
            tautness: Tautness::Tight,
            strike: SnareStrike::from_code("rs").unwrap(),
        };
        assert_eq!(
            "SNARE_T_RM_00_L",
            crate::zones::sample_name::<Snare>(rim_shot, 0, crate::zones::Channel::Left)
        );
    }
}
