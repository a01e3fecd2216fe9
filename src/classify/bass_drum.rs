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

use super::{velocity_index, whole_name_pattern, Family};
use crate::error::KitError;

/// 22x16" bass drum, open. Every recording belongs to the one implicit group.
pub struct BassDrum;

impl Family for BassDrum {
    type Key = ();

    const NAME: &'static str = "bass drum";
    const SAMPLE_PREFIX: &'static str = "BD";

    fn pattern() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN.get_or_init(|| {
            whole_name_pattern(r"([0-9]+)__quartertone__bd22x16-mlp-o-v([0-9]+)\.flac")
        })
    }

    fn classify(file: &Path, captures: &Captures) -> Result<Option<((), u32)>, KitError> {
        let velocity = velocity_index(Self::NAME, file, &captures[2])?;
        Ok(Some(((), velocity)))
    }

    fn key_segments(_: ()) -> Vec<&'static str> {
        Vec::new()
    }

    fn key_short_names(_: ()) -> Vec<&'static str> {
        Vec::new()
    }
}
