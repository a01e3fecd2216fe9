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
//! Kit configuration.
//!
//! The kit layout (source directories, staging directories, root keys) and the
//! bank metadata are bundled into the binary as YAML and loaded through the
//! `config` crate. Nothing is read from the environment or the file system.

mod error;
mod kit;

pub use error::ConfigError;
pub use kit::{
    BankInfo, Envelope, Families, FamilyConfig, KitConfig, Modulation, Selection, Version,
};
