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
use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Compiles multisampled percussion recordings into a SoundFont bank."
)]
struct Cli {
    /// The directory holding one subdirectory of recordings per instrument family.
    source_directory: PathBuf,
    /// The directory normalized recordings are staged in.
    temporary_directory: PathBuf,
    /// The SoundFont file to write.
    output_file: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    info!(
        source = ?cli.source_directory,
        staging = ?cli.temporary_directory,
        output = ?cli.output_file,
        "Compiling bank"
    );
    kitbank::compile(
        &cli.source_directory,
        &cli.temporary_directory,
        &cli.output_file,
    )?;

    Ok(())
}
