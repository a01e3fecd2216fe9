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
//! RIFF `sfbk` serialization.
//!
//! The file holds three lists in order: INFO with the bank metadata, sdta with
//! a single `smpl` chunk of 16-bit sample data, and pdta with the nine hydra
//! record chunks. Every hydra record list ends with a terminal record.

use std::io::{self, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use tracing::debug;

use super::{Generator, Info, Modulator, SoundFont, Zone, SOUND_ENGINE};
use crate::error::KitError;
use crate::util::truncate_bytes;

/// Width of every name field in the hydra records.
pub const NAME_LENGTH: usize = 20;

/// Zero points written after every sample.
pub const SAMPLE_PADDING: usize = 46;

const INFO_STRING_LIMIT: usize = 256;
const COMMENT_LIMIT: usize = 65536;
const INDEX_LIMIT: usize = u16::MAX as usize;

/// Writes the bank to `output`. `path` names the destination in errors.
pub fn write<W: Write>(font: &SoundFont, output: &mut W, path: &Path) -> Result<(), KitError> {
    check_limits(font)?;

    let io_error = |e| KitError::io(path, e);
    let info = info_list(&font.info).map_err(io_error)?;
    let hydra = hydra_list(font).map_err(io_error)?;

    let sample_bytes: usize = font
        .samples
        .iter()
        .map(|sample| (sample.data.len() + SAMPLE_PADDING) * 2)
        .sum();
    let sdta_size = 4 + 8 + sample_bytes;
    let riff_size = 4 + (8 + info.len()) + (8 + sdta_size) + (8 + hydra.len());
    let riff_size = u32::try_from(riff_size)
        .map_err(|_| KitError::Limit(format!("bank of {riff_size} bytes exceeds the RIFF size")))?;

    debug!(
        riff_size,
        info = info.len(),
        samples = sample_bytes,
        hydra = hydra.len(),
        "Writing bank"
    );

    write_header(output, b"RIFF", riff_size).map_err(io_error)?;
    output.write_all(b"sfbk").map_err(io_error)?;

    write_header(output, b"LIST", info.len() as u32).map_err(io_error)?;
    output.write_all(&info).map_err(io_error)?;

    write_header(output, b"LIST", sdta_size as u32).map_err(io_error)?;
    output.write_all(b"sdta").map_err(io_error)?;
    write_header(output, b"smpl", sample_bytes as u32).map_err(io_error)?;
    for sample in font.samples.iter() {
        copy_sample_data(output, &sample.data, path)?;
    }

    write_header(output, b"LIST", hydra.len() as u32).map_err(io_error)?;
    output.write_all(&hydra).map_err(io_error)?;

    Ok(())
}

/// Writes one sample's points followed by the zero padding in a single write,
/// failing if the writer accepts fewer bytes than the buffer holds.
fn copy_sample_data<W: Write>(output: &mut W, data: &[i16], path: &Path) -> Result<(), KitError> {
    let mut buffer = vec![0u8; (data.len() + SAMPLE_PADDING) * 2];
    LittleEndian::write_i16_into(data, &mut buffer[..data.len() * 2]);

    let wrote = output.write(&buffer).map_err(|e| KitError::io(path, e))?;
    if wrote != buffer.len() {
        return Err(KitError::ShortWrite {
            wrote,
            expected: buffer.len(),
        });
    }
    Ok(())
}

fn check_limits(font: &SoundFont) -> Result<(), KitError> {
    let limit = |what: &str, count: usize| {
        if count > INDEX_LIMIT {
            Err(KitError::Limit(format!(
                "{count} {what} (at most {INDEX_LIMIT} allowed)"
            )))
        } else {
            Ok(())
        }
    };

    limit("samples", font.samples.len())?;
    limit("instruments", font.instruments.len())?;
    limit("presets", font.presets.len())?;

    let preset_zones = font.presets.iter().flat_map(|preset| preset.zones.iter());
    let instrument_zones = font
        .instruments
        .iter()
        .flat_map(|instrument| instrument.zones.iter());
    for (what, zones) in [
        ("preset", preset_zones.collect::<Vec<_>>()),
        ("instrument", instrument_zones.collect::<Vec<_>>()),
    ] {
        limit(&format!("{what} zones"), zones.len())?;
        limit(
            &format!("{what} generators"),
            zones.iter().map(|zone| zone.generators.len()).sum(),
        )?;
        limit(
            &format!("{what} modulators"),
            zones.iter().map(|zone| zone.modulators.len()).sum(),
        )?;
    }

    let points: usize = font
        .samples
        .iter()
        .map(|sample| sample.data.len() + SAMPLE_PADDING)
        .sum();
    if points > u32::MAX as usize {
        return Err(KitError::Limit(format!("{points} sample points")));
    }
    Ok(())
}

fn write_header<W: Write>(output: &mut W, id: &[u8; 4], size: u32) -> io::Result<()> {
    output.write_all(id)?;
    output.write_u32::<LittleEndian>(size)
}

/// Appends a complete chunk, padding the body to an even length.
fn write_chunk(output: &mut Vec<u8>, id: &[u8; 4], body: &[u8]) -> io::Result<()> {
    let padded = body.len() + body.len() % 2;
    write_header(output, id, padded as u32)?;
    output.write_all(body)?;
    if padded != body.len() {
        output.write_u8(0)?;
    }
    Ok(())
}

/// Encodes a zero-terminated string padded to an even length.
fn zstr(value: &str, limit: usize) -> Vec<u8> {
    let mut bytes = truncate_bytes(value, limit - 2).as_bytes().to_vec();
    bytes.push(0);
    if bytes.len() % 2 != 0 {
        bytes.push(0);
    }
    bytes
}

fn write_name(output: &mut Vec<u8>, name: &str) -> io::Result<()> {
    let mut field = [0u8; NAME_LENGTH];
    let name = truncate_bytes(name, NAME_LENGTH).as_bytes();
    field[..name.len()].copy_from_slice(name);
    output.write_all(&field)
}

fn info_list(info: &Info) -> io::Result<Vec<u8>> {
    let mut list = b"INFO".to_vec();

    let mut version = Vec::with_capacity(4);
    version.write_u16::<LittleEndian>(info.version.0)?;
    version.write_u16::<LittleEndian>(info.version.1)?;
    write_chunk(&mut list, b"ifil", &version)?;
    write_chunk(&mut list, b"isng", &zstr(SOUND_ENGINE, INFO_STRING_LIMIT))?;
    write_chunk(&mut list, b"INAM", &zstr(&info.name, INFO_STRING_LIMIT))?;

    let optional: [(&[u8; 4], &str, usize); 6] = [
        (b"ICRD", &info.creation_date, INFO_STRING_LIMIT),
        (b"IENG", &info.engineers, INFO_STRING_LIMIT),
        (b"IPRD", &info.product, INFO_STRING_LIMIT),
        (b"ICOP", &info.copyright, INFO_STRING_LIMIT),
        (b"ICMT", &info.comment, COMMENT_LIMIT),
        (b"ISFT", &info.software, INFO_STRING_LIMIT),
    ];
    for (id, value, limit) in optional {
        if !value.is_empty() {
            write_chunk(&mut list, id, &zstr(value, limit))?;
        }
    }

    Ok(list)
}

/// The bag, modulator and generator record lists for either presets or
/// instruments.
#[derive(Default)]
struct ZoneLists {
    bags: Vec<u8>,
    modulators: Vec<u8>,
    generators: Vec<u8>,
    bag_count: usize,
    modulator_count: usize,
    generator_count: usize,
}

impl ZoneLists {
    fn push(&mut self, zone: &Zone) -> io::Result<()> {
        self.bags
            .write_u16::<LittleEndian>(self.generator_count as u16)?;
        self.bags
            .write_u16::<LittleEndian>(self.modulator_count as u16)?;
        self.bag_count += 1;

        for modulator in zone.modulators() {
            write_modulator(&mut self.modulators, modulator)?;
            self.modulator_count += 1;
        }
        for generator in zone.ordered_generators() {
            write_generator(&mut self.generators, &generator)?;
            self.generator_count += 1;
        }
        Ok(())
    }

    fn terminate(&mut self) -> io::Result<()> {
        self.bags
            .write_u16::<LittleEndian>(self.generator_count as u16)?;
        self.bags
            .write_u16::<LittleEndian>(self.modulator_count as u16)?;
        self.modulators.write_all(&[0u8; 10])?;
        self.generators.write_all(&[0u8; 4])
    }
}

fn write_modulator(output: &mut Vec<u8>, modulator: &Modulator) -> io::Result<()> {
    output.write_u16::<LittleEndian>(modulator.source)?;
    output.write_u16::<LittleEndian>(modulator.destination)?;
    output.write_i16::<LittleEndian>(modulator.amount)?;
    output.write_u16::<LittleEndian>(modulator.amount_source)?;
    output.write_u16::<LittleEndian>(modulator.transform)
}

fn write_generator(output: &mut Vec<u8>, generator: &Generator) -> io::Result<()> {
    output.write_u16::<LittleEndian>(generator.operator)?;
    output.write_all(&generator.amount.to_bytes())
}

fn hydra_list(font: &SoundFont) -> io::Result<Vec<u8>> {
    let mut phdr = Vec::new();
    let mut presets = ZoneLists::default();
    for preset in font.presets.iter() {
        write_name(&mut phdr, &preset.name)?;
        phdr.write_u16::<LittleEndian>(preset.preset)?;
        phdr.write_u16::<LittleEndian>(preset.bank)?;
        phdr.write_u16::<LittleEndian>(presets.bag_count as u16)?;
        // Library, genre and morphology are reserved.
        phdr.write_all(&[0u8; 12])?;
        for zone in preset.zones.iter() {
            presets.push(zone)?;
        }
    }
    write_name(&mut phdr, "EOP")?;
    phdr.write_all(&[0u8; 4])?;
    phdr.write_u16::<LittleEndian>(presets.bag_count as u16)?;
    phdr.write_all(&[0u8; 12])?;
    presets.terminate()?;

    let mut inst = Vec::new();
    let mut instruments = ZoneLists::default();
    for instrument in font.instruments.iter() {
        write_name(&mut inst, &instrument.name)?;
        inst.write_u16::<LittleEndian>(instruments.bag_count as u16)?;
        for zone in instrument.zones.iter() {
            instruments.push(zone)?;
        }
    }
    write_name(&mut inst, "EOI")?;
    inst.write_u16::<LittleEndian>(instruments.bag_count as u16)?;
    instruments.terminate()?;

    let mut shdr = Vec::new();
    let mut cursor: u32 = 0;
    for sample in font.samples.iter() {
        let start = cursor;
        let end = start + sample.data.len() as u32;
        write_name(&mut shdr, &sample.name)?;
        shdr.write_u32::<LittleEndian>(start)?;
        shdr.write_u32::<LittleEndian>(end)?;
        shdr.write_u32::<LittleEndian>(start + sample.loop_start)?;
        shdr.write_u32::<LittleEndian>(start + sample.loop_end)?;
        shdr.write_u32::<LittleEndian>(sample.sample_rate)?;
        shdr.write_u8(sample.original_pitch)?;
        shdr.write_i8(sample.pitch_correction)?;
        shdr.write_u16::<LittleEndian>(sample.link)?;
        shdr.write_u16::<LittleEndian>(sample.kind.code())?;
        cursor = end + SAMPLE_PADDING as u32;
    }
    write_name(&mut shdr, "EOS")?;
    shdr.write_all(&[0u8; 26])?;

    let mut list = b"pdta".to_vec();
    write_chunk(&mut list, b"phdr", &phdr)?;
    write_chunk(&mut list, b"pbag", &presets.bags)?;
    write_chunk(&mut list, b"pmod", &presets.modulators)?;
    write_chunk(&mut list, b"pgen", &presets.generators)?;
    write_chunk(&mut list, b"inst", &inst)?;
    write_chunk(&mut list, b"ibag", &instruments.bags)?;
    write_chunk(&mut list, b"imod", &instruments.modulators)?;
    write_chunk(&mut list, b"igen", &instruments.generators)?;
    write_chunk(&mut list, b"shdr", &shdr)?;
    Ok(list)
}
