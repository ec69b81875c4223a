//! Text listing loader and diagnostic disassembler.
//!
//! A creature listing has one instruction per line. A line is recognized by
//! its leading mnemonic; trailing text is ignored. Lines that start with
//! anything else (blank lines, comments, unknown words) produce no byte.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::cpu::Cpu;
use crate::isa::Opcode;
use crate::soup::{wrap, Soup};
use crate::Result;

pub fn opcode_for_line(line: &str) -> Option<Opcode> {
    Opcode::from_line_prefix(line)
}

/// Translate listing lines into opcode bytes.
pub fn assemble<I, S>(lines: I) -> Vec<u8>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| opcode_for_line(line.as_ref()))
        .map(Opcode::byte)
        .collect()
}

/// Write a creature into the soup at `base`.
///
/// Returns the number of bytes written and a fresh CPU whose instruction
/// pointer is the (normalized) base.
pub fn load_creature<I, S>(lines: I, soup: &mut Soup, base: i64) -> (usize, Cpu)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let bytes = assemble(lines);
    soup.write_slice(base, &bytes);
    debug!(base, len = bytes.len(), "creature written to soup");
    (bytes.len(), Cpu::at(base))
}

pub fn load_creature_from_reader<R: BufRead>(
    reader: R,
    soup: &mut Soup,
    base: i64,
) -> Result<(usize, Cpu)> {
    let lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;
    Ok(load_creature(lines, soup, base))
}

pub fn load_creature_from_file(path: &Path, soup: &mut Soup, base: i64) -> Result<(usize, Cpu)> {
    let file = File::open(path)?;
    let loaded = load_creature_from_reader(BufReader::new(file), soup, base)?;
    info!(path = %path.display(), base, size = loaded.0, "loaded creature");
    Ok(loaded)
}

/// Render `len` soup bytes starting at `start`, one instruction per line.
pub fn disassemble(soup: &Soup, start: i64, len: usize) -> Vec<String> {
    let start = wrap(start) as i64;
    (0..len as i64)
        .map(|offset| {
            let addr = wrap(start + offset);
            let byte = soup.read(addr as i64);
            match Opcode::from_byte(byte) {
                Some(opcode) => format!("{addr:05} {byte:02x} {opcode}"),
                None => format!("{addr:05} {byte:02x} db 0x{byte:02x}"),
            }
        })
        .collect()
}
