//! Complementary template addressing.
//!
//! A template is a run of marker bytes (`0x00`/`0x01`) read most significant
//! bit first. Addressing instructions locate a peer location by scanning the
//! soup for the nearest run whose bits are the complement of the template
//! that follows the instruction, so creatures never carry absolute addresses.

use serde::{Deserialize, Serialize};

use crate::constants::SOUP_SIZE;
use crate::soup::{is_marker, wrap, Soup};

/// Bit pattern and length of a marker run.
///
/// Only the last eight markers survive in `bits`; `len` still counts every
/// marker consumed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Template {
    pub bits: u8,
    pub len: u32,
}

impl Template {
    pub const EMPTY: Template = Template { bits: 0, len: 0 };

    pub fn new(bits: u8, len: u32) -> Self {
        Self { bits, len }
    }

    pub fn complement(self) -> Self {
        Self {
            bits: complement_of(self.bits, self.len),
            len: self.len,
        }
    }
}

/// Bitwise NOT of `bits` restricted to the low `len` bits.
///
/// Lengths of eight or more use the full byte.
pub fn complement_of(bits: u8, len: u32) -> u8 {
    let mask = !(!0u8).checked_shl(len).unwrap_or(0);
    !bits & mask
}

/// Decode the marker run that starts right after `position`.
///
/// The scan gives up after `SOUP_SIZE` markers; a soup made only of markers
/// resolves to [`Template::EMPTY`].
pub fn resolve_template(soup: &Soup, position: i64) -> Template {
    let position = wrap(position) as i64;
    let mut bits = 0u8;
    let mut len = 0u32;
    loop {
        if len as usize >= SOUP_SIZE {
            tracing::debug!(position, "template scan hit soup size limit");
            return Template::EMPTY;
        }
        let byte = soup.read(position + 1 + len as i64);
        if !is_marker(byte) {
            break;
        }
        bits = (bits << 1) | byte;
        len += 1;
    }
    Template { bits, len }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Backward,
    Forward,
}

impl Direction {
    fn step(self) -> i64 {
        match self {
            Direction::Backward => -1,
            Direction::Forward => 1,
        }
    }
}

/// Find the nearest run complementary to `template`, scanning from `from`.
///
/// Candidates are taken at distances `1..SOUP_SIZE` from the origin, so the
/// origin itself is never considered. A candidate matches when the run after
/// it has exactly `template.len` markers and its bits equal the complement.
/// The returned address is the candidate plus one, normalized into the soup.
pub fn search(soup: &Soup, from: i64, template: Template, direction: Direction) -> Option<usize> {
    let from = wrap(from) as i64;
    let wanted = template.complement();
    let step = direction.step();
    if soup.as_slice().iter().all(|byte| is_marker(*byte)) {
        // Every candidate resolves to the capped empty template.
        return (wanted == Template::EMPTY).then(|| wrap(from + step + 1));
    }
    (1..SOUP_SIZE as i64)
        .map(|distance| from + step * distance)
        .find(|candidate| run_matches(soup, *candidate, wanted))
        .map(|candidate| wrap(candidate + 1))
}

/// Same answer as `resolve_template(soup, candidate) == wanted` for a soup
/// that holds at least one non-marker, without walking past `wanted.len`.
fn run_matches(soup: &Soup, candidate: i64, wanted: Template) -> bool {
    let start = candidate + 1;
    if is_marker(soup.read(start + wanted.len as i64)) {
        return false;
    }
    let mut bits = 0u8;
    for offset in 0..wanted.len as i64 {
        let byte = soup.read(start + offset);
        if !is_marker(byte) {
            return false;
        }
        bits = (bits << 1) | byte;
    }
    bits == wanted.bits
}

pub fn search_backward(soup: &Soup, from: i64, template: Template) -> Option<usize> {
    search(soup, from, template, Direction::Backward)
}

pub fn search_forward(soup: &Soup, from: i64, template: Template) -> Option<usize> {
    search(soup, from, template, Direction::Forward)
}
