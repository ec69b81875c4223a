use crate::constants::{MARKER_ONE, MARKER_ZERO, SOUP_SIZE};
use crate::{CoreError, Result};

/// Reduce any signed address into `[0, SOUP_SIZE)`.
///
/// Uses Euclidean remainder so negative offsets land on the far end of the
/// soup (`wrap(-1) == SOUP_SIZE - 1`) instead of being truncated toward zero.
pub fn wrap(address: i64) -> usize {
    address.rem_euclid(SOUP_SIZE as i64) as usize
}

/// True when `byte` can be read as one template bit.
pub fn is_marker(byte: u8) -> bool {
    byte == MARKER_ZERO || byte == MARKER_ONE
}

/// Shared circular instruction memory.
#[derive(Clone, PartialEq, Eq)]
pub struct Soup {
    cells: Vec<u8>,
}

impl Default for Soup {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Soup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.cells.iter().filter(|byte| **byte != 0).count();
        f.debug_struct("Soup")
            .field("len", &self.cells.len())
            .field("non_zero", &used)
            .finish()
    }
}

impl Soup {
    pub fn new() -> Self {
        Self {
            cells: vec![0; SOUP_SIZE],
        }
    }

    /// Build a soup from a raw image. The image must cover the whole soup.
    pub fn from_image(image: &[u8]) -> Result<Self> {
        if image.len() != SOUP_SIZE {
            return Err(CoreError::Other(format!(
                "soup image length mismatch (expected {SOUP_SIZE}, got {})",
                image.len()
            )));
        }
        Ok(Self {
            cells: image.to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn read(&self, address: i64) -> u8 {
        self.cells[wrap(address)]
    }

    pub fn write(&mut self, address: i64, value: u8) {
        let index = wrap(address);
        self.cells[index] = value;
    }

    /// Copy `blob` into the soup starting at `base`, wrapping past the end.
    pub fn write_slice(&mut self, base: i64, blob: &[u8]) {
        let base = wrap(base) as i64;
        for (offset, byte) in blob.iter().enumerate() {
            self.write(base + offset as i64, *byte);
        }
    }

    /// Read `len` bytes starting at `base`, wrapping past the end.
    pub fn read_slice(&self, base: i64, len: usize) -> Vec<u8> {
        let base = wrap(base) as i64;
        (0..len).map(|offset| self.read(base + offset as i64)).collect()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }

    /// Sparse dump of every non-zero cell as `(address, byte)` pairs.
    pub fn dump_non_zero(&self) -> Vec<(u32, u8)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, byte)| **byte != 0)
            .map(|(addr, byte)| (addr as u32, *byte))
            .collect()
    }

    pub fn preload(&mut self, pairs: impl IntoIterator<Item = (u32, u8)>) {
        for (addr, value) in pairs {
            self.write(addr as i64, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_handles_negative_and_overflowing_addresses() {
        assert_eq!(wrap(0), 0);
        assert_eq!(wrap(-1), SOUP_SIZE - 1);
        assert_eq!(wrap(SOUP_SIZE as i64), 0);
        assert_eq!(wrap(SOUP_SIZE as i64 + 7), 7);
        assert_eq!(wrap(-(SOUP_SIZE as i64) * 3 - 2), SOUP_SIZE - 2);
    }

    #[test]
    fn writes_wrap_around_the_end() {
        let mut soup = Soup::new();
        soup.write_slice(-2, &[0x08, 0x09, 0x0a]);
        assert_eq!(soup.read(SOUP_SIZE as i64 - 2), 0x08);
        assert_eq!(soup.read(-1), 0x09);
        assert_eq!(soup.read(0), 0x0a);
        assert_eq!(soup.read_slice(-2, 3), vec![0x08, 0x09, 0x0a]);
    }

    #[test]
    fn slices_accept_extreme_base_addresses() {
        let mut soup = Soup::new();
        soup.write_slice(i64::MAX, &[0x08, 0x09]);
        let top = wrap(i64::MAX) as i64;
        assert_eq!(soup.read(top), 0x08);
        assert_eq!(soup.read(top + 1), 0x09);
        assert_eq!(soup.read_slice(i64::MAX, 2), vec![0x08, 0x09]);

        soup.write_slice(i64::MIN, &[0x0a]);
        assert_eq!(soup.read(wrap(i64::MIN) as i64), 0x0a);
        assert_eq!(soup.read_slice(i64::MIN, 1), vec![0x0a]);
    }

    #[test]
    fn from_image_rejects_wrong_length() {
        assert!(Soup::from_image(&[0u8; 16]).is_err());
        let image = vec![0x04; SOUP_SIZE];
        let soup = Soup::from_image(&image).expect("full image");
        assert_eq!(soup.read(123), 0x04);
    }

    #[test]
    fn dump_lists_only_non_zero_cells() {
        let mut soup = Soup::new();
        soup.preload([(5, 0x0c), (SOUP_SIZE as u32 - 1, 0x11)]);
        assert_eq!(
            soup.dump_non_zero(),
            vec![(5, 0x0c), (SOUP_SIZE as u32 - 1, 0x11)]
        );
    }
}
