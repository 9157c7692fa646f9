//! Low-level byte reading utilities

use byteorder::{BigEndian, ByteOrder};

/// Width-bounded big-endian field reader.
///
/// Reads past the end of the underlying slice yield zero bytes instead of
/// failing. Used for versioned headers where older files omit trailing fields.
pub struct FieldReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Read `N` bytes, zero-filling whatever lies beyond the slice.
    pub fn bytes<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        let start = self.pos.min(self.data.len());
        let end = self.pos.saturating_add(N).min(self.data.len());
        out[..end - start].copy_from_slice(&self.data[start..end]);
        self.pos = self.pos.saturating_add(N);
        out
    }

    pub fn u16(&mut self) -> u16 {
        BigEndian::read_u16(&self.bytes::<2>())
    }

    pub fn u32(&mut self) -> u32 {
        BigEndian::read_u32(&self.bytes::<4>())
    }

    pub fn u32_array<const N: usize>(&mut self) -> [u32; N] {
        std::array::from_fn(|_| self.u32())
    }

    /// Number of bytes consumed so far, including zero-filled ones.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether any read so far went past the end of the slice.
    pub fn is_short(&self) -> bool {
        self.pos > self.data.len()
    }
}

/// Trim trailing NUL padding from a fixed-width name field.
pub fn trim_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}
