//! Builders for synthetic MOBI containers.

#![allow(dead_code)]

pub const NULL_INDEX: u32 = 0xFFFF_FFFF;
pub const EOF_RECORD: [u8; 4] = [0xE9, 0x8E, 0x0D, 0x0A];
pub const JPEG_RECORD: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];

/// Extended header data offsets, relative to record 0 offset 24.
pub mod offsets {
    pub const MOBI_TYPE: usize = 0;
    pub const TEXT_ENCODING: usize = 4;
    pub const FILE_VERSION: usize = 12;
    pub const FIRST_NON_BOOK: usize = 56;
    pub const NAME_OFFSET: usize = 60;
    pub const NAME_LENGTH: usize = 64;
    pub const FIRST_IMAGE: usize = 84;
    pub const FIRST_TEXT_RECORD: usize = 168;
    pub const EXTRA_FLAGS: usize = 216;
}

/// Encodes `value` as a reverse-decodable base-128 integer: most significant
/// digit first, with the top bit set on that first byte only.
pub fn reverse_encode(value: u64) -> Vec<u8> {
    let mut digits = vec![(value & 0x7F) as u8];
    let mut rest = value >> 7;
    while rest > 0 {
        digits.push((rest & 0x7F) as u8);
        rest >>= 7;
    }
    digits.reverse();
    digits[0] |= 0x80;
    digits
}

/// Appends a sized trailing entry: `payload` followed by the entry's total size.
pub fn push_sized_entry(record: &mut Vec<u8>, payload: &[u8]) {
    // The size prefix counts itself; grow it until the width is stable.
    let mut width = 1;
    loop {
        let encoded = reverse_encode((payload.len() + width) as u64);
        if encoded.len() == width {
            record.extend_from_slice(payload);
            record.extend_from_slice(&encoded);
            return;
        }
        width = encoded.len();
    }
}

/// Appends a multibyte (bit 0) entry carrying `overlap` (at most 3 bytes).
pub fn push_multibyte_entry(record: &mut Vec<u8>, overlap: &[u8]) {
    assert!(overlap.len() <= 3);
    record.extend_from_slice(overlap);
    record.push(overlap.len() as u8);
}

/// Encodes text as a PalmDOC stream using literals and space pairs only.
pub fn palmdoc_pack(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        let c = text[i];
        match (c, text.get(i + 1)) {
            (b' ', Some(&next)) if (0x40..=0x7F).contains(&next) => {
                out.push(next ^ 0x80);
                i += 2;
            }
            (0x00 | 0x09..=0x7F, _) => {
                out.push(c);
                i += 1;
            }
            _ => {
                out.push(0x01);
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Builds a Palm database file from its records.
pub fn build_pdb(name: &str, records: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();

    let mut name_field = [0u8; 32];
    name_field[..name.len()].copy_from_slice(name.as_bytes());
    out.extend_from_slice(&name_field);
    out.extend_from_slice(&0u16.to_be_bytes()); // attributes
    out.extend_from_slice(&0u16.to_be_bytes()); // version
    for _ in 0..6 {
        out.extend_from_slice(&0u32.to_be_bytes()); // dates, modification number, info ids
    }
    out.extend_from_slice(b"BOOK");
    out.extend_from_slice(b"MOBI");
    out.extend_from_slice(&0u32.to_be_bytes()); // unique id seed
    out.extend_from_slice(&0u32.to_be_bytes()); // next record list
    out.extend_from_slice(&(records.len() as u16).to_be_bytes());
    assert_eq!(out.len(), 78);

    let mut offset = 78 + records.len() * 8 + 2;
    for (i, record) in records.iter().enumerate() {
        out.extend_from_slice(&(offset as u32).to_be_bytes());
        out.push(0);
        out.extend_from_slice(&[0, 0, i as u8]);
        offset += record.len();
    }
    out.extend_from_slice(&[0, 0]);

    for record in records {
        out.extend_from_slice(record);
    }
    out
}

/// Description of a synthetic book.
#[derive(Debug, Clone)]
pub struct BookSpec {
    pub title: String,
    pub compression: u16,
    pub encoding: u32,
    pub header_length: u32,
    pub extra_flags: u32,
    /// Text records as stored: compressed, trailing entries already appended.
    pub text_records: Vec<Vec<u8>>,
    /// Records after the text: images, FLIS/FCIS, EOF.
    pub tail_records: Vec<Vec<u8>>,
    /// Index into `tail_records` of the first image.
    pub first_image: Option<usize>,
}

impl BookSpec {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            compression: 1,
            encoding: 65001,
            header_length: 232,
            extra_flags: 0,
            text_records: Vec::new(),
            tail_records: vec![EOF_RECORD.to_vec()],
            first_image: None,
        }
    }

    pub fn first_non_book(&self) -> u32 {
        1 + self.text_records.len() as u32
    }

    /// Builds record 0: PalmDOC header, MOBI header, then the title.
    pub fn record0(&self) -> Vec<u8> {
        let text_length: usize = self.text_records.iter().map(Vec::len).sum();

        let mut out = Vec::new();
        out.extend_from_slice(&self.compression.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&(text_length as u32).to_be_bytes());
        out.extend_from_slice(&(self.text_records.len() as u16).to_be_bytes());
        out.extend_from_slice(&4096u16.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());

        out.extend_from_slice(b"MOBI");
        out.extend_from_slice(&self.header_length.to_be_bytes());

        let name_offset = 24 + self.header_length as usize;
        let first_image = self
            .first_image
            .map_or(NULL_INDEX, |i| self.first_non_book() + i as u32);

        let mut data = vec![0u8; 224];
        put_u32(&mut data, offsets::MOBI_TYPE, 2);
        put_u32(&mut data, offsets::TEXT_ENCODING, self.encoding);
        put_u32(&mut data, offsets::FILE_VERSION, 6);
        put_u32(&mut data, offsets::FIRST_NON_BOOK, self.first_non_book());
        put_u32(&mut data, offsets::NAME_OFFSET, name_offset as u32);
        put_u32(&mut data, offsets::NAME_LENGTH, self.title.len() as u32);
        put_u32(&mut data, offsets::FIRST_IMAGE, first_image);
        data[offsets::FIRST_TEXT_RECORD..offsets::FIRST_TEXT_RECORD + 2]
            .copy_from_slice(&1u16.to_be_bytes());
        put_u32(&mut data, offsets::EXTRA_FLAGS, self.extra_flags);

        data.resize(self.header_length as usize, 0);
        out.extend_from_slice(&data);
        assert_eq!(out.len(), name_offset);

        out.extend_from_slice(self.title.as_bytes());
        out.extend_from_slice(&[0, 0]);
        out
    }

    pub fn records(&self) -> Vec<Vec<u8>> {
        let mut records = vec![self.record0()];
        records.extend(self.text_records.iter().cloned());
        records.extend(self.tail_records.iter().cloned());
        records
    }

    pub fn build(&self) -> Vec<u8> {
        build_pdb("Synthetic_Book", &self.records())
    }
}

pub fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}
