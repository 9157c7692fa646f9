//! Core data structures for MOBI format components.
//!
//! This module defines the fundamental types used throughout the library:
//! - The Palm database header and record table
//! - The PalmDOC and MOBI headers stored in record 0
//! - Compression, encoding and trailer enumerations
//! - Extracted image records

use encoding_rs::Encoding;

/// Size of the fixed Palm database header preceding the record table.
pub const PDB_HEADER_SIZE: usize = 78;

/// Size of one entry in the Palm database record table.
pub const PDB_RECORD_ENTRY_SIZE: usize = 8;

/// Size of the PalmDOC header at the start of record 0.
pub const PALMDOC_HEADER_SIZE: usize = 16;

/// Size of the MOBI header id (identifier + header length).
pub const MOBI_HEADER_ID_SIZE: usize = 8;

/// Size of the longest known extended MOBI header layout.
pub const MOBI_HEADER_DATA_SIZE: usize = 224;

/// Sentinel value used by record index fields that are not set.
pub const NULL_INDEX: u32 = 0xFFFF_FFFF;

/// Header of a Palm database (PDB) file.
#[derive(Debug, Clone)]
pub struct PdbHeader {
    /// Database name, with NUL padding removed.
    pub name: String,
    pub attributes: u16,
    pub version: u16,
    pub creation_date: u32,
    pub modification_date: u32,
    pub last_backup_date: u32,
    pub modification_number: u32,
    pub app_info_id: u32,
    pub sort_info_id: u32,
    /// Database type, `BOOK` for Mobipocket files.
    pub db_type: [u8; 4],
    /// Database creator, `MOBI` for Mobipocket files.
    pub creator: [u8; 4],
    pub unique_id_seed: u32,
    pub next_record_list_id: u32,
    pub num_records: u16,
}

/// One entry of the Palm database record table.
#[derive(Debug, Clone, Copy)]
pub struct RecordEntry {
    /// Absolute byte offset of the record in the file.
    pub offset: u32,
    pub attributes: u8,
    pub unique_id: [u8; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    PalmDoc,
    HuffCdic,
    Unknown(u16),
}

impl Compression {
    /// Returns the raw value stored in the PalmDOC header.
    pub fn raw(self) -> u16 {
        match self {
            Compression::None => 1,
            Compression::PalmDoc => 2,
            Compression::HuffCdic => 17480,
            Compression::Unknown(v) => v,
        }
    }
}

impl From<u16> for Compression {
    fn from(value: u16) -> Self {
        match value {
            1 => Self::None,
            2 => Self::PalmDoc,
            17480 => Self::HuffCdic,
            other => Self::Unknown(other),
        }
    }
}

/// The 16-byte header at the start of record 0.
#[derive(Debug, Clone, Copy)]
pub struct PalmDocHeader {
    pub compression: Compression,
    pub unused: u16,
    /// Length of the book's uncompressed text.
    pub text_length: u32,
    /// Number of records holding the book's text.
    pub record_count: u16,
    /// Maximum uncompressed size of each text record (normally 4096).
    pub record_size: u16,
    pub encryption_type: u16,
    pub unknown: u16,
}

/// The identifier and length that open the extended MOBI header.
#[derive(Debug, Clone, Copy)]
pub struct MobiHeaderId {
    /// Normally the characters `MOBI`.
    pub identifier: [u8; 4],
    /// Declared length of the extended header.
    pub header_length: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobiType {
    Mobipocket,
    PalmDoc,
    Audio,
    Kindlegen,
    Kf8,
    News,
    NewsFeed,
    NewsMagazine,
    Pics,
    Word,
    Xls,
    Ppt,
    Text,
    Html,
    Other(u32),
}

impl From<u32> for MobiType {
    fn from(value: u32) -> Self {
        match value {
            2 => Self::Mobipocket,
            3 => Self::PalmDoc,
            4 => Self::Audio,
            232 => Self::Kindlegen,
            248 => Self::Kf8,
            257 => Self::News,
            258 => Self::NewsFeed,
            259 => Self::NewsMagazine,
            513 => Self::Pics,
            514 => Self::Word,
            515 => Self::Xls,
            516 => Self::Ppt,
            517 => Self::Text,
            518 => Self::Html,
            other => Self::Other(other),
        }
    }
}

/// Text encoding declared by the MOBI header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    WinLatin1,
    Utf8,
    Other(u32),
}

impl TextEncoding {
    /// Returns the `encoding_rs` codec for this encoding.
    ///
    /// Unknown code pages fall back to Windows-1252, the format's default.
    pub fn encoding(self) -> &'static Encoding {
        match self {
            TextEncoding::Utf8 => encoding_rs::UTF_8,
            TextEncoding::WinLatin1 | TextEncoding::Other(_) => encoding_rs::WINDOWS_1252,
        }
    }
}

impl From<u32> for TextEncoding {
    fn from(value: u32) -> Self {
        match value {
            1252 => Self::WinLatin1,
            65001 => Self::Utf8,
            other => Self::Other(other),
        }
    }
}

/// The versioned extended MOBI header.
///
/// Field order follows the on-disk layout starting at record 0 offset 24.
/// Fields past the end of a short (older) header are zero.
#[derive(Debug, Clone)]
pub struct MobiHeaderData {
    pub mobi_type: MobiType,
    pub text_encoding: TextEncoding,
    pub unique_id: u32,
    pub file_version: u32,
    pub orthographic_index: u32,
    pub inflection_index: u32,
    pub index_names: u32,
    pub index_keys: u32,
    pub extra_index: [u32; 6],
    /// First record that is not part of the book's text.
    pub first_non_book_record: u32,
    /// Offset of the full name, relative to the start of record 0.
    pub name_offset: u32,
    pub name_length: u32,
    pub locale: u32,
    pub input_language: u32,
    pub output_language: u32,
    pub min_version: u32,
    /// First record holding an image, or [`NULL_INDEX`].
    pub first_image: u32,
    pub huffman_record_offset: u32,
    pub huffman_record_count: u32,
    pub huffman_table_offset: u32,
    pub huffman_table_length: u32,
    pub exth_flags: u32,
    pub padding: [u8; 32],
    pub unknown1: u32,
    pub drm_offset: u32,
    pub drm_count: u32,
    pub drm_length: u32,
    pub drm_flags: u32,
    pub unknown2: [u32; 2],
    pub first_text_record: u16,
    pub last_content_record: u16,
    pub unknown3: u32,
    pub fcis_record_number: u32,
    pub unknown4: u32,
    pub flis_record_number: u32,
    pub unknown5: u32,
    pub unknown6: [u32; 2],
    pub unknown7: u32,
    pub first_comp_data_section_count: u32,
    pub number_of_compilation_sections: u32,
    pub unknown8: u32,
    /// Bitmask of trailing entries appended to every text record.
    pub extra_flags: u32,
    pub indx_record_offset: u32,
}

/// Complete parsed contents of record 0.
#[derive(Debug, Clone)]
pub struct MobiHeader {
    pub palmdoc: PalmDocHeader,
    pub id: MobiHeaderId,
    pub data: MobiHeaderData,
    pub title: String,
}

impl MobiHeader {
    /// Returns the codec for the book's declared text encoding.
    pub fn encoding(&self) -> &'static Encoding {
        self.data.text_encoding.encoding()
    }
}

/// Kinds of trailing entries selected by the extra-flags bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailerKind {
    /// Bit 0: bytes completing a multibyte character split across records.
    /// The two low bits of the final byte hold the entry length minus one.
    Multibyte,
    /// Bits 1..=15: an entry whose total size is stored as a
    /// reverse-encoded integer at its end.
    Sized,
}

impl TrailerKind {
    /// Highest flag bit that describes a trailing entry.
    pub const MAX_BIT: u8 = 15;

    pub fn for_bit(bit: u8) -> Self {
        if bit == 0 { Self::Multibyte } else { Self::Sized }
    }

    /// Returns the `(bit, kind)` pairs set in `extra_flags`, in stripping
    /// order: highest bit first, so the entry appended last is removed first.
    pub fn from_flags(extra_flags: u32) -> impl Iterator<Item = (u8, TrailerKind)> {
        (0..=Self::MAX_BIT)
            .rev()
            .filter(move |bit| extra_flags & (1 << bit) != 0)
            .map(|bit| (bit, Self::for_bit(bit)))
    }
}

/// How malformed trailing entries are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrailerPolicy {
    /// Fail the parse with [`MobiError::TrailerDecodeError`](super::error::MobiError::TrailerDecodeError).
    #[default]
    Strict,
    /// Log a warning and keep the record as stripped so far.
    Lenient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
}

impl ImageFormat {
    /// Identifies an image by its leading signature bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if data.starts_with(&[0x89, b'P', b'N', b'G']) {
            Some(Self::Png)
        } else if data.starts_with(b"GIF8") {
            Some(Self::Gif)
        } else if data.starts_with(b"BM") {
            Some(Self::Bmp)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
        }
    }
}

/// An image payload extracted from the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Index of the source record in the container.
    pub record_index: usize,
    pub format: ImageFormat,
    pub data: Vec<u8>,
}
