//! # mobi-reader
//!
//! A reader for MOBI (Mobipocket) ebook files.
//! Decodes the Palm database container, the PalmDOC and MOBI headers, and
//! the text records (uncompressed or PalmDOC-compressed), stripping the
//! trailing entries each text record carries.
//!
//! **Note:** HUFF/CDIC compressed books are rejected with
//! [`MobiError::UnsupportedCompression`].
pub mod mobi;

// Re-export the main types for convenience
pub use mobi::{
    Mobi, MobiError, MobiOptions, PalmDocError, Pdb, Result, TrailerError,
    types::models::{
        Compression, ImageFormat, ImageRecord, MobiHeader, MobiHeaderData, MobiType,
        PalmDocHeader, TextEncoding, TrailerKind, TrailerPolicy,
    },
};
