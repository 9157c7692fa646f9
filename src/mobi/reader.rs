use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use encoding_rs::Encoding;
use log::info;

use super::format::pdb::Pdb;
use super::format::{header, images, text};
use super::types::error::{MobiError, Result};
use super::types::models::*;

/// Parsing options.
///
/// The defaults reject any malformed input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MobiOptions {
    /// How malformed trailing entries on text records are handled.
    pub trailer_policy: TrailerPolicy,
}

impl MobiOptions {
    /// Options that keep records with undecodable trailing entries instead of failing.
    pub fn lenient() -> Self {
        Self {
            trailer_policy: TrailerPolicy::Lenient,
        }
    }
}

/// A decoded MOBI book.
///
/// Built once by one of the parse entry points and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Mobi {
    name: String,
    contents: Vec<u8>,
    images: Vec<ImageRecord>,
    header: MobiHeader,
}

impl Mobi {
    /// Read a MOBI file from the given path.
    ///
    /// # Errors
    /// Returns an error if:
    /// - File cannot be opened
    /// - The container or headers are truncated or inconsistent
    /// - The book uses HUFF/CDIC compression
    /// - A text record fails to strip or decompress
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, MobiOptions::default())
    }

    /// Read a MOBI file from the given path with explicit options.
    pub fn open_with(path: impl AsRef<Path>, options: MobiOptions) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening MOBI file: {}", path.display());
        let mut file = BufReader::new(File::open(path)?);
        Self::from_reader_with(&mut file, options)
    }

    /// Read a MOBI book from any seekable byte source.
    pub fn from_reader<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        Self::from_reader_with(reader, MobiOptions::default())
    }

    pub fn from_reader_with<R: Read + Seek>(reader: &mut R, options: MobiOptions) -> Result<Self> {
        let pdb = Pdb::read(reader)?;
        Self::from_pdb_with(&pdb, options)
    }

    /// Decode a book from an already opened Palm database.
    pub fn from_pdb(pdb: &Pdb) -> Result<Self> {
        Self::from_pdb_with(pdb, MobiOptions::default())
    }

    pub fn from_pdb_with(pdb: &Pdb, options: MobiOptions) -> Result<Self> {
        let record0 = pdb
            .record(0)
            .ok_or_else(|| MobiError::InvalidFormat("Container has no records".to_string()))?;

        let header = header::parse(record0, pdb.len())?;
        let contents = text::assemble(pdb, &header, options.trailer_policy)?;
        let images = images::extract(pdb, &header.data);

        info!(
            "MOBI book decoded: '{}', {} bytes of text, {} images",
            header.title,
            contents.len(),
            images.len()
        );

        Ok(Self {
            name: header.title.clone(),
            contents,
            images,
            header,
        })
    }

    /// The book's full name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The book text, as raw bytes in the book's declared encoding.
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn into_contents(self) -> Vec<u8> {
        self.contents
    }

    /// Image records in container order.
    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    /// The parsed PalmDOC and MOBI headers.
    pub fn header(&self) -> &MobiHeader {
        &self.header
    }

    pub fn palmdoc_header(&self) -> &PalmDocHeader {
        &self.header.palmdoc
    }

    /// The codec matching the book's declared text encoding.
    pub fn encoding(&self) -> &'static Encoding {
        self.header.encoding()
    }

    /// Decode the book text using the book's declared encoding.
    ///
    /// Invalid sequences are replaced with U+FFFD.
    pub fn decode_text(&self) -> String {
        let (text, _, _) = self.encoding().decode(&self.contents);
        text.into_owned()
    }
}
