//! Text record reassembly.
//!
//! The book text is split across records `1..first_non_book_record`, with
//! sentences crossing record boundaries. Each record is stripped of its
//! trailing entries, decompressed, and appended in index order.

use log::{debug, trace};

use super::pdb::Pdb;
use super::trailer;
use crate::mobi::codec::compression;
use crate::mobi::types::error::{MobiError, Result};
use crate::mobi::types::models::{Compression, MobiHeader, TrailerPolicy};

/// Upper bound for the up-front buffer reservation.
const MAX_PREALLOC: usize = 64 * 1024 * 1024;

/// Reassembles the full book text from the container's text records.
///
/// # Errors
/// - [`MobiError::UnsupportedCompression`] before any record is read, if the
///   book is neither uncompressed nor PalmDOC-compressed
/// - [`MobiError::TrailerDecodeError`] if a record's trailing entries are malformed
/// - [`MobiError::RecordDecompressionError`] if a record fails to decompress
pub fn assemble(pdb: &Pdb, header: &MobiHeader, policy: TrailerPolicy) -> Result<Vec<u8>> {
    let compression = header.palmdoc.compression;
    if !matches!(compression, Compression::None | Compression::PalmDoc) {
        return Err(MobiError::UnsupportedCompression {
            mode: compression.raw(),
        });
    }

    let first_non_book = header.data.first_non_book_record as usize;
    let extra_flags = header.data.extra_flags;

    let capacity = (header.palmdoc.record_count as usize)
        .saturating_mul(header.palmdoc.record_size as usize)
        .min(MAX_PREALLOC);
    let mut text = Vec::with_capacity(capacity);

    debug!(
        "Assembling text from records 1..{} ({:?}, extra_flags={:#06x})",
        first_non_book, compression, extra_flags
    );

    for index in 1..first_non_book {
        let raw = pdb.record(index).ok_or(MobiError::InvalidRecordRange {
            first_non_book: header.data.first_non_book_record,
            record_count: pdb.len(),
        })?;

        let payload = trailer::strip(raw, extra_flags, index, policy)?;
        trace!(
            "Record {}: {} raw bytes, {} after stripping",
            index,
            raw.len(),
            payload.len()
        );

        compression::decompress_payload_into(&mut text, payload, compression, index)?;
    }

    debug!("Assembled {} bytes of text", text.len());
    Ok(text)
}
