//! Image record extraction.
//!
//! Images follow the text records, starting at the header's first image
//! index. After them come metadata records (FLIS, FCIS, SRCS, ...) and
//! finally an end-of-file record.

use log::debug;

use super::pdb::Pdb;
use crate::mobi::types::models::{ImageFormat, ImageRecord, MobiHeaderData, NULL_INDEX};

/// Content of the record that closes a MOBI container.
pub const EOF_RECORD: [u8; 4] = [0xE9, 0x8E, 0x0D, 0x0A];

/// Collects image records from `first_image` up to the end-of-file record.
///
/// Records that are not recognisable images are skipped. Image records are
/// never taken from the text range.
pub fn extract(pdb: &Pdb, data: &MobiHeaderData) -> Vec<ImageRecord> {
    if data.first_image == NULL_INDEX || data.first_image as usize >= pdb.len() {
        debug!("No image records (first_image={:#x})", data.first_image);
        return Vec::new();
    }

    let start = (data.first_image as usize).max(data.first_non_book_record as usize);
    let mut images = Vec::new();

    for index in start..pdb.len() {
        let Some(record) = pdb.record(index) else { break };
        if record == EOF_RECORD {
            debug!("End-of-file record at {}", index);
            break;
        }

        match ImageFormat::detect(record) {
            Some(format) => images.push(ImageRecord {
                record_index: index,
                format,
                data: record.to_vec(),
            }),
            None => debug!(
                "Skipping non-image record {} ({:?})",
                index,
                String::from_utf8_lossy(&record[..record.len().min(4)])
            ),
        }
    }

    debug!("Extracted {} image records", images.len());
    images
}
