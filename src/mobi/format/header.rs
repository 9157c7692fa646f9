//! Record 0 header parsing.
//!
//! This module handles:
//! - Decoding the fixed 16-byte PalmDOC header
//! - Decoding the MOBI header id and its declared length
//! - Decoding the versioned extended header, zero-filling fields older files omit
//! - Extracting the book title

use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};
use log::{debug, info, trace};

use crate::mobi::types::error::{MobiError, Result};
use crate::mobi::types::models::{
    MOBI_HEADER_DATA_SIZE, MOBI_HEADER_ID_SIZE, MobiHeader, MobiHeaderData, MobiHeaderId,
    PALMDOC_HEADER_SIZE, PalmDocHeader,
};
use crate::mobi::utils::FieldReader;

/// Offset of the extended header data within record 0.
const HEADER_DATA_OFFSET: usize = PALMDOC_HEADER_SIZE + MOBI_HEADER_ID_SIZE;

/// Parses the headers stored in record 0.
///
/// # Record 0 Structure
/// ```text
/// [16 bytes] PalmDOC header (compression, text length, record count/size)
/// [ 4 bytes] Identifier, normally "MOBI"
/// [ 4 bytes] Extended header length
/// [N bytes]  Extended header data (versioned, up to 224 known bytes)
/// [...]      EXTH block, full name, padding
/// ```
///
/// # Parameters
/// * `record0` - Raw bytes of the container's first record
/// * `record_count` - Total number of records in the container
///
/// # Errors
/// - [`MobiError::TruncatedHeader`] if a header extends past record 0
/// - [`MobiError::InvalidNameRange`] if the title lies outside record 0
/// - [`MobiError::InvalidRecordRange`] if the text records exceed the container
pub fn parse(record0: &[u8], record_count: usize) -> Result<MobiHeader> {
    debug!("Parsing record 0 ({} bytes)", record0.len());

    // Step 1: PalmDOC header
    let palmdoc = parse_palmdoc_header(record0)?;
    debug!(
        "PalmDOC header: compression={:?}, text_length={}, record_count={}, record_size={}",
        palmdoc.compression, palmdoc.text_length, palmdoc.record_count, palmdoc.record_size
    );

    // Step 2: MOBI header id
    let id = parse_header_id(record0)?;
    if &id.identifier != b"MOBI" {
        debug!(
            "Unexpected header identifier {:?}, continuing",
            String::from_utf8_lossy(&id.identifier)
        );
    }

    // Step 3: Bound the extended header by its declared length
    let header_end = HEADER_DATA_OFFSET as u64 + u64::from(id.header_length);
    trace!("Extended header length: {} (ends at {})", id.header_length, header_end);
    if header_end > record0.len() as u64 {
        return Err(MobiError::TruncatedHeader {
            context: "extended header",
            expected: header_end,
            found: record0.len() as u64,
        });
    }

    // Step 4: Extended header, zero-extended when short
    let data = parse_header_data(&record0[HEADER_DATA_OFFSET..header_end as usize]);
    debug!(
        "MOBI header: type={:?}, encoding={:?}, version={}, first_non_book={}, first_image={:#x}, extra_flags={:#06x}",
        data.mobi_type,
        data.text_encoding,
        data.file_version,
        data.first_non_book_record,
        data.first_image,
        data.extra_flags
    );

    if data.first_non_book_record as usize > record_count {
        return Err(MobiError::InvalidRecordRange {
            first_non_book: data.first_non_book_record,
            record_count,
        });
    }

    // Step 5: Title
    let title = parse_title(record0, &data)?;

    info!(
        "Header parsed successfully: title='{}', compression={:?}, text records={}",
        title,
        palmdoc.compression,
        data.first_non_book_record.saturating_sub(1)
    );

    Ok(MobiHeader {
        palmdoc,
        id,
        data,
        title,
    })
}

fn parse_palmdoc_header(record0: &[u8]) -> Result<PalmDocHeader> {
    if record0.len() < PALMDOC_HEADER_SIZE {
        return Err(MobiError::TruncatedHeader {
            context: "PalmDOC header",
            expected: PALMDOC_HEADER_SIZE as u64,
            found: record0.len() as u64,
        });
    }

    let mut reader = &record0[..PALMDOC_HEADER_SIZE];
    Ok(PalmDocHeader {
        compression: reader.read_u16::<BigEndian>()?.into(),
        unused: reader.read_u16::<BigEndian>()?,
        text_length: reader.read_u32::<BigEndian>()?,
        record_count: reader.read_u16::<BigEndian>()?,
        record_size: reader.read_u16::<BigEndian>()?,
        encryption_type: reader.read_u16::<BigEndian>()?,
        unknown: reader.read_u16::<BigEndian>()?,
    })
}

fn parse_header_id(record0: &[u8]) -> Result<MobiHeaderId> {
    if record0.len() < HEADER_DATA_OFFSET {
        return Err(MobiError::TruncatedHeader {
            context: "MOBI header id",
            expected: HEADER_DATA_OFFSET as u64,
            found: record0.len() as u64,
        });
    }

    let mut reader = &record0[PALMDOC_HEADER_SIZE..HEADER_DATA_OFFSET];
    let mut identifier = [0u8; 4];
    reader.read_exact(&mut identifier)?;
    let header_length = reader.read_u32::<BigEndian>()?;

    Ok(MobiHeaderId {
        identifier,
        header_length,
    })
}

/// Decodes the extended header fields in on-disk order.
///
/// Never fails: fields beyond the end of `raw` read as zero.
pub fn parse_header_data(raw: &[u8]) -> MobiHeaderData {
    if raw.len() < MOBI_HEADER_DATA_SIZE {
        debug!(
            "Short extended header ({} of {} bytes), zero-filling the rest",
            raw.len(),
            MOBI_HEADER_DATA_SIZE
        );
    }

    let mut r = FieldReader::new(raw);
    let data = MobiHeaderData {
        mobi_type: r.u32().into(),
        text_encoding: r.u32().into(),
        unique_id: r.u32(),
        file_version: r.u32(),
        orthographic_index: r.u32(),
        inflection_index: r.u32(),
        index_names: r.u32(),
        index_keys: r.u32(),
        extra_index: r.u32_array(),
        first_non_book_record: r.u32(),
        name_offset: r.u32(),
        name_length: r.u32(),
        locale: r.u32(),
        input_language: r.u32(),
        output_language: r.u32(),
        min_version: r.u32(),
        first_image: r.u32(),
        huffman_record_offset: r.u32(),
        huffman_record_count: r.u32(),
        huffman_table_offset: r.u32(),
        huffman_table_length: r.u32(),
        exth_flags: r.u32(),
        padding: r.bytes(),
        unknown1: r.u32(),
        drm_offset: r.u32(),
        drm_count: r.u32(),
        drm_length: r.u32(),
        drm_flags: r.u32(),
        unknown2: r.u32_array(),
        first_text_record: r.u16(),
        last_content_record: r.u16(),
        unknown3: r.u32(),
        fcis_record_number: r.u32(),
        unknown4: r.u32(),
        flis_record_number: r.u32(),
        unknown5: r.u32(),
        unknown6: r.u32_array(),
        unknown7: r.u32(),
        first_comp_data_section_count: r.u32(),
        number_of_compilation_sections: r.u32(),
        unknown8: r.u32(),
        extra_flags: r.u32(),
        indx_record_offset: r.u32(),
    };
    debug_assert_eq!(r.position(), MOBI_HEADER_DATA_SIZE);
    if r.is_short() {
        trace!("Extended header fields past byte {} defaulted to zero", raw.len());
    }

    data
}

/// Extracts the full name from record 0 and decodes it with the book's encoding.
fn parse_title(record0: &[u8], data: &MobiHeaderData) -> Result<String> {
    let start = data.name_offset as usize;
    let end = start.checked_add(data.name_length as usize);
    let name_bytes = end
        .and_then(|end| record0.get(start..end))
        .ok_or(MobiError::InvalidNameRange {
            offset: data.name_offset,
            length: data.name_length,
            record_len: record0.len(),
        })?;

    let (title, _, had_errors) = data.text_encoding.encoding().decode(name_bytes);
    if had_errors {
        debug!("Title contains bytes invalid in {:?}", data.text_encoding);
    }
    Ok(title.into_owned())
}
