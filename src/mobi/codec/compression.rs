//! Decompression algorithms for MOBI text records.
//!
//! MOBI files declare one compression mode for all text records:
//! - None (1): Records are stored as-is
//! - PalmDOC (2): LZ77-family byte stream, decoded here
//! - HUFF/CDIC (17480): Not supported

use log::trace;

use crate::mobi::types::error::{MobiError, PalmDocError, Result};
use crate::mobi::types::models::Compression;

/// Appends the decompressed form of one text record to `output`.
///
/// # Compression Types
/// - `None`: Copies the payload unchanged
/// - `PalmDoc`: Decodes the payload with [`palmdoc_decompress_into`]
/// - Anything else: [`MobiError::UnsupportedCompression`]
///
/// `record_index` is only used for error context.
pub fn decompress_payload_into(
    output: &mut Vec<u8>,
    payload: &[u8],
    compression: Compression,
    record_index: usize,
) -> Result<()> {
    match compression {
        Compression::None => {
            trace!("No compression, copying {} bytes", payload.len());
            output.extend_from_slice(payload);
        }
        Compression::PalmDoc => {
            let before = output.len();
            palmdoc_decompress_into(output, payload).map_err(|cause| {
                MobiError::RecordDecompressionError {
                    index: record_index,
                    cause,
                }
            })?;
            trace!(
                "Decompressed PalmDOC record {}: {} bytes -> {} bytes",
                record_index,
                payload.len(),
                output.len() - before
            );
        }
        other => {
            return Err(MobiError::UnsupportedCompression { mode: other.raw() });
        }
    }

    Ok(())
}

/// Decompresses a PalmDOC byte stream into a new buffer.
pub fn palmdoc_decompress(data: &[u8]) -> std::result::Result<Vec<u8>, PalmDocError> {
    let mut out = Vec::with_capacity(data.len() * 2);
    palmdoc_decompress_into(&mut out, data)?;
    Ok(out)
}

/// Decompresses a PalmDOC byte stream, appending to `out`.
///
/// Back-references may only reach bytes produced by this call; whatever
/// `out` held beforehand belongs to earlier records.
///
/// # Token Format
/// ```text
/// 0x00, 0x09..=0x7F  literal byte
/// 0x01..=0x08        copy the next N bytes verbatim
/// 0x80..=0xBF        2-byte back-reference: 11-bit distance, 3-bit length - 3
/// 0xC0..=0xFF        space followed by (byte ^ 0x80)
/// ```
pub fn palmdoc_decompress_into(
    out: &mut Vec<u8>,
    data: &[u8],
) -> std::result::Result<(), PalmDocError> {
    let base = out.len();
    let mut i = 0usize;

    while i < data.len() {
        let offset = i;
        let c = data[i];
        i += 1;

        match c {
            0x01..=0x08 => {
                let n = c as usize;
                let available = data.len() - i;
                if n > available {
                    return Err(PalmDocError::TruncatedLiteral {
                        offset,
                        needed: n,
                        available,
                    });
                }
                out.extend_from_slice(&data[i..i + n]);
                i += n;
            }
            0x00 | 0x09..=0x7F => out.push(c),
            0x80..=0xBF => {
                let Some(&next) = data.get(i) else {
                    return Err(PalmDocError::TruncatedBackReference { offset });
                };
                i += 1;

                let token = u16::from_be_bytes([c, next]);
                let distance = ((token >> 3) & 0x07FF) as usize;
                let length = (token & 0x0007) as usize + 3;

                let produced = out.len() - base;
                if distance == 0 || distance > produced {
                    return Err(PalmDocError::InvalidDistance {
                        offset,
                        distance,
                        produced,
                    });
                }

                // Source and destination may overlap, so copy byte by byte.
                let mut src = out.len() - distance;
                for _ in 0..length {
                    let b = out[src];
                    out.push(b);
                    src += 1;
                }
            }
            0xC0..=0xFF => {
                out.push(b' ');
                out.push(c ^ 0x80);
            }
        }
    }

    Ok(())
}
