//! # Trailing Entry Stripping
//!
//! Every text record may carry trailing entries after its compressed text.
//! Which entries are present is a per-book property: bit `n` of the MOBI
//! header's extra flags is set when entry kind `n` is appended to every record.
//!
//! ```text
//! [ text ][ multibyte (bit 0) ][ entry bit 1 ][ entry bit 2 ] ...
//!                                             ^ stripped first
//! ```
//!
//! Entries are stacked: the highest bit was appended last and is removed
//! first, each removal shortening the record for the next one.

use log::{trace, warn};

use crate::mobi::types::error::{MobiError, Result, TrailerError};
use crate::mobi::types::models::{TrailerKind, TrailerPolicy};

/// A record made only of these bytes is filler with no trailing entries.
const NULL_RECORD: [u8; 3] = [0, 0, 0];

/// Largest number of base-128 digits that fits in a `u64`.
const MAX_VARINT_WIDTH: usize = 9;

/// A reverse-encoded integer located at the end of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReverseVarint {
    pub value: u64,
    /// Index of the integer's first byte; everything before it remains.
    pub start: usize,
    /// Number of bytes the integer occupies.
    pub width: usize,
}

/// Decodes the reverse-encoded base-128 integer at the end of `data`.
///
/// Bytes are scanned from the end toward the front until one with the top
/// bit set; that byte is the most significant digit. Each byte contributes
/// its low 7 bits.
pub fn reverse_decode_int(data: &[u8]) -> std::result::Result<ReverseVarint, TrailerError> {
    let start = data
        .iter()
        .rposition(|&b| b & 0x80 != 0)
        .ok_or(TrailerError::NoTerminatorFound { scanned: data.len() })?;

    let digits = &data[start..];
    if digits.len() > MAX_VARINT_WIDTH {
        return Err(TrailerError::VarintOverflow { width: digits.len() });
    }

    let value = digits
        .iter()
        .fold(0u64, |acc, &b| (acc << 7) | u64::from(b & 0x7F));

    Ok(ReverseVarint {
        value,
        start,
        width: digits.len(),
    })
}

/// Removes one trailing entry of the given kind from the end of `data`.
pub fn strip_entry(data: &[u8], kind: TrailerKind) -> std::result::Result<&[u8], TrailerError> {
    match kind {
        TrailerKind::Multibyte => {
            let Some(&last) = data.last() else {
                return Err(TrailerError::PayloadOverrun { needed: 1, available: 0 });
            };
            let size = 1 + usize::from(last & 0x03);
            if size > data.len() {
                return Err(TrailerError::PayloadOverrun {
                    needed: size as u64,
                    available: data.len(),
                });
            }
            Ok(&data[..data.len() - size])
        }
        TrailerKind::Sized => {
            let varint = reverse_decode_int(data)?;
            // The stored size covers the size prefix itself.
            let payload = varint
                .value
                .checked_sub(varint.width as u64)
                .ok_or(TrailerError::LengthUnderflow {
                    value: varint.value,
                    width: varint.width,
                })?;
            let payload = usize::try_from(payload)
                .ok()
                .filter(|&p| p <= varint.start)
                .ok_or(TrailerError::PayloadOverrun {
                    needed: payload,
                    available: varint.start,
                })?;
            Ok(&data[..varint.start - payload])
        }
    }
}

/// Strips all trailing entries selected by `extra_flags` from one record.
///
/// # Parameters
/// * `data` - Raw record bytes as stored in the container
/// * `extra_flags` - The MOBI header's extra-flags bitmask
/// * `record_index` - Container index of the record, for error context
/// * `policy` - Whether a malformed entry fails the parse or is tolerated
///
/// # Errors
/// [`MobiError::TrailerDecodeError`] under [`TrailerPolicy::Strict`] when an
/// entry cannot be decoded.
pub fn strip(
    data: &[u8],
    extra_flags: u32,
    record_index: usize,
    policy: TrailerPolicy,
) -> Result<&[u8]> {
    if data == NULL_RECORD {
        trace!("Record {} is null filler, stripping to empty", record_index);
        return Ok(&[]);
    }

    let mut remaining = data;
    for (bit, kind) in TrailerKind::from_flags(extra_flags) {
        match strip_entry(remaining, kind) {
            Ok(rest) => {
                trace!(
                    "Record {}: bit {} ({:?}) stripped {} bytes",
                    record_index,
                    bit,
                    kind,
                    remaining.len() - rest.len()
                );
                remaining = rest;
            }
            Err(cause) if policy == TrailerPolicy::Lenient => {
                warn!(
                    "Trailer decode error for record {}, bit {}: {}; keeping {} bytes",
                    record_index,
                    bit,
                    cause,
                    remaining.len()
                );
                return Ok(remaining);
            }
            Err(cause) => {
                return Err(MobiError::TrailerDecodeError {
                    record_index,
                    bit,
                    cause,
                });
            }
        }
    }

    Ok(remaining)
}
