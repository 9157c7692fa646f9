//! Custom error types for the mobi-reader crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum MobiError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The Palm database header or its record table is shorter than declared.
    #[error("Truncated container: expected at least {expected} bytes, but found {found} bytes")]
    TruncatedContainer { expected: u64, found: u64 },

    /// The container is structurally invalid (bad record offsets, missing records).
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Record 0 is too short for the PalmDOC header, the MOBI header id,
    /// or the extended header length it declares.
    #[error("Truncated {context}: expected {expected} bytes, but found {found} bytes")]
    TruncatedHeader {
        context: &'static str,
        expected: u64,
        found: u64,
    },

    /// The title location points outside record 0.
    #[error("Invalid name range: offset {offset} + length {length} exceeds record 0 ({record_len} bytes)")]
    InvalidNameRange {
        offset: u32,
        length: u32,
        record_len: usize,
    },

    /// The first non-book record lies beyond the records in the container.
    #[error("Invalid record range: first non-book record {first_non_book} exceeds record count {record_count}")]
    InvalidRecordRange {
        first_non_book: u32,
        record_count: usize,
    },

    /// The book uses a compression mode this crate cannot decode (e.g. HUFF/CDIC).
    #[error("Unsupported compression mode: {mode}")]
    UnsupportedCompression { mode: u16 },

    /// A text record failed PalmDOC decompression.
    #[error("Decompression of record {index} failed: {cause}")]
    RecordDecompressionError {
        index: usize,
        #[source]
        cause: PalmDocError,
    },

    /// The trailing entries of a text record could not be decoded.
    #[error("Trailer decode failed for record {record_index}, flag bit {bit}: {cause}")]
    TrailerDecodeError {
        record_index: usize,
        bit: u8,
        #[source]
        cause: TrailerError,
    },
}

/// Failures of the PalmDOC (LZ77) decompressor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PalmDocError {
    #[error("literal run of {needed} bytes at offset {offset} exceeds input ({available} bytes left)")]
    TruncatedLiteral {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("back-reference at offset {offset} is missing its second byte")]
    TruncatedBackReference { offset: usize },

    #[error("back-reference at offset {offset} has distance {distance}, but only {produced} bytes were decoded")]
    InvalidDistance {
        offset: usize,
        distance: usize,
        produced: usize,
    },
}

/// Failures while removing trailing entries from a text record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrailerError {
    /// No byte in the scanned region has its top bit set.
    #[error("no terminator byte found in {scanned} bytes")]
    NoTerminatorFound { scanned: usize },

    /// The reverse-encoded integer has more digits than fit in 64 bits.
    #[error("reverse-encoded integer of {width} bytes overflows 64 bits")]
    VarintOverflow { width: usize },

    /// The declared trailer size is smaller than its own size prefix.
    #[error("trailer size {value} is smaller than its {width}-byte size prefix")]
    LengthUnderflow { value: u64, width: usize },

    /// The trailer claims more bytes than the record has left.
    #[error("trailer needs {needed} bytes, but only {available} remain")]
    PayloadOverrun { needed: u64, available: usize },
}

/// A convenience `Result` type alias using the crate's `MobiError` type.
pub type Result<T> = std::result::Result<T, MobiError>;
