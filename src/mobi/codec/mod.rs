//! Codec layer for text record decompression.
//!
//! # Submodules
//!
//! - [`compression`][]: PalmDOC (LZ77) decoding and the per-mode dispatcher

pub mod compression;
