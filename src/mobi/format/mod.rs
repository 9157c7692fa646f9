//! File format parsing layer for MOBI ebook files.
//!
//! This module provides the mid-level parsing layer that bridges between
//! the raw container and the high-level [`Mobi`](crate::mobi::reader::Mobi) document.
//!
//! # Module Organization
//!
//! - [`pdb`]: Splits the Palm database container into records
//! - [`header`]: Parses the PalmDOC and MOBI headers in record 0
//! - [`trailer`]: Strips trailing entries from text records
//! - [`text`]: Reassembles and decompresses the book text
//! - [`images`]: Collects image records
//!
//! # Architecture
//!
//! ```text
//! File Structure:
//! ┌─────────────────┐
//! │  PDB Header     │ ← pdb::Pdb::read()
//! ├─────────────────┤
//! │  Record 0       │ ← header::parse()
//! ├─────────────────┤
//! │  Text Records   │ ← text::assemble()
//! │  (trailers,     │     └ trailer::strip()
//! │   compressed)   │
//! ├─────────────────┤
//! │  Image Records  │ ← images::extract()
//! ├─────────────────┤
//! │  FLIS/FCIS/EOF  │
//! └─────────────────┘
//! ```

pub mod header;
pub mod images;
pub mod pdb;
pub mod text;
pub mod trailer;
