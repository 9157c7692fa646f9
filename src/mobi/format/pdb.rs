//! Palm database (PDB) container parsing.
//!
//! # Layout
//! ```text
//! [78 bytes]      Database header (big-endian), ending with the record count
//! [8 bytes x N]   Record table: offset (u32), attributes (u8), unique id (3 bytes)
//! [...]           Record data; record i spans [offset_i, offset_{i+1})
//! ```
//!
//! The last record extends to the end of the file.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};
use log::{debug, info, trace};

use crate::mobi::types::error::{MobiError, Result};
use crate::mobi::types::models::{PDB_HEADER_SIZE, PDB_RECORD_ENTRY_SIZE, PdbHeader, RecordEntry};
use crate::mobi::utils;

/// An opened Palm database: its header and every record's bytes, in order.
#[derive(Debug, Clone)]
pub struct Pdb {
    pub header: PdbHeader,
    entries: Vec<RecordEntry>,
    records: Vec<Vec<u8>>,
}

impl Pdb {
    /// Reads a whole Palm database from the start of `reader`.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        reader.rewind()?;
        trace!("Container length: {} bytes", file_len);

        if file_len < PDB_HEADER_SIZE as u64 {
            return Err(MobiError::TruncatedContainer {
                expected: PDB_HEADER_SIZE as u64,
                found: file_len,
            });
        }

        let header = read_header(reader)?;
        debug!(
            "PDB header: name='{}', type={:?}, creator={:?}, {} records",
            header.name,
            String::from_utf8_lossy(&header.db_type),
            String::from_utf8_lossy(&header.creator),
            header.num_records
        );
        if &header.db_type != b"BOOK" || &header.creator != b"MOBI" {
            debug!("Container is not tagged BOOKMOBI, parsing anyway");
        }

        let table_end =
            PDB_HEADER_SIZE as u64 + u64::from(header.num_records) * PDB_RECORD_ENTRY_SIZE as u64;
        if file_len < table_end {
            return Err(MobiError::TruncatedContainer {
                expected: table_end,
                found: file_len,
            });
        }

        let entries = (0..header.num_records)
            .map(|_| read_entry(reader))
            .collect::<Result<Vec<_>>>()?;

        let records = read_records(reader, &entries, file_len)?;

        info!(
            "Palm database opened: '{}', {} records",
            header.name,
            records.len()
        );

        Ok(Self {
            header,
            entries,
            records,
        })
    }

    /// Reads a Palm database held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read(&mut std::io::Cursor::new(data))
    }

    /// Returns the bytes of record `index`, if it exists.
    pub fn record(&self, index: usize) -> Option<&[u8]> {
        self.records.get(index).map(Vec::as_slice)
    }

    /// Returns the record table entry for record `index`.
    pub fn entry(&self, index: usize) -> Option<&RecordEntry> {
        self.entries.get(index)
    }

    /// Number of records in the database.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over all records in order.
    pub fn records(&self) -> impl Iterator<Item = &[u8]> {
        self.records.iter().map(Vec::as_slice)
    }
}

fn read_header<R: Read>(reader: &mut R) -> Result<PdbHeader> {
    let mut name = [0u8; 32];
    reader.read_exact(&mut name)?;
    let name = String::from_utf8_lossy(utils::trim_nul(&name)).into_owned();

    let attributes = reader.read_u16::<BigEndian>()?;
    let version = reader.read_u16::<BigEndian>()?;
    let creation_date = reader.read_u32::<BigEndian>()?;
    let modification_date = reader.read_u32::<BigEndian>()?;
    let last_backup_date = reader.read_u32::<BigEndian>()?;
    let modification_number = reader.read_u32::<BigEndian>()?;
    let app_info_id = reader.read_u32::<BigEndian>()?;
    let sort_info_id = reader.read_u32::<BigEndian>()?;
    let mut db_type = [0u8; 4];
    reader.read_exact(&mut db_type)?;
    let mut creator = [0u8; 4];
    reader.read_exact(&mut creator)?;
    let unique_id_seed = reader.read_u32::<BigEndian>()?;
    let next_record_list_id = reader.read_u32::<BigEndian>()?;
    let num_records = reader.read_u16::<BigEndian>()?;

    Ok(PdbHeader {
        name,
        attributes,
        version,
        creation_date,
        modification_date,
        last_backup_date,
        modification_number,
        app_info_id,
        sort_info_id,
        db_type,
        creator,
        unique_id_seed,
        next_record_list_id,
        num_records,
    })
}

fn read_entry<R: Read>(reader: &mut R) -> Result<RecordEntry> {
    let offset = reader.read_u32::<BigEndian>()?;
    let attributes = reader.read_u8()?;
    let mut unique_id = [0u8; 3];
    reader.read_exact(&mut unique_id)?;
    Ok(RecordEntry {
        offset,
        attributes,
        unique_id,
    })
}

/// Reads every record's bytes using the boundaries from the record table.
fn read_records<R: Read + Seek>(
    reader: &mut R,
    entries: &[RecordEntry],
    file_len: u64,
) -> Result<Vec<Vec<u8>>> {
    let mut records = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let start = u64::from(entry.offset);
        let end = entries
            .get(index + 1)
            .map_or(file_len, |next| u64::from(next.offset));

        if start > end || end > file_len {
            return Err(MobiError::InvalidFormat(format!(
                "Record {} spans [{}..{}], outside a {}-byte container",
                index, start, end, file_len
            )));
        }

        reader.seek(SeekFrom::Start(start))?;
        let mut data = vec![0u8; (end - start) as usize];
        reader.read_exact(&mut data).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => MobiError::TruncatedContainer {
                expected: end,
                found: file_len,
            },
            _ => MobiError::Io(e),
        })?;
        trace!("Record {}: {} bytes at offset {}", index, data.len(), start);
        records.push(data);
    }

    Ok(records)
}
