mod common;

use common::{BookSpec, EOF_RECORD, build_pdb, offsets, put_u32};
use mobi_reader::mobi::format::header::{self, parse_header_data};
use mobi_reader::{Compression, MobiError, MobiType, Pdb, TextEncoding};

fn sample_spec() -> BookSpec {
    let mut spec = BookSpec::new("The Hunting of the Snark");
    spec.compression = 2;
    spec.extra_flags = 0b11;
    spec.text_records = vec![b"one".to_vec(), b"two".to_vec()];
    spec
}

#[test]
fn parses_full_header() {
    let spec = sample_spec();
    let record0 = spec.record0();
    let header = header::parse(&record0, 5).expect("parse header");

    assert_eq!(header.palmdoc.compression, Compression::PalmDoc);
    assert_eq!(header.palmdoc.text_length, 6);
    assert_eq!(header.palmdoc.record_count, 2);
    assert_eq!(header.palmdoc.record_size, 4096);
    assert_eq!(&header.id.identifier, b"MOBI");
    assert_eq!(header.id.header_length, 232);
    assert_eq!(header.data.mobi_type, MobiType::Mobipocket);
    assert_eq!(header.data.text_encoding, TextEncoding::Utf8);
    assert_eq!(header.data.file_version, 6);
    assert_eq!(header.data.first_non_book_record, 3);
    assert_eq!(header.data.first_image, 0xFFFF_FFFF);
    assert_eq!(header.data.first_text_record, 1);
    assert_eq!(header.data.extra_flags, 0b11);
    assert_eq!(header.title, "The Hunting of the Snark");
}

#[test]
fn compression_values_map_to_modes() {
    assert_eq!(Compression::from(1), Compression::None);
    assert_eq!(Compression::from(2), Compression::PalmDoc);
    assert_eq!(Compression::from(17480), Compression::HuffCdic);
    assert_eq!(Compression::from(9), Compression::Unknown(9));
    assert_eq!(Compression::Unknown(9).raw(), 9);
    assert_eq!(Compression::HuffCdic.raw(), 17480);
}

#[test]
fn short_extended_header_zero_fills_missing_fields() {
    // A 116-byte header ends before the DRM fields and the extra flags.
    let mut spec = sample_spec();
    spec.header_length = 116;
    let record0 = spec.record0();
    let header = header::parse(&record0, 5).expect("parse header");

    assert_eq!(header.data.first_non_book_record, 3);
    assert_eq!(header.data.name_offset, 24 + 116);
    assert_eq!(header.data.first_text_record, 0);
    assert_eq!(header.data.extra_flags, 0);
    assert_eq!(header.title, "The Hunting of the Snark");
}

#[test]
fn header_data_reader_tolerates_empty_input() {
    let data = parse_header_data(&[]);
    assert_eq!(data.mobi_type, MobiType::Other(0));
    assert_eq!(data.text_encoding, TextEncoding::Other(0));
    assert_eq!(data.extra_flags, 0);
    assert_eq!(data.padding, [0u8; 32]);
}

#[test]
fn header_data_fields_follow_disk_layout() {
    let mut raw = vec![0u8; 224];
    put_u32(&mut raw, offsets::FIRST_IMAGE, 42);
    put_u32(&mut raw, offsets::EXTRA_FLAGS, 0x0007);
    put_u32(&mut raw, 220, 0xDEAD_BEEF);
    raw[170..172].copy_from_slice(&9u16.to_be_bytes());

    let data = parse_header_data(&raw);
    assert_eq!(data.first_image, 42);
    assert_eq!(data.extra_flags, 7);
    assert_eq!(data.indx_record_offset, 0xDEAD_BEEF);
    assert_eq!(data.last_content_record, 9);
}

#[test]
fn windows_1252_title_is_decoded() {
    let mut spec = BookSpec::new("Caf\u{e9}");
    spec.encoding = 1252;
    let mut record0 = spec.record0();
    // Rewrite the UTF-8 "é" as its single Windows-1252 byte.
    let name_offset = 24 + spec.header_length as usize;
    record0.truncate(name_offset);
    record0.extend_from_slice(&[b'C', b'a', b'f', 0xE9]);
    put_u32(&mut record0, 24 + offsets::NAME_LENGTH, 4);

    let header = header::parse(&record0, 2).expect("parse header");
    assert_eq!(header.data.text_encoding, TextEncoding::WinLatin1);
    assert_eq!(header.title, "Café");
}

#[test]
fn record0_shorter_than_palmdoc_header_is_truncated() {
    let err = header::parse(&[0u8; 10], 1).expect_err("must fail");
    assert!(matches!(
        err,
        MobiError::TruncatedHeader {
            context: "PalmDOC header",
            expected: 16,
            found: 10,
        }
    ));
}

#[test]
fn record0_without_header_id_is_truncated() {
    let record0 = sample_spec().record0();
    let err = header::parse(&record0[..20], 1).expect_err("must fail");
    assert!(matches!(
        err,
        MobiError::TruncatedHeader {
            context: "MOBI header id",
            expected: 24,
            found: 20,
        }
    ));
}

#[test]
fn declared_header_length_past_record0_is_truncated() {
    let mut record0 = sample_spec().record0();
    put_u32(&mut record0, 20, 0xFFFF_FFF0);
    let err = header::parse(&record0, 5).expect_err("must fail");
    assert!(matches!(
        err,
        MobiError::TruncatedHeader {
            context: "extended header",
            ..
        }
    ));
}

#[test]
fn name_outside_record0_is_rejected() {
    let mut record0 = sample_spec().record0();
    let len = record0.len();
    put_u32(&mut record0, 24 + offsets::NAME_LENGTH, 1000);
    let err = header::parse(&record0, 5).expect_err("must fail");
    assert!(
        matches!(
            err,
            MobiError::InvalidNameRange {
                length: 1000,
                record_len,
                ..
            } if record_len == len
        ),
        "unexpected error: {:?}",
        err
    );

    put_u32(&mut record0, 24 + offsets::NAME_OFFSET, u32::MAX);
    put_u32(&mut record0, 24 + offsets::NAME_LENGTH, u32::MAX);
    let err = header::parse(&record0, 5).expect_err("must fail");
    assert!(matches!(err, MobiError::InvalidNameRange { .. }));
}

#[test]
fn text_records_beyond_container_are_rejected() {
    let record0 = sample_spec().record0();
    let err = header::parse(&record0, 2).expect_err("must fail");
    assert!(matches!(
        err,
        MobiError::InvalidRecordRange {
            first_non_book: 3,
            record_count: 2,
        }
    ));
}

#[test]
fn pdb_splits_records_by_offset() {
    let records = vec![b"zero".to_vec(), Vec::new(), b"second record".to_vec(), EOF_RECORD.to_vec()];
    let bytes = build_pdb("Split_Test", &records);
    let pdb = Pdb::from_bytes(&bytes).expect("read pdb");

    assert_eq!(pdb.header.name, "Split_Test");
    assert_eq!(&pdb.header.db_type, b"BOOK");
    assert_eq!(&pdb.header.creator, b"MOBI");
    assert_eq!(pdb.len(), 4);
    for (i, expected) in records.iter().enumerate() {
        assert_eq!(pdb.record(i), Some(expected.as_slice()), "record {}", i);
    }
    assert_eq!(pdb.record(4), None);
    assert_eq!(pdb.entry(2).map(|e| e.unique_id), Some([0, 0, 2]));
    assert_eq!(pdb.records().count(), 4);
}

#[test]
fn pdb_shorter_than_header_is_truncated() {
    let err = Pdb::from_bytes(&[0u8; 40]).expect_err("must fail");
    assert!(matches!(
        err,
        MobiError::TruncatedContainer {
            expected: 78,
            found: 40,
        }
    ));
}

#[test]
fn pdb_with_missing_record_table_is_truncated() {
    let mut bytes = build_pdb("Short", &[b"a".to_vec(), b"b".to_vec()]);
    // Claim 200 records.
    bytes[76..78].copy_from_slice(&200u16.to_be_bytes());
    let err = Pdb::from_bytes(&bytes).expect_err("must fail");
    assert!(matches!(
        err,
        MobiError::TruncatedContainer {
            expected: 1678,
            ..
        }
    ));
}

#[test]
fn pdb_record_offset_past_end_is_invalid() {
    let mut bytes = build_pdb("Bad_Offset", &[b"a".to_vec(), b"b".to_vec()]);
    // Point record 1 far beyond the file.
    put_u32(&mut bytes, 78 + 8, 10_000);
    let err = Pdb::from_bytes(&bytes).expect_err("must fail");
    assert!(matches!(err, MobiError::InvalidFormat(_)));
}
