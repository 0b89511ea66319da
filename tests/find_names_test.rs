use std::io::Write;

use asm_names::{
    find_names, find_names_in_file, find_names_in_reader, recover, AssociationPolicy,
    ListingDialect, ListingError, Options, ReconstructConfig, ScanConfig,
};

/// A GXemul style dump of two small PowerPC functions, each preceded by its label.
const GXEMUL_LISTING: &str = "\
<boot>
ffc00000: 4ffffb82\tcror\tcr31,cr31,cr31
ffc00004: 7c0802a6\tmflr\tr0
ffc00008: 00044d41\t.long\t0x44d41
ffc0000c: 494e0000\t.long\t0x494e0000
ffc00010: 00000000\t.long\t0x0
ffc00014: 9421fff0\tstwu\tr1,-16(r1)
ffc00018: 4ffffb82\tcror\tcr31,cr31,cr31
ffc0001c: 00065345\t.long\t0x65345
ffc00020: 5455504d\t.long\t0x5455504d
ffc00024: 00000000\t.long\t0x0
ffc00028: 38600000\tli\tr3,0
ffc0002c: 4e800020\tblr
";

fn entries(names: &asm_names::NameMap) -> Vec<(u64, String)> {
    names.iter().map(|(a, n)| (a, n.to_string())).collect()
}

#[test]
fn gxemul_listing_follows_previous() {
    let names = find_names(GXEMUL_LISTING.lines(), &Options::default()).unwrap();
    assert_eq!(
        entries(&names),
        vec![
            (0xffc0_0008, "MAIN".to_string()),
            (0xffc0_0014, "SETUPM".to_string()),
        ]
    );
}

#[test]
fn gxemul_listing_marker_policy() {
    let options = Options {
        scan: ScanConfig {
            policy: AssociationPolicy::Marker(asm_names::scanner::DEFAULT_MARKER),
            ..Default::default()
        },
        ..Default::default()
    };
    let names = find_names(GXEMUL_LISTING.lines(), &options).unwrap();
    assert_eq!(
        entries(&names),
        vec![
            (0xffc0_0000, "MAIN".to_string()),
            (0xffc0_0018, "SETUPM".to_string()),
        ]
    );
}

#[test]
fn main_round_trip() {
    let lines = [
        "00000000: 00044d41",
        "00000004: 494e0000",
        "00000008: 00000000",
    ];
    let names = find_names(lines, &Options::default()).unwrap();
    assert_eq!(entries(&names), vec![(0, "MAIN".to_string())]);
}

#[test]
fn name_after_elided_range() {
    // The disassembler dropped 0x1004..0x1010; the label must still land on real addresses.
    let lines = [
        "00001000: 7c0802a6\tmflr r0",
        "00001010: 00044d41",
        "00001014: 494e0000",
        "00001018: 4e800020\tblr",
    ];
    let recovery = recover(lines, &Options::default()).unwrap();
    let image = recovery.image.expect("image");
    assert_eq!(image.len(), 0x1c);
    assert!(image.bytes()[4..0x10].iter().all(|b| *b == 0));
    assert_eq!(entries(&recovery.names), vec![(0x1010, "MAIN".to_string())]);
}

#[test]
fn objdump_listing_colon_stripped() {
    let listing = "\
firmware.elf:     file format elf32-powerpc

Disassembly of section .text:

00010000 <_start>:
   10000:\t00 04 4d 41 \t.long 0x44d41
   10004:\t49 4e 00 00 \t.long 0x494e0000
   10008:\t7c 08 02 a6 \tmflr    r0
";
    let options = Options {
        listing: ReconstructConfig {
            dialect: ListingDialect::ColonStripped,
            ..Default::default()
        },
        ..Default::default()
    };
    let names = find_names_in_reader(listing.as_bytes(), &options).unwrap();
    assert_eq!(entries(&names), vec![(0x10000, "MAIN".to_string())]);
}

#[test]
fn space_separated_mnemonics() {
    let lines = [
        "00001000: 00044d41 .long 0x44d41",
        "00001004: 494e0000 .long 0x494e0000",
        "00001008: 7c0802a6 mflr r0",
    ];
    let names = find_names(lines, &Options::default()).unwrap();
    assert_eq!(entries(&names), vec![(0x1000, "MAIN".to_string())]);
}

#[test]
fn addresses_past_u64_are_rejected() {
    let options = Options {
        listing: ReconstructConfig {
            dialect: ListingDialect::ColonStripped,
            ..Default::default()
        },
        ..Default::default()
    };
    let lines = ["fffffffffffffffc: 1122334455667788", "fffffffffffffffc: 11223344"];
    match find_names(lines, &options) {
        Err(ListingError::AddressOverflow { line, .. }) => assert_eq!(line, 1),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn empty_and_garbage_input() {
    let empty: [&str; 0] = [];
    assert!(find_names(empty, &Options::default()).unwrap().is_empty());

    let garbage = ["hello world", "", "<main>", "::::"];
    let recovery = recover(garbage, &Options::default()).unwrap();
    assert!(recovery.names.is_empty());
    assert!(recovery.image.is_none());
}

#[test]
fn decode_error_is_fatal() {
    let lines = ["00001000: 7c0802a6", "00001004: 7c08xyz0\tbogus"];
    match find_names(lines, &Options::default()) {
        Err(ListingError::Decode { line, .. }) => assert_eq!(line, 2),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn idempotent() {
    let first = find_names(GXEMUL_LISTING.lines(), &Options::default()).unwrap();
    let second = find_names(GXEMUL_LISTING.lines(), &Options::default()).unwrap();
    assert_eq!(entries(&first), entries(&second));
}

#[test]
fn listing_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(GXEMUL_LISTING.as_bytes()).expect("write listing");
    file.flush().expect("flush");

    let names = find_names_in_file(file.path(), &Options::default()).unwrap();
    assert_eq!(names.len(), 2);
    assert_eq!(names.lookup(0xffc0_0020), Some((0xffc0_0014, "SETUPM")));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = find_names_in_file(dir.path().join("nope.txt"), &Options::default()).unwrap_err();
    assert!(matches!(err, ListingError::Io(_)));
}
