#![allow(clippy::unwrap_used)]

use cborstream::diag::{to_diagnostic, DiagOptions};

fn diag(bytes: &[u8]) -> String {
    to_diagnostic(bytes, &DiagOptions::default()).unwrap()
}

#[test]
fn scalars() {
    assert_eq!(diag(&[0x00]), "0");
    assert_eq!(diag(&[0x18, 0x64]), "100");
    assert_eq!(diag(&[0x20]), "-1");
    assert_eq!(
        diag(&[0x3b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
        "-18446744073709551616"
    );
    assert_eq!(diag(&[0xf4]), "false");
    assert_eq!(diag(&[0xf5]), "true");
    assert_eq!(diag(&[0xf6]), "null");
    assert_eq!(diag(&[0xf7]), "undefined");
    assert_eq!(diag(&[0xf8, 0xff]), "simple(255)");
    assert_eq!(diag(&[0xf0]), "simple(16)");
}

#[test]
fn floats() {
    assert_eq!(diag(&[0xf9, 0x3e, 0x00]), "1.5");
    assert_eq!(diag(&[0xfb, 0x3f, 0xf1, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a]), "1.1");
    assert_eq!(diag(&[0xf9, 0x3c, 0x00]), "1.0");
    assert_eq!(diag(&[0xf9, 0x7c, 0x00]), "Infinity");
    assert_eq!(diag(&[0xf9, 0xfc, 0x00]), "-Infinity");
    assert_eq!(diag(&[0xf9, 0x7e, 0x00]), "NaN");
}

#[test]
fn numeric_indicators_mark_float_width() {
    let opts = DiagOptions {
        numeric_indicators: true,
    };
    assert_eq!(
        to_diagnostic(&[0xf9, 0x3e, 0x00], &opts).unwrap(),
        "1.5_1"
    );
    assert_eq!(
        to_diagnostic(&[0xfa, 0x3f, 0xc0, 0x00, 0x00], &opts).unwrap(),
        "1.5_2"
    );
    assert_eq!(
        to_diagnostic(&[0xfb, 0x3f, 0xf8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], &opts).unwrap(),
        "1.5_3"
    );
}

#[test]
fn strings_and_escapes() {
    assert_eq!(diag(&[0x65, 0x48, 0x65, 0x6c, 0x6c, 0x6f]), "\"Hello\"");
    assert_eq!(diag(&[0x45, 0x48, 0x65, 0x6c, 0x6c, 0x6f]), "h'48656c6c6f'");
    assert_eq!(diag(&[0x60]), "\"\"");
    assert_eq!(diag(&[0x40]), "h''");
    assert_eq!(diag(&[0x62, 0x22, 0x5c]), "\"\\\"\\\\\"");
    assert_eq!(diag(&[0x61, 0x0a]), "\"\\n\"");
    assert_eq!(diag(&[0x61, 0x01]), "\"\\u0001\"");
}

#[test]
fn chunked_strings_keep_their_seams() {
    assert_eq!(
        diag(&[0x7f, 0x63, 0x48, 0x65, 0x6c, 0x62, 0x6c, 0x6f, 0xff]),
        "(_ \"Hel\", \"lo\")"
    );
    assert_eq!(
        diag(&[0x5f, 0x41, 0x48, 0x41, 0x65, 0xff]),
        "(_ h'48', h'65')"
    );
    assert_eq!(diag(&[0x7f, 0xff]), "(_ )");
}

#[test]
fn containers() {
    assert_eq!(diag(&[0x83, 0x01, 0x20, 0xf5]), "[1, -1, true]");
    assert_eq!(diag(&[0x80]), "[]");
    assert_eq!(diag(&[0xa0]), "{}");
    assert_eq!(diag(&[0x9f, 0x01, 0x02, 0xff]), "[_ 1, 2]");
    assert_eq!(
        diag(&[0xa2, 0x01, 0x65, 0x48, 0x65, 0x6c, 0x6c, 0x6f, 0x02, 0xf4]),
        "{1: \"Hello\", 2: false}"
    );
    assert_eq!(diag(&[0xbf, 0x61, 0x61, 0x01, 0xff]), "{_ \"a\": 1}");
    assert_eq!(diag(&[0x82, 0x81, 0x01, 0x80]), "[[1], []]");
}

#[test]
fn tagged_items() {
    assert_eq!(
        diag(&[0xd8, 0x17, 0x45, 0x48, 0x65, 0x6c, 0x6c, 0x6f]),
        "23(h'48656c6c6f')"
    );
    let mut input = vec![0xc0, 0x74];
    input.extend_from_slice(b"2013-03-21T20:04:00Z");
    assert_eq!(diag(&input), "0(\"2013-03-21T20:04:00Z\")");
    assert_eq!(diag(&[0xc2, 0x42, 0x01, 0x02]), "2(h'0102')");
}
