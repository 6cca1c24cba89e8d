//! Cross-subsystem invariants: parse-then-reencode round trips, chunked
//! string equivalence, and cursor/encoder agreement on container state.

#![allow(clippy::unwrap_used)]

use cborstream::{
    validate, Cursor, Encoder, ErrorCode, ItemKind, Parser, SliceSource, ValidateOptions, VecSink,
};

/// Re-emit the item under `it` byte-for-byte through the encoder, preserving
/// the definite/indefinite forms the parser observed.
fn reencode(
    p: &mut Parser<SliceSource<'_>>,
    it: &mut Cursor,
    enc: &mut Encoder<VecSink>,
) -> Result<(), cborstream::Error> {
    match it.kind() {
        ItemKind::Integer => {
            if it.is_negative_integer() {
                enc.negative_uint(p.negative_magnitude(it)?)?;
            } else {
                enc.uint(p.uint64(it)?)?;
            }
            p.advance_fixed(it)
        }
        ItemKind::Tag => {
            enc.tag(p.tag(it)?)?;
            p.advance_fixed(it)?;
            reencode(p, it, enc)
        }
        ItemKind::Bool => {
            enc.bool(p.boolean(it)?)?;
            p.advance_fixed(it)
        }
        ItemKind::Null => {
            enc.null()?;
            p.advance_fixed(it)
        }
        ItemKind::Undefined => {
            enc.undefined()?;
            p.advance_fixed(it)
        }
        ItemKind::Simple => {
            enc.simple(p.simple_value(it)?)?;
            p.advance_fixed(it)
        }
        ItemKind::Float16 => {
            enc.float16(p.float16_bits(it)?)?;
            p.advance_fixed(it)
        }
        ItemKind::Float32 => {
            enc.float32(p.float32(it)?)?;
            p.advance_fixed(it)
        }
        ItemKind::Float64 => {
            enc.float64(p.float64(it)?)?;
            p.advance_fixed(it)
        }
        ItemKind::ByteString | ItemKind::TextString => {
            let is_text = it.kind() == ItemKind::TextString;
            if it.is_length_known() {
                let payload = p.string_bytes(it)?.to_vec();
                if is_text {
                    enc.text(core::str::from_utf8(&payload).unwrap())?;
                } else {
                    enc.bytes(&payload)?;
                }
                p.advance(it)
            } else {
                let mut collected: Vec<Vec<u8>> = Vec::new();
                let mut chunks = p.string_chunks(it)?;
                while let Some(chunk) = chunks.next(p)? {
                    collected.push(p.chunk_bytes(chunk)?.to_vec());
                }
                if is_text {
                    let strs: Vec<&str> = collected
                        .iter()
                        .map(|c| core::str::from_utf8(c).unwrap())
                        .collect();
                    enc.text_indefinite(strs)?;
                } else {
                    enc.bytes_indefinite(collected.iter().map(Vec::as_slice))?;
                }
                p.advance(it)
            }
        }
        ItemKind::Array | ItemKind::Map => {
            let is_map = it.kind() == ItemKind::Map;
            match p.container_length(it)? {
                Some(len) => {
                    if is_map {
                        enc.begin_map(len)?;
                    } else {
                        enc.begin_array(len)?;
                    }
                }
                None => {
                    if is_map {
                        enc.begin_map_indefinite()?;
                    } else {
                        enc.begin_array_indefinite()?;
                    }
                }
            }
            let mut child = p.enter_container(it)?;
            while !child.at_end() {
                reencode(p, &mut child, enc)?;
            }
            p.leave_container(it, &child)?;
            enc.end()
        }
        ItemKind::Invalid => Err(cborstream::Error::new(ErrorCode::InternalError, 0)),
    }
}

fn roundtrip(input: &[u8]) -> Vec<u8> {
    let mut p = Parser::from_slice(input);
    let mut it = p.root().unwrap();
    let mut enc = Encoder::new(VecSink::new());
    reencode(&mut p, &mut it, &mut enc).unwrap();
    assert!(it.at_end(), "input not fully consumed: {input:02x?}");
    assert!(p.is_exhausted(&it));
    enc.finish().unwrap().into_vec()
}

#[test]
fn roundtrip_preserves_bytes() {
    let vectors: &[&[u8]] = &[
        &[0x00],
        &[0x17],
        &[0x18, 0x64],
        &[0x19, 0x03, 0xe8],
        &[0x1a, 0x00, 0x0f, 0x42, 0x40],
        &[0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
        &[0x20],
        &[0x38, 0x63],
        &[0x3b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
        &[0xf4],
        &[0xf5],
        &[0xf6],
        &[0xf7],
        &[0xf0],
        &[0xf8, 0xff],
        &[0xf9, 0x3e, 0x00],
        &[0xf9, 0x7e, 0x00],
        &[0xfa, 0x47, 0xc3, 0x50, 0x00],
        &[0xfb, 0x3f, 0xf1, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a],
        &[0x60],
        &[0x65, 0x48, 0x65, 0x6c, 0x6c, 0x6f],
        &[0x45, 0x48, 0x65, 0x6c, 0x6c, 0x6f],
        &[0x80],
        &[0x83, 0x01, 0x20, 0xf5],
        &[0xa0],
        &[0xa2, 0x01, 0x65, 0x48, 0x65, 0x6c, 0x6c, 0x6f, 0x02, 0xf4],
        &[0xc0, 0x74, 0x32, 0x30, 0x31, 0x33, 0x2d, 0x30, 0x33, 0x2d, 0x32, 0x31, 0x54, 0x32,
          0x30, 0x3a, 0x30, 0x34, 0x3a, 0x30, 0x30, 0x5a],
        &[0xd8, 0x17, 0x45, 0x48, 0x65, 0x6c, 0x6c, 0x6f],
        // Indefinite forms re-encode as indefinite.
        &[0x9f, 0x01, 0x02, 0xff],
        &[0xbf, 0x61, 0x61, 0x01, 0xff],
        &[0x7f, 0x63, 0x48, 0x65, 0x6c, 0x62, 0x6c, 0x6f, 0xff],
        &[0x5f, 0x41, 0x48, 0x41, 0x65, 0xff],
        // Nested mixtures.
        &[0x82, 0x9f, 0x01, 0xff, 0x80],
        &[0xa1, 0x81, 0x01, 0x9f, 0xff],
    ];
    for &input in vectors {
        assert_eq!(roundtrip(input), input, "roundtrip of {input:02x?}");
    }
}

#[test]
fn tag_23_reencodes_via_d7() {
    // Shortest form of tag 23 is the inline head; a parser reading the
    // two-byte form loses the overlong encoding by design.
    let overlong = [0xd8, 0x17, 0x41, 0x48];
    assert_eq!(roundtrip(&overlong), [0xd7, 0x41, 0x48]);
}

#[test]
fn chunked_and_definite_strings_extract_identically() {
    let chunked = [0x7f, 0x63, 0x48, 0x65, 0x6c, 0x62, 0x6c, 0x6f, 0xff];
    let definite = [0x65, 0x48, 0x65, 0x6c, 0x6c, 0x6f];

    let mut p1 = Parser::from_slice(&chunked);
    let mut c1 = p1.root().unwrap();
    let mut p2 = Parser::from_slice(&definite);
    let mut c2 = p2.root().unwrap();

    assert_eq!(
        p1.calculate_string_length(&c1).unwrap(),
        p2.calculate_string_length(&c2).unwrap()
    );
    assert_eq!(
        p1.string_to_vec(&mut c1).unwrap(),
        p2.string_to_vec(&mut c2).unwrap()
    );
}

#[test]
fn is_length_known_reflects_head_form() {
    let mut p = Parser::from_slice(&[0x65, 0x48, 0x65, 0x6c, 0x6c, 0x6f]);
    assert!(p.root().unwrap().is_length_known());

    let mut p = Parser::from_slice(&[0x7f, 0xff]);
    assert!(!p.root().unwrap().is_length_known());

    let mut p = Parser::from_slice(&[0x9f, 0xff]);
    assert!(!p.root().unwrap().is_length_known());

    let mut p = Parser::from_slice(&[0x80]);
    assert!(p.root().unwrap().is_length_known());
}

#[test]
fn encoder_output_is_canonical() {
    let mut enc = Encoder::new(VecSink::new());
    enc.map(2, |e| {
        e.uint(1)?;
        e.text("Hello")?;
        e.uint(2)?;
        e.float64(1.5)
    })
    .unwrap();
    let bytes = enc.finish().unwrap().into_vec();
    validate(&bytes, &ValidateOptions::canonical()).unwrap();
}

#[test]
fn empty_containers_roundtrip_and_validate() {
    for input in [&[0x80][..], &[0xa0], &[0x9f, 0xff], &[0xbf, 0xff]] {
        assert_eq!(roundtrip(input), input);
        validate(input, &ValidateOptions::strict()).unwrap();
    }
}
