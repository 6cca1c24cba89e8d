#![allow(clippy::unwrap_used)]

use cborstream::{EncodeOptions, Encoder, ErrorCode, SliceSink, VecSink};

fn encode_one(f: impl FnOnce(&mut Encoder<VecSink>) -> Result<(), cborstream::Error>) -> Vec<u8> {
    let mut enc = Encoder::new(VecSink::new());
    f(&mut enc).unwrap();
    enc.finish().unwrap().into_vec()
}

#[test]
fn uint_boundaries_use_shortest_form() {
    assert_eq!(encode_one(|e| e.uint(0)), vec![0x00]);
    assert_eq!(encode_one(|e| e.uint(23)), vec![0x17]);
    assert_eq!(encode_one(|e| e.uint(24)), vec![0x18, 0x18]);
    assert_eq!(encode_one(|e| e.uint(255)), vec![0x18, 0xff]);
    assert_eq!(encode_one(|e| e.uint(256)), vec![0x19, 0x01, 0x00]);
    assert_eq!(encode_one(|e| e.uint(65_535)), vec![0x19, 0xff, 0xff]);
    assert_eq!(
        encode_one(|e| e.uint(65_536)),
        vec![0x1a, 0x00, 0x01, 0x00, 0x00]
    );
    assert_eq!(
        encode_one(|e| e.uint(0xffff_ffff)),
        vec![0x1a, 0xff, 0xff, 0xff, 0xff]
    );
    assert_eq!(
        encode_one(|e| e.uint(0x1_0000_0000)),
        vec![0x1b, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]
    );
    assert_eq!(
        encode_one(|e| e.uint(u64::MAX)),
        vec![0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
    );
}

#[test]
fn negative_uint_magnitude_offsets_by_one() {
    // The magnitude convention: 0 encodes -1.
    assert_eq!(encode_one(|e| e.negative_uint(0)), vec![0x20]);
    assert_eq!(encode_one(|e| e.negative_uint(23)), vec![0x37]);
    assert_eq!(encode_one(|e| e.negative_uint(24)), vec![0x38, 0x18]);
    // -2^64: magnitude u64::MAX.
    assert_eq!(
        encode_one(|e| e.negative_uint(u64::MAX)),
        vec![0x3b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
    );
}

#[test]
fn int_selects_major_and_shortest_form() {
    assert_eq!(encode_one(|e| e.int(0)), vec![0x00]);
    assert_eq!(encode_one(|e| e.int(-1)), vec![0x20]);
    assert_eq!(encode_one(|e| e.int(-24)), vec![0x37]);
    assert_eq!(encode_one(|e| e.int(-25)), vec![0x38, 0x18]);
    assert_eq!(encode_one(|e| e.int(-256)), vec![0x38, 0xff]);
    assert_eq!(encode_one(|e| e.int(-257)), vec![0x39, 0x01, 0x00]);
    assert_eq!(
        encode_one(|e| e.int(i64::MIN)),
        vec![0x3b, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
    );
    assert_eq!(
        encode_one(|e| e.int(i64::MAX)),
        vec![0x1b, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
    );
}

#[test]
fn named_simple_values() {
    assert_eq!(encode_one(|e| e.bool(false)), vec![0xf4]);
    assert_eq!(encode_one(|e| e.bool(true)), vec![0xf5]);
    assert_eq!(encode_one(|e| e.null()), vec![0xf6]);
    assert_eq!(encode_one(|e| e.undefined()), vec![0xf7]);
    assert_eq!(encode_one(|e| e.simple(16)), vec![0xf0]);
    assert_eq!(encode_one(|e| e.simple(255)), vec![0xf8, 0xff]);
}

#[test]
fn simple_rejects_reserved_range_with_check_user() {
    for v in 24..=31u8 {
        let mut enc = Encoder::new(VecSink::new());
        let err = enc.simple(v).unwrap_err();
        assert_eq!(err.code, ErrorCode::IllegalSimpleType);
    }

    // Disabling the check writes the raw two-byte form.
    let mut opts = EncodeOptions::new();
    opts.check_user = false;
    let mut enc = Encoder::with_options(VecSink::new(), opts);
    enc.simple(24).unwrap();
    assert_eq!(enc.finish().unwrap().into_vec(), vec![0xf8, 0x18]);
}

#[test]
fn floats_are_emitted_verbatim() {
    assert_eq!(encode_one(|e| e.float16(0x7e00)), vec![0xf9, 0x7e, 0x00]);
    assert_eq!(
        encode_one(|e| e.float32(100_000.0)),
        vec![0xfa, 0x47, 0xc3, 0x50, 0x00]
    );
    assert_eq!(
        encode_one(|e| e.float64(1.1)),
        vec![0xfb, 0x3f, 0xf1, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a]
    );
}

#[test]
fn float32_as_half_rounds_to_nearest_even() {
    assert_eq!(encode_one(|e| e.float32_as_half(1.5)), vec![0xf9, 0x3e, 0x00]);
    assert_eq!(
        encode_one(|e| e.float32_as_half(65504.0)),
        vec![0xf9, 0x7b, 0xff]
    );
    // Beyond the binary16 range collapses to infinity.
    assert_eq!(
        encode_one(|e| e.float32_as_half(1.0e9)),
        vec![0xf9, 0x7c, 0x00]
    );
    // Smallest half subnormal.
    assert_eq!(
        encode_one(|e| e.float32_as_half(5.960_464_5e-8)),
        vec![0xf9, 0x00, 0x01]
    );
}

#[test]
fn strings_and_tags() {
    assert_eq!(
        encode_one(|e| e.text("Hello")),
        vec![0x65, 0x48, 0x65, 0x6c, 0x6c, 0x6f]
    );
    assert_eq!(
        encode_one(|e| e.bytes(b"Hello")),
        vec![0x45, 0x48, 0x65, 0x6c, 0x6c, 0x6f]
    );
    assert_eq!(encode_one(|e| e.text("")), vec![0x60]);

    // Tagged byte string: 23(h'48656c6c6f').
    assert_eq!(
        encode_one(|e| {
            e.tag(23)?;
            e.bytes(b"Hello")
        }),
        vec![0xd7, 0x45, 0x48, 0x65, 0x6c, 0x6c, 0x6f]
    );
}

#[test]
fn string_length_boundaries() {
    for &len in &[0usize, 23, 24, 255, 256] {
        let payload = vec![0x61u8; len];
        let mut expected = Vec::new();
        if len < 24 {
            expected.push(0x40 | len as u8);
        } else if len <= 0xff {
            expected.push(0x58);
            expected.push(len as u8);
        } else {
            expected.push(0x59);
            expected.extend_from_slice(&(len as u16).to_be_bytes());
        }
        expected.extend_from_slice(&payload);
        assert_eq!(encode_one(|e| e.bytes(&payload)), expected);
    }
}

#[test]
fn nested_containers() {
    // {1: "Hello", 2: false}
    let bytes = encode_one(|e| {
        e.map(2, |e| {
            e.uint(1)?;
            e.text("Hello")?;
            e.uint(2)?;
            e.bool(false)
        })
    });
    assert_eq!(
        bytes,
        vec![0xa2, 0x01, 0x65, 0x48, 0x65, 0x6c, 0x6c, 0x6f, 0x02, 0xf4]
    );

    // [[1], []]
    let bytes = encode_one(|e| {
        e.array(2, |e| {
            e.array(1, |e| e.uint(1))?;
            e.array(0, |_| Ok(()))
        })
    });
    assert_eq!(bytes, vec![0x82, 0x81, 0x01, 0x80]);
}

#[test]
fn indefinite_containers_emit_break() {
    let bytes = encode_one(|e| {
        e.array_indefinite(|e| {
            e.uint(1)?;
            e.uint(2)
        })
    });
    assert_eq!(bytes, vec![0x9f, 0x01, 0x02, 0xff]);

    let bytes = encode_one(|e| {
        e.map_indefinite(|e| {
            e.text("a")?;
            e.uint(1)
        })
    });
    assert_eq!(bytes, vec![0xbf, 0x61, 0x61, 0x01, 0xff]);
}

#[test]
fn indefinite_strings_emit_chunks_and_break() {
    let bytes = encode_one(|e| e.text_indefinite(["Hel", "lo"]));
    assert_eq!(
        bytes,
        vec![0x7f, 0x63, 0x48, 0x65, 0x6c, 0x62, 0x6c, 0x6f, 0xff]
    );

    let bytes = encode_one(|e| e.bytes_indefinite([&b"H"[..], b"e"]));
    assert_eq!(bytes, vec![0x5f, 0x41, 0x48, 0x41, 0x65, 0xff]);
}

#[test]
fn strict_close_validates_declared_length() {
    let mut enc = Encoder::new(VecSink::new());
    enc.begin_array(2).unwrap();
    enc.uint(1).unwrap();
    let err = enc.end().unwrap_err();
    assert_eq!(err.code, ErrorCode::ContainerNotCompleted);

    // Too many items trips the same check.
    let mut enc = Encoder::new(VecSink::new());
    enc.begin_array(1).unwrap();
    enc.uint(1).unwrap();
    enc.uint(2).unwrap();
    let err = enc.end().unwrap_err();
    assert_eq!(err.code, ErrorCode::ContainerNotCompleted);
}

#[test]
fn lax_close_skips_length_validation() {
    let mut opts = EncodeOptions::new();
    opts.lax_close = true;
    let mut enc = Encoder::with_options(VecSink::new(), opts);
    enc.begin_array(2).unwrap();
    enc.uint(1).unwrap();
    enc.end().unwrap();
    assert_eq!(enc.finish().unwrap().into_vec(), vec![0x82, 0x01]);
}

#[test]
fn map_counts_keys_and_values_separately() {
    let mut enc = Encoder::new(VecSink::new());
    enc.begin_map(1).unwrap();
    enc.text("k").unwrap();
    let err = enc.end().unwrap_err();
    assert_eq!(err.code, ErrorCode::ContainerNotCompleted);
}

#[test]
fn second_top_level_item_is_rejected() {
    let mut enc = Encoder::new(VecSink::new());
    enc.uint(1).unwrap();
    let err = enc.uint(2).unwrap_err();
    assert_eq!(err.code, ErrorCode::GarbageAtEnd);
}

#[test]
fn finish_requires_a_complete_item() {
    let enc = Encoder::new(VecSink::new());
    assert_eq!(enc.finish().unwrap_err().code, ErrorCode::UnexpectedEof);

    let mut enc = Encoder::new(VecSink::new());
    enc.begin_array(1).unwrap();
    enc.uint(1).unwrap();
    assert_eq!(
        enc.finish().unwrap_err().code,
        ErrorCode::ContainerNotCompleted
    );
}

#[test]
fn nesting_depth_is_capped() {
    let mut opts = EncodeOptions::new();
    opts.max_depth = 4;
    let mut enc = Encoder::with_options(VecSink::new(), opts);
    for _ in 0..4 {
        enc.begin_array(1).unwrap();
    }
    let err = enc.begin_array(1).unwrap_err();
    assert_eq!(err.code, ErrorCode::NestingTooDeep);
}

#[test]
fn bounded_sink_reports_exact_shortfall() {
    let mut buf = [0u8; 4];
    let mut enc = Encoder::new(SliceSink::new(&mut buf));
    // Needs 1 (head) + 8 (payload) = 9 bytes.
    let err = enc.bytes(&[0xab; 8]).unwrap_err();
    assert_eq!(err.code, ErrorCode::OutOfMemory);
    let sink = enc.finish().unwrap();
    assert!(sink.overflowed());
    assert_eq!(sink.extra_bytes_needed(), 5);
}

#[test]
fn overflowed_sink_still_drives_to_completion() {
    let mut buf = [0u8; 2];
    let mut enc = Encoder::new(SliceSink::new(&mut buf));
    let _ = enc.begin_array(3);
    let _ = enc.uint(1);
    let _ = enc.text("Hello");
    let _ = enc.bool(true);
    let _ = enc.end();
    let sink = enc.finish().unwrap();
    // 1 (array head) + 1 + 6 + 1 = 9 bytes total, 2 available.
    assert_eq!(sink.extra_bytes_needed(), 7);
}

#[test]
fn exact_fit_leaves_no_shortfall() {
    let mut buf = [0u8; 4];
    let mut enc = Encoder::new(SliceSink::new(&mut buf));
    enc.array(1, |e| e.uint(300)).unwrap();
    let sink = enc.finish().unwrap();
    assert!(!sink.overflowed());
    assert_eq!(sink.extra_bytes_needed(), 0);
    assert_eq!(sink.as_bytes(), &[0x81, 0x19, 0x01, 0x2c]);
}
