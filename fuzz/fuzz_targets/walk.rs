#![no_main]

use libfuzzer_sys::fuzz_target;

use cborstream::{ItemKind, ParseOptions, Parser, SliceSource};

fuzz_target!(|data: &[u8]| {
    let mut opts = ParseOptions::new();
    opts.max_depth = 64;
    let mut parser = Parser::new(SliceSource::new(data), opts);
    let Ok(mut it) = parser.root() else { return };

    // Probe every extractor; none may panic, whatever the input.
    let _ = parser.uint64(&it);
    let _ = parser.int64(&it);
    let _ = parser.tag(&it);
    let _ = parser.boolean(&it);
    let _ = parser.simple_value(&it);
    let _ = parser.float16_bits(&it);
    let _ = parser.float32(&it);
    let _ = parser.float64(&it);
    let _ = parser.container_length(&it);
    if matches!(it.kind(), ItemKind::ByteString | ItemKind::TextString) {
        let _ = parser.calculate_string_length(&it);
        let mut buf = [0u8; 256];
        let mut copy_it = it;
        let _ = parser.copy_string(&mut copy_it, &mut buf);
    }
    let _ = parser.advance(&mut it);
});
