#![no_main]

use libfuzzer_sys::fuzz_target;

use cborstream::{validate, ValidateOptions};

fuzz_target!(|data: &[u8]| {
    // Tight depth keeps the recursive walk away from the native stack
    // limit while still exploring structure.
    let mut basic = ValidateOptions::basic();
    basic.max_depth = 64;
    let mut strict = ValidateOptions::strict();
    strict.max_depth = 64;
    let mut canonical = ValidateOptions::canonical();
    canonical.max_depth = 64;

    let b = validate(data, &basic);
    let s = validate(data, &strict);
    let c = validate(data, &canonical);

    // Strictness is monotone: anything canonical is strict, anything
    // strict is well-formed.
    if c.is_ok() {
        assert!(s.is_ok());
    }
    if s.is_ok() {
        assert!(b.is_ok());
    }
});
