#![no_main]

use libfuzzer_sys::fuzz_target;

use cborstream::diag::{to_diagnostic, DiagOptions};
use cborstream::{validate, ValidateOptions};

fuzz_target!(|data: &[u8]| {
    let mut opts = ValidateOptions::basic();
    opts.max_depth = 64;
    let well_formed = validate(data, &opts).is_ok();

    // Rendering well-formed input may only fail on invalid UTF-8.
    let rendered = to_diagnostic(data, &DiagOptions::default());
    if well_formed {
        if let Err(e) = rendered {
            assert!(matches!(
                e.code,
                cborstream::ErrorCode::InvalidUtf8TextString
                    | cborstream::ErrorCode::NestingTooDeep
            ));
        }
    }
});
