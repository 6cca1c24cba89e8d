//! UTF-8 validation for text string payloads.
//!
//! Dispatches to `simdutf8` when the feature is enabled, otherwise to the
//! core validator. Both reject overlong sequences, surrogate code points,
//! and code points above U+10FFFF.

#[cfg(feature = "simdutf8")]
use simdutf8::basic as simd_utf8;

/// Validates that `bytes` are well-formed UTF-8: continuation bytes in
/// 0x80..=0xBF, no overlong sequences, no surrogate code points, nothing
/// above U+10FFFF.
#[inline]
pub fn validate(bytes: &[u8]) -> Result<(), ()> {
    #[cfg(feature = "simdutf8")]
    {
        simd_utf8::from_utf8(bytes).map(|_| ()).map_err(|_| ())
    }

    #[cfg(not(feature = "simdutf8"))]
    {
        core::str::from_utf8(bytes).map(|_| ()).map_err(|_| ())
    }
}
