//! IEEE-754 binary16 conversion.
//!
//! CBOR carries half-precision floats verbatim (head 0xf9 plus two bytes).
//! The parser exposes the raw bit pattern; these helpers convert it to and
//! from the native float types. Decoding is exact. Encoding rounds to
//! nearest-even and loses precision where binary16 cannot represent the
//! input; values beyond the binary16 range become infinities.

const HALF_SIGN: u16 = 0x8000;
const HALF_EXP: u16 = 0x7c00;
const HALF_MANT: u16 = 0x03ff;

/// Expand a binary16 bit pattern to the exactly-equal `f64`.
///
/// Zeros, subnormals, normals, infinities and NaN all convert exactly;
/// NaN payloads are preserved in the high mantissa bits.
#[must_use]
pub fn decode_half(bits: u16) -> f64 {
    let sign = u64::from(bits & HALF_SIGN) << 48;
    let exp = (bits & HALF_EXP) >> 10;
    let mant = u64::from(bits & HALF_MANT);

    let out = match exp {
        0 => {
            if mant == 0 {
                sign
            } else {
                // Subnormal: mant * 2^-24, exact in f64.
                let v = (mant as f64) * (1.0 / f64::from(1u32 << 24));
                return if bits & HALF_SIGN == 0 { v } else { -v };
            }
        }
        0x1f => sign | 0x7ff0_0000_0000_0000 | (mant << 42),
        _ => {
            // Rebias: add before subtracting so exponents below 15 (values
            // under 1.0) cannot underflow the unsigned arithmetic.
            let exp64 = u64::from(exp) + 1023 - 15;
            sign | (exp64 << 52) | (mant << 42)
        }
    };
    f64::from_bits(out)
}

/// Expand a binary16 bit pattern to the exactly-equal `f32`.
#[must_use]
pub fn decode_half_f32(bits: u16) -> f32 {
    // binary16 -> binary32 is also exact; go through the f64 path.
    decode_half(bits) as f32
}

/// Compress an `f32` to binary16, rounding to nearest-even.
///
/// Values whose magnitude exceeds the binary16 maximum become signed
/// infinity; values too small for the smallest subnormal become signed
/// zero. NaN becomes a quiet half NaN.
#[must_use]
pub fn encode_half(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exp = ((bits >> 23) & 0xff) as i32;
    let mant = bits & 0x007f_ffff;

    if exp == 0xff {
        if mant != 0 {
            return sign | 0x7e00;
        }
        return sign | HALF_EXP;
    }

    // Rebias into the half exponent range.
    let e = exp - 127 + 15;
    if e >= 0x1f {
        return sign | HALF_EXP;
    }
    if e <= 0 {
        // Subnormal half, or underflow to zero.
        if e < -10 {
            return sign;
        }
        let m = mant | 0x0080_0000;
        let shift = (14 - e) as u32;
        let half = m >> shift;
        let rem = m & ((1 << shift) - 1);
        let halfway = 1 << (shift - 1);
        let round_up = rem > halfway || (rem == halfway && half & 1 == 1);
        // A rounding carry out of the subnormal mantissa lands on the
        // smallest normal, which is the correct result.
        return sign | (half as u16 + u16::from(round_up));
    }

    let half_mant = (mant >> 13) as u16;
    let rem = mant & 0x1fff;
    let round_up = rem > 0x1000 || (rem == 0x1000 && half_mant & 1 == 1);
    let magnitude = ((e as u16) << 10) | half_mant;
    // Carry from rounding may bump the exponent, including to infinity.
    sign | (magnitude + u16::from(round_up))
}
