//! Diagnostic notation (RFC 8949 §8) writer.
//!
//! A thin consumer of the cursor API: it renders one data item into
//! human-readable diagnostic notation through any [`core::fmt::Write`],
//! using only the public parser operations. Indefinite-length containers
//! and strings are marked with the `_` convention (`[_ 1, 2]`,
//! `(_ h'aabb', h'ccdd')`).

use core::fmt::Write;

use crate::half::decode_half;
use crate::parse::{Cursor, ItemKind, Parser};
use crate::source::Source;
use crate::{Error, ErrorCode};

#[cfg(feature = "alloc")]
use alloc::string::String;

/// Formatting options for diagnostic output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiagOptions {
    /// Append `_1`/`_2`/`_3` encoding indicators to half, single, and
    /// double precision floats.
    pub numeric_indicators: bool,
}

/// Render the item under `it` into `out`, advancing the cursor past it.
///
/// # Errors
///
/// Returns `Io` if `out` rejects text, plus any parse error in the input.
pub fn write_diagnostic<S: Source, W: Write>(
    parser: &mut Parser<S>,
    it: &mut Cursor,
    out: &mut W,
    opts: &DiagOptions,
) -> Result<(), Error> {
    write_item(parser, it, out, opts, 0)
}

/// Render one complete data item from `bytes` into an owned string.
///
/// # Errors
///
/// Returns any parse error in the input.
#[cfg(feature = "alloc")]
pub fn to_diagnostic(bytes: &[u8], opts: &DiagOptions) -> Result<String, Error> {
    let mut parser = Parser::from_slice(bytes);
    let mut it = parser.root()?;
    let mut out = String::new();
    write_item(&mut parser, &mut it, &mut out, opts, 0)?;
    Ok(out)
}

fn fmt_err(pos: usize) -> Error {
    Error::new(ErrorCode::Io, pos)
}

fn write_float<W: Write>(
    out: &mut W,
    value: f64,
    indicator: &str,
    opts: &DiagOptions,
    pos: usize,
) -> Result<(), Error> {
    if value.is_nan() {
        out.write_str("NaN").map_err(|_| fmt_err(pos))?;
    } else if value.is_infinite() {
        let s = if value > 0.0 { "Infinity" } else { "-Infinity" };
        out.write_str(s).map_err(|_| fmt_err(pos))?;
    } else if value == value.trunc() {
        write!(out, "{value:.1}").map_err(|_| fmt_err(pos))?;
    } else {
        write!(out, "{value}").map_err(|_| fmt_err(pos))?;
    }
    if opts.numeric_indicators {
        out.write_str(indicator).map_err(|_| fmt_err(pos))?;
    }
    Ok(())
}

fn write_text_escaped<W: Write>(out: &mut W, text: &str, pos: usize) -> Result<(), Error> {
    for ch in text.chars() {
        match ch {
            '"' => out.write_str("\\\""),
            '\\' => out.write_str("\\\\"),
            '\n' => out.write_str("\\n"),
            '\r' => out.write_str("\\r"),
            '\t' => out.write_str("\\t"),
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32),
            c => out.write_char(c),
        }
        .map_err(|_| fmt_err(pos))?;
    }
    Ok(())
}

fn write_string_item<S: Source, W: Write>(
    parser: &mut Parser<S>,
    it: &mut Cursor,
    out: &mut W,
    is_text: bool,
) -> Result<(), Error> {
    let pos = it.position();
    let chunked = !it.is_length_known();
    if chunked {
        out.write_str("(_ ").map_err(|_| fmt_err(pos))?;
    }
    let mut chunks = parser.string_chunks(it)?;
    let mut first = true;
    while let Some(chunk) = chunks.next(parser)? {
        if chunked && !first {
            out.write_str(", ").map_err(|_| fmt_err(chunk.pos))?;
        }
        first = false;
        if is_text {
            out.write_char('"').map_err(|_| fmt_err(chunk.pos))?;
            // Chunks may not split scalar values, so each one is checked
            // and rendered independently.
            let bytes = parser.chunk_bytes(chunk)?;
            let text = core::str::from_utf8(bytes)
                .map_err(|_| Error::new(ErrorCode::InvalidUtf8TextString, chunk.pos))?;
            write_text_escaped(out, text, chunk.pos)?;
            out.write_char('"').map_err(|_| fmt_err(chunk.pos))?;
        } else {
            out.write_str("h'").map_err(|_| fmt_err(chunk.pos))?;
            let bytes = parser.chunk_bytes(chunk)?;
            for b in bytes {
                write!(out, "{b:02x}").map_err(|_| fmt_err(chunk.pos))?;
            }
            out.write_char('\'').map_err(|_| fmt_err(chunk.pos))?;
        }
    }
    if chunked {
        out.write_char(')').map_err(|_| fmt_err(pos))?;
    }
    parser.advance(it)
}

fn write_item<S: Source, W: Write>(
    parser: &mut Parser<S>,
    it: &mut Cursor,
    out: &mut W,
    opts: &DiagOptions,
    depth: usize,
) -> Result<(), Error> {
    let pos = it.position();
    if depth > parser.options().max_depth {
        return Err(Error::new(ErrorCode::NestingTooDeep, pos));
    }
    match it.kind() {
        ItemKind::Integer => {
            if it.is_negative_integer() {
                let n = parser.negative_magnitude(it)?;
                write!(out, "-{}", u128::from(n) + 1).map_err(|_| fmt_err(pos))?;
            } else {
                let v = parser.uint64(it)?;
                write!(out, "{v}").map_err(|_| fmt_err(pos))?;
            }
            parser.advance_fixed(it)
        }
        ItemKind::Tag => {
            let tag = parser.tag(it)?;
            write!(out, "{tag}(").map_err(|_| fmt_err(pos))?;
            parser.advance_fixed(it)?;
            if !it.is_valid() {
                return Err(Error::new(ErrorCode::UnexpectedEof, pos));
            }
            write_item(parser, it, out, opts, depth + 1)?;
            out.write_char(')').map_err(|_| fmt_err(pos))?;
            Ok(())
        }
        ItemKind::Bool => {
            let v = parser.boolean(it)?;
            out.write_str(if v { "true" } else { "false" })
                .map_err(|_| fmt_err(pos))?;
            parser.advance_fixed(it)
        }
        ItemKind::Null => {
            out.write_str("null").map_err(|_| fmt_err(pos))?;
            parser.advance_fixed(it)
        }
        ItemKind::Undefined => {
            out.write_str("undefined").map_err(|_| fmt_err(pos))?;
            parser.advance_fixed(it)
        }
        ItemKind::Simple => {
            let v = parser.simple_value(it)?;
            write!(out, "simple({v})").map_err(|_| fmt_err(pos))?;
            parser.advance_fixed(it)
        }
        ItemKind::Float16 => {
            let v = decode_half(parser.float16_bits(it)?);
            write_float(out, v, "_1", opts, pos)?;
            parser.advance_fixed(it)
        }
        ItemKind::Float32 => {
            let v = parser.float32(it)?;
            write_float(out, f64::from(v), "_2", opts, pos)?;
            parser.advance_fixed(it)
        }
        ItemKind::Float64 => {
            let v = parser.float64(it)?;
            write_float(out, v, "_3", opts, pos)?;
            parser.advance_fixed(it)
        }
        ItemKind::ByteString => write_string_item(parser, it, out, false),
        ItemKind::TextString => write_string_item(parser, it, out, true),
        ItemKind::Array | ItemKind::Map => {
            let is_map = matches!(it.kind(), ItemKind::Map);
            let open = match (is_map, it.is_length_known()) {
                (false, true) => "[",
                (false, false) => "[_ ",
                (true, true) => "{",
                (true, false) => "{_ ",
            };
            out.write_str(open).map_err(|_| fmt_err(pos))?;
            let mut child = parser.enter_container(it)?;
            let mut first = true;
            while !child.at_end() {
                if !first {
                    out.write_str(", ").map_err(|_| fmt_err(child.position()))?;
                }
                first = false;
                write_item(parser, &mut child, out, opts, depth + 1)?;
                if is_map {
                    out.write_str(": ").map_err(|_| fmt_err(child.position()))?;
                    if child.at_end() {
                        return Err(Error::new(ErrorCode::UnexpectedBreak, child.position()));
                    }
                    write_item(parser, &mut child, out, opts, depth + 1)?;
                }
            }
            out.write_str(if is_map { "}" } else { "]" })
                .map_err(|_| fmt_err(pos))?;
            parser.leave_container(it, &child)
        }
        ItemKind::Invalid => Err(Error::new(ErrorCode::InternalError, pos)),
    }
}
