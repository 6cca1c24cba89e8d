//! Single-pass structural and semantic validation.
//!
//! The validator drives a cursor over one complete data item, applying the
//! strictness rules selected in [`ValidateOptions`]: shortest-form heads,
//! definite lengths, UTF-8 text, tag appropriateness, simple-value range,
//! deterministic map-key uniqueness, and trailing-garbage detection.
//!
//! ```
//! use cborstream::{validate, ValidateOptions};
//!
//! // 5 encoded in two bytes decodes fine but is not canonical.
//! assert!(validate(&[0x18, 0x05], &ValidateOptions::basic()).is_ok());
//! assert!(validate(&[0x18, 0x05], &ValidateOptions::canonical()).is_err());
//! ```

use crate::limits::{ParseOptions, ValidateOptions};
use crate::parse::{Cursor, ItemKind, Parser};
use crate::source::{SliceSource, Source};
use crate::utf8;
use crate::wire;
use crate::{Error, ErrorCode};

/// Validate that `bytes` hold one well-formed data item under `opts`.
///
/// # Errors
///
/// Returns the first violation found, with the byte offset where it was
/// detected.
pub fn validate(bytes: &[u8], opts: &ValidateOptions) -> Result<(), Error> {
    let parse_opts = ParseOptions {
        max_depth: opts.max_depth,
        ..ParseOptions::new()
    };
    let mut parser = Parser::new(SliceSource::new(bytes), parse_opts);
    let root = parser.root()?;
    validate_cursor(&mut parser, &root, opts)
}

/// Validate one complete data item starting at `root`, reading through
/// `parser`.
///
/// With `require_complete` set, the source must end exactly where the item
/// does. Key-uniqueness checking revisits earlier offsets and therefore
/// needs a source that can serve them (a slice always can; a windowed
/// reader may fail with `Io`).
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate_cursor<S: Source>(
    parser: &mut Parser<S>,
    root: &Cursor,
    opts: &ValidateOptions,
) -> Result<(), Error> {
    let mut it = *root;
    validate_item(parser, &mut it, opts, 0)?;
    if opts.require_complete && !parser.is_exhausted(&it) {
        return Err(Error::new(ErrorCode::GarbageAtEnd, it.position()));
    }
    Ok(())
}

/// Advance past one complete element, carrying tag chains through to the
/// item they decorate.
fn advance_element<S: Source>(parser: &mut Parser<S>, it: &mut Cursor) -> Result<(), Error> {
    loop {
        let was_tag = matches!(it.kind(), ItemKind::Tag);
        parser.advance(it)?;
        if !was_tag {
            return Ok(());
        }
    }
}

fn shortest_head<S: Source>(parser: &mut Parser<S>, pos: usize) -> Result<(), Error> {
    let (_, ai, value, _) = parser.head_raw(pos)?;
    if wire::is_shortest_form(ai, value) {
        Ok(())
    } else {
        Err(Error::new(ErrorCode::NonCanonicalEncoding, pos))
    }
}

/// Item kinds a known tag may decorate; `None` means the tag is unknown.
fn allowed_tagged_kind(tag: u64, kind: ItemKind) -> Option<bool> {
    let ok = match tag {
        // Date/time string.
        0 => matches!(kind, ItemKind::TextString),
        // Epoch date/time: integer or any float width.
        1 => matches!(
            kind,
            ItemKind::Integer | ItemKind::Float16 | ItemKind::Float32 | ItemKind::Float64
        ),
        // Positive/negative bignum.
        2 | 3 => matches!(kind, ItemKind::ByteString),
        // Expected base64url/base64/base16 conversion.
        21 | 22 | 23 => matches!(kind, ItemKind::ByteString),
        // Embedded CBOR.
        24 => matches!(kind, ItemKind::ByteString),
        // URI, base64url text, base64 text, regex, MIME message.
        32..=36 => matches!(kind, ItemKind::TextString),
        _ => return None,
    };
    Some(ok)
}

fn validate_item<S: Source>(
    parser: &mut Parser<S>,
    it: &mut Cursor,
    opts: &ValidateOptions,
    depth: usize,
) -> Result<(), Error> {
    if depth > opts.max_depth {
        return Err(Error::new(ErrorCode::NestingTooDeep, it.position()));
    }
    let pos = it.position();
    match it.kind() {
        ItemKind::Integer => {
            if opts.require_canonical {
                shortest_head(parser, pos)?;
            }
            parser.advance_fixed(it)
        }
        ItemKind::Tag => {
            let tag = parser.tag(it)?;
            if opts.require_canonical {
                shortest_head(parser, pos)?;
            }
            parser.advance_fixed(it)?;
            if !it.is_valid() {
                // A tag with nothing to decorate.
                return Err(Error::new(ErrorCode::UnexpectedEof, pos));
            }
            match allowed_tagged_kind(tag, it.kind()) {
                Some(false) if opts.check_tags => {
                    return Err(Error::new(ErrorCode::InappropriateTagForType, pos));
                }
                None if opts.reject_unknown_tags => {
                    return Err(Error::new(ErrorCode::UnknownTag, pos));
                }
                _ => {}
            }
            validate_item(parser, it, opts, depth + 1)
        }
        ItemKind::Bool | ItemKind::Null | ItemKind::Undefined => parser.advance_fixed(it),
        ItemKind::Simple => {
            let value = parser.simple_value(it)?;
            let (_, ai, _, _) = parser.head_raw(pos)?;
            // Two-byte form is only well-formed for values >= 32; this is
            // reachable when the parser ran without strict pre-parse.
            if ai == 24 && value < 32 {
                return Err(Error::new(ErrorCode::IllegalSimpleType, pos));
            }
            if opts.reject_unknown_simple {
                return Err(Error::new(ErrorCode::UnknownSimpleType, pos));
            }
            parser.advance_fixed(it)
        }
        ItemKind::Float16 | ItemKind::Float32 | ItemKind::Float64 => parser.advance_fixed(it),
        ItemKind::ByteString | ItemKind::TextString => {
            let is_text = matches!(it.kind(), ItemKind::TextString);
            if it.is_length_known() {
                if opts.require_canonical {
                    shortest_head(parser, pos)?;
                }
            } else if opts.require_canonical {
                return Err(Error::new(ErrorCode::IndefiniteLengthForbidden, pos));
            }
            if is_text && opts.check_utf8 {
                let mut chunks = parser.string_chunks(it)?;
                while let Some(chunk) = chunks.next(parser)? {
                    let bytes = parser.chunk_bytes(chunk)?;
                    utf8::validate(bytes)
                        .map_err(|()| Error::new(ErrorCode::InvalidUtf8TextString, chunk.pos))?;
                }
            }
            parser.advance(it)
        }
        ItemKind::Array | ItemKind::Map => {
            let is_map = matches!(it.kind(), ItemKind::Map);
            // Entering the container consumes a nesting level.
            if depth + 1 > opts.max_depth {
                return Err(Error::new(ErrorCode::NestingTooDeep, pos));
            }
            if it.is_length_known() {
                if opts.require_canonical {
                    shortest_head(parser, pos)?;
                }
            } else if opts.require_canonical {
                return Err(Error::new(ErrorCode::IndefiniteLengthForbidden, pos));
            }

            let mut child = parser.enter_container(it)?;
            if is_map {
                let first_key = child;
                let mut pairs_seen: usize = 0;
                while !child.at_end() {
                    let key = child;
                    if opts.check_unique_keys && pairs_seen > 0 {
                        let mut probe = first_key;
                        for _ in 0..pairs_seen {
                            if parser.encoded_items_equal(&probe, &key)? {
                                return Err(Error::new(
                                    ErrorCode::DuplicateObjectKeys,
                                    key.position(),
                                ));
                            }
                            advance_element(parser, &mut probe)?;
                            advance_element(parser, &mut probe)?;
                        }
                    }
                    validate_item(parser, &mut child, opts, depth + 1)?;
                    if child.at_end() {
                        // A key with no value: the break landed mid-pair.
                        return Err(Error::new(ErrorCode::UnexpectedBreak, child.position()));
                    }
                    validate_item(parser, &mut child, opts, depth + 1)?;
                    pairs_seen += 1;
                }
            } else {
                while !child.at_end() {
                    validate_item(parser, &mut child, opts, depth + 1)?;
                }
            }
            parser.leave_container(it, &child)
        }
        ItemKind::Invalid => Err(Error::new(ErrorCode::InternalError, pos)),
    }
}
