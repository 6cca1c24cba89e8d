//! Forward-only parser and cursor.
//!
//! A [`Parser`] owns a [`Source`] and latches the first structural error it
//! encounters. A [`Cursor`] is a small `Copy` value describing one parsed
//! position: the item kind, the pre-parsed head value, and the count of
//! items still expected in the enclosing container. Every operation that
//! touches the input is a parser method taking the cursor, so exclusive
//! access to the source stays visible in the signatures.
//!
//! ```
//! use cborstream::{ItemKind, Parser, ParseOptions, SliceSource};
//!
//! let input = [0x83, 0x01, 0x20, 0xf5]; // [1, -1, true]
//! let mut parser = Parser::new(SliceSource::new(&input), ParseOptions::new());
//! let root = parser.root()?;
//! assert_eq!(root.kind(), ItemKind::Array);
//!
//! let mut item = parser.enter_container(&root)?;
//! assert_eq!(parser.uint64(&item)?, 1);
//! parser.advance(&mut item)?;
//! assert_eq!(parser.int64(&item)?, -1);
//! parser.advance(&mut item)?;
//! assert!(parser.boolean(&item)?);
//! parser.advance(&mut item)?;
//! assert!(item.at_end());
//! # Ok::<(), cborstream::Error>(())
//! ```

use crate::limits::ParseOptions;
use crate::source::Source;
use crate::wire;
use crate::{Error, ErrorCode};

#[cfg(feature = "alloc")]
use alloc::string::String;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// Sentinel for `remaining` meaning "indefinite length; terminate on break".
const REMAINING_INDEFINITE: u64 = u64::MAX;

/// The observable kind of a CBOR item.
///
/// Majors 0 and 1 collapse into [`ItemKind::Integer`]; major 7 splits into
/// its simple and float variants. [`ItemKind::Invalid`] marks an exhausted
/// or errored cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Unsigned or negative integer (majors 0 and 1).
    Integer,
    /// Byte string (major 2), definite or chunked.
    ByteString,
    /// Text string (major 3), definite or chunked.
    TextString,
    /// Array (major 4).
    Array,
    /// Map (major 5).
    Map,
    /// Tag (major 6) decorating the following item.
    Tag,
    /// Simple value other than the named ones below.
    Simple,
    /// `false` or `true`.
    Bool,
    /// `null`.
    Null,
    /// `undefined`.
    Undefined,
    /// Half-precision float (0xf9).
    Float16,
    /// Single-precision float (0xfa).
    Float32,
    /// Double-precision float (0xfb).
    Float64,
    /// No item: the cursor is exhausted or errored.
    Invalid,
}

const FLAG_VALUE_IN_FOLLOW_UP: u8 = 0x01;
const FLAG_NEGATIVE: u8 = 0x02;
const FLAG_INDEFINITE: u8 = 0x04;

/// Pre-parse state bits carried by a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ItemFlags(u8);

impl ItemFlags {
    const fn empty() -> Self {
        Self(0)
    }

    const fn has(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    fn set(&mut self, bit: u8) {
        self.0 |= bit;
    }
}

/// A copyable, non-owning position in a CBOR stream.
///
/// Produced by [`Parser::root`] and [`Parser::enter_container`]; advanced in
/// place by the parser. When [`Cursor::kind`] is [`ItemKind::Invalid`] the
/// cursor is at the end of its container (or errored) and no extraction is
/// permitted.
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    pos: usize,
    /// Items still expected in the enclosing container, or
    /// `REMAINING_INDEFINITE`.
    remaining: u64,
    /// Up to 16 bits of the pre-parsed head value.
    extra: u16,
    kind: ItemKind,
    flags: ItemFlags,
}

impl Cursor {
    /// The kind of the item at this position.
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Byte offset of this item's head in the stream.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns `true` while the cursor designates an item.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !matches!(self.kind, ItemKind::Invalid)
    }

    /// Returns `true` once every item of the enclosing container (or the
    /// single top-level item) has been consumed.
    #[must_use]
    pub const fn at_end(&self) -> bool {
        self.remaining == 0
    }

    /// Returns `false` iff this item's head declared indefinite length.
    #[must_use]
    pub const fn is_length_known(&self) -> bool {
        !self.flags.has(FLAG_INDEFINITE)
    }

    /// Returns `true` for arrays and maps.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self.kind, ItemKind::Array | ItemKind::Map)
    }

    /// Returns `true` for integers of either sign.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self.kind, ItemKind::Integer)
    }

    /// Returns `true` for negative integers (major 1).
    #[must_use]
    pub fn is_negative_integer(&self) -> bool {
        self.is_integer() && self.flags.has(FLAG_NEGATIVE)
    }

    /// Returns `true` for byte and text strings.
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self.kind, ItemKind::ByteString | ItemKind::TextString)
    }

    /// Returns `true` for half, single, and double precision floats.
    #[must_use]
    pub fn is_float(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::Float16 | ItemKind::Float32 | ItemKind::Float64
        )
    }

    fn string_major(&self) -> Option<u8> {
        match self.kind {
            ItemKind::ByteString => Some(wire::MAJOR_BYTES),
            ItemKind::TextString => Some(wire::MAJOR_TEXT),
            _ => None,
        }
    }
}

/// One definite-length chunk of a (possibly chunked) string: the byte offset
/// of its payload and the payload length.
#[derive(Debug, Clone, Copy)]
pub struct Chunk {
    /// Offset of the first payload byte.
    pub pos: usize,
    /// Payload length in bytes.
    pub len: usize,
}

enum ChunkState {
    /// Definite-length string; the single chunk has not been yielded yet.
    Definite { pos: usize, len: usize },
    /// Inside an indefinite-length string, positioned at a chunk head or the
    /// break.
    Chunked { major: u8, pos: usize },
    /// Past the last chunk; `end` is the offset just after the string.
    Done { end: usize },
}

/// A restartable, synchronous walk over the chunks of a string item.
///
/// Produced by [`Parser::string_chunks`]; stepped with
/// [`StringChunks::next`]. A definite-length string yields exactly one
/// chunk. Chunks of an indefinite-length string must all be definite-length
/// strings of the same major type; anything else fails with
/// [`ErrorCode::IllegalType`].
pub struct StringChunks {
    state: ChunkState,
}

impl StringChunks {
    /// Produce the next chunk, or `None` after the last one.
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` on a chunk of the wrong type, `UnexpectedEof`
    /// or `BreakMissingAtEof` on truncation, and `DataTooLarge` on offset
    /// overflow.
    pub fn next<S: Source>(&mut self, parser: &mut Parser<S>) -> Result<Option<Chunk>, Error> {
        match self.state {
            ChunkState::Definite { pos, len } => {
                if !parser.src.available(pos, len) {
                    return Err(parser.fail(ErrorCode::UnexpectedEof, pos));
                }
                let end = wire::checked_add(pos, len, pos)?;
                self.state = ChunkState::Done { end };
                Ok(Some(Chunk { pos, len }))
            }
            ChunkState::Chunked { major, pos } => {
                let mut first = [0u8];
                if !parser.src.available(pos, 1) {
                    return Err(parser.fail(ErrorCode::BreakMissingAtEof, pos));
                }
                parser.src.read_at(pos, &mut first)?;
                if first[0] == wire::BREAK_BYTE {
                    self.state = ChunkState::Done { end: pos + 1 };
                    return Ok(None);
                }
                if first[0] >> 5 != major || first[0] & 0x1f == wire::AI_INDEFINITE {
                    return Err(parser.fail(ErrorCode::IllegalType, pos));
                }
                let (len, head) = parser.head_value(pos)?;
                let len = wire::len_to_usize(len, pos)?;
                let payload = wire::checked_add(pos, head, pos)?;
                if !parser.src.available(payload, len) {
                    return Err(parser.fail(ErrorCode::UnexpectedEof, payload));
                }
                let next = wire::checked_add(payload, len, pos)?;
                self.state = ChunkState::Chunked { major, pos: next };
                Ok(Some(Chunk { pos: payload, len }))
            }
            ChunkState::Done { .. } => Ok(None),
        }
    }

    /// Offset just past the string, available once `next` has returned
    /// `None` (or the single definite chunk has been yielded).
    fn end(&self) -> Option<usize> {
        match self.state {
            ChunkState::Done { end } => Some(end),
            _ => None,
        }
    }
}

/// A streaming CBOR parser over a [`Source`].
///
/// The parser owns the source binding for the lifetime of all cursors
/// derived from it and latches the first structural error so that
/// subsequent calls on a broken stream fail consistently.
#[derive(Debug)]
pub struct Parser<S> {
    src: S,
    opts: ParseOptions,
    err: Option<Error>,
}

impl<'a> Parser<crate::source::SliceSource<'a>> {
    /// Parse from a contiguous buffer with default options.
    #[must_use]
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self::new(crate::source::SliceSource::new(data), ParseOptions::new())
    }
}

impl<S: Source> Parser<S> {
    /// Bind a parser to a source.
    pub const fn new(src: S, opts: ParseOptions) -> Self {
        Self {
            src,
            opts,
            err: None,
        }
    }

    /// The first structural error encountered, if any.
    #[must_use]
    pub const fn latched_error(&self) -> Option<Error> {
        self.err
    }

    /// The options this parser was built with.
    #[must_use]
    pub const fn options(&self) -> &ParseOptions {
        &self.opts
    }

    /// Consume the parser and return the source.
    pub fn into_source(self) -> S {
        self.src
    }

    /// Returns `true` if no byte is available at the cursor position, i.e.
    /// the stream ends exactly here.
    pub fn is_exhausted(&mut self, it: &Cursor) -> bool {
        !self.src.available(it.pos, 1)
    }

    /// Pre-parse the single top-level item and return its cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or the first head is
    /// malformed.
    pub fn root(&mut self) -> Result<Cursor, Error> {
        self.check()?;
        let mut it = Cursor {
            pos: 0,
            remaining: 1,
            extra: 0,
            kind: ItemKind::Invalid,
            flags: ItemFlags::empty(),
        };
        self.preparse(&mut it)?;
        Ok(it)
    }

    fn check(&self) -> Result<(), Error> {
        match self.err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn fail(&mut self, code: ErrorCode, off: usize) -> Error {
        let e = Error::new(code, off);
        if self.err.is_none() {
            self.err = Some(e);
        }
        e
    }

    fn read_u8(&mut self, pos: usize) -> Result<u8, Error> {
        let mut b = [0u8];
        self.src.read_at(pos, &mut b)?;
        Ok(b[0])
    }

    /// Decode the head at `pos`, returning its value and total byte length.
    /// The head must already have been bounds-checked by pre-parse, except
    /// in the chunk walker which checks availability itself.
    fn head_value(&mut self, pos: usize) -> Result<(u64, usize), Error> {
        let ib = self.read_u8(pos)?;
        let ai = ib & 0x1f;
        let head = wire::head_len(ai).map_err(|code| self.fail(code, pos))?;
        if head == 1 {
            return Ok((u64::from(ai), 1));
        }
        if !self.src.available(pos, head) {
            return Err(self.fail(ErrorCode::UnexpectedEof, pos));
        }
        let mut follow = [0u8; 8];
        self.src.read_at(pos + 1, &mut follow[..head - 1])?;
        Ok((wire::follow_value(ai, &follow), head))
    }

    /// Size in bytes of the head at `pos` (1 for indefinite markers).
    fn head_size(&mut self, pos: usize) -> Result<usize, Error> {
        let ib = self.read_u8(pos)?;
        wire::head_len(ib & 0x1f).map_err(|code| self.fail(code, pos))
    }

    /// Run the pre-parse state machine on the head at the cursor position.
    fn preparse(&mut self, it: &mut Cursor) -> Result<(), Error> {
        it.flags = ItemFlags::empty();
        it.extra = 0;
        it.kind = ItemKind::Invalid;
        let off = it.pos;

        // Inside an indefinite-length container the break stop code is the
        // terminator; EOF before it is its own error.
        if it.remaining == REMAINING_INDEFINITE {
            if !self.src.available(off, 1) {
                return Err(self.fail(ErrorCode::BreakMissingAtEof, off));
            }
            if self.read_u8(off)? == wire::BREAK_BYTE {
                it.pos += 1;
                it.remaining = 0;
                return Ok(());
            }
        } else if !self.src.available(off, 1) {
            return Err(self.fail(ErrorCode::UnexpectedEof, off));
        }

        let ib = self.read_u8(off)?;
        let major = ib >> 5;
        let ai = ib & 0x1f;

        if major == wire::MAJOR_SIMPLE {
            return self.preparse_simple(it, ai, off);
        }

        if ai == wire::AI_INDEFINITE {
            it.kind = match major {
                wire::MAJOR_BYTES => ItemKind::ByteString,
                wire::MAJOR_TEXT => ItemKind::TextString,
                wire::MAJOR_ARRAY => ItemKind::Array,
                wire::MAJOR_MAP => ItemKind::Map,
                // Indefinite length is meaningless for majors 0, 1, and 6.
                _ => return Err(self.fail(ErrorCode::IllegalNumber, off)),
            };
            it.flags.set(FLAG_INDEFINITE);
            return Ok(());
        }

        let head = match wire::head_len(ai) {
            Ok(n) => n,
            Err(code) => return Err(self.fail(code, off)),
        };
        if !self.src.available(off, head) {
            return Err(self.fail(ErrorCode::UnexpectedEof, off));
        }

        if ai < 24 {
            it.extra = u16::from(ai);
        } else if head <= 3 {
            let mut follow = [0u8; 2];
            self.src.read_at(off + 1, &mut follow[..head - 1])?;
            it.extra = if head == 2 {
                u16::from(follow[0])
            } else {
                u16::from_be_bytes(follow)
            };
        } else {
            it.flags.set(FLAG_VALUE_IN_FOLLOW_UP);
        }

        it.kind = match major {
            wire::MAJOR_UINT => ItemKind::Integer,
            wire::MAJOR_NINT => {
                it.flags.set(FLAG_NEGATIVE);
                ItemKind::Integer
            }
            wire::MAJOR_BYTES => ItemKind::ByteString,
            wire::MAJOR_TEXT => ItemKind::TextString,
            wire::MAJOR_ARRAY => ItemKind::Array,
            wire::MAJOR_MAP => ItemKind::Map,
            _ => ItemKind::Tag,
        };
        Ok(())
    }

    fn preparse_simple(&mut self, it: &mut Cursor, ai: u8, off: usize) -> Result<(), Error> {
        match ai {
            wire::SIMPLE_FALSE => it.kind = ItemKind::Bool,
            wire::SIMPLE_TRUE => {
                it.kind = ItemKind::Bool;
                it.extra = 1;
            }
            wire::SIMPLE_NULL => it.kind = ItemKind::Null,
            wire::SIMPLE_UNDEFINED => it.kind = ItemKind::Undefined,
            0..=19 => {
                it.kind = ItemKind::Simple;
                it.extra = u16::from(ai);
            }
            24 => {
                if !self.src.available(off, 2) {
                    return Err(self.fail(ErrorCode::UnexpectedEof, off));
                }
                let value = self.read_u8(off + 1)?;
                if self.opts.strict_simple && value < 32 {
                    return Err(self.fail(ErrorCode::IllegalSimpleType, off));
                }
                it.kind = ItemKind::Simple;
                it.extra = u16::from(value);
            }
            25 => {
                if !self.src.available(off, 3) {
                    return Err(self.fail(ErrorCode::UnexpectedEof, off));
                }
                let mut follow = [0u8; 2];
                self.src.read_at(off + 1, &mut follow)?;
                it.kind = ItemKind::Float16;
                it.extra = u16::from_be_bytes(follow);
            }
            26 | 27 => {
                let head = if ai == 26 { 5 } else { 9 };
                if !self.src.available(off, head) {
                    return Err(self.fail(ErrorCode::UnexpectedEof, off));
                }
                it.kind = if ai == 26 {
                    ItemKind::Float32
                } else {
                    ItemKind::Float64
                };
                it.flags.set(FLAG_VALUE_IN_FOLLOW_UP);
            }
            28..=30 => return Err(self.fail(ErrorCode::UnknownType, off)),
            _ => return Err(self.fail(ErrorCode::UnexpectedBreak, off)),
        }
        Ok(())
    }

    /// Move the cursor to `new_pos` and pre-parse the next item there,
    /// maintaining the `remaining` count. A tag does not consume an item
    /// slot; the item it decorates does.
    fn step(&mut self, it: &mut Cursor, new_pos: usize) -> Result<(), Error> {
        let was_tag = matches!(it.kind, ItemKind::Tag);
        it.pos = new_pos;
        if !was_tag && it.remaining != REMAINING_INDEFINITE {
            it.remaining -= 1;
            if it.remaining == 0 {
                it.kind = ItemKind::Invalid;
                it.flags = ItemFlags::empty();
                it.extra = 0;
                return Ok(());
            }
        }
        self.preparse(it)
    }

    /// Advance over exactly one fixed-size item: an integer, tag, simple
    /// value, boolean, null, undefined, or float.
    ///
    /// # Errors
    ///
    /// Returns `AdvancePastEof` on an exhausted cursor and `IllegalType`
    /// for strings and containers (use [`Parser::advance`]).
    pub fn advance_fixed(&mut self, it: &mut Cursor) -> Result<(), Error> {
        self.check()?;
        if it.at_end() || !it.is_valid() {
            return Err(self.fail(ErrorCode::AdvancePastEof, it.pos));
        }
        if it.is_container() || it.is_string() {
            return Err(Error::new(ErrorCode::IllegalType, it.pos));
        }
        let size = self.head_size(it.pos)?;
        let next = wire::checked_add(it.pos, size, it.pos)?;
        self.step(it, next)
    }

    /// Advance over one item of any kind, recursing into containers and
    /// walking chunked strings.
    ///
    /// # Errors
    ///
    /// Returns `AdvancePastEof` on an exhausted cursor, `NestingTooDeep`
    /// past the configured depth cap, and any structural error found while
    /// skipping.
    pub fn advance(&mut self, it: &mut Cursor) -> Result<(), Error> {
        self.check()?;
        self.skip(it, 0)
    }

    fn skip(&mut self, it: &mut Cursor, depth: usize) -> Result<(), Error> {
        if it.at_end() || !it.is_valid() {
            return Err(self.fail(ErrorCode::AdvancePastEof, it.pos));
        }
        if it.is_container() {
            if depth >= self.opts.max_depth {
                return Err(self.fail(ErrorCode::NestingTooDeep, it.pos));
            }
            let mut child = self.enter_container(it)?;
            while !child.at_end() {
                self.skip(&mut child, depth + 1)?;
            }
            return self.leave_container(it, &child);
        }
        if it.is_string() {
            let mut chunks = self.string_chunks(it)?;
            while chunks.next(self)?.is_some() {}
            let end = chunks
                .end()
                .ok_or_else(|| Error::new(ErrorCode::InternalError, it.pos))?;
            return self.step(it, end);
        }
        let size = self.head_size(it.pos)?;
        let next = wire::checked_add(it.pos, size, it.pos)?;
        self.step(it, next)
    }

    /// Create a child cursor at the first element of the container under
    /// `it`. The parent cursor stays on the container head until
    /// [`Parser::leave_container`].
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` if `it` is not an array or map, and
    /// `DataTooLarge` if the declared length cannot be tracked.
    pub fn enter_container(&mut self, it: &Cursor) -> Result<Cursor, Error> {
        self.check()?;
        let per_item: u64 = match it.kind {
            ItemKind::Array => 1,
            ItemKind::Map => 2,
            _ => return Err(Error::new(ErrorCode::IllegalType, it.pos)),
        };
        let mut child = *it;
        child.extra = 0;
        child.flags = ItemFlags::empty();
        child.kind = ItemKind::Invalid;
        child.pos = wire::checked_add(it.pos, self.head_size(it.pos)?, it.pos)?;

        if it.is_length_known() {
            let len = self.item_value(it)?;
            let remaining = len
                .checked_mul(per_item)
                .ok_or_else(|| self.fail(ErrorCode::DataTooLarge, it.pos))?;
            if remaining == REMAINING_INDEFINITE {
                return Err(self.fail(ErrorCode::DataTooLarge, it.pos));
            }
            child.remaining = remaining;
            if remaining == 0 {
                return Ok(child);
            }
        } else {
            child.remaining = REMAINING_INDEFINITE;
        }
        self.preparse(&mut child)?;
        Ok(child)
    }

    /// Move the parent cursor past the container whose child cursor has
    /// reached its end, and pre-parse the next parent item.
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the child is not at its end.
    pub fn leave_container(&mut self, it: &mut Cursor, child: &Cursor) -> Result<(), Error> {
        self.check()?;
        debug_assert!(it.is_container());
        if !child.at_end() {
            return Err(self.fail(ErrorCode::InternalError, child.pos));
        }
        self.step(it, child.pos)
    }

    /// Raw head fields at `pos`: major, additional information, value, and
    /// head length. Used by the validator for shortest-form checks.
    pub(crate) fn head_raw(&mut self, pos: usize) -> Result<(u8, u8, u64, usize), Error> {
        let ib = self.read_u8(pos)?;
        let (value, head) = self.head_value(pos)?;
        Ok((ib >> 5, ib & 0x1f, value, head))
    }

    /// Decode the full head value of the current item, re-reading the
    /// follow-on bytes when they exceed the 16 bits cached in the cursor.
    fn item_value(&mut self, it: &Cursor) -> Result<u64, Error> {
        if it.flags.has(FLAG_VALUE_IN_FOLLOW_UP) {
            let (value, _) = self.head_value(it.pos)?;
            Ok(value)
        } else {
            Ok(u64::from(it.extra))
        }
    }

    /// Extract an unsigned integer (major 0).
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` unless the item is a non-negative integer.
    pub fn uint64(&mut self, it: &Cursor) -> Result<u64, Error> {
        self.check()?;
        if !it.is_integer() || it.is_negative_integer() {
            return Err(Error::new(ErrorCode::IllegalType, it.pos));
        }
        self.item_value(it)
    }

    /// Extract the raw magnitude of a negative integer (major 1): the item
    /// represents `-1 - magnitude`.
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` unless the item is a negative integer.
    pub fn negative_magnitude(&mut self, it: &Cursor) -> Result<u64, Error> {
        self.check()?;
        if !it.is_negative_integer() {
            return Err(Error::new(ErrorCode::IllegalType, it.pos));
        }
        self.item_value(it)
    }

    /// Extract an integer of either sign with range checking.
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` for non-integers and `DataTooLarge` when the
    /// value does not fit in `i64` (raw magnitude >= 2^63).
    pub fn int64(&mut self, it: &Cursor) -> Result<i64, Error> {
        self.check()?;
        if !it.is_integer() {
            return Err(Error::new(ErrorCode::IllegalType, it.pos));
        }
        let raw = self.item_value(it)?;
        if it.is_negative_integer() {
            if raw > i64::MAX as u64 {
                return Err(Error::new(ErrorCode::DataTooLarge, it.pos));
            }
            Ok(-1 - raw as i64)
        } else {
            i64::try_from(raw).map_err(|_| Error::new(ErrorCode::DataTooLarge, it.pos))
        }
    }

    /// Extract a tag number (major 6).
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` unless the item is a tag.
    pub fn tag(&mut self, it: &Cursor) -> Result<u64, Error> {
        self.check()?;
        if !matches!(it.kind, ItemKind::Tag) {
            return Err(Error::new(ErrorCode::IllegalType, it.pos));
        }
        self.item_value(it)
    }

    /// Extract a simple value (excluding booleans, null, and undefined).
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` unless the item is a simple value.
    pub fn simple_value(&mut self, it: &Cursor) -> Result<u8, Error> {
        self.check()?;
        if !matches!(it.kind, ItemKind::Simple) {
            return Err(Error::new(ErrorCode::IllegalType, it.pos));
        }
        Ok(it.extra as u8)
    }

    /// Extract a boolean.
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` unless the item is `false` or `true`.
    pub fn boolean(&mut self, it: &Cursor) -> Result<bool, Error> {
        self.check()?;
        if !matches!(it.kind, ItemKind::Bool) {
            return Err(Error::new(ErrorCode::IllegalType, it.pos));
        }
        Ok(it.extra == 1)
    }

    /// Extract the raw binary16 bit pattern of a half-precision float.
    /// Use [`crate::half::decode_half`] to widen it.
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` unless the item is a half float.
    pub fn float16_bits(&mut self, it: &Cursor) -> Result<u16, Error> {
        self.check()?;
        if !matches!(it.kind, ItemKind::Float16) {
            return Err(Error::new(ErrorCode::IllegalType, it.pos));
        }
        Ok(it.extra)
    }

    /// Extract a single-precision float, bit-exact.
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` unless the item is a single float.
    pub fn float32(&mut self, it: &Cursor) -> Result<f32, Error> {
        self.check()?;
        if !matches!(it.kind, ItemKind::Float32) {
            return Err(Error::new(ErrorCode::IllegalType, it.pos));
        }
        let raw = self.item_value(it)?;
        Ok(f32::from_bits(raw as u32))
    }

    /// Extract a double-precision float, bit-exact.
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` unless the item is a double float.
    pub fn float64(&mut self, it: &Cursor) -> Result<f64, Error> {
        self.check()?;
        if !matches!(it.kind, ItemKind::Float64) {
            return Err(Error::new(ErrorCode::IllegalType, it.pos));
        }
        let raw = self.item_value(it)?;
        Ok(f64::from_bits(raw))
    }

    /// Extract a half-precision float widened exactly to `f64`.
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` unless the item is a half float.
    pub fn half_float(&mut self, it: &Cursor) -> Result<f64, Error> {
        Ok(crate::half::decode_half(self.float16_bits(it)?))
    }

    /// The declared length of a definite-length string.
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` for non-strings and for chunked strings (use
    /// [`Parser::calculate_string_length`]), `DataTooLarge` if the length
    /// exceeds the platform word.
    pub fn string_length(&mut self, it: &Cursor) -> Result<usize, Error> {
        self.check()?;
        if it.string_major().is_none() || !it.is_length_known() {
            return Err(Error::new(ErrorCode::IllegalType, it.pos));
        }
        let len = self.item_value(it)?;
        wire::len_to_usize(len, it.pos)
    }

    /// The declared element count of a definite-length container, or `None`
    /// for an indefinite-length one.
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` unless the item is an array or map.
    pub fn container_length(&mut self, it: &Cursor) -> Result<Option<u64>, Error> {
        self.check()?;
        if !it.is_container() {
            return Err(Error::new(ErrorCode::IllegalType, it.pos));
        }
        if !it.is_length_known() {
            return Ok(None);
        }
        self.item_value(it).map(Some)
    }

    /// Begin a chunk walk over the string under `it`.
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` unless the item is a string.
    pub fn string_chunks(&mut self, it: &Cursor) -> Result<StringChunks, Error> {
        self.check()?;
        let major = it
            .string_major()
            .ok_or_else(|| Error::new(ErrorCode::IllegalType, it.pos))?;
        let state = if it.is_length_known() {
            let len = self.item_value(it)?;
            let len = wire::len_to_usize(len, it.pos)?;
            let head = self.head_size(it.pos)?;
            ChunkState::Definite {
                pos: wire::checked_add(it.pos, head, it.pos)?,
                len,
            }
        } else {
            ChunkState::Chunked {
                major,
                pos: wire::checked_add(it.pos, 1, it.pos)?,
            }
        };
        Ok(StringChunks { state })
    }

    /// Borrow the payload bytes of one chunk from the source.
    ///
    /// # Errors
    ///
    /// Propagates source errors (`UnexpectedEof`, `Io`).
    pub fn chunk_bytes(&mut self, chunk: Chunk) -> Result<&[u8], Error> {
        self.src.take_bytes(chunk.pos, chunk.len)
    }

    /// Total payload length of the string under `it`, walking chunks when
    /// the length is not known up front.
    ///
    /// # Errors
    ///
    /// Returns `DataTooLarge` if the sum overflows the platform word, plus
    /// any chunk-walk error.
    pub fn calculate_string_length(&mut self, it: &Cursor) -> Result<usize, Error> {
        self.check()?;
        if it.is_length_known() {
            return self.string_length(it);
        }
        let mut total: usize = 0;
        let mut chunks = self.string_chunks(it)?;
        while let Some(chunk) = chunks.next(self)? {
            total = wire::checked_add(total, chunk.len, it.pos)?;
        }
        Ok(total)
    }

    /// Zero-copy access to the payload of a definite-length string. The
    /// cursor is not advanced; call [`Parser::advance`] after the borrow
    /// ends.
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` for chunked strings (copy them instead), plus
    /// any source error.
    pub fn string_bytes(&mut self, it: &Cursor) -> Result<&[u8], Error> {
        self.check()?;
        if it.string_major().is_none() || !it.is_length_known() {
            return Err(Error::new(ErrorCode::IllegalType, it.pos));
        }
        let len = self.item_value(it)?;
        let len = wire::len_to_usize(len, it.pos)?;
        let head = self.head_size(it.pos)?;
        let payload = wire::checked_add(it.pos, head, it.pos)?;
        self.src.take_bytes(payload, len)
    }

    /// Copy the full string payload into `dst`, concatenating chunks, and
    /// advance the cursor past the string. Returns the number of bytes
    /// copied.
    ///
    /// # Errors
    ///
    /// Returns `OutOfMemory` if `dst` is too small (the cursor does not
    /// advance), plus any chunk-walk error.
    pub fn copy_string(&mut self, it: &mut Cursor, dst: &mut [u8]) -> Result<usize, Error> {
        self.check()?;
        let mut total: usize = 0;
        let mut chunks = self.string_chunks(it)?;
        while let Some(chunk) = chunks.next(self)? {
            let end = wire::checked_add(total, chunk.len, it.pos)?;
            if end > dst.len() {
                return Err(Error::new(ErrorCode::OutOfMemory, chunk.pos));
            }
            self.src.read_at(chunk.pos, &mut dst[total..end])?;
            total = end;
        }
        let end = chunks
            .end()
            .ok_or_else(|| Error::new(ErrorCode::InternalError, it.pos))?;
        self.step(it, end)?;
        Ok(total)
    }

    /// Copy the full string payload into an owned buffer and advance the
    /// cursor past the string. This is the only allocating operation in the
    /// parser.
    ///
    /// # Errors
    ///
    /// Returns `OutOfMemory` if allocation fails, plus any chunk-walk
    /// error.
    #[cfg(feature = "alloc")]
    pub fn string_to_vec(&mut self, it: &mut Cursor) -> Result<Vec<u8>, Error> {
        self.check()?;
        let mut out = Vec::new();
        let mut chunks = self.string_chunks(it)?;
        while let Some(chunk) = chunks.next(self)? {
            out.try_reserve(chunk.len)
                .map_err(|_| Error::new(ErrorCode::OutOfMemory, chunk.pos))?;
            out.extend_from_slice(self.src.take_bytes(chunk.pos, chunk.len)?);
        }
        let end = chunks
            .end()
            .ok_or_else(|| Error::new(ErrorCode::InternalError, it.pos))?;
        self.step(it, end)?;
        Ok(out)
    }

    /// Copy a text string into an owned `String`, validating UTF-8 over the
    /// concatenated payload, and advance the cursor.
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` for byte strings and
    /// `InvalidUtf8TextString` on malformed text.
    #[cfg(feature = "alloc")]
    pub fn text_to_string(&mut self, it: &mut Cursor) -> Result<String, Error> {
        if !matches!(it.kind, ItemKind::TextString) {
            self.check()?;
            return Err(Error::new(ErrorCode::IllegalType, it.pos));
        }
        let off = it.pos;
        let bytes = self.string_to_vec(it)?;
        String::from_utf8(bytes).map_err(|_| Error::new(ErrorCode::InvalidUtf8TextString, off))
    }

    /// Compare the text string under `it` with `expected` without copying
    /// or advancing.
    ///
    /// # Errors
    ///
    /// Returns `IllegalType` unless the item is a text string, plus any
    /// chunk-walk error.
    pub fn text_string_equals(&mut self, it: &Cursor, expected: &str) -> Result<bool, Error> {
        self.check()?;
        if !matches!(it.kind, ItemKind::TextString) {
            return Err(Error::new(ErrorCode::IllegalType, it.pos));
        }
        let mut rest = expected.as_bytes();
        let mut chunks = self.string_chunks(it)?;
        let mut buf = [0u8; 64];
        while let Some(chunk) = chunks.next(self)? {
            if chunk.len > rest.len() {
                return Ok(false);
            }
            let mut pos = chunk.pos;
            let mut remaining = chunk.len;
            while remaining > 0 {
                let n = remaining.min(buf.len());
                self.src.read_at(pos, &mut buf[..n])?;
                if buf[..n] != rest[..n] {
                    return Ok(false);
                }
                rest = &rest[n..];
                pos += n;
                remaining -= n;
            }
        }
        Ok(rest.is_empty())
    }

    /// Compare the encoded bytes of the items starting at `a` and `b`.
    /// Used for deterministic map-key comparison; both ranges are walked to
    /// find their ends, then compared bytewise.
    pub(crate) fn encoded_items_equal(&mut self, a: &Cursor, b: &Cursor) -> Result<bool, Error> {
        let a_end = self.skip_to_end(a)?;
        let b_end = self.skip_to_end(b)?;
        if a_end - a.pos != b_end - b.pos {
            return Ok(false);
        }
        let len = a_end - a.pos;
        let mut abuf = [0u8; 32];
        let mut bbuf = [0u8; 32];
        let mut done = 0;
        while done < len {
            let n = (len - done).min(abuf.len());
            self.src.read_at(a.pos + done, &mut abuf[..n])?;
            self.src.read_at(b.pos + done, &mut bbuf[..n])?;
            if abuf[..n] != bbuf[..n] {
                return Ok(false);
            }
            done += n;
        }
        Ok(true)
    }

    /// The offset just past the item under `it` (including any tags),
    /// leaving the cursor alone.
    fn skip_to_end(&mut self, it: &Cursor) -> Result<usize, Error> {
        let mut probe = *it;
        // Pin the probe inside a one-item frame; tags do not consume the
        // slot, so the loop carries a tag chain through to its item.
        probe.remaining = 1;
        while !probe.at_end() {
            self.skip(&mut probe, 0)?;
        }
        Ok(probe.pos)
    }
}
