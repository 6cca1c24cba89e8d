//! Forward-only CBOR encoder.
//!
//! [`Encoder`] writes one item at a time into a [`Sink`], tracking nested
//! container state so that closing a definite-length container verifies the
//! declared length and closing an indefinite-length one emits the break stop
//! code. Nothing is buffered beyond the head currently being packed.
//!
//! ```
//! use cborstream::{Encoder, VecSink};
//!
//! let mut enc = Encoder::new(VecSink::new());
//! enc.array(3, |enc| {
//!     enc.uint(1)?;
//!     enc.negative_uint(0)?; // encodes -1
//!     enc.bool(true)
//! })?;
//! assert_eq!(enc.finish()?.into_vec(), [0x83, 0x01, 0x20, 0xf5]);
//! # Ok::<(), cborstream::Error>(())
//! ```

use crate::limits::EncodeOptions;
use crate::sink::Sink;
use crate::wire;
use crate::{Error, ErrorCode};

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

// Without an allocator the inline array is the whole container stack.
const INLINE_FRAMES: usize = 64;

#[derive(Debug, Clone, Copy)]
struct Frame {
    /// Items still required before this container is complete;
    /// meaningless for indefinite-length containers.
    remaining: u64,
    indefinite: bool,
    /// Set when an item was emitted into a full definite container.
    over: bool,
}

#[derive(Debug)]
struct FrameStack {
    inline: [Frame; INLINE_FRAMES],
    len: usize,
    #[cfg(feature = "alloc")]
    overflow: Vec<Frame>,
}

impl FrameStack {
    const fn new() -> Self {
        const EMPTY: Frame = Frame {
            remaining: 0,
            indefinite: false,
            over: false,
        };
        Self {
            inline: [EMPTY; INLINE_FRAMES],
            len: 0,
            #[cfg(feature = "alloc")]
            overflow: Vec::new(),
        }
    }

    fn depth(&self) -> usize {
        #[cfg(feature = "alloc")]
        {
            self.len + self.overflow.len()
        }
        #[cfg(not(feature = "alloc"))]
        {
            self.len
        }
    }

    fn push(&mut self, frame: Frame, off: usize) -> Result<(), Error> {
        #[cfg(feature = "alloc")]
        {
            if self.len < INLINE_FRAMES && self.overflow.is_empty() {
                self.inline[self.len] = frame;
                self.len += 1;
            } else {
                self.overflow
                    .try_reserve(1)
                    .map_err(|_| Error::new(ErrorCode::OutOfMemory, off))?;
                self.overflow.push(frame);
            }
            Ok(())
        }
        #[cfg(not(feature = "alloc"))]
        {
            if self.len < INLINE_FRAMES {
                self.inline[self.len] = frame;
                self.len += 1;
                Ok(())
            } else {
                Err(Error::new(ErrorCode::NestingTooDeep, off))
            }
        }
    }

    fn top_mut(&mut self) -> Option<&mut Frame> {
        #[cfg(feature = "alloc")]
        {
            if let Some(f) = self.overflow.last_mut() {
                return Some(f);
            }
        }
        if self.len == 0 {
            None
        } else {
            Some(&mut self.inline[self.len - 1])
        }
    }

    fn pop(&mut self) -> Option<Frame> {
        #[cfg(feature = "alloc")]
        {
            if let Some(f) = self.overflow.pop() {
                return Some(f);
            }
        }
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            Some(self.inline[self.len])
        }
    }
}

/// Streaming CBOR encoder over a [`Sink`].
///
/// One top-level item is permitted; emitting a second returns
/// [`ErrorCode::GarbageAtEnd`]. A bounded [`SliceSink`](crate::SliceSink)
/// that fills up keeps the encoder drivable: subsequent operations return
/// [`ErrorCode::OutOfMemory`] while the sink accumulates the exact deficit.
#[derive(Debug)]
pub struct Encoder<S> {
    sink: S,
    opts: EncodeOptions,
    stack: FrameStack,
    root_done: bool,
}

impl<S: Sink> Encoder<S> {
    /// Bind an encoder to a sink with default options.
    pub fn new(sink: S) -> Self {
        Self::with_options(sink, EncodeOptions::new())
    }

    /// Bind an encoder to a sink.
    pub fn with_options(sink: S, opts: EncodeOptions) -> Self {
        Self {
            sink,
            opts,
            stack: FrameStack::new(),
            root_done: false,
        }
    }

    /// Borrow the sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutably borrow the sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Number of bytes submitted to the sink so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.sink.position()
    }

    /// Verify that one complete top-level item was emitted and return the
    /// sink.
    ///
    /// # Errors
    ///
    /// Returns `ContainerNotCompleted` if a container is still open, or
    /// `UnexpectedEof` if nothing was emitted.
    pub fn finish(self) -> Result<S, Error> {
        if self.stack.depth() != 0 {
            return Err(Error::new(
                ErrorCode::ContainerNotCompleted,
                self.sink.position(),
            ));
        }
        if !self.root_done {
            return Err(Error::new(ErrorCode::UnexpectedEof, 0));
        }
        Ok(self.sink)
    }

    fn err(&self, code: ErrorCode) -> Error {
        Error::new(code, self.sink.position())
    }

    /// Account for one item emitted at the current nesting level.
    fn count_item(&mut self) -> Result<(), Error> {
        match self.stack.top_mut() {
            Some(frame) => {
                if !frame.indefinite {
                    if frame.remaining == 0 {
                        frame.over = true;
                    } else {
                        frame.remaining -= 1;
                    }
                }
                Ok(())
            }
            None => {
                if self.root_done {
                    return Err(self.err(ErrorCode::GarbageAtEnd));
                }
                self.root_done = true;
                Ok(())
            }
        }
    }

    fn emit_head(&mut self, major: u8, value: u64) -> Result<(), Error> {
        let mut buf = [0u8; 9];
        let n = wire::encode_head(major, value, &mut buf);
        self.sink.write(&buf[..n])
    }

    fn emit_item_head(&mut self, major: u8, value: u64) -> Result<(), Error> {
        self.count_item()?;
        self.emit_head(major, value)
    }

    /// Encode an unsigned integer (major 0), shortest form.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the bytes.
    pub fn uint(&mut self, value: u64) -> Result<(), Error> {
        self.emit_item_head(wire::MAJOR_UINT, value)
    }

    /// Encode a negative integer (major 1) from its offset magnitude:
    /// `negative_uint(n)` encodes the value `-1 - n`, so `negative_uint(0)`
    /// encodes -1. This reaches down to -2^64.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the bytes.
    pub fn negative_uint(&mut self, magnitude: u64) -> Result<(), Error> {
        self.emit_item_head(wire::MAJOR_NINT, magnitude)
    }

    /// Encode a signed integer, selecting major 0 or 1, shortest form.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the bytes.
    pub fn int(&mut self, value: i64) -> Result<(), Error> {
        // RFC 8949 appendix: sign-extend, then complement negatives.
        let sign = (value >> 63) as u64;
        let major = if sign == 0 {
            wire::MAJOR_UINT
        } else {
            wire::MAJOR_NINT
        };
        self.emit_item_head(major, sign ^ value as u64)
    }

    /// Encode a boolean.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the byte.
    pub fn bool(&mut self, value: bool) -> Result<(), Error> {
        self.count_item()?;
        self.sink.write_u8(if value { 0xf5 } else { 0xf4 })
    }

    /// Encode CBOR `null`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the byte.
    pub fn null(&mut self) -> Result<(), Error> {
        self.count_item()?;
        self.sink.write_u8(0xf6)
    }

    /// Encode CBOR `undefined`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the byte.
    pub fn undefined(&mut self) -> Result<(), Error> {
        self.count_item()?;
        self.sink.write_u8(0xf7)
    }

    /// Encode a simple value.
    ///
    /// With `check_user` set (the default), values 24..=31 are rejected:
    /// they collide with the float/break encodings and the two-byte simple
    /// range reserved by RFC 8949.
    ///
    /// # Errors
    ///
    /// Returns `IllegalSimpleType` for a reserved value, or a sink error.
    pub fn simple(&mut self, value: u8) -> Result<(), Error> {
        if self.opts.check_user && (24..=31).contains(&value) {
            return Err(self.err(ErrorCode::IllegalSimpleType));
        }
        self.emit_item_head(wire::MAJOR_SIMPLE, u64::from(value))
    }

    /// Encode a tag (major 6). The caller must emit the tagged item next.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the bytes.
    pub fn tag(&mut self, tag: u64) -> Result<(), Error> {
        // A tag is not an item by itself; the tagged item carries the count.
        self.emit_head(wire::MAJOR_TAG, tag)
    }

    /// Encode a half-precision float from its raw binary16 bits (head 0xf9).
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the bytes.
    pub fn float16(&mut self, bits: u16) -> Result<(), Error> {
        self.count_item()?;
        let mut buf = [0u8; 3];
        buf[0] = 0xf9;
        buf[1..3].copy_from_slice(&bits.to_be_bytes());
        self.sink.write(&buf)
    }

    /// Encode a single-precision float verbatim (head 0xfa).
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the bytes.
    pub fn float32(&mut self, value: f32) -> Result<(), Error> {
        self.count_item()?;
        let mut buf = [0u8; 5];
        buf[0] = 0xfa;
        buf[1..5].copy_from_slice(&value.to_bits().to_be_bytes());
        self.sink.write(&buf)
    }

    /// Encode a double-precision float verbatim (head 0xfb).
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the bytes.
    pub fn float64(&mut self, value: f64) -> Result<(), Error> {
        self.count_item()?;
        let mut buf = [0u8; 9];
        buf[0] = 0xfb;
        buf[1..9].copy_from_slice(&value.to_bits().to_be_bytes());
        self.sink.write(&buf)
    }

    /// Encode an `f32` as a half-precision float, rounding to nearest-even
    /// and losing precision where binary16 cannot represent the value.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the bytes.
    pub fn float32_as_half(&mut self, value: f32) -> Result<(), Error> {
        self.float16(crate::half::encode_half(value))
    }

    /// Encode a definite-length byte string (major 2).
    ///
    /// A full bounded sink fails the call but the payload still counts
    /// toward the shortfall, keeping the deficit report exact.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the bytes.
    pub fn bytes(&mut self, data: &[u8]) -> Result<(), Error> {
        self.count_item()?;
        let head = self.emit_head(wire::MAJOR_BYTES, data.len() as u64);
        let body = self.sink.write(data);
        head.and(body)
    }

    /// Encode a definite-length text string (major 3). `&str` guarantees
    /// valid UTF-8; no additional checking happens here.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the bytes.
    pub fn text(&mut self, text: &str) -> Result<(), Error> {
        self.count_item()?;
        let head = self.emit_head(wire::MAJOR_TEXT, text.len() as u64);
        let body = self.sink.write(text.as_bytes());
        head.and(body)
    }

    /// Encode one chunk of an indefinite-length string.
    fn chunk(&mut self, major: u8, data: &[u8]) -> Result<(), Error> {
        let head = self.emit_head(major, data.len() as u64);
        let body = self.sink.write(data);
        head.and(body)
    }

    /// Encode an indefinite-length byte string from `chunks`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the bytes.
    pub fn bytes_indefinite<'c>(
        &mut self,
        chunks: impl IntoIterator<Item = &'c [u8]>,
    ) -> Result<(), Error> {
        self.count_item()?;
        let mut result = self.sink.write_u8(wire::indefinite_head(wire::MAJOR_BYTES));
        for chunk in chunks {
            result = result.and(self.chunk(wire::MAJOR_BYTES, chunk));
        }
        result.and(self.sink.write_u8(wire::BREAK_BYTE))
    }

    /// Encode an indefinite-length text string from `chunks`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the bytes.
    pub fn text_indefinite<'c>(
        &mut self,
        chunks: impl IntoIterator<Item = &'c str>,
    ) -> Result<(), Error> {
        self.count_item()?;
        let mut result = self.sink.write_u8(wire::indefinite_head(wire::MAJOR_TEXT));
        for chunk in chunks {
            result = result.and(self.chunk(wire::MAJOR_TEXT, chunk.as_bytes()));
        }
        result.and(self.sink.write_u8(wire::BREAK_BYTE))
    }

    fn begin_container(
        &mut self,
        major: u8,
        declared: Option<u64>,
        per_item: u64,
    ) -> Result<(), Error> {
        if self.stack.depth() >= self.opts.max_depth {
            return Err(self.err(ErrorCode::NestingTooDeep));
        }
        self.count_item()?;
        // The frame is pushed even when the head write fails, so a
        // shortfall-counting pass keeps balanced begin/end pairs.
        let (frame, wrote) = match declared {
            Some(len) => {
                let remaining = len
                    .checked_mul(per_item)
                    .ok_or_else(|| self.err(ErrorCode::DataTooLarge))?;
                (
                    Frame {
                        remaining,
                        indefinite: false,
                        over: false,
                    },
                    self.emit_head(major, len),
                )
            }
            None => (
                Frame {
                    remaining: 0,
                    indefinite: true,
                    over: false,
                },
                self.sink.write_u8(wire::indefinite_head(major)),
            ),
        };
        let off = self.sink.position();
        self.stack.push(frame, off).and(wrote)
    }

    /// Open a definite-length array of `len` elements. Pair with
    /// [`Encoder::end`].
    ///
    /// # Errors
    ///
    /// Returns `NestingTooDeep` past the depth cap, or a sink error.
    pub fn begin_array(&mut self, len: u64) -> Result<(), Error> {
        self.begin_container(wire::MAJOR_ARRAY, Some(len), 1)
    }

    /// Open an indefinite-length array. Pair with [`Encoder::end`], which
    /// emits the break stop code.
    ///
    /// # Errors
    ///
    /// Returns `NestingTooDeep` past the depth cap, or a sink error.
    pub fn begin_array_indefinite(&mut self) -> Result<(), Error> {
        self.begin_container(wire::MAJOR_ARRAY, None, 1)
    }

    /// Open a definite-length map of `len` key/value pairs. Pair with
    /// [`Encoder::end`]. Keys and values are emitted alternately and each
    /// counts as one item.
    ///
    /// # Errors
    ///
    /// Returns `NestingTooDeep` past the depth cap, `DataTooLarge` if
    /// `2 * len` overflows, or a sink error.
    pub fn begin_map(&mut self, len: u64) -> Result<(), Error> {
        self.begin_container(wire::MAJOR_MAP, Some(len), 2)
    }

    /// Open an indefinite-length map. Pair with [`Encoder::end`].
    ///
    /// # Errors
    ///
    /// Returns `NestingTooDeep` past the depth cap, or a sink error.
    pub fn begin_map_indefinite(&mut self) -> Result<(), Error> {
        self.begin_container(wire::MAJOR_MAP, None, 2)
    }

    /// Close the innermost open container.
    ///
    /// A definite-length container must have received exactly the declared
    /// number of items unless `lax_close` is set. Closing an
    /// indefinite-length container emits the break stop code.
    ///
    /// # Errors
    ///
    /// Returns `ContainerNotCompleted` on a count mismatch (strict close),
    /// `InternalError` if no container is open, or a sink error.
    pub fn end(&mut self) -> Result<(), Error> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| self.err(ErrorCode::InternalError))?;
        if frame.indefinite {
            return self.sink.write_u8(wire::BREAK_BYTE);
        }
        if !self.opts.lax_close && (frame.remaining != 0 || frame.over) {
            return Err(self.err(ErrorCode::ContainerNotCompleted));
        }
        Ok(())
    }

    /// Encode a definite-length array of `len` elements emitted by `f`.
    ///
    /// # Errors
    ///
    /// Propagates errors from `f` and from [`Encoder::end`].
    pub fn array<F>(&mut self, len: u64, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        self.begin_array(len)?;
        let body = f(self);
        body.and(self.end())
    }

    /// Encode an indefinite-length array of the elements emitted by `f`.
    ///
    /// # Errors
    ///
    /// Propagates errors from `f` and from [`Encoder::end`].
    pub fn array_indefinite<F>(&mut self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        self.begin_array_indefinite()?;
        let body = f(self);
        body.and(self.end())
    }

    /// Encode a definite-length map of `len` pairs emitted by `f`.
    ///
    /// # Errors
    ///
    /// Propagates errors from `f` and from [`Encoder::end`].
    pub fn map<F>(&mut self, len: u64, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        self.begin_map(len)?;
        let body = f(self);
        body.and(self.end())
    }

    /// Encode an indefinite-length map of the pairs emitted by `f`.
    ///
    /// # Errors
    ///
    /// Propagates errors from `f` and from [`Encoder::end`].
    pub fn map_indefinite<F>(&mut self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        self.begin_map_indefinite()?;
        let body = f(self);
        body.and(self.end())
    }
}
