//! Append-only output for the encoder.
//!
//! [`Sink`] is the single write capability the encoder needs. The inlined
//! common case is [`SliceSink`], a bounded buffer that keeps accepting
//! (and counting) bytes after it fills up so the caller learns the exact
//! shortfall from one encoding pass. [`VecSink`] grows with fallible
//! reservation; [`WriterSink`] streams into any [`std::io::Write`].

use crate::{Error, ErrorCode};

#[cfg(feature = "alloc")]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::io;

/// Append-only byte output.
pub trait Sink {
    /// Append `bytes` to the output.
    ///
    /// # Errors
    ///
    /// Returns `OutOfMemory` if the sink is full or cannot grow, or `Io` if
    /// the underlying writer fails.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error>;

    /// Append a single byte.
    ///
    /// # Errors
    ///
    /// Same as [`Sink::write`].
    fn write_u8(&mut self, byte: u8) -> Result<(), Error> {
        self.write(&[byte])
    }

    /// Number of bytes submitted so far, including bytes an overflowed
    /// bounded sink could not store.
    fn position(&self) -> usize;
}

/// A bounded-buffer [`Sink`] with overflow accounting.
///
/// Once a write no longer fits, the sink latches into overflow mode: the
/// buffer contents stop changing, every subsequent write still counts
/// toward [`SliceSink::extra_bytes_needed`], and each write returns
/// `OutOfMemory`. Driving the encoder to completion anyway yields the exact
/// additional capacity a second pass would need.
#[derive(Debug)]
pub struct SliceSink<'a> {
    buf: &'a mut [u8],
    written: usize,
    required: usize,
}

impl<'a> SliceSink<'a> {
    /// Bind to an output buffer.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            written: 0,
            required: 0,
        }
    }

    /// The initialized prefix of the buffer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.written]
    }

    /// Number of bytes stored in the buffer.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.written
    }

    /// Returns `true` if nothing has been stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Returns `true` once a write has failed to fit.
    #[must_use]
    pub fn overflowed(&self) -> bool {
        self.required > self.written
    }

    /// How many additional bytes of capacity the writes submitted so far
    /// would have needed. Zero if everything fit.
    #[must_use]
    pub fn extra_bytes_needed(&self) -> usize {
        self.required.saturating_sub(self.buf.len())
    }
}

impl Sink for SliceSink<'_> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let required = self
            .required
            .checked_add(bytes.len())
            .ok_or_else(|| Error::new(ErrorCode::DataTooLarge, self.required))?;
        let fits = !self.overflowed() && required <= self.buf.len();
        if fits {
            self.buf[self.written..required].copy_from_slice(bytes);
            self.written = required;
            self.required = required;
            Ok(())
        } else {
            self.required = required;
            Err(Error::new(ErrorCode::OutOfMemory, self.written))
        }
    }

    fn position(&self) -> usize {
        self.required
    }
}

/// A growable [`Sink`] over a `Vec<u8>` with fallible reservation.
#[cfg(feature = "alloc")]
#[derive(Debug, Default)]
pub struct VecSink {
    buf: Vec<u8>,
}

#[cfg(feature = "alloc")]
impl VecSink {
    /// Create an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Create a sink with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buf = Vec::new();
        let _ = buf.try_reserve(capacity);
        Self { buf }
    }

    /// Borrow the bytes emitted so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume and return the encoded bytes.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(feature = "alloc")]
impl Sink for VecSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let offset = self.buf.len();
        if bytes.len() > self.buf.capacity() - self.buf.len() {
            self.buf
                .try_reserve(bytes.len())
                .map_err(|_| Error::new(ErrorCode::OutOfMemory, offset))?;
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn write_u8(&mut self, byte: u8) -> Result<(), Error> {
        if self.buf.len() == self.buf.capacity() {
            let offset = self.buf.len();
            self.buf
                .try_reserve(1)
                .map_err(|_| Error::new(ErrorCode::OutOfMemory, offset))?;
        }
        self.buf.push(byte);
        Ok(())
    }

    fn position(&self) -> usize {
        self.buf.len()
    }
}

/// A streaming [`Sink`] over any [`io::Write`].
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
    position: usize,
}

#[cfg(feature = "std")]
impl<W: io::Write> WriterSink<W> {
    /// Wrap a writer.
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            position: 0,
        }
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(feature = "std")]
impl<W: io::Write> Sink for WriterSink<W> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.writer
            .write_all(bytes)
            .map_err(|_| Error::new(ErrorCode::Io, self.position))?;
        self.position += bytes.len();
        Ok(())
    }

    fn position(&self) -> usize {
        self.position
    }
}
