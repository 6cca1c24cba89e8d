//! Byte-addressable input for the parser.
//!
//! The parser consumes bytes through the [`Source`] trait: a bounds probe, a
//! positioned copy that does not advance, and a borrow of a contiguous
//! region for zero-copy string access. Positions are plain byte offsets from
//! the start of the stream; the cursor, not the source, owns the position.
//!
//! [`SliceSource`] is the inlined common case over a contiguous buffer.
//! [`WindowSource`] pulls from any [`std::io::Read`] through a bounded
//! reload window; borrowing a region larger than the window fails with
//! [`ErrorCode::Io`], as does revisiting bytes the window has discarded.

use crate::{Error, ErrorCode};

#[cfg(feature = "std")]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::io;

/// Pull-based byte input addressed by absolute stream offset.
pub trait Source {
    /// Returns whether `len` bytes starting at `pos` are available.
    fn available(&mut self, pos: usize, len: usize) -> bool;

    /// Copy `dst.len()` bytes starting at `pos` into `dst` without advancing.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` if the range is out of bounds, or `Io` if the
    /// underlying reader fails or cannot revisit `pos`.
    fn read_at(&mut self, pos: usize, dst: &mut [u8]) -> Result<(), Error>;

    /// Borrow `len` contiguous bytes starting at `pos`.
    ///
    /// A pull-based source pages the region into its reload window first.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` if the range is out of bounds, or `Io` if the
    /// region cannot be made contiguous.
    fn take_bytes(&mut self, pos: usize, len: usize) -> Result<&[u8], Error>;
}

/// A [`Source`] over a contiguous in-memory buffer. All operations are O(1).
#[derive(Debug, Clone, Copy)]
pub struct SliceSource<'a> {
    data: &'a [u8],
}

impl<'a> SliceSource<'a> {
    /// Wrap a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// The wrapped bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    fn range(&self, pos: usize, len: usize) -> Result<(usize, usize), Error> {
        let end = pos
            .checked_add(len)
            .ok_or_else(|| Error::new(ErrorCode::DataTooLarge, pos))?;
        if end > self.data.len() {
            return Err(Error::new(ErrorCode::UnexpectedEof, pos));
        }
        Ok((pos, end))
    }
}

impl Source for SliceSource<'_> {
    #[inline]
    fn available(&mut self, pos: usize, len: usize) -> bool {
        pos.checked_add(len)
            .is_some_and(|end| end <= self.data.len())
    }

    #[inline]
    fn read_at(&mut self, pos: usize, dst: &mut [u8]) -> Result<(), Error> {
        let (start, end) = self.range(pos, dst.len())?;
        dst.copy_from_slice(&self.data[start..end]);
        Ok(())
    }

    #[inline]
    fn take_bytes(&mut self, pos: usize, len: usize) -> Result<&[u8], Error> {
        let (start, end) = self.range(pos, len)?;
        Ok(&self.data[start..end])
    }
}

/// A [`Source`] pulling from an [`io::Read`] through a bounded reload window.
///
/// Bytes are read forward on demand and kept in an internal window of at
/// most `max_window` bytes. The window only slides forward under pressure:
/// when satisfying a new request would exceed the budget, bytes below the
/// requested offset are discarded, oldest first.
///
/// Forward parsing works as long as no single region (an item head, or one
/// string chunk for zero-copy access) exceeds the window; requests that do,
/// and requests that revisit discarded offsets (e.g. validator key
/// comparison far behind the read point), fail with [`ErrorCode::Io`].
#[cfg(feature = "std")]
pub struct WindowSource<R> {
    reader: R,
    window: Vec<u8>,
    window_start: usize,
    max_window: usize,
    eof: bool,
}

#[cfg(feature = "std")]
impl<R: io::Read> WindowSource<R> {
    /// Wrap a reader with an unbounded reload window.
    pub fn new(reader: R) -> Self {
        Self::with_max_window(reader, usize::MAX)
    }

    /// Wrap a reader, bounding the reload window to `max_window` bytes.
    pub fn with_max_window(reader: R, max_window: usize) -> Self {
        Self {
            reader,
            window: Vec::new(),
            window_start: 0,
            max_window,
            eof: false,
        }
    }

    /// Make `pos..pos + len` resident in the window.
    fn ensure(&mut self, pos: usize, len: usize) -> Result<(), Error> {
        if pos < self.window_start {
            return Err(Error::new(ErrorCode::Io, pos));
        }
        let end = pos
            .checked_add(len)
            .ok_or_else(|| Error::new(ErrorCode::DataTooLarge, pos))?;

        // Discard leading bytes only when the budget demands it, and never
        // past `pos` itself.
        if end - self.window_start > self.max_window {
            let need = end - self.window_start - self.max_window;
            if need > pos - self.window_start {
                return Err(Error::new(ErrorCode::Io, pos));
            }
            let drop = need.min(self.window.len());
            self.window.drain(..drop);
            self.window_start += drop;
            if end - self.window_start > self.max_window {
                return Err(Error::new(ErrorCode::Io, pos));
            }
        }

        while self.window_start + self.window.len() < end {
            if self.eof {
                return Err(Error::new(ErrorCode::UnexpectedEof, pos));
            }
            let mut chunk = [0u8; 4096];
            let want = (end - self.window_start - self.window.len()).min(chunk.len());
            match self.reader.read(&mut chunk[..want]) {
                Ok(0) => self.eof = true,
                Ok(n) => self.window.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(_) => return Err(Error::new(ErrorCode::Io, pos)),
            }
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
impl<R: io::Read> Source for WindowSource<R> {
    fn available(&mut self, pos: usize, len: usize) -> bool {
        self.ensure(pos, len).is_ok()
    }

    fn read_at(&mut self, pos: usize, dst: &mut [u8]) -> Result<(), Error> {
        self.ensure(pos, dst.len())?;
        let off = pos - self.window_start;
        dst.copy_from_slice(&self.window[off..off + dst.len()]);
        Ok(())
    }

    fn take_bytes(&mut self, pos: usize, len: usize) -> Result<&[u8], Error> {
        self.ensure(pos, len)?;
        let off = pos - self.window_start;
        Ok(&self.window[off..off + len])
    }
}
