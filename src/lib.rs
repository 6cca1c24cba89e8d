//! # cborstream
//!
//! A compact, streaming codec for Concise Binary Object Representation
//! (CBOR, RFC 8949): a forward-only [`Encoder`] over pluggable [`Sink`]s, a
//! forward-only [`Parser`] with copyable [`Cursor`]s over pluggable
//! [`Source`]s, and a single-pass [`validate`] with configurable
//! strictness.
//!
//! ## Design principles
//!
//! - **Constant per-item state.**
//!   The parser pre-parses one head at a time; cursors are small `Copy`
//!   values and recursion is caller-driven through
//!   [`Parser::enter_container`] / [`Parser::leave_container`].
//! - **Zero-copy strings where the source allows.**
//!   [`Parser::string_bytes`] borrows definite-length payloads straight
//!   from the source; chunked strings stream through a restartable chunk
//!   walk.
//! - **Drivable out-of-space encoding.**
//!   A bounded [`SliceSink`] that overflows keeps accepting items and
//!   reports the exact extra capacity one retry would need.
//!
//! ## Feature flags
//!
//! - `std` *(default)*: `std::error::Error` for [`Error`], the
//!   [`WindowSource`] pull reader and [`WriterSink`].
//! - `alloc` *(default)*: owned string extraction and the growable
//!   [`VecSink`].
//! - `simdutf8`: accelerated UTF-8 validation for text payloads.
//!
//! ## Safety
//!
//! This crate forbids `unsafe` code.
//!
//! ## `no_std`
//!
//! The crate is `no_std` compatible; parsing, encoding into bounded
//! buffers, and validation work without an allocator.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod encode;
mod error;
mod limits;
mod parse;
mod sink;
mod source;
mod validate;
mod wire;

pub mod diag;
pub mod half;
pub mod utf8;

pub use crate::encode::Encoder;
pub use crate::error::{Error, ErrorCode};
pub use crate::limits::{EncodeOptions, ParseOptions, ValidateOptions, DEFAULT_MAX_DEPTH};
pub use crate::parse::{Chunk, Cursor, ItemKind, Parser, StringChunks};
pub use crate::sink::{Sink, SliceSink};
pub use crate::source::{SliceSource, Source};
pub use crate::validate::{validate, validate_cursor};

#[cfg(feature = "alloc")]
pub use crate::sink::VecSink;

#[cfg(feature = "std")]
pub use crate::sink::WriterSink;
#[cfg(feature = "std")]
pub use crate::source::WindowSource;
