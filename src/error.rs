use core::fmt;

/// A structured error code identifying the reason a CBOR operation failed.
///
/// This enum is intentionally stable and string-free to support `no_std` and to remain hot-path friendly.
/// Use [`ErrorCode::message`] for the stable human-readable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Unexpected end-of-input while decoding.
    UnexpectedEof,
    /// End-of-input reached inside an indefinite-length container or string before its break.
    BreakMissingAtEof,
    /// A break stop code (0xff) appeared outside an indefinite-length context.
    UnexpectedBreak,
    /// Major type 7 with reserved additional information (28..=30).
    UnknownType,
    /// Item type not allowed here (e.g. mixed chunk types in an indefinite string).
    IllegalType,
    /// Reserved additional-info value (28..=30) in a length/value head.
    IllegalNumber,
    /// Simple value below 32 encoded in two bytes, or a reserved simple value at encode time.
    IllegalSimpleType,

    /// Simple value outside the set accepted by strict validation.
    UnknownSimpleType,
    /// Tag number not recognized by strict validation.
    UnknownTag,
    /// Tag decorates an item of an incompatible type.
    InappropriateTagForType,
    /// Duplicate map key detected.
    DuplicateObjectKeys,
    /// Invalid UTF-8 in a text string chunk.
    InvalidUtf8TextString,
    /// Non-shortest integer/length encoding, or a simple value not encoded inline.
    NonCanonicalEncoding,
    /// Indefinite-length encoding was used where canonical form is required.
    IndefiniteLengthForbidden,

    /// Length or offset arithmetic overflowed the platform word size.
    DataTooLarge,
    /// Nesting depth limit exceeded.
    NestingTooDeep,
    /// The output sink is full, or an allocation failed.
    OutOfMemory,
    /// A source or sink callback reported an I/O failure.
    Io,

    /// Advance was called on an exhausted cursor.
    AdvancePastEof,
    /// A container was closed with a different number of items than declared.
    ContainerNotCompleted,

    /// Input contains trailing bytes after the top-level item.
    GarbageAtEnd,
    /// Internal invariant violation (e.g. leaving a container whose cursor is not at its end).
    InternalError,
}

impl ErrorCode {
    /// Returns a stable, human-readable English message for this code.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::UnexpectedEof => "unexpected end of data",
            Self::BreakMissingAtEof => "unexpected end of data, break byte missing",
            Self::UnexpectedBreak => "unexpected break stop code",
            Self::UnknownType => "unknown type (major 7, reserved additional information)",
            Self::IllegalType => "illegal type for this operation",
            Self::IllegalNumber => "illegal number encoding (reserved additional information)",
            Self::IllegalSimpleType => "illegal simple type encoding",

            Self::UnknownSimpleType => "unknown simple type",
            Self::UnknownTag => "unknown tag",
            Self::InappropriateTagForType => "inappropriate tag for the tagged type",
            Self::DuplicateObjectKeys => "duplicate keys in map",
            Self::InvalidUtf8TextString => "text string is not valid UTF-8",
            Self::NonCanonicalEncoding => "non-canonical (non-shortest) encoding",
            Self::IndefiniteLengthForbidden => "indefinite length forbidden in canonical form",

            Self::DataTooLarge => "data is larger than the platform can represent",
            Self::NestingTooDeep => "nesting depth limit exceeded",
            Self::OutOfMemory => "out of memory or sink buffer full",
            Self::Io => "input/output error",

            Self::AdvancePastEof => "advance past the end of the stream",
            Self::ContainerNotCompleted => "container not completed before close",

            Self::GarbageAtEnd => "garbage after the end of the top-level item",
            Self::InternalError => "internal error",
        }
    }
}

/// A CBOR error with a structured code and the byte offset where it was detected.
///
/// Offsets refer to the byte position in the input (parser/validator) or the
/// number of bytes emitted so far (encoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
    /// The error code.
    pub code: ErrorCode,
    /// Byte offset at which the error was detected.
    pub offset: usize,
}

impl Error {
    /// Construct an error at `offset`.
    #[inline]
    #[must_use]
    pub const fn new(code: ErrorCode, offset: usize) -> Self {
        Self { code, offset }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cbor error at {}: {}", self.offset, self.code.message())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
