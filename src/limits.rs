//! Configuration for the parser, encoder, and validator.
//!
//! Options are plain structs with public fields; the constructors give the
//! defaults and callers adjust fields directly.

/// Default maximum nesting depth for parsing, encoding, and validation.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Parser strictness and resource options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum container nesting depth for recursive advance.
    pub max_depth: usize,
    /// Reject two-byte simple values below 32 during pre-parse.
    ///
    /// RFC 8949 declares these not well-formed; disabling this accepts them
    /// anyway and reports the value.
    pub strict_simple: bool,
}

impl ParseOptions {
    /// The default options: strict pre-parse, depth capped at
    /// [`DEFAULT_MAX_DEPTH`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_simple: true,
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Encoder options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Reject reserved simple values (24..=31) at encode time.
    pub check_user: bool,
    /// Permit closing a definite-length container whose emitted item count
    /// does not match the declared length.
    pub lax_close: bool,
    /// Maximum container nesting depth.
    pub max_depth: usize,
}

impl EncodeOptions {
    /// The default options: user checks on, strict close, depth capped at
    /// [`DEFAULT_MAX_DEPTH`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            check_user: true,
            lax_close: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator strictness flags.
///
/// [`ValidateOptions::basic`] checks well-formedness only; the other presets
/// layer semantic rules on top. Every flag can also be toggled directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Require shortest-form heads, inline simple values, and definite
    /// lengths everywhere.
    pub require_canonical: bool,
    /// Require every text string chunk to be well-formed UTF-8.
    pub check_utf8: bool,
    /// Require known tags to decorate an item of the appropriate type.
    pub check_tags: bool,
    /// Reject tags this validator does not know.
    pub reject_unknown_tags: bool,
    /// Reject simple values other than false, true, null, and undefined.
    pub reject_unknown_simple: bool,
    /// Require every map to have pairwise-distinct keys (by encoded bytes).
    pub check_unique_keys: bool,
    /// Require the source to be exhausted after the top-level item.
    pub require_complete: bool,
    /// Maximum container nesting depth.
    pub max_depth: usize,
}

impl ValidateOptions {
    /// Well-formedness only: structure, reserved values, and depth.
    #[must_use]
    pub const fn basic() -> Self {
        Self {
            require_canonical: false,
            check_utf8: false,
            check_tags: false,
            reject_unknown_tags: false,
            reject_unknown_simple: false,
            check_unique_keys: false,
            require_complete: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Strict mode: UTF-8, tag appropriateness, unique keys, no trailing
    /// garbage.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            check_utf8: true,
            check_tags: true,
            check_unique_keys: true,
            require_complete: true,
            ..Self::basic()
        }
    }

    /// Canonical mode: strict mode plus shortest-form encoding and definite
    /// lengths.
    #[must_use]
    pub const fn canonical() -> Self {
        Self {
            require_canonical: true,
            ..Self::strict()
        }
    }
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self::basic()
    }
}
