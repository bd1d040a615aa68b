//! Binary container formats for the Smelt shader pipeline.
//!
//! Two container kinds exist on disk:
//!
//! - a **fragment library** ([`FragmentLibrary`]) holding the vertex and
//!   pixel fragment tables the selectors index into, and
//! - a **shader library** ([`ShaderLibrary`]) holding pre-compiled standard
//!   shaders and the selector-driven shader builders.
//!
//! # Wire rules
//!
//! - All integers are little-endian.
//! - All strings are int32 byte-count-prefixed ASCII, never null-terminated.
//! - All collections are int32 count-prefixed with no separators.
//! - The container `version` governs field layout; selectors written at
//!   version ≤ 6 carry extra padding fields (see [`ShaderFragmentSelector`]).
//!
//! Decoding is strict: a declared count or length that would read past the
//! end of input is a [`FormatError`], never a panic or a silent truncation,
//! and aborts that container only.

mod compiled;
mod fragment;
mod io;
mod library;
mod selector;
mod uniform;

pub use compiled::{CompiledShader, SIGNATURE_SLOTS, signature_string};
pub use fragment::{FRAGMENT_HAS_NAME, FragmentStage, ShaderFragment};
pub use library::{FragmentLibrary, SelectorEntry, ShaderBuilder, ShaderLibrary, StandardShader};
pub use selector::{CheckKind, ShaderFragmentSelector};
pub use uniform::UniformDescriptor;

use thiserror::Error;

/// Oldest container version the codec accepts.
pub const MIN_VERSION: u32 = 1;

/// Version new containers are written at.
pub const CURRENT_VERSION: u32 = 7;

/// Last version whose selectors carry the padding fields.
pub const LAST_PADDED_SELECTOR_VERSION: u32 = 6;

/// Decode failure. Recoverable: the caller abandons this container and
/// carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Input ended before a declared field.
    #[error("unexpected end of input at offset {offset} ({needed} more bytes needed)")]
    UnexpectedEof { offset: usize, needed: usize },

    /// Container version outside the supported range.
    #[error("unsupported container version {0}")]
    BadVersion(u32),

    /// A declared count cannot fit in the remaining input.
    #[error("{what} count {count} exceeds remaining input")]
    BadCount { what: &'static str, count: u32 },

    /// Selector check kind outside the closed predicate set.
    #[error("unknown selector check kind {0}")]
    UnknownCheckKind(u8),

    /// String field holds non-ASCII bytes.
    #[error("string field at offset {offset} is not ASCII")]
    NonAsciiString { offset: usize },
}
