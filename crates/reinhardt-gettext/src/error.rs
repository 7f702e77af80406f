//! Error types for catalog loading.
//!
//! Only binary catalogs can fail to parse. Textual catalogs and `Plural-Forms`
//! headers degrade to best-effort defaults instead of raising errors.

use thiserror::Error;

/// Result type for catalog loading operations.
pub type GettextResult<T> = Result<T, GettextError>;

/// Structural problems in a binary `.mo` buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FormatError {
	/// The first four bytes match neither the little- nor big-endian magic.
	#[error("invalid MO file: bad magic number {0:#010x}")]
	BadMagic(u32),

	/// Only revision 0 of the format is understood.
	#[error("unsupported MO file version: {0}")]
	UnsupportedVersion(u32),

	/// The buffer ends before the fixed-size header does.
	#[error("invalid MO file: truncated header ({actual} bytes, need {needed})")]
	Truncated {
		/// Bytes required.
		needed: usize,
		/// Bytes available.
		actual: usize,
	},

	/// A table entry or string span points outside the buffer.
	#[error(
		"invalid MO file: {what} at offset {offset} (length {length}) exceeds buffer of {size} bytes"
	)]
	OutOfBounds {
		/// Which structure was being read.
		what: &'static str,
		/// Absolute start offset.
		offset: usize,
		/// Length of the span.
		length: usize,
		/// Total buffer size.
		size: usize,
	},
}

/// Errors returned by the loading operations of [`Gettext`](crate::Gettext).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GettextError {
	/// The binary catalog is malformed.
	#[error(transparent)]
	Format(#[from] FormatError),

	/// The host-supplied reader failed.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// A textual catalog was supplied as bytes that are not UTF-8.
	#[error("PO catalog is not valid UTF-8: {0}")]
	InvalidUtf8(#[from] std::str::Utf8Error),
}
