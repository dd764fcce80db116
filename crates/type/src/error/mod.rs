// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use crate::{LayoutCode, SchemaId};

pub type Result<T> = std::result::Result<T, Error>;

/// Whether an error describes bad data or a broken invariant in the codec
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
	/// The bytes, schema or request were invalid; the caller may retry with
	/// different input.
	Data,
	/// The dispatcher met a code outside the tag set. Not recoverable.
	Fatal,
}

impl Display for ErrorClass {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			ErrorClass::Data => f.write_str("data"),
			ErrorClass::Fatal => f.write_str("fatal"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("offset {offset} with length {length} is out of range for buffer of length {buffer_len}")]
	OutOfRange {
		offset: usize,
		length: usize,
		buffer_len: usize,
	},

	#[error("schema {0} is not registered")]
	SchemaNotFound(SchemaId),

	#[error("schema {0} is already registered with a different layout")]
	SchemaConflict(SchemaId),

	#[error("type mismatch: expected {expected}, found {actual}")]
	TypeMismatch {
		expected: LayoutCode,
		actual: LayoutCode,
	},

	#[error("'{path}' is not present")]
	NotFound {
		path: String,
	},

	#[error("'{path}' is already present")]
	Exists {
		path: String,
	},

	#[error("unrecognized layout code {0:#04x}")]
	UnrecognizedTypeCode(u8),

	#[error("malformed row: {reason}")]
	Malformed {
		reason: String,
	},

	#[error("'{path}' lies in an immutable scope")]
	InsufficientPermissions {
		path: String,
	},

	#[error("column '{name}' is not declared by the layout")]
	ColumnNotFound {
		name: String,
	},

	#[error("update mode {mode} is not supported in a {scope} scope")]
	UnsupportedMode {
		mode: String,
		scope: String,
	},

	#[error("scope expects {expected} items, found {actual}")]
	ArityMismatch {
		expected: usize,
		actual: usize,
	},

	#[error("invalid layout: {reason}")]
	InvalidLayout {
		reason: String,
	},

	#[error("scope nesting exceeds the maximum depth of {depth}")]
	ScopeDepthExceeded {
		depth: usize,
	},

	#[error("invalid cursor state: {reason}")]
	InvalidState {
		reason: String,
	},

	#[error("resizer returned {returned} bytes, at least {requested} were requested")]
	ResizeFailed {
		requested: usize,
		returned: usize,
	},
}

impl Error {
	pub fn class(&self) -> ErrorClass {
		match self {
			Error::UnrecognizedTypeCode(_) => ErrorClass::Fatal,
			_ => ErrorClass::Data,
		}
	}

	pub fn is_fatal(&self) -> bool {
		self.class() == ErrorClass::Fatal
	}

	pub fn malformed(reason: impl Into<String>) -> Self {
		Error::Malformed {
			reason: reason.into(),
		}
	}

	pub fn invalid_state(reason: impl Into<String>) -> Self {
		Error::InvalidState {
			reason: reason.into(),
		}
	}

	pub fn invalid_layout(reason: impl Into<String>) -> Self {
		Error::InvalidLayout {
			reason: reason.into(),
		}
	}

	pub fn not_found(path: impl Into<String>) -> Self {
		Error::NotFound {
			path: path.into(),
		}
	}

	pub fn exists(path: impl Into<String>) -> Self {
		Error::Exists {
			path: path.into(),
		}
	}
}
