// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

mod scope;

pub use scope::ScopeKind;

use crate::{Error, Result};

/// Closed tag set describing every value a row can hold.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LayoutCode {
	Null,
	Boolean,
	Int8,
	Int16,
	Int32,
	Int64,
	UInt8,
	UInt16,
	UInt32,
	UInt64,
	VarInt,
	VarUInt,
	Float32,
	Float64,
	Float128,
	Decimal,
	DateTime,
	UnixDateTime,
	Guid,
	ObjectId,
	Utf8,
	Binary,
	Scope {
		kind: ScopeKind,
		immutable: bool,
	},
}

impl LayoutCode {
	pub const fn scope(kind: ScopeKind) -> Self {
		LayoutCode::Scope {
			kind,
			immutable: false,
		}
	}

	pub const fn immutable_scope(kind: ScopeKind) -> Self {
		LayoutCode::Scope {
			kind,
			immutable: true,
		}
	}

	pub const fn is_scope(&self) -> bool {
		matches!(self, LayoutCode::Scope { .. })
	}

	pub const fn scope_kind(&self) -> Option<ScopeKind> {
		match self {
			LayoutCode::Scope {
				kind,
				..
			} => Some(*kind),
			_ => None,
		}
	}

	pub const fn is_immutable(&self) -> bool {
		matches!(
			self,
			LayoutCode::Scope {
				immutable: true,
				..
			}
		)
	}

	/// Width in bytes of a fixed-size scalar, `None` for variable-length
	/// scalars and scopes.
	pub const fn fixed_size(&self) -> Option<usize> {
		match self {
			LayoutCode::Null => Some(0),
			LayoutCode::Boolean => Some(1),
			LayoutCode::Int8 => Some(1),
			LayoutCode::Int16 => Some(2),
			LayoutCode::Int32 => Some(4),
			LayoutCode::Int64 => Some(8),
			LayoutCode::UInt8 => Some(1),
			LayoutCode::UInt16 => Some(2),
			LayoutCode::UInt32 => Some(4),
			LayoutCode::UInt64 => Some(8),
			LayoutCode::Float32 => Some(4),
			LayoutCode::Float64 => Some(8),
			LayoutCode::Float128 => Some(16),
			LayoutCode::Decimal => Some(16),
			LayoutCode::DateTime => Some(8),
			LayoutCode::UnixDateTime => Some(8),
			LayoutCode::Guid => Some(16),
			LayoutCode::ObjectId => Some(12),
			LayoutCode::VarInt
			| LayoutCode::VarUInt
			| LayoutCode::Utf8
			| LayoutCode::Binary
			| LayoutCode::Scope {
				..
			} => None,
		}
	}

	/// Natural alignment of a fixed-size scalar inside a fixed region.
	pub const fn alignment(&self) -> usize {
		match self.fixed_size() {
			Some(0) | None => 1,
			Some(12) => 4,
			Some(size) if size >= 8 => 8,
			Some(size) => size,
		}
	}

	pub const fn is_fixed(&self) -> bool {
		self.fixed_size().is_some()
	}

	/// Scalars that may live in a variable column.
	pub const fn is_variable(&self) -> bool {
		matches!(self, LayoutCode::VarInt | LayoutCode::VarUInt | LayoutCode::Utf8 | LayoutCode::Binary)
	}

	pub const fn to_u8(&self) -> u8 {
		match self {
			LayoutCode::Null => 0x01,
			LayoutCode::Boolean => 0x03,
			LayoutCode::Int8 => 0x05,
			LayoutCode::Int16 => 0x06,
			LayoutCode::Int32 => 0x07,
			LayoutCode::Int64 => 0x08,
			LayoutCode::UInt8 => 0x09,
			LayoutCode::UInt16 => 0x0A,
			LayoutCode::UInt32 => 0x0B,
			LayoutCode::UInt64 => 0x0C,
			LayoutCode::VarInt => 0x0D,
			LayoutCode::VarUInt => 0x0E,
			LayoutCode::Float32 => 0x0F,
			LayoutCode::Float64 => 0x10,
			LayoutCode::Decimal => 0x11,
			LayoutCode::DateTime => 0x12,
			LayoutCode::Guid => 0x13,
			LayoutCode::Utf8 => 0x14,
			LayoutCode::Binary => 0x15,
			LayoutCode::Float128 => 0x16,
			LayoutCode::UnixDateTime => 0x17,
			LayoutCode::ObjectId => 0x18,
			LayoutCode::Scope {
				kind,
				immutable,
			} => kind.base_code() + *immutable as u8,
		}
	}

	pub fn from_u8(value: u8) -> Result<Self> {
		let code = match value {
			0x01 => LayoutCode::Null,
			0x03 => LayoutCode::Boolean,
			0x05 => LayoutCode::Int8,
			0x06 => LayoutCode::Int16,
			0x07 => LayoutCode::Int32,
			0x08 => LayoutCode::Int64,
			0x09 => LayoutCode::UInt8,
			0x0A => LayoutCode::UInt16,
			0x0B => LayoutCode::UInt32,
			0x0C => LayoutCode::UInt64,
			0x0D => LayoutCode::VarInt,
			0x0E => LayoutCode::VarUInt,
			0x0F => LayoutCode::Float32,
			0x10 => LayoutCode::Float64,
			0x11 => LayoutCode::Decimal,
			0x12 => LayoutCode::DateTime,
			0x13 => LayoutCode::Guid,
			0x14 => LayoutCode::Utf8,
			0x15 => LayoutCode::Binary,
			0x16 => LayoutCode::Float128,
			0x17 => LayoutCode::UnixDateTime,
			0x18 => LayoutCode::ObjectId,
			other => {
				let kind = ScopeKind::from_base_code(other & !1)
					.ok_or(Error::UnrecognizedTypeCode(other))?;
				LayoutCode::Scope {
					kind,
					immutable: other & 1 == 1,
				}
			}
		};
		Ok(code)
	}

	pub const fn name(&self) -> &'static str {
		match self {
			LayoutCode::Null => "Null",
			LayoutCode::Boolean => "Boolean",
			LayoutCode::Int8 => "Int8",
			LayoutCode::Int16 => "Int16",
			LayoutCode::Int32 => "Int32",
			LayoutCode::Int64 => "Int64",
			LayoutCode::UInt8 => "UInt8",
			LayoutCode::UInt16 => "UInt16",
			LayoutCode::UInt32 => "UInt32",
			LayoutCode::UInt64 => "UInt64",
			LayoutCode::VarInt => "VarInt",
			LayoutCode::VarUInt => "VarUInt",
			LayoutCode::Float32 => "Float32",
			LayoutCode::Float64 => "Float64",
			LayoutCode::Float128 => "Float128",
			LayoutCode::Decimal => "Decimal",
			LayoutCode::DateTime => "DateTime",
			LayoutCode::UnixDateTime => "UnixDateTime",
			LayoutCode::Guid => "Guid",
			LayoutCode::ObjectId => "ObjectId",
			LayoutCode::Utf8 => "Utf8",
			LayoutCode::Binary => "Binary",
			LayoutCode::Scope {
				kind,
				..
			} => kind.name(),
		}
	}
}

impl Display for LayoutCode {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		if self.is_immutable() {
			f.write_str("Immutable")?;
		}
		f.write_str(self.name())
	}
}
