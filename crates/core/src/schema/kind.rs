// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use hybridrow_type::LayoutCode;
use serde::{Deserialize, Serialize};

/// The type named by a property declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
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
	Object,
	Array,
	Set,
	Map,
	Tuple,
	Tagged,
	Nullable,
	Schema,
}

impl PropertyKind {
	/// Layout code of a scalar kind, `None` for structured kinds.
	pub fn scalar_code(&self) -> Option<LayoutCode> {
		let code = match self {
			PropertyKind::Null => LayoutCode::Null,
			PropertyKind::Boolean => LayoutCode::Boolean,
			PropertyKind::Int8 => LayoutCode::Int8,
			PropertyKind::Int16 => LayoutCode::Int16,
			PropertyKind::Int32 => LayoutCode::Int32,
			PropertyKind::Int64 => LayoutCode::Int64,
			PropertyKind::UInt8 => LayoutCode::UInt8,
			PropertyKind::UInt16 => LayoutCode::UInt16,
			PropertyKind::UInt32 => LayoutCode::UInt32,
			PropertyKind::UInt64 => LayoutCode::UInt64,
			PropertyKind::VarInt => LayoutCode::VarInt,
			PropertyKind::VarUInt => LayoutCode::VarUInt,
			PropertyKind::Float32 => LayoutCode::Float32,
			PropertyKind::Float64 => LayoutCode::Float64,
			PropertyKind::Float128 => LayoutCode::Float128,
			PropertyKind::Decimal => LayoutCode::Decimal,
			PropertyKind::DateTime => LayoutCode::DateTime,
			PropertyKind::UnixDateTime => LayoutCode::UnixDateTime,
			PropertyKind::Guid => LayoutCode::Guid,
			PropertyKind::ObjectId => LayoutCode::ObjectId,
			PropertyKind::Utf8 => LayoutCode::Utf8,
			PropertyKind::Binary => LayoutCode::Binary,
			PropertyKind::Object
			| PropertyKind::Array
			| PropertyKind::Set
			| PropertyKind::Map
			| PropertyKind::Tuple
			| PropertyKind::Tagged
			| PropertyKind::Nullable
			| PropertyKind::Schema => return None,
		};
		Some(code)
	}
}

/// Where a top-level property is stored within its row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
	Fixed,
	Variable,
	#[default]
	Sparse,
}
