// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Structural kind of a nested scope. Mutability is carried separately on
/// [`LayoutCode::Scope`](crate::LayoutCode::Scope).
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScopeKind {
	/// Sparse fields addressed by path, any type.
	Object,
	/// Heterogeneous list, every item carries its own code.
	Array,
	/// Homogeneous list of one declared element type.
	TypedArray,
	/// Heterogeneous collection of unique items.
	Set,
	/// Homogeneous collection of unique items.
	TypedSet,
	/// Entries of coded key and value.
	Map,
	/// Entries of declared key and value types.
	TypedMap,
	/// Ordered coded elements, optionally checked against declared types.
	Tuple,
	/// Ordered elements of exactly the declared types.
	TypedTuple,
	/// A `UInt8` tag followed by one value.
	Tagged,
	/// A `UInt8` tag followed by two values.
	Tagged2,
	/// Zero or one value of the declared type.
	Nullable,
	/// A nested row of another registered schema.
	Schema,
}

impl ScopeKind {
	pub const ALL: [ScopeKind; 13] = [
		ScopeKind::Object,
		ScopeKind::Array,
		ScopeKind::TypedArray,
		ScopeKind::Set,
		ScopeKind::TypedSet,
		ScopeKind::Map,
		ScopeKind::TypedMap,
		ScopeKind::Tuple,
		ScopeKind::TypedTuple,
		ScopeKind::Tagged,
		ScopeKind::Tagged2,
		ScopeKind::Nullable,
		ScopeKind::Schema,
	];

	/// Wire byte of the mutable variant; the immutable one is `base + 1`.
	pub const fn base_code(&self) -> u8 {
		match self {
			ScopeKind::Object => 30,
			ScopeKind::Array => 32,
			ScopeKind::TypedArray => 34,
			ScopeKind::Tuple => 36,
			ScopeKind::TypedTuple => 38,
			ScopeKind::Map => 40,
			ScopeKind::TypedMap => 42,
			ScopeKind::Set => 44,
			ScopeKind::TypedSet => 46,
			ScopeKind::Nullable => 48,
			ScopeKind::Tagged => 50,
			ScopeKind::Tagged2 => 52,
			ScopeKind::Schema => 68,
		}
	}

	pub const fn from_base_code(code: u8) -> Option<Self> {
		match code {
			30 => Some(ScopeKind::Object),
			32 => Some(ScopeKind::Array),
			34 => Some(ScopeKind::TypedArray),
			36 => Some(ScopeKind::Tuple),
			38 => Some(ScopeKind::TypedTuple),
			40 => Some(ScopeKind::Map),
			42 => Some(ScopeKind::TypedMap),
			44 => Some(ScopeKind::Set),
			46 => Some(ScopeKind::TypedSet),
			48 => Some(ScopeKind::Nullable),
			50 => Some(ScopeKind::Tagged),
			52 => Some(ScopeKind::Tagged2),
			68 => Some(ScopeKind::Schema),
			_ => None,
		}
	}

	/// Items are addressed by path rather than by position.
	pub const fn is_named(&self) -> bool {
		matches!(self, ScopeKind::Object | ScopeKind::Schema)
	}

	/// Items must differ in their encoded bytes.
	pub const fn is_unique(&self) -> bool {
		matches!(self, ScopeKind::Set | ScopeKind::TypedSet)
	}

	/// Items are key/value entries.
	pub const fn is_map(&self) -> bool {
		matches!(self, ScopeKind::Map | ScopeKind::TypedMap)
	}

	/// Number of type arguments written after the code, `None` for a counted
	/// list.
	pub const fn type_arg_arity(&self) -> Option<usize> {
		match self {
			ScopeKind::Object | ScopeKind::Array | ScopeKind::Set | ScopeKind::Map => Some(0),
			ScopeKind::TypedArray | ScopeKind::TypedSet | ScopeKind::Nullable | ScopeKind::Tagged => Some(1),
			ScopeKind::TypedMap | ScopeKind::Tagged2 => Some(2),
			ScopeKind::Tuple | ScopeKind::TypedTuple => None,
			ScopeKind::Schema => Some(0),
		}
	}

	pub const fn name(&self) -> &'static str {
		match self {
			ScopeKind::Object => "Object",
			ScopeKind::Array => "Array",
			ScopeKind::TypedArray => "TypedArray",
			ScopeKind::Set => "Set",
			ScopeKind::TypedSet => "TypedSet",
			ScopeKind::Map => "Map",
			ScopeKind::TypedMap => "TypedMap",
			ScopeKind::Tuple => "Tuple",
			ScopeKind::TypedTuple => "TypedTuple",
			ScopeKind::Tagged => "Tagged",
			ScopeKind::Tagged2 => "Tagged2",
			ScopeKind::Nullable => "Nullable",
			ScopeKind::Schema => "Schema",
		}
	}
}

impl Display for ScopeKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
