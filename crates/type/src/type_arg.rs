// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{
	Error, LayoutCode, Result, SchemaId, ScopeKind,
	util::varint::{decode_varuint, encode_varuint},
};

/// A layout code together with the arguments its scope kind requires, e.g.
/// `TypedArray<Utf8>` or `TypedMap<Utf8, Int32>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeArgument {
	pub code: LayoutCode,
	pub args: TypeArgumentList,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeArgumentList {
	#[default]
	Empty,
	Types(Vec<TypeArgument>),
	Schema(SchemaId),
}

impl TypeArgumentList {
	pub fn len(&self) -> usize {
		match self {
			TypeArgumentList::Empty => 0,
			TypeArgumentList::Types(types) => types.len(),
			TypeArgumentList::Schema(_) => 0,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn get(&self, index: usize) -> Option<&TypeArgument> {
		match self {
			TypeArgumentList::Types(types) => types.get(index),
			_ => None,
		}
	}

	pub fn schema_id(&self) -> Option<SchemaId> {
		match self {
			TypeArgumentList::Schema(id) => Some(*id),
			_ => None,
		}
	}
}

impl TypeArgument {
	pub fn scalar(code: LayoutCode) -> Self {
		debug_assert!(!code.is_scope());
		Self {
			code,
			args: TypeArgumentList::Empty,
		}
	}

	pub fn scope(kind: ScopeKind, args: Vec<TypeArgument>) -> Self {
		Self {
			code: LayoutCode::scope(kind),
			args: if args.is_empty() {
				TypeArgumentList::Empty
			} else {
				TypeArgumentList::Types(args)
			},
		}
	}

	pub fn object() -> Self {
		Self::scope(ScopeKind::Object, vec![])
	}

	pub fn array() -> Self {
		Self::scope(ScopeKind::Array, vec![])
	}

	pub fn typed_array(item: TypeArgument) -> Self {
		Self::scope(ScopeKind::TypedArray, vec![item])
	}

	pub fn set() -> Self {
		Self::scope(ScopeKind::Set, vec![])
	}

	pub fn typed_set(item: TypeArgument) -> Self {
		Self::scope(ScopeKind::TypedSet, vec![item])
	}

	pub fn map() -> Self {
		Self::scope(ScopeKind::Map, vec![])
	}

	pub fn typed_map(key: TypeArgument, value: TypeArgument) -> Self {
		Self::scope(ScopeKind::TypedMap, vec![key, value])
	}

	pub fn tuple(items: Vec<TypeArgument>) -> Self {
		Self::scope(ScopeKind::Tuple, items)
	}

	pub fn typed_tuple(items: Vec<TypeArgument>) -> Self {
		Self::scope(ScopeKind::TypedTuple, items)
	}

	pub fn tagged(item: TypeArgument) -> Self {
		Self::scope(ScopeKind::Tagged, vec![item])
	}

	pub fn tagged2(first: TypeArgument, second: TypeArgument) -> Self {
		Self::scope(ScopeKind::Tagged2, vec![first, second])
	}

	pub fn nullable(item: TypeArgument) -> Self {
		Self::scope(ScopeKind::Nullable, vec![item])
	}

	pub fn schema(id: SchemaId) -> Self {
		Self {
			code: LayoutCode::scope(ScopeKind::Schema),
			args: TypeArgumentList::Schema(id),
		}
	}

	/// The same type with its outermost scope marked immutable.
	pub fn immutable(mut self) -> Self {
		if let LayoutCode::Scope {
			kind,
			..
		} = self.code
		{
			self.code = LayoutCode::immutable_scope(kind);
		}
		self
	}

	/// Checks that the arguments match what the code's scope kind requires.
	pub fn validate(&self) -> Result<()> {
		let Some(kind) = self.code.scope_kind() else {
			return match self.args {
				TypeArgumentList::Empty => Ok(()),
				_ => Err(Error::invalid_layout(format!("scalar {} takes no type arguments", self.code))),
			};
		};
		match (&self.args, kind, kind.type_arg_arity()) {
			(TypeArgumentList::Schema(id), ScopeKind::Schema, _) if id.is_valid() => Ok(()),
			(_, ScopeKind::Schema, _) => Err(Error::invalid_layout("schema scope requires a valid schema id")),
			(TypeArgumentList::Schema(_), _, _) => {
				Err(Error::invalid_layout(format!("{kind} does not reference a schema")))
			}
			(args, ScopeKind::TypedTuple, None) if args.is_empty() => {
				Err(Error::invalid_layout("typed tuple requires at least one type argument"))
			}
			(args, _, Some(arity)) if args.len() != arity => Err(Error::ArityMismatch {
				expected: arity,
				actual: args.len(),
			}),
			(TypeArgumentList::Types(types), _, _) => types.iter().try_for_each(TypeArgument::validate),
			(TypeArgumentList::Empty, _, _) => Ok(()),
		}
	}

	/// Appends the code and its arguments.
	pub fn encode(&self, out: &mut Vec<u8>) {
		out.push(self.code.to_u8());
		self.encode_args(out);
	}

	/// Appends only the arguments, as written after a scope code.
	pub fn encode_args(&self, out: &mut Vec<u8>) {
		let Some(kind) = self.code.scope_kind() else {
			return;
		};
		match &self.args {
			TypeArgumentList::Schema(id) => out.extend_from_slice(&id.to_le_bytes()),
			TypeArgumentList::Types(types) => {
				if kind.type_arg_arity().is_none() {
					encode_varuint(types.len() as u64, out);
				}
				for arg in types {
					arg.encode(out);
				}
			}
			TypeArgumentList::Empty => {
				if kind.type_arg_arity().is_none() {
					encode_varuint(0, out);
				}
			}
		}
	}

	/// Decodes a code plus arguments at `offset`, returning the argument and
	/// the bytes consumed. `depth` bounds nested arguments.
	pub fn decode(buf: &[u8], offset: usize, depth: usize) -> Result<(TypeArgument, usize)> {
		let byte = *buf.get(offset).ok_or_else(|| Error::malformed(format!("missing layout code at {offset}")))?;
		let code = LayoutCode::from_u8(byte)?;
		let (args, len) = Self::decode_args(code, buf, offset + 1, depth)?;
		Ok((
			TypeArgument {
				code,
				args,
			},
			len + 1,
		))
	}

	/// Decodes the arguments that follow `code` at `offset`.
	pub fn decode_args(
		code: LayoutCode,
		buf: &[u8],
		offset: usize,
		depth: usize,
	) -> Result<(TypeArgumentList, usize)> {
		let Some(kind) = code.scope_kind() else {
			return Ok((TypeArgumentList::Empty, 0));
		};
		if depth == 0 {
			return Err(Error::ScopeDepthExceeded {
				depth,
			});
		}

		if kind == ScopeKind::Schema {
			let bytes = buf
				.get(offset..offset + SchemaId::SIZE)
				.ok_or_else(|| Error::malformed(format!("truncated schema id at {offset}")))?;
			let id = SchemaId::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
			return Ok((TypeArgumentList::Schema(id), SchemaId::SIZE));
		}

		let mut pos = offset;
		let count = match kind.type_arg_arity() {
			Some(arity) => arity,
			None => {
				let (count, len) = decode_varuint(buf, pos)?;
				pos += len;
				usize::try_from(count)
					.ok()
					.filter(|count| *count <= buf.len())
					.ok_or_else(|| Error::malformed(format!("type argument count {count} at {offset}")))?
			}
		};
		if count == 0 {
			return Ok((TypeArgumentList::Empty, pos - offset));
		}

		let mut types = Vec::with_capacity(count);
		for _ in 0..count {
			let (arg, len) = Self::decode(buf, pos, depth - 1)?;
			types.push(arg);
			pos += len;
		}
		Ok((TypeArgumentList::Types(types), pos - offset))
	}
}

impl From<LayoutCode> for TypeArgument {
	fn from(code: LayoutCode) -> Self {
		Self {
			code,
			args: TypeArgumentList::Empty,
		}
	}
}

impl Display for TypeArgument {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.code, f)?;
		match &self.args {
			TypeArgumentList::Empty => Ok(()),
			TypeArgumentList::Schema(id) => write!(f, "<#{id}>"),
			TypeArgumentList::Types(types) => {
				f.write_str("<")?;
				for (i, arg) in types.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					Display::fmt(arg, f)?;
				}
				f.write_str(">")
			}
		}
	}
}
