// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use hybridrow_type::{LayoutCode, Result, ScopeKind, Value};

use super::RowReader;

/// Callbacks driven by [`visit_row`] for every item of a row.
pub trait RowVisitor {
	fn visit_scalar(&mut self, reader: &RowReader<'_>, value: Value) -> Result<()>;

	/// Called before a scope of `kind` is entered. The reader is still in the
	/// parent, positioned on the scope's item.
	fn enter_scope(&mut self, _reader: &RowReader<'_>, _kind: ScopeKind) -> Result<()> {
		Ok(())
	}

	/// Called after the items of a scope of `kind`, with the reader back in
	/// the parent.
	fn exit_scope(&mut self, _reader: &RowReader<'_>, _kind: ScopeKind) -> Result<()> {
		Ok(())
	}

	/// Called for a nullable scope without a value, which is never entered.
	fn visit_empty_nullable(&mut self, _reader: &RowReader<'_>) -> Result<()> {
		Ok(())
	}
}

/// Walks every item of the reader's current scope and all nested scopes.
///
/// Nesting is tracked by the reader's cursor stack, so the call depth stays
/// constant regardless of how deep the row is.
pub fn visit_row<V: RowVisitor + ?Sized>(reader: &mut RowReader<'_>, visitor: &mut V) -> Result<()> {
	let base = reader.depth();
	loop {
		if !reader.read()? {
			if reader.depth() == base {
				return Ok(());
			}
			let kind = reader.scope();
			reader.ascend()?;
			visitor.exit_scope(reader, kind)?;
			continue;
		}

		let Some(code) = reader.code() else {
			continue;
		};
		match code {
			LayoutCode::Null
			| LayoutCode::Boolean
			| LayoutCode::Int8
			| LayoutCode::Int16
			| LayoutCode::Int32
			| LayoutCode::Int64
			| LayoutCode::UInt8
			| LayoutCode::UInt16
			| LayoutCode::UInt32
			| LayoutCode::UInt64
			| LayoutCode::VarInt
			| LayoutCode::VarUInt
			| LayoutCode::Float32
			| LayoutCode::Float64
			| LayoutCode::Float128
			| LayoutCode::Decimal
			| LayoutCode::DateTime
			| LayoutCode::UnixDateTime
			| LayoutCode::Guid
			| LayoutCode::ObjectId
			| LayoutCode::Utf8
			| LayoutCode::Binary => {
				let value = reader.read_value()?;
				visitor.visit_scalar(reader, value)?;
			}
			LayoutCode::Scope {
				kind: ScopeKind::Nullable,
				..
			} if !reader.has_value()? => {
				visitor.visit_empty_nullable(reader)?;
			}
			LayoutCode::Scope {
				kind:
					kind @ (ScopeKind::Object
				| ScopeKind::Array
				| ScopeKind::TypedArray
				| ScopeKind::Set
				| ScopeKind::TypedSet
				| ScopeKind::Map
				| ScopeKind::TypedMap
				| ScopeKind::Tuple
				| ScopeKind::TypedTuple
				| ScopeKind::Tagged
				| ScopeKind::Tagged2
				| ScopeKind::Nullable
				| ScopeKind::Schema),
				..
			} => {
				visitor.enter_scope(reader, kind)?;
				reader.descend()?;
			}
		}
	}
}
