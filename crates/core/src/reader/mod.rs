// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod hasher;
mod printer;
mod validator;
mod visitor;

use std::mem;

pub use hasher::RowHasher;
use hybridrow_type::{
	DateTime, Decimal, Error, FixedValue, Float128, LayoutCode, ObjectId, Result, ScopeKind, TypeArgument,
	UnixDateTime, Value,
	util::varint::{decode_varint, decode_varuint},
};
pub use printer::RowPrinter;
use uuid::Uuid;
pub use validator::{RowValidator, validate_row};
pub use visitor::{RowVisitor, visit_row};

use crate::{
	buffer::RowBuffer,
	config::RowConfig,
	cursor::{Item, RowCursor, SCOPE_PREFIX_SIZE, Storage},
	layout::Layout,
	resolver::LayoutResolver,
};

/// Forward-only reader over the items of a row.
///
/// `read` advances within the current scope; `descend` and `ascend` move
/// between nested scopes. The parent cursors are kept on an explicit stack.
pub struct RowReader<'a> {
	buffer: &'a RowBuffer,
	resolver: &'a dyn LayoutResolver,
	cursor: RowCursor,
	parents: Vec<RowCursor>,
}

impl<'a> RowReader<'a> {
	pub fn new(buffer: &'a RowBuffer, resolver: &'a dyn LayoutResolver) -> Result<Self> {
		Self::with_config(buffer, resolver, &RowConfig::default())
	}

	pub fn with_config(buffer: &'a RowBuffer, resolver: &'a dyn LayoutResolver, config: &RowConfig) -> Result<Self> {
		let (_, schema_id) = buffer.header()?;
		let layout = resolver.resolve(schema_id)?;
		let cursor = RowCursor::root(buffer, layout, config.max_depth)?;
		Ok(Self {
			buffer,
			resolver,
			cursor,
			parents: Vec::new(),
		})
	}

	pub fn buffer(&self) -> &'a RowBuffer {
		self.buffer
	}

	/// Advances to the next item of the current scope.
	pub fn read(&mut self) -> Result<bool> {
		self.cursor.move_next(self.buffer)
	}

	pub fn current(&self) -> Option<&Item> {
		self.cursor.current()
	}

	fn item(&self) -> Result<&Item> {
		self.cursor.current().ok_or_else(|| Error::invalid_state("reader is not positioned on an item"))
	}

	pub fn path(&self) -> Option<&str> {
		self.current().and_then(|item| item.path.as_deref())
	}

	pub fn index(&self) -> usize {
		self.current().map(|item| item.index).unwrap_or_default()
	}

	pub fn code(&self) -> Option<LayoutCode> {
		self.current().map(Item::code)
	}

	pub fn type_arg(&self) -> Option<&TypeArgument> {
		self.current().map(|item| &item.type_arg)
	}

	pub fn storage(&self) -> Option<Storage> {
		self.current().map(|item| item.storage)
	}

	pub fn scope(&self) -> ScopeKind {
		self.cursor.kind
	}

	pub fn is_immutable(&self) -> bool {
		self.cursor.immutable
	}

	/// Layout of the innermost schematized scope.
	pub fn layout(&self) -> Option<&Layout> {
		self.cursor.layout.as_ref()
	}

	/// Number of scopes entered below the root.
	pub fn depth(&self) -> usize {
		self.parents.len()
	}

	/// Offset where the next item of the current scope begins.
	pub fn position(&self) -> usize {
		self.cursor.position()
	}

	fn expect_code(&self, code: LayoutCode) -> Result<&Item> {
		let item = self.item()?;
		if item.code() != code {
			return Err(Error::TypeMismatch {
				expected: item.code(),
				actual: code,
			});
		}
		Ok(item)
	}

	pub fn read_fixed<T: FixedValue>(&self) -> Result<T> {
		let item = self.expect_code(T::CODE)?;
		self.buffer.read_fixed(item.value_offset)
	}

	pub fn read_null(&self) -> Result<()> {
		self.expect_code(LayoutCode::Null).map(|_| ())
	}

	pub fn read_bool(&self) -> Result<bool> {
		self.read_fixed()
	}

	pub fn read_int8(&self) -> Result<i8> {
		self.read_fixed()
	}

	pub fn read_int16(&self) -> Result<i16> {
		self.read_fixed()
	}

	pub fn read_int32(&self) -> Result<i32> {
		self.read_fixed()
	}

	pub fn read_int64(&self) -> Result<i64> {
		self.read_fixed()
	}

	pub fn read_uint8(&self) -> Result<u8> {
		self.read_fixed()
	}

	pub fn read_uint16(&self) -> Result<u16> {
		self.read_fixed()
	}

	pub fn read_uint32(&self) -> Result<u32> {
		self.read_fixed()
	}

	pub fn read_uint64(&self) -> Result<u64> {
		self.read_fixed()
	}

	pub fn read_float32(&self) -> Result<f32> {
		self.read_fixed()
	}

	pub fn read_float64(&self) -> Result<f64> {
		self.read_fixed()
	}

	pub fn read_float128(&self) -> Result<Float128> {
		self.read_fixed()
	}

	pub fn read_decimal(&self) -> Result<Decimal> {
		self.read_fixed()
	}

	pub fn read_datetime(&self) -> Result<DateTime> {
		self.read_fixed()
	}

	pub fn read_unix_datetime(&self) -> Result<UnixDateTime> {
		self.read_fixed()
	}

	pub fn read_guid(&self) -> Result<Uuid> {
		self.read_fixed()
	}

	pub fn read_object_id(&self) -> Result<ObjectId> {
		self.read_fixed()
	}

	pub fn read_varint(&self) -> Result<i64> {
		let item = self.expect_code(LayoutCode::VarInt)?;
		decode_varint(self.buffer.as_slice(), item.value_offset).map(|(value, _)| value)
	}

	pub fn read_varuint(&self) -> Result<u64> {
		let item = self.expect_code(LayoutCode::VarUInt)?;
		decode_varuint(self.buffer.as_slice(), item.value_offset).map(|(value, _)| value)
	}

	pub fn read_utf8(&self) -> Result<&'a str> {
		let item = self.expect_code(LayoutCode::Utf8)?;
		let bytes = self.buffer.read_variable(item.value_offset)?;
		std::str::from_utf8(bytes)
			.map_err(|err| Error::malformed(format!("invalid utf-8 at offset {}: {err}", item.value_offset)))
	}

	pub fn read_binary(&self) -> Result<&'a [u8]> {
		let item = self.expect_code(LayoutCode::Binary)?;
		self.buffer.read_variable(item.value_offset)
	}

	/// Decodes the current scalar whatever its type.
	pub fn read_value(&self) -> Result<Value> {
		let item = self.item()?;
		Value::decode(item.code(), self.buffer.as_slice(), item.value_offset).map(|(value, _)| value)
	}

	/// Whether the current nullable scope holds a value.
	pub fn has_value(&self) -> Result<bool> {
		let item = self.item()?;
		if item.code().scope_kind() != Some(ScopeKind::Nullable) {
			return Err(Error::invalid_state(format!("'{}' is not nullable", item.describe())));
		}
		match self.buffer.read_fixed::<u8>(item.value_offset + SCOPE_PREFIX_SIZE)? {
			0 => Ok(false),
			1 => Ok(true),
			other => Err(Error::malformed(format!("invalid nullable presence byte {other}"))),
		}
	}

	/// Enters the scope the reader is positioned on.
	pub fn descend(&mut self) -> Result<()> {
		if self.parents.len() + 1 >= self.cursor.max_depth() {
			return Err(Error::ScopeDepthExceeded {
				depth: self.cursor.max_depth(),
			});
		}
		let item = self.item()?;
		let layout = match item.type_arg.args.schema_id() {
			Some(schema_id) if item.code().scope_kind() == Some(ScopeKind::Schema) => {
				Some(self.resolver.resolve(schema_id)?)
			}
			_ => None,
		};
		let child = self.cursor.child(self.buffer, item, layout)?;
		self.parents.push(mem::replace(&mut self.cursor, child));
		Ok(())
	}

	/// Leaves the current scope; the parent is left positioned just past it.
	pub fn ascend(&mut self) -> Result<()> {
		let parent = self.parents.pop().ok_or_else(|| Error::invalid_state("reader is at the root scope"))?;
		self.cursor = parent;
		Ok(())
	}

	/// Applies `f` to the scope the reader is positioned on, then resumes the
	/// parent traversal. The first error aborts and is returned.
	pub fn read_scope<C, F>(&mut self, context: &mut C, f: F) -> Result<()>
	where
		F: FnOnce(&mut RowReader<'a>, &mut C) -> Result<()>,
	{
		self.descend()?;
		f(self, context)?;
		self.ascend()
	}
}
