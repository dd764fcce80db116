// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Traversal state of a single scope.
//!
//! A [`RowCursor`] borrows nothing: it records the byte range of its scope and
//! how far iteration has progressed, and every step takes the buffer it walks.
//! Nested scopes are represented by a stack of cursors owned by the reader or
//! writer, never by recursion.

mod item;

use hybridrow_type::{
	Error, LayoutCode, Result, ScopeKind, TypeArgument, TypeArgumentList,
	util::varint::decode_varuint,
	value::decode_length_prefixed,
};
pub use item::{Item, Path, Storage};

use crate::{
	buffer::{HEADER_SIZE, RowBuffer},
	layout::Layout,
};

/// Size of the length prefix opening every scope body.
pub const SCOPE_PREFIX_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
	Fixed,
	Variable,
	Sparse,
}

#[derive(Debug, Clone)]
pub struct RowCursor {
	pub kind: ScopeKind,
	pub immutable: bool,
	/// Layout of a schematized scope (the root row or a nested schema).
	pub layout: Option<Layout>,
	pub type_args: TypeArgumentList,
	/// Offset of the `u32` length prefix, `None` for the root.
	pub length_offset: Option<usize>,
	pub start: usize,
	pub end: usize,
	max_depth: usize,
	arity: Option<usize>,
	phase: Phase,
	column: usize,
	count: usize,
	position: usize,
	current: Option<Item>,
}

impl RowCursor {
	/// Opens the root scope of a row whose header names `layout`.
	pub fn root(buffer: &RowBuffer, layout: Layout, max_depth: usize) -> Result<Self> {
		let end = buffer.len();
		if end < HEADER_SIZE + layout.size() {
			return Err(Error::malformed(format!(
				"row of {end} bytes is shorter than the {} byte region of '{}'",
				HEADER_SIZE + layout.size(),
				layout.name
			)));
		}
		Ok(Self::open(
			ScopeKind::Schema,
			false,
			TypeArgumentList::Schema(layout.schema_id),
			Some(layout),
			None,
			HEADER_SIZE,
			end,
			max_depth,
		))
	}

	#[allow(clippy::too_many_arguments)]
	fn open(
		kind: ScopeKind,
		immutable: bool,
		type_args: TypeArgumentList,
		layout: Option<Layout>,
		length_offset: Option<usize>,
		start: usize,
		end: usize,
		max_depth: usize,
	) -> Self {
		let (phase, position) = match &layout {
			Some(layout) => (Phase::Fixed, start + layout.size()),
			None => (Phase::Sparse, start),
		};
		let arity = match kind {
			ScopeKind::TypedTuple => Some(type_args.len()),
			ScopeKind::Tuple if !type_args.is_empty() => Some(type_args.len()),
			ScopeKind::Tagged => Some(2),
			ScopeKind::Tagged2 => Some(3),
			_ => None,
		};
		Self {
			kind,
			immutable,
			layout,
			type_args,
			length_offset,
			start,
			end,
			max_depth,
			arity,
			phase,
			column: 0,
			count: 0,
			position,
			current: None,
		}
	}

	/// Opens the scope stored in `item`, which must be an item of this scope.
	/// Schema scopes require the layout of the referenced schema.
	pub fn child(&self, buffer: &RowBuffer, item: &Item, layout: Option<Layout>) -> Result<RowCursor> {
		let Some(kind) = item.code().scope_kind() else {
			return Err(Error::invalid_state(format!("'{}' holds a {}, not a scope", item.describe(), item.code())));
		};

		let length = buffer.read_fixed::<u32>(item.value_offset)? as usize;
		let start = item.value_offset + SCOPE_PREFIX_SIZE;
		let end = start + length;
		if end != item.end || end > self.end {
			return Err(Error::malformed(format!("scope at {} overruns its parent", item.offset)));
		}

		let layout = match kind {
			ScopeKind::Schema => {
				let layout = layout.ok_or_else(|| Error::invalid_state("schema scope opened without a layout"))?;
				if item.type_arg.args.schema_id() != Some(layout.schema_id) {
					return Err(Error::invalid_state(format!(
						"layout '{}' does not match {}",
						layout.name, item.type_arg
					)));
				}
				if length < layout.size() {
					return Err(Error::malformed(format!(
						"schema scope at {} is shorter than its fixed region",
						item.offset
					)));
				}
				Some(layout)
			}
			ScopeKind::Nullable if length == 0 => {
				return Err(Error::malformed(format!("nullable scope at {} has no presence byte", item.offset)));
			}
			_ => None,
		};

		let mut cursor = Self::open(
			kind,
			self.immutable || item.code().is_immutable(),
			item.type_arg.args.clone(),
			layout,
			Some(item.value_offset),
			start,
			end,
			self.max_depth,
		);
		// entries of an untyped map are key/value pairs
		if self.kind == ScopeKind::Map {
			cursor.arity = Some(2);
		}
		Ok(cursor)
	}

	/// A copy of this cursor positioned before its first item.
	pub fn rewind(&self) -> Self {
		let mut cursor = Self::open(
			self.kind,
			self.immutable,
			self.type_args.clone(),
			self.layout.clone(),
			self.length_offset,
			self.start,
			self.end,
			self.max_depth,
		);
		cursor.arity = self.arity;
		cursor
	}

	pub fn current(&self) -> Option<&Item> {
		self.current.as_ref()
	}

	pub(crate) fn set_current(&mut self, item: Item) {
		self.position = item.end;
		self.current = Some(item);
	}

	/// Offset at which the next item will be read.
	pub fn position(&self) -> usize {
		self.position
	}

	pub fn max_depth(&self) -> usize {
		self.max_depth
	}

	pub fn content_len(&self) -> usize {
		self.end - self.start
	}

	fn bitmap_offset(&self, layout: &Layout) -> usize {
		self.start + layout.bitmap_offset()
	}

	/// Advances to the next present item. Returns `false` once the scope is
	/// exhausted; absent columns are skipped. A fixed-arity scope that ends
	/// before holding all of its items fails with `ArityMismatch`.
	pub fn move_next(&mut self, buffer: &RowBuffer) -> Result<bool> {
		loop {
			match self.phase {
				Phase::Fixed => {
					let Some(layout) = self.layout.clone() else {
						self.phase = Phase::Sparse;
						continue;
					};
					while let Some(column) = layout.fixed.get(self.column) {
						self.column += 1;
						if !buffer.presence_bit(self.bitmap_offset(&layout), column.presence_bit)? {
							continue;
						}
						let offset = self.start + column.offset;
						self.current = Some(Item {
							index: self.count,
							path: Some(column.name.clone()),
							type_arg: TypeArgument::scalar(column.code),
							storage: Storage::Fixed,
							offset,
							value_offset: offset,
							end: offset + column.size,
						});
						self.count += 1;
						return Ok(true);
					}
					self.phase = Phase::Variable;
					self.column = 0;
				}
				Phase::Variable => {
					let Some(layout) = self.layout.clone() else {
						self.phase = Phase::Sparse;
						continue;
					};
					while let Some(column) = layout.variable.get(self.column) {
						self.column += 1;
						if !buffer.presence_bit(self.bitmap_offset(&layout), column.presence_bit)? {
							continue;
						}
						let offset = self.position;
						let end = offset + scalar_body_len(buffer, column.code, offset)?;
						if end > self.end {
							return Err(Error::malformed(format!("variable column '{}' overruns its scope", column.name)));
						}
						self.count += 1;
						self.set_current(Item {
							index: self.count - 1,
							path: Some(column.name.clone()),
							type_arg: TypeArgument::scalar(column.code),
							storage: Storage::Variable,
							offset,
							value_offset: offset,
							end,
						});
						return Ok(true);
					}
					self.phase = Phase::Sparse;
				}
				Phase::Sparse => {
					let more = self.next_sparse(buffer)?;
					if let Some(expected) = self.arity
						&& !more && self.count != expected
					{
						return Err(Error::ArityMismatch {
							expected,
							actual: self.count,
						});
					}
					return Ok(more);
				}
			}
		}
	}

	fn next_sparse(&mut self, buffer: &RowBuffer) -> Result<bool> {
		let offset = if self.kind == ScopeKind::Nullable {
			match buffer.read_fixed::<u8>(self.start)? {
				_ if self.count > 0 => return Ok(self.finish()),
				0 => return Ok(self.finish()),
				1 => self.start + 1,
				other => return Err(Error::malformed(format!("invalid nullable presence byte {other}"))),
			}
		} else if self.position >= self.end {
			return Ok(self.finish());
		} else {
			self.position
		};

		let item = self.parse_item(buffer, offset)?;
		self.count += 1;
		self.set_current(item);
		Ok(true)
	}

	fn finish(&mut self) -> bool {
		self.current = None;
		false
	}

	fn parse_item(&self, buffer: &RowBuffer, offset: usize) -> Result<Item> {
		let (type_arg, path, value_offset) = match self.element_type(self.count)? {
			Some(type_arg) => (type_arg, None, offset),
			None => {
				let (type_arg, len) = TypeArgument::decode(buffer.as_slice(), offset, self.max_depth)?;
				let mut value_offset = offset + len;
				let path = if self.kind.is_named() {
					let (bytes, len) = decode_length_prefixed(buffer.as_slice(), value_offset)?;
					value_offset += len;
					let path = std::str::from_utf8(bytes)
						.map_err(|err| Error::malformed(format!("invalid path at {offset}: {err}")))?;
					Some(path.to_string())
				} else {
					None
				};
				(type_arg, path, value_offset)
			}
		};

		let end = value_offset + body_len(buffer, &type_arg, value_offset)?;
		if end > self.end {
			return Err(Error::malformed(format!("item at {offset} overruns its scope ending at {}", self.end)));
		}

		Ok(Item {
			index: self.count,
			path,
			type_arg,
			storage: Storage::Sparse,
			offset,
			value_offset,
			end,
		})
	}

	/// Number of items a fixed-arity scope must hold: typed tuples, tuples
	/// with declared types, tagged values and untyped map entries.
	pub fn arity(&self) -> Option<usize> {
		self.arity
	}

	/// Type of the `index`-th item of a typed scope, whose items are stored
	/// without a code. `None` means items carry their own code.
	pub fn element_type(&self, index: usize) -> Result<Option<TypeArgument>> {
		let arg = |i: usize| {
			self.type_args
				.get(i)
				.cloned()
				.ok_or_else(|| Error::malformed(format!("{} scope is missing type argument {i}", self.kind)))
		};

		if let Some(arity) = self.arity()
			&& index >= arity
		{
			return Err(Error::ArityMismatch {
				expected: arity,
				actual: index + 1,
			});
		}

		let element = match self.kind {
			ScopeKind::TypedArray | ScopeKind::TypedSet | ScopeKind::Nullable => arg(0)?,
			ScopeKind::TypedTuple => arg(index)?,
			ScopeKind::Tagged | ScopeKind::Tagged2 if index == 0 => TypeArgument::scalar(LayoutCode::UInt8),
			ScopeKind::Tagged | ScopeKind::Tagged2 => arg(index - 1)?,
			ScopeKind::Map => TypeArgument::tuple(vec![]),
			ScopeKind::TypedMap => TypeArgument::typed_tuple(vec![arg(0)?, arg(1)?]),
			ScopeKind::Object | ScopeKind::Array | ScopeKind::Set | ScopeKind::Tuple | ScopeKind::Schema => {
				return Ok(None);
			}
		};
		Ok(Some(element))
	}

	/// Location `(offset, len)` of every variable cell, `None` for absent
	/// columns, plus the offset where the sparse items begin.
	pub fn variable_cells(&self, buffer: &RowBuffer) -> Result<(Vec<Option<(usize, usize)>>, usize)> {
		let Some(layout) = &self.layout else {
			return Ok((vec![], self.start));
		};
		let bitmap = self.bitmap_offset(layout);
		let mut position = self.start + layout.size();
		let mut cells = Vec::with_capacity(layout.variable.len());
		for column in &layout.variable {
			if buffer.presence_bit(bitmap, column.presence_bit)? {
				let len = scalar_body_len(buffer, column.code, position)?;
				cells.push(Some((position, len)));
				position += len;
			} else {
				cells.push(None);
			}
		}
		if position > self.end {
			return Err(Error::malformed("variable region overruns its scope"));
		}
		Ok((cells, position))
	}

	/// Every item stored after the schematized columns, in order.
	pub fn sparse_items(&self, buffer: &RowBuffer) -> Result<Vec<Item>> {
		let mut scan = self.rewind();
		let (_, sparse_start) = self.variable_cells(buffer)?;
		scan.phase = Phase::Sparse;
		scan.position = sparse_start;

		let mut items = Vec::new();
		while scan.next_sparse(buffer)? {
			if let Some(item) = scan.current.take() {
				items.push(item);
			}
		}
		Ok(items)
	}

	/// Moves every recorded offset at or after `at` by `delta` bytes.
	pub(crate) fn shift(&mut self, at: usize, delta: isize) {
		let adjust = |offset: usize| {
			if offset >= at {
				offset.saturating_add_signed(delta)
			} else {
				offset
			}
		};
		self.end = adjust(self.end);
		self.position = adjust(self.position);
		if let Some(item) = &mut self.current {
			item.end = adjust(item.end);
		}
	}

	/// Rewrites the scope's length prefix from its current extent.
	pub(crate) fn write_length(&self, buffer: &mut RowBuffer) -> Result<()> {
		let Some(offset) = self.length_offset else {
			return Ok(());
		};
		let length = u32::try_from(self.content_len())
			.map_err(|_| Error::invalid_state(format!("scope of {} bytes exceeds u32", self.content_len())))?;
		buffer.write_fixed(offset, length)
	}
}

/// Size in bytes of a value body of `type_arg` stored at `offset`.
pub fn body_len(buffer: &RowBuffer, type_arg: &TypeArgument, offset: usize) -> Result<usize> {
	match type_arg.code {
		LayoutCode::Scope {
			..
		} => {
			let length = buffer.read_fixed::<u32>(offset)? as usize;
			let total = SCOPE_PREFIX_SIZE + length;
			if offset + total > buffer.len() {
				return Err(Error::malformed(format!("scope at {offset} claims {length} bytes past the buffer end")));
			}
			Ok(total)
		}
		code => scalar_body_len(buffer, code, offset),
	}
}

fn scalar_body_len(buffer: &RowBuffer, code: LayoutCode, offset: usize) -> Result<usize> {
	match code.fixed_size() {
		Some(size) => {
			buffer.bytes(offset, size)?;
			Ok(size)
		}
		None => match code {
			LayoutCode::VarInt | LayoutCode::VarUInt => decode_varuint(buffer.as_slice(), offset).map(|(_, len)| len),
			_ => buffer.variable_len(offset),
		},
	}
}
