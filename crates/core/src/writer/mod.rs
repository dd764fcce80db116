// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod mode;

use std::{fmt::Display, mem};

use hybridrow_type::{
	Error, LayoutCode, Result, ScopeKind, TypeArgument, TypeArgumentList, Value, util::varint::encode_varuint,
};
pub use mode::UpdateMode;
use tracing::trace;

use crate::{
	buffer::RowBuffer,
	config::RowConfig,
	cursor::{Item, Path, RowCursor, Storage},
	layout::{Layout, LayoutColumn},
	resolver::LayoutResolver,
};

/// Builds and edits a row in place.
///
/// Every edit is a splice of the underlying buffer; after each splice the
/// extent and length prefix of every open scope is brought up to date, so
/// nested scopes may be grown or shrunk freely.
pub struct RowWriter<'a> {
	buffer: &'a mut RowBuffer,
	resolver: &'a dyn LayoutResolver,
	frame: Frame,
	parents: Vec<Frame>,
	/// Bytes replaced by the most recent splice.
	displaced: Option<Displaced>,
}

/// What an edit overwrote, so a scope that fails to populate can be undone.
struct Displaced {
	offset: usize,
	bytes: Vec<u8>,
}

struct Frame {
	cursor: RowCursor,
	/// Opened by `write_scope` on this writer.
	created: bool,
	/// This scope or an ancestor is being created, so immutability does not
	/// apply yet.
	creating: bool,
	mode: UpdateMode,
}

impl<'a> RowWriter<'a> {
	pub fn new(buffer: &'a mut RowBuffer, resolver: &'a dyn LayoutResolver) -> Result<Self> {
		Self::with_config(buffer, resolver, &RowConfig::default())
	}

	pub fn with_config(
		buffer: &'a mut RowBuffer,
		resolver: &'a dyn LayoutResolver,
		config: &RowConfig,
	) -> Result<Self> {
		let (_, schema_id) = buffer.header()?;
		let layout = resolver.resolve(schema_id)?;
		let cursor = RowCursor::root(buffer, layout, config.max_depth)?;
		Ok(Self {
			buffer,
			resolver,
			frame: Frame {
				cursor,
				created: false,
				creating: false,
				mode: UpdateMode::Upsert,
			},
			parents: Vec::new(),
			displaced: None,
		})
	}

	pub fn buffer(&self) -> &RowBuffer {
		self.buffer
	}

	pub fn scope(&self) -> ScopeKind {
		self.frame.cursor.kind
	}

	pub fn depth(&self) -> usize {
		self.parents.len()
	}

	/// Number of sparse items in the current scope.
	pub fn count(&self) -> Result<usize> {
		Ok(self.frame.cursor.sparse_items(self.buffer)?.len())
	}

	pub fn write_scalar<'p>(&mut self, path: impl Into<Path<'p>>, value: &Value, mode: UpdateMode) -> Result<()> {
		let type_arg = TypeArgument::scalar(value.code());
		self.put(path.into(), &type_arg, &value.to_bytes(), mode).map(|_| ())
	}

	/// Writes an empty scope of `type_arg` at `path`, lets `f` populate it and
	/// closes it again. If `f` fails, or leaves a fixed-arity scope short, the
	/// scope is removed and whatever it replaced is restored.
	pub fn write_scope<'p, F>(
		&mut self,
		path: impl Into<Path<'p>>,
		type_arg: &TypeArgument,
		mode: UpdateMode,
		f: F,
	) -> Result<()>
	where
		F: FnOnce(&mut RowWriter<'a>) -> Result<()>,
	{
		type_arg.validate()?;
		let (body, layout) = self.empty_scope(type_arg)?;
		self.displaced = None;
		let item = self.put(path.into(), type_arg, &body, mode)?;
		let displaced = self.displaced.take();
		let end = item.end;
		if let Err(err) = self.enter(item, layout, true, mode) {
			self.restore(displaced, end)?;
			return Err(err);
		}
		let result = f(self);
		self.leave(result, displaced)
	}

	/// Opens the existing scope at `path` so `f` can edit it in place.
	pub fn update_scope<'p, F>(&mut self, path: impl Into<Path<'p>>, f: F) -> Result<()>
	where
		F: FnOnce(&mut RowWriter<'a>) -> Result<()>,
	{
		let path = path.into();
		let item = self.locate(path)?.ok_or_else(|| Error::not_found(path.to_string()))?;
		if !item.code().is_scope() {
			return Err(Error::invalid_state(format!("'{path}' holds a {}, not a scope", item.code())));
		}
		if self.frame.cursor.kind.is_unique() {
			return Err(self.unsupported("update_scope"));
		}
		self.writable(&path)?;
		self.replaceable(&item)?;

		let layout = self.scope_layout(&item.type_arg)?;
		self.enter(item, layout, false, UpdateMode::Update)?;
		let result = f(self);
		self.leave(result, None)
	}

	/// Writes a scalar entry of the current map scope.
	pub fn write_entry(&mut self, key: &Value, value: &Value, mode: UpdateMode) -> Result<()> {
		let key_bytes = self.entry_key(key)?;
		let (value_arg, coded) = self.entry_value(&TypeArgument::scalar(value.code()))?;

		let mut content = key_bytes.clone();
		if coded {
			value_arg.encode(&mut content);
		}
		value.encode(&mut content);
		self.put_entry(key, &key_bytes, &content, mode).map(|_| ())
	}

	/// Writes a map entry whose value is a scope populated by `f`.
	pub fn write_entry_scope<F>(&mut self, key: &Value, type_arg: &TypeArgument, mode: UpdateMode, f: F) -> Result<()>
	where
		F: FnOnce(&mut RowWriter<'a>) -> Result<()>,
	{
		type_arg.validate()?;
		let key_bytes = self.entry_key(key)?;
		let (value_arg, coded) = self.entry_value(type_arg)?;
		let (body, layout) = self.empty_scope(&value_arg)?;

		let mut content = key_bytes.clone();
		if coded {
			value_arg.encode(&mut content);
		}
		content.extend_from_slice(&body);
		self.displaced = None;
		let entry = self.put_entry(key, &key_bytes, &content, mode)?;
		let displaced = self.displaced.take();
		let end = entry.end;

		if let Err(err) = self.enter(entry, None, true, mode) {
			self.restore(displaced, end)?;
			return Err(err);
		}
		let result = self.open_entry_value(layout, mode, f);
		self.leave(result, displaced)
	}

	fn open_entry_value<F>(&mut self, layout: Option<Layout>, mode: UpdateMode, f: F) -> Result<()>
	where
		F: FnOnce(&mut RowWriter<'a>) -> Result<()>,
	{
		let value = self
			.frame
			.cursor
			.sparse_items(self.buffer)?
			.into_iter()
			.nth(1)
			.ok_or_else(|| Error::malformed("map entry without a value"))?;
		self.enter(value, layout, true, mode)?;
		let result = f(self);
		self.leave(result, None)
	}

	/// Removes the entry with `key` from the current map scope.
	pub fn delete_entry(&mut self, key: &Value) -> Result<()> {
		self.writable(key)?;
		let key_bytes = self.entry_key(key)?;
		let (entry, _) = self.find_entry(&key_bytes)?;
		let entry = entry.ok_or_else(|| Error::not_found(key.to_string()))?;
		self.splice(entry.offset, entry.len(), &[])
	}

	/// Removes the value at `path`: a column becomes absent, a sparse item is
	/// cut out and a nullable loses its value.
	pub fn delete<'p>(&mut self, path: impl Into<Path<'p>>) -> Result<()> {
		let path = path.into();
		self.writable(&path)?;
		if self.frame.cursor.arity().is_some() {
			return Err(self.unsupported("delete"));
		}
		let item = self.locate(path)?.ok_or_else(|| Error::not_found(path.to_string()))?;
		self.replaceable(&item)?;

		match item.storage {
			Storage::Fixed => {
				self.buffer.write_bytes(item.offset, &vec![0; item.len()])?;
				self.clear_presence(&item)
			}
			Storage::Variable => {
				self.splice(item.offset, item.len(), &[])?;
				self.clear_presence(&item)
			}
			Storage::Sparse if self.frame.cursor.kind == ScopeKind::Nullable => {
				let (start, len) = (self.frame.cursor.start, self.frame.cursor.content_len());
				self.splice(start, len, &[0])
			}
			Storage::Sparse => self.splice(item.offset, item.len(), &[]),
		}
	}

	fn put(&mut self, path: Path<'_>, type_arg: &TypeArgument, body: &[u8], mode: UpdateMode) -> Result<Item> {
		self.writable(&path)?;
		match self.frame.cursor.kind {
			ScopeKind::Schema => self.put_column(path, type_arg, body, mode),
			ScopeKind::Object => {
				let name = self.name(path)?;
				self.put_named(name, type_arg, body, mode)
			}
			ScopeKind::Nullable => self.put_nullable(path, type_arg, body, mode),
			ScopeKind::Set | ScopeKind::TypedSet => self.put_unique(path, type_arg, body, mode),
			ScopeKind::Map | ScopeKind::TypedMap => Err(self.unsupported(format!("{mode} by path"))),
			ScopeKind::Array
			| ScopeKind::TypedArray
			| ScopeKind::Tuple
			| ScopeKind::TypedTuple
			| ScopeKind::Tagged
			| ScopeKind::Tagged2 => self.put_indexed(path, type_arg, body, mode),
		}
	}

	fn put_column(&mut self, path: Path<'_>, type_arg: &TypeArgument, body: &[u8], mode: UpdateMode) -> Result<Item> {
		let name = self.name(path)?;
		if mode == UpdateMode::InsertAt {
			return Err(self.unsupported(mode));
		}
		let layout = self.layout()?;
		let column = layout.find(name).ok_or_else(|| Error::ColumnNotFound {
			name: name.to_string(),
		})?;
		let declared = column.type_arg();
		conforms(&declared, type_arg)?;

		let bitmap = self.frame.cursor.start + layout.bitmap_offset();
		match column {
			LayoutColumn::Fixed(column) => {
				let present = self.buffer.presence_bit(bitmap, column.presence_bit)?;
				mode.check(present, name)?;
				let offset = self.frame.cursor.start + column.offset;
				self.buffer.write_bytes(offset, body)?;
				self.buffer.set_presence_bit(bitmap, column.presence_bit, true)?;
				Ok(Item {
					index: column.presence_bit,
					path: Some(name.to_string()),
					type_arg: declared,
					storage: Storage::Fixed,
					offset,
					value_offset: offset,
					end: offset + body.len(),
				})
			}
			LayoutColumn::Variable(column) => {
				let (cells, region_end) = self.frame.cursor.variable_cells(self.buffer)?;
				let existing = cells
					.get(column.index)
					.copied()
					.ok_or_else(|| Error::malformed(format!("variable column '{name}' has no cell slot")))?;
				mode.check(existing.is_some(), name)?;

				let (offset, old_len) = existing.unwrap_or_else(|| {
					let next = cells[column.index + 1..].iter().flatten().next();
					(next.map(|(offset, _)| *offset).unwrap_or(region_end), 0)
				});
				self.splice(offset, old_len, body)?;
				self.buffer.set_presence_bit(bitmap, column.presence_bit, true)?;
				Ok(Item {
					index: column.presence_bit,
					path: Some(name.to_string()),
					type_arg: declared,
					storage: Storage::Variable,
					offset,
					value_offset: offset,
					end: offset + body.len(),
				})
			}
			LayoutColumn::Sparse(_) => self.put_named(name, &declared, body, mode),
		}
	}

	fn put_named(&mut self, name: &str, type_arg: &TypeArgument, body: &[u8], mode: UpdateMode) -> Result<Item> {
		if mode == UpdateMode::InsertAt {
			return Err(self.unsupported(mode));
		}
		let items = self.frame.cursor.sparse_items(self.buffer)?;
		let existing = items.iter().find(|item| item.path.as_deref() == Some(name)).cloned();
		mode.check(existing.is_some(), name)?;
		if let Some(item) = &existing {
			self.replaceable(item)?;
		}

		let mut bytes = Vec::with_capacity(body.len() + name.len() + 4);
		type_arg.encode(&mut bytes);
		encode_varuint(name.len() as u64, &mut bytes);
		bytes.extend_from_slice(name.as_bytes());
		let header = bytes.len();
		bytes.extend_from_slice(body);

		let (offset, old_len, index) = match &existing {
			Some(item) => (item.offset, item.len(), item.index),
			None => (self.frame.cursor.end, 0, items.len()),
		};
		self.splice(offset, old_len, &bytes)?;
		Ok(Item {
			index,
			path: Some(name.to_string()),
			type_arg: type_arg.clone(),
			storage: Storage::Sparse,
			offset,
			value_offset: offset + header,
			end: offset + bytes.len(),
		})
	}

	fn put_indexed(&mut self, path: Path<'_>, type_arg: &TypeArgument, body: &[u8], mode: UpdateMode) -> Result<Item> {
		if mode == UpdateMode::InsertAt && self.frame.cursor.arity().is_some() {
			return Err(self.unsupported(mode));
		}
		let items = self.frame.cursor.sparse_items(self.buffer)?;
		let count = items.len();
		let index = match path {
			Path::Index(index) => index,
			Path::Append => count,
			Path::Name(_) => return Err(self.addressing(path)),
		};

		let (type_arg, coded) = match self.frame.cursor.element_type(index)? {
			Some(expected) => {
				conforms(&expected, type_arg)?;
				(expected, false)
			}
			None => {
				if let TypeArgumentList::Types(declared) = &self.frame.cursor.type_args
					&& let Some(expected) = declared.get(index)
				{
					conforms(expected, type_arg)?;
				}
				(type_arg.clone(), true)
			}
		};

		let target = Path::Index(index);
		let (offset, old_len) = match (mode, items.get(index)) {
			(UpdateMode::Insert, Some(_)) => return Err(Error::exists(target.to_string())),
			(UpdateMode::Update, None) => return Err(Error::not_found(target.to_string())),
			(UpdateMode::InsertAt, Some(item)) => (item.offset, 0),
			(UpdateMode::Update | UpdateMode::Upsert, Some(item)) => {
				self.replaceable(item)?;
				(item.offset, item.len())
			}
			(_, None) if index == count => (self.frame.cursor.end, 0),
			(_, None) => return Err(Error::not_found(target.to_string())),
		};

		let bytes = item_bytes(&type_arg, coded, body);
		self.splice(offset, old_len, &bytes)?;
		Ok(Item {
			index,
			path: None,
			value_offset: offset + bytes.len() - body.len(),
			type_arg,
			storage: Storage::Sparse,
			offset,
			end: offset + bytes.len(),
		})
	}

	fn put_unique(&mut self, path: Path<'_>, type_arg: &TypeArgument, body: &[u8], mode: UpdateMode) -> Result<Item> {
		if mode == UpdateMode::InsertAt {
			return Err(self.unsupported(mode));
		}
		if path != Path::Append {
			return Err(self.addressing(path));
		}

		let (type_arg, coded) = match self.frame.cursor.element_type(0)? {
			Some(expected) => {
				conforms(&expected, type_arg)?;
				(expected, false)
			}
			None => (type_arg.clone(), true),
		};
		let bytes = item_bytes(&type_arg, coded, body);
		let items = self.frame.cursor.sparse_items(self.buffer)?;

		// scopes are compared once populated, see `dedupe`
		if !type_arg.code.is_scope() {
			let mut existing = None;
			for item in &items {
				if self.buffer.bytes(item.offset, item.len())? == bytes.as_slice() {
					existing = Some(item.clone());
					break;
				}
			}
			match (mode, existing) {
				(UpdateMode::Insert, Some(item)) => return Err(Error::exists(item.describe())),
				(_, Some(item)) => return Ok(item),
				(UpdateMode::Update, None) => return Err(Error::not_found(path.to_string())),
				(_, None) => {}
			}
		} else if mode == UpdateMode::Update {
			return Err(Error::not_found(path.to_string()));
		}

		let offset = self.frame.cursor.end;
		self.splice(offset, 0, &bytes)?;
		Ok(Item {
			index: items.len(),
			path: None,
			value_offset: offset + bytes.len() - body.len(),
			type_arg,
			storage: Storage::Sparse,
			offset,
			end: offset + bytes.len(),
		})
	}

	fn put_nullable(&mut self, path: Path<'_>, type_arg: &TypeArgument, body: &[u8], mode: UpdateMode) -> Result<Item> {
		match path {
			Path::Append | Path::Index(0) => {}
			Path::Index(index) => {
				return Err(Error::ArityMismatch {
					expected: 1,
					actual: index + 1,
				});
			}
			Path::Name(_) => return Err(self.addressing(path)),
		}
		if mode == UpdateMode::InsertAt {
			return Err(self.unsupported(mode));
		}

		let expected = self
			.frame
			.cursor
			.element_type(0)?
			.ok_or_else(|| Error::malformed("nullable scope without a value type"))?;
		conforms(&expected, type_arg)?;

		let existing = self.frame.cursor.sparse_items(self.buffer)?.into_iter().next();
		mode.check(existing.is_some(), path)?;
		if let Some(item) = &existing {
			self.replaceable(item)?;
		}

		let (start, len) = (self.frame.cursor.start, self.frame.cursor.content_len());
		let mut content = Vec::with_capacity(body.len() + 1);
		content.push(1);
		content.extend_from_slice(body);
		self.splice(start, len, &content)?;
		Ok(Item {
			index: 0,
			path: None,
			type_arg: expected,
			storage: Storage::Sparse,
			offset: start + 1,
			value_offset: start + 1,
			end: start + content.len(),
		})
	}

	fn put_entry(&mut self, key: &Value, key_bytes: &[u8], content: &[u8], mode: UpdateMode) -> Result<Item> {
		self.writable(key)?;
		if mode == UpdateMode::InsertAt {
			return Err(self.unsupported(mode));
		}
		let (existing, count) = self.find_entry(key_bytes)?;
		mode.check(existing.is_some(), key)?;

		let body = scope_body(content)?;
		let (offset, old_len, index) = match &existing {
			Some(entry) => (entry.offset, entry.len(), entry.index),
			None => (self.frame.cursor.end, 0, count),
		};
		let type_arg = self
			.frame
			.cursor
			.element_type(index)?
			.ok_or_else(|| Error::invalid_state("map scope without an entry type"))?;
		self.splice(offset, old_len, &body)?;
		Ok(Item {
			index,
			path: None,
			type_arg,
			storage: Storage::Sparse,
			offset,
			value_offset: offset,
			end: offset + body.len(),
		})
	}

	/// Types of a typed map's keys and values, `None` for an untyped map.
	fn map_types(&self) -> Result<Option<(TypeArgument, TypeArgument)>> {
		let cursor = &self.frame.cursor;
		if !cursor.kind.is_map() {
			return Err(self.unsupported("map entry"));
		}
		if cursor.kind == ScopeKind::Map {
			return Ok(None);
		}
		let arg = |i| cursor.type_args.get(i).cloned().ok_or_else(|| Error::malformed("typed map without types"));
		Ok(Some((arg(0)?, arg(1)?)))
	}

	fn entry_key(&self, key: &Value) -> Result<Vec<u8>> {
		let given = TypeArgument::scalar(key.code());
		let mut bytes = Vec::with_capacity(key.encoded_len() + 1);
		match self.map_types()? {
			Some((expected, _)) => conforms(&expected, &given)?,
			None => given.encode(&mut bytes),
		}
		key.encode(&mut bytes);
		Ok(bytes)
	}

	fn entry_value(&self, given: &TypeArgument) -> Result<(TypeArgument, bool)> {
		match self.map_types()? {
			Some((_, expected)) => {
				conforms(&expected, given)?;
				Ok((expected, false))
			}
			None => Ok((given.clone(), true)),
		}
	}

	/// The entry whose key encodes to `key`, and the number of entries.
	fn find_entry(&self, key: &[u8]) -> Result<(Option<Item>, usize)> {
		let entries = self.frame.cursor.sparse_items(self.buffer)?;
		let count = entries.len();
		for entry in entries {
			let mut cursor = self.frame.cursor.child(self.buffer, &entry, None)?;
			if !cursor.move_next(self.buffer)? {
				return Err(Error::malformed(format!("map entry at {} has no key", entry.offset)));
			}
			if let Some(item) = cursor.current()
				&& self.buffer.bytes(item.offset, item.len())? == key
			{
				return Ok((Some(entry), count));
			}
		}
		Ok((None, count))
	}

	/// The existing item at `path` in the current scope.
	fn locate(&self, path: Path<'_>) -> Result<Option<Item>> {
		let cursor = &self.frame.cursor;
		match cursor.kind {
			ScopeKind::Schema | ScopeKind::Object => {
				let name = self.name(path)?;
				if cursor.kind == ScopeKind::Schema && self.layout()?.find(name).is_none() {
					return Err(Error::ColumnNotFound {
						name: name.to_string(),
					});
				}
				let mut scan = cursor.rewind();
				while scan.move_next(self.buffer)? {
					if let Some(item) = scan.current()
						&& item.path.as_deref() == Some(name)
					{
						return Ok(Some(item.clone()));
					}
				}
				Ok(None)
			}
			_ => match path {
				Path::Index(index) => Ok(cursor.sparse_items(self.buffer)?.into_iter().nth(index)),
				Path::Append => Ok(None),
				Path::Name(_) => Err(self.addressing(path)),
			},
		}
	}

	fn clear_presence(&mut self, item: &Item) -> Result<()> {
		let layout = self.layout()?;
		let bit = match item.path.as_deref().and_then(|name| layout.find(name)) {
			Some(LayoutColumn::Fixed(column)) => column.presence_bit,
			Some(LayoutColumn::Variable(column)) => column.presence_bit,
			_ => return Err(Error::invalid_state(format!("'{}' is not a schematized column", item.describe()))),
		};
		let bitmap = self.frame.cursor.start + layout.bitmap_offset();
		self.buffer.set_presence_bit(bitmap, bit, false)
	}

	/// Replaces `old_len` bytes at `offset` and re-derives the extent and
	/// length prefix of every open scope.
	fn splice(&mut self, offset: usize, old_len: usize, bytes: &[u8]) -> Result<()> {
		let old = self.buffer.bytes(offset, old_len)?.to_vec();
		let delta = self.buffer.replace(offset, old_len, bytes)?;
		self.displaced = Some(Displaced {
			offset,
			bytes: old,
		});
		if delta == 0 {
			return Ok(());
		}
		trace!(offset, old_len, delta, depth = self.parents.len(), "splice");

		let at = offset + old_len;
		self.frame.cursor.shift(at, delta);
		self.frame.cursor.write_length(self.buffer)?;
		for parent in self.parents.iter_mut().rev() {
			parent.cursor.shift(at, delta);
			parent.cursor.write_length(self.buffer)?;
		}
		Ok(())
	}

	fn enter(&mut self, item: Item, layout: Option<Layout>, created: bool, mode: UpdateMode) -> Result<()> {
		let max_depth = self.frame.cursor.max_depth();
		if self.parents.len() + 1 >= max_depth {
			return Err(Error::ScopeDepthExceeded {
				depth: max_depth,
			});
		}
		let cursor = self.frame.cursor.child(self.buffer, &item, layout)?;
		self.frame.cursor.set_current(item);
		let frame = Frame {
			cursor,
			created,
			creating: created || self.frame.creating,
			mode,
		};
		self.parents.push(mem::replace(&mut self.frame, frame));
		Ok(())
	}

	fn leave(&mut self, result: Result<()>, displaced: Option<Displaced>) -> Result<()> {
		let result = result.and_then(|()| self.check_arity());
		let parent = self.parents.pop().ok_or_else(|| Error::invalid_state("writer is at the root scope"))?;
		let child = mem::replace(&mut self.frame, parent);
		if let Err(err) = result {
			if let Some(end) = self.frame.cursor.current().map(|item| item.end) {
				self.restore(displaced, end)?;
			}
			return Err(err);
		}

		if child.created && self.frame.cursor.kind.is_unique() {
			self.dedupe(child.mode)?;
		}
		Ok(())
	}

	/// Puts back what the scope ending at `end` replaced.
	fn restore(&mut self, displaced: Option<Displaced>, end: usize) -> Result<()> {
		let Some(displaced) = displaced else {
			return Ok(());
		};
		// nothing left to put back into
		if self.buffer.is_poisoned() {
			return Ok(());
		}
		self.splice(displaced.offset, end - displaced.offset, &displaced.bytes)
	}

	fn check_arity(&self) -> Result<()> {
		let Some(expected) = self.frame.cursor.arity() else {
			return Ok(());
		};
		let actual = self.count()?;
		if actual != expected {
			return Err(Error::ArityMismatch {
				expected,
				actual,
			});
		}
		Ok(())
	}

	/// Drops the scope just closed in a set if an equal item already exists.
	fn dedupe(&mut self, mode: UpdateMode) -> Result<()> {
		let Some(item) = self.frame.cursor.current().cloned() else {
			return Ok(());
		};
		let written = self.buffer.bytes(item.offset, item.len())?.to_vec();
		let mut duplicate = None;
		for other in self.frame.cursor.sparse_items(self.buffer)? {
			if other.offset != item.offset && self.buffer.bytes(other.offset, other.len())? == written.as_slice() {
				duplicate = Some(other);
				break;
			}
		}

		let Some(other) = duplicate else {
			return Ok(());
		};
		self.splice(item.offset, item.len(), &[])?;
		match mode {
			UpdateMode::Insert => Err(Error::exists(other.describe())),
			_ => Ok(()),
		}
	}

	fn empty_scope(&self, type_arg: &TypeArgument) -> Result<(Vec<u8>, Option<Layout>)> {
		let Some(kind) = type_arg.code.scope_kind() else {
			return Err(Error::invalid_state(format!("{type_arg} is not a scope")));
		};
		let layout = self.scope_layout(type_arg)?;
		let content = match (kind, &layout) {
			(ScopeKind::Schema, Some(layout)) => vec![0; layout.size()],
			(ScopeKind::Nullable, _) => vec![0],
			_ => vec![],
		};
		Ok((scope_body(&content)?, layout))
	}

	fn scope_layout(&self, type_arg: &TypeArgument) -> Result<Option<Layout>> {
		match (type_arg.code.scope_kind(), type_arg.args.schema_id()) {
			(Some(ScopeKind::Schema), Some(schema_id)) => self.resolver.resolve(schema_id).map(Some),
			(Some(ScopeKind::Schema), None) => Err(Error::invalid_layout("schema scope without a schema id")),
			_ => Ok(None),
		}
	}

	fn layout(&self) -> Result<Layout> {
		self.frame.cursor.layout.clone().ok_or_else(|| Error::invalid_state("schema scope without a layout"))
	}

	fn name<'p>(&self, path: Path<'p>) -> Result<&'p str> {
		match path {
			Path::Name(name) => Ok(name),
			other => Err(self.addressing(other)),
		}
	}

	fn writable(&self, path: &dyn Display) -> Result<()> {
		if self.frame.cursor.immutable && !self.frame.creating {
			return Err(Error::InsufficientPermissions {
				path: path.to_string(),
			});
		}
		Ok(())
	}

	fn replaceable(&self, item: &Item) -> Result<()> {
		if item.code().is_immutable() && !self.frame.creating {
			return Err(Error::InsufficientPermissions {
				path: item.describe(),
			});
		}
		Ok(())
	}

	fn unsupported(&self, mode: impl Display) -> Error {
		Error::UnsupportedMode {
			mode: mode.to_string(),
			scope: self.frame.cursor.kind.to_string(),
		}
	}

	fn addressing(&self, path: Path<'_>) -> Error {
		Error::invalid_state(format!("{} scopes cannot address '{path}'", self.frame.cursor.kind))
	}
}

/// `type_arg` must accept a value written as `given`; mutability of the
/// outermost scope is the declaration's to decide.
fn conforms(expected: &TypeArgument, given: &TypeArgument) -> Result<()> {
	let base = |code: LayoutCode| code.scope_kind().map(LayoutCode::scope).unwrap_or(code);
	if base(expected.code) == base(given.code) && expected.args == given.args {
		return Ok(());
	}
	Err(Error::TypeMismatch {
		expected: expected.code,
		actual: given.code,
	})
}

fn item_bytes(type_arg: &TypeArgument, coded: bool, body: &[u8]) -> Vec<u8> {
	let mut bytes = Vec::with_capacity(body.len() + 2);
	if coded {
		type_arg.encode(&mut bytes);
	}
	bytes.extend_from_slice(body);
	bytes
}

fn scope_body(content: &[u8]) -> Result<Vec<u8>> {
	let length = u32::try_from(content.len())
		.map_err(|_| Error::invalid_state(format!("scope of {} bytes exceeds u32", content.len())))?;
	let mut body = Vec::with_capacity(content.len() + 4);
	body.extend_from_slice(&length.to_le_bytes());
	body.extend_from_slice(content);
	Ok(body)
}

#[cfg(test)]
mod tests {
	use hybridrow_type::SchemaId;

	use super::*;
	use crate::{
		buffer::HEADER_SIZE,
		layout::LayoutBuilder,
		reader::{RowReader, validate_row},
		resolver::LayoutResolverNamespace,
	};

	fn setup() -> (LayoutResolverNamespace, Layout, RowBuffer) {
		let int32 = || TypeArgument::scalar(LayoutCode::Int32);
		let resolver = LayoutResolverNamespace::default();
		let layout = resolver
			.register(
				LayoutBuilder::new("w")
					.add_fixed_column("x", LayoutCode::Int32)
					.add_fixed_column("flag", LayoutCode::Boolean)
					.add_variable_column("a", LayoutCode::Utf8)
					.add_variable_column("b", LayoutCode::Utf8)
					.add_sparse_column("list", TypeArgument::typed_array(int32()))
					.add_sparse_column("obj", TypeArgument::object())
					.add_sparse_column("set", TypeArgument::typed_set(int32()))
					.add_sparse_column("pairs", TypeArgument::set())
					.add_sparse_column("map", TypeArgument::typed_map(TypeArgument::scalar(LayoutCode::Utf8), int32()))
					.add_sparse_column("opt", TypeArgument::nullable(int32()))
					.add_sparse_column("tag", TypeArgument::tagged(TypeArgument::scalar(LayoutCode::Utf8)))
					.add_sparse_column("frozen", TypeArgument::typed_array(int32()).immutable())
					.build(SchemaId(7))
					.unwrap(),
			)
			.unwrap();
		let buffer = RowBuffer::new_row(&layout, &RowConfig::default()).unwrap();
		(resolver, layout, buffer)
	}

	fn seek(reader: &mut RowReader<'_>, name: &str) {
		while reader.read().unwrap() {
			if reader.path() == Some(name) {
				return;
			}
		}
		panic!("'{name}' not found");
	}

	fn ints(buffer: &RowBuffer, resolver: &LayoutResolverNamespace, name: &str) -> Vec<i32> {
		let mut reader = RowReader::new(buffer, resolver).unwrap();
		seek(&mut reader, name);
		let mut out = Vec::new();
		reader
			.read_scope(&mut out, |r, out| {
				while r.read()? {
					out.push(r.read_int32()?);
				}
				Ok(())
			})
			.unwrap();
		out
	}

	fn int_array() -> TypeArgument {
		TypeArgument::typed_array(TypeArgument::scalar(LayoutCode::Int32))
	}

	mod schema {
		use super::*;

		#[test]
		fn test_fixed_modes() {
			let (resolver, _, mut buffer) = setup();
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			writer.write_scalar("x", &Value::Int32(1), UpdateMode::Insert).unwrap();
			assert_eq!(writer.write_scalar("x", &Value::Int32(2), UpdateMode::Insert), Err(Error::exists("x")));
			assert_eq!(
				writer.write_scalar("flag", &Value::Boolean(true), UpdateMode::Update),
				Err(Error::not_found("flag"))
			);
			writer.write_scalar("x", &Value::Int32(7), UpdateMode::Upsert).unwrap();

			let mut reader = RowReader::new(&buffer, &resolver).unwrap();
			assert!(reader.read().unwrap());
			assert_eq!(reader.path(), Some("x"));
			assert_eq!(reader.read_int32().unwrap(), 7);
			assert!(!reader.read().unwrap());
		}

		#[test]
		fn test_variable_cells_keep_order() {
			let (resolver, layout, mut buffer) = setup();
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			writer.write_scalar("b", &Value::utf8("bb"), UpdateMode::Insert).unwrap();
			writer.write_scalar("a", &Value::utf8("a"), UpdateMode::Insert).unwrap();
			writer.write_scalar("b", &Value::utf8("bbbb"), UpdateMode::Update).unwrap();
			assert_eq!(buffer.len(), HEADER_SIZE + layout.size() + 2 + 5);

			let mut reader = RowReader::new(&buffer, &resolver).unwrap();
			assert!(reader.read().unwrap());
			assert_eq!(reader.read_utf8().unwrap(), "a");
			assert!(reader.read().unwrap());
			assert_eq!(reader.read_utf8().unwrap(), "bbbb");
			assert!(!reader.read().unwrap());
		}

		#[test]
		fn test_type_mismatch() {
			let (resolver, _, mut buffer) = setup();
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			assert_eq!(
				writer.write_scalar("x", &Value::Int64(1), UpdateMode::Upsert),
				Err(Error::TypeMismatch {
					expected: LayoutCode::Int32,
					actual: LayoutCode::Int64,
				})
			);
			assert!(matches!(
				writer.write_scope("list", &TypeArgument::array(), UpdateMode::Upsert, |_| Ok(())),
				Err(Error::TypeMismatch { .. })
			));
		}

		#[test]
		fn test_unknown_column() {
			let (resolver, _, mut buffer) = setup();
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			assert!(matches!(
				writer.write_scalar("missing", &Value::Int32(1), UpdateMode::Upsert),
				Err(Error::ColumnNotFound { .. })
			));
			assert!(matches!(writer.delete("missing"), Err(Error::ColumnNotFound { .. })));
		}

		#[test]
		fn test_delete_columns() {
			let (resolver, layout, mut buffer) = setup();
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			writer.write_scalar("x", &Value::Int32(9), UpdateMode::Insert).unwrap();
			writer.write_scalar("a", &Value::utf8("gone"), UpdateMode::Insert).unwrap();
			writer.delete("x").unwrap();
			writer.delete("a").unwrap();
			assert_eq!(writer.delete("x"), Err(Error::not_found("x")));
			assert_eq!(buffer.len(), HEADER_SIZE + layout.size());

			let mut reader = RowReader::new(&buffer, &resolver).unwrap();
			assert!(!reader.read().unwrap());
		}

		#[test]
		fn test_upsert_is_idempotent() {
			let (resolver, _, mut buffer) = setup();
			let write = |buffer: &mut RowBuffer| {
				let mut writer = RowWriter::new(buffer, &resolver).unwrap();
				writer.write_scalar("a", &Value::utf8("same"), UpdateMode::Upsert).unwrap();
				writer
					.write_scope("list", &int_array(), UpdateMode::Upsert, |w| {
						w.write_scalar(Path::Append, &Value::Int32(1), UpdateMode::Insert)
					})
					.unwrap();
			};
			write(&mut buffer);
			let first = buffer.to_vec();
			write(&mut buffer);
			assert_eq!(buffer.to_vec(), first);
		}
	}

	mod indexed {
		use super::*;

		#[test]
		fn test_array_modes() {
			let (resolver, _, mut buffer) = setup();
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			writer
				.write_scope("list", &int_array(), UpdateMode::Insert, |w| {
					w.write_scalar(Path::Append, &Value::Int32(1), UpdateMode::Insert)?;
					w.write_scalar(Path::Append, &Value::Int32(2), UpdateMode::Insert)?;
					assert!(matches!(
						w.write_scalar(Path::Index(0), &Value::Int32(9), UpdateMode::Insert),
						Err(Error::Exists { .. })
					));
					w.write_scalar(Path::Index(0), &Value::Int32(0), UpdateMode::InsertAt)?;
					assert!(matches!(
						w.write_scalar(Path::Index(5), &Value::Int32(9), UpdateMode::Update),
						Err(Error::NotFound { .. })
					));
					w.write_scalar(Path::Index(3), &Value::Int32(3), UpdateMode::Upsert)?;
					assert_eq!(w.count()?, 4);
					Ok(())
				})
				.unwrap();
			assert_eq!(ints(&buffer, &resolver, "list"), vec![0, 1, 2, 3]);
		}

		#[test]
		fn test_growth_updates_enclosing_scopes() {
			let (resolver, _, mut buffer) = setup();
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			writer
				.write_scope("obj", &TypeArgument::object(), UpdateMode::Insert, |w| {
					w.write_scope("inner", &TypeArgument::array(), UpdateMode::Insert, |w| {
						w.write_scalar(Path::Append, &Value::Int8(1), UpdateMode::Insert)
					})?;
					w.write_scalar("after", &Value::Int32(5), UpdateMode::Insert)
				})
				.unwrap();
			writer.write_scalar("x", &Value::Int32(1), UpdateMode::Insert).unwrap();

			writer
				.update_scope("obj", |w| {
					w.update_scope("inner", |w| {
						w.write_scalar(Path::Append, &Value::utf8("a longer value"), UpdateMode::Insert)?;
						w.delete(Path::Index(0))
					})
				})
				.unwrap();
			validate_row(&buffer, &resolver).unwrap();

			let mut reader = RowReader::new(&buffer, &resolver).unwrap();
			seek(&mut reader, "obj");
			let mut seen = Vec::new();
			reader
				.read_scope(&mut seen, |r, seen| {
					assert!(r.read()?);
					r.read_scope(seen, |r, seen| {
						while r.read()? {
							seen.push(r.read_value()?.to_string());
						}
						Ok(())
					})?;
					assert!(r.read()?);
					seen.push(r.read_int32()?.to_string());
					Ok(())
				})
				.unwrap();
			assert_eq!(seen.len(), 2);
			assert_eq!(seen[1], "5");
			assert_eq!(reader.position(), buffer.len());
		}

		#[test]
		fn test_tagged_arity() {
			let (resolver, _, mut buffer) = setup();
			let tagged = TypeArgument::tagged(TypeArgument::scalar(LayoutCode::Utf8));
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			assert_eq!(
				writer.write_scope("tag", &tagged, UpdateMode::Insert, |w| {
					w.write_scalar(Path::Append, &Value::UInt8(1), UpdateMode::Insert)
				}),
				Err(Error::ArityMismatch {
					expected: 2,
					actual: 1,
				})
			);
			writer
				.write_scope("tag", &tagged, UpdateMode::Upsert, |w| {
					assert!(matches!(
						w.write_scalar(Path::Append, &Value::Int32(1), UpdateMode::Insert),
						Err(Error::TypeMismatch { .. })
					));
					w.write_scalar(Path::Append, &Value::UInt8(1), UpdateMode::Insert)?;
					w.write_scalar(Path::Append, &Value::utf8("v"), UpdateMode::Insert)?;
					assert_eq!(
						w.write_scalar(Path::Append, &Value::utf8("w"), UpdateMode::Insert),
						Err(Error::ArityMismatch {
							expected: 2,
							actual: 3,
						})
					);
					assert!(matches!(w.delete(Path::Index(0)), Err(Error::UnsupportedMode { .. })));
					Ok(())
				})
				.unwrap();
			validate_row(&buffer, &resolver).unwrap();
		}

		#[test]
		fn test_depth_limit() {
			let (resolver, _, mut buffer) = setup();
			let empty = buffer.to_vec();
			let config = RowConfig::default().with_max_depth(2);
			let mut writer = RowWriter::with_config(&mut buffer, &resolver, &config).unwrap();
			let result = writer.write_scope("obj", &TypeArgument::object(), UpdateMode::Insert, |w| {
				w.write_scope("inner", &TypeArgument::object(), UpdateMode::Insert, |_| Ok(()))
			});
			assert_eq!(
				result,
				Err(Error::ScopeDepthExceeded {
					depth: 2
				})
			);
			assert_eq!(writer.depth(), 0);
			assert_eq!(buffer.to_vec(), empty);
		}
	}

	mod rollback {
		use std::sync::{
			Arc,
			atomic::{AtomicBool, Ordering},
		};

		use super::*;
		use crate::buffer::Resizer;

		/// Grows to exactly the requested size once, then drops the storage.
		#[derive(Debug, Default)]
		struct Exhausted(AtomicBool);

		impl Resizer for Exhausted {
			fn resize(&self, minimum: usize, mut existing: Vec<u8>) -> Vec<u8> {
				if self.0.swap(true, Ordering::Relaxed) {
					return Vec::new();
				}
				existing.resize(minimum, 0);
				existing
			}
		}

		#[test]
		fn test_lost_buffer_reports_resize_failure() {
			let (resolver, layout, _) = setup();
			let mut buffer = RowBuffer::with_resizer(HEADER_SIZE + layout.size(), Arc::new(Exhausted::default()));
			buffer.init_layout(RowConfig::default().version, &layout).unwrap();

			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			let result = writer.write_scope("list", &int_array(), UpdateMode::Insert, |w| {
				w.write_scalar(Path::Append, &Value::Int32(1), UpdateMode::Insert)
			});
			assert!(matches!(result, Err(Error::ResizeFailed { .. })));
			assert!(buffer.is_poisoned());
		}

		#[test]
		fn test_failed_builder_removes_scope() {
			let (resolver, _, mut buffer) = setup();
			let empty = buffer.to_vec();
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			let result = writer.write_scope("list", &int_array(), UpdateMode::Insert, |w| {
				w.write_scalar(Path::Append, &Value::Int32(1), UpdateMode::Insert)?;
				w.write_scalar(Path::Append, &Value::Int64(2), UpdateMode::Insert)
			});
			assert!(matches!(result, Err(Error::TypeMismatch { .. })));
			assert_eq!(writer.depth(), 0);
			assert_eq!(buffer.to_vec(), empty);
		}

		#[test]
		fn test_short_fixed_arity_scope_is_removed() {
			let (resolver, _, mut buffer) = setup();
			let tagged = TypeArgument::tagged(TypeArgument::scalar(LayoutCode::Utf8));
			let empty = buffer.to_vec();
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			assert_eq!(
				writer.write_scope("tag", &tagged, UpdateMode::Insert, |w| {
					w.write_scalar(Path::Append, &Value::UInt8(1), UpdateMode::Insert)
				}),
				Err(Error::ArityMismatch {
					expected: 2,
					actual: 1,
				})
			);
			assert_eq!(buffer.to_vec(), empty);
			assert_eq!(validate_row(&buffer, &resolver).unwrap().scopes, 0);
		}

		#[test]
		fn test_failed_upsert_restores_previous_scope() {
			let (resolver, _, mut buffer) = setup();
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			writer
				.write_scope("list", &int_array(), UpdateMode::Insert, |w| {
					w.write_scalar(Path::Append, &Value::Int32(1), UpdateMode::Insert)?;
					w.write_scalar(Path::Append, &Value::Int32(2), UpdateMode::Insert)
				})
				.unwrap();
			writer.write_scalar("a", &Value::utf8("after"), UpdateMode::Insert).unwrap();
			let before = writer.buffer().to_vec();

			let result = writer.write_scope("list", &int_array(), UpdateMode::Upsert, |w| {
				w.write_scalar(Path::Append, &Value::Int32(9), UpdateMode::Insert)?;
				w.write_scalar(Path::Index(4), &Value::Int32(9), UpdateMode::Update)
			});
			assert!(matches!(result, Err(Error::NotFound { .. })));
			assert_eq!(buffer.to_vec(), before);
			assert_eq!(ints(&buffer, &resolver, "list"), vec![1, 2]);
		}

		#[test]
		fn test_nested_failure_keeps_enclosing_scope() {
			let (resolver, _, mut buffer) = setup();
			let tagged = TypeArgument::tagged(TypeArgument::scalar(LayoutCode::Utf8));
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			writer
				.write_scope("obj", &TypeArgument::object(), UpdateMode::Insert, |w| {
					w.write_scalar("v", &Value::Int32(1), UpdateMode::Insert)?;
					let failed = w.write_scope("t", &tagged, UpdateMode::Insert, |_| Ok(()));
					assert_eq!(
						failed,
						Err(Error::ArityMismatch {
							expected: 2,
							actual: 0,
						})
					);
					assert_eq!(w.count()?, 1);
					Ok(())
				})
				.unwrap();
			let report = validate_row(&buffer, &resolver).unwrap();
			assert_eq!((report.scalars, report.scopes), (1, 1));
		}

		#[test]
		fn test_failed_entry_scope_is_removed() {
			let (resolver, _, mut buffer) = setup();
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			writer
				.write_scope("obj", &TypeArgument::object(), UpdateMode::Insert, |w| {
					w.write_scope("m", &TypeArgument::map(), UpdateMode::Insert, |w| {
						let failed = w.write_entry_scope(&Value::utf8("k"), &int_array(), UpdateMode::Insert, |w| {
							w.write_scalar(Path::Append, &Value::utf8("no"), UpdateMode::Insert)
						});
						assert!(matches!(failed, Err(Error::TypeMismatch { .. })));
						assert_eq!(w.count()?, 0);
						Ok(())
					})
				})
				.unwrap();
			assert_eq!(validate_row(&buffer, &resolver).unwrap().scopes, 2);
		}
	}

	mod tuple {
		use super::*;

		fn values(buffer: &RowBuffer, resolver: &LayoutResolverNamespace, name: &str) -> Vec<Value> {
			let mut reader = RowReader::new(buffer, resolver).unwrap();
			seek(&mut reader, "obj");
			let mut out = Vec::new();
			reader
				.read_scope(&mut out, |r, out| {
					while r.read()? {
						if r.path() == Some(name) {
							r.read_scope(out, |r, out| {
								while r.read()? {
									out.push(r.read_value()?);
								}
								Ok(())
							})?;
						}
					}
					Ok(())
				})
				.unwrap();
			out
		}

		fn in_object<F>(buffer: &mut RowBuffer, resolver: &LayoutResolverNamespace, f: F)
		where
			F: FnOnce(&mut RowWriter<'_>) -> Result<()>,
		{
			RowWriter::new(buffer, resolver)
				.unwrap()
				.write_scope("obj", &TypeArgument::object(), UpdateMode::Insert, f)
				.unwrap();
		}

		#[test]
		fn test_declared_tuple_is_fixed() {
			let (resolver, _, mut buffer) = setup();
			let pair = TypeArgument::tuple(vec![
				TypeArgument::scalar(LayoutCode::Int32),
				TypeArgument::scalar(LayoutCode::Utf8),
			]);
			in_object(&mut buffer, &resolver, |w| {
				w.write_scope("pair", &pair, UpdateMode::Insert, |w| {
					w.write_scalar(Path::Append, &Value::Int32(1), UpdateMode::Insert)?;
					assert!(matches!(
						w.write_scalar(Path::Append, &Value::Int64(2), UpdateMode::Insert),
						Err(Error::TypeMismatch { .. })
					));
					w.write_scalar(Path::Append, &Value::utf8("a"), UpdateMode::Insert)?;
					assert!(matches!(
						w.write_scalar(Path::Index(0), &Value::Int32(9), UpdateMode::InsertAt),
						Err(Error::UnsupportedMode { .. })
					));
					assert_eq!(
						w.write_scalar(Path::Append, &Value::Int64(7), UpdateMode::Insert),
						Err(Error::ArityMismatch {
							expected: 2,
							actual: 3,
						})
					);
					Ok(())
				})?;
				assert!(matches!(
					w.write_scope("short", &pair, UpdateMode::Insert, |w| {
						w.write_scalar(Path::Append, &Value::Int32(1), UpdateMode::Insert)
					}),
					Err(Error::ArityMismatch { .. })
				));
				Ok(())
			});
			assert_eq!(values(&buffer, &resolver, "pair"), vec![Value::Int32(1), Value::utf8("a")]);
			assert!(values(&buffer, &resolver, "short").is_empty());
			validate_row(&buffer, &resolver).unwrap();
		}

		#[test]
		fn test_untyped_tuple_shifts() {
			let (resolver, _, mut buffer) = setup();
			in_object(&mut buffer, &resolver, |w| {
				w.write_scope("any", &TypeArgument::tuple(vec![]), UpdateMode::Insert, |w| {
					w.write_scalar(Path::Append, &Value::Int32(1), UpdateMode::Insert)?;
					w.write_scalar(Path::Append, &Value::utf8("a"), UpdateMode::Insert)?;
					w.write_scalar(Path::Index(0), &Value::Boolean(true), UpdateMode::InsertAt)
				})
			});
			assert_eq!(
				values(&buffer, &resolver, "any"),
				vec![Value::Boolean(true), Value::Int32(1), Value::utf8("a")]
			);
		}

		#[test]
		fn test_tagged2() {
			let (resolver, _, mut buffer) = setup();
			let tagged2 =
				TypeArgument::tagged2(TypeArgument::scalar(LayoutCode::Utf8), TypeArgument::scalar(LayoutCode::Int64));
			in_object(&mut buffer, &resolver, |w| {
				w.write_scope("t2", &tagged2, UpdateMode::Insert, |w| {
					w.write_scalar(Path::Append, &Value::UInt8(3), UpdateMode::Insert)?;
					w.write_scalar(Path::Append, &Value::utf8("k"), UpdateMode::Insert)?;
					assert!(matches!(
						w.write_scalar(Path::Index(1), &Value::utf8("j"), UpdateMode::InsertAt),
						Err(Error::UnsupportedMode { .. })
					));
					w.write_scalar(Path::Append, &Value::Int64(-9), UpdateMode::Insert)
				})
			});
			assert_eq!(
				values(&buffer, &resolver, "t2"),
				vec![Value::UInt8(3), Value::utf8("k"), Value::Int64(-9)]
			);
			validate_row(&buffer, &resolver).unwrap();
		}

		#[test]
		fn test_untyped_map_entry_is_a_pair() {
			let (resolver, _, mut buffer) = setup();
			in_object(&mut buffer, &resolver, |w| {
				w.write_scope("m", &TypeArgument::map(), UpdateMode::Insert, |w| {
					w.write_entry(&Value::utf8("k"), &Value::Int32(1), UpdateMode::Insert)?;
					assert_eq!(
						w.update_scope(Path::Index(0), |w| {
							w.write_scalar(Path::Append, &Value::Int32(2), UpdateMode::Insert)
						}),
						Err(Error::ArityMismatch {
							expected: 2,
							actual: 3,
						})
					);
					assert!(matches!(
						w.update_scope(Path::Index(0), |w| {
							w.write_scalar(Path::Index(0), &Value::Int32(2), UpdateMode::InsertAt)
						}),
						Err(Error::UnsupportedMode { .. })
					));
					w.update_scope(Path::Index(0), |w| {
						w.write_scalar(Path::Index(1), &Value::Int32(5), UpdateMode::Upsert)
					})
				})
			});
			let report = validate_row(&buffer, &resolver).unwrap();
			assert_eq!((report.scalars, report.scopes), (2, 3));
		}
	}

	mod unique {
		use super::*;

		fn single(w: &mut RowWriter<'_>) -> Result<()> {
			w.write_scalar(Path::Append, &Value::Int32(1), UpdateMode::Insert)
		}

		#[test]
		fn test_scalar_set() {
			let (resolver, _, mut buffer) = setup();
			let set = TypeArgument::typed_set(TypeArgument::scalar(LayoutCode::Int32));
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			writer
				.write_scope("set", &set, UpdateMode::Insert, |w| {
					w.write_scalar(Path::Append, &Value::Int32(1), UpdateMode::Insert)?;
					w.write_scalar(Path::Append, &Value::Int32(2), UpdateMode::Insert)?;
					w.write_scalar(Path::Append, &Value::Int32(1), UpdateMode::Upsert)?;
					assert!(matches!(
						w.write_scalar(Path::Append, &Value::Int32(2), UpdateMode::Insert),
						Err(Error::Exists { .. })
					));
					assert!(matches!(
						w.write_scalar(Path::Append, &Value::Int32(3), UpdateMode::Update),
						Err(Error::NotFound { .. })
					));
					assert!(w.write_scalar(Path::Index(0), &Value::Int32(4), UpdateMode::Upsert).is_err());
					assert!(matches!(
						w.write_scalar(Path::Append, &Value::Int32(4), UpdateMode::InsertAt),
						Err(Error::UnsupportedMode { .. })
					));
					assert_eq!(w.count()?, 2);
					w.delete(Path::Index(0))
				})
				.unwrap();
			assert_eq!(ints(&buffer, &resolver, "set"), vec![2]);
		}

		#[test]
		fn test_set_of_scopes() {
			let (resolver, _, mut buffer) = setup();
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			writer
				.write_scope("pairs", &TypeArgument::set(), UpdateMode::Insert, |w| {
					w.write_scope(Path::Append, &int_array(), UpdateMode::Insert, single)?;
					w.write_scope(Path::Append, &int_array(), UpdateMode::Upsert, single)?;
					assert_eq!(w.count()?, 1);
					assert!(matches!(
						w.write_scope(Path::Append, &int_array(), UpdateMode::Insert, single),
						Err(Error::Exists { .. })
					));
					w.write_scope(Path::Append, &int_array(), UpdateMode::Insert, |_| Ok(()))?;
					assert_eq!(w.count()?, 2);
					assert!(matches!(w.update_scope(Path::Index(0), |_| Ok(())), Err(Error::UnsupportedMode { .. })));
					Ok(())
				})
				.unwrap();
			validate_row(&buffer, &resolver).unwrap();
		}
	}

	mod map {
		use super::*;

		#[test]
		fn test_typed_map_entries() {
			let (resolver, _, mut buffer) = setup();
			let map = TypeArgument::typed_map(
				TypeArgument::scalar(LayoutCode::Utf8),
				TypeArgument::scalar(LayoutCode::Int32),
			);
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			writer
				.write_scope("map", &map, UpdateMode::Insert, |w| {
					w.write_entry(&Value::utf8("a"), &Value::Int32(1), UpdateMode::Insert)?;
					w.write_entry(&Value::utf8("b"), &Value::Int32(2), UpdateMode::Insert)?;
					assert!(matches!(
						w.write_entry(&Value::utf8("a"), &Value::Int32(3), UpdateMode::Insert),
						Err(Error::Exists { .. })
					));
					w.write_entry(&Value::utf8("a"), &Value::Int32(3), UpdateMode::Upsert)?;
					assert!(matches!(
						w.write_entry(&Value::Int32(1), &Value::Int32(3), UpdateMode::Upsert),
						Err(Error::TypeMismatch { .. })
					));
					assert!(matches!(
						w.write_scalar(Path::Append, &Value::Int32(1), UpdateMode::Upsert),
						Err(Error::UnsupportedMode { .. })
					));
					w.delete_entry(&Value::utf8("b"))?;
					assert!(matches!(w.delete_entry(&Value::utf8("b")), Err(Error::NotFound { .. })));
					assert_eq!(w.count()?, 1);
					Ok(())
				})
				.unwrap();

			let mut reader = RowReader::new(&buffer, &resolver).unwrap();
			seek(&mut reader, "map");
			let mut entries = Vec::new();
			reader
				.read_scope(&mut entries, |r, entries| {
					while r.read()? {
						r.read_scope(entries, |r, entries| {
							assert!(r.read()?);
							let key = r.read_utf8()?.to_string();
							assert!(r.read()?);
							entries.push((key, r.read_int32()?));
							Ok(())
						})?;
					}
					Ok(())
				})
				.unwrap();
			assert_eq!(entries, vec![("a".to_string(), 3)]);
		}

		#[test]
		fn test_entry_scope_in_untyped_map() {
			let (resolver, _, mut buffer) = setup();
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			writer
				.write_scope("obj", &TypeArgument::object(), UpdateMode::Insert, |w| {
					w.write_scope("m", &TypeArgument::map(), UpdateMode::Insert, |w| {
						w.write_entry_scope(&Value::utf8("k"), &int_array(), UpdateMode::Insert, |w| {
							w.write_scalar(Path::Append, &Value::Int32(4), UpdateMode::Insert)?;
							w.write_scalar(Path::Append, &Value::Int32(5), UpdateMode::Insert)
						})?;
						w.write_entry(&Value::Int64(2), &Value::Boolean(false), UpdateMode::Insert)?;
						assert_eq!(w.count()?, 2);
						Ok(())
					})
				})
				.unwrap();
			assert_eq!(validate_row(&buffer, &resolver).unwrap().scopes, 5);
		}
	}

	mod nullable {
		use super::*;

		#[test]
		fn test_set_and_clear_value() {
			let (resolver, _, mut buffer) = setup();
			let opt = TypeArgument::nullable(TypeArgument::scalar(LayoutCode::Int32));
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			writer.write_scope("opt", &opt, UpdateMode::Insert, |_| Ok(())).unwrap();
			let empty = writer.buffer().len();

			writer
				.update_scope("opt", |w| {
					assert!(matches!(
						w.write_scalar(Path::Append, &Value::Int32(5), UpdateMode::Update),
						Err(Error::NotFound { .. })
					));
					w.write_scalar(Path::Append, &Value::Int32(5), UpdateMode::Insert)
				})
				.unwrap();
			assert_eq!(writer.buffer().len(), empty + 4);
			assert_eq!(ints(writer.buffer(), &resolver, "opt"), vec![5]);

			writer.update_scope("opt", |w| w.delete(Path::Index(0))).unwrap();
			assert_eq!(buffer.len(), empty);

			let mut reader = RowReader::new(&buffer, &resolver).unwrap();
			seek(&mut reader, "opt");
			assert!(!reader.has_value().unwrap());
		}
	}

	mod immutable {
		use super::*;

		#[test]
		fn test_created_scope_is_populated_once() {
			let (resolver, _, mut buffer) = setup();
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			writer
				.write_scope("frozen", &int_array(), UpdateMode::Insert, |w| {
					w.write_scalar(Path::Append, &Value::Int32(1), UpdateMode::Insert)
				})
				.unwrap();

			assert!(matches!(
				writer.update_scope("frozen", |w| w.write_scalar(Path::Append, &Value::Int32(2), UpdateMode::Insert)),
				Err(Error::InsufficientPermissions { .. })
			));
			assert!(matches!(
				writer.write_scope("frozen", &int_array(), UpdateMode::Upsert, |_| Ok(())),
				Err(Error::InsufficientPermissions { .. })
			));
			assert!(matches!(writer.delete("frozen"), Err(Error::InsufficientPermissions { .. })));
			assert_eq!(ints(&buffer, &resolver, "frozen"), vec![1]);
		}

		#[test]
		fn test_immutable_object_children() {
			let (resolver, _, mut buffer) = setup();
			let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
			writer
				.write_scope("obj", &TypeArgument::object(), UpdateMode::Insert, |w| {
					w.write_scope("inner", &TypeArgument::object().immutable(), UpdateMode::Insert, |w| {
						w.write_scalar("v", &Value::Int32(1), UpdateMode::Insert)
					})
				})
				.unwrap();

			writer
				.update_scope("obj", |w| {
					assert!(matches!(w.update_scope("inner", |_| Ok(())), Err(Error::InsufficientPermissions { .. })));
					assert!(matches!(w.delete("inner"), Err(Error::InsufficientPermissions { .. })));
					w.write_scalar("v2", &Value::Int32(2), UpdateMode::Insert)
				})
				.unwrap();
			validate_row(&buffer, &resolver).unwrap();
		}
	}
}
