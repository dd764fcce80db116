// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod resizer;

use std::{fmt, mem, sync::Arc};

use hybridrow_type::{
	Error, FixedValue, HybridRowVersion, Result, SchemaId,
	util::varint::encode_varuint,
	value::decode_length_prefixed,
};
pub use resizer::{MemoryResizer, Resizer};
use tracing::{debug, trace, warn};

use crate::{config::RowConfig, layout::Layout};

/// Size of the row header: `[version: u8][schema_id: i32]`.
pub const HEADER_SIZE: usize = 1 + SchemaId::SIZE;

/// Growable byte storage for a single row.
///
/// `storage.len()` is the capacity; only the first `length` bytes are row
/// content. Bytes beyond `length` are always zero.
///
/// A resize that hands back fewer bytes than the row held poisons the buffer:
/// every access fails until [`RowBuffer::init_layout`] starts a new row.
pub struct RowBuffer {
	storage: Vec<u8>,
	length: usize,
	high_water: usize,
	poisoned: bool,
	resizer: Arc<dyn Resizer>,
}

impl fmt::Debug for RowBuffer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RowBuffer")
			.field("length", &self.length)
			.field("capacity", &self.storage.len())
			.field("high_water", &self.high_water)
			.field("poisoned", &self.poisoned)
			.finish()
	}
}

impl Clone for RowBuffer {
	fn clone(&self) -> Self {
		Self {
			storage: self.as_slice().to_vec(),
			length: self.length,
			high_water: self.length,
			poisoned: self.poisoned,
			resizer: self.resizer.clone(),
		}
	}
}

impl PartialEq for RowBuffer {
	fn eq(&self, other: &Self) -> bool {
		self.as_slice() == other.as_slice()
	}
}

impl Eq for RowBuffer {}

impl Default for RowBuffer {
	fn default() -> Self {
		Self::with_capacity(0)
	}
}

impl RowBuffer {
	pub fn with_capacity(capacity: usize) -> Self {
		Self::with_resizer(capacity, Arc::new(MemoryResizer))
	}

	pub fn with_resizer(capacity: usize, resizer: Arc<dyn Resizer>) -> Self {
		Self {
			storage: vec![0; capacity],
			length: 0,
			high_water: 0,
			poisoned: false,
			resizer,
		}
	}

	/// Wraps existing row bytes; the whole vector is row content.
	pub fn from_bytes(bytes: Vec<u8>) -> Self {
		let length = bytes.len();
		Self {
			storage: bytes,
			length,
			high_water: length,
			poisoned: false,
			resizer: Arc::new(MemoryResizer),
		}
	}

	/// Allocates a buffer holding an empty row of `layout`.
	pub fn new_row(layout: &Layout, config: &RowConfig) -> Result<Self> {
		let mut buffer = Self::with_capacity(config.initial_capacity);
		buffer.init_layout(config.version, layout)?;
		Ok(buffer)
	}

	pub fn len(&self) -> usize {
		self.length
	}

	pub fn is_empty(&self) -> bool {
		self.length == 0
	}

	pub fn capacity(&self) -> usize {
		self.storage.len()
	}

	/// The largest length this buffer has reached.
	pub fn high_water_mark(&self) -> usize {
		self.high_water
	}

	/// True once a failed resize has lost row content.
	pub fn is_poisoned(&self) -> bool {
		self.poisoned
	}

	pub fn as_slice(&self) -> &[u8] {
		&self.storage[..self.length]
	}

	pub fn to_vec(&self) -> Vec<u8> {
		self.as_slice().to_vec()
	}

	pub fn into_bytes(mut self) -> Vec<u8> {
		self.storage.truncate(self.length);
		self.storage
	}

	#[inline]
	fn check(&self, offset: usize, length: usize) -> Result<()> {
		if self.poisoned {
			return Err(Error::invalid_state("row buffer lost its content in a failed resize"));
		}
		match offset.checked_add(length) {
			Some(end) if end <= self.length => Ok(()),
			_ => Err(Error::OutOfRange {
				offset,
				length,
				buffer_len: self.length,
			}),
		}
	}

	/// Grows the storage so that at least `minimum` bytes are addressable.
	///
	/// When the resizer returns less than `minimum` the call fails with
	/// [`Error::ResizeFailed`]. The row is left untouched if the returned
	/// storage still holds all of it; otherwise the buffer is poisoned.
	pub fn ensure_capacity(&mut self, minimum: usize) -> Result<()> {
		if self.storage.len() >= minimum {
			return Ok(());
		}

		let existing = mem::take(&mut self.storage);
		let previous = existing.len();
		let resized = self.resizer.resize(minimum, existing);
		debug!(previous, requested = minimum, capacity = resized.len(), "row buffer resized");

		if resized.len() < minimum {
			let returned = resized.len();
			self.storage = resized;
			if returned < self.length {
				warn!(length = self.length, returned, "row content lost in failed resize");
				self.storage.fill(0);
				self.length = 0;
				self.poisoned = true;
			}
			return Err(Error::ResizeFailed {
				requested: minimum,
				returned,
			});
		}
		self.storage = resized;
		Ok(())
	}

	fn set_length(&mut self, length: usize) {
		self.length = length;
		self.high_water = self.high_water.max(length);
	}

	/// Resets the buffer to an empty row of `layout`: header followed by a
	/// zeroed fixed region and presence bitmap.
	pub fn init_layout(&mut self, version: HybridRowVersion, layout: &Layout) -> Result<()> {
		if version == HybridRowVersion::Invalid {
			return Err(Error::malformed("cannot initialise a row with the invalid version"));
		}
		let length = HEADER_SIZE + layout.size();
		self.ensure_capacity(length)?;
		self.storage[..self.length.max(length)].fill(0);
		self.poisoned = false;
		self.set_length(length);
		self.storage[0] = version.to_u8();
		self.storage[1..HEADER_SIZE].copy_from_slice(&layout.schema_id.to_le_bytes());
		Ok(())
	}

	pub fn version(&self) -> Result<HybridRowVersion> {
		self.check(0, 1)?;
		HybridRowVersion::from_u8(self.storage[0])
	}

	pub fn schema_id(&self) -> Result<SchemaId> {
		self.read_fixed::<i32>(1).map(SchemaId)
	}

	pub fn header(&self) -> Result<(HybridRowVersion, SchemaId)> {
		Ok((self.version()?, self.schema_id()?))
	}

	pub fn bytes(&self, offset: usize, length: usize) -> Result<&[u8]> {
		self.check(offset, length)?;
		Ok(&self.storage[offset..offset + length])
	}

	/// Overwrites bytes in place without changing the length.
	pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
		self.check(offset, bytes.len())?;
		self.storage[offset..offset + bytes.len()].copy_from_slice(bytes);
		Ok(())
	}

	pub fn read_fixed<T: FixedValue>(&self, offset: usize) -> Result<T> {
		self.check(offset, T::SIZE)?;
		T::decode(&self.storage[offset..offset + T::SIZE])
	}

	pub fn write_fixed<T: FixedValue>(&mut self, offset: usize, value: T) -> Result<()> {
		self.check(offset, T::SIZE)?;
		value.encode(&mut self.storage[offset..offset + T::SIZE]);
		Ok(())
	}

	/// Reads the bytes of a length-prefixed cell at `offset`.
	pub fn read_variable(&self, offset: usize) -> Result<&[u8]> {
		decode_length_prefixed(self.as_slice(), offset).map(|(bytes, _)| bytes)
	}

	/// Total size of the length-prefixed cell at `offset`, prefix included.
	pub fn variable_len(&self, offset: usize) -> Result<usize> {
		decode_length_prefixed(self.as_slice(), offset).map(|(_, len)| len)
	}

	/// Replaces the length-prefixed cell at `offset`, shifting the bytes that
	/// follow by the change in size. Returns that change.
	pub fn write_variable(&mut self, offset: usize, bytes: &[u8]) -> Result<isize> {
		let existing = self.variable_len(offset)?;
		self.replace(offset, existing, &encode_cell(bytes))
	}

	/// Inserts a new length-prefixed cell at `offset`. Returns its size.
	pub fn insert_variable(&mut self, offset: usize, bytes: &[u8]) -> Result<usize> {
		let cell = encode_cell(bytes);
		self.replace(offset, 0, &cell)?;
		Ok(cell.len())
	}

	/// Makes room for `delta` zeroed bytes at `offset`, moving everything at or
	/// after `offset` towards the end.
	pub fn shift_right(&mut self, offset: usize, delta: usize) -> Result<()> {
		self.check(offset, 0)?;
		if delta == 0 {
			return Ok(());
		}
		let length = self.length.checked_add(delta).ok_or(Error::OutOfRange {
			offset,
			length: delta,
			buffer_len: self.length,
		})?;
		self.ensure_capacity(length)?;
		self.storage.copy_within(offset..self.length, offset + delta);
		self.storage[offset..offset + delta].fill(0);
		trace!(offset, delta, "shift right");
		self.set_length(length);
		Ok(())
	}

	/// Removes `delta` bytes at `offset`, moving everything after them back.
	pub fn shift_left(&mut self, offset: usize, delta: usize) -> Result<()> {
		self.check(offset, delta)?;
		if delta == 0 {
			return Ok(());
		}
		self.storage.copy_within(offset + delta..self.length, offset);
		let length = self.length - delta;
		self.storage[length..self.length].fill(0);
		trace!(offset, delta, "shift left");
		self.length = length;
		Ok(())
	}

	/// Replaces `old_len` bytes at `offset` with `bytes`, returning the change
	/// in buffer length.
	pub fn replace(&mut self, offset: usize, old_len: usize, bytes: &[u8]) -> Result<isize> {
		self.check(offset, old_len)?;
		let new_len = bytes.len();
		if new_len > old_len {
			self.shift_right(offset + old_len, new_len - old_len)?;
		} else if new_len < old_len {
			self.shift_left(offset + new_len, old_len - new_len)?;
		}
		self.storage[offset..offset + new_len].copy_from_slice(bytes);
		Ok(new_len as isize - old_len as isize)
	}

	pub fn presence_bit(&self, bitmap_offset: usize, bit: usize) -> Result<bool> {
		let byte = bitmap_offset + bit / 8;
		self.check(byte, 1)?;
		Ok(self.storage[byte] & (1 << (bit % 8)) != 0)
	}

	pub fn set_presence_bit(&mut self, bitmap_offset: usize, bit: usize, present: bool) -> Result<()> {
		let byte = bitmap_offset + bit / 8;
		self.check(byte, 1)?;
		if present {
			self.storage[byte] |= 1 << (bit % 8);
		} else {
			self.storage[byte] &= !(1 << (bit % 8));
		}
		Ok(())
	}
}

fn encode_cell(bytes: &[u8]) -> Vec<u8> {
	let mut cell = Vec::with_capacity(bytes.len() + 2);
	encode_varuint(bytes.len() as u64, &mut cell);
	cell.extend_from_slice(bytes);
	cell
}
