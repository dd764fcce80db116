// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod builder;
mod column;
pub mod system;

use std::{ops::Deref, sync::Arc};

pub use builder::LayoutBuilder;
pub use column::{FixedColumn, LayoutColumn, SparseColumn, VariableColumn};
use hybridrow_hash::{Hash128, Murmur128};
use hybridrow_type::SchemaId;

/// The compiled, immutable plan of a schematized region:
/// `[fixed columns][presence bitmap][variable cells][sparse items]`.
///
/// Cloning is cheap; all clones share the same plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout(Arc<LayoutInner>);

impl Deref for Layout {
	type Target = LayoutInner;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

#[derive(Debug, PartialEq, Eq)]
pub struct LayoutInner {
	pub name: String,
	pub schema_id: SchemaId,
	pub fixed: Vec<FixedColumn>,
	pub variable: Vec<VariableColumn>,
	pub sparse: Vec<SparseColumn>,
	/// size of the fixed region in bytes, padded to its widest alignment
	pub fixed_size: usize,
	/// size of the presence bitmap in bytes
	pub bitmap_size: usize,
	pub fingerprint: Hash128,
}

impl LayoutInner {
	/// Bytes occupied by the fixed region and presence bitmap.
	pub const fn size(&self) -> usize {
		self.fixed_size + self.bitmap_size
	}

	/// Offset of the presence bitmap relative to the region start.
	pub const fn bitmap_offset(&self) -> usize {
		self.fixed_size
	}

	pub fn find(&self, name: &str) -> Option<LayoutColumn<'_>> {
		if let Some(column) = self.fixed.iter().find(|c| c.name == name) {
			return Some(LayoutColumn::Fixed(column));
		}
		if let Some(column) = self.variable.iter().find(|c| c.name == name) {
			return Some(LayoutColumn::Variable(column));
		}
		self.sparse.iter().find(|c| c.name == name).map(LayoutColumn::Sparse)
	}

	pub fn column_count(&self) -> usize {
		self.fixed.len() + self.variable.len() + self.sparse.len()
	}
}

fn align_up(offset: usize, align: usize) -> usize {
	(offset + align).saturating_sub(1) & !(align.saturating_sub(1))
}

fn fingerprint(
	name: &str,
	schema_id: SchemaId,
	fixed: &[FixedColumn],
	variable: &[VariableColumn],
	sparse: &[SparseColumn],
) -> Hash128 {
	let mut hash = name.murmur128(Hash128::ZERO);
	hash = schema_id.id().murmur128(hash);

	for column in fixed {
		hash = column.name.murmur128(hash);
		hash = column.code.to_u8().murmur128(hash);
		hash = (column.offset as u64).murmur128(hash);
		hash = (column.presence_bit as u64).murmur128(hash);
	}
	for column in variable {
		hash = column.name.murmur128(hash);
		hash = column.code.to_u8().murmur128(hash);
		hash = (column.index as u64).murmur128(hash);
	}
	for column in sparse {
		let mut type_arg = Vec::new();
		column.type_arg.encode(&mut type_arg);
		hash = column.name.murmur128(hash);
		hash = type_arg.as_slice().murmur128(hash);
	}
	hash
}
