// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use hybridrow_hash::{Hash128, Murmur128};
use hybridrow_type::{Result, ScopeKind, Value};

use super::{RowReader, RowVisitor, visit_row};
use crate::{buffer::RowBuffer, resolver::LayoutResolver};

const SCOPE_END: u8 = 0xFF;

/// Folds the logical content of a row into a [`Hash128`].
///
/// Every item contributes its path, type and value body in traversal order,
/// so rows with the same content hash equally whatever their capacity.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowHasher {
	hash: Hash128,
}

impl RowHasher {
	pub fn with_seed(seed: Hash128) -> Self {
		Self {
			hash: seed,
		}
	}

	pub fn hash(buffer: &RowBuffer, resolver: &dyn LayoutResolver) -> Result<Hash128> {
		let mut reader = RowReader::new(buffer, resolver)?;
		let mut hasher = Self::default();
		hasher.hash = buffer.schema_id()?.id().murmur128(hasher.hash);
		visit_row(&mut reader, &mut hasher)?;
		Ok(hasher.finish())
	}

	pub fn finish(&self) -> Hash128 {
		self.hash
	}

	fn item(&mut self, reader: &RowReader<'_>) {
		if let Some(item) = reader.current() {
			let mut type_arg = Vec::new();
			item.type_arg.encode(&mut type_arg);
			self.hash = item.describe().murmur128(self.hash);
			self.hash = type_arg.as_slice().murmur128(self.hash);
		}
	}
}

impl RowVisitor for RowHasher {
	fn visit_scalar(&mut self, reader: &RowReader<'_>, value: Value) -> Result<()> {
		self.item(reader);
		self.hash = value.to_bytes().as_slice().murmur128(self.hash);
		Ok(())
	}

	fn enter_scope(&mut self, reader: &RowReader<'_>, _kind: ScopeKind) -> Result<()> {
		self.item(reader);
		Ok(())
	}

	fn exit_scope(&mut self, _reader: &RowReader<'_>, _kind: ScopeKind) -> Result<()> {
		self.hash = SCOPE_END.murmur128(self.hash);
		Ok(())
	}

	fn visit_empty_nullable(&mut self, reader: &RowReader<'_>) -> Result<()> {
		self.item(reader);
		self.hash = false.murmur128(self.hash);
		Ok(())
	}
}
