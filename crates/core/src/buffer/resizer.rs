// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::Debug;

/// Growth strategy for a [`RowBuffer`](super::RowBuffer).
///
/// `resize` takes ownership of the current storage and must return storage of
/// at least `minimum` bytes holding the old bytes at the same offsets.
pub trait Resizer: Debug + Send + Sync {
	fn resize(&self, minimum: usize, existing: Vec<u8>) -> Vec<u8>;
}

/// Heap backed resizer that at least doubles the storage on every growth.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryResizer;

const MIN_GROWTH: usize = 16;

impl Resizer for MemoryResizer {
	fn resize(&self, minimum: usize, mut existing: Vec<u8>) -> Vec<u8> {
		let target = minimum.max(existing.len().saturating_mul(2)).max(MIN_GROWTH);
		existing.resize(target, 0);
		existing
	}
}
