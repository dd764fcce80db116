// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use hybridrow_type::HybridRowVersion;
use serde::{Deserialize, Serialize};

pub const DEFAULT_INITIAL_CAPACITY: usize = 64;
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Tunables shared by buffers, readers and writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowConfig {
	/// Bytes reserved when a new row buffer is allocated.
	pub initial_capacity: usize,
	/// Maximum number of nested scopes a reader or writer will open.
	pub max_depth: usize,
	/// Version byte written into new row headers.
	pub version: HybridRowVersion,
}

impl Default for RowConfig {
	fn default() -> Self {
		Self {
			initial_capacity: DEFAULT_INITIAL_CAPACITY,
			max_depth: DEFAULT_MAX_DEPTH,
			version: HybridRowVersion::V1,
		}
	}
}

impl RowConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
		self.initial_capacity = capacity;
		self
	}

	pub fn with_max_depth(mut self, depth: usize) -> Self {
		self.max_depth = depth.max(1);
		self
	}

	pub fn with_version(mut self, version: HybridRowVersion) -> Self {
		self.version = version;
		self
	}
}
