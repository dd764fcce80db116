// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// 12-byte MongoDB ObjectId, stored in its natural (big-endian) byte order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub [u8; 12]);

impl ObjectId {
	pub const SIZE: usize = 12;

	pub const fn from_bytes(bytes: [u8; 12]) -> Self {
		ObjectId(bytes)
	}

	pub const fn as_bytes(&self) -> &[u8; 12] {
		&self.0
	}
}

impl Display for ObjectId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		for byte in self.0 {
			write!(f, "{byte:02x}")?;
		}
		Ok(())
	}
}
