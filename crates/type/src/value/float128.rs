// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// IEEE 754 binary128 value carried as its raw halves; the codec never
/// performs arithmetic on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Float128 {
	pub low: i64,
	pub high: i64,
}

impl Float128 {
	pub const fn new(high: i64, low: i64) -> Self {
		Self {
			low,
			high,
		}
	}
}

impl Display for Float128 {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{:016x}{:016x}", self.high as u64, self.low as u64)
	}
}
