// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// 100-nanosecond ticks since 0001-01-01T00:00:00 UTC.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateTime(pub i64);

impl DateTime {
	pub const TICKS_PER_MILLISECOND: i64 = 10_000;
	/// Ticks between 0001-01-01 and the Unix epoch.
	pub const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

	pub const fn ticks(&self) -> i64 {
		self.0
	}
}

impl Display for DateTime {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}t", self.0)
	}
}

/// Milliseconds since the Unix epoch.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnixDateTime(pub i64);

impl UnixDateTime {
	pub const fn milliseconds(&self) -> i64 {
		self.0
	}
}

impl Display for UnixDateTime {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}ms", self.0)
	}
}

impl From<UnixDateTime> for DateTime {
	fn from(value: UnixDateTime) -> Self {
		DateTime(DateTime::UNIX_EPOCH_TICKS.saturating_add(value.0.saturating_mul(DateTime::TICKS_PER_MILLISECOND)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_epoch_conversion() {
		assert_eq!(DateTime::from(UnixDateTime(0)), DateTime(DateTime::UNIX_EPOCH_TICKS));
		assert_eq!(DateTime::from(UnixDateTime(1)).ticks() - DateTime::UNIX_EPOCH_TICKS, 10_000);
	}
}
