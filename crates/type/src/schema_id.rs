// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{self, Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Stable integer identity of a compiled schema.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(pub i32);

impl SchemaId {
	pub const INVALID: SchemaId = SchemaId(0);
	/// Record envelope framing every row in a RecordIO stream.
	pub const RECORD: SchemaId = SchemaId(2147473649);
	/// Segment header opening a RecordIO stream.
	pub const SEGMENT: SchemaId = SchemaId(2147473650);

	pub const SIZE: usize = 4;

	pub const fn new(id: i32) -> Self {
		SchemaId(id)
	}

	pub const fn id(&self) -> i32 {
		self.0
	}

	pub const fn is_valid(&self) -> bool {
		self.0 != 0
	}

	pub const fn is_system(&self) -> bool {
		self.0 == Self::RECORD.0 || self.0 == Self::SEGMENT.0
	}

	pub fn to_le_bytes(&self) -> [u8; 4] {
		self.0.to_le_bytes()
	}

	pub fn from_le_bytes(bytes: [u8; 4]) -> Self {
		SchemaId(i32::from_le_bytes(bytes))
	}
}

impl From<i32> for SchemaId {
	fn from(value: i32) -> Self {
		SchemaId(value)
	}
}

impl From<SchemaId> for i32 {
	fn from(id: SchemaId) -> Self {
		id.0
	}
}

impl Display for SchemaId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}

impl FromStr for SchemaId {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		s.trim().parse::<i32>().map(SchemaId).map_err(|err| Error::malformed(format!("schema id '{s}': {err}")))
	}
}

/// Format version stamped in the first byte of every row.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HybridRowVersion {
	Invalid = 0,
	#[default]
	V1 = 0x81,
}

impl HybridRowVersion {
	pub fn to_u8(self) -> u8 {
		self as u8
	}

	pub fn from_u8(value: u8) -> crate::Result<Self> {
		match value {
			0x81 => Ok(HybridRowVersion::V1),
			other => Err(Error::malformed(format!("unsupported row version {other:#04x}"))),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_is_invalid() {
		assert_eq!(SchemaId::default(), SchemaId::INVALID);
		assert!(!SchemaId::default().is_valid());
		assert_eq!(SchemaId::default().to_string(), "0");
	}

	#[test]
	fn test_text_roundtrip() {
		let id = SchemaId(1);
		assert_eq!(id.to_string(), "1");
		assert_eq!("1".parse::<SchemaId>().unwrap(), SchemaId(1));
		assert_eq!("-17".parse::<SchemaId>().unwrap(), SchemaId(-17));
		assert!("one".parse::<SchemaId>().is_err());
	}

	#[test]
	fn test_json_is_bare_integer() {
		assert_eq!(serde_json::to_string(&SchemaId(1)).unwrap(), "1");
		assert_eq!(serde_json::to_string(&SchemaId::default()).unwrap(), "0");
		assert_eq!(serde_json::from_str::<SchemaId>("1").unwrap(), SchemaId(1));
	}

	#[test]
	fn test_system_ids() {
		assert!(SchemaId::RECORD.is_system());
		assert!(SchemaId::SEGMENT.is_system());
		assert!(!SchemaId(1).is_system());
	}

	#[test]
	fn test_version_byte() {
		assert_eq!(HybridRowVersion::from_u8(0x81).unwrap(), HybridRowVersion::V1);
		assert!(HybridRowVersion::from_u8(0).is_err());
	}
}
