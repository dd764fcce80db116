// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Hash types and functions for HybridRow.
//!
//! Provides a seeded 128-bit MurmurHash3 (x64 variant) used to derive
//! content-addressable identities such as layout fingerprints.

use core::{
	fmt,
	hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

mod murmur;

pub use murmur::{Murmur128, murmur3_128};

#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hash128(pub u128);

impl Hash128 {
	pub const ZERO: Hash128 = Hash128(0);

	pub const fn from_parts(low: u64, high: u64) -> Self {
		Hash128((high as u128) << 64 | low as u128)
	}

	#[inline]
	pub const fn low(&self) -> u64 {
		self.0 as u64
	}

	#[inline]
	pub const fn high(&self) -> u64 {
		(self.0 >> 64) as u64
	}

	/// Canonical little-endian byte form: low word first.
	pub fn to_le_bytes(&self) -> [u8; 16] {
		self.0.to_le_bytes()
	}

	pub fn from_le_bytes(bytes: [u8; 16]) -> Self {
		Hash128(u128::from_le_bytes(bytes))
	}
}

impl From<u128> for Hash128 {
	fn from(value: u128) -> Self {
		Hash128(value)
	}
}

impl From<Hash128> for u128 {
	fn from(hash: Hash128) -> Self {
		hash.0
	}
}

impl Hash for Hash128 {
	fn hash<H: Hasher>(&self, state: &mut H) {
		state.write_u128(self.0)
	}
}

impl fmt::Debug for Hash128 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Hash128({:#034x})", self.0)
	}
}

impl fmt::Display for Hash128 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:016x}{:016x}", self.high(), self.low())
	}
}
