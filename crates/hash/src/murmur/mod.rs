// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::Hash128;

const C1: u64 = 0x87c3_7b91_1142_53d5;
const C2: u64 = 0x4cf5_ad43_2745_937f;

/// MurmurHash3 x64 128-bit over `data`, seeded with both halves of `seed`.
///
/// The low word of the seed initialises `h1`, the high word `h2`, so chaining
/// `murmur3_128(b, murmur3_128(a, seed))` hashes an ordered sequence.
pub fn murmur3_128(data: &[u8], seed: Hash128) -> Hash128 {
	let mut h1 = seed.low();
	let mut h2 = seed.high();

	let mut blocks = data.chunks_exact(16);
	for block in &mut blocks {
		let mut k1 = u64::from_le_bytes([
			block[0], block[1], block[2], block[3], block[4], block[5], block[6], block[7],
		]);
		let mut k2 = u64::from_le_bytes([
			block[8], block[9], block[10], block[11], block[12], block[13], block[14], block[15],
		]);

		k1 = k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2);
		h1 ^= k1;
		h1 = h1.rotate_left(27).wrapping_add(h2).wrapping_mul(5).wrapping_add(0x52dc_e729);

		k2 = k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1);
		h2 ^= k2;
		h2 = h2.rotate_left(31).wrapping_add(h1).wrapping_mul(5).wrapping_add(0x3849_5ab5);
	}

	let tail = blocks.remainder();
	let mut k1: u64 = 0;
	let mut k2: u64 = 0;

	for (i, &byte) in tail.iter().enumerate().skip(8) {
		k2 ^= (byte as u64) << ((i - 8) * 8);
	}
	if tail.len() > 8 {
		k2 = k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1);
		h2 ^= k2;
	}

	for (i, &byte) in tail.iter().enumerate().take(8) {
		k1 ^= (byte as u64) << (i * 8);
	}
	if !tail.is_empty() {
		k1 = k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2);
		h1 ^= k1;
	}

	let len = data.len() as u64;
	h1 ^= len;
	h2 ^= len;

	h1 = h1.wrapping_add(h2);
	h2 = h2.wrapping_add(h1);

	h1 = fmix64(h1);
	h2 = fmix64(h2);

	h1 = h1.wrapping_add(h2);
	h2 = h2.wrapping_add(h1);

	Hash128::from_parts(h1, h2)
}

#[inline(always)]
fn fmix64(mut k: u64) -> u64 {
	k ^= k >> 33;
	k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
	k ^= k >> 33;
	k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
	k ^= k >> 33;
	k
}

/// Values with a canonical byte form that can be folded into a [`Hash128`].
///
/// Scalars hash their little-endian representation, strings their UTF-8
/// bytes, so logically equal values always produce equal hashes.
pub trait Murmur128 {
	fn murmur128(&self, seed: Hash128) -> Hash128;
}

impl Murmur128 for [u8] {
	fn murmur128(&self, seed: Hash128) -> Hash128 {
		murmur3_128(self, seed)
	}
}

impl Murmur128 for str {
	fn murmur128(&self, seed: Hash128) -> Hash128 {
		murmur3_128(self.as_bytes(), seed)
	}
}

impl Murmur128 for String {
	fn murmur128(&self, seed: Hash128) -> Hash128 {
		murmur3_128(self.as_bytes(), seed)
	}
}

impl Murmur128 for bool {
	fn murmur128(&self, seed: Hash128) -> Hash128 {
		murmur3_128(&[*self as u8], seed)
	}
}

impl Murmur128 for Hash128 {
	fn murmur128(&self, seed: Hash128) -> Hash128 {
		murmur3_128(&self.to_le_bytes(), seed)
	}
}

macro_rules! impl_murmur_le {
	($($t:ty),*) => {
		$(
			impl Murmur128 for $t {
				fn murmur128(&self, seed: Hash128) -> Hash128 {
					murmur3_128(&self.to_le_bytes(), seed)
				}
			}
		)*
	};
}

impl_murmur_le!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64);
