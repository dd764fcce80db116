// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! LEB128 variable-length integers and zig-zag signed mapping.

use crate::{Error, Result};

/// Longest LEB128 encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

/// Number of bytes `value` occupies once encoded.
pub const fn varuint_len(mut value: u64) -> usize {
	let mut len = 1;
	while value >= 0x80 {
		value >>= 7;
		len += 1;
	}
	len
}

pub const fn varint_len(value: i64) -> usize {
	varuint_len(zigzag_encode(value))
}

pub fn encode_varuint(mut value: u64, buf: &mut Vec<u8>) {
	loop {
		let mut byte = (value & 0x7F) as u8;
		value >>= 7;
		if value != 0 {
			byte |= 0x80;
		}
		buf.push(byte);
		if value == 0 {
			break;
		}
	}
}

pub fn encode_varint(value: i64, buf: &mut Vec<u8>) {
	encode_varuint(zigzag_encode(value), buf)
}

/// Decodes a LEB128 value at `offset`, returning it with its encoded length.
pub fn decode_varuint(buf: &[u8], offset: usize) -> Result<(u64, usize)> {
	let mut result: u64 = 0;
	let mut shift: u32 = 0;
	let mut pos = offset;
	loop {
		let byte = *buf.get(pos).ok_or_else(|| Error::malformed(format!("truncated varint at offset {offset}")))?;
		pos += 1;

		let payload = (byte & 0x7F) as u64;
		if shift >= 63 && payload > 1 {
			return Err(Error::malformed(format!("varint overflow at offset {offset}")));
		}
		result |= payload << shift;
		if byte & 0x80 == 0 {
			return Ok((result, pos - offset));
		}
		shift += 7;
		if shift >= 64 {
			return Err(Error::malformed(format!("varint overflow at offset {offset}")));
		}
	}
}

pub fn decode_varint(buf: &[u8], offset: usize) -> Result<(i64, usize)> {
	let (value, len) = decode_varuint(buf, offset)?;
	Ok((zigzag_decode(value), len))
}

/// Maps: 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...
#[inline]
pub const fn zigzag_encode(value: i64) -> u64 {
	((value << 1) ^ (value >> 63)) as u64
}

#[inline]
pub const fn zigzag_decode(value: u64) -> i64 {
	((value >> 1) as i64) ^ (-((value & 1) as i64))
}
