// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod decimal;
mod fixed;
mod float128;
mod object_id;
mod temporal;

pub use decimal::Decimal;
pub use fixed::FixedValue;
pub use float128::Float128;
pub use object_id::ObjectId;
pub use temporal::{DateTime, UnixDateTime};

use crate::{
	Error, LayoutCode, Result,
	util::varint::{decode_varint, decode_varuint, encode_varint, encode_varuint, varint_len, varuint_len},
};

/// A scalar value as read from or written to a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
	Null,
	Boolean(bool),
	Int8(i8),
	Int16(i16),
	Int32(i32),
	Int64(i64),
	UInt8(u8),
	UInt16(u16),
	UInt32(u32),
	UInt64(u64),
	VarInt(i64),
	VarUInt(u64),
	Float32(f32),
	Float64(f64),
	Float128(Float128),
	Decimal(Decimal),
	DateTime(DateTime),
	UnixDateTime(UnixDateTime),
	Guid(Uuid),
	ObjectId(ObjectId),
	Utf8(String),
	Binary(Vec<u8>),
}

impl Value {
	pub fn utf8(value: impl Into<String>) -> Self {
		Value::Utf8(value.into())
	}

	pub const fn code(&self) -> LayoutCode {
		match self {
			Value::Null => LayoutCode::Null,
			Value::Boolean(_) => LayoutCode::Boolean,
			Value::Int8(_) => LayoutCode::Int8,
			Value::Int16(_) => LayoutCode::Int16,
			Value::Int32(_) => LayoutCode::Int32,
			Value::Int64(_) => LayoutCode::Int64,
			Value::UInt8(_) => LayoutCode::UInt8,
			Value::UInt16(_) => LayoutCode::UInt16,
			Value::UInt32(_) => LayoutCode::UInt32,
			Value::UInt64(_) => LayoutCode::UInt64,
			Value::VarInt(_) => LayoutCode::VarInt,
			Value::VarUInt(_) => LayoutCode::VarUInt,
			Value::Float32(_) => LayoutCode::Float32,
			Value::Float64(_) => LayoutCode::Float64,
			Value::Float128(_) => LayoutCode::Float128,
			Value::Decimal(_) => LayoutCode::Decimal,
			Value::DateTime(_) => LayoutCode::DateTime,
			Value::UnixDateTime(_) => LayoutCode::UnixDateTime,
			Value::Guid(_) => LayoutCode::Guid,
			Value::ObjectId(_) => LayoutCode::ObjectId,
			Value::Utf8(_) => LayoutCode::Utf8,
			Value::Binary(_) => LayoutCode::Binary,
		}
	}

	/// Bytes the encoded body occupies.
	pub fn encoded_len(&self) -> usize {
		match self {
			Value::VarInt(v) => varint_len(*v),
			Value::VarUInt(v) => varuint_len(*v),
			Value::Utf8(s) => varuint_len(s.len() as u64) + s.len(),
			Value::Binary(b) => varuint_len(b.len() as u64) + b.len(),
			other => other.code().fixed_size().unwrap_or(0),
		}
	}

	/// Appends the value's body (no layout code) to `out`.
	pub fn encode(&self, out: &mut Vec<u8>) {
		match self {
			Value::Null => {}
			Value::Boolean(v) => push_fixed(out, v),
			Value::Int8(v) => push_fixed(out, v),
			Value::Int16(v) => push_fixed(out, v),
			Value::Int32(v) => push_fixed(out, v),
			Value::Int64(v) => push_fixed(out, v),
			Value::UInt8(v) => push_fixed(out, v),
			Value::UInt16(v) => push_fixed(out, v),
			Value::UInt32(v) => push_fixed(out, v),
			Value::UInt64(v) => push_fixed(out, v),
			Value::VarInt(v) => encode_varint(*v, out),
			Value::VarUInt(v) => encode_varuint(*v, out),
			Value::Float32(v) => push_fixed(out, v),
			Value::Float64(v) => push_fixed(out, v),
			Value::Float128(v) => push_fixed(out, v),
			Value::Decimal(v) => push_fixed(out, v),
			Value::DateTime(v) => push_fixed(out, v),
			Value::UnixDateTime(v) => push_fixed(out, v),
			Value::Guid(v) => push_fixed(out, v),
			Value::ObjectId(v) => push_fixed(out, v),
			Value::Utf8(s) => {
				encode_varuint(s.len() as u64, out);
				out.extend_from_slice(s.as_bytes());
			}
			Value::Binary(b) => {
				encode_varuint(b.len() as u64, out);
				out.extend_from_slice(b);
			}
		}
	}

	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(self.encoded_len());
		self.encode(&mut out);
		out
	}

	/// Decodes a body of type `code` at `offset`, returning the value and the
	/// number of bytes consumed.
	pub fn decode(code: LayoutCode, buf: &[u8], offset: usize) -> Result<(Value, usize)> {
		let value = match code {
			LayoutCode::Null => return Ok((Value::Null, 0)),
			LayoutCode::Boolean => Value::Boolean(read_fixed(buf, offset)?),
			LayoutCode::Int8 => Value::Int8(read_fixed(buf, offset)?),
			LayoutCode::Int16 => Value::Int16(read_fixed(buf, offset)?),
			LayoutCode::Int32 => Value::Int32(read_fixed(buf, offset)?),
			LayoutCode::Int64 => Value::Int64(read_fixed(buf, offset)?),
			LayoutCode::UInt8 => Value::UInt8(read_fixed(buf, offset)?),
			LayoutCode::UInt16 => Value::UInt16(read_fixed(buf, offset)?),
			LayoutCode::UInt32 => Value::UInt32(read_fixed(buf, offset)?),
			LayoutCode::UInt64 => Value::UInt64(read_fixed(buf, offset)?),
			LayoutCode::Float32 => Value::Float32(read_fixed(buf, offset)?),
			LayoutCode::Float64 => Value::Float64(read_fixed(buf, offset)?),
			LayoutCode::Float128 => Value::Float128(read_fixed(buf, offset)?),
			LayoutCode::Decimal => Value::Decimal(read_fixed(buf, offset)?),
			LayoutCode::DateTime => Value::DateTime(read_fixed(buf, offset)?),
			LayoutCode::UnixDateTime => Value::UnixDateTime(read_fixed(buf, offset)?),
			LayoutCode::Guid => Value::Guid(read_fixed(buf, offset)?),
			LayoutCode::ObjectId => Value::ObjectId(read_fixed(buf, offset)?),
			LayoutCode::VarInt => {
				let (v, len) = decode_varint(buf, offset)?;
				return Ok((Value::VarInt(v), len));
			}
			LayoutCode::VarUInt => {
				let (v, len) = decode_varuint(buf, offset)?;
				return Ok((Value::VarUInt(v), len));
			}
			LayoutCode::Utf8 => {
				let (bytes, len) = decode_length_prefixed(buf, offset)?;
				let s = std::str::from_utf8(bytes)
					.map_err(|err| Error::malformed(format!("invalid utf-8 at offset {offset}: {err}")))?;
				return Ok((Value::Utf8(s.to_string()), len));
			}
			LayoutCode::Binary => {
				let (bytes, len) = decode_length_prefixed(buf, offset)?;
				return Ok((Value::Binary(bytes.to_vec()), len));
			}
			LayoutCode::Scope {
				..
			} => {
				return Err(Error::invalid_state(format!("{code} is a scope, not a scalar value")));
			}
		};
		Ok((value, code.fixed_size().unwrap_or(0)))
	}
}

fn push_fixed<T: FixedValue>(out: &mut Vec<u8>, value: &T) {
	let start = out.len();
	out.resize(start + T::SIZE, 0);
	value.encode(&mut out[start..]);
}

fn read_fixed<T: FixedValue>(buf: &[u8], offset: usize) -> Result<T> {
	let end = offset.checked_add(T::SIZE).filter(|end| *end <= buf.len()).ok_or(Error::OutOfRange {
		offset,
		length: T::SIZE,
		buffer_len: buf.len(),
	})?;
	T::decode(&buf[offset..end])
}

/// Reads a `varuint length + bytes` cell, returning the payload and the total
/// cell size.
pub fn decode_length_prefixed(buf: &[u8], offset: usize) -> Result<(&[u8], usize)> {
	let (len, prefix) = decode_varuint(buf, offset)?;
	let start = offset + prefix;
	let end = usize::try_from(len)
		.ok()
		.and_then(|len| start.checked_add(len))
		.filter(|end| *end <= buf.len())
		.ok_or_else(|| Error::malformed(format!("length {len} at offset {offset} runs past the buffer")))?;
	Ok((&buf[start..end], end - offset))
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => f.write_str("null"),
			Value::Boolean(v) => Display::fmt(v, f),
			Value::Int8(v) => Display::fmt(v, f),
			Value::Int16(v) => Display::fmt(v, f),
			Value::Int32(v) => Display::fmt(v, f),
			Value::Int64(v) => Display::fmt(v, f),
			Value::UInt8(v) => Display::fmt(v, f),
			Value::UInt16(v) => Display::fmt(v, f),
			Value::UInt32(v) => Display::fmt(v, f),
			Value::UInt64(v) => Display::fmt(v, f),
			Value::VarInt(v) => Display::fmt(v, f),
			Value::VarUInt(v) => Display::fmt(v, f),
			Value::Float32(v) => Display::fmt(v, f),
			Value::Float64(v) => Display::fmt(v, f),
			Value::Float128(v) => Display::fmt(v, f),
			Value::Decimal(v) => Display::fmt(v, f),
			Value::DateTime(v) => Display::fmt(v, f),
			Value::UnixDateTime(v) => Display::fmt(v, f),
			Value::Guid(v) => Display::fmt(v, f),
			Value::ObjectId(v) => Display::fmt(v, f),
			Value::Utf8(v) => write!(f, "{v:?}"),
			Value::Binary(v) => {
				f.write_str("0x")?;
				for byte in v {
					write!(f, "{byte:02x}")?;
				}
				Ok(())
			}
		}
	}
}

macro_rules! impl_from_value {
	($($t:ty => $variant:ident),* $(,)?) => {
		$(
			impl From<$t> for Value {
				fn from(value: $t) -> Self {
					Value::$variant(value)
				}
			}
		)*
	};
}

impl_from_value!(
	bool => Boolean,
	i8 => Int8,
	i16 => Int16,
	i32 => Int32,
	i64 => Int64,
	u8 => UInt8,
	u16 => UInt16,
	u32 => UInt32,
	u64 => UInt64,
	f32 => Float32,
	f64 => Float64,
	Float128 => Float128,
	Decimal => Decimal,
	DateTime => DateTime,
	UnixDateTime => UnixDateTime,
	Uuid => Guid,
	ObjectId => ObjectId,
	String => Utf8,
	Vec<u8> => Binary,
);

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::Utf8(value.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn all_values() -> Vec<Value> {
		vec![
			Value::Null,
			Value::Boolean(true),
			Value::Int8(-8),
			Value::Int16(-16),
			Value::Int32(-32),
			Value::Int64(-64),
			Value::UInt8(8),
			Value::UInt16(16),
			Value::UInt32(32),
			Value::UInt64(64),
			Value::VarInt(-1_000_000),
			Value::VarUInt(1 << 40),
			Value::Float32(1.5),
			Value::Float64(-2.25),
			Value::Float128(Float128::new(1, 2)),
			Value::Decimal(Decimal::new(31415, 4).unwrap()),
			Value::DateTime(DateTime(1)),
			Value::UnixDateTime(UnixDateTime(2)),
			Value::Guid(Uuid::from_bytes([0xFF; 16])),
			Value::ObjectId(ObjectId([1; 12])),
			Value::utf8("héllo wörld ✓"),
			Value::Binary(vec![0, 1, 2, 255]),
		]
	}

	#[test]
	fn test_encode_decode_each_code() {
		for value in all_values() {
			let bytes = value.to_bytes();
			assert_eq!(bytes.len(), value.encoded_len(), "{value:?}");
			let (decoded, len) = Value::decode(value.code(), &bytes, 0).unwrap();
			assert_eq!(decoded, value);
			assert_eq!(len, bytes.len());
		}
	}

	#[test]
	fn test_utf8_is_length_prefixed_bytes() {
		let bytes = Value::utf8("ok").to_bytes();
		assert_eq!(bytes, vec![2, b'o', b'k']);
	}

	#[test]
	fn test_truncated_fixed_is_out_of_range() {
		let err = Value::decode(LayoutCode::Int64, &[1, 2, 3], 0).unwrap_err();
		assert!(matches!(err, Error::OutOfRange { .. }));
	}

	#[test]
	fn test_length_past_end_is_malformed() {
		let err = Value::decode(LayoutCode::Binary, &[10, 1, 2], 0).unwrap_err();
		assert!(matches!(err, Error::Malformed { .. }));
	}

	#[test]
	fn test_invalid_utf8_is_malformed() {
		let err = Value::decode(LayoutCode::Utf8, &[2, 0xC3, 0x28], 0).unwrap_err();
		assert!(matches!(err, Error::Malformed { .. }));
	}
}
