// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use uuid::Uuid;

use crate::{DateTime, Decimal, Float128, LayoutCode, ObjectId, Result, UnixDateTime};

/// A scalar with a fixed little-endian width on the wire.
///
/// `decode` receives exactly `SIZE` bytes; bounds are the caller's concern.
pub trait FixedValue: Sized + Copy {
	const CODE: LayoutCode;
	const SIZE: usize;

	fn encode(&self, out: &mut [u8]);

	fn decode(bytes: &[u8]) -> Result<Self>;
}

macro_rules! impl_fixed_le {
	($($t:ty => $code:ident),* $(,)?) => {
		$(
			impl FixedValue for $t {
				const CODE: LayoutCode = LayoutCode::$code;
				const SIZE: usize = size_of::<$t>();

				#[inline]
				fn encode(&self, out: &mut [u8]) {
					out[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
				}

				#[inline]
				fn decode(bytes: &[u8]) -> Result<Self> {
					let mut raw = [0u8; size_of::<$t>()];
					raw.copy_from_slice(&bytes[..Self::SIZE]);
					Ok(<$t>::from_le_bytes(raw))
				}
			}
		)*
	};
}

impl_fixed_le!(
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
);

impl FixedValue for bool {
	const CODE: LayoutCode = LayoutCode::Boolean;
	const SIZE: usize = 1;

	fn encode(&self, out: &mut [u8]) {
		out[0] = *self as u8;
	}

	fn decode(bytes: &[u8]) -> Result<Self> {
		match bytes[0] {
			0 => Ok(false),
			1 => Ok(true),
			other => Err(crate::Error::malformed(format!("boolean byte {other:#04x}"))),
		}
	}
}

impl FixedValue for Float128 {
	const CODE: LayoutCode = LayoutCode::Float128;
	const SIZE: usize = 16;

	fn encode(&self, out: &mut [u8]) {
		self.low.encode(&mut out[..8]);
		self.high.encode(&mut out[8..16]);
	}

	fn decode(bytes: &[u8]) -> Result<Self> {
		Ok(Float128 {
			low: i64::decode(&bytes[..8])?,
			high: i64::decode(&bytes[8..16])?,
		})
	}
}

impl FixedValue for Decimal {
	const CODE: LayoutCode = LayoutCode::Decimal;
	const SIZE: usize = Decimal::SIZE;

	fn encode(&self, out: &mut [u8]) {
		out[..16].copy_from_slice(&self.to_bytes());
	}

	fn decode(bytes: &[u8]) -> Result<Self> {
		let mut raw = [0u8; 16];
		raw.copy_from_slice(&bytes[..16]);
		Decimal::from_bytes(raw)
	}
}

impl FixedValue for DateTime {
	const CODE: LayoutCode = LayoutCode::DateTime;
	const SIZE: usize = 8;

	fn encode(&self, out: &mut [u8]) {
		self.0.encode(out)
	}

	fn decode(bytes: &[u8]) -> Result<Self> {
		i64::decode(bytes).map(DateTime)
	}
}

impl FixedValue for UnixDateTime {
	const CODE: LayoutCode = LayoutCode::UnixDateTime;
	const SIZE: usize = 8;

	fn encode(&self, out: &mut [u8]) {
		self.0.encode(out)
	}

	fn decode(bytes: &[u8]) -> Result<Self> {
		i64::decode(bytes).map(UnixDateTime)
	}
}

/// GUIDs use the mixed-endian layout: the 4-, 2- and 2-byte groups little-endian,
/// the trailing 8 bytes in textual order.
impl FixedValue for Uuid {
	const CODE: LayoutCode = LayoutCode::Guid;
	const SIZE: usize = 16;

	fn encode(&self, out: &mut [u8]) {
		out[..16].copy_from_slice(&self.to_bytes_le());
	}

	fn decode(bytes: &[u8]) -> Result<Self> {
		let mut raw = [0u8; 16];
		raw.copy_from_slice(&bytes[..16]);
		Ok(Uuid::from_bytes_le(raw))
	}
}

impl FixedValue for ObjectId {
	const CODE: LayoutCode = LayoutCode::ObjectId;
	const SIZE: usize = ObjectId::SIZE;

	fn encode(&self, out: &mut [u8]) {
		out[..12].copy_from_slice(&self.0);
	}

	fn decode(bytes: &[u8]) -> Result<Self> {
		let mut raw = [0u8; 12];
		raw.copy_from_slice(&bytes[..12]);
		Ok(ObjectId(raw))
	}
}
