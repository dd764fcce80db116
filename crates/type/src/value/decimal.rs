// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// 128-bit decimal: a 96-bit magnitude scaled by a power of ten.
///
/// Encoded as `[magnitude: 12 bytes LE][flags: u32 LE]` where bits 16..24 of
/// the flags hold the scale and bit 31 the sign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decimal {
	mantissa: i128,
	scale: u8,
}

impl Decimal {
	pub const SIZE: usize = 16;
	pub const MAX_SCALE: u8 = 28;
	const MAX_MAGNITUDE: u128 = (1u128 << 96) - 1;

	pub fn new(mantissa: i128, scale: u8) -> Result<Self> {
		if scale > Self::MAX_SCALE {
			return Err(Error::malformed(format!("decimal scale {scale} exceeds {}", Self::MAX_SCALE)));
		}
		if mantissa.unsigned_abs() > Self::MAX_MAGNITUDE {
			return Err(Error::malformed(format!("decimal mantissa {mantissa} exceeds 96 bits")));
		}
		Ok(Self {
			mantissa,
			scale,
		})
	}

	pub const fn mantissa(&self) -> i128 {
		self.mantissa
	}

	pub const fn scale(&self) -> u8 {
		self.scale
	}

	pub fn to_bytes(&self) -> [u8; 16] {
		let mut bytes = [0u8; 16];
		let magnitude = self.mantissa.unsigned_abs().to_le_bytes();
		bytes[..12].copy_from_slice(&magnitude[..12]);
		let mut flags = (self.scale as u32) << 16;
		if self.mantissa < 0 {
			flags |= 1 << 31;
		}
		bytes[12..].copy_from_slice(&flags.to_le_bytes());
		bytes
	}

	pub fn from_bytes(bytes: [u8; 16]) -> Result<Self> {
		let mut magnitude = [0u8; 16];
		magnitude[..12].copy_from_slice(&bytes[..12]);
		let magnitude = u128::from_le_bytes(magnitude) as i128;
		let flags = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);
		if flags & !(0xFF << 16 | 1 << 31) != 0 {
			return Err(Error::malformed(format!("decimal flags {flags:#010x} have reserved bits set")));
		}
		let scale = ((flags >> 16) & 0xFF) as u8;
		let mantissa = if flags & (1 << 31) != 0 {
			-magnitude
		} else {
			magnitude
		};
		Self::new(mantissa, scale)
	}
}

impl From<Decimal> for BigDecimal {
	fn from(value: Decimal) -> Self {
		BigDecimal::new(BigInt::from(value.mantissa), value.scale as i64)
	}
}

impl TryFrom<&BigDecimal> for Decimal {
	type Error = Error;

	fn try_from(value: &BigDecimal) -> Result<Self> {
		let (mut digits, mut scale) = value.as_bigint_and_exponent();
		if scale < 0 {
			digits *= BigInt::from(10).pow((-scale) as u32);
			scale = 0;
		}
		if scale > Self::MAX_SCALE as i64 {
			return Err(Error::malformed(format!("decimal {value} needs scale {scale}")));
		}
		let mantissa = match digits.sign() {
			Sign::NoSign => 0,
			_ => digits.to_i128().ok_or_else(|| Error::malformed(format!("decimal {value} exceeds 96 bits")))?,
		};
		Self::new(mantissa, scale as u8)
	}
}

impl Display for Decimal {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&BigDecimal::from(*self), f)
	}
}
