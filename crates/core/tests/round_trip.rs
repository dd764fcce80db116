// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Every scalar code written through the writer reads back unchanged.

use hybridrow_core::{HEADER_SIZE, LayoutColumn, RowReader, RowWriter, UpdateMode, validate_row};
use hybridrow_testing::{
	fixture::{self, EVERYTHING, PERSON},
	init_tracing,
};
use hybridrow_type::{DateTime, Decimal, Float128, ObjectId, TypeArgument, UnixDateTime, Value};
use uuid::Uuid;

fn samples() -> Vec<(&'static str, Value)> {
	vec![
		("null", Value::Null),
		("bool", Value::Boolean(true)),
		("i8", Value::Int8(i8::MIN)),
		("i16", Value::Int16(-12345)),
		("i32", Value::Int32(i32::MAX)),
		("i64", Value::Int64(i64::MIN)),
		("u8", Value::UInt8(u8::MAX)),
		("u16", Value::UInt16(0xBEEF)),
		("u32", Value::UInt32(u32::MAX)),
		("u64", Value::UInt64(u64::MAX)),
		("varint", Value::VarInt(-300)),
		("varuint", Value::VarUInt(1 << 40)),
		("f32", Value::Float32(1.5)),
		("f64", Value::Float64(-0.25)),
		("f128", Value::Float128(Float128::new(-1, 7))),
		("decimal", Value::Decimal(Decimal::new(-123_456_789, 4).unwrap())),
		("datetime", Value::DateTime(DateTime(638_000_000_000_000_000))),
		("unix", Value::UnixDateTime(UnixDateTime(1_700_000_000_000))),
		("guid", Value::Guid(Uuid::from_u128(0x0011_2233_4455_6677_8899_aabb_ccdd_eeff))),
		("oid", Value::ObjectId(ObjectId::from_bytes([7; 12]))),
		("utf8", Value::utf8("añ€😀")),
		("binary", Value::Binary(vec![0, 1, 254, 255])),
	]
}

#[test]
fn test_every_scalar_code() {
	init_tracing();
	let resolver = fixture::resolver();
	let mut buffer = fixture::row(&resolver, EVERYTHING);
	let samples = samples();

	RowWriter::new(&mut buffer, &resolver)
		.unwrap()
		.write_scope("values", &TypeArgument::object(), UpdateMode::Insert, |w| {
			for (name, value) in &samples {
				w.write_scalar(*name, value, UpdateMode::Insert)?;
			}
			Ok(())
		})
		.unwrap();

	let mut reader = RowReader::new(&buffer, &resolver).unwrap();
	assert!(reader.read().unwrap());
	assert_eq!(reader.path(), Some("values"));
	let mut read = Vec::new();
	reader
		.read_scope(&mut read, |r, read| {
			while r.read()? {
				let name = r.path().unwrap_or_default().to_string();
				read.push((name, r.read_value()?));
			}
			Ok(())
		})
		.unwrap();

	let expected = samples.into_iter().map(|(name, value)| (name.to_string(), value)).collect::<Vec<_>>();
	assert_eq!(read, expected);
	assert_eq!(validate_row(&buffer, &resolver).unwrap().scalars, expected.len());
}

#[test]
fn test_variable_codes() {
	let resolver = fixture::resolver();
	let mut buffer = fixture::row(&resolver, EVERYTHING);
	let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
	writer.write_scalar("count", &Value::VarUInt(u64::MAX), UpdateMode::Insert).unwrap();
	writer.write_scalar("blob", &Value::Binary(vec![9; 300]), UpdateMode::Insert).unwrap();

	let mut reader = RowReader::new(&buffer, &resolver).unwrap();
	assert!(reader.read().unwrap());
	assert_eq!(reader.read_binary().unwrap(), &[9; 300][..]);
	assert!(reader.read().unwrap());
	assert_eq!(reader.read_varuint().unwrap(), u64::MAX);
	assert!(!reader.read().unwrap());
}

#[test]
fn test_guid_boundaries() {
	let resolver = fixture::resolver();
	let layout = fixture::layout(&resolver, PERSON);
	let Some(LayoutColumn::Fixed(column)) = layout.find("id") else {
		panic!("id is a fixed column");
	};
	let offset = HEADER_SIZE + column.offset;

	let mut buffer = fixture::row(&resolver, PERSON);
	for guid in [Uuid::nil(), Uuid::from_bytes([0xFF; 16]), Uuid::from_u128(0x0011_2233_4455_6677_8899_aabb_ccdd_eeff)] {
		RowWriter::new(&mut buffer, &resolver).unwrap().write_scalar("id", &Value::Guid(guid), UpdateMode::Upsert).unwrap();
		assert_eq!(buffer.bytes(offset, 16).unwrap(), &guid.to_bytes_le()[..]);

		let mut reader = RowReader::new(&buffer, &resolver).unwrap();
		assert!(reader.read().unwrap());
		assert_eq!(reader.read_guid().unwrap(), guid);
	}
}

#[test]
fn test_multibyte_text() {
	let resolver = fixture::resolver();
	let mut buffer = fixture::row(&resolver, PERSON);
	let texts = ["", "ascii", "naïve café", "日本語テキスト", "🦀🦀 crab"];

	for text in texts {
		let mut writer = RowWriter::new(&mut buffer, &resolver).unwrap();
		writer.write_scalar("name", &Value::utf8(text), UpdateMode::Upsert).unwrap();
		writer.write_scalar("bio", &Value::utf8(format!("{text}!")), UpdateMode::Upsert).unwrap();

		let mut reader = RowReader::new(&buffer, &resolver).unwrap();
		assert!(reader.read().unwrap());
		assert_eq!(reader.read_utf8().unwrap(), text);
		assert!(reader.read().unwrap());
		assert_eq!(reader.read_utf8().unwrap(), format!("{text}!"));
	}
}
