// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use hybridrow_core::{
	RecordIoReader, RecordIoWriter, RowReader, RowWriter, Segment, UpdateMode, Value, schema::Namespace,
};
use hybridrow_testing::{
	fixture::{self, ADDRESS, NAMESPACE, PERSON},
	init_tracing,
	tempdir::{persist, temp_dir},
};

#[test]
fn test_stream_through_file() {
	init_tracing();
	let resolver = fixture::resolver();

	let mut rows = Vec::new();
	for (zip, city) in [(10115, "Berlin"), (75001, "Paris")] {
		let mut row = fixture::row(&resolver, ADDRESS);
		let mut writer = RowWriter::new(&mut row, &resolver).unwrap();
		writer.write_scalar("zip", &Value::Int32(zip), UpdateMode::Insert).unwrap();
		writer.write_scalar("city", &Value::utf8(city), UpdateMode::Insert).unwrap();
		rows.push(row);
	}
	let mut person = fixture::row(&resolver, PERSON);
	RowWriter::new(&mut person, &resolver).unwrap().write_scalar("age", &Value::Int32(41), UpdateMode::Insert).unwrap();
	rows.push(person);

	let mut writer = RecordIoWriter::new(Segment::default().with_sdl(NAMESPACE)).unwrap();
	for row in &rows {
		writer.append(row).unwrap();
	}
	let bytes = writer.finish();

	let read = temp_dir(|dir| persist(dir, "rows.hr", &bytes)).unwrap();
	let reader = RecordIoReader::new(&read).unwrap();
	assert_eq!(reader.row_count(), 3);

	// the stream carries its own schema definition
	let namespace = Namespace::from_json(reader.segment().sdl.as_deref().unwrap()).unwrap();
	assert_eq!(namespace.schemas.len(), 3);

	let decoded = reader.collect::<Result<Vec<_>, _>>().unwrap();
	assert_eq!(decoded, rows);

	let mut cities = Vec::new();
	for row in &decoded[..2] {
		let mut reader = RowReader::new(row, &resolver).unwrap();
		while reader.read().unwrap() {
			if reader.path() == Some("city") {
				cities.push(reader.read_utf8().unwrap().to_string());
			}
		}
	}
	assert_eq!(cities, vec!["Berlin", "Paris"]);
}
