// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use hybridrow_type::{Error, Result, Value};
use tracing::{debug, instrument};

use super::Segment;
use crate::{
	buffer::RowBuffer,
	config::RowConfig,
	layout::system::{record, segment},
	resolver::SystemLayoutResolver,
	writer::{RowWriter, UpdateMode},
};

/// Frames rows into a record stream held in memory.
#[derive(Debug)]
pub struct RecordIoWriter {
	segment: RowBuffer,
	body: Vec<u8>,
	rows: i32,
}

impl RecordIoWriter {
	#[instrument(name = "record::writer::new", level = "debug", skip_all)]
	pub fn new(header: Segment) -> Result<Self> {
		let resolver = SystemLayoutResolver::instance();
		let mut buffer = RowBuffer::new_row(resolver.segment(), &RowConfig::default())?;
		let mut writer = RowWriter::new(&mut buffer, resolver)?;
		writer.write_scalar(segment::ROW_COUNT, &Value::Int32(0), UpdateMode::Insert)?;
		if let Some(comment) = header.comment {
			writer.write_scalar(segment::COMMENT, &Value::utf8(comment), UpdateMode::Insert)?;
		}
		if let Some(sdl) = header.sdl {
			writer.write_scalar(segment::SDL, &Value::utf8(sdl), UpdateMode::Insert)?;
		}
		let length = to_i32(writer.buffer().len())?;
		writer.write_scalar(segment::LENGTH, &Value::Int32(length), UpdateMode::Insert)?;

		Ok(Self {
			segment: buffer,
			body: Vec::new(),
			rows: 0,
		})
	}

	/// Appends `row` behind an envelope naming its schema, version and length.
	pub fn append(&mut self, row: &RowBuffer) -> Result<()> {
		let (version, schema_id) = row.header()?;
		let resolver = SystemLayoutResolver::instance();

		let mut envelope = RowBuffer::new_row(resolver.record(), &RowConfig::default())?;
		let mut writer = RowWriter::new(&mut envelope, resolver)?;
		writer.write_scalar(record::SCHEMA_ID, &Value::Int32(schema_id.0), UpdateMode::Insert)?;
		writer.write_scalar(record::VERSION, &Value::UInt8(version.to_u8()), UpdateMode::Insert)?;
		writer.write_scalar(record::LENGTH, &Value::Int32(to_i32(row.len())?), UpdateMode::Insert)?;

		let rows = self.rows.checked_add(1).ok_or_else(|| Error::invalid_state("record stream row count overflows"))?;
		RowWriter::new(&mut self.segment, resolver)?.write_scalar(
			segment::ROW_COUNT,
			&Value::Int32(rows),
			UpdateMode::Update,
		)?;
		self.rows = rows;
		self.body.extend_from_slice(envelope.as_slice());
		self.body.extend_from_slice(row.as_slice());

		debug!(schema_id = %schema_id, len = row.len(), rows, "appended row");
		Ok(())
	}

	pub fn rows(&self) -> usize {
		self.rows as usize
	}

	/// The complete stream: segment header then every framed row.
	pub fn finish(self) -> Vec<u8> {
		let mut bytes = self.segment.into_bytes();
		bytes.extend_from_slice(&self.body);
		bytes
	}
}

fn to_i32(len: usize) -> Result<i32> {
	i32::try_from(len).map_err(|_| Error::invalid_state(format!("{len} bytes do not fit a record length")))
}
