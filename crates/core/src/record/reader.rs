// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use hybridrow_type::{Error, Result, SchemaId};
use tracing::{instrument, trace};

use super::Segment;
use crate::{
	buffer::{HEADER_SIZE, RowBuffer},
	layout::{
		LayoutColumn,
		system::{record, segment},
	},
	reader::RowReader,
	resolver::SystemLayoutResolver,
};

/// Iterates the rows of a record stream, checking each envelope against the
/// row it frames. Iteration stops after the first error.
#[derive(Debug)]
pub struct RecordIoReader<'a> {
	bytes: &'a [u8],
	offset: usize,
	segment: Segment,
	row_count: usize,
	rows: usize,
	done: bool,
}

impl<'a> RecordIoReader<'a> {
	#[instrument(name = "record::reader::new", level = "debug", skip_all, fields(len = bytes.len()))]
	pub fn new(bytes: &'a [u8]) -> Result<Self> {
		let resolver = SystemLayoutResolver::instance();
		let layout = resolver.segment();

		let prefix = bytes
			.get(..HEADER_SIZE + layout.size())
			.ok_or_else(|| Error::malformed("record stream is shorter than a segment header"))?;
		let prefix = RowBuffer::from_bytes(prefix.to_vec());
		if prefix.schema_id()? != SchemaId::SEGMENT {
			return Err(Error::malformed(format!("record stream opens with schema {}", prefix.schema_id()?)));
		}
		let length_offset = match layout.find(segment::LENGTH) {
			Some(LayoutColumn::Fixed(column)) => HEADER_SIZE + column.offset,
			_ => return Err(Error::invalid_layout("segment layout without a fixed length")),
		};
		let length = usize::try_from(prefix.read_fixed::<i32>(length_offset)?)
			.ok()
			.filter(|length| (prefix.len()..=bytes.len()).contains(length))
			.ok_or_else(|| Error::malformed("segment header length is out of range"))?;

		let header = RowBuffer::from_bytes(bytes[..length].to_vec());
		let mut reader = RowReader::new(&header, resolver)?;
		let mut found = Segment::default();
		let mut row_count = None;
		while reader.read()? {
			match reader.path() {
				Some(segment::ROW_COUNT) => row_count = Some(reader.read_int32()?),
				Some(segment::COMMENT) => found.comment = Some(reader.read_utf8()?.to_string()),
				Some(segment::SDL) => found.sdl = Some(reader.read_utf8()?.to_string()),
				_ => {}
			}
		}
		let row_count = row_count
			.and_then(|count| usize::try_from(count).ok())
			.ok_or_else(|| Error::malformed("segment header without a valid row count"))?;

		Ok(Self {
			bytes,
			offset: length,
			segment: found,
			row_count,
			rows: 0,
			done: false,
		})
	}

	pub fn segment(&self) -> &Segment {
		&self.segment
	}

	/// Number of rows the segment header declares.
	pub fn row_count(&self) -> usize {
		self.row_count
	}

	fn take(&mut self, len: usize) -> Result<&'a [u8]> {
		let bytes = self.bytes;
		let end = self
			.offset
			.checked_add(len)
			.filter(|end| *end <= bytes.len())
			.ok_or_else(|| Error::malformed(format!("record stream truncated at {}", self.offset)))?;
		let taken = &bytes[self.offset..end];
		self.offset = end;
		Ok(taken)
	}

	fn next_row(&mut self) -> Result<RowBuffer> {
		let resolver = SystemLayoutResolver::instance();
		let envelope = RowBuffer::from_bytes(self.take(HEADER_SIZE + resolver.record().size())?.to_vec());
		if envelope.schema_id()? != SchemaId::RECORD {
			return Err(Error::malformed(format!("expected a record envelope, found schema {}", envelope.schema_id()?)));
		}

		let (mut schema_id, mut version, mut length) = (None, None, None);
		let mut reader = RowReader::new(&envelope, resolver)?;
		while reader.read()? {
			match reader.path() {
				Some(record::SCHEMA_ID) => schema_id = Some(SchemaId(reader.read_int32()?)),
				Some(record::VERSION) => version = Some(reader.read_uint8()?),
				Some(record::LENGTH) => length = Some(reader.read_int32()?),
				_ => {}
			}
		}
		let (Some(schema_id), Some(version), Some(length)) = (schema_id, version, length) else {
			return Err(Error::malformed("record envelope is missing a column"));
		};
		let length = usize::try_from(length).map_err(|_| Error::malformed(format!("record length {length}")))?;

		let row = RowBuffer::from_bytes(self.take(length)?.to_vec());
		let (row_version, row_schema) = row.header()?;
		if row_schema != schema_id || row_version.to_u8() != version {
			return Err(Error::malformed(format!(
				"envelope names schema {schema_id} version {version:#04x}, row has schema {row_schema} version {:#04x}",
				row_version.to_u8()
			)));
		}

		self.rows += 1;
		trace!(schema_id = %schema_id, length, row = self.rows, "read row");
		Ok(row)
	}
}

impl Iterator for RecordIoReader<'_> {
	type Item = Result<RowBuffer>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}
		if self.offset == self.bytes.len() {
			self.done = true;
			if self.rows != self.row_count {
				return Some(Err(Error::malformed(format!(
					"segment declares {} rows, stream holds {}",
					self.row_count, self.rows
				))));
			}
			return None;
		}

		let result = self.next_row();
		self.done = result.is_err();
		Some(result)
	}
}
