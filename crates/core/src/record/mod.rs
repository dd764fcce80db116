// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Record streams: a segment header row followed by rows, each framed by a
//! record envelope.

mod reader;
mod writer;

pub use reader::RecordIoReader;
use serde::{Deserialize, Serialize};
pub use writer::RecordIoWriter;

/// Metadata stored in the header row of a record stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
	pub comment: Option<String>,
	/// Schema definition of the rows, typically a namespace document.
	pub sdl: Option<String>,
}

impl Segment {
	pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
		self.comment = Some(comment.into());
		self
	}

	pub fn with_sdl(mut self, sdl: impl Into<String>) -> Self {
		self.sdl = Some(sdl.into());
		self
	}
}

#[cfg(test)]
mod tests {
	use hybridrow_type::{Error, LayoutCode, SchemaId, Value};

	use super::*;
	use crate::{
		buffer::{HEADER_SIZE, RowBuffer},
		config::RowConfig,
		layout::LayoutBuilder,
		reader::RowReader,
		resolver::{LayoutResolverNamespace, SystemLayoutResolver},
		writer::{RowWriter, UpdateMode},
	};

	fn rows() -> (LayoutResolverNamespace, Vec<RowBuffer>) {
		let resolver = LayoutResolverNamespace::default();
		let layout = resolver
			.register(
				LayoutBuilder::new("person")
					.add_fixed_column("age", LayoutCode::Int32)
					.add_variable_column("name", LayoutCode::Utf8)
					.build(SchemaId(3))
					.unwrap(),
			)
			.unwrap();

		let rows = [("ada", 36), ("grace", 85)]
			.into_iter()
			.map(|(name, age)| {
				let mut row = RowBuffer::new_row(&layout, &RowConfig::default()).unwrap();
				let mut writer = RowWriter::new(&mut row, &resolver).unwrap();
				writer.write_scalar("age", &Value::Int32(age), UpdateMode::Insert).unwrap();
				writer.write_scalar("name", &Value::utf8(name), UpdateMode::Insert).unwrap();
				row
			})
			.collect();
		(resolver, rows)
	}

	fn stream(rows: &[RowBuffer]) -> Vec<u8> {
		let mut writer = RecordIoWriter::new(Segment::default().with_comment("people").with_sdl("{}")).unwrap();
		for row in rows {
			writer.append(row).unwrap();
		}
		assert_eq!(writer.rows(), rows.len());
		writer.finish()
	}

	#[test]
	fn test_round_trip() {
		let (resolver, rows) = rows();
		let bytes = stream(&rows);

		let reader = RecordIoReader::new(&bytes).unwrap();
		assert_eq!(reader.segment().comment.as_deref(), Some("people"));
		assert_eq!(reader.segment().sdl.as_deref(), Some("{}"));
		assert_eq!(reader.row_count(), 2);

		let decoded = reader.collect::<Result<Vec<_>, _>>().unwrap();
		assert_eq!(decoded, rows);

		let mut row = RowReader::new(&decoded[1], &resolver).unwrap();
		assert!(row.read().unwrap());
		assert_eq!(row.read_int32().unwrap(), 85);
	}

	#[test]
	fn test_empty_stream() {
		let bytes = RecordIoWriter::new(Segment::default()).unwrap().finish();
		let reader = RecordIoReader::new(&bytes).unwrap();
		assert_eq!(reader.segment(), &Segment::default());
		assert_eq!(reader.count(), 0);
	}

	#[test]
	fn test_envelope_disagreement() {
		let (_, rows) = rows();
		let mut bytes = stream(&rows[..1]);
		let segment_len = RecordIoWriter::new(Segment::default().with_comment("people").with_sdl("{}"))
			.unwrap()
			.finish()
			.len();
		// schema id column of the first envelope
		let at = segment_len + HEADER_SIZE;
		bytes[at] ^= 0xFF;

		let mut reader = RecordIoReader::new(&bytes).unwrap();
		assert!(matches!(reader.next(), Some(Err(Error::Malformed { .. }))));
		assert!(reader.next().is_none());
	}

	#[test]
	fn test_truncated_stream() {
		let (_, rows) = rows();
		let mut bytes = stream(&rows);
		bytes.truncate(bytes.len() - 3);

		let results = RecordIoReader::new(&bytes).unwrap().collect::<Vec<_>>();
		assert_eq!(results.len(), 2);
		assert!(results[0].is_ok());
		assert!(matches!(results[1], Err(Error::Malformed { .. })));
	}

	#[test]
	fn test_row_count_disagreement() {
		let (_, rows) = rows();
		let full = stream(&rows);
		let single = stream(&rows[..1]);
		// drop the second row while keeping the declared count of two
		let bytes = full[..single.len()].to_vec();

		let results = RecordIoReader::new(&bytes).unwrap().collect::<Vec<_>>();
		assert_eq!(results.len(), 2);
		assert!(matches!(results[1], Err(Error::Malformed { .. })));
	}

	#[test]
	fn test_not_a_stream() {
		let layout = SystemLayoutResolver::instance().record().clone();
		let row = RowBuffer::new_row(&layout, &RowConfig::default()).unwrap();
		assert!(matches!(RecordIoReader::new(row.as_slice()), Err(Error::Malformed { .. })));
		assert!(RecordIoReader::new(&[]).is_err());
	}
}
