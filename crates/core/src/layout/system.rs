// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Layouts every process knows without registration.

use hybridrow_type::{LayoutCode, SchemaId};

use super::{Layout, LayoutBuilder};

pub const RECORD_NAME: &str = "Record";
pub const SEGMENT_NAME: &str = "Segment";

pub mod record {
	pub const SCHEMA_ID: &str = "schema_id";
	pub const VERSION: &str = "version";
	pub const LENGTH: &str = "length";
}

pub mod segment {
	pub const LENGTH: &str = "length";
	pub const ROW_COUNT: &str = "row_count";
	pub const COMMENT: &str = "comment";
	pub const SDL: &str = "sdl";
}

fn record_builder() -> LayoutBuilder {
	let mut builder = LayoutBuilder::new(RECORD_NAME);
	builder
		.add_fixed_column(record::SCHEMA_ID, LayoutCode::Int32)
		.add_fixed_column(record::VERSION, LayoutCode::UInt8)
		.add_fixed_column(record::LENGTH, LayoutCode::Int32);
	builder
}

fn segment_builder() -> LayoutBuilder {
	let mut builder = LayoutBuilder::new(SEGMENT_NAME);
	builder
		.add_fixed_column(segment::LENGTH, LayoutCode::Int32)
		.add_fixed_column(segment::ROW_COUNT, LayoutCode::Int32)
		.add_variable_column(segment::COMMENT, LayoutCode::Utf8)
		.add_variable_column(segment::SDL, LayoutCode::Utf8);
	builder
}

/// Envelope preceding each row in a record stream.
pub fn record_layout() -> Layout {
	record_builder().compile(SchemaId::RECORD)
}

/// Header opening a record stream.
pub fn segment_layout() -> Layout {
	segment_builder().compile(SchemaId::SEGMENT)
}
