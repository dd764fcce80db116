// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use hybridrow_type::{Error, Result, SchemaId};
use once_cell::sync::Lazy;

use super::LayoutResolver;
use crate::layout::{
	Layout,
	system::{record_layout, segment_layout},
};

static SYSTEM: Lazy<SystemLayoutResolver> = Lazy::new(|| SystemLayoutResolver {
	record: record_layout(),
	segment: segment_layout(),
});

/// Process-wide resolver for the built-in Record and Segment layouts.
#[derive(Debug)]
pub struct SystemLayoutResolver {
	record: Layout,
	segment: Layout,
}

impl SystemLayoutResolver {
	pub fn instance() -> &'static SystemLayoutResolver {
		&SYSTEM
	}

	pub fn record(&self) -> &Layout {
		&self.record
	}

	pub fn segment(&self) -> &Layout {
		&self.segment
	}
}

impl LayoutResolver for SystemLayoutResolver {
	fn resolve(&self, schema_id: SchemaId) -> Result<Layout> {
		match schema_id {
			SchemaId::RECORD => Ok(self.record.clone()),
			SchemaId::SEGMENT => Ok(self.segment.clone()),
			other => Err(Error::SchemaNotFound(other)),
		}
	}
}
