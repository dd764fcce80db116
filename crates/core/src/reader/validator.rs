// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use hybridrow_type::{Result, ScopeKind, Value};
use tracing::instrument;

use super::{RowReader, RowVisitor, visit_row};
use crate::{buffer::RowBuffer, resolver::LayoutResolver};

/// Counts items while [`visit_row`] decodes them; any structural fault
/// surfaces as the traversal's error.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowValidator {
	pub scalars: usize,
	pub scopes: usize,
}

impl RowVisitor for RowValidator {
	fn visit_scalar(&mut self, _reader: &RowReader<'_>, _value: Value) -> Result<()> {
		self.scalars += 1;
		Ok(())
	}

	fn enter_scope(&mut self, _reader: &RowReader<'_>, _kind: ScopeKind) -> Result<()> {
		self.scopes += 1;
		Ok(())
	}

	fn visit_empty_nullable(&mut self, _reader: &RowReader<'_>) -> Result<()> {
		self.scopes += 1;
		Ok(())
	}
}

/// Decodes every byte of a row, failing with `Malformed` or
/// `UnrecognizedTypeCode` on the first fault.
#[instrument(name = "reader::validate_row", level = "trace", skip_all, fields(len = buffer.len()))]
pub fn validate_row(buffer: &RowBuffer, resolver: &dyn LayoutResolver) -> Result<RowValidator> {
	let mut reader = RowReader::new(buffer, resolver)?;
	let mut validator = RowValidator::default();
	visit_row(&mut reader, &mut validator)?;
	Ok(validator)
}
