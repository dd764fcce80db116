// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use hybridrow_type::{Result, ScopeKind, Value};

use super::{RowReader, RowVisitor, visit_row};
use crate::{buffer::RowBuffer, resolver::LayoutResolver};

const INDENT: &str = "  ";

/// Renders a row as indented text, one item per line.
#[derive(Debug, Default)]
pub struct RowPrinter {
	out: String,
	indent: usize,
}

impl RowPrinter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn print(buffer: &RowBuffer, resolver: &dyn LayoutResolver) -> Result<String> {
		let mut reader = RowReader::new(buffer, resolver)?;
		let mut printer = Self::new();
		visit_row(&mut reader, &mut printer)?;
		Ok(printer.finish())
	}

	pub fn finish(self) -> String {
		self.out
	}

	fn line(&mut self, reader: &RowReader<'_>, suffix: &str) {
		let label = reader.current().map(|item| item.describe()).unwrap_or_default();
		let type_arg = reader.type_arg().map(ToString::to_string).unwrap_or_default();
		self.out.push_str(&INDENT.repeat(self.indent));
		self.out.push_str(&format!("{label}: {type_arg}{suffix}\n"));
	}
}

impl RowVisitor for RowPrinter {
	fn visit_scalar(&mut self, reader: &RowReader<'_>, value: Value) -> Result<()> {
		self.line(reader, &format!(" = {value}"));
		Ok(())
	}

	fn enter_scope(&mut self, reader: &RowReader<'_>, _kind: ScopeKind) -> Result<()> {
		self.line(reader, " {");
		self.indent += 1;
		Ok(())
	}

	fn exit_scope(&mut self, _reader: &RowReader<'_>, _kind: ScopeKind) -> Result<()> {
		self.indent = self.indent.saturating_sub(1);
		self.out.push_str(&INDENT.repeat(self.indent));
		self.out.push_str("}\n");
		Ok(())
	}

	fn visit_empty_nullable(&mut self, reader: &RowReader<'_>) -> Result<()> {
		self.line(reader, " = null");
		Ok(())
	}
}
