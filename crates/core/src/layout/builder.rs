// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashSet, sync::Arc};

use hybridrow_type::{Error, LayoutCode, Result, SchemaId, TypeArgument};
use tracing::{debug, instrument};

use super::{FixedColumn, Layout, LayoutInner, SparseColumn, VariableColumn, align_up, fingerprint};

/// Collects column declarations and freezes them into a [`Layout`].
///
/// Declaration order is significant: the same sequence of calls always yields
/// the same offsets, presence bits and fingerprint.
#[derive(Debug, Clone, Default)]
pub struct LayoutBuilder {
	name: String,
	fixed: Vec<(String, LayoutCode)>,
	variable: Vec<(String, LayoutCode)>,
	sparse: Vec<(String, TypeArgument)>,
}

impl LayoutBuilder {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	pub fn add_fixed_column(&mut self, name: impl Into<String>, code: LayoutCode) -> &mut Self {
		self.fixed.push((name.into(), code));
		self
	}

	pub fn add_variable_column(&mut self, name: impl Into<String>, code: LayoutCode) -> &mut Self {
		self.variable.push((name.into(), code));
		self
	}

	pub fn add_sparse_column(&mut self, name: impl Into<String>, type_arg: TypeArgument) -> &mut Self {
		self.sparse.push((name.into(), type_arg));
		self
	}

	#[instrument(name = "layout::build", level = "debug", skip(self), fields(name = %self.name))]
	pub fn build(&self, schema_id: SchemaId) -> Result<Layout> {
		self.validate(schema_id)?;
		let layout = self.compile(schema_id);
		debug!(
			fixed = layout.fixed.len(),
			variable = layout.variable.len(),
			sparse = layout.sparse.len(),
			size = layout.size(),
			"layout compiled"
		);
		Ok(layout)
	}

	fn validate(&self, schema_id: SchemaId) -> Result<()> {
		if !schema_id.is_valid() {
			return Err(Error::invalid_layout(format!("layout '{}' has no valid schema id", self.name)));
		}

		let mut seen = HashSet::new();
		let names = self
			.fixed
			.iter()
			.map(|(name, _)| name)
			.chain(self.variable.iter().map(|(name, _)| name))
			.chain(self.sparse.iter().map(|(name, _)| name));
		for name in names {
			if name.is_empty() {
				return Err(Error::invalid_layout("column names must not be empty"));
			}
			if !seen.insert(name.as_str()) {
				return Err(Error::invalid_layout(format!("duplicate column '{name}'")));
			}
		}

		if let Some((name, code)) = self.fixed.iter().find(|(_, code)| !code.is_fixed()) {
			return Err(Error::invalid_layout(format!("{code} column '{name}' cannot be fixed")));
		}
		if let Some((name, code)) = self.variable.iter().find(|(_, code)| !code.is_variable()) {
			return Err(Error::invalid_layout(format!("{code} column '{name}' cannot be variable")));
		}
		for (name, type_arg) in &self.sparse {
			type_arg.validate().map_err(|err| Error::invalid_layout(format!("column '{name}': {err}")))?;
		}
		Ok(())
	}

	/// Assigns offsets without validating; callers guarantee well-formed input.
	pub(crate) fn compile(&self, schema_id: SchemaId) -> Layout {
		let mut offset = 0;
		let mut max_align = 1;
		let mut fixed = Vec::with_capacity(self.fixed.len());

		for (bit, (name, code)) in self.fixed.iter().enumerate() {
			let size = code.fixed_size().unwrap_or(0);
			let align = code.alignment();

			offset = align_up(offset, align);
			fixed.push(FixedColumn {
				name: name.clone(),
				code: *code,
				offset,
				size,
				presence_bit: bit,
			});

			offset += size;
			max_align = max_align.max(align);
		}

		let fixed_size = align_up(offset, max_align);

		let variable = self
			.variable
			.iter()
			.enumerate()
			.map(|(index, (name, code))| VariableColumn {
				name: name.clone(),
				code: *code,
				index,
				presence_bit: fixed.len() + index,
			})
			.collect::<Vec<_>>();

		let sparse = self
			.sparse
			.iter()
			.map(|(name, type_arg)| SparseColumn {
				name: name.clone(),
				type_arg: type_arg.clone(),
			})
			.collect::<Vec<_>>();

		let bitmap_size = (fixed.len() + variable.len()).div_ceil(8);
		let fingerprint = fingerprint(&self.name, schema_id, &fixed, &variable, &sparse);

		Layout(Arc::new(LayoutInner {
			name: self.name.clone(),
			schema_id,
			fixed,
			variable,
			sparse,
			fixed_size,
			bitmap_size,
			fingerprint,
		}))
	}
}
