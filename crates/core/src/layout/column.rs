// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use hybridrow_type::{LayoutCode, TypeArgument};

/// A column stored at a fixed offset inside the fixed region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedColumn {
	pub name: String,
	pub code: LayoutCode,
	/// Offset from the start of the schematized region.
	pub offset: usize,
	pub size: usize,
	pub presence_bit: usize,
}

/// A column stored as the `index`-th cell of the variable region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableColumn {
	pub name: String,
	pub code: LayoutCode,
	pub index: usize,
	pub presence_bit: usize,
}

/// A declared path stored among the sparse items of the region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseColumn {
	pub name: String,
	pub type_arg: TypeArgument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutColumn<'a> {
	Fixed(&'a FixedColumn),
	Variable(&'a VariableColumn),
	Sparse(&'a SparseColumn),
}

impl LayoutColumn<'_> {
	pub fn name(&self) -> &str {
		match self {
			LayoutColumn::Fixed(column) => &column.name,
			LayoutColumn::Variable(column) => &column.name,
			LayoutColumn::Sparse(column) => &column.name,
		}
	}

	pub fn code(&self) -> LayoutCode {
		match self {
			LayoutColumn::Fixed(column) => column.code,
			LayoutColumn::Variable(column) => column.code,
			LayoutColumn::Sparse(column) => column.type_arg.code,
		}
	}

	pub fn type_arg(&self) -> TypeArgument {
		match self {
			LayoutColumn::Sparse(column) => column.type_arg.clone(),
			other => TypeArgument::scalar(other.code()),
		}
	}
}
