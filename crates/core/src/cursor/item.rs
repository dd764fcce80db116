// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use hybridrow_type::{LayoutCode, TypeArgument};

/// Addresses an item within the current scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Path<'p> {
	/// A column or object property.
	Name(&'p str),
	/// A position in a list-like scope.
	Index(usize),
	/// One past the last item.
	Append,
}

impl<'p> From<&'p str> for Path<'p> {
	fn from(name: &'p str) -> Self {
		Path::Name(name)
	}
}

impl<'p> From<&'p String> for Path<'p> {
	fn from(name: &'p String) -> Self {
		Path::Name(name)
	}
}

impl From<usize> for Path<'_> {
	fn from(index: usize) -> Self {
		Path::Index(index)
	}
}

impl Display for Path<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Path::Name(name) => f.write_str(name),
			Path::Index(index) => write!(f, "[{index}]"),
			Path::Append => f.write_str("[+]"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
	Fixed,
	Variable,
	Sparse,
}

/// The item a cursor is positioned on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
	/// Ordinal of the item among those yielded by its scope.
	pub index: usize,
	pub path: Option<String>,
	pub type_arg: TypeArgument,
	pub storage: Storage,
	/// First byte of the item, including its code and path if any.
	pub offset: usize,
	/// First byte of the value body.
	pub value_offset: usize,
	pub end: usize,
}

impl Item {
	pub fn code(&self) -> LayoutCode {
		self.type_arg.code
	}

	pub fn len(&self) -> usize {
		self.end - self.offset
	}

	pub fn is_empty(&self) -> bool {
		self.end == self.offset
	}

	/// The path as written in error messages.
	pub fn describe(&self) -> String {
		match &self.path {
			Some(path) => path.clone(),
			None => Path::Index(self.index).to_string(),
		}
	}
}
