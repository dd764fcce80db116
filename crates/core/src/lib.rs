// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The HybridRow encoding engine.
//!
//! A row is a contiguous little-endian buffer: a five byte header naming the
//! format version and the row's [`SchemaId`], followed by the schematized
//! region described by that schema's compiled [`Layout`]. Rows are read with
//! a [`RowReader`] and built or edited with a [`RowWriter`]; both walk the
//! buffer through a stack of [`RowCursor`]s and never parse more than the
//! scopes they visit.

pub mod buffer;
pub mod config;
pub mod cursor;
pub mod layout;
pub mod reader;
pub mod record;
pub mod resolver;
pub mod schema;
pub mod writer;

pub use buffer::{HEADER_SIZE, MemoryResizer, Resizer, RowBuffer};
pub use config::RowConfig;
pub use cursor::{Item, Path, RowCursor, Storage};
pub use hybridrow_type::{
	Error, ErrorClass, HybridRowVersion, LayoutCode, Result, SchemaId, ScopeKind, TypeArgument, TypeArgumentList,
	Value,
};
pub use layout::{FixedColumn, Layout, LayoutBuilder, LayoutColumn, SparseColumn, VariableColumn};
pub use reader::{RowHasher, RowPrinter, RowReader, RowValidator, RowVisitor, validate_row, visit_row};
pub use record::{RecordIoReader, RecordIoWriter, Segment};
pub use resolver::{LayoutResolver, LayoutResolverNamespace, SystemLayoutResolver};
pub use writer::{RowWriter, UpdateMode};
