// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! In-memory schema descriptions and their compilation into layouts.
//!
//! The types deserialize from the namespace document format; parsing the
//! document text is left to serde.

mod kind;

use hybridrow_type::{Error, Result, SchemaId, ScopeKind, TypeArgument};
pub use kind::{PropertyKind, StorageKind};
use serde::{Deserialize, Serialize};

use crate::layout::{Layout, LayoutBuilder};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
	pub name: String,
	#[serde(default)]
	pub schemas: Vec<SchemaDescription>,
}

impl Namespace {
	pub fn from_json(json: &str) -> Result<Self> {
		serde_json::from_str(json).map_err(|err| Error::malformed(format!("namespace document: {err}")))
	}

	pub fn to_json(&self) -> Result<String> {
		serde_json::to_string_pretty(self).map_err(|err| Error::malformed(format!("namespace document: {err}")))
	}

	pub fn find(&self, name: &str) -> Option<&SchemaDescription> {
		self.schemas.iter().find(|schema| schema.name == name)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescription {
	pub name: String,
	pub id: SchemaId,
	#[serde(default)]
	pub version: u32,
	#[serde(default)]
	pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
	pub path: String,
	#[serde(rename = "type")]
	pub property_type: PropertyType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyType {
	pub kind: PropertyKind,
	#[serde(default)]
	pub storage: StorageKind,
	#[serde(default)]
	pub immutable: bool,
	/// Element types of structured kinds, in positional order.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub items: Vec<PropertyType>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub schema_id: Option<SchemaId>,
}

impl PropertyType {
	pub fn new(kind: PropertyKind) -> Self {
		Self {
			kind,
			storage: StorageKind::Sparse,
			immutable: false,
			items: vec![],
			schema_id: None,
		}
	}

	pub fn with_storage(mut self, storage: StorageKind) -> Self {
		self.storage = storage;
		self
	}

	pub fn with_items(mut self, items: Vec<PropertyType>) -> Self {
		self.items = items;
		self
	}

	pub fn immutable(mut self) -> Self {
		self.immutable = true;
		self
	}

	/// The type argument this declaration describes.
	pub fn type_argument(&self) -> Result<TypeArgument> {
		let type_arg = match self.kind.scalar_code() {
			Some(code) => {
				if !self.items.is_empty() {
					return Err(Error::invalid_layout(format!("{code} takes no item types")));
				}
				TypeArgument::scalar(code)
			}
			None => self.scope_argument()?,
		};
		type_arg.validate()?;
		Ok(if self.immutable {
			type_arg.immutable()
		} else {
			type_arg
		})
	}

	fn scope_argument(&self) -> Result<TypeArgument> {
		let items = self.items.iter().map(PropertyType::type_argument).collect::<Result<Vec<_>>>()?;
		let kind = match (self.kind, items.len()) {
			(PropertyKind::Object, 0) => ScopeKind::Object,
			(PropertyKind::Array, 0) => ScopeKind::Array,
			(PropertyKind::Array, 1) => ScopeKind::TypedArray,
			(PropertyKind::Set, 0) => ScopeKind::Set,
			(PropertyKind::Set, 1) => ScopeKind::TypedSet,
			(PropertyKind::Map, 0) => ScopeKind::Map,
			(PropertyKind::Map, 2) => ScopeKind::TypedMap,
			(PropertyKind::Tuple, 0) => ScopeKind::Tuple,
			(PropertyKind::Tuple, _) => ScopeKind::TypedTuple,
			(PropertyKind::Tagged, 1) => ScopeKind::Tagged,
			(PropertyKind::Tagged, 2) => ScopeKind::Tagged2,
			(PropertyKind::Nullable, 1) => ScopeKind::Nullable,
			(PropertyKind::Schema, 0) => {
				let id = self
					.schema_id
					.ok_or_else(|| Error::invalid_layout("schema property requires a schema id"))?;
				return Ok(TypeArgument::schema(id));
			}
			(kind, count) => {
				return Err(Error::invalid_layout(format!("{kind:?} does not take {count} item types")));
			}
		};
		Ok(TypeArgument::scope(kind, items))
	}
}

impl SchemaDescription {
	/// Reduces the description to layout builder calls.
	pub fn compile(&self) -> Result<Layout> {
		let mut builder = LayoutBuilder::new(self.name.clone());
		for property in &self.properties {
			let type_arg = property.property_type.type_argument()?;
			match property.property_type.storage {
				StorageKind::Fixed => builder.add_fixed_column(property.path.clone(), type_arg.code),
				StorageKind::Variable => builder.add_variable_column(property.path.clone(), type_arg.code),
				StorageKind::Sparse => builder.add_sparse_column(property.path.clone(), type_arg),
			};
		}
		builder.build(self.id)
	}
}
