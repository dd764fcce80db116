// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Layouts used across the integration tests, declared as a namespace
//! document the way applications ship them.

use hybridrow_core::{Layout, LayoutResolver, LayoutResolverNamespace, RowBuffer, RowConfig, schema::Namespace};
use hybridrow_type::SchemaId;

pub const PERSON: SchemaId = SchemaId(1);
pub const ADDRESS: SchemaId = SchemaId(2);
pub const EVERYTHING: SchemaId = SchemaId(3);

pub const NAMESPACE: &str = r#"{
	"name": "Fixtures",
	"schemas": [
		{
			"name": "Person",
			"id": 1,
			"version": 1,
			"properties": [
				{ "path": "id", "type": { "kind": "guid", "storage": "fixed" } },
				{ "path": "age", "type": { "kind": "int32", "storage": "fixed" } },
				{ "path": "name", "type": { "kind": "utf8", "storage": "variable" } },
				{ "path": "bio", "type": { "kind": "utf8", "storage": "variable" } },
				{ "path": "phones", "type": { "kind": "array", "items": [ { "kind": "utf8" } ] } },
				{ "path": "scores", "type": { "kind": "map", "items": [ { "kind": "utf8" }, { "kind": "int64" } ] } },
				{ "path": "home", "type": { "kind": "schema", "schema_id": 2 } },
				{ "path": "nickname", "type": { "kind": "nullable", "items": [ { "kind": "utf8" } ] } },
				{ "path": "status", "type": { "kind": "tagged", "items": [ { "kind": "utf8" } ] } },
				{ "path": "coords", "type": { "kind": "tuple", "items": [ { "kind": "float64" }, { "kind": "float64" } ] } },
				{ "path": "extra", "type": { "kind": "object" } }
			]
		},
		{
			"name": "Address",
			"id": 2,
			"properties": [
				{ "path": "zip", "type": { "kind": "int32", "storage": "fixed" } },
				{ "path": "street", "type": { "kind": "utf8", "storage": "variable" } },
				{ "path": "city", "type": { "kind": "utf8", "storage": "variable" } }
			]
		},
		{
			"name": "Everything",
			"id": 3,
			"properties": [
				{ "path": "blob", "type": { "kind": "binary", "storage": "variable" } },
				{ "path": "count", "type": { "kind": "varuint", "storage": "variable" } },
				{ "path": "values", "type": { "kind": "object" } }
			]
		}
	]
}"#;

/// A resolver holding every fixture layout.
pub fn resolver() -> LayoutResolverNamespace {
	Namespace::from_json(NAMESPACE)
		.and_then(|namespace| LayoutResolverNamespace::from_namespace(&namespace))
		.unwrap_or_else(|err| panic!("fixture namespace: {err}"))
}

pub fn layout(resolver: &LayoutResolverNamespace, schema_id: SchemaId) -> Layout {
	resolver.resolve(schema_id).unwrap_or_else(|err| panic!("fixture layout {schema_id}: {err}"))
}

/// An empty row of `schema_id`.
pub fn row(resolver: &LayoutResolverNamespace, schema_id: SchemaId) -> RowBuffer {
	RowBuffer::new_row(&layout(resolver, schema_id), &RowConfig::default())
		.unwrap_or_else(|err| panic!("fixture row {schema_id}: {err}"))
}
