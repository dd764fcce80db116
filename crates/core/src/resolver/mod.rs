// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod system;

use std::{fmt, sync::Arc};

use crossbeam_skiplist::SkipMap;
use hybridrow_type::{Error, Result, SchemaId};
use parking_lot::Mutex;
pub use system::SystemLayoutResolver;
use tracing::{debug, instrument};

use crate::{layout::Layout, schema::Namespace};

/// Maps a schema identity to its compiled layout.
///
/// Resolution is total over the ids a resolver knows: unknown ids always fail
/// with [`Error::SchemaNotFound`].
pub trait LayoutResolver: Send + Sync {
	fn resolve(&self, schema_id: SchemaId) -> Result<Layout>;
}

impl<T: LayoutResolver + ?Sized> LayoutResolver for Arc<T> {
	fn resolve(&self, schema_id: SchemaId) -> Result<Layout> {
		(**self).resolve(schema_id)
	}
}

impl<T: LayoutResolver + ?Sized> LayoutResolver for &T {
	fn resolve(&self, schema_id: SchemaId) -> Result<Layout> {
		(**self).resolve(schema_id)
	}
}

/// Resolver for user layouts, falling back to the system layouts.
///
/// Lookups are lock free; registrations are serialized by a write lock and
/// double checked against the cache.
#[derive(Clone)]
pub struct LayoutResolverNamespace(Arc<LayoutResolverNamespaceInner>);

struct LayoutResolverNamespaceInner {
	name: String,
	cache: SkipMap<SchemaId, Layout>,
	write_lock: Mutex<()>,
}

impl fmt::Debug for LayoutResolverNamespace {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LayoutResolverNamespace").field("name", &self.0.name).field("layouts", &self.0.cache.len()).finish()
	}
}

impl Default for LayoutResolverNamespace {
	fn default() -> Self {
		Self::new("default")
	}
}

impl LayoutResolverNamespace {
	pub fn new(name: impl Into<String>) -> Self {
		Self(Arc::new(LayoutResolverNamespaceInner {
			name: name.into(),
			cache: SkipMap::new(),
			write_lock: Mutex::new(()),
		}))
	}

	/// Compiles and registers every schema of `namespace`.
	#[instrument(name = "resolver::from_namespace", level = "debug", skip(namespace), fields(namespace = %namespace.name))]
	pub fn from_namespace(namespace: &Namespace) -> Result<Self> {
		let resolver = Self::new(namespace.name.clone());
		for schema in &namespace.schemas {
			resolver.register(schema.compile()?)?;
		}
		Ok(resolver)
	}

	pub fn name(&self) -> &str {
		&self.0.name
	}

	pub fn len(&self) -> usize {
		self.0.cache.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.cache.is_empty()
	}

	/// Registers `layout` under its schema id.
	///
	/// Registering an identical layout again is a no-op returning the cached
	/// instance; a different layout under a known id fails with
	/// [`Error::SchemaConflict`]. System ids cannot be redefined.
	#[instrument(name = "resolver::register", level = "debug", skip(self, layout), fields(schema_id = %layout.schema_id))]
	pub fn register(&self, layout: Layout) -> Result<Layout> {
		let schema_id = layout.schema_id;
		if schema_id.is_system() {
			return match SystemLayoutResolver::instance().resolve(schema_id) {
				Ok(system) if system.fingerprint == layout.fingerprint => Ok(system),
				_ => Err(Error::SchemaConflict(schema_id)),
			};
		}

		// Fast path
		if let Some(entry) = self.0.cache.get(&schema_id) {
			return Self::same(entry.value(), layout);
		}

		// Slow path
		let _guard = self.0.write_lock.lock();

		// Double-check after acquiring lock
		if let Some(entry) = self.0.cache.get(&schema_id) {
			return Self::same(entry.value(), layout);
		}

		self.0.cache.insert(schema_id, layout.clone());
		debug!(name = %layout.name, fingerprint = %layout.fingerprint, "layout registered");
		Ok(layout)
	}

	fn same(existing: &Layout, layout: Layout) -> Result<Layout> {
		if existing.fingerprint == layout.fingerprint {
			Ok(existing.clone())
		} else {
			Err(Error::SchemaConflict(layout.schema_id))
		}
	}

	pub fn schema_ids(&self) -> Vec<SchemaId> {
		self.0.cache.iter().map(|entry| *entry.key()).collect()
	}
}

impl LayoutResolver for LayoutResolverNamespace {
	#[instrument(name = "resolver::resolve", level = "trace", skip(self))]
	fn resolve(&self, schema_id: SchemaId) -> Result<Layout> {
		if let Some(entry) = self.0.cache.get(&schema_id) {
			return Ok(entry.value().clone());
		}
		SystemLayoutResolver::instance().resolve(schema_id)
	}
}

#[cfg(test)]
mod tests {
	use hybridrow_type::LayoutCode;

	use super::*;
	use crate::layout::LayoutBuilder;

	fn layout(id: i32, code: LayoutCode) -> Layout {
		LayoutBuilder::new("t").add_fixed_column("x", code).build(SchemaId(id)).unwrap()
	}

	mod register {
		use super::*;

		#[test]
		fn test_idempotent() {
			let resolver = LayoutResolverNamespace::default();
			let first = resolver.register(layout(1, LayoutCode::Int32)).unwrap();
			let second = resolver.register(layout(1, LayoutCode::Int32)).unwrap();
			assert_eq!(first, second);
			assert_eq!(resolver.len(), 1);
		}

		#[test]
		fn test_conflict() {
			let resolver = LayoutResolverNamespace::default();
			resolver.register(layout(1, LayoutCode::Int32)).unwrap();
			let err = resolver.register(layout(1, LayoutCode::Int64)).unwrap_err();
			assert_eq!(err, Error::SchemaConflict(SchemaId(1)));
			assert_eq!(resolver.resolve(SchemaId(1)).unwrap().fixed[0].code, LayoutCode::Int32);
		}

		#[test]
		fn test_system_ids_are_reserved() {
			let resolver = LayoutResolverNamespace::default();
			let err = resolver.register(layout(SchemaId::RECORD.id(), LayoutCode::Int32)).unwrap_err();
			assert_eq!(err, Error::SchemaConflict(SchemaId::RECORD));
		}
	}

	mod resolve {
		use super::*;

		#[test]
		fn test_unknown_id() {
			let resolver = LayoutResolverNamespace::default();
			assert_eq!(resolver.resolve(SchemaId(42)), Err(Error::SchemaNotFound(SchemaId(42))));
		}

		#[test]
		fn test_falls_back_to_system() {
			let resolver = LayoutResolverNamespace::default();
			assert_eq!(resolver.resolve(SchemaId::SEGMENT).unwrap().name, "Segment");
		}

		#[test]
		fn test_shared_across_threads() {
			let resolver = LayoutResolverNamespace::default();
			let handles = (1..=8)
				.map(|id| {
					let resolver = resolver.clone();
					std::thread::spawn(move || resolver.register(layout(id % 4 + 1, LayoutCode::Int32)).map(|_| ()))
				})
				.collect::<Vec<_>>();
			for handle in handles {
				handle.join().unwrap().unwrap();
			}
			assert_eq!(resolver.schema_ids(), vec![SchemaId(1), SchemaId(2), SchemaId(3), SchemaId(4)]);
		}
	}
}
