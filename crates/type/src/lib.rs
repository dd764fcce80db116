// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Leaf types shared by every HybridRow crate: the error taxonomy, schema
//! identities, the closed layout-code tag set, type arguments, runtime values
//! and the scalar byte codecs they are stored with.

pub mod code;
pub mod error;
mod schema_id;
pub mod type_arg;
pub mod util;
pub mod value;

pub use code::{LayoutCode, ScopeKind};
pub use error::{Error, ErrorClass, Result};
pub use schema_id::{HybridRowVersion, SchemaId};
pub use type_arg::{TypeArgument, TypeArgumentList};
pub use value::{DateTime, Decimal, FixedValue, Float128, ObjectId, UnixDateTime, Value};
