// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use hybridrow_type::{Error, Result};
use serde::{Deserialize, Serialize};

/// How a write treats an existing item at its path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateMode {
	/// Fails with `Exists` if the path is present.
	Insert,
	/// Fails with `NotFound` if the path is absent.
	Update,
	/// Writes whether or not the path is present.
	#[default]
	Upsert,
	/// Inserts before the item at an index, shifting later items.
	InsertAt,
}

impl UpdateMode {
	pub const fn name(&self) -> &'static str {
		match self {
			UpdateMode::Insert => "Insert",
			UpdateMode::Update => "Update",
			UpdateMode::Upsert => "Upsert",
			UpdateMode::InsertAt => "InsertAt",
		}
	}

	/// Checks the mode against whether `path` currently holds a value.
	pub fn check(&self, present: bool, path: impl Display) -> Result<()> {
		match (self, present) {
			(UpdateMode::Insert, true) => Err(Error::exists(path.to_string())),
			(UpdateMode::Update, false) => Err(Error::not_found(path.to_string())),
			_ => Ok(()),
		}
	}
}

impl Display for UpdateMode {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
