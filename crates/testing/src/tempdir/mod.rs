// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	env, fs,
	path::{Path, PathBuf},
};

use uuid::Uuid;

/// Runs `f` with a fresh directory that is removed afterwards.
pub fn temp_dir<F, T>(f: F) -> std::io::Result<T>
where
	F: FnOnce(&Path) -> std::io::Result<T>,
{
	let mut path = env::temp_dir();
	path.push(format!("hybridrow-{}", Uuid::new_v4()));

	fs::create_dir(&path)?;
	let result = f(&path);

	let _ = fs::remove_dir_all(&path);
	result
}

/// Writes `bytes` to `name` inside `dir` and reads them back.
pub fn persist(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<Vec<u8>> {
	let file: PathBuf = dir.join(name);
	fs::write(&file, bytes)?;
	fs::read(&file)
}
