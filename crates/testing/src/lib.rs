// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Shared fixtures for HybridRow tests.

pub mod fixture;
pub mod tempdir;

use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness. Filtered by `RUST_LOG`,
/// `warn` otherwise; later calls are no-ops.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_test_writer()
		.try_init();
}
