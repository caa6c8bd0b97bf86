// SPDX-License-Identifier: MIT

//! Tracing setup shared by every subcommand.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a `tracing-subscriber` registry writing structured logs to
/// stderr, level controlled by `RUST_LOG` (defaults to `info`).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(std::io::stderr)).try_init();
}
