// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cronplus-config: parses and validates the external configuration
//! document into the `cronplus-core` data model.

pub mod document;
pub mod error;
pub mod loader;
pub mod runtime;
pub mod validate;

pub use document::EngineConfig;
pub use error::ConfigError;
pub use loader::{load_from_hcl, load_from_path, load_from_toml};
pub use runtime::RuntimeConfig;
pub use validate::validate;
