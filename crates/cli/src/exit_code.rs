// SPDX-License-Identifier: MIT

//! Process exit codes for the `cronplusd` harness.
//!
//! These are sysexits-flavored: `64` is `EX_USAGE` territory repurposed for
//! bad configuration, `70` is `EX_SOFTWARE`, `75` is `EX_TEMPFAIL`.

use cronplus_core::CronplusError;

pub const CLEAN_STOP: i32 = 0;
pub const BAD_CONFIG: i32 = 64;
pub const INTERNAL_ERROR: i32 = 70;
pub const STATE_STORE_UNAVAILABLE: i32 = 75;
pub const TERMINATED_BY_SIGNAL: i32 = 143;

/// Maps a top-level startup failure to the exit code a CLI harness around
/// the core should report.
pub fn for_engine_error(err: &CronplusError) -> i32 {
    match err {
        CronplusError::Config(_) => BAD_CONFIG,
        CronplusError::Storage(_) => STATE_STORE_UNAVAILABLE,
        _ => INTERNAL_ERROR,
    }
}
