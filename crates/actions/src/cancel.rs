// SPDX-License-Identifier: MIT

//! Shared cancellation plumbing.

use cronplus_core::CronplusError;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Race `fut` against `cancellation`, returning [`CronplusError::Cancelled`]
/// if the token fires first.
pub async fn run_cancelable<T>(cancellation: &CancellationToken, fut: impl Future<Output = Result<T, CronplusError>>) -> Result<T, CronplusError> {
    tokio::select! {
        biased;
        _ = cancellation.cancelled() => Err(CronplusError::Cancelled),
        result = fut => result,
    }
}
