// SPDX-License-Identifier: MIT

//! Archive action: rename into the destination directory,
//! falling back to copy+delete across devices, with configurable conflict
//! handling.

use crate::action::{Action, ActionInput, ActionResult};
use crate::cancel::run_cancelable;
use async_trait::async_trait;
use cronplus_core::{ArchiveParams, ConflictStrategy, CronplusError};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub struct ArchiveAction;

#[async_trait]
impl Action for ArchiveAction {
    async fn run(&self, input: ActionInput<'_>) -> Result<ActionResult, CronplusError> {
        let params: ArchiveParams = serde_json::from_value(input.params.clone())
            .map_err(|e| CronplusError::ActionFailed(format!("invalid archive parameters: {e}")))?;
        let started = Instant::now();
        let source = input.ctx.file.path.clone();

        let (destination, skipped) = run_cancelable(input.cancellation, archive_file(&source, &params)).await?;
        tracing::debug!(source = %source.display(), destination = %destination.display(), skipped, "archive action completed");

        let outputs = serde_json::json!({
            "destinationPath": destination.to_string_lossy(),
            "skipped": skipped,
        });
        if skipped {
            Ok(ActionResult::skipped(outputs, started.elapsed()))
        } else {
            Ok(ActionResult::success(outputs, started.elapsed()))
        }
    }
}

async fn archive_file(source: &Path, params: &ArchiveParams) -> Result<(PathBuf, bool), CronplusError> {
    tokio::fs::create_dir_all(&params.destination_directory).await?;
    let basename = source.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let mut destination = params.destination_directory.join(&basename);

    if destination.exists() {
        match params.conflict_strategy {
            ConflictStrategy::Skip => return Ok((destination, true)),
            ConflictStrategy::Overwrite => {
                tokio::fs::remove_file(&destination).await?;
            }
            ConflictStrategy::Rename => {
                destination = params.destination_directory.join(renamed_basename(&basename));
            }
        }
    }

    move_file(source, &destination).await?;
    Ok((destination, false))
}

/// Append an 8-hex suffix derived from the current timestamp and basename.
fn renamed_basename(basename: &str) -> String {
    let epoch_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(epoch_ms.to_le_bytes());
    hasher.update(basename.as_bytes());
    let digest = hex::encode(hasher.finalize());
    let suffix = &digest[..8];

    match basename.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}-{suffix}.{ext}"),
        None => format!("{basename}-{suffix}"),
    }
}

async fn move_file(source: &Path, destination: &Path) -> Result<(), CronplusError> {
    match tokio::fs::rename(source, destination).await {
        Ok(()) => Ok(()),
        Err(err) if is_cross_device(&err) => {
            tokio::fs::copy(source, destination).await?;
            tokio::fs::File::open(destination).await?.sync_all().await?;
            tokio::fs::remove_file(source).await?;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn is_cross_device(err: &std::io::Error) -> bool {
    err.raw_os_error() == Some(libc_exdev())
}

/// `EXDEV` (18 on Linux) without pulling in the `libc` crate for one constant.
const fn libc_exdev() -> i32 {
    18
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
