// SPDX-License-Identifier: MIT

//! Delete action: optional secure overwrite passes, optional
//! backup-before-delete, missing file is a no-op success.

use crate::action::{Action, ActionInput, ActionResult};
use crate::cancel::run_cancelable;
use async_trait::async_trait;
use cronplus_core::{CronplusError, DeleteParams};
use rand::RngCore;
use std::path::Path;
use std::time::Instant;

pub struct DeleteAction;

#[async_trait]
impl Action for DeleteAction {
    async fn run(&self, input: ActionInput<'_>) -> Result<ActionResult, CronplusError> {
        let params: DeleteParams = serde_json::from_value(input.params.clone())
            .map_err(|e| CronplusError::ActionFailed(format!("invalid delete parameters: {e}")))?;
        let started = Instant::now();
        let path = input.ctx.file.path.clone();

        if !path.exists() {
            return Ok(ActionResult::skipped(serde_json::json!({"deleted": false, "reason": "missing"}), started.elapsed()));
        }

        run_cancelable(input.cancellation, delete_file(&path, &params)).await?;
        tracing::debug!(path = %path.display(), passes = params.secure_overwrite_passes, "delete action completed");

        Ok(ActionResult::success(serde_json::json!({"deleted": true}), started.elapsed()))
    }
}

async fn delete_file(path: &Path, params: &DeleteParams) -> Result<(), CronplusError> {
    let metadata = tokio::fs::symlink_metadata(path).await?;
    if params.require_regular_file && !metadata.is_file() {
        return Err(CronplusError::PreconditionFailed(format!("{} is not a regular file", path.display())));
    }

    if let Some(backup_path) = &params.backup_path {
        if let Some(parent) = backup_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(path, backup_path).await?;
    }

    if params.secure_overwrite_passes > 0 {
        overwrite_passes(path, metadata.len(), params.secure_overwrite_passes).await?;
    }

    tokio::fs::remove_file(path).await?;

    if params.delete_empty_parents {
        remove_empty_parents(path).await;
    }

    Ok(())
}

/// Overwrite the file's content `passes` times before unlinking it: zeros,
/// then ones, then random bytes for the final pass.
async fn overwrite_passes(path: &Path, len: u64, passes: u32) -> Result<(), CronplusError> {
    let size = len as usize;
    for pass in 0..passes {
        let buf = match (pass, passes) {
            (p, total) if p + 1 == total => random_buffer(size),
            (0, _) => vec![0x00u8; size],
            _ => vec![0xFFu8; size],
        };
        tokio::fs::write(path, &buf).await?;
    }
    Ok(())
}

fn random_buffer(size: usize) -> Vec<u8> {
    let mut buf = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

async fn remove_empty_parents(path: &Path) {
    let mut dir = path.parent();
    while let Some(d) = dir {
        match tokio::fs::read_dir(d).await {
            Ok(mut entries) => match entries.next_entry().await {
                Ok(None) => {
                    if tokio::fs::remove_dir(d).await.is_err() {
                        break;
                    }
                    dir = d.parent();
                }
                _ => break,
            },
            Err(_) => break,
        }
    }
}

#[cfg(test)]
#[path = "delete_tests.rs"]
mod tests;
