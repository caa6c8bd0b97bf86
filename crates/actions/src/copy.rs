// SPDX-License-Identifier: MIT

//! Copy action: atomic write-through-temp-then-rename, with
//! optional post-write checksum verification.

use crate::action::{Action, ActionInput, ActionResult};
use crate::cancel::run_cancelable;
use async_trait::async_trait;
use cronplus_core::{CopyParams, CronplusError};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::AsyncReadExt;

pub struct CopyAction;

#[async_trait]
impl Action for CopyAction {
    async fn run(&self, input: ActionInput<'_>) -> Result<ActionResult, CronplusError> {
        let params: CopyParams = serde_json::from_value(input.params.clone())
            .map_err(|e| CronplusError::ActionFailed(format!("invalid copy parameters: {e}")))?;
        let started = Instant::now();

        let source = input.ctx.file.path.clone();
        let filename = params
            .destination_filename
            .clone()
            .unwrap_or_else(|| source.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());
        let destination = params.destination_directory.join(&filename);

        run_cancelable(input.cancellation, copy_file(&source, &destination, params.atomic, params.verify_checksum)).await?;
        tracing::debug!(source = %source.display(), destination = %destination.display(), atomic = params.atomic, "copy action completed");

        let outputs = serde_json::json!({
            "destinationPath": destination.to_string_lossy(),
            "atomic": params.atomic,
            "checksumVerified": params.verify_checksum,
        });
        Ok(ActionResult::success(outputs, started.elapsed()))
    }
}

async fn copy_file(source: &Path, destination: &Path, atomic: bool, verify_checksum: bool) -> Result<(), CronplusError> {
    let dest_dir = destination.parent().unwrap_or(destination);
    tokio::fs::create_dir_all(dest_dir).await?;

    if atomic {
        let tmp = sibling_temp_path(destination);
        if let Err(err) = tokio::fs::copy(source, &tmp).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        if verify_checksum {
            if let Err(err) = verify(source, &tmp).await {
                let _ = tokio::fs::remove_file(&tmp).await;
                return Err(err);
            }
        }
        if let Err(err) = tokio::fs::rename(&tmp, destination).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        return Ok(());
    }

    tokio::fs::copy(source, destination).await?;
    if verify_checksum {
        if let Err(err) = verify(source, destination).await {
            let _ = tokio::fs::remove_file(destination).await;
            return Err(err);
        }
    }
    Ok(())
}

/// Streaming SHA-256 comparison so checksum verification never loads a full
/// file into memory, matching the executor's fingerprinting.
async fn verify(source: &Path, destination: &Path) -> Result<(), CronplusError> {
    let (source_digest, dest_digest) = tokio::try_join!(hash_file(source), hash_file(destination))?;
    if source_digest != dest_digest {
        return Err(CronplusError::ActionFailed(format!(
            "checksum mismatch copying {} to {}",
            source.display(),
            destination.display()
        )));
    }
    Ok(())
}

async fn hash_file(path: &Path) -> Result<String, CronplusError> {
    use sha2::{Digest, Sha256};

    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn sibling_temp_path(destination: &Path) -> PathBuf {
    let dir = destination.parent().unwrap_or(destination);
    let name = destination.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    dir.join(format!(".cronplus-tmp-{name}"))
}

#[cfg(test)]
#[path = "copy_tests.rs"]
mod tests;
