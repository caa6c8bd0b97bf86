// SPDX-License-Identifier: MIT

//! Zstd-compressed point-in-time snapshots, used to bound WAL replay time on
//! restart.

use crate::error::StorageError;
use crate::migration::MigrationRegistry;
use crate::wal::rotate_bak_path;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot<T> {
    #[serde(rename = "v")]
    pub version: u32,
    /// WAL sequence number at the time of snapshot.
    pub seq: u64,
    pub state: T,
    pub created_at: DateTime<Utc>,
}

/// Load and decompress the snapshot at `path`, migrating it to
/// `current_version` if it lags. Returns `None` if no snapshot exists yet.
pub fn load_snapshot<T>(
    path: &Path,
    current_version: u32,
    registry: &MigrationRegistry,
) -> Result<Option<Snapshot<T>>, StorageError>
where
    T: DeserializeOwned,
{
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(path)?;
    let mut decoder = zstd::stream::Decoder::new(file)?;
    let mut raw = String::new();
    decoder.read_to_string(&mut raw)?;

    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let migrated = registry.migrate_to(value, current_version)?;
    let snapshot: Snapshot<T> = serde_json::from_value(migrated)?;
    Ok(Some(snapshot))
}

/// Write `snapshot` to `path`, zstd-compressed, rotating any prior snapshot
/// to `.bak` first so a crash mid-write never destroys the last good copy.
pub fn store_snapshot<T>(path: &Path, snapshot: &Snapshot<T>) -> Result<(), StorageError>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    {
        let file = File::create(&tmp_path)?;
        let mut encoder = zstd::stream::Encoder::new(file, 3)?;
        let json = serde_json::to_vec(snapshot)?;
        encoder.write_all(&json)?;
        let file = encoder.finish()?;
        file.sync_all()?;
    }
    if path.exists() {
        let bak = rotate_bak_path(path);
        fs::rename(path, bak)?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
