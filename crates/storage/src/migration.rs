// SPDX-License-Identifier: MIT

//! Snapshot schema migrations, applied on load when an on-disk snapshot's
//! version lags the current one.

use crate::error::StorageError;
use serde_json::Value;

/// A single version-to-version transform over the raw snapshot document.
pub trait Migration {
    fn source_version(&self) -> u32;
    fn target_version(&self) -> u32;
    fn migrate(&self, snapshot: &mut Value) -> Result<(), StorageError>;
}

#[derive(Default)]
pub struct MigrationRegistry {
    migrations: Vec<Box<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self { migrations: Vec::new() }
    }

    pub fn register(&mut self, migration: Box<dyn Migration>) {
        self.migrations.push(migration);
    }

    /// Walk `snapshot` forward to `target_version`, applying one registered
    /// migration per version hop. `snapshot["v"]` is expected to hold the
    /// current version as a `u64`.
    pub fn migrate_to(&self, mut snapshot: Value, target_version: u32) -> Result<Value, StorageError> {
        let mut current = snapshot.get("v").and_then(Value::as_u64).unwrap_or(0) as u32;

        if current > target_version {
            return Err(StorageError::SnapshotTooNew(current, target_version));
        }

        while current < target_version {
            let next = self.migrations.iter().find(|m| m.source_version() == current);
            let Some(migration) = next else {
                return Err(StorageError::NoMigrationPath(current, target_version));
            };
            migration.migrate(&mut snapshot)?;
            current = migration.target_version();
            if let Some(obj) = snapshot.as_object_mut() {
                obj.insert("v".to_string(), Value::from(current));
            }
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
