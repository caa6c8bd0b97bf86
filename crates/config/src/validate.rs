// SPDX-License-Identifier: MIT

//! Structural validation applied after parsing, independent of format.

use crate::document::EngineConfig;
use crate::error::ConfigError;
use std::collections::HashSet;

pub fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();
    for task in &config.tasks {
        let task_id = task.id.as_str().to_string();
        if !seen_ids.insert(task_id.clone()) {
            return Err(ConfigError::DuplicateTaskId(task_id));
        }

        if task.pipeline.is_empty() {
            return Err(ConfigError::EmptyPipeline { task_id });
        }

        if task.watch.directory.is_relative() {
            return Err(ConfigError::RelativeWatchDirectory {
                task_id,
                directory: task.watch.directory.clone(),
            });
        }

        for step in &task.pipeline {
            if let Err(source) = step.resolve() {
                return Err(ConfigError::InvalidStep {
                    task_id: task_id.clone(),
                    step_name: step.name.clone(),
                    message: source.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
