// SPDX-License-Identifier: MIT

//! Maps a [`StepKind`] discriminator to its [`Action`] implementation
//!: the executor never matches on step type
//! directly, so a plugin can register additional action types without
//! touching the built-ins.

use crate::action::Action;
use crate::{archive::ArchiveAction, copy::CopyAction, decision::DecisionAction, delete::DeleteAction, print::PrintAction, rest::RestAction};
use std::collections::HashMap;
use std::sync::Arc;

/// A registry of action implementations keyed by `StepKind::type_name()`.
/// Built with the six built-in action types; plugins register additional
/// entries via [`ActionRegistry::register`].
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// An empty registry with no actions registered.
    pub fn empty() -> Self {
        Self { actions: HashMap::new() }
    }

    /// The registry preloaded with the built-in action types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("copy", CopyAction);
        registry.register("delete", DeleteAction);
        registry.register("archive", ArchiveAction);
        registry.register("print", PrintAction);
        registry.register("rest", RestAction);
        registry.register("decision", DecisionAction);
        registry
    }

    pub fn register(&mut self, step_type: impl Into<String>, action: impl Action) {
        self.actions.insert(step_type.into(), Arc::new(action));
    }

    pub fn get(&self, step_type: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(step_type).cloned()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
