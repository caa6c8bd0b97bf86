// SPDX-License-Identifier: MIT

//! Per-task supervisor lifecycle state machine.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a task's supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SupervisorState {
    Created,
    Initializing,
    Idle,
    Processing,
    Paused,
    Stopping,
    Stopped,
    Failed,
    Degraded,
}

crate::simple_display! {
    SupervisorState {
        Created => "Created",
        Initializing => "Initializing",
        Idle => "Idle",
        Processing => "Processing",
        Paused => "Paused",
        Stopping => "Stopping",
        Stopped => "Stopped",
        Failed => "Failed",
        Degraded => "Degraded",
    }
}

impl SupervisorState {
    /// Legal transitions for this supervisor state machine.
    pub fn can_transition_to(self, next: SupervisorState) -> bool {
        use SupervisorState::*;
        matches!(
            (self, next),
            (Created, Initializing)
                | (Created, Stopped)
                | (Initializing, Idle)
                | (Initializing, Failed)
                | (Initializing, Stopped)
                | (Idle, Processing)
                | (Idle, Paused)
                | (Idle, Stopping)
                | (Idle, Degraded)
                | (Processing, Idle)
                | (Processing, Paused)
                | (Processing, Stopping)
                | (Processing, Failed)
                | (Processing, Degraded)
                | (Paused, Idle)
                | (Paused, Stopping)
                | (Stopping, Stopped)
                | (Stopping, Failed)
                | (Stopped, Initializing)
                | (Failed, Initializing)
                | (Degraded, Idle)
                | (Degraded, Failed)
                | (Degraded, Stopping)
        )
    }

    /// Attempts the transition, returning the new state or the rejected
    /// `(from, to)` pair.
    pub fn transition(self, next: SupervisorState) -> Result<SupervisorState, (SupervisorState, SupervisorState)> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err((self, next))
        }
    }

    /// Whether a Supervisor in this state is actively driving its Watcher
    /// and worker pool.
    pub fn is_live(self) -> bool {
        matches!(self, SupervisorState::Idle | SupervisorState::Processing)
    }
}

#[cfg(test)]
#[path = "supervisor_state_tests.rs"]
mod tests;
