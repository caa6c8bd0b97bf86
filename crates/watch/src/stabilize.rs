// SPDX-License-Identifier: MIT

//! Stabilization sampling: poll a file's size+mtime
//! until two consecutive samples separated by at least
//! `stabilizationMilliseconds` are identical, or the file disappears.

use std::time::Duration;

/// One size/mtime observation of a candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub size: u64,
    pub mtime_epoch_ms: u64,
}

/// A sample paired with the clock reading it was taken at.
#[derive(Debug, Clone, Copy)]
struct Observation {
    sample: Sample,
    at_ms: u64,
}

/// Drives the stabilization algorithm from successive poll samples. The
/// caller supplies samples (or `None` when the file is missing) and reads
/// back whether stabilization is complete.
pub struct Stabilizer {
    stabilization_ms: u64,
    first_of_run: Option<Observation>,
}

pub enum PollOutcome {
    /// Not yet stable; keep polling.
    Pending,
    /// The file vanished; the watcher must emit nothing for this path.
    Vanished,
    /// Two samples `stabilization_ms` apart were identical.
    Stable(Sample),
}

impl Stabilizer {
    pub fn new(stabilization_ms: u64) -> Self {
        Self { stabilization_ms, first_of_run: None }
    }

    /// Feed one poll sample taken at `now_ms`. `sample` is `None` if the
    /// file no longer exists.
    pub fn observe(&mut self, sample: Option<Sample>, now_ms: u64) -> PollOutcome {
        let Some(sample) = sample else {
            self.first_of_run = None;
            return PollOutcome::Vanished;
        };

        match self.first_of_run {
            Some(first) if first.sample == sample => {
                if now_ms.saturating_sub(first.at_ms) >= self.stabilization_ms {
                    PollOutcome::Stable(sample)
                } else {
                    PollOutcome::Pending
                }
            }
            _ => {
                self.first_of_run = Some(Observation { sample, at_ms: now_ms });
                PollOutcome::Pending
            }
        }
    }
}

/// Poll interval for stabilization sampling:
/// `max(debounce/4, 50ms)`.
pub fn poll_interval(debounce: Duration) -> Duration {
    (debounce / 4).max(Duration::from_millis(50))
}

#[cfg(test)]
#[path = "stabilize_tests.rs"]
mod tests;
