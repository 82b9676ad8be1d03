//! # Status: Aggregate View over Signals
//!
//! Any collection of signals is in exactly one of three states:
//!
//! | state | condition |
//! |---|---|
//! | `Success` | no signal at all |
//! | `Warning` | at least one signal, none a failure |
//! | `Error` | at least one failure |

use crate::signal::Signal;
use serde::{Deserialize, Serialize};

/// The derived state of a signal collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Warning,
    Error,
}

impl Status {
    pub fn of(signals: &[Signal]) -> Self {
        if signals.iter().any(Signal::is_failure) {
            Status::Error
        } else if signals.is_empty() {
            Status::Success
        } else {
            Status::Warning
        }
    }
}

/// Read-only status view shared by every container.
pub trait ItemStatus {
    /// All signals, in insertion order.
    fn signals(&self) -> &[Signal];

    fn status(&self) -> Status {
        Status::of(self.signals())
    }

    fn complete_success(&self) -> bool {
        self.signals().is_empty()
    }

    fn complete_with_errors(&self) -> bool {
        self.signals().iter().any(Signal::is_failure)
    }

    fn complete_with_warnings(&self) -> bool {
        !self.signals().is_empty() && !self.complete_with_errors()
    }

    /// Warnings only, in insertion order.
    fn alerts(&self) -> Vec<&Signal> {
        self.signals().iter().filter(|s| s.is_warning()).collect()
    }

    /// Failures only, in insertion order.
    fn errors(&self) -> Vec<&Signal> {
        self.signals().iter().filter(|s| s.is_failure()).collect()
    }
}

impl ItemStatus for [Signal] {
    fn signals(&self) -> &[Signal] {
        self
    }
}

impl ItemStatus for Vec<Signal> {
    fn signals(&self) -> &[Signal] {
        self
    }
}

/// Anything that can hand over its signals by value.
pub trait IntoSignals {
    fn into_signals(self) -> Vec<Signal>;
}

impl IntoSignals for Signal {
    fn into_signals(self) -> Vec<Signal> {
        vec![self]
    }
}

impl IntoSignals for Vec<Signal> {
    fn into_signals(self) -> Vec<Signal> {
        self
    }
}

impl IntoSignals for Option<Signal> {
    fn into_signals(self) -> Vec<Signal> {
        self.into_iter().collect()
    }
}

pub(crate) fn has_failure(signals: &[Signal]) -> bool {
    signals.iter().any(Signal::is_failure)
}

/// Split a signal list for composition: `Ok(warnings)` when it may continue,
/// `Err(signals)` when a failure halts it.
pub(crate) fn gate(signals: Vec<Signal>) -> Result<Vec<Signal>, Vec<Signal>> {
    if has_failure(&signals) {
        Err(signals)
    } else {
        Ok(signals)
    }
}

/// The warning merge rule: `leading` first, then `tail`.
pub(crate) fn prepend(mut leading: Vec<Signal>, tail: Vec<Signal>) -> Vec<Signal> {
    if leading.is_empty() {
        return tail;
    }
    leading.extend(tail);
    leading
}
