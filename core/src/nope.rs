use crate::format::MessageCode;
use crate::hope::Hope;
use crate::nothing::Nothing;
use crate::signal::Signal;
use crate::something::Something;
use crate::status::{IntoSignals, ItemStatus};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Display;

/// No payload, at most one failure and never a warning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "NopeRepr")]
pub struct Nope {
    failure: Option<Signal>,
}

#[derive(Deserialize)]
struct NopeRepr {
    failure: Option<Signal>,
}

impl From<NopeRepr> for Nope {
    fn from(repr: NopeRepr) -> Self {
        repr.failure.map(Self::failed).unwrap_or_default()
    }
}

impl Nope {
    /// Plain success.
    pub fn nope() -> Self {
        Self::default()
    }

    #[track_caller]
    pub fn fault(msg: &dyn MessageCode, args: &[&dyn Display]) -> Self {
        Self {
            failure: Some(Signal::fault(msg, args)),
        }
    }

    #[track_caller]
    pub fn capture(error: &(dyn Error + 'static)) -> Self {
        Self {
            failure: Some(Signal::capture(error)),
        }
    }

    /// Wrap an existing signal as the failure of this result.
    ///
    /// A warning is promoted to a failure, so an `Err` never turns into success.
    pub fn failed(signal: Signal) -> Self {
        Self {
            failure: Some(signal.into_failure()),
        }
    }

    pub fn failure(&self) -> Option<&Signal> {
        self.failure.as_ref()
    }

    /// Chain a single-failure value step.
    pub fn map<R>(self, op: impl FnOnce() -> Hope<R>) -> Hope<R> {
        match self.failure {
            Some(failure) => Hope::failed(failure),
            None => op(),
        }
    }

    pub fn map_of<R>(self, op: impl FnOnce() -> R) -> Hope<R> {
        self.map(|| Hope::of(op()))
    }

    /// Chain a single-failure status step.
    pub fn ergo(self, op: impl FnOnce() -> Nope) -> Nope {
        match self.failure {
            Some(_) => self,
            None => op(),
        }
    }

    /// Chain a multi-signal status step.
    pub fn ergoes(self, op: impl FnOnce() -> Nothing) -> Nothing {
        match self.failure {
            Some(failure) => Nothing::from_signals(vec![failure]),
            None => op(),
        }
    }

    /// On success, continue with `value`.
    pub fn thus<R>(self, value: R) -> Hope<R> {
        match self.failure {
            Some(failure) => Hope::failed(failure),
            None => Hope::of(value),
        }
    }

    /// Chain a multi-signal value step.
    pub fn maps<R>(self, op: impl FnOnce() -> Something<R>) -> Something<R> {
        match self.failure {
            Some(failure) => Something::from_signals(vec![failure]),
            None => op(),
        }
    }

    pub fn implies(self, op: impl FnOnce()) -> Self {
        if self.failure.is_none() {
            op();
        }
        self
    }

    pub fn on_success(&self, op: impl FnOnce()) -> &Self {
        if self.failure.is_none() {
            op();
        }
        self
    }

    pub fn on_failure(&self, op: impl FnOnce(&Signal)) -> &Self {
        if let Some(failure) = &self.failure {
            op(failure);
        }
        self
    }

    pub fn map_to<R>(self, success: impl FnOnce() -> R, failure: impl FnOnce(Signal) -> R) -> R {
        match self.failure {
            Some(signal) => failure(signal),
            None => success(),
        }
    }

    pub fn as_nothing(self) -> Nothing {
        Nothing::from(self)
    }
}

impl ItemStatus for Nope {
    fn signals(&self) -> &[Signal] {
        self.failure.as_slice()
    }
}

impl IntoSignals for Nope {
    fn into_signals(self) -> Vec<Signal> {
        self.failure.into_iter().collect()
    }
}

impl<T> From<Hope<T>> for Nope {
    fn from(hope: Hope<T>) -> Self {
        hope.as_nope()
    }
}

impl From<Result<(), Signal>> for Nope {
    fn from(result: Result<(), Signal>) -> Self {
        match result {
            Ok(()) => Self::nope(),
            Err(signal) => Self::failed(signal),
        }
    }
}

impl From<Nope> for Result<(), Signal> {
    fn from(nope: Nope) -> Self {
        match nope.failure {
            Some(signal) => Err(signal),
            None => Ok(()),
        }
    }
}
