use crate::error::ShapeError;
use crate::format::MessageCode;
use crate::nope::Nope;
use crate::nothing::Nothing;
use crate::settings::{Builtin, Settings};
use crate::signal::{Signal, SignalKind};
use crate::something::Something;
use crate::status::{IntoSignals, ItemStatus};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Display;

/// A payload or exactly one failure. Never a warning.
///
/// The closest relative of `Result<T, Signal>`, and it converts both ways.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HopeRepr<T>")]
pub struct Hope<T> {
    value: Option<T>,
    failure: Option<Signal>,
}

#[derive(Deserialize)]
struct HopeRepr<T> {
    value: Option<T>,
    failure: Option<Signal>,
}

impl<T> TryFrom<HopeRepr<T>> for Hope<T> {
    type Error = ShapeError;

    fn try_from(repr: HopeRepr<T>) -> Result<Self, ShapeError> {
        match (repr.value, repr.failure) {
            (Some(value), None) => Ok(Self::of(value)),
            (None, Some(failure)) => Ok(Self::failed(failure)),
            (Some(_), Some(_)) => Err(ShapeError::ValueWithFailure),
            (None, None) => Err(ShapeError::MissingValue),
        }
    }
}

impl<T> Hope<T> {
    pub fn of(value: T) -> Self {
        Self {
            value: Some(value),
            failure: None,
        }
    }

    /// A missing value becomes a `NIL_ARG` failure.
    #[track_caller]
    pub fn of_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::of(value),
            None => Self::failed(Signal::builtin(
                SignalKind::Failure,
                &Settings::shared(),
                Builtin::NilArg,
                &[],
            )),
        }
    }

    #[track_caller]
    pub fn fault(msg: &dyn MessageCode, args: &[&dyn Display]) -> Self {
        Self::failed(Signal::fault(msg, args))
    }

    #[track_caller]
    pub fn capture(error: &(dyn Error + 'static)) -> Self {
        Self::failed(Signal::capture(error))
    }

    /// Wrap an existing signal as the failure of this result.
    ///
    /// A warning is promoted to a failure, since there is no payload to keep.
    pub fn failed(signal: Signal) -> Self {
        Self {
            value: None,
            failure: Some(signal.into_failure()),
        }
    }

    pub fn failure(&self) -> Option<&Signal> {
        self.failure.as_ref()
    }

    pub fn map<R>(self, op: impl FnOnce(T) -> Hope<R>) -> Hope<R> {
        match self.into_result() {
            Ok(value) => op(value),
            Err(failure) => Hope::failed(failure),
        }
    }

    pub fn map_of<R>(self, op: impl FnOnce(T) -> R) -> Hope<R> {
        self.map(|value| Hope::of(op(value)))
    }

    /// Chain a multi-signal value step.
    pub fn maps<R>(self, op: impl FnOnce(T) -> Something<R>) -> Something<R> {
        match self.into_result() {
            Ok(value) => op(value),
            Err(failure) => Something::from_signals(vec![failure]),
        }
    }

    pub fn maps_of<R>(self, op: impl FnOnce(T) -> R) -> Something<R> {
        self.maps(|value| Something::of(op(value)))
    }

    pub fn ergo(self, op: impl FnOnce(T) -> Nope) -> Nope {
        match self.into_result() {
            Ok(value) => op(value),
            Err(failure) => Nope::failed(failure),
        }
    }

    /// Chain a multi-signal status step.
    pub fn ergoes(self, op: impl FnOnce(T) -> Nothing) -> Nothing {
        match self.into_result() {
            Ok(value) => op(value),
            Err(failure) => Nothing::from_signals(vec![failure]),
        }
    }

    pub fn implies(self, op: impl FnOnce(&T)) -> Self {
        if let Some(value) = &self.value {
            op(value);
        }
        self
    }

    pub fn on_success(&self, op: impl FnOnce(&T)) -> &Self {
        if let Some(value) = &self.value {
            op(value);
        }
        self
    }

    pub fn on_failure(&self, op: impl FnOnce(&Signal)) -> &Self {
        if let Some(failure) = &self.failure {
            op(failure);
        }
        self
    }

    pub fn map_to<R>(self, success: impl FnOnce(T) -> R, failure: impl FnOnce(Signal) -> R) -> R {
        match self.into_result() {
            Ok(value) => success(value),
            Err(signal) => failure(signal),
        }
    }

    /// Drop the payload, keep the failure.
    pub fn as_nope(self) -> Nope {
        match self.failure {
            Some(failure) => Nope::failed(failure),
            None => Nope::nope(),
        }
    }

    /// The payload.
    ///
    /// # Panics
    ///
    /// Panics when the result holds a failure. Use [`get`](Self::get) to check first.
    #[track_caller]
    pub fn value(&self) -> &T {
        match (&self.value, &self.failure) {
            (Some(value), _) => value,
            (None, Some(failure)) => panic!("value() called on a failed result: {failure}"),
            (None, None) => panic!("value() called on a result without payload"),
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    pub fn into_result(self) -> Result<T, Signal> {
        match (self.value, self.failure) {
            (Some(value), None) => Ok(value),
            (_, Some(failure)) => Err(failure),
            (None, None) => Err(Signal::builtin(
                SignalKind::Failure,
                &Settings::shared(),
                Builtin::NoValue,
                &[],
            )),
        }
    }
}

impl<T> ItemStatus for Hope<T> {
    fn signals(&self) -> &[Signal] {
        self.failure.as_slice()
    }
}

impl<T> IntoSignals for Hope<T> {
    fn into_signals(self) -> Vec<Signal> {
        self.failure.into_iter().collect()
    }
}

impl<T> From<Result<T, Signal>> for Hope<T> {
    fn from(result: Result<T, Signal>) -> Self {
        match result {
            Ok(value) => Self::of(value),
            Err(signal) => Self::failed(signal),
        }
    }
}

impl<T> From<Hope<T>> for Result<T, Signal> {
    fn from(hope: Hope<T>) -> Self {
        hope.into_result()
    }
}
