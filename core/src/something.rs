use crate::builder::SomethingBuilder;
use crate::error::ShapeError;
use crate::format::MessageCode;
use crate::hope::Hope;
use crate::nothing::Nothing;
use crate::settings::{Builtin, Settings};
use crate::signal::{Signal, SignalKind};
use crate::status::{self, IntoSignals, ItemStatus};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Display;

/// A payload plus any number of signals.
///
/// Without failures the payload is always present; with a failure it never is.
///
/// ```rust
/// use forewarn_core::prelude::*;
///
/// const TOO_BIG: CustomMessage = CustomMessage::new("E-SIZE", 413, "{} exceeds {}");
///
/// let next = Something::of(1).map(|k| Something::of(k + 1));
/// assert_eq!(*next.value(), 2);
///
/// let failed = Something::of(4096).map(|n| {
///     if n > 1024 { Something::<u32>::fault(&TOO_BIG, &[&n, &1024]) } else { Something::of(n) }
/// });
/// assert!(failed.complete_with_errors());
/// assert_eq!(failed.signals().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SomethingRepr<T>")]
pub struct Something<T> {
    value: Option<T>,
    signals: Vec<Signal>,
}

#[derive(Deserialize)]
struct SomethingRepr<T> {
    value: Option<T>,
    #[serde(default)]
    signals: Vec<Signal>,
}

impl<T> TryFrom<SomethingRepr<T>> for Something<T> {
    type Error = ShapeError;

    fn try_from(repr: SomethingRepr<T>) -> Result<Self, ShapeError> {
        match (repr.value, status::has_failure(&repr.signals)) {
            (Some(_), true) => Err(ShapeError::ValueWithFailure),
            (None, false) => Err(ShapeError::MissingValue),
            (value, _) => Ok(Self {
                value,
                signals: repr.signals,
            }),
        }
    }
}

impl<T> Something<T> {
    pub fn of(value: T) -> Self {
        Self {
            value: Some(value),
            signals: Vec::new(),
        }
    }

    /// A missing value becomes a `NIL_ARG` failure.
    #[track_caller]
    pub fn of_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::of(value),
            None => Self::from_signals(vec![Signal::builtin(
                SignalKind::Failure,
                &Settings::shared(),
                Builtin::NilArg,
                &[],
            )]),
        }
    }

    #[track_caller]
    pub fn fault(msg: &dyn MessageCode, args: &[&dyn Display]) -> Self {
        Self::from_signals(vec![Signal::fault(msg, args)])
    }

    #[track_caller]
    pub fn capture(error: &(dyn Error + 'static)) -> Self {
        Self::from_signals(vec![Signal::capture(error)])
    }

    /// A container without payload.
    ///
    /// Keeps the payload invariant: when `signals` holds no failure a
    /// `NO_VAL` failure is appended.
    #[track_caller]
    pub fn from_signals(mut signals: Vec<Signal>) -> Self {
        if !status::has_failure(&signals) {
            signals.push(Signal::builtin(
                SignalKind::Failure,
                &Settings::shared(),
                Builtin::NoValue,
                &[],
            ));
        }
        Self {
            value: None,
            signals,
        }
    }

    pub(crate) fn with_warnings(value: T, warnings: Vec<Signal>) -> Self {
        Self {
            value: Some(value),
            signals: warnings,
        }
    }

    /// Expand a single-failure result into a multi-signal one.
    pub fn pull(hope: Hope<T>) -> Self {
        Self::from(hope)
    }

    pub fn builder() -> SomethingBuilder<T>
    where
        T: Send + Sync + 'static,
    {
        SomethingBuilder::new()
    }

    /// Put `leading` in front of this container's signals.
    ///
    /// The payload survives only while no failure is present.
    pub fn prefixed(self, leading: Vec<Signal>) -> Self {
        let signals = status::prepend(leading, self.signals);
        let value = if status::has_failure(&signals) {
            None
        } else {
            self.value
        };
        Self { value, signals }
    }

    /// `Ok((value, warnings))` when composition may continue.
    fn split(self) -> Result<(T, Vec<Signal>), Vec<Signal>> {
        match (self.value, status::has_failure(&self.signals)) {
            (Some(value), false) => Ok((value, self.signals)),
            (_, _) => Err(self.signals),
        }
    }

    /// Chain a value-producing step.
    pub fn map<R>(self, op: impl FnOnce(T) -> Something<R>) -> Something<R> {
        match self.split() {
            Err(signals) => Something::from_signals(signals),
            Ok((value, warnings)) => op(value).prefixed(warnings),
        }
    }

    /// Chain a step producing a plain value.
    pub fn map_of<R>(self, op: impl FnOnce(T) -> R) -> Something<R> {
        self.map(|value| Something::of(op(value)))
    }

    /// Chain a status-only step.
    pub fn ergo(self, op: impl FnOnce(T) -> Nothing) -> Nothing {
        match self.split() {
            Err(signals) => Nothing::from_signals(signals),
            Ok((value, warnings)) => op(value).prefixed(warnings),
        }
    }

    /// Inspect the payload unless a failure is present.
    pub fn implies(self, op: impl FnOnce(&T)) -> Self {
        if !self.complete_with_errors() {
            if let Some(value) = &self.value {
                op(value);
            }
        }
        self
    }

    pub fn on_success(&self, op: impl FnOnce(&T)) -> &Self {
        if !self.complete_with_errors() {
            if let Some(value) = &self.value {
                op(value);
            }
        }
        self
    }

    pub fn on_failure(&self, op: impl FnOnce(&[Signal])) -> &Self {
        if self.complete_with_errors() {
            op(&self.signals);
        }
        self
    }

    pub fn map_to<R>(self, success: impl FnOnce(T) -> R, failure: impl FnOnce(Vec<Signal>) -> R) -> R {
        match self.split() {
            Ok((value, _)) => success(value),
            Err(signals) => failure(signals),
        }
    }

    /// Drop the payload, keep the signals.
    pub fn as_nothing(self) -> Nothing {
        Nothing::from_signals(self.signals)
    }

    /// The payload.
    ///
    /// # Panics
    ///
    /// Panics when the container is in error state. Check
    /// [`complete_with_errors`](ItemStatus::complete_with_errors) or use
    /// [`get`](Self::get) instead.
    #[track_caller]
    pub fn value(&self) -> &T {
        match &self.value {
            Some(value) => value,
            None => panic!(
                "value() called on a failed container: {}",
                self.signals
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            ),
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    /// `Ok((value, warnings))` or `Err(signals)`.
    pub fn into_result(self) -> Result<(T, Vec<Signal>), Vec<Signal>> {
        self.split()
    }
}

impl<T> ItemStatus for Something<T> {
    fn signals(&self) -> &[Signal] {
        &self.signals
    }
}

impl<T> IntoSignals for Something<T> {
    fn into_signals(self) -> Vec<Signal> {
        self.signals
    }
}

impl<T> From<Hope<T>> for Something<T> {
    fn from(hope: Hope<T>) -> Self {
        match hope.into_result() {
            Ok(value) => Self::of(value),
            Err(failure) => Self {
                value: None,
                signals: vec![failure],
            },
        }
    }
}
