//! What a branch finalizes into.
//!
//! A branch never builds containers by hand: it hands the inherited
//! signals, the fired clause's outcome and the subject's warnings to the
//! target type, which applies the usual composition rules.

use forewarn_core::settings::{Builtin, Settings};
use forewarn_core::{Hope, Nope, Nothing, Signal, SignalKind, Something};

/// A container a branch can finalize into.
pub trait Target: Sized {
    /// The subject was already in error; keep its failure(s).
    fn failed(signals: Vec<Signal>, settings: &Settings) -> Self;

    /// Put the subject's warnings in front of the fired clause's outcome.
    fn prefixed(self, warnings: Vec<Signal>) -> Self;

    /// No clause produced an outcome.
    fn unmatched(settings: &Settings) -> Self;

    /// A clause injected a signal directly.
    fn injected(signal: Signal) -> Self;
}

/// Status-only targets, reached through `ergo`.
pub trait StatusTarget: Target {}

/// Value targets, reached through `map` and `map_of`.
pub trait ValueTarget: Target {
    type Value;

    fn of(value: Self::Value) -> Self;
}

/// Targets able to carry a warning on its own.
pub trait WarningTarget: Target {}

fn no_value(settings: &Settings) -> Signal {
    Signal::builtin(SignalKind::Failure, settings, Builtin::NoValue, &[])
}

impl Target for Nothing {
    fn failed(signals: Vec<Signal>, _settings: &Settings) -> Self {
        Nothing::from_signals(signals)
    }

    fn prefixed(self, warnings: Vec<Signal>) -> Self {
        Nothing::prefixed(self, warnings)
    }

    fn unmatched(_settings: &Settings) -> Self {
        Nothing::none()
    }

    fn injected(signal: Signal) -> Self {
        Nothing::from_signals(vec![signal])
    }
}

impl StatusTarget for Nothing {}
impl WarningTarget for Nothing {}

impl<R> Target for Something<R> {
    fn failed(signals: Vec<Signal>, _settings: &Settings) -> Self {
        Something::from_signals(signals)
    }

    fn prefixed(self, warnings: Vec<Signal>) -> Self {
        Something::prefixed(self, warnings)
    }

    fn unmatched(settings: &Settings) -> Self {
        Something::from_signals(vec![no_value(settings)])
    }

    fn injected(signal: Signal) -> Self {
        Something::from_signals(vec![signal.into_failure()])
    }
}

impl<R> ValueTarget for Something<R> {
    type Value = R;

    fn of(value: R) -> Self {
        Something::of(value)
    }
}

// Single-failure targets only ever see success subjects or one failure,
// so there are no warnings to keep.
impl Target for Nope {
    fn failed(signals: Vec<Signal>, _settings: &Settings) -> Self {
        match signals.into_iter().find(Signal::is_failure) {
            Some(failure) => Nope::failed(failure),
            None => Nope::nope(),
        }
    }

    fn prefixed(self, warnings: Vec<Signal>) -> Self {
        if !warnings.is_empty() {
            tracing::trace!(dropped = warnings.len(), "warnings dropped by single-failure target");
        }
        self
    }

    fn unmatched(_settings: &Settings) -> Self {
        Nope::nope()
    }

    fn injected(signal: Signal) -> Self {
        Nope::failed(signal.into_failure())
    }
}

impl StatusTarget for Nope {}

impl<R> Target for Hope<R> {
    fn failed(signals: Vec<Signal>, settings: &Settings) -> Self {
        match signals.into_iter().find(Signal::is_failure) {
            Some(failure) => Hope::failed(failure),
            None => Hope::failed(no_value(settings)),
        }
    }

    fn prefixed(self, warnings: Vec<Signal>) -> Self {
        if !warnings.is_empty() {
            tracing::trace!(dropped = warnings.len(), "warnings dropped by single-failure target");
        }
        self
    }

    fn unmatched(settings: &Settings) -> Self {
        Hope::failed(no_value(settings))
    }

    fn injected(signal: Signal) -> Self {
        Hope::failed(signal)
    }
}

impl<R> ValueTarget for Hope<R> {
    type Value = R;

    fn of(value: R) -> Self {
        Hope::of(value)
    }
}
