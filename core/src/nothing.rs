use crate::builder::NothingBuilder;
use crate::format::MessageCode;
use crate::nope::Nope;
use crate::signal::Signal;
use crate::something::Something;
use crate::status::{self, IntoSignals, ItemStatus};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Display;

/// No payload, any number of signals.
///
/// Status-only result of an operation: success, success with warnings, or
/// failure.
///
/// ```rust
/// use forewarn_core::prelude::*;
///
/// const SLOW: CustomMessage = CustomMessage::new("W-SLOW", 200, "took {}ms");
///
/// let checked = Nothing::alert(&SLOW, &[&850]).ergo(Nothing::none);
/// assert!(checked.complete_with_warnings());
/// assert_eq!(checked.signals()[0].message(), "took 850ms");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nothing {
    signals: Vec<Signal>,
}

impl Nothing {
    /// Plain success.
    pub fn none() -> Self {
        Self::default()
    }

    #[track_caller]
    pub fn fault(msg: &dyn MessageCode, args: &[&dyn Display]) -> Self {
        Self::from_signals(vec![Signal::fault(msg, args)])
    }

    #[track_caller]
    pub fn alert(msg: &dyn MessageCode, args: &[&dyn Display]) -> Self {
        Self::from_signals(vec![Signal::alert(msg, args)])
    }

    #[track_caller]
    pub fn capture(error: &(dyn Error + 'static)) -> Self {
        Self::from_signals(vec![Signal::capture(error)])
    }

    pub fn from_signals(signals: Vec<Signal>) -> Self {
        Self { signals }
    }

    /// Collapse a single-failure result into a multi-signal one.
    pub fn pull(nope: Nope) -> Self {
        Self::from(nope)
    }

    pub fn builder() -> NothingBuilder {
        NothingBuilder::new()
    }

    /// Put `leading` in front of this container's signals.
    pub fn prefixed(self, leading: Vec<Signal>) -> Self {
        Self {
            signals: status::prepend(leading, self.signals),
        }
    }

    /// Chain a value-producing step.
    pub fn map<R>(self, op: impl FnOnce() -> Something<R>) -> Something<R> {
        match status::gate(self.signals) {
            Err(signals) => Something::from_signals(signals),
            Ok(warnings) => op().prefixed(warnings),
        }
    }

    /// Chain a step producing a plain value.
    pub fn map_of<R>(self, op: impl FnOnce() -> R) -> Something<R> {
        self.map(|| Something::of(op()))
    }

    /// Chain a status-only step.
    pub fn ergo(self, op: impl FnOnce() -> Nothing) -> Nothing {
        match status::gate(self.signals) {
            Err(signals) => Self::from_signals(signals),
            Ok(warnings) => op().prefixed(warnings),
        }
    }

    /// Run a side effect unless a failure is present.
    pub fn implies(self, op: impl FnOnce()) -> Self {
        if !self.complete_with_errors() {
            op();
        }
        self
    }

    /// Receives the warnings (possibly none) when no failure is present.
    pub fn on_success(&self, op: impl FnOnce(&[Signal])) -> &Self {
        if !self.complete_with_errors() {
            op(&self.signals);
        }
        self
    }

    pub fn on_failure(&self, op: impl FnOnce(&[Signal])) -> &Self {
        if self.complete_with_errors() {
            op(&self.signals);
        }
        self
    }

    /// Fold into any type. `success` receives the warnings.
    pub fn map_to<R>(
        self,
        success: impl FnOnce(Vec<Signal>) -> R,
        failure: impl FnOnce(Vec<Signal>) -> R,
    ) -> R {
        match status::gate(self.signals) {
            Ok(warnings) => success(warnings),
            Err(signals) => failure(signals),
        }
    }
}

impl ItemStatus for Nothing {
    fn signals(&self) -> &[Signal] {
        &self.signals
    }
}

impl IntoSignals for Nothing {
    fn into_signals(self) -> Vec<Signal> {
        self.signals
    }
}

impl FromIterator<Signal> for Nothing {
    fn from_iter<I: IntoIterator<Item = Signal>>(iter: I) -> Self {
        Self::from_signals(iter.into_iter().collect())
    }
}

impl From<Nope> for Nothing {
    fn from(nope: Nope) -> Self {
        Self::from_signals(nope.into_signals())
    }
}

impl<T> From<Something<T>> for Nothing {
    fn from(something: Something<T>) -> Self {
        something.as_nothing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::CustomMessage;
    use std::cell::Cell;

    const STALE: CustomMessage = CustomMessage::new("W01", 200, "cache stale by {}s");
    const DOWN: CustomMessage = CustomMessage::new("E01", 503, "service {} down");

    #[test]
    fn test_factories() {
        assert!(Nothing::none().complete_success());
        assert!(Nothing::fault(&DOWN, &[&"db"]).complete_with_errors());
        assert!(Nothing::alert(&STALE, &[&4]).complete_with_warnings());
        let captured = Nothing::capture(&std::fmt::Error);
        assert_eq!(captured.signals()[0].code(), "999E");
    }

    #[test]
    fn test_error_short_circuits() {
        let called = Cell::new(false);
        let out = Nothing::fault(&DOWN, &[&"db"]).ergo(|| {
            called.set(true);
            Nothing::none()
        });
        assert!(!called.get());
        assert_eq!(out.signals().len(), 1);

        let mapped = Nothing::fault(&DOWN, &[&"db"]).map_of(|| 5);
        assert!(mapped.complete_with_errors());
        assert!(mapped.get().is_none());
    }

    #[test]
    fn test_success_returns_next_as_is() {
        let out = Nothing::none().ergo(|| Nothing::alert(&STALE, &[&1]));
        assert!(out.complete_with_warnings());
        let mapped = Nothing::none().map_of(|| "ok");
        assert_eq!(*mapped.value(), "ok");
    }

    #[test]
    fn test_warnings_prepended() {
        let out = Nothing::alert(&STALE, &[&1]).ergo(|| Nothing::fault(&DOWN, &[&"cache"]));
        let codes: Vec<_> = out.signals().iter().map(Signal::code).collect();
        assert_eq!(codes, ["W01", "E01"]);

        let mapped = Nothing::alert(&STALE, &[&1]).map(|| Something::of(9));
        assert_eq!(*mapped.value(), 9);
        assert!(mapped.complete_with_warnings());
    }

    #[test]
    fn test_side_effects_gated_on_failure() {
        let hits = Cell::new(0);
        Nothing::alert(&STALE, &[&1]).implies(|| hits.set(hits.get() + 1));
        Nothing::fault(&DOWN, &[&"x"]).implies(|| hits.set(hits.get() + 10));
        assert_eq!(hits.get(), 1);

        let warned = Nothing::alert(&STALE, &[&1]);
        warned
            .on_success(|w| hits.set(hits.get() + w.len() * 100))
            .on_failure(|_| hits.set(0));
        assert_eq!(hits.get(), 101);
    }

    #[test]
    fn test_map_to() {
        let text = Nothing::fault(&DOWN, &[&"api"]).map_to(
            |_| "fine".to_string(),
            |errors| errors[0].message().to_string(),
        );
        assert_eq!(text, "service api down");
    }

    #[test]
    fn test_collect_and_pull() {
        let collected: Nothing = vec![Signal::alert(&STALE, &[&2])].into_iter().collect();
        assert!(collected.complete_with_warnings());
        assert!(Nothing::pull(Nope::fault(&DOWN, &[&"q"])).complete_with_errors());
        assert!(Nothing::pull(Nope::nope()).complete_success());
    }
}
