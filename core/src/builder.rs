//! # Builders: Accumulating Signals Step by Step
//!
//! A builder collects signals from many small checks and finalizes into an
//! immutable container. Every accumulating method takes `&self`, so a builder
//! can be shared by reference with the tasks of a parallel loop.
//!
//! ```rust
//! use forewarn_core::prelude::*;
//!
//! const EMPTY_LINE: CustomMessage = CustomMessage::new("W-LINE", 200, "line {} is empty");
//!
//! let lines = ["a", "", "c"];
//! let builder = Something::<usize>::builder();
//! builder.for_each(lines.iter().enumerate(), |(n, line)| {
//!     if line.is_empty() { Nothing::alert(&EMPTY_LINE, &[&n]) } else { Nothing::none() }
//! });
//! let counted = builder.build_with_value(lines.len());
//! assert!(counted.complete_with_warnings());
//! assert_eq!(*counted.value(), 3);
//! ```

use crate::error::UsageError;
use crate::executor::{BoundedPool, Executor, Task};
use crate::format::MessageCode;
use crate::nothing::Nothing;
use crate::place::Place;
use crate::settings::{Builtin, Settings};
use crate::signal::{Signal, SignalKind};
use crate::something::Something;
use crate::status::{self, IntoSignals, ItemStatus};
use parking_lot::Mutex;
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Thread-safe append-only signal store shared by the builders.
#[derive(Debug)]
pub struct Accumulator {
    signals: Mutex<Vec<Signal>>,
    settings: Arc<Settings>,
}

impl Accumulator {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            signals: Mutex::new(Vec::new()),
            settings,
        }
    }

    /// Append in one locked section, so one element's signals stay together.
    pub fn push(&self, signals: Vec<Signal>) {
        if signals.is_empty() {
            return;
        }
        self.signals.lock().extend(signals);
    }

    pub fn has_errors(&self) -> bool {
        status::has_failure(&self.signals.lock())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn into_signals(self) -> Vec<Signal> {
        self.signals.into_inner()
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new(Settings::shared())
    }
}

/// Signal-collecting operations shared by every builder.
pub trait Accumulate {
    fn accumulator(&self) -> &Accumulator;

    fn settings(&self) -> &Settings {
        self.accumulator().settings()
    }

    fn has_errors(&self) -> bool {
        self.accumulator().has_errors()
    }

    /// Fold in a signal, a list of signals or a whole container.
    fn add(&self, signals: impl IntoSignals) -> &Self {
        self.accumulator().push(signals.into_signals());
        self
    }

    /// Fold in a copy of another container's signals.
    fn merge(&self, other: &impl ItemStatus) -> &Self {
        self.accumulator().push(other.signals().to_vec());
        self
    }

    #[track_caller]
    fn fault(&self, msg: &dyn MessageCode, args: &[&dyn Display]) -> &Self {
        self.fault_with(msg, args, BTreeMap::new())
    }

    #[track_caller]
    fn fault_with(
        &self,
        msg: &dyn MessageCode,
        args: &[&dyn Display],
        properties: BTreeMap<String, Value>,
    ) -> &Self {
        let signal = raise(self.settings(), SignalKind::Failure, msg, args, properties);
        self.add(signal)
    }

    #[track_caller]
    fn alert(&self, msg: &dyn MessageCode, args: &[&dyn Display]) -> &Self {
        self.alert_with(msg, args, BTreeMap::new())
    }

    #[track_caller]
    fn alert_with(
        &self,
        msg: &dyn MessageCode,
        args: &[&dyn Display],
        properties: BTreeMap<String, Value>,
    ) -> &Self {
        let signal = raise(self.settings(), SignalKind::Warning, msg, args, properties);
        self.add(signal)
    }

    /// Add a failure carrying the full propagation trail of `error`.
    #[track_caller]
    fn capture(&self, error: &(dyn Error + 'static)) -> &Self {
        self.add(Signal::capture_with(self.settings(), error))
    }

    /// Add a failure attributed to this call site only.
    #[track_caller]
    fn capture_here(&self, error: &(dyn Error + 'static)) -> &Self {
        self.add(Signal::capture_here_with(self.settings(), error))
    }

    /// Add a failure attributed to the frame that handed `error` over.
    #[track_caller]
    fn capture_caller(&self, error: &(dyn Error + 'static)) -> &Self {
        self.add(Signal::capture_caller_with(self.settings(), error))
    }

    /// Run `op` for every element, folding in whatever it reports.
    fn for_each<I, F, R>(&self, items: I, mut op: F) -> &Self
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> R,
        R: IntoSignals,
    {
        for item in items {
            self.accumulator().push(op(item).into_signals());
        }
        self
    }

    /// Like [`for_each`](Self::for_each) over value containers.
    ///
    /// An element already in error is folded in and `op` is skipped for it;
    /// an element's warnings are kept ahead of what `op` reports.
    fn for_each_of<I, V, F, R>(&self, items: I, mut op: F) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Something<V>>,
        F: FnMut(V) -> R,
        R: IntoSignals,
    {
        for item in items {
            self.accumulator().push(unwrap_element(item.into(), &mut op));
        }
        self
    }

    /// Run `op` for every element on at most `max_threads` worker threads.
    ///
    /// Returns only after every element has been processed. A bound of 0 is
    /// rejected before any element runs.
    fn for_each_parallel<I, F, R>(&self, max_threads: usize, items: I, op: F) -> Result<&Self, UsageError>
    where
        I: IntoIterator,
        I::Item: Send,
        F: Fn(I::Item) -> R + Sync,
        R: IntoSignals,
    {
        let pool = BoundedPool::new(max_threads)?;
        Ok(self.for_each_on(&pool, items, op))
    }

    fn for_each_parallel_of<I, V, F, R>(
        &self,
        max_threads: usize,
        items: I,
        op: F,
    ) -> Result<&Self, UsageError>
    where
        I: IntoIterator,
        I::Item: Into<Something<V>>,
        V: Send,
        F: Fn(V) -> R + Sync,
        R: IntoSignals,
    {
        let pool = BoundedPool::new(max_threads)?;
        Ok(self.for_each_on_of(&pool, items, op))
    }

    /// Run `op` for every element on a caller-supplied executor.
    fn for_each_on<I, F, R>(&self, executor: &dyn Executor, items: I, op: F) -> &Self
    where
        I: IntoIterator,
        I::Item: Send,
        F: Fn(I::Item) -> R + Sync,
        R: IntoSignals,
    {
        let accumulator = self.accumulator();
        let op = &op;
        let tasks: Vec<Task<'_>> = items
            .into_iter()
            .map(|item| Box::new(move || accumulator.push(op(item).into_signals())) as Task<'_>)
            .collect();
        executor.run_all(tasks);
        self
    }

    fn for_each_on_of<I, V, F, R>(&self, executor: &dyn Executor, items: I, op: F) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Something<V>>,
        V: Send,
        F: Fn(V) -> R + Sync,
        R: IntoSignals,
    {
        let accumulator = self.accumulator();
        let mut tasks: Vec<Task<'_>> = Vec::new();
        for item in items {
            match item.into().into_result() {
                Err(signals) => accumulator.push(signals),
                Ok((value, warnings)) => {
                    let op = &op;
                    tasks.push(Box::new(move || {
                        accumulator.push(status::prepend(warnings, op(value).into_signals()))
                    }));
                }
            }
        }
        executor.run_all(tasks);
        self
    }
}

#[track_caller]
fn raise(
    settings: &Settings,
    kind: SignalKind,
    msg: &dyn MessageCode,
    args: &[&dyn Display],
    properties: BTreeMap<String, Value>,
) -> Signal {
    let mut signal = Signal::raise(kind, msg, args, settings.sink());
    for (key, value) in properties {
        signal.set_property(key, value);
    }
    signal
}

fn unwrap_element<V, R: IntoSignals>(
    element: Something<V>,
    op: &mut impl FnMut(V) -> R,
) -> Vec<Signal> {
    match element.into_result() {
        Err(signals) => signals,
        Ok((value, warnings)) => status::prepend(warnings, op(value).into_signals()),
    }
}

/// Accumulates signals, then finalizes into a [`Nothing`].
#[derive(Debug, Default)]
pub struct NothingBuilder {
    acc: Accumulator,
}

impl NothingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Arc<Settings>) -> Self {
        Self {
            acc: Accumulator::new(settings),
        }
    }

    pub fn build(self) -> Nothing {
        let signals = self.acc.into_signals();
        tracing::trace!(signals = signals.len(), "nothing builder finalized");
        Nothing::from_signals(signals)
    }
}

impl Accumulate for NothingBuilder {
    fn accumulator(&self) -> &Accumulator {
        &self.acc
    }
}

#[derive(Debug)]
struct Slot<T> {
    value: T,
    place: Place,
}

/// Accumulates signals plus a once-settable value, then finalizes into a
/// [`Something`].
///
/// | situation | outcome |
/// |---|---|
/// | value set while errors exist | value ignored, `VAL_IGN` warning |
/// | a `Signal` given as value | `SIG_VAL` failure, the signal is added too |
/// | `maybe_value(None)` | `NIL_ARG` failure |
/// | value set twice | `DBL_VAL` failure naming the first place, value discarded |
/// | `build` with errors and a value | `VAL_OVR` warning, value dropped |
/// | `build` with neither | `NO_VAL` failure |
#[derive(Debug)]
pub struct SomethingBuilder<T> {
    acc: Accumulator,
    slot: OnceLock<Slot<T>>,
    discarded: AtomicBool,
}

impl<T: Send + Sync + 'static> SomethingBuilder<T> {
    pub fn new() -> Self {
        Self::with_settings(Settings::shared())
    }

    pub fn with_settings(settings: Arc<Settings>) -> Self {
        Self {
            acc: Accumulator::new(settings),
            slot: OnceLock::new(),
            discarded: AtomicBool::new(false),
        }
    }

    /// A builder that already holds one warning.
    #[track_caller]
    pub fn with_alert(msg: &dyn MessageCode, args: &[&dyn Display]) -> Self {
        let builder = Self::new();
        builder.alert(msg, args);
        builder
    }

    /// A builder that already holds one failure.
    #[track_caller]
    pub fn with_fault(msg: &dyn MessageCode, args: &[&dyn Display]) -> Self {
        let builder = Self::new();
        builder.fault(msg, args);
        builder
    }

    #[track_caller]
    fn builtin(&self, kind: SignalKind, builtin: Builtin, args: &[&dyn Display]) {
        self.acc
            .push(vec![Signal::builtin(kind, self.settings(), builtin, args)]);
    }

    /// Set the payload. Allowed once.
    #[track_caller]
    pub fn value(&self, value: T) -> &Self {
        if self.acc.has_errors() {
            tracing::debug!("builder value ignored, errors already present");
            self.builtin(SignalKind::Warning, Builtin::ValueIgnored, &[]);
            return self;
        }

        let mut candidate = Some(value);
        if let Some(slot) = (&mut candidate as &mut dyn Any).downcast_mut::<Option<Signal>>() {
            if let Some(signal) = slot.take() {
                self.builtin(SignalKind::Failure, Builtin::SignalValue, &[&signal.code()]);
                self.acc.push(vec![signal]);
            }
            return self;
        }
        let Some(value) = candidate else {
            return self;
        };

        let here = Place::caller();
        if let Err(rejected) = self.slot.set(Slot { value, place: here }) {
            let first = self
                .slot
                .get()
                .map(|slot| slot.place.to_string())
                .unwrap_or_else(|| rejected.place.to_string());
            tracing::debug!(first = %first, "builder value set twice");
            self.discarded.store(true, Ordering::SeqCst);
            self.builtin(SignalKind::Failure, Builtin::DoubleValue, &[&first]);
        }
        self
    }

    /// Set the payload from an optional value; `None` records `NIL_ARG`.
    #[track_caller]
    pub fn maybe_value(&self, value: Option<T>) -> &Self {
        match value {
            Some(value) => self.value(value),
            None => {
                self.builtin(SignalKind::Failure, Builtin::NilArg, &[]);
                self
            }
        }
    }

    #[track_caller]
    pub fn build(self) -> Something<T> {
        let errors = self.acc.has_errors();
        let discarded = self.discarded.load(Ordering::SeqCst);
        match (self.slot.into_inner(), errors) {
            (Some(slot), false) => {
                let signals = self.acc.into_signals();
                tracing::trace!(warnings = signals.len(), "something builder finalized");
                Something::with_warnings(slot.value, signals)
            }
            (Some(_), true) => {
                if !discarded {
                    tracing::debug!("builder value overridden by errors");
                    let warning = Signal::builtin(
                        SignalKind::Warning,
                        &self.acc.settings,
                        Builtin::ValueOverridden,
                        &[],
                    );
                    self.acc.push(vec![warning]);
                }
                Something::from_signals(self.acc.into_signals())
            }
            (None, true) => Something::from_signals(self.acc.into_signals()),
            (None, false) => {
                tracing::debug!("builder finalized without value");
                let failure =
                    Signal::builtin(SignalKind::Failure, &self.acc.settings, Builtin::NoValue, &[]);
                self.acc.push(vec![failure]);
                Something::from_signals(self.acc.into_signals())
            }
        }
    }

    /// `value(v)` followed by `build()`.
    #[track_caller]
    pub fn build_with_value(self, value: T) -> Something<T> {
        self.value(value);
        self.build()
    }
}

impl<T: Send + Sync + 'static> Default for SomethingBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Accumulate for SomethingBuilder<T> {
    fn accumulator(&self) -> &Accumulator {
        &self.acc
    }
}
