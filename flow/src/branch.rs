//! # Branch: First-Match Dispatch over a Subject
//!
//! A [`Branch`] evaluates `when` clauses against a subject in order. The
//! first clause whose condition holds runs its action and settles the
//! outcome; every later clause is skipped without evaluating its condition.
//! A subject that is already in error skips every clause and `end()` hands
//! the error back unchanged.
//!
//! ```rust
//! use forewarn_core::prelude::*;
//! use forewarn_flow::prelude::*;
//!
//! const TOO_OLD: CustomMessage = CustomMessage::new("E-AGE", 422, "age {} out of range");
//!
//! let label = Something::of(34u32)
//!     .choose_map::<&str>()
//!     .when(|age| *age < 18).map_of(|_| "minor")
//!     .when(|age| *age > 130).fault(&TOO_OLD, &[&"?"])
//!     .otherwise().map_of(|_| "adult")
//!     .end();
//! assert_eq!(*label.value(), "adult");
//! ```

use crate::cast;
use crate::target::{StatusTarget, Target, ValueTarget, WarningTarget};
use forewarn_core::format::MessageCode;
use forewarn_core::settings::Settings;
use forewarn_core::{Signal, SignalKind};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::sync::Arc;

/// Branch state: the subject, what it inherited and what has been settled.
pub struct Branch<S, O> {
    subject: Option<S>,
    inherited: Vec<Signal>,
    errored: bool,
    fired: bool,
    clause: usize,
    pending: Option<O>,
    settings: Arc<Settings>,
}

impl<S, O: Target> Branch<S, O> {
    /// A raw subject, successful by definition.
    pub fn over(subject: S) -> Self {
        Self {
            subject: Some(subject),
            inherited: Vec::new(),
            errored: false,
            fired: false,
            clause: 0,
            pending: None,
            settings: Settings::shared(),
        }
    }

    /// A subject taken from a container: `Ok((payload, warnings))` or `Err(signals)`.
    pub fn inherit(state: Result<(S, Vec<Signal>), Vec<Signal>>) -> Self {
        match state {
            Ok((subject, warnings)) => Self {
                inherited: warnings,
                ..Self::over(subject)
            },
            Err(signals) => Self {
                subject: None,
                inherited: signals,
                errored: true,
                fired: false,
                clause: 0,
                pending: None,
                settings: Settings::shared(),
            },
        }
    }

    pub fn with_settings(mut self, settings: Arc<Settings>) -> Self {
        self.settings = settings;
        self
    }

    pub fn is_errored(&self) -> bool {
        self.errored
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Whether a new clause still gets its condition evaluated.
    fn open(&self) -> bool {
        !self.errored && !self.fired
    }

    fn test(&mut self, condition: impl FnOnce(&S) -> bool) -> bool {
        self.clause += 1;
        if !self.open() {
            return false;
        }
        self.subject.as_ref().is_some_and(condition)
    }

    /// Register a condition on the subject.
    pub fn when(mut self, condition: impl FnOnce(&S) -> bool) -> When<S, O> {
        let matched = self.test(condition);
        When::new(self, matched)
    }

    /// Register a fixed condition.
    pub fn when_flag(self, flag: bool) -> When<S, O> {
        self.when(|_| flag)
    }

    /// Match when the subject equals `value`.
    pub fn when_eq<V>(self, value: V) -> When<S, O>
    where
        S: PartialEq<V>,
    {
        self.when(|subject| *subject == value)
    }

    /// Match when the subject is a `U`, handing the clause a `U`.
    pub fn when_instance<U: 'static>(mut self) -> WhenInstance<S, U, O>
    where
        S: 'static,
    {
        let matched = self.test(|subject| cast::instance_ref::<S, U>(subject).is_some());
        WhenInstance {
            branch: self,
            matched,
            _narrowed: PhantomData,
        }
    }

    /// The catch-all clause. Only `end()` may follow it.
    pub fn otherwise(mut self) -> When<S, O, Last> {
        let matched = self.test(|_| true);
        When::new(self, matched)
    }

    /// Record the first match. `action` receives the subject and may settle the outcome.
    pub(crate) fn settle(mut self, matched: bool, action: impl FnOnce(S) -> Option<O>) -> Self {
        if !matched {
            return self;
        }
        if let Some(subject) = self.subject.take() {
            tracing::trace!(clause = self.clause, "branch clause fired");
            self.fired = true;
            if let Some(outcome) = action(subject) {
                self.pending = Some(outcome);
            }
        }
        self
    }

    /// Finalize: the inherited error, or the subject's warnings ahead of the settled outcome.
    pub fn end(self) -> O {
        if self.errored {
            tracing::debug!(signals = self.inherited.len(), "branch skipped, subject in error");
            return O::failed(self.inherited, &self.settings);
        }
        tracing::debug!(fired = self.fired, clauses = self.clause, "branch finalized");
        let outcome = match self.pending {
            Some(outcome) => outcome,
            None => O::unmatched(&self.settings),
        };
        outcome.prefixed(self.inherited)
    }
}

impl<S, O> fmt::Debug for Branch<S, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch")
            .field("errored", &self.errored)
            .field("fired", &self.fired)
            .field("clause", &self.clause)
            .field("inherited", &self.inherited.len())
            .field("settled", &self.pending.is_some())
            .finish()
    }
}

#[track_caller]
pub(crate) fn raise(
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

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Open {}
    impl Sealed for super::Last {}
}

/// Where a clause action leads: back to the branch, or only to `end()`.
pub trait Continuation: sealed::Sealed {
    type Next<S, O>;
    type Choice<O>;

    fn resume<S, O>(branch: Branch<S, O>) -> Self::Next<S, O>;

    fn resume_choice<O>(branch: Branch<(), O>) -> Self::Choice<O>;
}

/// Clause followed by more clauses.
#[derive(Debug)]
pub struct Open;

/// The `otherwise` clause.
#[derive(Debug)]
pub struct Last;

impl Continuation for Open {
    type Next<S, O> = Branch<S, O>;
    type Choice<O> = crate::choice::Choice<O>;

    fn resume<S, O>(branch: Branch<S, O>) -> Branch<S, O> {
        branch
    }

    fn resume_choice<O>(branch: Branch<(), O>) -> crate::choice::Choice<O> {
        crate::choice::Choice::from_branch(branch)
    }
}

impl Continuation for Last {
    type Next<S, O> = Finale<S, O>;
    type Choice<O> = Finale<(), O>;

    fn resume<S, O>(branch: Branch<S, O>) -> Finale<S, O> {
        Finale { branch }
    }

    fn resume_choice<O>(branch: Branch<(), O>) -> Finale<(), O> {
        Finale { branch }
    }
}

/// After `otherwise`: nothing left but `end()`.
#[derive(Debug)]
pub struct Finale<S, O> {
    branch: Branch<S, O>,
}

impl<S, O: Target> Finale<S, O> {
    pub fn end(self) -> O {
        self.branch.end()
    }
}

/// A registered clause waiting for its action.
#[derive(Debug)]
pub struct When<S, O, K = Open> {
    branch: Branch<S, O>,
    matched: bool,
    _next: PhantomData<K>,
}

impl<S, O: Target, K: Continuation> When<S, O, K> {
    fn new(branch: Branch<S, O>, matched: bool) -> Self {
        Self {
            branch,
            matched,
            _next: PhantomData,
        }
    }

    pub(crate) fn into_parts(self) -> (Branch<S, O>, bool) {
        (self.branch, self.matched)
    }

    fn finish(self, action: impl FnOnce(S) -> Option<O>) -> K::Next<S, O> {
        K::resume(self.branch.settle(self.matched, action))
    }

    /// Look at the subject without settling an outcome.
    pub fn peek(self, action: impl FnOnce(&S)) -> K::Next<S, O> {
        self.finish(|subject| {
            action(&subject);
            None
        })
    }

    /// Match without any effect.
    pub fn nop(self) -> K::Next<S, O> {
        self.finish(|_| None)
    }

    #[track_caller]
    pub fn fault(self, msg: &dyn MessageCode, args: &[&dyn Display]) -> K::Next<S, O> {
        self.fault_with(msg, args, BTreeMap::new())
    }

    #[track_caller]
    pub fn fault_with(
        self,
        msg: &dyn MessageCode,
        args: &[&dyn Display],
        properties: BTreeMap<String, Value>,
    ) -> K::Next<S, O> {
        let signal = if self.matched {
            Some(raise(&self.branch.settings, SignalKind::Failure, msg, args, properties))
        } else {
            None
        };
        self.finish(|_| signal.map(O::injected))
    }
}

impl<S, O: StatusTarget, K: Continuation> When<S, O, K> {
    /// Settle with a status-only step.
    pub fn ergo(self, action: impl FnOnce(S) -> O) -> K::Next<S, O> {
        self.finish(|subject| Some(action(subject)))
    }
}

impl<S, O: WarningTarget, K: Continuation> When<S, O, K> {
    #[track_caller]
    pub fn alert(self, msg: &dyn MessageCode, args: &[&dyn Display]) -> K::Next<S, O> {
        self.alert_with(msg, args, BTreeMap::new())
    }

    #[track_caller]
    pub fn alert_with(
        self,
        msg: &dyn MessageCode,
        args: &[&dyn Display],
        properties: BTreeMap<String, Value>,
    ) -> K::Next<S, O> {
        let signal = if self.matched {
            Some(raise(&self.branch.settings, SignalKind::Warning, msg, args, properties))
        } else {
            None
        };
        self.finish(|_| signal.map(O::injected))
    }
}

impl<S, O: ValueTarget, K: Continuation> When<S, O, K> {
    /// Settle with a value-producing step.
    pub fn map(self, action: impl FnOnce(S) -> O) -> K::Next<S, O> {
        self.finish(|subject| Some(action(subject)))
    }

    /// Settle with a plain value.
    pub fn map_of(self, action: impl FnOnce(S) -> O::Value) -> K::Next<S, O> {
        self.finish(|subject| Some(O::of(action(subject))))
    }
}

/// A clause that matched on the subject's runtime type.
#[derive(Debug)]
pub struct WhenInstance<S, U, O> {
    branch: Branch<S, O>,
    matched: bool,
    _narrowed: PhantomData<fn() -> U>,
}

impl<S: 'static, U: 'static, O: Target> WhenInstance<S, U, O> {
    fn finish(self, action: impl FnOnce(U) -> Option<O>) -> Branch<S, O> {
        self.branch
            .settle(self.matched, |subject| cast::try_cast::<S, U>(subject).ok().and_then(action))
    }

    pub fn peek(self, action: impl FnOnce(&U)) -> Branch<S, O> {
        self.finish(|narrowed| {
            action(&narrowed);
            None
        })
    }

    pub fn nop(self) -> Branch<S, O> {
        self.finish(|_| None)
    }

    #[track_caller]
    pub fn fault(self, msg: &dyn MessageCode, args: &[&dyn Display]) -> Branch<S, O> {
        self.fault_with(msg, args, BTreeMap::new())
    }

    #[track_caller]
    pub fn fault_with(
        self,
        msg: &dyn MessageCode,
        args: &[&dyn Display],
        properties: BTreeMap<String, Value>,
    ) -> Branch<S, O> {
        let signal = if self.matched {
            Some(raise(&self.branch.settings, SignalKind::Failure, msg, args, properties))
        } else {
            None
        };
        self.finish(|_| signal.map(O::injected))
    }
}

impl<S: 'static, U: 'static, O: StatusTarget> WhenInstance<S, U, O> {
    pub fn ergo(self, action: impl FnOnce(U) -> O) -> Branch<S, O> {
        self.finish(|narrowed| Some(action(narrowed)))
    }
}

impl<S: 'static, U: 'static, O: WarningTarget> WhenInstance<S, U, O> {
    #[track_caller]
    pub fn alert(self, msg: &dyn MessageCode, args: &[&dyn Display]) -> Branch<S, O> {
        let signal = if self.matched {
            Some(raise(&self.branch.settings, SignalKind::Warning, msg, args, BTreeMap::new()))
        } else {
            None
        };
        self.finish(|_| signal.map(O::injected))
    }
}

impl<S: 'static, U: 'static, O: ValueTarget> WhenInstance<S, U, O> {
    pub fn map(self, action: impl FnOnce(U) -> O) -> Branch<S, O> {
        self.finish(|narrowed| Some(action(narrowed)))
    }

    pub fn map_of(self, action: impl FnOnce(U) -> O::Value) -> Branch<S, O> {
        self.finish(|narrowed| Some(O::of(action(narrowed))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forewarn_core::format::CustomMessage;
    use forewarn_core::{ItemStatus, Nothing, Something};
    use std::any::Any;
    use std::cell::Cell;

    const SPLIT: CustomMessage = CustomMessage::new("W-SPLIT", 200, "split into {}");
    const REJECT: CustomMessage = CustomMessage::new("E-REJ", 400, "rejected {}");

    #[test]
    fn test_first_match_wins() {
        let hits = Cell::new(0);
        let out = Branch::<i32, Nothing>::over(10)
            .when(|n| *n > 5)
            .peek(|_| hits.set(hits.get() + 1))
            .when(|n| *n > 1)
            .peek(|_| hits.set(hits.get() + 100))
            .end();
        assert_eq!(hits.get(), 1);
        assert!(out.complete_success());
    }

    #[test]
    fn test_later_conditions_not_evaluated() {
        let evaluated = Cell::new(0);
        let _ = Branch::<&str, Nothing>::over("x")
            .when_flag(true)
            .nop()
            .when(|_| {
                evaluated.set(evaluated.get() + 1);
                true
            })
            .nop()
            .end();
        assert_eq!(evaluated.get(), 0);
    }

    #[test]
    fn test_errored_subject_skips_everything() {
        let failure = Signal::new(SignalKind::Failure, "E0", 500, "boom");
        let out = Branch::<u8, Nothing>::inherit(Err(vec![failure.clone()]))
            .when(|_| panic!("condition evaluated on errored subject"))
            .ergo(|_| panic!("action run on errored subject"))
            .otherwise()
            .fault(&REJECT, &[&0])
            .end();
        assert_eq!(out.signals(), &[failure]);
    }

    #[test]
    fn test_inherited_warnings_prepended() {
        let warning = Signal::new(SignalKind::Warning, "W0", 200, "soft");
        let out = Branch::<u8, Nothing>::inherit(Ok((3, vec![warning])))
            .when_eq(3u8)
            .alert(&SPLIT, &[&2])
            .end();
        let codes: Vec<_> = out.signals().iter().map(Signal::code).collect();
        assert_eq!(codes, ["W0", "W-SPLIT"]);
    }

    #[test]
    fn test_unmatched_value_branch_is_no_val() {
        let out = Branch::<u8, Something<u8>>::over(1)
            .when(|n| *n > 1)
            .map_of(|n| n)
            .end();
        assert_eq!(out.signals()[0].code(), "NO_VAL");
    }

    #[test]
    fn test_fault_carries_properties_and_place() {
        let props = BTreeMap::from([("id".to_string(), Value::from(9))]);
        let out = Branch::<u8, Something<u8>>::over(9)
            .otherwise()
            .fault_with(&REJECT, &[&9], props)
            .end();
        let signal = &out.signals()[0];
        assert_eq!(signal.message(), "rejected 9");
        assert_eq!(signal.property("id"), Some(&Value::from(9)));
        assert!(signal.place().unwrap().contains("branch.rs:"));
    }

    #[test]
    fn test_when_instance_narrows() {
        let subject: Box<dyn Any> = Box::new(42u64);
        let out = Branch::<Box<dyn Any>, Something<String>>::over(subject)
            .when_instance::<String>()
            .map_of(|s| s)
            .when_instance::<u64>()
            .map_of(|n| format!("number {n}"))
            .end();
        assert_eq!(out.value(), "number 42");
    }
}
