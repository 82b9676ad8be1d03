//! Branching without a subject.
//!
//! Status-only containers carry no payload, so their branches test plain
//! conditions and run zero-argument actions. The rules are the same as for
//! [`Branch`]: first match wins and an errored receiver skips every clause.

use crate::branch::{Branch, Continuation, Last, Open, raise};
use crate::target::{StatusTarget, Target, ValueTarget, WarningTarget};
use forewarn_core::format::MessageCode;
use forewarn_core::settings::Settings;
use forewarn_core::{Signal, SignalKind};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

/// A subject-less branch.
#[derive(Debug)]
pub struct Choice<O> {
    branch: Branch<(), O>,
}

impl<O> Choice<O> {
    pub(crate) fn from_branch(branch: Branch<(), O>) -> Self {
        Self { branch }
    }
}

impl<O: Target> Choice<O> {
    /// Inherit the status of a signal list: `Ok(warnings)` or `Err(signals)`.
    pub fn inherit(state: Result<Vec<Signal>, Vec<Signal>>) -> Self {
        Self::from_branch(Branch::inherit(state.map(|warnings| ((), warnings))))
    }

    pub fn with_settings(self, settings: Arc<Settings>) -> Self {
        Self::from_branch(self.branch.with_settings(settings))
    }

    pub fn when(self, condition: impl FnOnce() -> bool) -> ChoiceWhen<O> {
        self.register(|branch| branch.when(|_| condition()))
    }

    pub fn when_flag(self, flag: bool) -> ChoiceWhen<O> {
        self.when(|| flag)
    }

    pub fn otherwise(self) -> ChoiceWhen<O, Last> {
        self.register(|branch| branch.otherwise())
    }

    fn register<K: Continuation>(
        self,
        clause: impl FnOnce(Branch<(), O>) -> crate::branch::When<(), O, K>,
    ) -> ChoiceWhen<O, K> {
        let (branch, matched) = clause(self.branch).into_parts();
        ChoiceWhen {
            branch,
            matched,
            _next: PhantomData,
        }
    }

    pub fn end(self) -> O {
        self.branch.end()
    }
}

/// A registered subject-less clause waiting for its action.
#[derive(Debug)]
pub struct ChoiceWhen<O, K = Open> {
    branch: Branch<(), O>,
    matched: bool,
    _next: PhantomData<K>,
}

impl<O: Target, K: Continuation> ChoiceWhen<O, K> {
    fn finish(self, action: impl FnOnce() -> Option<O>) -> K::Choice<O> {
        K::resume_choice(self.branch.settle(self.matched, |()| action()))
    }

    pub fn peek(self, action: impl FnOnce()) -> K::Choice<O> {
        self.finish(|| {
            action();
            None
        })
    }

    pub fn nop(self) -> K::Choice<O> {
        self.finish(|| None)
    }

    #[track_caller]
    pub fn fault(self, msg: &dyn MessageCode, args: &[&dyn Display]) -> K::Choice<O> {
        self.fault_with(msg, args, BTreeMap::new())
    }

    #[track_caller]
    pub fn fault_with(
        self,
        msg: &dyn MessageCode,
        args: &[&dyn Display],
        properties: BTreeMap<String, Value>,
    ) -> K::Choice<O> {
        let signal = if self.matched {
            Some(raise(self.branch.settings(), SignalKind::Failure, msg, args, properties))
        } else {
            None
        };
        self.finish(|| signal.map(O::injected))
    }
}

impl<O: StatusTarget, K: Continuation> ChoiceWhen<O, K> {
    pub fn ergo(self, action: impl FnOnce() -> O) -> K::Choice<O> {
        self.finish(|| Some(action()))
    }
}

impl<O: WarningTarget, K: Continuation> ChoiceWhen<O, K> {
    #[track_caller]
    pub fn alert(self, msg: &dyn MessageCode, args: &[&dyn Display]) -> K::Choice<O> {
        self.alert_with(msg, args, BTreeMap::new())
    }

    #[track_caller]
    pub fn alert_with(
        self,
        msg: &dyn MessageCode,
        args: &[&dyn Display],
        properties: BTreeMap<String, Value>,
    ) -> K::Choice<O> {
        let signal = if self.matched {
            Some(raise(self.branch.settings(), SignalKind::Warning, msg, args, properties))
        } else {
            None
        };
        self.finish(|| signal.map(O::injected))
    }
}

impl<O: ValueTarget, K: Continuation> ChoiceWhen<O, K> {
    pub fn map(self, action: impl FnOnce() -> O) -> K::Choice<O> {
        self.finish(|| Some(action()))
    }

    pub fn map_of(self, action: impl FnOnce() -> O::Value) -> K::Choice<O> {
        self.finish(|| Some(O::of(action())))
    }
}
