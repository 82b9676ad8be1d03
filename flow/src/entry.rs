//! Entry points: how each container opens a branch.
//!
//! | receiver | status-only | value-producing |
//! |---|---|---|
//! | `Nothing` | `choice` | `choice_map` |
//! | `Something<T>` | `choose` | `choose_map` |
//! | `Hope<T>` | `opto`, `chooses` | `opto_map`, `chooses_map` |
//! | `Nope` | `opto`, `chooses` | `opto_map`, `chooses_map` |
//! | raw value | [`ChooseContext::choose`], [`OptoContext::opto`] | `choose_map`, `opto_map` |
//!
//! `opto` stays on the single-failure side (`Nope`/`Hope`); `chooses`
//! switches to the multi-signal side (`Nothing`/`Something`).

use crate::branch::Branch;
use crate::choice::Choice;
use forewarn_core::{Hope, Nope, Nothing, Signal, Something};

/// Branching on a status-only multi-signal result.
pub trait NothingChoice {
    fn choice(self) -> Choice<Nothing>;

    fn choice_map<R>(self) -> Choice<Something<R>>;
}

impl NothingChoice for Nothing {
    fn choice(self) -> Choice<Nothing> {
        Choice::inherit(split_nothing(self))
    }

    fn choice_map<R>(self) -> Choice<Something<R>> {
        Choice::inherit(split_nothing(self))
    }
}

fn split_nothing(nothing: Nothing) -> Result<Vec<Signal>, Vec<Signal>> {
    nothing.map_to(Ok, Err)
}

/// Branching on the payload of a multi-signal result.
pub trait SomethingChoose<T> {
    fn choose(self) -> Branch<T, Nothing>;

    fn choose_map<R>(self) -> Branch<T, Something<R>>;
}

impl<T> SomethingChoose<T> for Something<T> {
    fn choose(self) -> Branch<T, Nothing> {
        Branch::inherit(self.into_result())
    }

    fn choose_map<R>(self) -> Branch<T, Something<R>> {
        Branch::inherit(self.into_result())
    }
}

/// Branching on the payload of a single-failure result.
pub trait HopeOpto<T> {
    fn opto(self) -> Branch<T, Nope>;

    fn opto_map<R>(self) -> Branch<T, Hope<R>>;

    fn chooses(self) -> Branch<T, Nothing>;

    fn chooses_map<R>(self) -> Branch<T, Something<R>>;
}

fn split_hope<T>(hope: Hope<T>) -> Result<(T, Vec<Signal>), Vec<Signal>> {
    hope.into_result()
        .map(|value| (value, Vec::new()))
        .map_err(|failure| vec![failure])
}

impl<T> HopeOpto<T> for Hope<T> {
    fn opto(self) -> Branch<T, Nope> {
        Branch::inherit(split_hope(self))
    }

    fn opto_map<R>(self) -> Branch<T, Hope<R>> {
        Branch::inherit(split_hope(self))
    }

    fn chooses(self) -> Branch<T, Nothing> {
        Branch::inherit(split_hope(self))
    }

    fn chooses_map<R>(self) -> Branch<T, Something<R>> {
        Branch::inherit(split_hope(self))
    }
}

/// Branching on a status-only single-failure result.
pub trait NopeOpto {
    fn opto(self) -> Choice<Nope>;

    fn opto_map<R>(self) -> Choice<Hope<R>>;

    fn chooses(self) -> Choice<Nothing>;

    fn chooses_map<R>(self) -> Choice<Something<R>>;
}

fn split_nope(nope: Nope) -> Result<Vec<Signal>, Vec<Signal>> {
    Result::<(), Signal>::from(nope)
        .map(|()| Vec::new())
        .map_err(|failure| vec![failure])
}

impl NopeOpto for Nope {
    fn opto(self) -> Choice<Nope> {
        Choice::inherit(split_nope(self))
    }

    fn opto_map<R>(self) -> Choice<Hope<R>> {
        Choice::inherit(split_nope(self))
    }

    fn chooses(self) -> Choice<Nothing> {
        Choice::inherit(split_nope(self))
    }

    fn chooses_map<R>(self) -> Choice<Something<R>> {
        Choice::inherit(split_nope(self))
    }
}

/// Multi-signal branching on a raw value, which is successful by definition.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChooseContext;

impl ChooseContext {
    pub fn choose<S>(subject: S) -> Branch<S, Nothing> {
        Branch::over(subject)
    }

    pub fn choose_map<S, R>(subject: S) -> Branch<S, Something<R>> {
        Branch::over(subject)
    }
}

/// Single-failure branching on a raw value.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptoContext;

impl OptoContext {
    pub fn opto<S>(subject: S) -> Branch<S, Nope> {
        Branch::over(subject)
    }

    pub fn opto_map<S, R>(subject: S) -> Branch<S, Hope<R>> {
        Branch::over(subject)
    }
}
