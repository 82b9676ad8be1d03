//! Forewarn facade crate.
//!
//! This crate re-exports the containers of `forewarn-core` and, with the
//! default `flow` feature, the branching DSL of `forewarn-flow`.

pub use forewarn_core as core;
#[cfg(feature = "flow")]
pub use forewarn_flow as flow;

pub use forewarn_core::{
    Hope, Nope, Nothing, NothingBuilder, Settings, Signal, SignalKind, Something,
    SomethingBuilder,
};
#[cfg(feature = "flow")]
pub use forewarn_flow::{Branch, Choice, ChooseContext, OptoContext};

pub mod prelude {
    pub use forewarn_core::prelude::*;
    #[cfg(feature = "flow")]
    pub use forewarn_flow::prelude::*;
}
