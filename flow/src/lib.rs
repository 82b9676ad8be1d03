//! Forewarn Flow - Branching over Containers
//!
//! This crate layers a small decision DSL on top of `forewarn-core`:
//! - `Branch`: first-match `when` / `otherwise` / `end` over a subject
//! - `Choice`: the same without a subject, for status-only containers
//! - `Target`: how a branch finalizes into each container kind
//!
//! **IMPORTANT**: Branch evaluation is synchronous and never catches panics
//! raised by conditions or actions.

pub mod branch;
pub mod cast;
pub mod choice;
pub mod entry;
pub mod target;

pub use branch::{Branch, Continuation, Finale, Last, Open, When, WhenInstance};
pub use choice::{Choice, ChoiceWhen};
pub use entry::{ChooseContext, HopeOpto, NopeOpto, NothingChoice, OptoContext, SomethingChoose};
pub use target::{StatusTarget, Target, ValueTarget, WarningTarget};

pub mod prelude {
    pub use crate::branch::Branch;
    pub use crate::choice::Choice;
    pub use crate::entry::{
        ChooseContext, HopeOpto, NopeOpto, NothingChoice, OptoContext, SomethingChoose,
    };
}
