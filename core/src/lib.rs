//! Value-or-signals containers.
//!
//! Four containers carry the outcome of an operation: [`Nothing`] and
//! [`Nope`] carry status only, [`Something`] and [`Hope`] carry a payload.
//! The multi-signal pair accumulates any number of failures and warnings;
//! the single-failure pair holds at most one failure and never a warning.

pub mod builder;
pub mod error;
pub mod executor;
pub mod format;
pub mod hope;
pub mod nope;
pub mod nothing;
pub mod place;
pub mod settings;
pub mod signal;
pub mod something;
pub mod status;

pub mod prelude {
    pub use crate::builder::{Accumulate, NothingBuilder, SomethingBuilder};
    pub use crate::error::UsageError;
    pub use crate::executor::{BoundedPool, Executor, Inline};
    pub use crate::format::{CustomMessage, MessageCode, list};
    pub use crate::hope::Hope;
    pub use crate::nope::Nope;
    pub use crate::nothing::Nothing;
    pub use crate::place::{LocateExt, Place, ResultExt};
    pub use crate::settings::Settings;
    pub use crate::signal::{Signal, SignalKind};
    pub use crate::something::Something;
    pub use crate::status::{IntoSignals, ItemStatus, Status};
}

pub use builder::{Accumulate, Accumulator, NothingBuilder, SomethingBuilder};
pub use error::{ConfigError, FormatError, ShapeError, UsageError};
pub use executor::{BoundedPool, Executor, Inline, Task};
pub use format::{CustomMessage, MessageCode, list, render, render_lossy};
pub use hope::Hope;
pub use nope::Nope;
pub use nothing::Nothing;
pub use place::{LocateExt, Located, Place, ResultExt};
pub use settings::{Builtin, Catalog, CatalogEntry, DiagnosticSink, Settings, Silent, TracingSink};
pub use signal::{Signal, SignalKind};
pub use something::Something;
pub use status::{IntoSignals, ItemStatus, Status};
