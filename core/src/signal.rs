use crate::format::MessageCode;
use crate::place::{self, Place};
use crate::settings::{Builtin, DiagnosticSink, Settings, Silent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{self, Display};

/// Severity of a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// Hard error. Halts downstream composition.
    Failure,
    /// Soft notice. Carried forward and merged.
    Warning,
}

/// The notification unit carried by every container.
///
/// Everything but the property bag is fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    kind: SignalKind,
    code: String,
    status: u16,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    place: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, Value>,
}

impl Signal {
    pub fn new(
        kind: SignalKind,
        code: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            code: code.into(),
            status,
            message: message.into(),
            place: None,
            properties: BTreeMap::new(),
        }
    }

    /// Raise a failure from a message template.
    #[track_caller]
    pub fn fault(msg: &dyn MessageCode, args: &[&dyn Display]) -> Self {
        Self::raise(SignalKind::Failure, msg, args, &Silent)
    }

    /// Raise a warning from a message template.
    #[track_caller]
    pub fn alert(msg: &dyn MessageCode, args: &[&dyn Display]) -> Self {
        Self::raise(SignalKind::Warning, msg, args, &Silent)
    }

    /// Raise a signal, reporting template failures to `sink`.
    #[track_caller]
    pub fn raise(
        kind: SignalKind,
        msg: &dyn MessageCode,
        args: &[&dyn Display],
        sink: &dyn DiagnosticSink,
    ) -> Self {
        Self::new(kind, msg.code(), msg.status_code(), msg.message_with(args, sink))
            .with_place(Place::caller())
    }

    /// Raise one of the library's own messages.
    #[track_caller]
    pub fn builtin(
        kind: SignalKind,
        settings: &Settings,
        builtin: Builtin,
        args: &[&dyn Display],
    ) -> Self {
        let entry = settings.catalog().get(builtin);
        Self::raise(kind, &*entry, args, settings.sink())
    }

    /// Convert an error into a failure.
    ///
    /// The place is the propagation trail: this call site first, then every
    /// [`Located`](crate::place::Located) layer of `error`, outermost to innermost.
    #[track_caller]
    pub fn capture(error: &(dyn Error + 'static)) -> Self {
        Self::capture_with(&Settings::shared(), error)
    }

    /// [`capture`](Self::capture) rendering through `settings`.
    #[track_caller]
    pub fn capture_with(settings: &Settings, error: &(dyn Error + 'static)) -> Self {
        let mut places = vec![Place::caller()];
        places.extend(place::trail(error));
        Self::captured(settings, error, place::render_trail(&places))
    }

    /// Convert an error into a failure attributed to this call site only.
    #[track_caller]
    pub fn capture_here(error: &(dyn Error + 'static)) -> Self {
        Self::capture_here_with(&Settings::shared(), error)
    }

    #[track_caller]
    pub fn capture_here_with(settings: &Settings, error: &(dyn Error + 'static)) -> Self {
        Self::captured(settings, error, Place::caller().to_string())
    }

    /// Convert an error into a failure attributed to the frame that handed it over.
    ///
    /// That is the outermost `Located` layer; without one it is this call site.
    #[track_caller]
    pub fn capture_caller(error: &(dyn Error + 'static)) -> Self {
        Self::capture_caller_with(&Settings::shared(), error)
    }

    #[track_caller]
    pub fn capture_caller_with(settings: &Settings, error: &(dyn Error + 'static)) -> Self {
        let here = Place::caller();
        let place = place::trail(error).into_iter().next().unwrap_or(here);
        Self::captured(settings, error, place.to_string())
    }

    #[track_caller]
    fn captured(settings: &Settings, error: &(dyn Error + 'static), origin: String) -> Self {
        let message = error.to_string();
        let mut signal = Self::builtin(
            SignalKind::Failure,
            settings,
            Builtin::Captured,
            &[&message],
        );
        signal.place = Some(origin);
        let causes = place::causes(error);
        if !causes.is_empty() {
            signal.set_property("causes", causes);
        }
        signal
    }

    pub fn with_place(mut self, place: impl Display) -> Self {
        self.place = Some(place.to_string());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// The same signal with failure severity.
    pub fn into_failure(mut self) -> Self {
        self.kind = SignalKind::Failure;
        self
    }

    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    pub fn is_failure(&self) -> bool {
        self.kind == SignalKind::Failure
    }

    pub fn is_warning(&self) -> bool {
        self.kind == SignalKind::Warning
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn place(&self) -> Option<&str> {
        self.place.as_deref()
    }

    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

impl Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            SignalKind::Failure => "E",
            SignalKind::Warning => "W",
        };
        write!(f, "[{tag}] {} ({}): {}", self.code, self.status, self.message)?;
        if let Some(place) = &self.place {
            write!(f, " @ {place}")?;
        }
        Ok(())
    }
}
