//! # Settings: Message Catalog and Diagnostics
//!
//! Built-in templates (used for the library's own failures and warnings) live
//! in an embedded TOML catalog. Builders and branch contexts receive a
//! [`Settings`] explicitly; code that does not pass one gets
//! [`Settings::shared`], which uses the built-in catalog and a [`Silent`] sink.

use crate::error::{ConfigError, FormatError};
use crate::format::MessageCode;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

const BUILTIN_TOML: &str = include_str!("messages.toml");

static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::from_toml(BUILTIN_TOML).unwrap_or_else(|err| {
        tracing::error!(%err, "built-in message catalog is malformed");
        Catalog::default()
    })
});

static SHARED: LazyLock<Arc<Settings>> = LazyLock::new(|| Arc::new(Settings::default()));

/// Receives message-formatting failures.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, error: &FormatError);
}

/// Swallows every report. The default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl DiagnosticSink for Silent {
    fn report(&self, _error: &FormatError) {}
}

/// Forwards reports to `tracing` at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, error: &FormatError) {
        tracing::warn!(pattern = %error.pattern, index = error.index, "message formatting failed");
    }
}

/// Messages the library raises on its own behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// A missing value was supplied.
    NilArg,
    /// A signal was supplied where a payload was expected.
    SignalValue,
    /// A builder value was set twice.
    DoubleValue,
    /// Warning: a value arrived after an error and was dropped.
    ValueIgnored,
    /// Warning: a value was dropped at build time because errors exist.
    ValueOverridden,
    /// No value was produced.
    NoValue,
    /// An error value was captured.
    Captured,
}

impl Builtin {
    pub fn code(self) -> &'static str {
        match self {
            Builtin::NilArg => "NIL_ARG",
            Builtin::SignalValue => "SIG_VAL",
            Builtin::DoubleValue => "DBL_VAL",
            Builtin::ValueIgnored => "VAL_IGN",
            Builtin::ValueOverridden => "VAL_OVR",
            Builtin::NoValue => "NO_VAL",
            Builtin::Captured => "999E",
        }
    }
}

/// One catalog template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub code: String,
    pub status: u16,
    pub template: String,
}

impl MessageCode for CatalogEntry {
    fn code(&self) -> &str {
        &self.code
    }

    fn status_code(&self) -> u16 {
        self.status
    }

    fn pattern(&self) -> &str {
        &self.template
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    messages: BTreeMap<String, EntrySpec>,
}

#[derive(Deserialize)]
struct EntrySpec {
    #[serde(default = "default_status")]
    status: u16,
    template: String,
}

fn default_status() -> u16 {
    500
}

/// Message templates keyed by short code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    /// The embedded catalog, parsed once.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = toml::from_str(source)?;
        let mut entries = BTreeMap::new();
        for (code, raw) in file.messages {
            if raw.template.trim().is_empty() {
                return Err(ConfigError::EmptyTemplate { code });
            }
            let entry = CatalogEntry {
                code: code.clone(),
                status: raw.status,
                template: raw.template,
            };
            entries.insert(code, entry);
        }
        Ok(Self { entries })
    }

    /// Overlay `other` on top of this catalog; entries with the same code are replaced.
    pub fn merge(&mut self, other: Catalog) {
        self.entries.extend(other.entries);
    }

    pub fn lookup(&self, code: &str) -> Option<&CatalogEntry> {
        self.entries.get(code)
    }

    /// Template for a built-in message. A missing entry degrades to the bare code.
    pub fn get(&self, builtin: Builtin) -> Cow<'_, CatalogEntry> {
        match self.entries.get(builtin.code()) {
            Some(entry) => Cow::Borrowed(entry),
            None => Cow::Owned(CatalogEntry {
                code: builtin.code().to_string(),
                status: default_status(),
                template: builtin.code().to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Explicit configuration handed to builders and branch contexts.
#[derive(Clone)]
pub struct Settings {
    catalog: Catalog,
    sink: Arc<dyn DiagnosticSink>,
}

impl Settings {
    /// Built-in catalog with a silent sink.
    pub fn new() -> Self {
        Self {
            catalog: Catalog::builtin().clone(),
            sink: Arc::new(Silent),
        }
    }

    /// The process-wide default, shared by everything not configured explicitly.
    pub fn shared() -> Arc<Settings> {
        Arc::clone(&SHARED)
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Overlay application templates, written in the same TOML layout as the built-in catalog.
    pub fn with_overrides(mut self, source: &str) -> Result<Self, ConfigError> {
        let overrides = Catalog::from_toml(source)?;
        self.catalog.merge(overrides);
        Ok(self)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn sink(&self) -> &dyn DiagnosticSink {
        self.sink.as_ref()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("catalog_entries", &self.catalog.len())
            .finish()
    }
}
