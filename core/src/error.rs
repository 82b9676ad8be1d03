use thiserror::Error;

/// A precondition violation raised straight to the caller.
///
/// Unlike failures and warnings these are never accumulated into a container:
/// they signal that the calling code itself is wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("parallelism bound must be at least 1, got {0}")]
    InvalidParallelism(usize),
}

/// Loading or merging a message catalog failed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid message catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("catalog entry {code} has an empty template")]
    EmptyTemplate { code: String },
}

/// A message argument refused to render.
///
/// Only a `Display` implementation returning `Err` can produce this; plain
/// placeholder mismatches are tolerated by the formatter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot render pattern {pattern:?}: argument #{index} failed to format")]
pub struct FormatError {
    pub pattern: String,
    pub index: usize,
}

/// A deserialized container broke the payload rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("container carries a value next to a failure")]
    ValueWithFailure,
    #[error("container carries neither a value nor a failure")]
    MissingValue,
}
