//! # Format: Message Templates
//!
//! Signal messages are rendered from short templates with positional `{}`
//! placeholders.
//!
//! * `{}` takes the next argument
//! * `\{}` is a literal `{}` and takes nothing
//! * `{{}}` wraps the next argument in braces: `{value}`
//! * extra arguments are ignored, a placeholder without an argument is kept verbatim
//!
//! Slices render through [`list`] as `[a, b, c]`.

use crate::error::FormatError;
use crate::settings::{DiagnosticSink, Silent};
use std::fmt::{self, Display, Write};

const LITERAL: &str = "\\{}";
const BRACED: &str = "{{}}";
const SLOT: &str = "{}";

/// Render `pattern` with positional `args`.
pub fn render(pattern: &str, args: &[&dyn Display]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(pattern.len() + 16 * args.len());
    let mut rest = pattern;
    let mut index = 0usize;

    let fail = |index: usize| FormatError {
        pattern: pattern.to_string(),
        index,
    };

    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix(LITERAL) {
            out.push_str(SLOT);
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix(BRACED) {
            match args.get(index) {
                Some(arg) => write!(out, "{{{arg}}}").map_err(|_| fail(index))?,
                None => out.push_str(BRACED),
            }
            index += 1;
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix(SLOT) {
            match args.get(index) {
                Some(arg) => write!(out, "{arg}").map_err(|_| fail(index))?,
                None => out.push_str(SLOT),
            }
            index += 1;
            rest = tail;
        } else {
            let mut chars = rest.chars();
            if let Some(ch) = chars.next() {
                out.push(ch);
            }
            rest = chars.as_str();
        }
    }

    Ok(out)
}

/// Render `pattern`, reporting a failure to `sink` and falling back to the raw pattern.
pub fn render_lossy(pattern: &str, args: &[&dyn Display], sink: &dyn DiagnosticSink) -> String {
    match render(pattern, args) {
        Ok(text) => text,
        Err(err) => {
            sink.report(&err);
            pattern.to_string()
        }
    }
}

/// Slice argument rendered as a bracketed, comma-joined list.
pub struct Listed<'a, T>(&'a [T]);

/// Wrap a slice so it renders as `[a, b, c]` inside a message.
pub fn list<T: Display>(items: &[T]) -> Listed<'_, T> {
    Listed(items)
}

impl<T: Display> Display for Listed<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str("]")
    }
}

/// A domain message supplied by the embedding application.
///
/// Failures and warnings are raised from a message plus arguments; the
/// library only needs the short code, the numeric status and the template.
pub trait MessageCode {
    fn code(&self) -> &str;

    fn status_code(&self) -> u16 {
        500
    }

    fn pattern(&self) -> &str;

    fn message(&self, args: &[&dyn Display]) -> String {
        self.message_with(args, &Silent)
    }

    fn message_with(&self, args: &[&dyn Display], sink: &dyn DiagnosticSink) -> String {
        render_lossy(self.pattern(), args, sink)
    }
}

/// A `const`-constructible [`MessageCode`].
///
/// ```rust
/// use forewarn_core::format::{CustomMessage, MessageCode};
///
/// const ORDER_EMPTY: CustomMessage = CustomMessage::new("ORD01", 422, "order {} has no lines");
/// assert_eq!(ORDER_EMPTY.message(&[&42]), "order 42 has no lines");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomMessage {
    code: &'static str,
    status: u16,
    pattern: &'static str,
}

impl CustomMessage {
    pub const fn new(code: &'static str, status: u16, pattern: &'static str) -> Self {
        Self {
            code,
            status,
            pattern,
        }
    }
}

impl MessageCode for CustomMessage {
    fn code(&self) -> &str {
        self.code
    }

    fn status_code(&self) -> u16 {
        self.status
    }

    fn pattern(&self) -> &str {
        self.pattern
    }
}
