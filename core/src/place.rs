//! # Place: Signal Provenance
//!
//! A [`Place`] is the source location a signal was raised from, rendered as
//! `owner->member(file:line)`.
//!
//! Every factory is `#[track_caller]`, so the location is free. Rust has no
//! runtime view of the enclosing type or method, so the owner is derived from
//! the file name and the member stays unknown: such places render as
//! `owner(file:line)`. The [`place!`](crate::place!) macro records the module
//! path and enclosing function as well, and the [`fault!`](crate::fault!) and
//! [`alert!`](crate::alert!) macros raise signals carrying that full
//! `module->function(file:line)` form.
//!
//! Errors can carry their own trail: wrapping an error in [`Located`] at each
//! hop records where it was propagated, and `capture` turns that trail into
//! the signal's place.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::panic::Location;

/// A source location, optionally qualified by owner and member names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Place {
    owner: Cow<'static, str>,
    member: Option<Cow<'static, str>>,
    file: Cow<'static, str>,
    line: u32,
}

impl Place {
    /// The location of the caller of the enclosing `#[track_caller]` chain.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &'static Location<'static>) -> Self {
        let file = location.file();
        Self {
            owner: Cow::Borrowed(file_stem(file)),
            member: None,
            file: Cow::Borrowed(file),
            line: location.line(),
        }
    }

    /// Build from a fully qualified function path such as `app::orders::submit`.
    ///
    /// Closure segments (`{{closure}}`) are skipped so the member is the named
    /// function that contains them.
    pub fn named(path: &'static str, file: &'static str, line: u32) -> Self {
        let mut path = path;
        while let Some(stripped) = path.strip_suffix("::{{closure}}") {
            path = stripped;
        }
        let (owner, member) = match path.rsplit_once("::") {
            Some((owner, member)) => (owner, Some(Cow::Borrowed(member))),
            None => (path, None),
        };
        Self {
            owner: Cow::Borrowed(owner),
            member,
            file: Cow::Borrowed(file),
            line,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

fn file_stem(file: &str) -> &str {
    let name = file.rsplit(['/', '\\']).next().unwrap_or(file);
    name.strip_suffix(".rs").unwrap_or(name)
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.member {
            Some(member) => write!(f, "{}->{}({}:{})", self.owner, member, self.file, self.line),
            None => write!(f, "{}({}:{})", self.owner, self.file, self.line),
        }
    }
}

/// Capture the current module, enclosing function, file and line as a [`Place`].
#[macro_export]
macro_rules! place {
    () => {{
        fn __place_marker() {}
        let path = ::std::any::type_name_of_val(&__place_marker);
        let path = path.strip_suffix("::__place_marker").unwrap_or(path);
        $crate::place::Place::named(path, file!(), line!())
    }};
}

/// Raise a failure placed at the enclosing function.
///
/// ```rust
/// use forewarn_core::prelude::*;
///
/// const LOCKED: CustomMessage = CustomMessage::new("E-LOCK", 423, "row {} locked");
///
/// fn reserve(row: u32) -> Signal {
///     forewarn_core::fault!(&LOCKED, row)
/// }
///
/// let signal = reserve(4);
/// assert_eq!(signal.message(), "row 4 locked");
/// assert!(signal.place().unwrap_or_default().contains("->reserve("));
/// ```
#[macro_export]
macro_rules! fault {
    ($msg:expr $(, $arg:expr)* $(,)?) => {
        $crate::signal::Signal::fault($msg, &[$(&$arg as &dyn ::std::fmt::Display),*])
            .with_place($crate::place!())
    };
}

/// Raise a warning placed at the enclosing function.
#[macro_export]
macro_rules! alert {
    ($msg:expr $(, $arg:expr)* $(,)?) => {
        $crate::signal::Signal::alert($msg, &[$(&$arg as &dyn ::std::fmt::Display),*])
            .with_place($crate::place!())
    };
}

/// An error annotated with the place it passed through.
pub struct Located {
    place: Place,
    inner: Box<dyn Error + Send + Sync + 'static>,
}

impl Located {
    #[track_caller]
    pub fn new(error: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        Self {
            place: Place::caller(),
            inner: error.into(),
        }
    }

    pub fn at(place: Place, error: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        Self {
            place,
            inner: error.into(),
        }
    }

    pub fn place(&self) -> &Place {
        &self.place
    }

    pub fn inner(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.inner.as_ref()
    }
}

impl fmt::Debug for Located {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Located")
            .field("place", &self.place.to_string())
            .field("inner", &self.inner)
            .finish()
    }
}

// Display and source skip the wrapper itself so messages read as the wrapped error.
impl fmt::Display for Located {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl Error for Located {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source()
    }
}

/// Wrap any error in a [`Located`] at the call site.
pub trait LocateExt {
    fn located(self) -> Located;
}

impl<E> LocateExt for E
where
    E: Error + Send + Sync + 'static,
{
    #[track_caller]
    fn located(self) -> Located {
        Located::new(self)
    }
}

/// Annotate the error arm of a `Result` with the call site.
pub trait ResultExt<T> {
    fn locate(self) -> Result<T, Located>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<Box<dyn Error + Send + Sync + 'static>>,
{
    #[track_caller]
    fn locate(self) -> Result<T, Located> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(Located::new(err)),
        }
    }
}

/// Places of the `Located` layers in `error`, outermost first.
pub fn trail(error: &(dyn Error + 'static)) -> Vec<Place> {
    let mut places = Vec::new();
    let mut current: Option<&(dyn Error + 'static)> = Some(error);
    while let Some(err) = current {
        match err.downcast_ref::<Located>() {
            Some(located) => {
                places.push(located.place.clone());
                current = Some(located.inner() as &(dyn Error + 'static));
            }
            None => current = err.source(),
        }
    }
    places
}

/// Messages of the `source()` chain below `error`, skipping `Located` wrappers.
pub fn causes(error: &(dyn Error + 'static)) -> Vec<String> {
    let mut messages = Vec::new();
    let mut current = unwrap_located(error).source();
    while let Some(err) = current {
        let err = unwrap_located(err);
        messages.push(err.to_string());
        current = err.source();
    }
    messages
}

fn unwrap_located<'a>(error: &'a (dyn Error + 'static)) -> &'a (dyn Error + 'static) {
    let mut current = error;
    while let Some(located) = current.downcast_ref::<Located>() {
        current = located.inner() as &(dyn Error + 'static);
    }
    current
}

/// Render several places as `[a, b, c]`, or a single place bare.
pub fn render_trail(places: &[Place]) -> String {
    match places {
        [single] => single.to_string(),
        _ => {
            let joined = places
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            format!("[{joined}]")
        }
    }
}
