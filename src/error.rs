use core::fmt;

#[cfg(all(debug_assertions, feature = "alloc"))]
use alloc::boxed::Box;

/// An error produced by one of the checked entry points of the crate: parsing a complete
/// packet with [`Message::parse`](enum.Message.html#method.parse) or changing a session
/// parameter to an out-of-range value.
///
/// The streaming [`Decoder`](struct.Decoder.html) never produces errors. Garbage on the line is
/// absorbed by resynchronizing on the next status byte.
///
/// In debug builds with the `alloc` feature enabled the error remembers the lower-level error it
/// was raised from, available through [`source`](#method.source) and
/// [`causes`](#method.causes). Otherwise it is a single thin pointer to an `ErrorKind`.
#[derive(Clone)]
pub struct Error {
    kind: &'static ErrorKind,
    #[cfg(all(debug_assertions, feature = "alloc"))]
    cause: Option<Box<Error>>,
}
impl Error {
    /// Create a new error with the given `ErrorKind`.
    #[inline]
    pub fn new(kind: &'static ErrorKind) -> Error {
        Error {
            kind,
            #[cfg(all(debug_assertions, feature = "alloc"))]
            cause: None,
        }
    }

    /// What went wrong, at the level of the entry point that failed.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        *self.kind
    }

    /// The lower-level error this one was raised from.
    ///
    /// Always `None` in release mode, since causes are only kept in debug builds.
    #[cfg(all(debug_assertions, feature = "alloc"))]
    #[inline]
    pub fn source(&self) -> Option<&Error> {
        self.cause.as_deref()
    }

    /// The lower-level error this one was raised from.
    ///
    /// Always `None` in release mode, since causes are only kept in debug builds.
    #[cfg(not(all(debug_assertions, feature = "alloc")))]
    #[inline]
    pub fn source(&self) -> Option<&Error> {
        None
    }

    /// Iterate over the causes of this error, starting with the error itself.
    #[inline]
    pub fn causes(&self) -> Causes {
        Causes { next: Some(self) }
    }

    /// Raise `ctx` as a consequence of this error.
    #[cfg(all(debug_assertions, feature = "alloc"))]
    fn caused(self, ctx: &'static ErrorKind) -> Error {
        Error {
            kind: ctx,
            cause: Some(Box::new(self)),
        }
    }

    #[cfg(not(all(debug_assertions, feature = "alloc")))]
    #[inline]
    fn caused(self, ctx: &'static ErrorKind) -> Error {
        Error::new(ctx)
    }
}
impl From<&'static ErrorKind> for Error {
    #[inline]
    fn from(kind: &'static ErrorKind) -> Error {
        Error::new(kind)
    }
}
impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self.kind, f)
    }
}
impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut causes = self.causes();
        if let Some(err) = causes.next() {
            write!(f, "{}", err.kind)?;
        }
        for cause in causes {
            write!(f, "\n  caused by: {}", cause.kind)?;
        }
        Ok(())
    }
}
#[cfg(feature = "std")]
impl std::error::Error for Error {
    #[inline]
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Error::source(self).map(|err| err as &(dyn std::error::Error + 'static))
    }
}

/// Iterator over an error and its causes, created by [`Error::causes`].
///
/// [`Error::causes`]: struct.Error.html#method.causes
#[derive(Clone, Debug)]
pub struct Causes<'a> {
    next: Option<&'a Error>,
}
impl<'a> Iterator for Causes<'a> {
    type Item = &'a Error;
    #[inline]
    fn next(&mut self) -> Option<&'a Error> {
        let err = self.next?;
        self.next = err.source();
        Some(err)
    }
}

/// The broad category of an error.
///
/// The attached string is informative only and should not be matched on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input cannot be understood at all, such as a packet without a status byte, a packet
    /// missing data bytes, or a parameter value outside of its range.
    Invalid(&'static str),

    /// The input could be understood, but does not comply with the MIDI standard.
    ///
    /// Only raised when the `strict` crate feature is enabled.
    Malformed(&'static str),
}
impl ErrorKind {
    /// Get the informative message describing what went wrong.
    #[inline]
    pub fn message(&self) -> &'static str {
        match *self {
            ErrorKind::Invalid(msg) | ErrorKind::Malformed(msg) => msg,
        }
    }
}
impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Invalid(msg) => write!(f, "rejected midi input: {}", msg),
            ErrorKind::Malformed(msg) => write!(f, "non-compliant midi message: {}", msg),
        }
    }
}

macro_rules! err_invalid {
    ($msg:expr) => {{
        const ERR_KIND: &'static ErrorKind = &ErrorKind::Invalid($msg);
        ERR_KIND
    }};
}
macro_rules! err_malformed {
    ($msg:expr) => {{
        const ERR_KIND: &'static ErrorKind = &ErrorKind::Malformed($msg);
        ERR_KIND
    }};
}

/// Attach a higher-level error to a failed lower-level step.
pub(crate) trait ResultExt<T> {
    fn context(self, ctx: &'static ErrorKind) -> StdResult<T, Error>;
}
impl<T> ResultExt<T> for StdResult<T, Error> {
    #[inline]
    fn context(self, ctx: &'static ErrorKind) -> StdResult<T, Error> {
        self.map_err(|err| err.caused(ctx))
    }
}
impl<T> ResultExt<T> for StdResult<T, &'static ErrorKind> {
    #[inline]
    fn context(self, ctx: &'static ErrorKind) -> StdResult<T, Error> {
        self.map_err(|kind| Error::new(kind).caused(ctx))
    }
}

/// The result type used by the checked entry points of the crate.
pub type Result<T> = StdResult<T, Error>;
pub(crate) use core::result::Result as StdResult;
