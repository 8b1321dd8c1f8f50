use crate::source::Origin;
use std::sync::Arc;

/// Create and return a mapping [`Error`] from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::from_args(format_args!($($arg)*)))
    };
}

/// Create a mapping [`Error`] from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// An error that can occur while binding a metamodel or resolving a
/// result-set mapping.
#[derive(Clone)]
pub struct Error {
    inner: Arc<ErrorInner>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

#[derive(Debug)]
enum ErrorKind {
    /// The user's declarative mapping is inconsistent and must be fixed by
    /// the user. Carries the offending source's origin when known.
    Mapping {
        message: String,
        origin: Option<Origin>,
    },

    /// A discovered SQL alias appeared more than once in the JDBC result
    /// shape and the driver cannot disambiguate it.
    NonUniqueSqlAlias { alias: String },

    /// The mapping form is valid but not implemented. Distinct from
    /// `Mapping` so callers can tell "your mapping is wrong" from "this
    /// mapping style isn't supported yet".
    Unsupported { feature: String },

    /// Ad-hoc error created via the `err!` / `bail!` macros.
    Adhoc(String),

    /// Bridge for errors produced by other libraries.
    Anyhow(anyhow::Error),
}

impl Error {
    /// Creates a mapping error with no source origin.
    pub fn mapping(message: impl Into<String>) -> Self {
        ErrorKind::Mapping {
            message: message.into(),
            origin: None,
        }
        .into()
    }

    /// Creates a mapping error carrying the offending source's origin.
    pub fn mapping_at(message: impl Into<String>, origin: &Origin) -> Self {
        ErrorKind::Mapping {
            message: message.into(),
            origin: Some(origin.clone()),
        }
        .into()
    }

    pub fn non_unique_alias(alias: impl Into<String>) -> Self {
        ErrorKind::NonUniqueSqlAlias {
            alias: alias.into(),
        }
        .into()
    }

    pub fn unsupported(feature: impl Into<String>) -> Self {
        ErrorKind::Unsupported {
            feature: feature.into(),
        }
        .into()
    }

    #[doc(hidden)]
    pub fn from_args(args: std::fmt::Arguments<'_>) -> Self {
        ErrorKind::Adhoc(args.to_string()).into()
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Mapping { .. })
    }

    pub fn is_non_unique_alias(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::NonUniqueSqlAlias { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Unsupported { .. })
    }

    /// Adds context to this error. Context is displayed first, followed by
    /// the root cause.
    pub fn context(self, consequent: Error) -> Error {
        let mut inner = Arc::try_unwrap(consequent.inner)
            .unwrap_or_else(|arc| ErrorInner {
                kind: ErrorKind::Adhoc(format!("{}", DisplayKind(&arc.kind))),
                cause: arc.cause.clone(),
            });
        assert!(
            inner.cause.is_none(),
            "consequent error must not already have a cause"
        );
        inner.cause = Some(self);
        Error {
            inner: Arc::new(inner),
        }
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.cause.as_ref()?;
            Some(err)
        }))
    }
}

struct DisplayKind<'a>(&'a ErrorKind);

impl core::fmt::Display for DisplayKind<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self.0 {
            ErrorKind::Mapping { message, origin } => {
                write!(f, "invalid mapping: {message}")?;
                if let Some(origin) = origin {
                    write!(f, " ({origin})")?;
                }
                Ok(())
            }
            ErrorKind::NonUniqueSqlAlias { alias } => {
                write!(f, "encountered non-unique SQL alias `{alias}`")
            }
            ErrorKind::Unsupported { feature } => {
                write!(f, "not yet supported: {feature}")
            }
            ErrorKind::Adhoc(message) => f.write_str(message),
            ErrorKind::Anyhow(err) => core::fmt::Display::fmt(err, f),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(&DisplayKind(&err.inner.kind), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            f.debug_struct("Error")
                .field("kind", &self.inner.kind)
                .field("cause", &self.inner.cause)
                .finish()
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.inner.kind {
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Arc::new(ErrorInner { kind, cause: None }),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        ErrorKind::Anyhow(err).into()
    }
}
