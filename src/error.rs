use std::fmt;

/// An error that can occur during template compilation.
///
/// Both error kinds are static failures: they abort the entire compile call
/// and produce no partial output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
}

/// The kind of compilation error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A private-data reference used an ancestor or explicitly scoped path.
    /// The private-data channel is limited to the immediate scope.
    ScopedData {
        /// The offending source text.
        original: String,
    },

    /// A bare name was used in helper position while `known_helpers_only`
    /// is active and the name is absent from the known-helpers table.
    UnknownHelper {
        /// The offending helper name.
        name: String,
    },
}

impl Error {
    pub(crate) fn scoped_data(original: &str) -> Self {
        Self {
            kind: ErrorKind::ScopedData {
                original: original.to_string(),
            },
        }
    }

    pub(crate) fn unknown_helper(name: &str) -> Self {
        Self {
            kind: ErrorKind::UnknownHelper {
                name: name.to_string(),
            },
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::ScopedData { original } => {
                write!(f, "scoped data references are not supported: {original}")
            }
            ErrorKind::UnknownHelper { name } => {
                write!(
                    f,
                    "`known_helpers_only` is set, but `{name}` is not a known helper"
                )
            }
        }
    }
}
