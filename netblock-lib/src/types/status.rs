use std::fmt::Display;

use crate::ErrorKind;

const ICON_OK: &str = "✔";
const ICON_FAILED: &str = "✗";

/// Terminal outcome of fetching a single source.
///
/// Per-attempt errors are not represented here; they are consumed by the
/// retry loop. A source either delivered a body within its attempt budget
/// or it did not.
#[derive(Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// The source delivered a body
    Ok,
    /// The retry budget ran out without a usable response
    Failed(ErrorKind),
}

impl Status {
    /// Returns `true` if the fetch delivered a body
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Status::Ok)
    }

    /// Return the underlying error, if the fetch failed
    #[must_use]
    pub const fn error(&self) -> Option<&ErrorKind> {
        match self {
            Status::Ok => None,
            Status::Failed(e) => Some(e),
        }
    }

    /// Return a unicode icon to visualize the status
    #[must_use]
    pub const fn icon(&self) -> &str {
        match self {
            Status::Ok => ICON_OK,
            Status::Failed(_) => ICON_FAILED,
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Ok => f.write_str("OK"),
            Status::Failed(e) => write!(f, "{e}"),
        }
    }
}

impl From<ErrorKind> for Status {
    fn from(e: ErrorKind) -> Self {
        Self::Failed(e)
    }
}
