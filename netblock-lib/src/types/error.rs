use std::hash::Hash;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Possible Errors when interacting with `netblock_lib`
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Any form of I/O error occurred while reading from a given path.
    #[error("Failed to read from path: `{}`, reason: {1}", match .0 {
        Some(p) => p.to_str().unwrap_or("<MALFORMED PATH>"),
        None => "<MALFORMED PATH>",
    })]
    IoError(Option<PathBuf>, std::io::Error),
    /// Reqwest network error
    #[error("Network error while trying to fetch a source via reqwest: {0}")]
    ReqwestError(#[from] reqwest::Error),
    /// A source answered with a status code outside the success range
    #[error("Rejected status code ({0})")]
    RejectedStatusCode(http::StatusCode),
    /// Every fetch attempt for a source was used up without a success
    #[error("Source gave no response after {1} attempts: {0}")]
    RetriesExhausted(Url, u64),
    /// The given header could not be parsed.
    /// A possible error when converting a `HeaderValue` from a string or byte
    /// slice.
    #[error("Header could not be parsed.")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
    /// The given string can not be parsed into a valid source URL
    #[error("Cannot parse `{0}` as a source URL: {1}")]
    InvalidSourceUrl(String, url::ParseError),
}

impl ErrorKind {
    /// Return the status code a remote answered with, if this error
    /// originated from one.
    #[must_use]
    pub fn status_code(&self) -> Option<http::StatusCode> {
        match self {
            Self::RejectedStatusCode(code) => Some(*code),
            Self::ReqwestError(e) => e.status(),
            _ => None,
        }
    }
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::IoError(p1, e1), Self::IoError(p2, e2)) => p1 == p2 && e1.kind() == e2.kind(),
            (Self::ReqwestError(e1), Self::ReqwestError(e2)) => e1.to_string() == e2.to_string(),
            (Self::RejectedStatusCode(c1), Self::RejectedStatusCode(c2)) => c1 == c2,
            (Self::RetriesExhausted(u1, a1), Self::RetriesExhausted(u2, a2)) => {
                u1 == u2 && a1 == a2
            }
            (Self::InvalidHeader(_), Self::InvalidHeader(_)) => true,
            (Self::InvalidSourceUrl(s1, e1), Self::InvalidSourceUrl(s2, e2)) => {
                s1 == s2 && e1 == e2
            }
            _ => false,
        }
    }
}

impl Eq for ErrorKind {}

impl Hash for ErrorKind {
    fn hash<H>(&self, state: &mut H)
    where
        H: std::hash::Hasher,
    {
        match self {
            Self::IoError(p, e) => (p, e.kind()).hash(state),
            Self::ReqwestError(e) => e.to_string().hash(state),
            Self::RejectedStatusCode(c) => c.hash(state),
            Self::RetriesExhausted(u, a) => (u, a).hash(state),
            Self::InvalidHeader(e) => e.to_string().hash(state),
            Self::InvalidSourceUrl(s, e) => (s, e.to_string()).hash(state),
        }
    }
}

impl From<(PathBuf, std::io::Error)> for ErrorKind {
    fn from(value: (PathBuf, std::io::Error)) -> Self {
        Self::IoError(Some(value.0), value.1)
    }
}

impl From<std::io::Error> for ErrorKind {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(None, e)
    }
}

impl From<(String, url::ParseError)> for ErrorKind {
    fn from(value: (String, url::ParseError)) -> Self {
        Self::InvalidSourceUrl(value.0, value.1)
    }
}
