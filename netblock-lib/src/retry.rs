use http::StatusCode;

use crate::ErrorKind;

/// An extension trait to help decide how a failed fetch attempt should be
/// retried.
///
/// A rate-limit signal (HTTP 429) gets an exponentially growing pause
/// before the next attempt; every other failure is retried immediately.
pub(crate) trait RetryExt {
    /// `true` if the remote asked us to slow down
    fn is_rate_limited(&self) -> bool;
}

impl RetryExt for StatusCode {
    fn is_rate_limited(&self) -> bool {
        *self == StatusCode::TOO_MANY_REQUESTS
    }
}

impl RetryExt for reqwest::Error {
    fn is_rate_limited(&self) -> bool {
        self.status().is_some_and(|code| code.is_rate_limited())
    }
}

impl RetryExt for ErrorKind {
    fn is_rate_limited(&self) -> bool {
        match self {
            ErrorKind::RejectedStatusCode(code) => code.is_rate_limited(),
            ErrorKind::ReqwestError(e) => e.is_rate_limited(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::RetryExt;
    use crate::ErrorKind;

    #[test]
    fn test_rate_limited_status_code() {
        assert!(StatusCode::TOO_MANY_REQUESTS.is_rate_limited());
        assert!(!StatusCode::REQUEST_TIMEOUT.is_rate_limited());
        assert!(!StatusCode::INTERNAL_SERVER_ERROR.is_rate_limited());
        assert!(!StatusCode::OK.is_rate_limited());
    }

    #[test]
    fn test_rate_limited_error_kind() {
        assert!(ErrorKind::RejectedStatusCode(StatusCode::TOO_MANY_REQUESTS).is_rate_limited());
        assert!(!ErrorKind::RejectedStatusCode(StatusCode::NOT_FOUND).is_rate_limited());
    }
}
