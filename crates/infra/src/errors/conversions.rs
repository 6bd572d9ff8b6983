//! Conversions from external infrastructure errors into domain errors.

use std::time::Duration;

use adoptly_domain::FetchError;
use reqwest::Error as HttpError;

/// Map an infrastructure error onto the [`FetchError`] taxonomy
///
/// `timeout` is the client timeout, reported back by
/// [`FetchError::Timeout`].
pub trait IntoFetchError {
    fn into_fetch_error(self, timeout: Duration) -> FetchError;
}

impl IntoFetchError for HttpError {
    fn into_fetch_error(self, timeout: Duration) -> FetchError {
        if self.is_timeout() {
            return FetchError::Timeout(timeout);
        }

        if self.is_builder() {
            return FetchError::Config(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() {
            return FetchError::Decode(self.to_string());
        }

        if let Some(status) = self.status() {
            return FetchError::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown status").to_owned(),
            };
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return FetchError::Transport(format!("HTTP connection failure: {self}"));
        }

        FetchError::Transport(format!("HTTP transport error: {self}"))
    }
}
