use serde::de::DeserializeOwned;
use tracing::error;

use llmbridge_core::{Error, Result};

/// Turn a sent request into a decoded body, mapping every failure to
/// [`Error::Upstream`] for `backend`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    backend: &str,
    sent: std::result::Result<reqwest::Response, reqwest::Error>,
) -> Result<T> {
    let response = sent.map_err(|e| {
        error!(backend, error = %e, "HTTP request failed");
        Error::upstream(backend, format!("request failed: {e}"))
    })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::upstream(backend, format!("failed to read response body: {e}")))?;

    if !status.is_success() {
        error!(backend, status = %status, body = %body, "API error");
        return Err(Error::upstream(backend, format!("HTTP {status}: {body}")));
    }

    serde_json::from_str(&body).map_err(|e| {
        error!(backend, error = %e, "failed to parse response");
        Error::upstream(backend, format!("malformed response body: {e}"))
    })
}

/// Join a server root with a path, tolerating a trailing slash on the root.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
