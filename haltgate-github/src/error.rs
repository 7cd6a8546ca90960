//! Error types for haltgate-github.

use thiserror::Error;

/// All errors that can arise from code-host API calls.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The API answered with a non-success HTTP status.
    #[error("GitHub API returned {status} for {method} {url}: {message}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        message: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("transport error for {method} {url}: {message}")]
    Transport {
        method: &'static str,
        url: String,
        message: String,
    },

    /// The response body could not be read or decoded.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

impl GitHubError {
    /// Whether the API reported the requested resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitHubError::Status { status: 404, .. })
    }

    pub(crate) fn from_ureq(method: &'static str, url: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let body = response.into_string().unwrap_or_default();
                GitHubError::Status {
                    method,
                    url: url.to_string(),
                    status,
                    message: api_message(&body).unwrap_or_else(|| format!("HTTP {status}")),
                }
            }
            ureq::Error::Transport(transport) => GitHubError::Transport {
                method,
                url: url.to_string(),
                message: transport.to_string(),
            },
        }
    }
}

/// Extracts `message` from a GitHub error payload.
fn api_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_owned)
}
