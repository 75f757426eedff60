//! One-shot dependency health probe.

use serde::Serialize;

use crate::clients::NamedClient;

/// Result of probing a dependent service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// 2xx response.
    Healthy { status: u16, body: String },
    /// The service answered with a non-success status.
    Unhealthy { status: u16, body: String },
    /// Transport failure, timeout, or unreadable body.
    Unreachable { message: String },
}

impl ProbeOutcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeOutcome::Healthy { .. })
    }

    /// Response body if the service answered, failure message otherwise.
    pub fn detail(&self) -> &str {
        match self {
            ProbeOutcome::Healthy { body, .. } | ProbeOutcome::Unhealthy { body, .. } => body,
            ProbeOutcome::Unreachable { message } => message,
        }
    }
}

/// Issue a single GET against `path` on the client's base address.
///
/// Bounded by the client's request timeout.
pub async fn probe_dependency(client: &NamedClient, path: &str) -> ProbeOutcome {
    let request = match client.get(path) {
        Ok(request) => request,
        Err(e) => {
            return ProbeOutcome::Unreachable {
                message: format!("invalid health path '{}': {}", path, e),
            }
        }
    };

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) if e.is_timeout() => {
            return ProbeOutcome::Unreachable {
                message: format!("health probe timed out: {}", e),
            }
        }
        Err(e) => {
            return ProbeOutcome::Unreachable {
                message: format!("health probe failed: {}", e),
            }
        }
    };

    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            return ProbeOutcome::Unreachable {
                message: format!("failed to read health response: {}", e),
            }
        }
    };

    if status.is_success() {
        ProbeOutcome::Healthy {
            status: status.as_u16(),
            body,
        }
    } else {
        ProbeOutcome::Unhealthy {
            status: status.as_u16(),
            body,
        }
    }
}
