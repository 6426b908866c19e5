use std::time::Duration;

use vigil_core::overlay::DismissTelemetry;

use crate::config::DEFAULT_REQUEST_TIMEOUT_MS;

/// Reports manual dismissals to the status server's dismissal log.
/// Strictly fire and forget: failures are logged at debug and swallowed,
/// and the UI never waits on the outcome.
#[derive(Clone)]
pub struct DismissReporter {
    client: reqwest::Client,
    endpoint: String,
}

impl DismissReporter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub async fn report(&self, site: &str, event: &DismissTelemetry) {
        let body = serde_json::json!({
            "site": site,
            "instancesWaiting": event.instances_waiting,
            "dismissType": event.kind.as_tag(),
        });
        match self.client.post(&self.endpoint).json(&body).send().await {
            Ok(resp) if !resp.status().is_success() => {
                tracing::debug!(status = %resp.status(), "dismissal log rejected the report");
            },
            Ok(_) => {},
            Err(e) => {
                tracing::debug!(error = %e, "could not log dismissal");
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::overlay::DismissKind;

    #[tokio::test]
    async fn report_swallows_unreachable_server() {
        let reporter = DismissReporter::new("http://127.0.0.1:1/api/dismiss-log");
        let event = DismissTelemetry {
            kind: DismissKind::Notification,
            instances_waiting: 1,
        };
        // Must return normally despite the connection error.
        reporter.report("youtube.com", &event).await;
    }
}
