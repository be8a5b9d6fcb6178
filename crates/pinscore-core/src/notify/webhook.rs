use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::config::NotifyConfig;
use crate::error::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Publishes a status line to the outside world.
pub trait Notifier {
    fn publish(&self, status: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct StatusBody<'a> {
    status: &'a str,
}

/// Posts statuses as JSON to an HTTP endpoint with a bearer token.
///
/// Each status is sent once; a failed request is reported to the caller and
/// not retried.
pub struct WebhookNotifier {
    agent: ureq::Agent,
    endpoint: String,
    token: String,
    hashtag: String,
}

impl WebhookNotifier {
    pub fn new(config: &NotifyConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build();

        Self {
            agent: agent_config.into(),
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
            hashtag: config.hashtag.clone(),
        }
    }

    /// Final text as it is published
    pub fn status_text(&self, status: &str) -> String {
        let hashtag = self.hashtag.trim();
        if hashtag.is_empty() {
            status.to_string()
        } else {
            format!("{} {}", status, hashtag)
        }
    }
}

impl Notifier for WebhookNotifier {
    fn publish(&self, status: &str) -> Result<()> {
        let text = self.status_text(status);
        if text.trim().is_empty() {
            return Err(Error::Notify("empty status".to_string()));
        }

        let response = self
            .agent
            .post(&self.endpoint)
            .header("Authorization", &format!("Bearer {}", self.token))
            .send_json(&StatusBody { status: &text })
            .map_err(|e| Error::Notify(e.to_string()))?;

        debug!("Status posted (HTTP {})", response.status());
        Ok(())
    }
}
