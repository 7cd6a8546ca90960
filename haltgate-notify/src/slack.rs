//! Slack incoming-webhook sink.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use haltgate_core::{Settings, VerdictKind};

use crate::error::NotifyError;
use crate::sink::NotificationSink;

const USER_AGENT: &str = concat!("haltgate/", env!("CARGO_PKG_VERSION"));
const DEFAULT_CHANNEL_LABEL: &str = "(webhook default)";

#[derive(Debug, Serialize)]
struct Payload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<&'a str>,
    attachments: [Attachment<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Attachment<'a> {
    color: &'static str,
    text: &'a str,
    fallback: &'a str,
}

fn color_for(severity: VerdictKind) -> &'static str {
    match severity {
        VerdictKind::Halt => "danger",
        VerdictKind::Unhalt => "good",
    }
}

/// Posts announcements to a Slack incoming webhook, once per channel.
pub struct SlackWebhook {
    agent: ureq::Agent,
    url: String,
    channels: Vec<String>,
}

impl SlackWebhook {
    pub fn new(url: impl Into<String>, channels: Vec<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            url: url.into(),
            channels,
        }
    }

    /// `None` when no webhook is configured.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        let url = settings.notification_webhook.as_ref()?;
        Some(Self::new(
            url.clone(),
            settings.notification_channels.clone(),
            settings.request_timeout,
        ))
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    fn post(&self, channel: Option<&str>, text: &str, severity: VerdictKind) -> Result<(), NotifyError> {
        let label = channel.unwrap_or(DEFAULT_CHANNEL_LABEL).to_string();
        let payload = Payload {
            channel,
            attachments: [Attachment {
                color: color_for(severity),
                text,
                fallback: text,
            }],
        };
        debug!(channel = %label, "posting notification");
        match self.agent.post(&self.url).send_json(&payload) {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, response)) => Err(NotifyError::Status {
                channel: label,
                status,
                message: response.into_string().unwrap_or_default().trim().to_string(),
            }),
            Err(ureq::Error::Transport(transport)) => Err(NotifyError::Transport {
                channel: label,
                message: transport.to_string(),
            }),
        }
    }
}

impl NotificationSink for SlackWebhook {
    /// Tries every channel; the first failure is returned after all attempts.
    fn send(&self, text: &str, severity: VerdictKind) -> Result<(), NotifyError> {
        if self.channels.is_empty() {
            return self.post(None, text, severity);
        }
        let mut first_err = None;
        for channel in &self.channels {
            if let Err(err) = self.post(Some(channel), text, severity) {
                warn!(error = %err, "notification delivery failed");
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for SlackWebhook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackWebhook")
            .field("url", &"[REDACTED]")
            .field("channels", &self.channels)
            .finish()
    }
}
