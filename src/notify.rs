//! Outward-facing collaborator handles: the subscription/feature-flag
//! service and the notification-persistence service. Both are optional;
//! unconfigured deployments behave as "everything allowed, nothing
//! persisted", which is what the test harnesses use.

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::appresult::AppResult;
use crate::error::CoreError;

#[derive(Debug, Clone, Copy)]
pub enum Capability {
    Like,
    Message,
    Suggestions,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Like => "like",
            Capability::Message => "message",
            Capability::Suggestions => "suggestions",
        }
    }
}

/// Boolean capability checks against the subscription service.
#[derive(Clone)]
pub struct FeatureGate {
    http: reqwest::Client,
    url: Option<String>,
}

impl FeatureGate {
    pub fn new(url: Option<String>) -> Self {
        Self { http: reqwest::Client::new(), url }
    }

    /// A gate with no backing service; every capability is allowed.
    pub fn open() -> Self {
        Self::new(None)
    }

    pub async fn allows(&self, user: Uuid, capability: Capability) -> AppResult<bool> {
        let Some(url) = &self.url else {
            return Ok(true);
        };

        let body: serde_json::Value = self
            .http
            .get(format!("{url}/{user}/{}", capability.as_str()))
            .send()
            .await?
            .json()
            .await?;

        Ok(body.get("allowed").and_then(|v| v.as_bool()).unwrap_or(false))
    }

    /// `allows` turned into a hard gate.
    pub async fn require(&self, user: Uuid, capability: Capability) -> AppResult<()> {
        if self.allows(user, capability).await? {
            Ok(())
        } else {
            Err(CoreError::FeatureGated(capability.as_str()).into())
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewLike,
    NewMatch,
    NewMessage,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub body: String,
}

/// Write-only notification persistence. `record` is fire-and-forget:
/// the POST runs on its own task and a failure is logged, never
/// surfaced to the caller.
#[derive(Clone)]
pub struct NotificationSink {
    http: reqwest::Client,
    url: Option<String>,
}

impl NotificationSink {
    pub fn new(url: Option<String>) -> Self {
        Self { http: reqwest::Client::new(), url }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn record(&self, notification: Notification) {
        let Some(url) = self.url.clone() else {
            return;
        };
        let http = self.http.clone();

        tokio::spawn(async move {
            if let Err(e) = http.post(&url).json(&notification).send().await {
                warn!(user = %notification.user_id, "notification persistence failed: {e}");
            }
        });
    }
}
