use anyhow::anyhow;
use uuid::Uuid;

use crate::appresult::AppResult;
use crate::error::CoreError;

/// Exchanges a bearer token for a verified user id at the identity
/// service. Credential issuance lives entirely on that side; this core
/// only ever asks "who is this token".
#[derive(Clone)]
pub struct CredentialVerifier {
    http: reqwest::Client,
    url: String,
}

impl CredentialVerifier {
    pub fn new(url: String) -> Self {
        Self { http: reqwest::Client::new(), url }
    }

    pub async fn verify(&self, token: &str) -> AppResult<Uuid> {
        if token.is_empty() {
            return Err(CoreError::Unauthorized.into());
        }

        let response = self
            .http
            .post(&self.url)
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(CoreError::Unauthorized.into());
        }

        let body: serde_json::Value = response.json().await?;
        let user_id = body
            .get("user_id")
            .and_then(|v| v.as_str())
            .ok_or(anyhow!("identity service response missing user_id"))?;

        Uuid::parse_str(user_id)
            .map_err(|_| CoreError::InvalidIdentifier(user_id.to_string()).into())
    }
}
