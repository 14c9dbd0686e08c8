//! Password-reset email through the Sender campaign API.
//!
//! ```text
//! add subscriber (group) ──► create campaign ──► send campaign
//!                                                     │
//!                              after cleanup_after_secs ▼
//!                                    delete campaign + subscriber
//! ```

use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::SenderConfig;
use crate::error::{ApiError, ApiResult};

use super::read_json;

/// Recipient of a reset email.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Clone)]
pub struct SenderClient {
    http: reqwest::Client,
    config: SenderConfig,
}

impl SenderClient {
    pub fn new(http: reqwest::Client, config: SenderConfig) -> Self {
        SenderClient { http, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_token.as_deref().is_some_and(|token| !token.is_empty())
    }

    fn token(&self) -> ApiResult<&str> {
        self.config
            .api_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::NotConfigured("Sender"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Emails a password-reset code and schedules removal of the one-off
    /// campaign and subscriber.
    pub async fn send_reset_code(&self, recipient: &Recipient, code: &str) -> ApiResult<()> {
        let token = self.token()?;

        let subscribed = read_json(
            "Sender",
            self.http
                .post(self.url("subscribers"))
                .bearer_auth(token)
                .json(&json!({
                    "email": recipient.email,
                    "firstname": recipient.first_name,
                    "lastname": recipient.last_name,
                    "groups": [self.config.group_id],
                    "trigger_automation": false,
                }))
                .send()
                .await,
        )
        .await?;
        ensure_success(&subscribed, "add subscriber")?;

        let campaign = read_json(
            "Sender",
            self.http
                .post(self.url("campaigns"))
                .bearer_auth(token)
                .json(&self.campaign_body(code))
                .send()
                .await,
        )
        .await?;
        ensure_success(&campaign, "create campaign")?;

        let campaign_id = campaign["data"]["id"]
            .as_str()
            .map(String::from)
            .or_else(|| campaign["data"]["id"].as_i64().map(|id| id.to_string()))
            .ok_or_else(|| ApiError::Upstream {
                service: "Sender",
                reason: "campaign response has no id".to_string(),
            })?;

        let sent = read_json(
            "Sender",
            self.http
                .post(self.url(&format!("campaigns/{campaign_id}/send")))
                .bearer_auth(token)
                .send()
                .await,
        )
        .await?;
        ensure_success(&sent, "send campaign")?;

        info!(campaign_id = %campaign_id, "Password reset email sent");
        self.schedule_cleanup(campaign_id, recipient.email.clone());
        Ok(())
    }

    fn campaign_body(&self, code: &str) -> Value {
        json!({
            "title": "Password Reset Code",
            "subject": "Your Password Reset Code",
            "from": self.config.from_name,
            "reply_to": self.config.reply_to,
            "preheader": "This contains the Password Reset Code for your Forgot Password request",
            "content_type": "text",
            "groups": [self.config.group_id],
            "content": format!("<p>Your password reset code is: <b>{code}</b></p>"),
        })
    }

    fn schedule_cleanup(&self, campaign_id: String, email: String) {
        let client = self.clone();
        let delay = Duration::from_secs(self.config.cleanup_after_secs);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = client.cleanup(&campaign_id, &email).await {
                warn!(campaign_id = %campaign_id, error = %e, "Failed to clean up reset campaign");
            }
        });
    }

    async fn cleanup(&self, campaign_id: &str, email: &str) -> ApiResult<()> {
        let token = self.token()?;

        read_json(
            "Sender",
            self.http
                .delete(self.url("campaigns"))
                .query(&[("ids", format!("[{campaign_id}]"))])
                .bearer_auth(token)
                .send()
                .await,
        )
        .await?;

        read_json(
            "Sender",
            self.http
                .delete(self.url("subscribers"))
                .bearer_auth(token)
                .json(&json!({ "subscribers": [email] }))
                .send()
                .await,
        )
        .await?;

        debug!(campaign_id = %campaign_id, "Reset campaign cleaned up");
        Ok(())
    }
}

fn ensure_success(body: &Value, step: &str) -> ApiResult<()> {
    if body["success"].as_bool().unwrap_or(false) {
        Ok(())
    } else {
        Err(ApiError::Upstream {
            service: "Sender",
            reason: format!("{step} was not accepted: {body}"),
        })
    }
}
