//! Outbound third-party integrations.
//!
//! ```text
//! ┌──────────────┐   POST /v2/invoices          ┌──────────────────────┐
//! │ XenditClient │ ───────────────────────────► │ Xendit               │
//! └──────────────┘                              └──────────────────────┘
//! ┌────────────────┐ POST /{ver}/{pixel}/events ┌──────────────────────┐
//! │ FacebookClient │ ─────────────────────────► │ Conversions API      │
//! └────────────────┘                            └──────────────────────┘
//! ┌──────────────┐   subscribers + campaigns    ┌──────────────────────┐
//! │ SenderClient │ ───────────────────────────► │ Sender (email)       │
//! └──────────────┘                              └──────────────────────┘
//! ```
//!
//! Every client shares one `reqwest::Client`. An unconfigured integration
//! answers with `ApiError::NotConfigured` instead of calling out.

pub mod facebook;
pub mod sender;
pub mod xendit;

use std::time::Duration;

use serde_json::Value;

use crate::config::IntegrationsConfig;
use crate::error::{ApiError, ApiResult};

pub use facebook::FacebookClient;
pub use sender::SenderClient;
pub use xendit::XenditClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct Integrations {
    pub xendit: XenditClient,
    pub facebook: FacebookClient,
    pub sender: SenderClient,
}

impl Integrations {
    pub fn new(config: &IntegrationsConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Integrations {
            xendit: XenditClient::new(http.clone(), config.xendit.clone()),
            facebook: FacebookClient::new(http.clone(), config.facebook.clone()),
            sender: SenderClient::new(http, config.sender.clone()),
        })
    }
}

/// Reads a JSON body, turning transport errors and non-2xx statuses into
/// `ApiError::Upstream`.
pub(crate) async fn read_json(service: &'static str, result: reqwest::Result<reqwest::Response>) -> ApiResult<Value> {
    let response = result.map_err(|e| ApiError::Upstream {
        service,
        reason: e.to_string(),
    })?;

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        return Err(ApiError::Upstream {
            service,
            reason: format!("HTTP {status}: {body}"),
        });
    }

    Ok(body)
}
