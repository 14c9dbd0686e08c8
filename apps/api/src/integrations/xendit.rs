//! Xendit invoice creation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::config::XenditConfig;
use crate::error::{ApiError, ApiResult};

use super::read_json;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCustomer {
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    pub order_id: String,
    pub amount_cents: i64,
    pub customer: InvoiceCustomer,
    /// Per-store key from the payment settings; falls back to the
    /// configured key.
    #[serde(default)]
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Option<String>,
    pub invoice_url: String,
}

#[derive(Clone)]
pub struct XenditClient {
    http: reqwest::Client,
    config: XenditConfig,
}

impl XenditClient {
    pub fn new(http: reqwest::Client, config: XenditConfig) -> Self {
        XenditClient { http, config }
    }

    pub async fn create_invoice(&self, request: &InvoiceRequest) -> ApiResult<Invoice> {
        let secret_key = request
            .secret_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .or(self.config.secret_key.as_deref())
            .ok_or(ApiError::NotConfigured("Xendit"))?;

        let body = invoice_body(request, &self.config.frontend_url, Utc::now().timestamp_millis());
        let url = format!("{}/v2/invoices", self.config.base_url.trim_end_matches('/'));

        let response = read_json(
            "Xendit",
            self.http
                .post(url)
                .basic_auth(secret_key, Some(""))
                .json(&body)
                .send()
                .await,
        )
        .await?;

        let invoice_url = response
            .get("invoice_url")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Upstream {
                service: "Xendit",
                reason: "response has no invoice_url".to_string(),
            })?
            .to_string();

        info!(order_id = %request.order_id, "Created payment invoice");

        Ok(Invoice {
            id: response.get("id").and_then(Value::as_str).map(String::from),
            invoice_url,
        })
    }
}

fn invoice_body(request: &InvoiceRequest, frontend_url: &str, now_millis: i64) -> Value {
    let frontend_url = frontend_url.trim_end_matches('/');
    let order_id = &request.order_id;

    json!({
        "external_id": format!("order-{order_id}-{now_millis}"),
        "amount": request.amount_cents as f64 / 100.0,
        "payer_email": request.customer.email,
        "description": format!("Payment for Order #{order_id}"),
        "customer": {
            "given_names": request.customer.name,
            "email": request.customer.email,
        },
        "success_redirect_url": format!("{frontend_url}/payment-success?orderId={order_id}"),
        "failure_redirect_url": format!("{frontend_url}/payment-failed?orderId={order_id}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_body() {
        let request = InvoiceRequest {
            order_id: "ord-7".to_string(),
            amount_cents: 125_050,
            customer: InvoiceCustomer {
                name: Some("Rina".to_string()),
                email: "rina@mail.test".to_string(),
            },
            secret_key: None,
        };

        let body = invoice_body(&request, "https://shop.test/", 1_700_000_000_000);

        assert_eq!(body["external_id"], "order-ord-7-1700000000000");
        assert_eq!(body["amount"], 1250.5);
        assert_eq!(body["payer_email"], "rina@mail.test");
        assert_eq!(body["success_redirect_url"], "https://shop.test/payment-success?orderId=ord-7");
        assert_eq!(body["customer"]["given_names"], "Rina");
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let client = XenditClient::new(reqwest::Client::new(), XenditConfig::default());
        let request = InvoiceRequest {
            order_id: "ord-1".to_string(),
            amount_cents: 100,
            customer: InvoiceCustomer {
                name: None,
                email: "a@b.test".to_string(),
            },
            secret_key: Some(String::new()),
        };

        let err = client.create_invoice(&request).await.unwrap_err();
        assert!(matches!(err, ApiError::NotConfigured("Xendit")));
    }
}
