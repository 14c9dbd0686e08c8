//! Facebook Conversions API events.
//!
//! Personal fields are normalised (trimmed, lowercased) and SHA-256 hashed
//! before they leave the server; browser identifiers (`fbc`, `fbp`, user
//! agent, IP) are sent as-is.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::FacebookConfig;
use crate::error::{ApiError, ApiResult};

use super::read_json;

/// Customer data attached to an event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventUserData {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    #[serde(rename = "externalID")]
    pub external_id: Option<String>,
    pub user_agent: Option<String>,
    pub fbc: Option<String>,
    pub fbp: Option<String>,
    pub ip: Option<String>,
    /// Purchase events only.
    pub currency: Option<String>,
    /// Purchase events only.
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseEvent {
    #[serde(rename = "eventID")]
    pub event_id: Option<String>,
    pub event_source_url: Option<String>,
    #[serde(default)]
    pub user_data: EventUserData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomEvent {
    pub event_id: Option<String>,
    pub event_name: String,
    pub event_source_url: Option<String>,
    #[serde(default)]
    pub user_data: EventUserData,
    #[serde(default)]
    pub custom_data: Option<Value>,
}

pub fn sha256_hex(value: &str) -> String {
    hex::encode(Sha256::digest(value.trim().to_lowercase().as_bytes()))
}

/// Builds the `user_data` object of an event.
pub fn hash_user_data(data: &EventUserData) -> Map<String, Value> {
    let mut out = Map::new();

    let hashed = [
        ("em", &data.email),
        ("ph", &data.phone),
        ("fn", &data.first_name),
        ("ln", &data.last_name),
        ("zp", &data.zipcode),
        ("country", &data.country),
        ("ct", &data.city),
        ("external_id", &data.external_id),
    ];
    for (key, value) in hashed {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            out.insert(key.to_string(), Value::String(sha256_hex(value)));
        }
    }

    let plain = [
        ("client_user_agent", &data.user_agent),
        ("fbc", &data.fbc),
        ("fbp", &data.fbp),
        ("client_ip_address", &data.ip),
    ];
    for (key, value) in plain {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            out.insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    out
}

#[derive(Clone)]
pub struct FacebookClient {
    http: reqwest::Client,
    config: FacebookConfig,
}

impl FacebookClient {
    pub fn new(http: reqwest::Client, config: FacebookConfig) -> Self {
        FacebookClient { http, config }
    }

    pub async fn send_purchase(&self, event: &PurchaseEvent) -> ApiResult<Value> {
        let body = purchase_event(event, &self.config.default_event_source_url, Utc::now().timestamp());
        self.send(body).await
    }

    pub async fn send_event(&self, event: &CustomEvent) -> ApiResult<Value> {
        let body = custom_event(event, &self.config.default_event_source_url, Utc::now().timestamp());
        self.send(body).await
    }

    async fn send(&self, event: Value) -> ApiResult<Value> {
        let (Some(pixel_id), Some(access_token)) = (&self.config.pixel_id, &self.config.access_token) else {
            return Err(ApiError::NotConfigured("Facebook"));
        };

        let url = format!(
            "{}/{}/{}/events",
            self.config.base_url.trim_end_matches('/'),
            self.config.graph_api_version,
            pixel_id
        );
        debug!(event_name = %event["event_name"], "Sending conversion event");

        read_json(
            "Facebook",
            self.http
                .post(url)
                .query(&[("access_token", access_token)])
                .json(&json!({ "data": [event] }))
                .send()
                .await,
        )
        .await
    }
}

fn purchase_event(event: &PurchaseEvent, default_url: &str, event_time: i64) -> Value {
    json!({
        "event_name": "Purchase",
        "event_time": event_time,
        "event_source_url": event.event_source_url.as_deref().unwrap_or(default_url),
        "action_source": "website",
        "event_id": event.event_id,
        "user_data": hash_user_data(&event.user_data),
        "custom_data": {
            "content_name": "Ingreventory",
            "content_type": "product",
            "currency": event.user_data.currency.as_deref().unwrap_or("PHP"),
            "value": event.user_data.value.unwrap_or(0.0),
        },
    })
}

fn custom_event(event: &CustomEvent, default_url: &str, event_time: i64) -> Value {
    json!({
        "event_name": event.event_name,
        "event_time": event_time,
        "event_source_url": event.event_source_url.as_deref().unwrap_or(default_url),
        "action_source": "website",
        "event_id": event.event_id,
        "user_data": hash_user_data(&event.user_data),
        "custom_data": event.custom_data.clone().unwrap_or_else(|| json!({})),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personal_fields_are_hashed() {
        let data = EventUserData {
            email: Some(" Rina@Mail.test ".to_string()),
            first_name: Some("Rina".to_string()),
            fbp: Some("fb.1.123".to_string()),
            ip: Some("10.0.0.1".to_string()),
            ..EventUserData::default()
        };

        let out = hash_user_data(&data);

        assert_eq!(out["em"], sha256_hex("rina@mail.test"));
        assert_eq!(out["em"].as_str().unwrap().len(), 64);
        assert_eq!(out["fbp"], "fb.1.123");
        assert_eq!(out["client_ip_address"], "10.0.0.1");
        assert!(!out.contains_key("ph"));
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_purchase_event_defaults() {
        let event: PurchaseEvent = serde_json::from_value(json!({
            "eventID": "evt-1",
            "userData": { "email": "a@b.test", "value": 12.5 }
        }))
        .unwrap();

        let body = purchase_event(&event, "https://ingreventory.com", 1_700_000_000);

        assert_eq!(body["event_name"], "Purchase");
        assert_eq!(body["event_id"], "evt-1");
        assert_eq!(body["event_source_url"], "https://ingreventory.com");
        assert_eq!(body["custom_data"]["currency"], "PHP");
        assert_eq!(body["custom_data"]["value"], 12.5);
    }

    #[test]
    fn test_custom_event_passes_custom_data() {
        let event: CustomEvent = serde_json::from_value(json!({
            "event_name": "AddToCart",
            "user_data": { "phone": "0812" },
            "custom_data": { "value": 3 }
        }))
        .unwrap();

        let body = custom_event(&event, "https://ingreventory.com", 1);

        assert_eq!(body["event_name"], "AddToCart");
        assert_eq!(body["custom_data"]["value"], 3);
        assert!(body["user_data"]["ph"].is_string());
    }

    #[tokio::test]
    async fn test_unconfigured_pixel() {
        let client = FacebookClient::new(reqwest::Client::new(), FacebookConfig::default());
        let event: PurchaseEvent = serde_json::from_value(json!({})).unwrap();

        assert!(matches!(
            client.send_purchase(&event).await,
            Err(ApiError::NotConfigured("Facebook"))
        ));
    }
}
