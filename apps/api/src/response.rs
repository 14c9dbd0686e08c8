//! Success envelope.
//!
//! ```text
//! { "success": true, "data": ..., "message"?: "...", "count"?: n }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Envelope<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

/// A successful response wrapped in the envelope.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    envelope: Envelope<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn created(data: T) -> Self {
        Self::with_status(StatusCode::CREATED, data)
    }

    fn with_status(status: StatusCode, data: T) -> Self {
        ApiResponse {
            status,
            envelope: Envelope {
                success: true,
                message: None,
                count: None,
                data: Some(data),
            },
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.envelope.message = Some(message.into());
        self
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// A list with its length in `count`.
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        let mut response = Self::ok(items);
        response.envelope.count = Some(count);
        response
    }
}

impl ApiResponse<()> {
    /// A response carrying only a message.
    pub fn done(message: impl Into<String>) -> Self {
        ApiResponse {
            status: StatusCode::OK,
            envelope: Envelope {
                success: true,
                message: Some(message.into()),
                count: None,
                data: None,
            },
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}
