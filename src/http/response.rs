//! Response shaping for the relay endpoint.
//!
//! # Responsibilities
//! - Pass upstream status and JSON body back untouched
//! - Collapse every relay failure into one 500 payload
//!
//! # Design Decisions
//! - Callers cannot distinguish failure causes; the message is the only hint
//! - Upstream 4xx/5xx are not failures and are never replaced

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::upstream::RelayError;

/// `{"error": <message>, "status": "error"}`.
pub fn error_payload(err: &RelayError) -> Value {
    json!({
        "error": err.to_string(),
        "status": "error",
    })
}

/// JSON response with an explicit status.
pub fn json_response(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_payload_shape() {
        let err = RelayError::UpstreamConnect("tcp connect error: Connection refused".into());
        let payload = error_payload(&err);
        assert_eq!(payload["status"], "error");
        assert_eq!(
            payload["error"],
            "upstream connection failed: tcp connect error: Connection refused"
        );
        assert_eq!(payload.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_json_response_keeps_status() {
        let response = json_response(StatusCode::SERVICE_UNAVAILABLE, json!({"error": "loading"}));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
    }
}
