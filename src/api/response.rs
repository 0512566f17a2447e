// API response utility functions module

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE, SERVER};
use hyper::{Response, StatusCode};

use super::error::DispatchFault;
use super::types::ApiResponse;
use crate::config::FrameworkInfo;
use crate::logger;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Serialize an API response into an HTTP response
pub fn json_response(
    body: &ApiResponse,
    server_name: &str,
) -> Result<Response<Full<Bytes>>, DispatchFault> {
    let json = serde_json::to_vec(body)?;
    Ok(build(body.code, Bytes::from(json), server_name))
}

/// Build the 500 envelope for a fault
///
/// Falls back to a fixed document of the same shape if the envelope itself
/// cannot be serialized.
pub fn error_envelope(
    framework: &FrameworkInfo,
    fault: &DispatchFault,
    server_name: &str,
) -> Response<Full<Bytes>> {
    let envelope = ApiResponse::internal_error(framework.clone(), fault);
    json_response(&envelope, server_name).unwrap_or_else(|e| {
        logger::log_error(&format!("Failed to serialize error envelope: {e}"));
        build(
            StatusCode::INTERNAL_SERVER_ERROR,
            Bytes::from(fallback_envelope(framework)),
            server_name,
        )
    })
}

/// Hand-assembled envelope that needs no serializer
///
/// A JSON string's `Display` output is its quoted, escaped literal.
fn fallback_envelope(framework: &FrameworkInfo) -> String {
    let name = serde_json::Value::String(framework.name.clone());
    let version = serde_json::Value::String(framework.version.clone());
    format!(
        r#"{{"status":"error","message":"Internal server error","framework":{{"name":{name},"version":{version}}},"error":"failed to serialize error response"}}"#
    )
}

fn build(status: StatusCode, body: Bytes, server_name: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .header(SERVER, server_name)
        .body(Full::new(body.clone()))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build {status} response: {e}"));
            let mut resp = Response::new(Full::new(body));
            *resp.status_mut() = status;
            resp.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
            resp
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn framework(name: &str, version: &str) -> FrameworkInfo {
        FrameworkInfo {
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    #[test]
    fn test_fallback_envelope_carries_framework() {
        let body = fallback_envelope(&framework("Hyper \"edge\"", "1"));
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "error",
                "message": "Internal server error",
                "framework": {"name": "Hyper \"edge\"", "version": "1"},
                "error": "failed to serialize error response"
            })
        );
    }

    #[test]
    fn test_error_envelope_headers_and_body() {
        let fault = DispatchFault::Panic("boom".to_string());
        let resp = error_envelope(&framework("Hyper", "1"), &fault, "status-api/test");

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.headers().get(CONTENT_TYPE).unwrap(), JSON_CONTENT_TYPE);
        assert_eq!(resp.headers().get(SERVER).unwrap(), "status-api/test");
    }
}
