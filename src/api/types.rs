// API data types
// The JSON documents returned by the status service

use hyper::StatusCode;
use serde::Serialize;
use std::collections::BTreeMap;

use super::error::DispatchFault;
use super::request::QueryParams;
use crate::config::FrameworkInfo;

/// Top-level `status` field
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Error,
}

/// One response document, built once per request
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    /// HTTP status code, sent on the status line rather than in the body
    #[serde(skip)]
    pub code: StatusCode,
    pub status: Outcome,
    pub message: String,
    pub framework: FrameworkInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Route-dependent payload
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResponseData {
    Status(StatusData),
    NotFound(NotFoundData),
}

/// Payload of the root status endpoint
#[derive(Debug, Serialize)]
pub struct StatusData {
    pub method: String,
    pub path: String,
    pub query: QueryParams,
    pub rust_version: &'static str,
    pub time: String,
}

/// Payload of the not-found fallback
#[derive(Debug, Serialize)]
pub struct NotFoundData {
    pub method: String,
    pub path: String,
    pub available_endpoints: BTreeMap<&'static str, &'static str>,
}

impl ApiResponse {
    pub fn success(framework: FrameworkInfo, message: String, data: StatusData) -> Self {
        Self {
            code: StatusCode::OK,
            status: Outcome::Success,
            message,
            framework,
            data: Some(ResponseData::Status(data)),
            error: None,
        }
    }

    pub fn not_found(framework: FrameworkInfo, data: NotFoundData) -> Self {
        Self {
            code: StatusCode::NOT_FOUND,
            status: Outcome::Error,
            message: "Endpoint not found".to_string(),
            framework,
            data: Some(ResponseData::NotFound(data)),
            error: None,
        }
    }

    /// The 500 envelope: no `data`, only the fault text
    pub fn internal_error(framework: FrameworkInfo, fault: &DispatchFault) -> Self {
        Self {
            code: StatusCode::INTERNAL_SERVER_ERROR,
            status: Outcome::Error,
            message: "Internal server error".to_string(),
            framework,
            data: None,
            error: Some(fault.description()),
        }
    }
}
