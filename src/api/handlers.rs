// Route handlers
// Root status endpoint and the not-found fallback

use chrono::Local;
use std::collections::BTreeMap;

use super::error::DispatchFault;
use super::router::RequestContext;
use super::types::{ApiResponse, NotFoundData, StatusData};

/// Compiler version the binary was built with
pub const RUST_VERSION: &str = env!("STATUS_API_RUSTC_VERSION");

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Endpoints advertised by the not-found response
const AVAILABLE_ENDPOINTS: &[(&str, &str)] = &[("GET /", "Main API status endpoint")];

/// `/`: echo the request back together with runtime details
#[allow(clippy::unnecessary_wraps)]
pub fn status(ctx: &RequestContext<'_>) -> Result<ApiResponse, DispatchFault> {
    let request = ctx.request;

    let data = StatusData {
        method: request.method.to_string(),
        path: request.path.clone(),
        query: request.query.clone(),
        rust_version: RUST_VERSION,
        time: Local::now().format(TIME_FORMAT).to_string(),
    };

    Ok(ApiResponse::success(
        ctx.framework.clone(),
        format!("{} REST API is working", ctx.framework.name),
        data,
    ))
}

/// Fallback for every unmatched request
#[allow(clippy::unnecessary_wraps)]
pub fn not_found(ctx: &RequestContext<'_>) -> Result<ApiResponse, DispatchFault> {
    let request = ctx.request;

    let data = NotFoundData {
        method: request.method.to_string(),
        path: request.path.clone(),
        available_endpoints: AVAILABLE_ENDPOINTS.iter().copied().collect::<BTreeMap<_, _>>(),
    };

    Ok(ApiResponse::not_found(ctx.framework.clone(), data))
}
