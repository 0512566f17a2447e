//! Status API
//!
//! Turns every inbound request into exactly one JSON document: the root status
//! payload, the not-found payload, or the 500 envelope when dispatch faults.

mod error;
mod handlers;
mod request;
mod response;
mod router;
mod types;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{REFERER, USER_AGENT};
use hyper::{Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use crate::config::{AppState, FrameworkInfo};
use crate::logger::{self, AccessLogEntry};

pub use error::DispatchFault;
pub use request::IncomingRequest;
pub use router::{RequestContext, RouteTable};
pub use types::ApiResponse;

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
#[allow(clippy::unused_async)]
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let request = IncomingRequest::from_parts(req.method(), req.uri());

    logger::log_debug(&format!(
        "[Request] {} {} {:?} ({} headers)",
        req.method(),
        req.uri(),
        req.version(),
        req.headers().len()
    ));

    let response = respond(&request, &state);

    if state.access_log_enabled() {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            request.method.to_string(),
            request.path.clone(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = http_version_label(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.referer = header_string(&req, REFERER);
        entry.user_agent = header_string(&req, USER_AGENT);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch a request and serialize the outcome
///
/// This is the outermost boundary: any fault raised while routing, running a
/// handler or serializing becomes the 500 envelope.
pub fn respond(request: &IncomingRequest, state: &AppState) -> Response<Full<Bytes>> {
    let framework = &state.config.framework;
    let server_name = state.config.http.server_name.as_str();

    let outcome = dispatch(request, &state.routes, framework)
        .and_then(|body| response::json_response(&body, server_name));

    match outcome {
        Ok(resp) => resp,
        Err(fault) => {
            logger::log_error(&format!(
                "Dispatch fault on {} {}: {fault}",
                request.method, request.path
            ));
            response::error_envelope(framework, &fault, server_name)
        }
    }
}

/// Route a request and run its handler, converting panics into faults
pub fn dispatch(
    request: &IncomingRequest,
    routes: &RouteTable,
    framework: &FrameworkInfo,
) -> Result<ApiResponse, DispatchFault> {
    let ctx = RequestContext { request, framework };

    panic::catch_unwind(AssertUnwindSafe(|| {
        let handler = routes.find(&request.method, &request.path);
        handler(&ctx)
    }))
    .unwrap_or_else(|payload| Err(DispatchFault::from_panic(&*payload)))
}

fn http_version_label(version: Version) -> &'static str {
    if version == Version::HTTP_09 {
        "0.9"
    } else if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_2 {
        "2"
    } else if version == Version::HTTP_3 {
        "3"
    } else {
        "1.1"
    }
}

fn header_string<B>(req: &Request<B>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
