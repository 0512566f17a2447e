//! Route table
//!
//! An ordered list of routes evaluated first-match-wins, backed by a fallback
//! handler that is supplied at construction, so every lookup yields a handler.

use hyper::Method;

use super::error::DispatchFault;
use super::handlers;
use super::request::IncomingRequest;
use super::types::ApiResponse;
use crate::config::FrameworkInfo;

/// Everything a handler may read while building its response
pub struct RequestContext<'a> {
    pub request: &'a IncomingRequest,
    pub framework: &'a FrameworkInfo,
}

/// Route handler signature
pub type Handler = fn(&RequestContext<'_>) -> Result<ApiResponse, DispatchFault>;

/// Method condition of a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodMatch {
    Any,
    // The standard table routes `/` for every method
    #[cfg_attr(not(test), allow(dead_code))]
    Exact(Method),
}

/// Path condition of a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch {
    #[cfg_attr(not(test), allow(dead_code))]
    Any,
    Exact(String),
}

impl MethodMatch {
    fn matches(&self, method: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => expected == method,
        }
    }
}

impl PathMatch {
    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => expected == path,
        }
    }
}

struct Route {
    method: MethodMatch,
    path: PathMatch,
    handler: Handler,
}

pub struct RouteTable {
    routes: Vec<Route>,
    fallback: Handler,
}

impl RouteTable {
    /// Empty table that sends everything to `fallback`
    pub fn new(fallback: Handler) -> Self {
        Self {
            routes: Vec::new(),
            fallback,
        }
    }

    /// The service's routes: `/` for any method, everything else not found
    pub fn standard() -> Self {
        Self::new(handlers::not_found).route(
            MethodMatch::Any,
            PathMatch::Exact("/".to_string()),
            handlers::status,
        )
    }

    /// Append a route, evaluated after every route added before it
    #[must_use]
    pub fn route(mut self, method: MethodMatch, path: PathMatch, handler: Handler) -> Self {
        self.routes.push(Route {
            method,
            path,
            handler,
        });
        self
    }

    /// Find the handler for a request
    pub fn find(&self, method: &Method, path: &str) -> Handler {
        self.routes
            .iter()
            .find(|route| route.method.matches(method) && route.path.matches(path))
            .map_or(self.fallback, |route| route.handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(_: &RequestContext<'_>) -> Result<ApiResponse, DispatchFault> {
        Err(DispatchFault::Handler("first".to_string()))
    }

    fn second(_: &RequestContext<'_>) -> Result<ApiResponse, DispatchFault> {
        Err(DispatchFault::Handler("second".to_string()))
    }

    fn fallback(_: &RequestContext<'_>) -> Result<ApiResponse, DispatchFault> {
        Err(DispatchFault::Handler("fallback".to_string()))
    }

    fn which(table: &RouteTable, method: &Method, path: &str) -> String {
        let request = IncomingRequest {
            method: method.clone(),
            path: path.to_string(),
            query: Default::default(),
        };
        let framework = FrameworkInfo {
            name: "Hyper".to_string(),
            version: "1".to_string(),
        };
        let ctx = RequestContext {
            request: &request,
            framework: &framework,
        };
        match table.find(method, path)(&ctx) {
            Err(fault) => fault.to_string(),
            Ok(_) => unreachable!("test handlers always fail"),
        }
    }

    #[test]
    fn test_empty_table_uses_fallback() {
        let table = RouteTable::new(fallback);
        assert_eq!(which(&table, &Method::GET, "/"), "fallback");
    }

    #[test]
    fn test_first_match_wins() {
        let table = RouteTable::new(fallback)
            .route(
                MethodMatch::Exact(Method::GET),
                PathMatch::Exact("/a".to_string()),
                first,
            )
            .route(MethodMatch::Any, PathMatch::Any, second);

        assert_eq!(which(&table, &Method::GET, "/a"), "first");
        assert_eq!(which(&table, &Method::POST, "/a"), "second");
        assert_eq!(which(&table, &Method::GET, "/b"), "second");
    }

    #[test]
    fn test_exact_path_only() {
        let table = RouteTable::new(fallback).route(
            MethodMatch::Any,
            PathMatch::Exact("/".to_string()),
            first,
        );

        assert_eq!(which(&table, &Method::DELETE, "/"), "first");
        assert_eq!(which(&table, &Method::GET, "/index"), "fallback");
        assert_eq!(which(&table, &Method::GET, ""), "fallback");
    }
}
