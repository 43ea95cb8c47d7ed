//! Middleware for observability and rate limiting.
//!
//! - Request logging with latency tracking
//! - Rate limiting per IP address

pub mod logging;
pub mod rate_limit;

pub use logging::request_logging;
pub use rate_limit::{rate_limit_middleware, RateLimitConfig, RateLimitLayer};

use axum::{extract::ConnectInfo, http::Request};
use std::net::{IpAddr, SocketAddr};

/// Peer address, present when served with `into_make_service_with_connect_info`.
pub(crate) fn client_ip<B>(request: &Request<B>) -> Option<IpAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}
