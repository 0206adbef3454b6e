//! Client IP resolution for rate-limit bucketing
//!
//! Order: `X-Forwarded-For` (honouring the trusted proxy count), `X-Real-IP`,
//! the socket peer address, and finally the shared `"unknown"` bucket.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

pub const UNKNOWN_CLIENT: &str = "unknown";

/// Socket peer address, present only when the server was started with connect info.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientAddr(pub Option<SocketAddr>);

impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientAddr(
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
        ))
    }
}

pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    header_str(headers, "x-forwarded-for")
        .and_then(|chain| client_from_chain(chain, trusted_proxy_count))
        .or_else(|| header_str(headers, "x-real-ip").and_then(parse_ip))
        .or_else(|| socket_addr.map(|addr| addr.ip()))
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn parse_ip(raw: &str) -> Option<IpAddr> {
    raw.trim().parse().ok()
}

/// Pick the client out of `client, proxy1, proxy2, ...`.
///
/// The last `trusted_proxy_count` hops are our own proxies; the entry just before
/// them is the client. A chain no longer than the trusted count, or a count of
/// zero, yields the hop closest to us.
fn client_from_chain(chain: &str, trusted_proxy_count: usize) -> Option<IpAddr> {
    let hops: Vec<&str> = chain
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let position = if trusted_proxy_count == 0 || hops.len() <= trusted_proxy_count {
        hops.len().checked_sub(1)?
    } else {
        hops.len() - trusted_proxy_count - 1
    };

    hops.get(position).and_then(|hop| parse_ip(hop))
}
