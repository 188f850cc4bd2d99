//! Rate-limit identity derivation.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Rate-limit key of a caller, derived from its network origin.
///
/// Callers whose origin cannot be determined share the `Unknown` bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Addr(String),
    Unknown,
}

impl Identity {
    /// First non-blank candidate wins; none at all yields `Unknown`.
    pub fn first_present<'a, I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|c| !c.is_empty())
            .map(|c| Self::Addr(c.to_string()))
            .unwrap_or(Self::Unknown)
    }

    /// `X-Forwarded-For` (its first hop) takes precedence over the transport
    /// address.
    pub fn from_request(headers: &HeaderMap, remote: Option<SocketAddr>) -> Self {
        let forwarded = headers
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next());
        let remote = remote.map(|addr| addr.ip().to_string());
        Self::first_present([forwarded, remote.as_deref()])
    }

    /// Owner label stored on pixels: separators scrubbed so the raw address
    /// is not echoed verbatim to other clients.
    pub fn anonymize(&self) -> String {
        match self {
            Self::Addr(addr) => format!("IP_{}", addr.replace([':', '.'], "_")),
            Self::Unknown => "IP_unknown".to_string(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Addr(addr) => f.write_str(addr),
            Self::Unknown => f.write_str("<unknown>"),
        }
    }
}

/// Extracts the caller's [`Identity`]. Works with or without
/// `into_make_service_with_connect_info`.
#[derive(Debug, Clone)]
pub struct ClientIdentity(pub Identity);

impl<S> FromRequestParts<S> for ClientIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let remote = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self(Identity::from_request(&parts.headers, remote)))
    }
}
