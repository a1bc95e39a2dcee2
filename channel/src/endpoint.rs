//! Endpoint derivation from the backend origin.

use parallax_types::SessionId;
use url::{Host, Url};

use crate::error::ChannelError;

/// Session-scoped stream endpoint. Maps http(s) origins onto ws(s).
pub fn stream_url(origin: &Url, session_id: &SessionId) -> Result<Url, ChannelError> {
    let mut url = origin.clone();
    let scheme = match origin.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(ChannelError::Endpoint(format!(
                "unsupported origin scheme '{other}'"
            )))
        }
    };
    if url.set_scheme(scheme).is_err() {
        return Err(ChannelError::Endpoint(format!(
            "cannot derive a stream scheme from '{origin}'"
        )));
    }
    url.set_path(&format!("/sessions/{}/stream", session_id.as_str()));
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Health endpoint probed before dialing on development hosts.
pub fn health_url(origin: &Url) -> Result<Url, ChannelError> {
    let mut url = origin.clone();
    let scheme = match origin.scheme() {
        "https" | "wss" => "https",
        "http" | "ws" => "http",
        other => {
            return Err(ChannelError::Endpoint(format!(
                "unsupported origin scheme '{other}'"
            )))
        }
    };
    if url.set_scheme(scheme).is_err() {
        return Err(ChannelError::Endpoint(format!(
            "cannot derive a health scheme from '{origin}'"
        )));
    }
    url.set_path("/health");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Hosts that count as development setups: loopback, mDNS `.local` names,
/// and RFC 1918 ranges. Only these get the health preflight.
pub fn is_development_host(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(name)) => {
            name.eq_ignore_ascii_case("localhost") || name.to_ascii_lowercase().ends_with(".local")
        }
        Some(Host::Ipv4(ip)) => ip.is_loopback() || ip.is_private(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}
