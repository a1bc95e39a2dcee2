//! Health probe for development origins.
//!
//! Development backends sit behind self-signed certificates, and a browser
//! that has not accepted the certificate yet fails the socket dial with an
//! opaque error. Probing a plain HTTP endpoint first turns that case into
//! a typed failure the caller can route to a certificate-acceptance flow.

use std::time::Duration;

use url::Url;

use crate::endpoint::health_url;
use crate::error::ChannelError;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probe `{origin}/health` and require a 2xx answer.
pub async fn probe_health(origin: &Url) -> Result<(), ChannelError> {
    let url = health_url(origin)?;
    let client = reqwest::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
        .map_err(|err| ChannelError::Preflight {
            url: url.to_string(),
            reason: err.to_string(),
        })?;

    tracing::debug!(url = %url, "probing backend health");
    match client.get(url.as_str()).send().await {
        Ok(response) if response.status().is_success() => Ok(()),
        Ok(response) => Err(ChannelError::Preflight {
            url: url.to_string(),
            reason: format!("status {}", response.status()),
        }),
        Err(err) => Err(ChannelError::Preflight {
            url: url.to_string(),
            reason: err.to_string(),
        }),
    }
}
