//! Upstash connection URL handling
//!
//! Upstash hands out URLs of the form `rediss://default:<password>@<host>:<port>`.
//! The URL is parsed up front so that a malformed secret is reported as a
//! configuration problem instead of an opaque connection failure.

use std::fmt;
use url::Url;

use crate::KvError;
use onboard_core::mask_sensitive;

/// Connection details extracted from an Upstash (or plain Redis) URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstashEndpoint {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Percent-encoded, exactly as it appeared in the URL
    pub password: String,
    /// `rediss://` connections use TLS
    pub tls: bool,
}

/// Parse `rediss://<user>:<password>@<host>:<port>`.
///
/// The scheme may also be `redis://` for local, non-TLS instances. Password,
/// host and port are all required.
pub fn parse_upstash_url(raw: &str) -> Result<UpstashEndpoint, KvError> {
    let url = Url::parse(raw.trim()).map_err(|e| KvError::InvalidUrl(e.to_string()))?;

    let tls = match url.scheme() {
        "rediss" => true,
        "redis" => false,
        other => {
            return Err(KvError::InvalidUrl(format!(
                "unsupported scheme '{}', expected rediss:// or redis://",
                other
            )))
        }
    };

    let password = url
        .password()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| KvError::InvalidUrl("missing password".to_string()))?
        .to_string();

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| KvError::InvalidUrl("missing host".to_string()))?
        .to_string();

    let port = url
        .port()
        .ok_or_else(|| KvError::InvalidUrl("missing port".to_string()))?;

    let username = match url.username() {
        "" => "default".to_string(),
        name => name.to_string(),
    };

    Ok(UpstashEndpoint {
        host,
        port,
        username,
        password,
        tls,
    })
}

impl UpstashEndpoint {
    /// URL for the Redis client.
    ///
    /// With `verify_tls` off, TLS connections accept any certificate.
    pub fn connection_url(&self, verify_tls: bool) -> String {
        let scheme = if self.tls { "rediss" } else { "redis" };
        let mut url = format!(
            "{}://{}:{}@{}:{}",
            scheme, self.username, self.password, self.host, self.port
        );
        if self.tls && !verify_tls {
            url.push_str("/#insecure");
        }
        url
    }
}

impl fmt::Display for UpstashEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}:{}@{}:{}",
            if self.tls { "rediss" } else { "redis" },
            self.username,
            mask_sensitive(&self.password),
            self.host,
            self.port
        )
    }
}
