use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::HttpError;

const COMPLETIONS_PATH: &str = "v1/chat/completions";
const METRICS_PATH: &str = "metrics";

/// Base URL of the server and the endpoints derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    base: Url,
    completions: Url,
    metrics: Url,
}

impl Target {
    /// Parses and validates a base URL such as `http://localhost:8069`.
    ///
    /// # Errors
    ///
    /// Returns an error for unparseable URLs, non-HTTP schemes, or a missing host.
    pub fn parse(raw: &str) -> Result<Self, HttpError> {
        let mut base = Url::parse(raw.trim()).map_err(|source| HttpError::InvalidUrl {
            url: raw.to_owned(),
            source,
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(HttpError::UnsupportedScheme {
                url: raw.to_owned(),
                scheme: base.scheme().to_owned(),
            });
        }
        if base.host_str().is_none_or(str::is_empty) {
            return Err(HttpError::UrlMissingHost {
                url: raw.to_owned(),
            });
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let completions = join(&base, COMPLETIONS_PATH)?;
        let metrics = join(&base, METRICS_PATH)?;
        Ok(Self {
            base,
            completions,
            metrics,
        })
    }

    /// Health endpoint (`GET /`).
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    #[must_use]
    pub const fn completions(&self) -> &Url {
        &self.completions
    }

    #[must_use]
    pub const fn metrics(&self) -> &Url {
        &self.metrics
    }

    /// Host and port used for startup resolution.
    #[must_use]
    pub fn host_port(&self) -> Option<(String, u16)> {
        let host = self.base.host_str()?;
        let port = self.base.port_or_known_default().unwrap_or(80);
        Some((host.trim_matches(['[', ']']).to_owned(), port))
    }
}

fn join(base: &Url, path: &str) -> Result<Url, HttpError> {
    base.join(path).map_err(|source| HttpError::JoinUrlFailed {
        url: base.to_string(),
        source,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

/// Builds the shared client; every request carries `request_timeout`.
///
/// # Errors
///
/// Returns an error when the TLS backend cannot be initialised.
pub fn build_client(settings: &ClientSettings) -> Result<Client, HttpError> {
    Client::builder()
        .timeout(settings.request_timeout)
        .connect_timeout(settings.connect_timeout)
        .user_agent(concat!("streamprobe/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| HttpError::BuildClientFailed { source })
}

/// Resolves the target host once before any tool starts.
///
/// # Errors
///
/// Returns an error when the host cannot be resolved to any address.
pub async fn resolve_target(target: &Target) -> Result<Vec<SocketAddr>, HttpError> {
    let (host, port) = target.host_port().ok_or_else(|| HttpError::UrlMissingHost {
        url: target.base().to_string(),
    })?;
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), port))
        .await
        .map_err(|source| HttpError::ResolveHost {
            host: host.clone(),
            port,
            source,
        })?
        .collect();
    if addrs.is_empty() {
        return Err(HttpError::NoAddressesResolved { host });
    }
    debug!("Resolved {}:{} to {:?}", host, port, addrs);
    Ok(addrs)
}
