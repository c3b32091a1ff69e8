//! Standard readiness probes for the gateway's dependencies.
//!
//! - `postgres`: the database host accepts TCP connections
//! - `qdrant`: `GET {url}/collections` answers 2xx
//! - `openai`: an API key is configured and `GET {base_url}/models` answers 2xx

use futures_util::future::BoxFuture;
use tokio::net::TcpStream;

use crate::config::ServiceConfig;
use crate::health::{DependencyCheck, Probe, ProbeError};

const POSTGRES_DEFAULT_PORT: u16 = 5432;

/// GET a URL and require a success status.
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
    headers: Vec<(&'static str, String)>,
}

impl HttpProbe {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Probe for HttpProbe {
    fn probe(&self) -> BoxFuture<'_, Result<(), ProbeError>> {
        Box::pin(async move {
            let mut request = self.client.get(&self.url);
            for (name, value) in &self.headers {
                request = request.header(*name, value);
            }
            request.send().await?.error_for_status()?;
            Ok(())
        })
    }
}

/// Open (and immediately close) a TCP connection.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Target the host and port named in a database connection string.
    pub fn from_dsn(dsn: &str) -> Result<Self, ProbeError> {
        let url = url::Url::parse(dsn).map_err(|e| ProbeError::new(format!("invalid dsn: {}", e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| ProbeError::new("dsn has no host"))?;
        Ok(Self::new(host, url.port().unwrap_or(POSTGRES_DEFAULT_PORT)))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Probe for TcpProbe {
    fn probe(&self) -> BoxFuture<'_, Result<(), ProbeError>> {
        Box::pin(async move {
            TcpStream::connect((self.host.as_str(), self.port)).await?;
            Ok(())
        })
    }
}

/// A dependency that cannot be probed because it is misconfigured.
#[derive(Debug, Clone)]
pub struct Unavailable(pub String);

impl Probe for Unavailable {
    fn probe(&self) -> BoxFuture<'_, Result<(), ProbeError>> {
        let reason = self.0.clone();
        Box::pin(async move { Err(ProbeError(reason)) })
    }
}

/// The readiness checks for postgres, qdrant and openai, in that order.
pub fn standard_checks(config: &ServiceConfig, client: reqwest::Client) -> Vec<DependencyCheck> {
    let timeout = config.readiness.timeout();

    let postgres = match TcpProbe::from_dsn(&config.postgres.dsn) {
        Ok(probe) => DependencyCheck::new("postgres", timeout, probe),
        Err(e) => DependencyCheck::new("postgres", timeout, Unavailable(e.0)),
    };

    let mut qdrant_probe = HttpProbe::new(
        client.clone(),
        format!("{}/collections", config.qdrant.url.trim_end_matches('/')),
    );
    if let Some(key) = &config.qdrant.api_key {
        qdrant_probe = qdrant_probe.with_header("api-key", key.clone());
    }
    let qdrant = DependencyCheck::new("qdrant", timeout, qdrant_probe);

    let openai = match &config.openai.api_key {
        Some(key) => DependencyCheck::new(
            "openai",
            timeout,
            HttpProbe::new(
                client,
                format!("{}/models", config.openai.base_url.trim_end_matches('/')),
            )
            .with_header("authorization", format!("Bearer {}", key)),
        ),
        None => DependencyCheck::new(
            "openai",
            timeout,
            Unavailable("openai_api_key missing".to_string()),
        ),
    };

    vec![postgres, qdrant, openai]
}
