//! HTTP probing.
//!
//! # Responsibilities
//! - Send one GET/HEAD request with a deadline
//! - Report the response status, or classify why there was none
//!
//! Status interpretation lives in `check::check_target`; a probe only
//! answers "what did the server say".

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::check::result::{CheckError, NetworkErrorKind};
use crate::config::{HttpConfig, ProbeMethod};
use crate::resilience::timeouts::with_deadline;

/// Something that can fetch a status code from a URL.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, method: ProbeMethod, url: &Url, timeout: Duration) -> Result<u16, CheckError>;
}

/// `reqwest`-backed probe.
#[derive(Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, method: ProbeMethod, url: &Url, timeout: Duration) -> Result<u16, CheckError> {
        let request = match method {
            ProbeMethod::Get => self.client.get(url.clone()),
            ProbeMethod::Head => self.client.head(url.clone()),
        };

        match with_deadline(timeout, request.timeout(timeout).send()).await {
            Ok(Ok(response)) => Ok(response.status().as_u16()),
            Ok(Err(e)) => Err(CheckError::network(classify(&e), describe(&e))),
            Err(elapsed) => Err(CheckError::network(NetworkErrorKind::Timeout, elapsed.to_string())),
        }
    }
}

fn classify(err: &reqwest::Error) -> NetworkErrorKind {
    if err.is_timeout() {
        return NetworkErrorKind::Timeout;
    }
    if err.is_connect() {
        let chain = describe(err).to_ascii_lowercase();
        if chain.contains("dns error")
            || chain.contains("failed to lookup address")
            || chain.contains("name or service not known")
            || chain.contains("no such host")
        {
            return NetworkErrorKind::Dns;
        }
        if chain.contains("connection refused") {
            return NetworkErrorKind::ConnectionRefused;
        }
        return NetworkErrorKind::Connect;
    }
    NetworkErrorKind::Other
}

/// The error and all of its sources, joined.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
