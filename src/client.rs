//! HTTP probe client and target address construction

use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// A single round-trip against a target address.
///
/// Implementations succeed only when the exchange completes and the target
/// answers with the accepted status. Every other outcome maps to
/// [`AppError::UnreachableTarget`] carrying the exact address probed.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, target: &str) -> Result<()>;
}

/// Probe backed by a pooled reqwest client issuing GET requests
#[derive(Debug, Clone)]
pub struct NetworkClient {
    client: Client,
}

impl NetworkClient {
    /// Create a new network client.
    ///
    /// `request_timeout` bounds every request on the wire, which also caps how
    /// long a probe detached by a missed deadline can keep running.
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("latency-probe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Probe for NetworkClient {
    async fn probe(&self, target: &str) -> Result<()> {
        match self.client.get(target).send().await {
            Ok(response) if response.status() == StatusCode::OK => Ok(()),
            _ => Err(AppError::unreachable(target)),
        }
    }
}

/// Build `<protocol>://<host>`, percent-encoding every host byte that is not
/// allowed in a URL authority. Multi-byte characters are encoded byte by byte.
pub fn build_target_url(protocol: &str, host: &str) -> String {
    let mut url = String::with_capacity(protocol.len() + host.len() + 3);
    url.push_str(protocol);
    url.push_str("://");

    for &byte in host.as_bytes() {
        if is_host_safe(byte) {
            url.push(byte as char);
        } else {
            url.push_str(&format!("%{:02X}", byte));
        }
    }

    url
}

fn is_host_safe(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'-' | b'_' | b'.' | b'~'
                | b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'='
                | b':' | b'[' | b']' | b'<' | b'>' | b'"'
        )
}
