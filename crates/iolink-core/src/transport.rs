//! HTTP transport to the IO-Link Master REST surface
//!
//! The AL1350 answers both plain `GET <path>` requests and JSON-RPC style
//! `POST /` requests carrying `{"code":"request","cid":..,"adr":<path>}`.
//! Either way the reply is usually wrapped in an envelope of the form
//! `{"cid":1,"data":{"value":"0x0157"},"code":200}` which is unwrapped here.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::endpoint;
use crate::error::{ClientError, Result};

/// Request/response seam between [`IoLinkMaster`](crate::IoLinkMaster) and the network
pub trait Transport {
    /// Address of the device this transport talks to
    fn address(&self) -> &str;

    /// Fetch the value behind an endpoint path
    fn request(&self, path: &str) -> impl Future<Output = Result<String>> + Send;

    /// Check that the device answers on its root URL
    fn check(&self) -> impl Future<Output = Result<()>> + Send;
}

/// How endpoint paths are sent to the device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    /// `GET http://<address><path>`
    #[default]
    Get,
    /// `POST http://<address>/` with the path in a JSON request body
    Post,
}

#[derive(Serialize)]
struct RequestBody<'a> {
    code: &'a str,
    cid: i64,
    adr: &'a str,
}

/// reqwest based transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    address: String,
    timeout: Duration,
    mode: RequestMode,
    cid: i64,
}

impl HttpTransport {
    /// Create a transport; no connection is made until the first request
    pub fn new(address: impl Into<String>, timeout: Duration, mode: RequestMode, cid: i64) -> Self {
        Self {
            client: reqwest::Client::new(),
            address: address.into(),
            timeout,
            mode,
            cid,
        }
    }

    async fn send(&self, path: &str) -> Result<String> {
        let (url, request) = match self.mode {
            RequestMode::Get => {
                let url = endpoint::url(&self.address, path);
                let request = self.client.get(&url);
                (url, request)
            }
            RequestMode::Post => {
                let root = endpoint::url(&self.address, "/");
                let body = RequestBody {
                    code: "request",
                    cid: self.cid,
                    adr: path,
                };
                let request = self.client.post(&root).json(&body);
                (root, request)
            }
        };

        trace!(url = %url, path = %path, mode = ?self.mode, "Sending request");

        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        if !response.status().is_success() {
            warn!(url = %url, status = %response.status(), "Request returned non-success status");
            return Err(ClientError::HttpStatus {
                url,
                status: response.status().as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(&url, e))?;

        unwrap_envelope(path, &body)
    }
}

impl Transport for HttpTransport {
    fn address(&self) -> &str {
        &self.address
    }

    async fn request(&self, path: &str) -> Result<String> {
        self.send(path).await
    }

    async fn check(&self) -> Result<()> {
        let url = endpoint::url(&self.address, "/");
        let connectivity = |reason: String| ClientError::Connectivity {
            address: self.address.clone(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| connectivity(transport_error(&url, e).to_string()))?;

        if !response.status().is_success() {
            return Err(connectivity(format!("status {}", response.status())));
        }

        debug!(address = %self.address, "IO-Link Master reachable");
        Ok(())
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout {
            url: url.to_string(),
        }
    } else {
        ClientError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

/// Unwrap the vendor JSON envelope, passing non-JSON bodies through trimmed
pub(crate) fn unwrap_envelope(path: &str, body: &str) -> Result<String> {
    let trimmed = body.trim();

    let Ok(Value::Object(envelope)) = serde_json::from_str::<Value>(trimmed) else {
        return Ok(trimmed.to_string());
    };

    let code = envelope.get("code").and_then(Value::as_i64);
    if let Some(code) = code.filter(|&c| c != 200) {
        debug!(path = %path, code, "Device returned error envelope");
        return Err(ClientError::Device {
            path: path.to_string(),
            code,
        });
    }

    match envelope.get("data") {
        Some(data) => Ok(value_to_string(data.get("value").unwrap_or(data))),
        None if code.is_some() => Err(ClientError::Malformed {
            path: path.to_string(),
            body: trimmed.to_string(),
        }),
        None => Ok(trimmed.to_string()),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
