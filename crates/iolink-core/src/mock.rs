//! Scripted in-memory transport for tests

use std::collections::HashMap;
use std::sync::Mutex;

use crate::endpoint;
use crate::error::{ClientError, Result};
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Body(String),
    Status(u16),
    Timeout,
}

/// Replies are consumed in order; the last reply for a path repeats
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    replies: Mutex<HashMap<String, Vec<Reply>>>,
    requests: Mutex<Vec<String>>,
    offline: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request fails at the transport level
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn reply(self, path: impl Into<String>, body: &str) -> Self {
        self.replies(path, [Reply::Body(body.to_string())])
    }

    pub fn replies(self, path: impl Into<String>, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(path.into(), replies.into_iter().collect());
        self
    }

    /// Device with `ports` ports; `devices` maps a port to (status, name, pdin)
    pub fn device(ports: u16, devices: &[(u16, &str, &str, &str)]) -> Self {
        let mut mock = Self::new().reply(endpoint::PORT_COUNT, &ports.to_string());
        for port in 1..=ports {
            mock = mock.reply(endpoint::status(port), "0");
        }
        for &(port, status, name, data) in devices {
            mock = mock
                .reply(endpoint::status(port), status)
                .reply(endpoint::product_name(port), name)
                .reply(endpoint::process_data(port), data);
        }
        mock
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn address(&self) -> &str {
        "mock"
    }

    async fn request(&self, path: &str) -> Result<String> {
        self.requests.lock().unwrap().push(path.to_string());
        let url = endpoint::url("mock", path);

        if self.offline {
            return Err(ClientError::Transport {
                url,
                message: "connection refused".to_string(),
            });
        }

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            match replies.get_mut(path) {
                Some(queue) if queue.len() > 1 => Some(queue.remove(0)),
                Some(queue) => queue.first().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Status(status)) => Err(ClientError::HttpStatus { url, status }),
            Some(Reply::Timeout) => Err(ClientError::Timeout { url }),
            None => Err(ClientError::HttpStatus { url, status: 404 }),
        }
    }

    async fn check(&self) -> Result<()> {
        if self.offline {
            return Err(ClientError::Connectivity {
                address: "mock".to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}
