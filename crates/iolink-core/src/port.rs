//! Port status and scan result types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Status code reported for the device on a port
///
/// The device returns a bare code string. Codes `0` to `3` are documented,
/// anything else is kept verbatim and classified as [`StatusKind::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortStatus(String);

impl PortStatus {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> StatusKind {
        match self.0.as_str() {
            "0" => StatusKind::NotConnected,
            "1" => StatusKind::Preoperate,
            "2" => StatusKind::Operate,
            "3" => StatusKind::CommunicationError,
            _ => StatusKind::Unknown,
        }
    }

    /// A device is connected and exchanging process data
    pub fn is_operational(&self) -> bool {
        self.kind() == StatusKind::Operate
    }
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Documented meaning of a [`PortStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    NotConnected,
    Preoperate,
    Operate,
    CommunicationError,
    Unknown,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotConnected => "not connected",
            Self::Preoperate => "preoperate",
            Self::Operate => "operate",
            Self::CommunicationError => "communication error",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// What a scan learned about one port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortInfo {
    /// 1-based port number
    pub port: u16,
    /// Status, `None` if the status request failed
    pub status: Option<PortStatus>,
    /// Product name of an operational device
    pub name: Option<String>,
    /// Raw process data of an operational device
    pub data: Option<String>,
    /// Temperature decoded from `data`, if it decodes
    pub temperature_c: Option<f64>,
}

impl PortInfo {
    pub fn empty(port: u16) -> Self {
        Self {
            port,
            status: None,
            name: None,
            data: None,
            temperature_c: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status.as_ref().is_some_and(PortStatus::is_operational)
    }
}

/// Result of scanning every port on the master, keyed by port number
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanResult {
    pub ports: BTreeMap<u16, PortInfo>,
}

impl ScanResult {
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn get(&self, port: u16) -> Option<&PortInfo> {
        self.ports.get(&port)
    }

    /// Ports in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &PortInfo> {
        self.ports.values()
    }

    /// Ports with an operational device
    pub fn connected(&self) -> impl Iterator<Item = &PortInfo> {
        self.iter().filter(|p| p.is_connected())
    }

    pub(crate) fn insert(&mut self, info: PortInfo) {
        self.ports.insert(info.port, info);
    }
}
