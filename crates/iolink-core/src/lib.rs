//! IO-Link Core - Client for the ifm AL1350 IO-Link Master
//!
//! This crate talks to the master's HTTP API:
//! - Port count, per-port device status, product name and process data
//! - TV7105 temperature decoding from hexadecimal process data
//! - Sequential scan of all ports
//! - Cancellable temperature monitoring with running statistics

pub mod endpoint;
pub mod error;
pub mod master;
pub mod monitor;
pub mod port;
pub mod temperature;
pub mod transport;

#[cfg(test)]
mod mock;

pub use error::{ClientError, ConversionError};
pub use master::{IoLinkMaster, MasterConfig, DEFAULT_ADDRESS, DEFAULT_TIMEOUT};
pub use monitor::{MonitorEvent, MonitorOptions, MonitorStats, MonitorSummary, StopReason};
pub use port::{PortInfo, PortStatus, ScanResult, StatusKind};
pub use temperature::{hex_to_temperature_celsius, TemperatureDecoder};
pub use transport::{HttpTransport, RequestMode, Transport};
