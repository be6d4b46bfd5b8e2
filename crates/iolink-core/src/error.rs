//! Error types for device requests and value conversion

use thiserror::Error;

/// Failure to turn raw process data into a temperature
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Empty process data")]
    Empty,
    #[error("Invalid hexadecimal value: {0:?}")]
    InvalidHex(String),
    #[error("Hexadecimal value too large: {0:?}")]
    Overflow(String),
    #[error("Temperature {value:.1}°C outside sensor range ({min}°C to {max}°C)")]
    OutOfRange { value: f64, min: f64, max: f64 },
}

/// Failure of a single request against the IO-Link Master
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },
    #[error("HTTP request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("Device reported error code {code} for {path}")]
    Device { path: String, code: i64 },
    #[error("Malformed response for {path}: {body:?}")]
    Malformed { path: String, body: String },
    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),
    #[error("Unable to connect to IO-Link Master at {address}: {reason}")]
    Connectivity { address: String, reason: String },
}

impl ClientError {
    /// True for failures that happened before any response was received
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport { .. })
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
