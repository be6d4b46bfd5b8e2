//! Client for a single IO-Link Master

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::endpoint;
use crate::error::{ClientError, Result};
use crate::port::{PortInfo, PortStatus, ScanResult};
use crate::temperature::TemperatureDecoder;
use crate::transport::{HttpTransport, RequestMode, Transport};

/// Factory default address of the AL1350 on a link-local network
pub const DEFAULT_ADDRESS: &str = "169.254.178.135";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for an [`IoLinkMaster`]
#[derive(Debug, Clone, PartialEq)]
pub struct MasterConfig {
    /// IP address or host name of the master
    pub address: String,
    /// Timeout applied to every request
    pub timeout: Duration,
    /// GET per path, or POST with a JSON request body
    pub mode: RequestMode,
    /// Command id sent with POST requests
    pub cid: i64,
    /// Decoding applied to process data by the temperature helpers
    pub decoder: TemperatureDecoder,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            timeout: DEFAULT_TIMEOUT,
            mode: RequestMode::Get,
            cid: 1,
            decoder: TemperatureDecoder::Scaled,
        }
    }
}

impl MasterConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }
}

/// IO-Link Master client
///
/// Every accessor issues one request and awaits it before returning, so a
/// client never has more than one request in flight.
#[derive(Debug)]
pub struct IoLinkMaster<T = HttpTransport> {
    transport: T,
    decoder: TemperatureDecoder,
}

impl IoLinkMaster<HttpTransport> {
    /// Create a client without touching the network
    pub fn new(config: MasterConfig) -> Self {
        let transport = HttpTransport::new(config.address, config.timeout, config.mode, config.cid);
        Self::with_transport(transport, config.decoder)
    }

    /// Create a client and verify the device answers before returning it
    pub async fn connect(config: MasterConfig) -> Result<Self> {
        let master = Self::new(config);
        master.check_connectivity().await?;
        Ok(master)
    }
}

impl<T: Transport> IoLinkMaster<T> {
    pub fn with_transport(transport: T, decoder: TemperatureDecoder) -> Self {
        Self { transport, decoder }
    }

    pub fn address(&self) -> &str {
        self.transport.address()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Check that the device answers on its root URL
    pub async fn check_connectivity(&self) -> Result<()> {
        info!(address = %self.address(), "Connecting to IO-Link Master");
        self.transport.check().await.inspect_err(|e| {
            warn!(address = %self.address(), error = %e, "IO-Link Master not reachable");
        })
    }

    /// Fetch the raw value behind an endpoint path
    pub async fn perform_request(&self, path: &str) -> Result<String> {
        self.transport.request(path).await.inspect_err(|e| {
            debug!(address = %self.address(), path = %path, error = %e, "Request failed");
        })
    }

    /// Number of ports, with the reason when it cannot be determined
    pub async fn try_port_count(&self) -> Result<u16> {
        let body = self.perform_request(endpoint::PORT_COUNT).await?;
        body.trim().parse().map_err(|_| ClientError::Malformed {
            path: endpoint::PORT_COUNT.to_string(),
            body,
        })
    }

    /// Number of ports, 0 when the request fails or the reply is not a number
    pub async fn port_count(&self) -> u16 {
        match self.try_port_count().await {
            Ok(count) => count,
            Err(e) => {
                warn!(address = %self.address(), error = %e, "Unable to read port count");
                0
            }
        }
    }

    pub async fn device_status(&self, port: u16) -> Result<PortStatus> {
        self.perform_request(&endpoint::status(port))
            .await
            .map(PortStatus::new)
    }

    pub async fn device_name(&self, port: u16) -> Result<String> {
        self.perform_request(&endpoint::product_name(port)).await
    }

    /// Raw process data exactly as the device reports it
    pub async fn device_data(&self, port: u16) -> Result<String> {
        self.perform_request(&endpoint::process_data(port)).await
    }

    pub async fn temperature_celsius(&self, port: u16) -> Result<f64> {
        let raw = self.device_data(port).await?;
        let celsius = self.decoder.decode(&raw)?;
        debug!(port, raw = %raw, celsius, "Decoded temperature");
        Ok(celsius)
    }

    /// Query every port in ascending order
    ///
    /// Name and process data are only requested for ports whose status is
    /// operational. A failed request leaves the matching field empty and
    /// never aborts the scan.
    pub async fn scan_all_ports(&self) -> ScanResult {
        let count = self.port_count().await;
        let mut result = ScanResult::default();

        info!(address = %self.address(), ports = count, "Scanning ports");

        for port in 1..=count {
            let mut info = PortInfo::empty(port);

            match self.device_status(port).await {
                Ok(status) => info.status = Some(status),
                Err(e) => warn!(port, error = %e, "Unable to read port status"),
            }

            if info.is_connected() {
                info.name = self
                    .device_name(port)
                    .await
                    .inspect_err(|e| warn!(port, error = %e, "Unable to read product name"))
                    .ok();
                info.data = self
                    .device_data(port)
                    .await
                    .inspect_err(|e| warn!(port, error = %e, "Unable to read process data"))
                    .ok();
                info.temperature_c = info
                    .data
                    .as_deref()
                    .and_then(|raw| self.decoder.decode(raw).ok());

                info!(
                    port,
                    name = info.name.as_deref().unwrap_or("?"),
                    data = info.data.as_deref().unwrap_or("?"),
                    "Device connected"
                );
            } else {
                debug!(port, status = ?info.status, "No device connected");
            }

            result.insert(info);
        }

        info!(
            ports = result.len(),
            connected = result.connected().count(),
            "Scan complete"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionError;
    use crate::mock::{MockTransport, Reply};

    fn master(mock: MockTransport) -> IoLinkMaster<MockTransport> {
        IoLinkMaster::with_transport(mock, TemperatureDecoder::Scaled)
    }

    #[test]
    fn test_default_config() {
        let config = MasterConfig::default();
        assert_eq!(config.address, "169.254.178.135");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.mode, RequestMode::Get);
    }

    #[test]
    fn test_new_does_not_connect() {
        let master = IoLinkMaster::new(MasterConfig::new("192.0.2.1"));
        assert_eq!(master.address(), "192.0.2.1");
    }

    #[tokio::test]
    async fn test_connect_fails_when_offline() {
        let master = master(MockTransport::offline());
        assert!(matches!(
            master.check_connectivity().await,
            Err(ClientError::Connectivity { .. })
        ));
    }

    #[tokio::test]
    async fn test_port_count() {
        let master = master(MockTransport::new().reply(endpoint::PORT_COUNT, "4"));
        assert_eq!(master.port_count().await, 4);
    }

    #[tokio::test]
    async fn test_port_count_zero_on_transport_failure() {
        let master = master(MockTransport::offline());
        assert_eq!(master.port_count().await, 0);
        assert!(master.try_port_count().await.unwrap_err().is_transport());
    }

    #[tokio::test]
    async fn test_port_count_zero_on_invalid_body() {
        let master = master(MockTransport::new().reply(endpoint::PORT_COUNT, "invalid"));
        assert_eq!(master.port_count().await, 0);
        assert!(matches!(
            master.try_port_count().await,
            Err(ClientError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_device_accessors() {
        let master = master(MockTransport::device(4, &[(1, "2", "TV7105", "0x0157")]));
        assert_eq!(master.device_status(1).await.unwrap().as_str(), "2");
        assert_eq!(master.device_name(1).await.unwrap(), "TV7105");
        assert_eq!(master.device_data(1).await.unwrap(), "0x0157");
        assert_eq!(master.temperature_celsius(1).await.unwrap(), 34.3);
    }

    #[tokio::test]
    async fn test_status_is_opaque() {
        let master = master(MockTransport::new().reply(endpoint::status(2), "42"));
        let status = master.device_status(2).await.unwrap();
        assert_eq!(status.as_str(), "42");
        assert!(!status.is_operational());
    }

    #[tokio::test]
    async fn test_temperature_invalid_data() {
        let master = master(MockTransport::new().reply(endpoint::process_data(1), "invalid"));
        assert!(matches!(
            master.temperature_celsius(1).await,
            Err(ClientError::Conversion(ConversionError::InvalidHex(_)))
        ));
    }

    #[tokio::test]
    async fn test_temperature_request_failure() {
        let master = master(
            MockTransport::new().replies(endpoint::process_data(1), [Reply::Timeout]),
        );
        assert!(matches!(
            master.temperature_celsius(1).await,
            Err(ClientError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_scan_has_one_entry_per_port() {
        let master = master(MockTransport::device(
            4,
            &[(1, "2", "TV7105", "0x0157"), (3, "2", "TV7105", "0x00FF")],
        ));
        let scan = master.scan_all_ports().await;

        assert_eq!(scan.len(), 4);
        assert_eq!(scan.iter().map(|p| p.port).collect::<Vec<_>>(), vec![1, 2, 3, 4]);

        let port1 = scan.get(1).unwrap();
        assert!(port1.is_connected());
        assert_eq!(port1.name.as_deref(), Some("TV7105"));
        assert_eq!(port1.data.as_deref(), Some("0x0157"));
        assert_eq!(port1.temperature_c, Some(34.3));

        let port2 = scan.get(2).unwrap();
        assert_eq!(port2.status.as_ref().map(PortStatus::as_str), Some("0"));
        assert!(port2.name.is_none());
        assert!(port2.data.is_none());
        assert!(port2.temperature_c.is_none());

        assert_eq!(scan.get(3).unwrap().temperature_c, Some(25.5));
    }

    #[tokio::test]
    async fn test_scan_survives_port_failures() {
        let mock = MockTransport::device(3, &[(3, "2", "TV7105", "0x0157")])
            .replies(endpoint::status(1), [Reply::Status(500)])
            .replies(endpoint::product_name(3), [Reply::Timeout]);
        let master = master(mock);
        let scan = master.scan_all_ports().await;

        assert_eq!(scan.len(), 3);
        assert!(scan.get(1).unwrap().status.is_none());
        let port3 = scan.get(3).unwrap();
        assert!(port3.name.is_none());
        assert_eq!(port3.data.as_deref(), Some("0x0157"));
    }

    #[tokio::test]
    async fn test_scan_is_sequential_and_skips_disconnected() {
        let master = master(MockTransport::device(2, &[(2, "2", "TV7105", "0x0157")]));
        master.scan_all_ports().await;

        assert_eq!(
            master.transport().requests(),
            vec![
                endpoint::PORT_COUNT.to_string(),
                endpoint::status(1),
                endpoint::status(2),
                endpoint::product_name(2),
                endpoint::process_data(2),
            ]
        );
    }

    #[tokio::test]
    async fn test_scan_offline_is_empty() {
        let master = master(MockTransport::offline());
        let scan = master.scan_all_ports().await;
        assert!(scan.is_empty());
    }
}
