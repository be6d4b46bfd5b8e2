//! HTTP probing to confirm a host is an IO-Link Master

use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, info, trace};

/// Probe timeout in milliseconds
pub const PROBE_TIMEOUT_MS: u64 = 3000;

/// Words the AL1350 landing page is expected to contain
const MASTER_MARKERS: &[&str] = &["ifm", "iolink", "al1350"];

/// Check whether a landing page looks like it was served by an IO-Link Master
pub fn looks_like_iolink_master(body: &str) -> bool {
    let body = body.to_lowercase();
    MASTER_MARKERS.iter().any(|marker| body.contains(marker))
}

/// Fetch `http://<ip>/` and inspect the page
pub async fn probe_host(client: &reqwest::Client, ip: Ipv4Addr, timeout: Duration) -> bool {
    let url = format!("http://{}/", ip);

    let response = match client.get(&url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            trace!(ip = %ip, error = %e, "Probe request failed");
            return false;
        }
    };

    if !response.status().is_success() {
        trace!(ip = %ip, status = %response.status(), "Probe returned non-success status");
        return false;
    }

    match response.text().await {
        Ok(body) => looks_like_iolink_master(&body),
        Err(e) => {
            trace!(ip = %ip, error = %e, "Failed to read probe response");
            false
        }
    }
}

/// Probe multiple IP addresses for IO-Link Masters
pub async fn probe_hosts(hosts: &[Ipv4Addr], timeout: Duration) -> Vec<Ipv4Addr> {
    let client = reqwest::Client::new();
    let mut tasks = JoinSet::new();

    for &host in hosts {
        let client = client.clone();
        tasks.spawn(async move {
            if probe_host(&client, host, timeout).await {
                Some(host)
            } else {
                None
            }
        });
    }

    let mut masters = Vec::new();
    while let Some(result) = tasks.join_next().await {
        if let Ok(Some(ip)) = result {
            info!(ip = %ip, "Found IO-Link Master");
            masters.push(ip);
        }
    }

    masters.sort();
    debug!(
        "Probed {} hosts, found {} IO-Link Masters",
        hosts.len(),
        masters.len()
    );
    masters
}
