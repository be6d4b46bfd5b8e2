//! Discovery flow combining the ARP table and HTTP probing

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::arp::{get_arp_table, ArpEntry};
use crate::probe::{probe_hosts, PROBE_TIMEOUT_MS};

/// Scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Timeout of each landing page probe in milliseconds
    pub probe_timeout_ms: u64,
    /// Fall back to 169.254/16 hosts when no ifm MAC address is found
    pub link_local_fallback: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: PROBE_TIMEOUT_MS,
            link_local_fallback: true,
        }
    }
}

/// Why a host was considered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateReason {
    /// MAC address carries an ifm OUI
    IfmMac,
    /// Link-local address, checked because no ifm MAC was seen
    LinkLocal,
}

/// A host that may be an IO-Link Master
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub entry: ArpEntry,
    pub reason: CandidateReason,
    /// Landing page looked like an IO-Link Master
    pub verified: bool,
}

impl Candidate {
    pub fn ip(&self) -> Ipv4Addr {
        self.entry.ip
    }
}

/// Pick hosts worth probing from an ARP table
pub fn select_candidates(
    entries: &[ArpEntry],
    link_local_fallback: bool,
) -> Vec<(ArpEntry, CandidateReason)> {
    let mut candidates: Vec<(ArpEntry, CandidateReason)> = Vec::new();

    for entry in entries.iter().filter(|e| e.is_ifm()) {
        if !candidates.iter().any(|(c, _)| c.ip == entry.ip) {
            candidates.push((entry.clone(), CandidateReason::IfmMac));
        }
    }

    if candidates.is_empty() && link_local_fallback {
        debug!("No ifm MAC addresses, checking link-local hosts");
        for entry in entries.iter().filter(|e| e.is_link_local() && !e.mac.is_empty()) {
            if !candidates.iter().any(|(c, _)| c.ip == entry.ip) {
                candidates.push((entry.clone(), CandidateReason::LinkLocal));
            }
        }
    }

    candidates
}

/// Look for IO-Link Masters on the local network
///
/// An empty result means nothing was found; only failing to read the ARP
/// table is an error.
pub async fn discover(config: &ScannerConfig) -> Result<Vec<Candidate>> {
    info!("Scanning ARP table for IO-Link Masters");

    let entries = get_arp_table()?;
    if entries.is_empty() {
        warn!("ARP table is empty");
        return Ok(Vec::new());
    }

    let selected = select_candidates(&entries, config.link_local_fallback);
    info!(
        entries = entries.len(),
        candidates = selected.len(),
        "Selected discovery candidates"
    );

    let hosts: Vec<Ipv4Addr> = selected.iter().map(|(entry, _)| entry.ip).collect();
    let masters = probe_hosts(&hosts, Duration::from_millis(config.probe_timeout_ms)).await;

    let candidates = selected
        .into_iter()
        .map(|(entry, reason)| Candidate {
            verified: masters.contains(&entry.ip),
            entry,
            reason,
        })
        .collect();

    Ok(candidates)
}
