//! Neighbour (ARP) table reading and ifm device recognition

use anyhow::Result;
use serde::Serialize;
use std::net::Ipv4Addr;
use std::process::Command;
use std::str::FromStr;
use tracing::{debug, warn};

/// OUI prefixes assigned to ifm electronic
pub const IFM_OUI_PREFIXES: &[&str] = &["00:02:01", "00:30:26"];

/// ARP table entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArpEntry {
    pub ip: Ipv4Addr,
    /// Upper-case, colon separated; empty when unresolved
    pub mac: String,
    pub interface: String,
    pub state: ArpState,
}

impl ArpEntry {
    pub fn is_ifm(&self) -> bool {
        is_ifm_mac(&self.mac)
    }

    pub fn is_link_local(&self) -> bool {
        self.ip.is_link_local()
    }
}

/// ARP entry state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArpState {
    Reachable,
    Stale,
    Delay,
    Probe,
    Failed,
    Incomplete,
    Permanent,
    Unknown,
}

/// Get current ARP table entries
///
/// Uses `ip neigh` where available and falls back to `arp -a`.
pub fn get_arp_table() -> Result<Vec<ArpEntry>> {
    match Command::new("ip").args(["neigh", "show"]).output() {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let entries: Vec<ArpEntry> = stdout.lines().filter_map(parse_ip_neigh_line).collect();
            debug!("Found {} neighbour entries", entries.len());
            return Ok(entries);
        }
        Ok(output) => {
            warn!(stderr = %String::from_utf8_lossy(&output.stderr), "ip neigh failed, trying arp -a");
        }
        Err(e) => {
            debug!(error = %e, "ip command unavailable, trying arp -a");
        }
    }

    let output = Command::new("arp").arg("-a").output()?;
    if !output.status.success() {
        anyhow::bail!("Failed to get ARP table: {}", String::from_utf8_lossy(&output.stderr));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let entries: Vec<ArpEntry> = stdout.lines().filter_map(parse_arp_a_line).collect();
    debug!("Found {} ARP entries", entries.len());
    Ok(entries)
}

/// Parse a line from `ip neigh show` output
fn parse_ip_neigh_line(line: &str) -> Option<ArpEntry> {
    // Format: "192.168.1.1 dev eth0 lladdr aa:bb:cc:dd:ee:ff REACHABLE"
    let parts: Vec<&str> = line.split_whitespace().collect();

    if parts.len() < 4 {
        return None;
    }

    let ip = Ipv4Addr::from_str(parts[0]).ok()?;

    let dev_idx = parts.iter().position(|&p| p == "dev")?;
    let lladdr_idx = parts.iter().position(|&p| p == "lladdr");

    let interface = parts.get(dev_idx + 1)?.to_string();

    // MAC might not be present for INCOMPLETE entries
    let mac = lladdr_idx
        .and_then(|idx| parts.get(idx + 1))
        .and_then(|s| normalize_mac(s))
        .unwrap_or_default();

    let state = parts.last().map(|s| parse_arp_state(s)).unwrap_or(ArpState::Unknown);

    Some(ArpEntry { ip, mac, interface, state })
}

/// Parse a line from `arp -a` output
///
/// Handles the BSD/Linux form
/// `? (169.254.178.135) at 00:02:01:aa:bb:cc [ether] on eth0`
/// and the Windows form `  169.254.178.135       00-02-01-aa-bb-cc     dynamic`.
fn parse_arp_a_line(line: &str) -> Option<ArpEntry> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    let ip = parts
        .iter()
        .find_map(|p| Ipv4Addr::from_str(p.trim_matches(|c| c == '(' || c == ')')).ok())?;
    let mac = parts.iter().find_map(|p| normalize_mac(p))?;

    let interface = parts
        .iter()
        .position(|&p| p == "on")
        .and_then(|idx| parts.get(idx + 1))
        .map(|s| s.to_string())
        .unwrap_or_default();

    let state = if parts.iter().any(|p| p.eq_ignore_ascii_case("static")) || line.contains("PERM") {
        ArpState::Permanent
    } else {
        ArpState::Reachable
    };

    Some(ArpEntry { ip, mac, interface, state })
}

/// Normalize `aa-bb-cc-dd-ee-ff` / `aa:bb:...` to `AA:BB:CC:DD:EE:FF`
fn normalize_mac(s: &str) -> Option<String> {
    let octets: Vec<&str> = s.split([':', '-']).collect();
    let valid = octets.len() == 6
        && octets
            .iter()
            .all(|o| (1..=2).contains(&o.len()) && o.bytes().all(|b| b.is_ascii_hexdigit()));
    if !valid {
        return None;
    }

    Some(
        octets
            .iter()
            .map(|o| format!("{:0>2}", o.to_ascii_uppercase()))
            .collect::<Vec<_>>()
            .join(":"),
    )
}

/// Parse ARP state string
fn parse_arp_state(s: &str) -> ArpState {
    match s.to_uppercase().as_str() {
        "REACHABLE" => ArpState::Reachable,
        "STALE" => ArpState::Stale,
        "DELAY" => ArpState::Delay,
        "PROBE" => ArpState::Probe,
        "FAILED" => ArpState::Failed,
        "INCOMPLETE" => ArpState::Incomplete,
        "PERMANENT" => ArpState::Permanent,
        _ => ArpState::Unknown,
    }
}

/// Check whether a MAC address carries an ifm OUI
pub fn is_ifm_mac(mac: &str) -> bool {
    normalize_mac(mac)
        .is_some_and(|mac| IFM_OUI_PREFIXES.iter().any(|prefix| mac.starts_with(prefix)))
}
