//! Local network interfaces

use network_interface::{NetworkInterface, NetworkInterfaceConfig};
use serde::Serialize;
use std::net::Ipv4Addr;

/// IPv4 address assigned to a local interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalInterface {
    pub name: String,
    pub ip: Ipv4Addr,
    pub prefix_len: u8,
}

impl LocalInterface {
    /// The factory-default AL1350 address is only reachable from a 169.254/16 interface
    pub fn is_link_local(&self) -> bool {
        self.ip.is_link_local()
    }
}

/// Get IPv4 interfaces, skipping loopback and container bridges
pub fn local_ipv4_interfaces() -> Vec<LocalInterface> {
    let Ok(interfaces) = NetworkInterface::show() else {
        return Vec::new();
    };

    interfaces
        .into_iter()
        .filter(|iface| !is_virtual(&iface.name))
        .flat_map(|iface| {
            let name = iface.name.clone();
            iface.addr.into_iter().filter_map(move |addr| match addr {
                network_interface::Addr::V4(v4) if !v4.ip.is_loopback() => Some(LocalInterface {
                    name: name.clone(),
                    ip: v4.ip,
                    prefix_len: v4
                        .netmask
                        .map(|m| u32::from(m).count_ones() as u8)
                        .unwrap_or(24),
                }),
                _ => None,
            })
        })
        .collect()
}

fn is_virtual(name: &str) -> bool {
    name.starts_with("lo")
        || name.starts_with("docker")
        || name.starts_with("br-")
        || name.starts_with("veth")
}

/// Check if IP is in subnet
pub fn is_in_subnet(ip: Ipv4Addr, subnet: Ipv4Addr, prefix_len: u8) -> bool {
    let mask = if prefix_len == 0 {
        0
    } else if prefix_len >= 32 {
        0xFFFFFFFF
    } else {
        !((1u32 << (32 - prefix_len)) - 1)
    };
    (u32::from(ip) & mask) == (u32::from(subnet) & mask)
}
